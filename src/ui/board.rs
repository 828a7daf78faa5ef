//! Tile grid for the circuit and thread-pool views.
//!
//! Each tile shows the circle indicator on a canvas, the data table next to
//! it and the rate sparkline underneath.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle as CanvasCircle},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::metrics::SparklinePath;
use crate::surface::{Circle, DataTable, Tile, MAX_RADIUS};

use super::Theme;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const TILE_WIDTH: u16 = 48;
const TILE_HEIGHT: u16 = 13;
const CIRCLE_WIDTH: u16 = 14;

/// Render the tiles of the current view, starting at the scroll offset.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tiles = app.dashboard.surface().tiles(app.current_view.kind());

    if tiles.is_empty() {
        let text = format!(" No {} reported yet", app.current_view.label().to_lowercase());
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(app.theme.label)),
            area,
        );
        return;
    }

    let columns = (area.width / TILE_WIDTH).max(1) as usize;
    let rows = (area.height / TILE_HEIGHT).max(1) as usize;

    // keep the scroll target inside the first visible row
    let first = app.scroll() - app.scroll() % columns;
    let visible = tiles.iter().skip(first).take(columns * rows);

    let row_areas = Layout::vertical(vec![Constraint::Length(TILE_HEIGHT); rows]).split(area);
    let mut cells = Vec::with_capacity(columns * rows);
    for row_area in row_areas.iter() {
        let col_areas =
            Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns]).split(*row_area);
        cells.extend(col_areas.iter().copied());
    }

    for (tile, cell) in visible.zip(cells) {
        render_tile(frame, &app.theme, tile, cell);
    }
}

fn render_tile(frame: &mut Frame, theme: &Theme, tile: &Tile, area: Rect) {
    let block = Block::default()
        .title(Span::styled(format!(" {} ", tile.title), theme.title))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body, spark] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    let [circle_area, table_area] =
        Layout::horizontal([Constraint::Length(CIRCLE_WIDTH), Constraint::Min(1)]).areas(body);

    if let Some(circle) = tile.circle {
        render_circle(frame, theme, circle, circle_area);
    }

    frame.render_widget(Paragraph::new(table_lines(theme, &tile.table)), table_area);

    let sparkline = tile
        .sparkline
        .as_ref()
        .map(|path| sparkline_text(path, spark.width as usize))
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(sparkline).style(Style::default().fg(theme.sparkline)),
        spark,
    );
}

fn render_circle(frame: &mut Frame, theme: &Theme, circle: Circle, area: Rect) {
    let color = theme.rgb(circle.fill);
    // the surface places circles in a 100x100 box, y growing downwards
    let x = circle.x_pct;
    let y = 100.0 - circle.y_pct;
    let radius = circle.radius / MAX_RADIUS * 30.0;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            let mut r = radius;
            while r > 0.0 {
                ctx.draw(&CanvasCircle {
                    x,
                    y,
                    radius: r,
                    color,
                });
                r -= 2.0;
            }
        });
    frame.render_widget(canvas, area);
}

/// One line per table row, cells separated by two spaces.
fn table_lines(theme: &Theme, table: &DataTable) -> Vec<Line<'static>> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut spans = Vec::with_capacity(row.len() * 3);
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw("  "));
                }
                if !cell.label.is_empty() {
                    spans.push(Span::styled(
                        format!("{} ", cell.label),
                        Style::default().fg(theme.label),
                    ));
                }
                spans.push(Span::styled(cell.value.clone(), theme.tone_style(cell.tone)));
            }
            Line::from(spans)
        })
        .collect()
}

/// Render the most recent `width` sparkline points as block characters.
fn sparkline_text(path: &SparklinePath, width: usize) -> String {
    let levels = path.levels(SPARKLINE_CHARS.len() as u8);
    let skip = levels.len().saturating_sub(width);
    levels
        .iter()
        .skip(skip)
        .map(|&l| SPARKLINE_CHARS[l as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, ThemeChoice};
    use crate::metrics::MetricSnapshot;
    use crate::source::ChannelSource;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_sparkline_text_keeps_latest() {
        let path = SparklinePath {
            points: vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)],
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(sparkline_text(&path, 10), "▁▅█");
        assert_eq!(sparkline_text(&path, 2), "▅█");
    }

    #[test]
    fn test_render_tiles() {
        let (tx, source) = ChannelSource::create("test");
        let settings = Settings {
            theme: ThemeChoice::Dark,
            ..Settings::default()
        };
        let mut app = App::new(Box::new(source), &settings);
        tx.send(
            MetricSnapshot::new()
                .with_gauge("gauge.hystrix.HystrixCommand.svcA.readX.requestCount", 10)
                .with_gauge("gauge.hystrix.HystrixCommand.svcA.readX.errorPercentage", 5),
        )
        .unwrap();
        app.reload_data();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("svcA.readX"));
        assert!(screen.contains("Error % 5%"));
    }

    #[test]
    fn test_render_empty_view() {
        let (_tx, source) = ChannelSource::create("test");
        let settings = Settings {
            theme: ThemeChoice::Dark,
            ..Settings::default()
        };
        let app = App::new(Box::new(source), &settings);

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("No circuits reported yet"));
    }
}
