//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::metrics::EntityKind;

/// Render the header bar.
///
/// Displays: entity counts, detected naming scheme, active sort per region.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let registry = app.dashboard.registry();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(" CIRCUITWATCH ", bold),
        Span::raw("│ "),
        Span::styled(
            registry.count(EntityKind::Circuit).to_string(),
            Style::default().fg(app.theme.highlight),
        ),
        Span::raw(" circuits "),
        Span::styled(
            registry.count(EntityKind::ThreadPool).to_string(),
            Style::default().fg(app.theme.highlight),
        ),
        Span::raw(" pools │ naming: "),
        Span::raw(app.dashboard.scheme().label()),
        Span::raw(" │ sort: "),
        Span::styled(
            app.dashboard.sort_selection(app.current_view.kind()).to_string(),
            bold,
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Circuits "), Line::from(" 2:Thread Pools ")];

    let selected = match app.current_view {
        View::Circuits => 0,
        View::ThreadPools => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since last update and the main controls, or a
/// temporary status message / the last source error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" {} | Error: {} | r:retry q:quit", app.source_description(), err)
    } else if let Some(updated) = app.last_updated {
        format!(
            " {} | Updated {:.1}s ago | {}/{} | a/v/e/t sort c:clear x:export ?:help q:quit",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
            (app.scroll() + 1).min(app.tile_count()),
            app.tile_count(),
        )
    } else {
        format!(" {} | Waiting for data... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1 2     Switch views"),
        Line::from("  ↑/↓ j/k     Scroll tiles"),
        Line::from("  PgUp/PgDn   Scroll 10 tiles"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Sort (again to reverse)"),
        Line::from("  a  Alphabetical   v  Volume"),
        Line::from("  e  Error          t  Error then volume"),
        Line::from("  m  Mean           d  Median"),
        Line::from("  9  90th   0  99th   .  99.5th"),
        Line::from(""),
        section(" General"),
        Line::from("  c         Clear dashboard"),
        Line::from("  r         Reload data"),
        Line::from("  x         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
