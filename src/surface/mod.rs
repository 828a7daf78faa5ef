//! Rendering capability interface.
//!
//! The dashboard never draws anything itself. Widgets describe what they
//! want shown (a circle, a small data table, a sparkline) and hand it to a
//! [`Surface`], which owns the actual rendering resources. [`TileBoard`] is
//! the in-memory implementation used by the terminal front-end and tests.

pub mod board;

use serde::Serialize;

use crate::metrics::{EntityKey, EntityKind, Rate, SparklinePath};

pub use board::{Tile, TileBoard};

/// Smallest circle radius.
pub const MIN_RADIUS: f64 = 5.0;
/// Largest circle radius.
pub const MAX_RADIUS: f64 = 125.0;
/// Circle centre position range, in percent of the tile.
pub const MIN_POSITION_PCT: f64 = 30.0;
pub const MAX_POSITION_PCT: f64 = 40.0;

/// Operations the dashboard needs from a rendering back-end.
///
/// Every tile is addressed by the [`EntityKey`] of the widget that owns it.
pub trait Surface {
    /// Create the root area with one sortable region per entity kind.
    fn create_root(&mut self, container: &str);

    /// Create an empty tile for a widget.
    fn create_tile(&mut self, key: &EntityKey, title: &str);

    /// Position, resize and colour the tile's indicator circle.
    fn update_circle(&mut self, key: &EntityKey, circle: Circle);

    /// Replace the tile's data table.
    fn update_table(&mut self, key: &EntityKey, table: DataTable);

    /// Redraw the tile's sparkline. `None` clears it.
    fn update_sparkline(&mut self, key: &EntityKey, path: Option<SparklinePath>);

    /// Reorder one region's tiles to match `order`.
    fn reorder(&mut self, kind: EntityKind, order: &[EntityKey]);

    /// Drop a tile and everything it owns.
    fn remove_tile(&mut self, key: &EntityKey);
}

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0x00, 0x80, 0x00);
    pub const AMBER: Rgb = Rgb(0xFF, 0xCC, 0x00);
    pub const ORANGE: Rgb = Rgb(0xFF, 0x99, 0x00);
    pub const RED: Rgb = Rgb(0xFF, 0x00, 0x00);
    pub const GREY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// The circle indicator of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub radius: f64,
    pub x_pct: f64,
    pub y_pct: f64,
    pub fill: Rgb,
}

impl Circle {
    /// Size and place a circle for a per-host rate against `scale_max`,
    /// coloured by error percentage.
    pub fn for_rate(rate_per_host: Rate, scale_max: f64, error_percentage: f64) -> Self {
        let position = position_pct(rate_per_host, scale_max);
        Self {
            radius: circle_radius(rate_per_host, scale_max),
            x_pct: position,
            y_pct: position,
            fill: health_color(error_percentage),
        }
    }
}

/// Square-root scale of a rate onto `[MIN_RADIUS, MAX_RADIUS]`.
///
/// Undefined or negative rates map to the minimum radius.
pub fn circle_radius(rate: Rate, scale_max: f64) -> f64 {
    let fraction = match rate {
        Rate::Defined(v) if v > 0.0 && scale_max > 0.0 => (v / scale_max).sqrt(),
        _ => 0.0,
    };
    (MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * fraction).min(MAX_RADIUS)
}

/// Linear scale of a rate onto `[MIN_POSITION_PCT, MAX_POSITION_PCT]`.
pub fn position_pct(rate: Rate, scale_max: f64) -> f64 {
    let fraction = match rate {
        Rate::Defined(v) if v > 0.0 && scale_max > 0.0 => v / scale_max,
        _ => 0.0,
    };
    (MIN_POSITION_PCT + (MAX_POSITION_PCT - MIN_POSITION_PCT) * fraction).min(MAX_POSITION_PCT)
}

const HEALTH_STOPS: [(f64, Rgb); 4] = [
    (10.0, Rgb::GREEN),
    (25.0, Rgb::AMBER),
    (40.0, Rgb::ORANGE),
    (50.0, Rgb::RED),
];

const ERROR_TEXT_STOPS: [(f64, Rgb); 4] = [
    (0.0, Rgb::GREY),
    (10.0, Rgb::BLACK),
    (35.0, Rgb::ORANGE),
    (50.0, Rgb::RED),
];

/// Circle fill for an error percentage.
pub fn health_color(error_percentage: f64) -> Rgb {
    piecewise(&HEALTH_STOPS, error_percentage)
}

/// Text colour for the error percentage figure.
pub fn error_text_color(error_percentage: f64) -> Rgb {
    piecewise(&ERROR_TEXT_STOPS, error_percentage)
}

fn piecewise(stops: &[(f64, Rgb)], value: f64) -> Rgb {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgb::default(),
    };
    if !value.is_finite() || value <= first.0 {
        return first.1;
    }
    if value >= last.0 {
        return last.1;
    }
    stops
        .windows(2)
        .find(|pair| value <= pair[1].0)
        .map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            lo.1.lerp(hi.1, (value - lo.0) / (hi.0 - lo.0))
        })
        .unwrap_or(last.1)
}

/// Colour class of a table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Tone {
    #[default]
    Plain,
    Success,
    ShortCircuited,
    BadRequest,
    Timeout,
    Rejected,
    Failure,
    Open,
    Closed,
    Custom(Rgb),
}

/// One labelled value in a table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub label: String,
    pub value: String,
    pub tone: Tone,
}

impl TableCell {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            tone: Tone::Plain,
        }
    }

    pub fn toned(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// A small multi-line data table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataTable {
    pub rows: Vec<Vec<TableCell>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of cells.
    pub fn row(mut self, cells: Vec<TableCell>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Find a cell by label.
    pub fn cell(&self, label: &str) -> Option<&TableCell> {
        self.rows.iter().flatten().find(|c| c.label == label)
    }
}

/// Format a counter the way tables show it: whole numbers without a
/// fraction, anything else with its significant decimals.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_bounds() {
        assert_eq!(circle_radius(Rate::Undefined, 400.0), MIN_RADIUS);
        assert_eq!(circle_radius(Rate::Defined(0.0), 400.0), MIN_RADIUS);
        assert_eq!(circle_radius(Rate::Defined(-3.0), 400.0), MIN_RADIUS);
        assert_eq!(circle_radius(Rate::Defined(400.0), 400.0), MAX_RADIUS);
        assert_eq!(circle_radius(Rate::Defined(10_000.0), 400.0), MAX_RADIUS);
    }

    #[test]
    fn test_radius_is_square_root() {
        // a quarter of the domain is half of the radius range
        assert_eq!(circle_radius(Rate::Defined(100.0), 400.0), 65.0);
    }

    #[test]
    fn test_position() {
        assert_eq!(position_pct(Rate::Undefined, 400.0), 30.0);
        assert_eq!(position_pct(Rate::Defined(200.0), 400.0), 35.0);
        assert_eq!(position_pct(Rate::Defined(800.0), 400.0), 40.0);
    }

    #[test]
    fn test_health_color_stops() {
        assert_eq!(health_color(0.0), Rgb::GREEN);
        assert_eq!(health_color(10.0), Rgb::GREEN);
        assert_eq!(health_color(25.0), Rgb::AMBER);
        assert_eq!(health_color(40.0), Rgb::ORANGE);
        assert_eq!(health_color(75.0), Rgb::RED);
        assert_eq!(health_color(f64::NAN), Rgb::GREEN);
    }

    #[test]
    fn test_health_color_interpolates() {
        assert_eq!(health_color(45.0), Rgb(0xFF, 0x4D, 0x00));
    }

    #[test]
    fn test_error_text_color() {
        assert_eq!(error_text_color(0.0), Rgb::GREY);
        assert_eq!(error_text_color(10.0), Rgb::BLACK);
        assert_eq!(error_text_color(60.0), Rgb::RED);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(12.0), "12");
        assert_eq!(format_count(2.5), "2.5");
        assert_eq!(format_count(0.0), "0");
    }

    #[test]
    fn test_table_cell_lookup() {
        let table = DataTable::new()
            .row(vec![TableCell::new("Timeout", "3").toned(Tone::Timeout)])
            .row(vec![TableCell::new("Hosts", "2")]);
        assert_eq!(table.cell("Hosts").map(|c| c.value.as_str()), Some("2"));
        assert_eq!(table.cell("Timeout").map(|c| c.tone), Some(Tone::Timeout));
        assert!(table.cell("Missing").is_none());
    }
}
