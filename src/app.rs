//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::metrics::EntityKind;
use crate::sort::SortMetric;
use crate::source::DataSource;
use crate::surface::TileBoard;
use crate::ui::Theme;

/// Name of the root area the terminal front-end renders into.
pub const CONTAINER: &str = "terminal";

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Circuit tiles.
    Circuits,
    /// Thread-pool tiles.
    ThreadPools,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Circuits => View::ThreadPools,
            View::ThreadPools => View::Circuits,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Circuits => "Circuits",
            View::ThreadPools => "Thread Pools",
        }
    }

    /// The entity kind shown by this view.
    pub fn kind(&self) -> EntityKind {
        match self {
            View::Circuits => EntityKind::Circuit,
            View::ThreadPools => EntityKind::ThreadPool,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub dashboard: Dashboard<TileBoard>,
    pub load_error: Option<String>,
    pub last_updated: Option<Instant>,

    // Index of the first visible tile, per view
    pub circuit_scroll: usize,
    pub thread_pool_scroll: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source`, with an initialized dashboard.
    pub fn new(source: Box<dyn DataSource>, settings: &Settings) -> Self {
        let mut dashboard = Dashboard::new(TileBoard::new(), settings.dashboard.clone());
        dashboard.init(CONTAINER);

        Self {
            running: true,
            current_view: View::Circuits,
            show_help: false,
            source,
            dashboard,
            load_error: None,
            last_updated: None,
            circuit_scroll: 0,
            thread_pool_scroll: 0,
            theme: Theme::from_choice(settings.theme),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source and feed any new snapshot to the dashboard.
    ///
    /// Returns `true` if a snapshot was received.
    pub fn reload_data(&mut self) -> bool {
        let received = match self.source.poll() {
            Some(snapshot) => {
                self.dashboard.refresh(&snapshot);
                self.last_updated = Some(Instant::now());
                self.clamp_scroll();
                true
            }
            None => false,
        };
        self.load_error = self.source.error().map(str::to_string);
        received
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Number of tiles in the current view.
    pub fn tile_count(&self) -> usize {
        self.dashboard.registry().count(self.current_view.kind())
    }

    /// Index of the first visible tile in the current view.
    pub fn scroll(&self) -> usize {
        match self.current_view {
            View::Circuits => self.circuit_scroll,
            View::ThreadPools => self.thread_pool_scroll,
        }
    }

    fn set_scroll(&mut self, value: usize) {
        let max = self.tile_count().saturating_sub(1);
        let value = value.min(max);
        match self.current_view {
            View::Circuits => self.circuit_scroll = value,
            View::ThreadPools => self.thread_pool_scroll = value,
        }
    }

    /// Scroll down by n tiles.
    pub fn scroll_down(&mut self, n: usize) {
        self.set_scroll(self.scroll() + n);
    }

    /// Scroll up by n tiles.
    pub fn scroll_up(&mut self, n: usize) {
        self.set_scroll(self.scroll().saturating_sub(n));
    }

    /// Jump to the first tile.
    pub fn scroll_home(&mut self) {
        self.set_scroll(0);
    }

    /// Jump to the last tile.
    pub fn scroll_end(&mut self) {
        self.set_scroll(usize::MAX);
    }

    fn clamp_scroll(&mut self) {
        let circuits = self.dashboard.registry().count(EntityKind::Circuit);
        let pools = self.dashboard.registry().count(EntityKind::ThreadPool);
        self.circuit_scroll = self.circuit_scroll.min(circuits.saturating_sub(1));
        self.thread_pool_scroll = self.thread_pool_scroll.min(pools.saturating_sub(1));
    }

    /// Sort the current view by `metric`, toggling direction if it is
    /// already active.
    pub fn sort(&mut self, metric: SortMetric) {
        let kind = self.current_view.kind();
        match self.dashboard.sort_by(kind, metric) {
            Some(selection) => {
                self.set_status_message(format!("Sorted {} by {}", self.current_view.label(), selection));
            }
            None => {
                self.set_status_message(format!(
                    "{} cannot be sorted by {}",
                    self.current_view.label(),
                    metric.label()
                ));
            }
        }
    }

    /// Drop every widget and start over with the next snapshot.
    pub fn clear_dashboard(&mut self) {
        self.dashboard.clear();
        self.circuit_scroll = 0;
        self.thread_pool_scroll = 0;
        self.set_status_message("Dashboard cleared".to_string());
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the dashboard report to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.dashboard.registry().is_empty() {
            anyhow::bail!("No data to export");
        }
        write_report(&self.dashboard, path)
    }
}

/// Write a dashboard's report as pretty JSON.
pub fn write_report(dashboard: &Dashboard<TileBoard>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&dashboard.report())?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeChoice;
    use crate::metrics::MetricSnapshot;
    use crate::source::ChannelSource;
    use tempfile::tempdir;

    fn settings() -> Settings {
        Settings {
            theme: ThemeChoice::Dark,
            ..Settings::default()
        }
    }

    fn snapshot() -> MetricSnapshot {
        MetricSnapshot::new()
            .with_gauge("gauge.hystrix.HystrixCommand.svc.a.requestCount", 10)
            .with_gauge("gauge.hystrix.HystrixCommand.svc.b.requestCount", 20)
            .with_gauge("gauge.hystrix.HystrixThreadPool.svc.currentPoolSize", 4)
    }

    #[test]
    fn test_reload_feeds_dashboard() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), &settings());

        // initial empty snapshot
        assert!(app.reload_data());
        assert!(app.dashboard.registry().is_empty());

        tx.send(snapshot()).unwrap();
        assert!(app.reload_data());
        assert_eq!(app.dashboard.registry().count(EntityKind::Circuit), 2);
        assert_eq!(app.dashboard.registry().count(EntityKind::ThreadPool), 1);
        assert!(app.last_updated.is_some());
        assert!(!app.reload_data());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), &settings());
        tx.send(snapshot()).unwrap();
        app.reload_data();

        app.scroll_down(10);
        assert_eq!(app.scroll(), 1);
        app.scroll_up(5);
        assert_eq!(app.scroll(), 0);

        app.set_view(View::ThreadPools);
        app.scroll_end();
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_sort_uses_current_view() {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), &settings());

        app.set_view(View::ThreadPools);
        app.sort(SortMetric::LatencyMean);
        assert!(app.get_status_message().unwrap().contains("cannot be sorted"));

        app.sort(SortMetric::Volume);
        assert_eq!(
            app.dashboard.sort_selection(EntityKind::ThreadPool).metric,
            SortMetric::Volume
        );
        assert_eq!(
            app.dashboard.sort_selection(EntityKind::Circuit).metric,
            SortMetric::Alphabetical
        );
    }

    #[test]
    fn test_clear_dashboard() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), &settings());
        tx.send(snapshot()).unwrap();
        app.reload_data();
        app.scroll_down(1);

        app.clear_dashboard();
        assert!(app.dashboard.registry().is_empty());
        assert_eq!(app.scroll(), 0);
        assert_eq!(app.get_status_message(), Some("Dashboard cleared"));
    }

    #[test]
    fn test_export_state() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), &settings());
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.json");

        assert!(app.export_state(&path).is_err());

        tx.send(snapshot()).unwrap();
        app.reload_data();
        app.export_state(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["circuits"].as_array().map(Vec::len), Some(2));
        assert_eq!(written["thread_pools"][0]["name"], "svc");
    }
}
