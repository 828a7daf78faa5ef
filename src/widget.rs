//! Per-entity widgets.
//!
//! A widget is created the first time its entity is seen and then refreshed
//! from every snapshot that mentions it. On first refresh it creates its tile
//! on the [`Surface`]; afterwards it only updates that tile in place.

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::metrics::{
    BreakerStatus, CircuitData, EntityKey, EntityKind, HistoryBuffer, MetricSnapshot, Rate,
    Resolution, ThreadPoolData,
};
use crate::sort::{SortMetric, Sortable};
use crate::surface::{
    error_text_color, format_count, Circle, DataTable, Surface, TableCell, Tone,
};

/// Where a widget is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Lifecycle {
    /// Constructed, nothing drawn yet.
    #[default]
    Uninitialized,
    /// Tile exists and is updated in place.
    Rendered,
    /// Torn down by a dashboard clear. Terminal.
    Destroyed,
}

/// Common behaviour of circuit and thread-pool widgets.
pub trait Widget: Sortable {
    fn key(&self) -> &EntityKey;

    /// Prefix under which the entity's fields are looked up.
    fn prefix(&self) -> &str;

    fn lifecycle(&self) -> Lifecycle;

    /// Re-derive state from `snapshot` and update the tile.
    fn refresh(&mut self, snapshot: &MetricSnapshot, now_ms: u64, surface: &mut dyn Surface);

    /// Release the tile and history. The widget is unusable afterwards.
    fn clear(&mut self, surface: &mut dyn Surface);

    /// Serialisable view of the current derived state.
    fn report(&self) -> WidgetReport;
}

/// Derived state of one widget, as exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetReport {
    Circuit {
        name: String,
        data: CircuitData,
        history: Vec<f64>,
    },
    ThreadPool {
        name: String,
        data: ThreadPoolData,
    },
}

/// Widget for one `service.method` circuit.
#[derive(Debug, Clone)]
pub struct CircuitWidget {
    key: EntityKey,
    prefix: String,
    lifecycle: Lifecycle,
    data: CircuitData,
    history: HistoryBuffer,
    scale_max: f64,
    window_ms: u64,
}

impl CircuitWidget {
    pub fn new(resolution: Resolution, config: &DashboardConfig) -> Self {
        Self {
            key: resolution.key,
            prefix: resolution.prefix,
            lifecycle: Lifecycle::Uninitialized,
            data: CircuitData::default(),
            history: HistoryBuffer::new(config.history_capacity),
            scale_max: config.circuit_scale_max,
            window_ms: config.sparkline_window_ms,
        }
    }

    pub fn data(&self) -> &CircuitData {
        &self.data
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    fn table(&self) -> DataTable {
        let data = &self.data;
        let counts = &data.counts;
        let (rejected, is_thread_pool) = counts.rejected();
        let rejected_label = if is_thread_pool {
            "Thread Pool Rejected"
        } else {
            "Semaphore Rejected"
        };
        let breaker_tone = match data.breaker {
            _ if data.forced_open => Tone::Open,
            BreakerStatus::AllOpen => Tone::Open,
            BreakerStatus::AllClosed => Tone::Closed,
            _ => Tone::Timeout,
        };

        DataTable::new()
            .row(vec![TableCell::new(
                "Error %",
                format!("{}%", format_count(data.error_percentage)),
            )
            .toned(Tone::Custom(error_text_color(data.error_percentage)))])
            .row(vec![
                TableCell::new("Timeout", format_count(counts.timeout)).toned(Tone::Timeout),
                TableCell::new(rejected_label, format_count(rejected)).toned(Tone::Rejected),
                TableCell::new("Failure", format_count(counts.failure)).toned(Tone::Failure),
            ])
            .row(vec![
                TableCell::new("Success", format_count(counts.success)).toned(Tone::Success),
                TableCell::new("Short-Circuited", format_count(counts.short_circuited))
                    .toned(Tone::ShortCircuited),
                TableCell::new("Bad Request", format_count(counts.bad_requests))
                    .toned(Tone::BadRequest),
            ])
            .row(rate_cells(data.rate_per_second_per_host, data.rate_per_second))
            .row(vec![TableCell::new("Circuit", data.status_line()).toned(breaker_tone)])
            .row(vec![
                TableCell::new("Hosts", format_count(data.reporting_hosts)),
                TableCell::new("90th", latency(data.latency.p90)),
            ])
            .row(vec![
                TableCell::new("Median", latency(data.latency.median)),
                TableCell::new("99th", latency(data.latency.p99)),
            ])
            .row(vec![
                TableCell::new("Mean", latency(data.latency.mean)),
                TableCell::new("99.5th", latency(data.latency.p995)),
            ])
    }
}

impl Sortable for CircuitWidget {
    fn sort_name(&self) -> String {
        self.key.display_name()
    }

    fn sort_value(&self, metric: SortMetric) -> f64 {
        let data = &self.data;
        match metric {
            SortMetric::Alphabetical => 0.0,
            SortMetric::Volume => rate_key(data.rate_per_second),
            SortMetric::Error => data.error_percentage,
            SortMetric::ErrorThenVolume => data.error_then_volume,
            SortMetric::LatencyMean => data.latency.mean,
            SortMetric::LatencyMedian => data.latency.median,
            SortMetric::Latency90 => data.latency.p90,
            SortMetric::Latency99 => data.latency.p99,
            SortMetric::Latency995 => data.latency.p995,
        }
    }
}

impl Widget for CircuitWidget {
    fn key(&self) -> &EntityKey {
        &self.key
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn refresh(&mut self, snapshot: &MetricSnapshot, now_ms: u64, surface: &mut dyn Surface) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }

        self.data = CircuitData::derive(snapshot, &self.prefix);
        if self.lifecycle == Lifecycle::Uninitialized {
            surface.create_tile(&self.key, &self.key.display_name());
            self.lifecycle = Lifecycle::Rendered;
        }

        self.history.push(self.data.rate_per_second.value(), now_ms);

        surface.update_circle(
            &self.key,
            Circle::for_rate(
                self.data.rate_per_second_per_host,
                self.scale_max,
                self.data.error_percentage,
            ),
        );
        surface.update_table(&self.key, self.table());
        surface.update_sparkline(&self.key, self.history.sparkline(now_ms, self.window_ms));
    }

    fn clear(&mut self, surface: &mut dyn Surface) {
        if self.lifecycle == Lifecycle::Rendered {
            surface.remove_tile(&self.key);
        }
        self.history.clear();
        self.lifecycle = Lifecycle::Destroyed;
    }

    fn report(&self) -> WidgetReport {
        WidgetReport::Circuit {
            name: self.key.display_name(),
            data: self.data.clone(),
            history: self.history.values(),
        }
    }
}

/// Widget for one thread pool.
#[derive(Debug, Clone)]
pub struct ThreadPoolWidget {
    key: EntityKey,
    prefix: String,
    lifecycle: Lifecycle,
    data: ThreadPoolData,
    scale_max: f64,
}

impl ThreadPoolWidget {
    pub fn new(resolution: Resolution, config: &DashboardConfig) -> Self {
        Self {
            key: resolution.key,
            prefix: resolution.prefix,
            lifecycle: Lifecycle::Uninitialized,
            data: ThreadPoolData::default(),
            scale_max: config.thread_pool_scale_max,
        }
    }

    pub fn data(&self) -> &ThreadPoolData {
        &self.data
    }

    fn table(&self) -> DataTable {
        let data = &self.data;
        DataTable::new()
            .row(rate_cells(data.rate_per_second_per_host, data.rate_per_second))
            .row(vec![
                TableCell::new("Active", format_count(data.current_active_count)),
                TableCell::new("Max Active", format_count(data.rolling_max_active_threads)),
            ])
            .row(vec![
                TableCell::new("Queued", format_count(data.current_queue_size)),
                TableCell::new("Executions", format_count(data.rolling_count_threads_executed)),
            ])
            .row(vec![
                TableCell::new("Pool Size", format_count(data.current_pool_size)),
                TableCell::new("Queue Size", format_count(data.queue_rejection_threshold)),
            ])
    }
}

impl Sortable for ThreadPoolWidget {
    fn sort_name(&self) -> String {
        self.key.display_name()
    }

    fn sort_value(&self, metric: SortMetric) -> f64 {
        match metric {
            SortMetric::Volume => rate_key(self.data.rate_per_second),
            _ => 0.0,
        }
    }
}

impl Widget for ThreadPoolWidget {
    fn key(&self) -> &EntityKey {
        &self.key
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn refresh(&mut self, snapshot: &MetricSnapshot, _now_ms: u64, surface: &mut dyn Surface) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }

        self.data = ThreadPoolData::derive(snapshot, &self.prefix);
        if self.lifecycle == Lifecycle::Uninitialized {
            surface.create_tile(&self.key, &self.key.display_name());
            self.lifecycle = Lifecycle::Rendered;
        }

        // pools report no error percentage, so the circle stays at the base colour
        surface.update_circle(
            &self.key,
            Circle::for_rate(self.data.rate_per_second_per_host, self.scale_max, 0.0),
        );
        surface.update_table(&self.key, self.table());
    }

    fn clear(&mut self, surface: &mut dyn Surface) {
        if self.lifecycle == Lifecycle::Rendered {
            surface.remove_tile(&self.key);
        }
        self.lifecycle = Lifecycle::Destroyed;
    }

    fn report(&self) -> WidgetReport {
        WidgetReport::ThreadPool {
            name: self.key.display_name(),
            data: self.data.clone(),
        }
    }
}

/// Either kind of widget, as held by the registry.
#[derive(Debug, Clone)]
pub enum EntityWidget {
    Circuit(CircuitWidget),
    ThreadPool(ThreadPoolWidget),
}

impl EntityWidget {
    /// Build the widget matching the resolved entity's kind.
    pub fn new(resolution: Resolution, config: &DashboardConfig) -> Self {
        match resolution.key.kind {
            EntityKind::Circuit => {
                EntityWidget::Circuit(CircuitWidget::new(resolution, config))
            }
            EntityKind::ThreadPool => {
                EntityWidget::ThreadPool(ThreadPoolWidget::new(resolution, config))
            }
        }
    }

    pub fn as_circuit(&self) -> Option<&CircuitWidget> {
        match self {
            EntityWidget::Circuit(w) => Some(w),
            EntityWidget::ThreadPool(_) => None,
        }
    }

    pub fn as_thread_pool(&self) -> Option<&ThreadPoolWidget> {
        match self {
            EntityWidget::ThreadPool(w) => Some(w),
            EntityWidget::Circuit(_) => None,
        }
    }

    fn inner(&self) -> &dyn Widget {
        match self {
            EntityWidget::Circuit(w) => w,
            EntityWidget::ThreadPool(w) => w,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Widget {
        match self {
            EntityWidget::Circuit(w) => w,
            EntityWidget::ThreadPool(w) => w,
        }
    }
}

impl Sortable for EntityWidget {
    fn sort_name(&self) -> String {
        self.inner().sort_name()
    }

    fn sort_value(&self, metric: SortMetric) -> f64 {
        self.inner().sort_value(metric)
    }
}

impl Widget for EntityWidget {
    fn key(&self) -> &EntityKey {
        self.inner().key()
    }

    fn prefix(&self) -> &str {
        self.inner().prefix()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.inner().lifecycle()
    }

    fn refresh(&mut self, snapshot: &MetricSnapshot, now_ms: u64, surface: &mut dyn Surface) {
        self.inner_mut().refresh(snapshot, now_ms, surface)
    }

    fn clear(&mut self, surface: &mut dyn Surface) {
        self.inner_mut().clear(surface)
    }

    fn report(&self) -> WidgetReport {
        self.inner().report()
    }
}

/// Undefined rates sort below every real rate.
fn rate_key(rate: Rate) -> f64 {
    rate.value_or(-1.0)
}

fn rate_cells(per_host: Rate, cluster: Rate) -> Vec<TableCell> {
    vec![
        TableCell::new("Host", format!("{}/s", per_host)),
        TableCell::new("Cluster", format!("{}/s", cluster)),
    ]
}

fn latency(ms: f64) -> String {
    format!("{}ms", format_count(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{metric_name, KeyResolver};
    use crate::surface::TileBoard;

    const PREFIX: &str = "gauge.hystrix.HystrixCommand.svcA.readX";

    fn circuit() -> CircuitWidget {
        CircuitWidget::new(
            Resolution {
                key: EntityKey::circuit("svcA", "readX"),
                prefix: PREFIX.to_string(),
            },
            &DashboardConfig::default(),
        )
    }

    fn busy_snapshot(requests: u64) -> MetricSnapshot {
        MetricSnapshot::new()
            .with_gauge(metric_name(PREFIX, "requestCount"), requests)
            .with_gauge(metric_name(PREFIX, "reportingHosts"), 2)
            .with_gauge(
                metric_name(PREFIX, "propertyValue_metricsRollingStatisticalWindowInMilliseconds"),
                10000,
            )
            .with_gauge(metric_name(PREFIX, "rollingCountSemaphoreRejected"), 4)
    }

    #[test]
    fn test_lifecycle() {
        let mut board = TileBoard::new();
        let mut widget = circuit();
        assert_eq!(widget.lifecycle(), Lifecycle::Uninitialized);
        assert!(board.is_empty());

        widget.refresh(&busy_snapshot(100), 1000, &mut board);
        assert_eq!(widget.lifecycle(), Lifecycle::Rendered);
        assert_eq!(board.tiles(EntityKind::Circuit).len(), 1);

        widget.refresh(&busy_snapshot(200), 2000, &mut board);
        assert_eq!(board.tiles(EntityKind::Circuit).len(), 1);

        widget.clear(&mut board);
        assert_eq!(widget.lifecycle(), Lifecycle::Destroyed);
        assert!(board.is_empty());
        assert!(widget.history().is_empty());

        // destroyed widgets never come back
        widget.refresh(&busy_snapshot(100), 3000, &mut board);
        assert_eq!(widget.lifecycle(), Lifecycle::Destroyed);
        assert!(board.is_empty());
    }

    #[test]
    fn test_refresh_draws_tile() {
        let mut board = TileBoard::new();
        let mut widget = circuit();
        widget.refresh(&busy_snapshot(100), 1000, &mut board);

        let tile = board.tile(widget.key()).unwrap();
        assert_eq!(tile.title, "svcA.readX");
        assert_eq!(
            tile.table.cell("Cluster").map(|c| c.value.as_str()),
            Some("10.0/s")
        );
        assert_eq!(tile.table.cell("Host").map(|c| c.value.as_str()), Some("5.0/s"));
        assert_eq!(
            tile.table.cell("Semaphore Rejected").map(|c| c.value.as_str()),
            Some("4")
        );
        assert_eq!(tile.table.cell("Hosts").map(|c| c.value.as_str()), Some("2"));
        assert_eq!(tile.table.cell("90th").map(|c| c.value.as_str()), Some("0ms"));
        assert!(tile.circle.is_some());
        // a single non-zero point is drawable
        assert!(tile.sparkline.is_some());
    }

    #[test]
    fn test_history_follows_cluster_rate() {
        let mut board = TileBoard::new();
        let mut widget = circuit();
        widget.refresh(&MetricSnapshot::new(), 1000, &mut board);
        assert!(board.tile(widget.key()).unwrap().sparkline.is_none());

        widget.refresh(&busy_snapshot(50), 2000, &mut board);
        assert_eq!(widget.history().values(), vec![5.0]);
    }

    #[test]
    fn test_sort_values() {
        let mut board = TileBoard::new();
        let mut widget = circuit();
        assert_eq!(widget.sort_value(SortMetric::Volume), -1.0);

        widget.refresh(&busy_snapshot(100), 1000, &mut board);
        assert_eq!(widget.sort_value(SortMetric::Volume), 10.0);
        assert_eq!(widget.sort_value(SortMetric::ErrorThenVolume), 10.0);
        assert_eq!(widget.sort_name(), "svcA.readX");
    }

    #[test]
    fn test_thread_pool_widget() {
        let mut resolver = KeyResolver::default();
        let snapshot = MetricSnapshot::new()
            .with_gauge("gauge.hystrix.HystrixThreadPool.svcA.rollingCountThreadsExecuted", 20)
            .with_gauge(
                "gauge.hystrix.HystrixThreadPool.svcA.propertyValue_metricsRollingStatisticalWindowInMilliseconds",
                10000,
            )
            .with_gauge("gauge.hystrix.HystrixThreadPool.svcA.currentPoolSize", 10);
        let resolution = resolver
            .resolve("gauge.hystrix.HystrixThreadPool.svcA.currentPoolSize", &snapshot)
            .unwrap();

        let mut board = TileBoard::new();
        let mut widget = EntityWidget::new(resolution, &DashboardConfig::default());
        assert!(widget.as_thread_pool().is_some());
        widget.refresh(&snapshot, 0, &mut board);

        let tile = board.tile(&EntityKey::thread_pool("svcA")).unwrap();
        assert_eq!(tile.table.cell("Cluster").map(|c| c.value.as_str()), Some("2.0/s"));
        assert_eq!(tile.table.cell("Host").map(|c| c.value.as_str()), Some("2.0/s"));
        assert!(tile.circle.map(|c| c.radius).unwrap() > crate::surface::MIN_RADIUS);
        assert_eq!(tile.table.cell("Pool Size").map(|c| c.value.as_str()), Some("10"));
        assert!(tile.sparkline.is_none());
        assert_eq!(widget.sort_value(SortMetric::Volume), 2.0);

        match widget.report() {
            WidgetReport::ThreadPool { name, data } => {
                assert_eq!(name, "svcA");
                assert_eq!(data.current_pool_size, 10.0);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }
}
