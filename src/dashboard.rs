//! The aggregate dashboard.
//!
//! Owns every piece of mutable state: the key resolver and its sticky naming
//! scheme, the widget registry, the sort selections and the rendering
//! surface. A host constructs one explicitly and drives it with
//! [`Dashboard::refresh`] once per polled snapshot.
//!
//! ```
//! use circuitwatch::{Dashboard, DashboardConfig, MetricSnapshot, TileBoard};
//!
//! let mut dashboard = Dashboard::new(TileBoard::new(), DashboardConfig::default());
//! dashboard.init("main");
//!
//! let snapshot = MetricSnapshot::parse(r#"{"gauges": {
//!     "gauge.hystrix.HystrixCommand.svcA.readX.requestCount": {"value": 100}
//! }}"#).unwrap();
//! dashboard.refresh(&snapshot);
//! assert_eq!(dashboard.registry().len(), 1);
//! ```

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::DashboardConfig;
use crate::metrics::{EntityKey, EntityKind, KeyResolver, MetricSnapshot, NamingScheme};
use crate::registry::Registry;
use crate::sort::{SortController, SortMetric, SortSelection};
use crate::surface::{Surface, TileBoard};
use crate::widget::{EntityWidget, Widget, WidgetReport};

/// Snapshot of everything the dashboard currently shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at_ms: Option<u64>,
    pub naming_scheme: NamingScheme,
    pub circuit_sort: SortSelection,
    pub thread_pool_sort: SortSelection,
    pub circuits: Vec<WidgetReport>,
    pub thread_pools: Vec<WidgetReport>,
}

pub struct Dashboard<S: Surface = TileBoard> {
    surface: S,
    config: DashboardConfig,
    resolver: KeyResolver,
    registry: Registry,
    sort: SortController,
    container: Option<String>,
    last_refresh_ms: Option<u64>,
}

impl<S: Surface> Dashboard<S> {
    pub fn new(surface: S, config: DashboardConfig) -> Self {
        let resolver = KeyResolver::new(config.alternate_marker_field.clone());
        Self {
            surface,
            config,
            resolver,
            registry: Registry::new(),
            sort: SortController::new(),
            container: None,
            last_refresh_ms: None,
        }
    }

    /// Create the root area inside `container`.
    ///
    /// Calling it again for the same container does nothing and returns
    /// `false`. Moving to a different container drops the existing widgets
    /// and builds a fresh root there.
    pub fn init(&mut self, container: &str) -> bool {
        if self.container.as_deref() == Some(container) {
            return false;
        }
        if self.container.is_some() {
            self.clear();
        }
        self.surface.create_root(container);
        self.container = Some(container.to_string());
        info!(container, "dashboard initialized");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.container.is_some()
    }

    /// Ingest one snapshot, stamping history with the current time.
    pub fn refresh(&mut self, snapshot: &MetricSnapshot) {
        self.refresh_at(snapshot, now_ms());
    }

    /// Ingest one snapshot taken at `now_ms`.
    ///
    /// Does nothing before [`Dashboard::init`]. Never fails: unknown names
    /// are skipped and missing fields take their defaults.
    pub fn refresh_at(&mut self, snapshot: &MetricSnapshot, now_ms: u64) {
        if self.container.is_none() {
            trace!("refresh ignored, dashboard not initialized");
            return;
        }

        let mut seen: HashSet<EntityKey> = HashSet::new();
        let mut created_circuit = false;
        let mut created_thread_pool = false;

        // known entities are looked up by their stored prefix, whatever the
        // resolver's current scheme
        for widget in self.registry.widgets_mut() {
            if snapshot.has_prefix(widget.prefix()) {
                widget.refresh(snapshot, now_ms, &mut self.surface);
                seen.insert(widget.key().clone());
            }
        }

        for name in snapshot.gauge_names() {
            let Some(resolution) = self.resolver.resolve(name, snapshot) else {
                continue;
            };
            if self.registry.contains(&resolution.key) {
                continue;
            }

            let config = &self.config;
            let (widget, _) = self
                .registry
                .get_or_create(resolution, |r| EntityWidget::new(r, config));
            debug!(entity = %widget.key(), kind = ?widget.key().kind, "widget created");
            match widget.key().kind {
                EntityKind::Circuit => created_circuit = true,
                EntityKind::ThreadPool => created_thread_pool = true,
            }
            seen.insert(widget.key().clone());
            widget.refresh(snapshot, now_ms, &mut self.surface);
        }

        if created_circuit {
            self.apply_sort(EntityKind::Circuit);
        }
        if created_thread_pool {
            self.apply_sort(EntityKind::ThreadPool);
        }

        self.last_refresh_ms = Some(now_ms);
        trace!(
            entities = seen.len(),
            widgets = self.registry.len(),
            "dashboard refreshed"
        );
    }

    /// Destroy all widgets and forget the detected naming scheme.
    ///
    /// Sort selections and the root area survive, so the dashboard is ready
    /// for a fresh sequence of snapshots.
    pub fn clear(&mut self) {
        let removed = self.registry.clear(&mut self.surface);
        self.resolver.reset();
        self.last_refresh_ms = None;
        info!(removed, "dashboard cleared");
    }

    /// Run a sort command on one region and re-order it.
    ///
    /// Returns the new selection, or `None` if the region does not offer
    /// `metric`.
    pub fn sort_by(&mut self, kind: EntityKind, metric: SortMetric) -> Option<SortSelection> {
        let selection = self.sort.command(kind, metric)?;
        self.apply_sort(kind);
        Some(selection)
    }

    pub fn sort_selection(&self, kind: EntityKind) -> SortSelection {
        self.sort.selection(kind)
    }

    fn apply_sort(&mut self, kind: EntityKind) {
        let mut widgets = self.registry.widgets(kind);
        self.sort.apply(kind, &mut widgets);
        let order: Vec<EntityKey> = widgets.iter().map(|w| w.key().clone()).collect();

        self.surface.reorder(kind, &order);
        self.registry.set_order(kind, order);
    }

    pub fn scheme(&self) -> NamingScheme {
        self.resolver.scheme()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn last_refresh_ms(&self) -> Option<u64> {
        self.last_refresh_ms
    }

    /// Derived state of every widget in display order.
    pub fn report(&self) -> DashboardReport {
        let reports = |kind: EntityKind| -> Vec<WidgetReport> {
            self.registry
                .widgets(kind)
                .into_iter()
                .map(|w| w.report())
                .collect()
        };

        DashboardReport {
            generated_at_ms: self.last_refresh_ms,
            naming_scheme: self.scheme(),
            circuit_sort: self.sort.selection(EntityKind::Circuit),
            thread_pool_sort: self.sort.selection(EntityKind::ThreadPool),
            circuits: reports(EntityKind::Circuit),
            thread_pools: reports(EntityKind::ThreadPool),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
