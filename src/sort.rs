//! Widget ordering.
//!
//! Each region (circuits, thread pools) has one active `(metric, direction)`
//! selection. Issuing the active metric again flips the direction; a
//! different metric starts from its own default direction. Sorting is
//! stable, so widgets with equal keys keep their current relative order.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::metrics::EntityKind;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Ascending => "▲",
            Direction::Descending => "▼",
        }
    }
}

/// A metric widgets can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortMetric {
    Alphabetical,
    Volume,
    Error,
    ErrorThenVolume,
    LatencyMean,
    LatencyMedian,
    Latency90,
    Latency99,
    Latency995,
}

const CIRCUIT_METRICS: [SortMetric; 9] = [
    SortMetric::ErrorThenVolume,
    SortMetric::Alphabetical,
    SortMetric::Volume,
    SortMetric::Error,
    SortMetric::LatencyMean,
    SortMetric::LatencyMedian,
    SortMetric::Latency90,
    SortMetric::Latency99,
    SortMetric::Latency995,
];

const THREAD_POOL_METRICS: [SortMetric; 2] = [SortMetric::Alphabetical, SortMetric::Volume];

impl SortMetric {
    /// Metrics offered for a region, in menu order.
    pub fn available(kind: EntityKind) -> &'static [SortMetric] {
        match kind {
            EntityKind::Circuit => &CIRCUIT_METRICS,
            EntityKind::ThreadPool => &THREAD_POOL_METRICS,
        }
    }

    pub fn supports(self, kind: EntityKind) -> bool {
        Self::available(kind).contains(&self)
    }

    /// Direction used when this metric is first selected.
    pub fn default_direction(self) -> Direction {
        match self {
            SortMetric::Alphabetical => Direction::Ascending,
            _ => Direction::Descending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMetric::Alphabetical => "Alphabetical",
            SortMetric::Volume => "Volume",
            SortMetric::Error => "Error",
            SortMetric::ErrorThenVolume => "Error then Volume",
            SortMetric::LatencyMean => "Mean",
            SortMetric::LatencyMedian => "Median",
            SortMetric::Latency90 => "90",
            SortMetric::Latency99 => "99",
            SortMetric::Latency995 => "99.5",
        }
    }
}

/// The active ordering of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSelection {
    pub metric: SortMetric,
    pub direction: Direction,
}

impl Default for SortSelection {
    fn default() -> Self {
        Self {
            metric: SortMetric::Alphabetical,
            direction: Direction::Ascending,
        }
    }
}

impl fmt::Display for SortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.metric.label(), self.direction.arrow())
    }
}

/// Something that can be placed by the sort controller.
pub trait Sortable {
    /// Name used by alphabetical ordering.
    fn sort_name(&self) -> String;

    /// Numeric key for every non-alphabetical metric.
    fn sort_value(&self, metric: SortMetric) -> f64;
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn sort_name(&self) -> String {
        (**self).sort_name()
    }

    fn sort_value(&self, metric: SortMetric) -> f64 {
        (**self).sort_value(metric)
    }
}

/// Holds the active selection of each region.
#[derive(Debug, Clone, Default)]
pub struct SortController {
    circuits: SortSelection,
    thread_pools: SortSelection,
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self, kind: EntityKind) -> SortSelection {
        match kind {
            EntityKind::Circuit => self.circuits,
            EntityKind::ThreadPool => self.thread_pools,
        }
    }

    fn selection_mut(&mut self, kind: EntityKind) -> &mut SortSelection {
        match kind {
            EntityKind::Circuit => &mut self.circuits,
            EntityKind::ThreadPool => &mut self.thread_pools,
        }
    }

    /// Select `metric` for a region and return the resulting selection.
    ///
    /// Returns `None`, leaving the selection unchanged, when the region does
    /// not offer the metric.
    pub fn command(&mut self, kind: EntityKind, metric: SortMetric) -> Option<SortSelection> {
        if !metric.supports(kind) {
            return None;
        }

        let current = self.selection_mut(kind);
        let direction = if current.metric == metric {
            current.direction.toggled()
        } else {
            metric.default_direction()
        };
        *current = SortSelection { metric, direction };
        Some(*current)
    }

    /// Order `items` by the region's active selection.
    pub fn apply<T: Sortable>(&self, kind: EntityKind, items: &mut [T]) {
        sort_items(items, self.selection(kind));
    }
}

/// Stable sort of `items` by `selection`.
pub fn sort_items<T: Sortable>(items: &mut [T], selection: SortSelection) {
    let compare = |a: &T, b: &T| -> Ordering {
        match selection.metric {
            SortMetric::Alphabetical => a.sort_name().to_lowercase().cmp(&b.sort_name().to_lowercase()),
            metric => a
                .sort_value(metric)
                .partial_cmp(&b.sort_value(metric))
                .unwrap_or(Ordering::Equal),
        }
    };

    match selection.direction {
        Direction::Ascending => items.sort_by(compare),
        Direction::Descending => items.sort_by(|a, b| compare(b, a)),
    }
}
