//! Rolling rate history for sparklines.

use std::collections::VecDeque;

use serde::Serialize;

/// Default number of points kept per widget.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Default trailing time window plotted by a sparkline (two minutes).
pub const DEFAULT_SPARKLINE_WINDOW_MS: u64 = 2 * 60 * 1000;

/// A single recorded rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub value: f64,
    pub timestamp_ms: u64,
}

/// Bounded FIFO of recent rate values.
///
/// Start-up zeros are not treated as data: a lone zero is never drawn, and
/// one leading zero is dropped when the first non-zero value arrives. Zeros
/// recorded after that are real idle periods and are kept.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
    started: bool,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity: capacity.max(1),
            started: false,
        }
    }

    /// Record a value, evicting the oldest points beyond capacity.
    pub fn push(&mut self, value: f64, timestamp_ms: u64) {
        self.points.push_back(HistoryPoint {
            value,
            timestamp_ms,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }

        if !self.started && value != 0.0 {
            self.started = true;
            if self.points.len() > 1 && self.points[0].value == 0.0 {
                self.points.pop_front();
            }
        }
    }

    /// Whether there is anything worth drawing.
    ///
    /// A buffer holding a single zero means "no data yet".
    pub fn is_drawable(&self) -> bool {
        match self.points.len() {
            0 => false,
            1 => self.points[0].value != 0.0,
            _ => true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn points(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.started = false;
    }

    /// Project the buffer onto a unit square for drawing.
    ///
    /// x is the position inside the trailing `window_ms` ending at `now_ms`
    /// (points older than the window fall below 0). y is scaled into the
    /// buffer's own `[min, max]`, or 0.5 when every value is equal.
    pub fn sparkline(&self, now_ms: u64, window_ms: u64) -> Option<SparklinePath> {
        if !self.is_drawable() {
            return None;
        }

        let min = self.points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let window = window_ms.max(1) as f64;
        let start = now_ms as f64 - window;

        let points = self
            .points
            .iter()
            .map(|p| {
                let x = (p.timestamp_ms as f64 - start) / window;
                let y = if range > 0.0 {
                    (p.value - min) / range
                } else {
                    0.5
                };
                (x, y)
            })
            .collect();

        Some(SparklinePath { points, min, max })
    }
}

/// A sparkline ready for a rendering back-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparklinePath {
    /// `(x, y)` pairs in unit coordinates, oldest first.
    pub points: Vec<(f64, f64)>,
    /// Smallest value in the buffer.
    pub min: f64,
    /// Largest value in the buffer.
    pub max: f64,
}

impl SparklinePath {
    /// Quantize the y values into `levels` bar heights (0..levels-1).
    pub fn levels(&self, levels: u8) -> Vec<u8> {
        let top = levels.saturating_sub(1) as f64;
        self.points
            .iter()
            .map(|&(_, y)| (y * top).round().clamp(0.0, top) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[f64]) -> HistoryBuffer {
        let mut buffer = HistoryBuffer::default();
        for (i, v) in values.iter().enumerate() {
            buffer.push(*v, i as u64 * 1000);
        }
        buffer
    }

    #[test]
    fn test_eviction_keeps_capacity() {
        let mut buffer = HistoryBuffer::default();
        for i in 1..=201 {
            buffer.push(i as f64, i as u64);
        }

        assert_eq!(buffer.len(), 200);
        let values = buffer.values();
        assert_eq!(values[0], 2.0);
        assert_eq!(values[199], 201.0);
    }

    #[test]
    fn test_single_zero_not_drawable() {
        let buffer = filled(&[0.0]);
        assert!(!buffer.is_drawable());
        assert!(buffer.sparkline(1000, DEFAULT_SPARKLINE_WINDOW_MS).is_none());
    }

    #[test]
    fn test_single_non_zero_drawable() {
        let buffer = filled(&[4.0]);
        assert!(buffer.is_drawable());
    }

    #[test]
    fn test_leading_zero_dropped() {
        let buffer = filled(&[0.0, 5.0]);
        assert_eq!(buffer.values(), vec![5.0]);
    }

    #[test]
    fn test_only_one_leading_zero_dropped() {
        let buffer = filled(&[0.0, 0.0, 5.0]);
        assert_eq!(buffer.values(), vec![0.0, 5.0]);
    }

    #[test]
    fn test_zero_rate_later_is_kept() {
        let buffer = filled(&[3.0, 0.0, 0.0]);
        assert_eq!(buffer.values(), vec![3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_idle_period_at_front_survives_traffic() {
        let mut buffer = filled(&[2.0]);
        for i in 1..=DEFAULT_HISTORY_CAPACITY as u64 {
            buffer.push(0.0, i * 1000);
        }
        assert_eq!(buffer.len(), DEFAULT_HISTORY_CAPACITY);
        assert!(buffer.values().iter().all(|v| *v == 0.0));

        buffer.push(7.0, 1_000_000);
        assert_eq!(buffer.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(buffer.values()[0], 0.0);
        assert_eq!(buffer.values()[DEFAULT_HISTORY_CAPACITY - 1], 7.0);
    }

    #[test]
    fn test_zero_kept_after_start_up() {
        let buffer = filled(&[0.0, 0.0, 5.0, 6.0]);
        assert_eq!(buffer.values(), vec![0.0, 5.0, 6.0]);
    }

    #[test]
    fn test_clear_restarts_zero_suppression() {
        let mut buffer = filled(&[4.0]);
        buffer.clear();
        buffer.push(0.0, 0);
        buffer.push(3.0, 1000);
        assert_eq!(buffer.values(), vec![3.0]);
    }

    #[test]
    fn test_sparkline_projection() {
        let mut buffer = HistoryBuffer::default();
        buffer.push(2.0, 60_000);
        buffer.push(4.0, 120_000);

        let path = buffer.sparkline(120_000, 120_000).unwrap();
        assert_eq!(path.min, 2.0);
        assert_eq!(path.max, 4.0);
        assert_eq!(path.points, vec![(0.5, 0.0), (1.0, 1.0)]);
        assert_eq!(path.levels(8), vec![0, 7]);
    }

    #[test]
    fn test_flat_sparkline_is_centered() {
        let buffer = filled(&[3.0, 3.0]);
        let path = buffer.sparkline(1000, 1000).unwrap();
        assert!(path.points.iter().all(|&(_, y)| y == 0.5));
    }

    #[test]
    fn test_clear() {
        let mut buffer = filled(&[1.0, 2.0]);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
