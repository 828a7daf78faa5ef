//! The raw metrics snapshot as delivered by the upstream publisher.
//!
//! A snapshot is a JSON object keyed by metric type. Only `"gauges"` is read;
//! `"counters"`, `"meters"` and `"timers"` are accepted and ignored. Each gauge
//! maps a fully-qualified, dot-delimited name to a record `{"value": ...}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Decimal places kept when a gauge value is read.
const VALUE_PRECISION: i32 = 4;

/// One polled metrics snapshot.
///
/// Gauge records are kept as raw JSON so that a malformed record degrades to
/// a missing metric instead of rejecting the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    #[serde(default)]
    pub gauges: BTreeMap<String, Value>,
}

impl MetricSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a JSON string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load and parse a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Add a gauge record `{"value": value}`, returning the snapshot.
    pub fn with_gauge(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_gauge(name, value);
        self
    }

    /// Add or replace a gauge record `{"value": value}`.
    pub fn insert_gauge(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let mut record = serde_json::Map::new();
        record.insert("value".to_string(), value.into());
        self.gauges.insert(name.into(), Value::Object(record));
    }

    /// Iterate over every gauge name in the snapshot.
    pub fn gauge_names(&self) -> impl Iterator<Item = &str> {
        self.gauges.keys().map(String::as_str)
    }

    /// Number of gauge records.
    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    /// The `value` field of a gauge record, if the record exists and has one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.gauges.get(name)?.get("value")
    }

    /// Whether a gauge record with a `value` field exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// A numeric gauge value, normalised to four decimal places.
    ///
    /// Returns `None` when the record is absent or its value is not a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_f64().map(normalize)
    }

    /// A numeric gauge value, or `default` when it is missing.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    /// Whether any gauge lives under `prefix` (i.e. is named `prefix.<field>`).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let start = format!("{}.", prefix);
        self.gauges
            .range(start.clone()..)
            .next()
            .is_some_and(|(name, _)| name.starts_with(&start))
    }
}

/// Build the full metric name of `field` under an entity prefix.
pub fn metric_name(prefix: &str, field: &str) -> String {
    format!("{}.{}", prefix, field)
}

fn normalize(value: f64) -> f64 {
    let factor = 10f64.powi(VALUE_PRECISION);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_other_metric_types() {
        let json = r#"{
            "counters": {"c.one": {"count": 3}},
            "meters": {},
            "timers": {},
            "gauges": {
                "gauge.hystrix.HystrixCommand.svcA.readX.requestCount": {"value": 100}
            }
        }"#;

        let snapshot = MetricSnapshot::parse(json).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.number("gauge.hystrix.HystrixCommand.svcA.readX.requestCount"),
            Some(100.0)
        );
    }

    #[test]
    fn test_parse_without_gauges() {
        let snapshot = MetricSnapshot::parse(r#"{"counters": {}}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(MetricSnapshot::parse("not json").is_err());
    }

    #[test]
    fn test_number_defaults() {
        let snapshot = MetricSnapshot::new()
            .with_gauge("a.b.c", 2.5)
            .with_gauge("a.b.flag", true);

        assert_eq!(snapshot.number_or("a.b.c", 0.0), 2.5);
        assert_eq!(snapshot.number_or("a.b.missing", 7.0), 7.0);
        // non-numeric values behave as missing numbers but are still present
        assert_eq!(snapshot.number("a.b.flag"), None);
        assert!(snapshot.contains("a.b.flag"));
    }

    #[test]
    fn test_zero_is_present() {
        let snapshot = MetricSnapshot::new().with_gauge("svc.m.rollingCountThreadPoolRejected", 0);
        assert!(snapshot.contains("svc.m.rollingCountThreadPoolRejected"));
        assert_eq!(snapshot.number_or("svc.m.rollingCountThreadPoolRejected", -1.0), 0.0);
    }

    #[test]
    fn test_malformed_record_is_missing() {
        let json = r#"{"gauges": {"a.b.c": 5, "a.b.d": {"other": 1}}}"#;
        let snapshot = MetricSnapshot::parse(json).unwrap();
        assert!(!snapshot.contains("a.b.c"));
        assert!(!snapshot.contains("a.b.d"));
        assert_eq!(snapshot.number_or("a.b.c", 1.0), 1.0);
    }

    #[test]
    fn test_values_normalised_to_four_places() {
        let snapshot = MetricSnapshot::new().with_gauge("x.y.z", 1.234_567);
        assert_eq!(snapshot.number("x.y.z"), Some(1.2346));
    }

    #[test]
    fn test_has_prefix() {
        let snapshot = MetricSnapshot::new()
            .with_gauge("gauge.hystrix.HystrixCommand.svcA.readX.requestCount", 1)
            .with_gauge("gauge.hystrix.HystrixCommand.svcA.readXY.requestCount", 1);

        assert!(snapshot.has_prefix("gauge.hystrix.HystrixCommand.svcA.readX"));
        assert!(snapshot.has_prefix("gauge.hystrix.HystrixCommand.svcA.readXY"));
        assert!(!snapshot.has_prefix("gauge.hystrix.HystrixCommand.svcA.read"));
        assert!(!snapshot.has_prefix("gauge.hystrix.HystrixCommand.svcB.readX"));
    }

    #[test]
    fn test_metric_name() {
        assert_eq!(metric_name("svc.m", "errorPercentage"), "svc.m.errorPercentage");
    }
}
