//! Per-refresh derivation of thread-pool state.

use serde::Serialize;

use super::rate::Rate;
use super::snapshot::{metric_name, MetricSnapshot};

/// Display-ready state of one thread pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ThreadPoolData {
    pub rate_per_second: Rate,
    pub rate_per_second_per_host: Rate,
    pub current_active_count: f64,
    pub rolling_max_active_threads: f64,
    pub current_queue_size: f64,
    pub rolling_count_threads_executed: f64,
    pub current_pool_size: f64,
    pub queue_rejection_threshold: f64,
    pub reporting_hosts: f64,
}

impl ThreadPoolData {
    /// Derive the pool's state from the gauges under `prefix`.
    pub fn derive(snapshot: &MetricSnapshot, prefix: &str) -> Self {
        let number_or = |field: &str, default: f64| {
            snapshot.number_or(&metric_name(prefix, field), default)
        };

        let window_seconds =
            number_or("propertyValue_metricsRollingStatisticalWindowInMilliseconds", 0.0) / 1000.0;
        let threads_executed = number_or("rollingCountThreadsExecuted", 0.0);
        let rate_raw = threads_executed.max(0.0) / window_seconds;
        let reporting_hosts = number_or("reportingHosts", 1.0);

        Self {
            rate_per_second: Rate::new(rate_raw),
            rate_per_second_per_host: Rate::ratio(rate_raw, reporting_hosts),
            current_active_count: number_or("currentActiveCount", 0.0),
            rolling_max_active_threads: number_or("rollingMaxActiveThreads", 0.0),
            current_queue_size: number_or("currentQueueSize", 0.0),
            rolling_count_threads_executed: threads_executed,
            current_pool_size: number_or("currentPoolSize", 0.0),
            queue_rejection_threshold: number_or("propertyValue_queueSizeRejectionThreshold", 0.0),
            reporting_hosts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "gauge.hystrix.HystrixThreadPool.svcA";

    #[test]
    fn test_derive() {
        let snapshot = MetricSnapshot::new()
            .with_gauge(metric_name(PREFIX, "rollingCountThreadsExecuted"), 300)
            .with_gauge(
                metric_name(PREFIX, "propertyValue_metricsRollingStatisticalWindowInMilliseconds"),
                10000,
            )
            .with_gauge(metric_name(PREFIX, "reportingHosts"), 3)
            .with_gauge(metric_name(PREFIX, "currentActiveCount"), 4)
            .with_gauge(metric_name(PREFIX, "rollingMaxActiveThreads"), 9)
            .with_gauge(metric_name(PREFIX, "currentQueueSize"), 2)
            .with_gauge(metric_name(PREFIX, "currentPoolSize"), 10)
            .with_gauge(metric_name(PREFIX, "propertyValue_queueSizeRejectionThreshold"), 5);

        let data = ThreadPoolData::derive(&snapshot, PREFIX);
        assert_eq!(data.rate_per_second.to_string(), "30.0");
        assert_eq!(data.rate_per_second_per_host.to_string(), "10.0");
        assert_eq!(data.current_active_count, 4.0);
        assert_eq!(data.rolling_max_active_threads, 9.0);
        assert_eq!(data.current_queue_size, 2.0);
        assert_eq!(data.rolling_count_threads_executed, 300.0);
        assert_eq!(data.current_pool_size, 10.0);
        assert_eq!(data.queue_rejection_threshold, 5.0);
        assert_eq!(data.reporting_hosts, 3.0);
    }

    #[test]
    fn test_missing_window_is_undefined() {
        let snapshot = MetricSnapshot::new()
            .with_gauge(metric_name(PREFIX, "rollingCountThreadsExecuted"), 10);
        let data = ThreadPoolData::derive(&snapshot, PREFIX);
        assert_eq!(data.rate_per_second, Rate::Undefined);
        assert_eq!(data.rate_per_second.to_string(), "0.0");
        assert_eq!(data.reporting_hosts, 1.0);
        assert_eq!(data.current_pool_size, 0.0);
    }

    #[test]
    fn test_missing_reporting_hosts_counts_as_one() {
        let snapshot = MetricSnapshot::new()
            .with_gauge(metric_name(PREFIX, "rollingCountThreadsExecuted"), 2000)
            .with_gauge(
                metric_name(PREFIX, "propertyValue_metricsRollingStatisticalWindowInMilliseconds"),
                10000,
            );

        let data = ThreadPoolData::derive(&snapshot, PREFIX);
        assert_eq!(data.rate_per_second.to_string(), "200.0");
        assert_eq!(data.rate_per_second_per_host.to_string(), "200.0");
        assert_eq!(data.reporting_hosts, 1.0);
    }
}
