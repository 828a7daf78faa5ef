//! Per-refresh derivation of circuit state.

use serde::Serialize;
use serde_json::Value;

use super::rate::Rate;
use super::snapshot::{metric_name, MetricSnapshot};

/// Weight of the error percentage in the "error then volume" sort key.
const ERROR_THEN_VOLUME_WEIGHT: f64 = 100_000_000.0;

/// Per-host breakdown of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BreakerStatus {
    AllOpen,
    AllClosed,
    PerHostSplit { open: u64, closed: u64 },
    #[default]
    Unknown,
}

impl BreakerStatus {
    /// Interpret the `isCircuitBreakerOpen` gauge.
    ///
    /// The value is a boolean or open-host count for a single host or an
    /// aggregate, or an object `{"true": open, "false": closed}` when the
    /// upstream reports a per-host split.
    pub fn from_gauge(value: Option<&Value>, reporting_hosts: f64) -> Self {
        match value {
            Some(Value::Bool(true)) => BreakerStatus::AllOpen,
            Some(Value::Bool(false)) => BreakerStatus::AllClosed,
            Some(Value::String(s)) => match s.as_str() {
                "true" => BreakerStatus::AllOpen,
                "false" => BreakerStatus::AllClosed,
                _ => BreakerStatus::Unknown,
            },
            Some(Value::Number(n)) => match n.as_f64() {
                Some(open) => Self::from_open_count(open, reporting_hosts),
                None => BreakerStatus::Unknown,
            },
            Some(Value::Object(split)) => {
                let count = |k: &str| split.get(k).and_then(Value::as_f64).unwrap_or(0.0);
                Self::from_split(count("true"), count("false"))
            }
            _ => BreakerStatus::Unknown,
        }
    }

    fn from_open_count(open: f64, reporting_hosts: f64) -> Self {
        if open <= 0.0 {
            BreakerStatus::AllClosed
        } else if open >= reporting_hosts {
            BreakerStatus::AllOpen
        } else {
            BreakerStatus::PerHostSplit {
                open: open as u64,
                closed: (reporting_hosts - open) as u64,
            }
        }
    }

    fn from_split(open: f64, closed: f64) -> Self {
        match (open > 0.0, closed > 0.0) {
            (false, false) => BreakerStatus::Unknown,
            (true, false) => BreakerStatus::AllOpen,
            (false, true) => BreakerStatus::AllClosed,
            (true, true) => BreakerStatus::PerHostSplit {
                open: open as u64,
                closed: closed as u64,
            },
        }
    }

    /// Status line text, e.g. `Open 2 / Closed 1`.
    pub fn label(&self) -> String {
        match self {
            BreakerStatus::AllOpen => "Open".to_string(),
            BreakerStatus::AllClosed => "Closed".to_string(),
            BreakerStatus::PerHostSplit { open, closed } => {
                format!("Open {} / Closed {}", open, closed)
            }
            BreakerStatus::Unknown => "Unknown".to_string(),
        }
    }
}

/// Rolling request counters over the upstream's statistical window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RollingCounts {
    pub timeout: f64,
    pub failure: f64,
    pub success: f64,
    pub short_circuited: f64,
    pub bad_requests: f64,
    /// Set when the upstream reports thread-pool isolation rejections.
    pub thread_pool_rejected: Option<f64>,
    /// Set when thread-pool rejections are absent and semaphore ones exist.
    pub semaphore_rejected: Option<f64>,
}

impl RollingCounts {
    /// The rejection count actually shown, and whether it is the
    /// thread-pool figure.
    pub fn rejected(&self) -> (f64, bool) {
        match self.thread_pool_rejected {
            Some(n) => (n, true),
            None => (self.semaphore_rejected.unwrap_or(0.0), false),
        }
    }
}

/// Latency percentiles in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Latency {
    pub median: f64,
    pub mean: f64,
    pub p90: f64,
    pub p99: f64,
    pub p995: f64,
}

/// Display-ready state of one circuit, rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CircuitData {
    pub rate_per_second: Rate,
    pub rate_per_second_per_host: Rate,
    pub error_percentage: f64,
    /// `error% * 1e8 + rate`, or -1 when the rate is undefined.
    pub error_then_volume: f64,
    pub counts: RollingCounts,
    pub reporting_hosts: f64,
    pub latency: Latency,
    pub breaker: BreakerStatus,
    pub forced_open: bool,
    pub forced_closed: bool,
}

impl CircuitData {
    /// Derive the circuit's state from the gauges under `prefix`.
    pub fn derive(snapshot: &MetricSnapshot, prefix: &str) -> Self {
        let number = |field: &str| snapshot.number(&metric_name(prefix, field));
        let number_or = |field: &str, default: f64| number(field).unwrap_or(default);

        let window_seconds =
            number_or("propertyValue_metricsRollingStatisticalWindowInMilliseconds", 0.0) / 1000.0;
        let total_requests = number_or("requestCount", 0.0).max(0.0);
        let rate_raw = total_requests / window_seconds;

        let rate_per_second = Rate::new(rate_raw);
        let rate_per_second_per_host = Rate::ratio(rate_raw, number_or("reportingHosts", 0.0));

        let error_percentage = number_or("errorPercentage", 0.0);
        let error_then_volume = match rate_per_second {
            Rate::Defined(rate) => error_percentage * ERROR_THEN_VOLUME_WEIGHT + rate,
            Rate::Undefined => -1.0,
        };

        let thread_pool_rejected = number("rollingCountThreadPoolRejected");
        let semaphore_rejected = match thread_pool_rejected {
            Some(_) => None,
            None => number("rollingCountSemaphoreRejected")
                .or_else(|| number("rollingCountSemaphorePoolRejected")),
        };

        let counts = RollingCounts {
            timeout: number_or("rollingCountTimeout", 0.0),
            failure: number_or("rollingCountFailure", 0.0),
            success: number_or("rollingCountSuccess", 0.0),
            short_circuited: number("rollingCountShortCircuited")
                .or_else(|| number("countShortCircuited"))
                .unwrap_or(0.0),
            bad_requests: number_or("rollingCountBadRequests", 0.0),
            thread_pool_rejected,
            semaphore_rejected,
        };

        let reporting_hosts = number_or("reportingHosts", 1.0);

        let latency = Latency {
            median: number_or("50", 0.0),
            mean: number_or("latencyExecute_mean", 0.0),
            p90: number_or("90", 0.0),
            p99: number_or("99", 0.0),
            p995: number_or("99.5", 0.0),
        };

        let breaker = BreakerStatus::from_gauge(
            snapshot.value(&metric_name(prefix, "isCircuitBreakerOpen")),
            reporting_hosts,
        );

        Self {
            rate_per_second,
            rate_per_second_per_host,
            error_percentage,
            error_then_volume,
            counts,
            reporting_hosts,
            latency,
            breaker,
            forced_open: flag(snapshot, prefix, "propertyValue_circuitBreakerForceOpen"),
            forced_closed: flag(snapshot, prefix, "propertyValue_circuitBreakerForceClosed"),
        }
    }

    /// The breaker line shown under the rates.
    pub fn status_line(&self) -> String {
        if self.forced_open {
            return "Circuit Forced Open".to_string();
        }
        let line = format!("Circuit {}", self.breaker.label());
        if self.forced_closed {
            format!("{} [Forced Closed]", line)
        } else {
            line
        }
    }
}

fn flag(snapshot: &MetricSnapshot, prefix: &str, field: &str) -> bool {
    match snapshot.value(&metric_name(prefix, field)) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}
