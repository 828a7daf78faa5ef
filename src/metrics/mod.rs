//! Metric snapshots and the values derived from them.
//!
//! ## Submodules
//!
//! - [`snapshot`]: The raw gauge snapshot ([`MetricSnapshot`]) with defaulted lookups
//! - [`key`]: Gauge-name resolution into entities ([`KeyResolver`], [`EntityKey`])
//! - [`rate`]: One-decimal rates ([`Rate`])
//! - [`history`]: Bounded rate history for sparklines ([`HistoryBuffer`])
//! - [`circuit`]: Circuit derivation ([`CircuitData`], [`BreakerStatus`])
//! - [`thread_pool`]: Thread-pool derivation ([`ThreadPoolData`])
//!
//! ## Data Flow
//!
//! ```text
//! MetricSnapshot (raw JSON)
//!        │
//!        ▼
//! KeyResolver::resolve()  ──▶ EntityKey + prefix
//!        │
//!        ▼
//! CircuitData::derive() / ThreadPoolData::derive()
//!        │
//!        └──▶ HistoryBuffer::push() (for sparklines)
//! ```

pub mod circuit;
pub mod history;
pub mod key;
pub mod rate;
pub mod snapshot;
pub mod thread_pool;

pub use circuit::{BreakerStatus, CircuitData, Latency, RollingCounts};
pub use history::{HistoryBuffer, HistoryPoint, SparklinePath};
pub use key::{EntityKey, EntityKind, KeyResolver, NamingScheme, Resolution};
pub use rate::{round1, Rate};
pub use snapshot::{metric_name, MetricSnapshot};
pub use thread_pool::ThreadPoolData;
