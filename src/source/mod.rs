//! Data source abstraction for receiving metric snapshots.
//!
//! The dashboard core performs no I/O. Snapshots arrive through a
//! [`DataSource`]: a polled JSON file, a newline-delimited stream, or an
//! in-memory channel fed by an embedding host.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use crate::metrics::MetricSnapshot;

/// Trait for receiving metric snapshots from various sources.
///
/// # Example
///
/// ```
/// use circuitwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("metrics.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} gauges", snapshot.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<MetricSnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the last poll failed.
    fn error(&self) -> Option<&str>;
}
