//! Channel-based data source.
//!
//! Receives metric snapshots via a tokio watch channel, for hosts that
//! embed the dashboard and push snapshots instead of writing files.

use tokio::sync::watch;

use super::DataSource;
use crate::metrics::MetricSnapshot;

/// A data source that receives snapshots via a watch channel.
///
/// Only the latest snapshot is kept; intermediate ones pushed between two
/// polls are skipped.
///
/// # Example
///
/// ```
/// use circuitwatch::{ChannelSource, MetricSnapshot};
///
/// let (tx, source) = ChannelSource::create("embedded");
/// tx.send(MetricSnapshot::new()).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<MetricSnapshot>,
    description: String,
    initial_returned: bool,
}

impl ChannelSource {
    /// Wrap the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<MetricSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
        }
    }

    /// Create a channel pair. The sender pushes snapshots, the source hands
    /// them to the dashboard.
    pub fn create(source_description: &str) -> (watch::Sender<MetricSnapshot>, Self) {
        let (tx, rx) = watch::channel(MetricSnapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<MetricSnapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // the initial empty snapshot is delivered once
        assert!(source.poll().unwrap().is_empty());
        assert!(source.poll().is_none());

        tx.send(MetricSnapshot::new().with_gauge("gauge.hystrix.HystrixThreadPool.svc.currentPoolSize", 3))
            .unwrap();

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(source.description(), "channel: test");
    }

    #[test]
    fn test_channel_source_keeps_latest_only() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();

        tx.send(MetricSnapshot::new().with_gauge("a.b.c", 1)).unwrap();
        tx.send(MetricSnapshot::new().with_gauge("a.b.c", 2)).unwrap();

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.number("a.b.c"), Some(2.0));
        assert!(source.poll().is_none());
    }
}
