//! Stream-based data source.
//!
//! Receives metric snapshots from an async byte stream, one JSON document
//! per line. Useful for TCP connections or any pipe that pushes snapshots.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::DataSource;
use crate::metrics::MetricSnapshot;

type SharedError = Arc<Mutex<Option<String>>>;

/// A data source that receives snapshots from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader and makes snapshots available via `poll()`.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use circuitwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"gauges\": {}}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<MetricSnapshot>,
    description: String,
    shared_error: SharedError,
    last_error: Option<String>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Each line is parsed as a complete `MetricSnapshot`. Lines that fail
    /// to parse are skipped and reported through [`DataSource::error`].
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let shared_error: SharedError = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        set_error(&error_handle, Some("Connection closed".to_string()));
                        break;
                    }
                    Ok(_) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match MetricSnapshot::parse(line.trim()) {
                            Ok(snapshot) => {
                                set_error(&error_handle, None);
                                if tx.send(snapshot).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "skipping malformed snapshot line");
                                set_error(&error_handle, Some(e.to_string()));
                            }
                        }
                    }
                    Err(e) => {
                        set_error(&error_handle, Some(format!("Read error: {}", e)));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }

    /// Create a StreamSource from a channel of raw JSON documents.
    ///
    /// Useful when snapshots arrive from a transport that is not an
    /// `AsyncRead`, such as an HTTP poller.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, snapshot_rx) = mpsc::channel(16);
        let shared_error: SharedError = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<MetricSnapshot>(&bytes) {
                    Ok(snapshot) => {
                        set_error(&error_handle, None);
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        set_error(&error_handle, Some(format!("Parse error: {}", e)));
                    }
                }
            }
        });

        Self {
            receiver: snapshot_rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }

    fn sync_error(&mut self) {
        if let Ok(guard) = self.shared_error.lock() {
            self.last_error = guard.clone();
        }
    }
}

fn set_error(handle: &SharedError, error: Option<String>) {
    if let Ok(mut guard) = handle.lock() {
        *guard = error;
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<MetricSnapshot> {
        let result = match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // keep the task's reason if it left one
                if let Ok(mut guard) = self.shared_error.lock() {
                    guard.get_or_insert_with(|| "Stream disconnected".to_string());
                }
                None
            }
        };
        self.sync_error();
        result
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
