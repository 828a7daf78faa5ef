//! File-based data source.
//!
//! Polls a JSON file for metric snapshots.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::DataSource;
use crate::metrics::MetricSnapshot;

/// A data source that re-reads a JSON snapshot file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<MetricSnapshot> {
        match MetricSnapshot::load(&self.path) {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to load snapshot");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<MetricSnapshot> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            // file disappeared, keep what we have
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(snapshot) = self.read_file() {
                self.last_modified = current_modified;
                return Some(snapshot);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "gauges": {
                "gauge.hystrix.HystrixCommand.svcA.readX.requestCount": {"value": 100}
            }
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/metrics.json");
        assert_eq!(source.path(), Path::new("/tmp/metrics.json"));
        assert_eq!(source.description(), "file: /tmp/metrics.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let snapshot = source.poll().unwrap();
        assert!(snapshot.contains("gauge.hystrix.HystrixCommand.svcA.readX.requestCount"));

        // unchanged file yields nothing new
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let _ = source.poll();

        std::thread::sleep(std::time::Duration::from_millis(10));
        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(
            file,
            r#"{{"gauges": {{"gauge.hystrix.HystrixThreadPool.svcB.currentPoolSize": {{"value": 8}}}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        // Note: may not fire on filesystems with coarse mtime resolution
        if let Some(s) = source.poll() {
            assert!(s.contains("gauge.hystrix.HystrixThreadPool.svcB.currentPoolSize"));
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/metrics.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
