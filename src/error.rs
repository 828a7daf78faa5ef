//! Error types for the library boundary.
//!
//! The dashboard core never fails: missing metrics, malformed names and
//! degenerate arithmetic are all resolved locally. These errors only cover
//! the edges where bytes come in (snapshot files) or settings are loaded.

use thiserror::Error;

/// Errors raised while loading snapshots or settings.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a snapshot file failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot was not valid JSON or had the wrong shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Layered settings could not be built or deserialized.
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Result alias used by the library.
pub type Result<T> = std::result::Result<T, Error>;
