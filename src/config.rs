//! Layered settings.
//!
//! Built-in defaults, then an optional TOML file, then `CIRCUITWATCH__*`
//! environment variables (`__` separates nested keys, e.g.
//! `CIRCUITWATCH__DASHBOARD__HISTORY_CAPACITY=100`).

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_SPARKLINE_WINDOW_MS};
use crate::metrics::key::DEFAULT_ALTERNATE_MARKER;

const ENV_PREFIX: &str = "CIRCUITWATCH";

/// Terminal colour theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Auto,
    Dark,
    Light,
}

/// Tunables of the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Points kept per sparkline.
    pub history_capacity: usize,
    /// Trailing window plotted by sparklines.
    pub sparkline_window_ms: u64,
    /// Per-host request rate at which a circuit's circle reaches full size.
    pub circuit_scale_max: f64,
    /// Same for thread pools.
    pub thread_pool_scale_max: f64,
    /// Field that confirms the alternate publisher naming scheme.
    pub alternate_marker_field: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sparkline_window_ms: DEFAULT_SPARKLINE_WINDOW_MS,
            circuit_scale_max: 400.0,
            thread_pool_scale_max: 2000.0,
            alternate_marker_field: DEFAULT_ALTERNATE_MARKER.to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Polling interval for file sources.
    pub refresh_ms: u64,
    pub theme: ThemeChoice,
    pub dashboard: DashboardConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            theme: ThemeChoice::Auto,
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, layering an optional TOML file and the environment
    /// over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse settings from TOML text layered over the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_ms, 1000);
        assert_eq!(settings.theme, ThemeChoice::Auto);
        assert_eq!(settings.dashboard.history_capacity, 200);
        assert_eq!(settings.dashboard.sparkline_window_ms, 120_000);
        assert_eq!(settings.dashboard.alternate_marker_field, "countShortCircuited");
    }

    #[test]
    fn test_load_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.dashboard.circuit_scale_max, 400.0);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            theme = "light"

            [dashboard]
            history_capacity = 50
            "#,
        )
        .unwrap();

        assert_eq!(settings.theme, ThemeChoice::Light);
        assert_eq!(settings.dashboard.history_capacity, 50);
        // untouched keys keep their defaults
        assert_eq!(settings.refresh_ms, 1000);
        assert_eq!(settings.dashboard.thread_pool_scale_max, 2000.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "refresh_ms = 250").unwrap();
        writeln!(file, "[dashboard]").unwrap();
        writeln!(file, "alternate_marker_field = \"rollingCountShortCircuited\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.refresh_ms, 250);
        assert_eq!(
            settings.dashboard.alternate_marker_field,
            "rollingCountShortCircuited"
        );
    }

    #[test]
    fn test_invalid_toml_is_settings_error() {
        let err = Settings::from_toml("refresh_ms = [").unwrap_err();
        assert!(matches!(err, crate::error::Error::Settings(_)));
    }
}
