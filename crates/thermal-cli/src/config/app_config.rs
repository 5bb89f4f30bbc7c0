//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use thermal_image::TemperatureRange;

use super::validation::validate_setting;

/// Runtime configuration; command-line flags take precedence over it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub min_temp: f64,
    pub max_temp: f64,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let range = TemperatureRange::default();
        Self {
            min_temp: range.min,
            max_temp: range.max,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or invalid values.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring {key}={value:?}: {e}");
                    None
                }
            }
        };

        let defaults = Self::default();
        Self {
            min_temp: g("THERMAL_MIN_TEMP")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_temp),
            max_temp: g("THERMAL_MAX_TEMP")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_temp),
            output_dir: g("THERMAL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// Temperature range with optional per-invocation overrides.
    pub fn range(&self, min_temp: Option<f64>, max_temp: Option<f64>) -> TemperatureRange {
        TemperatureRange::new(
            min_temp.unwrap_or(self.min_temp),
            max_temp.unwrap_or(self.max_temp),
        )
    }
}
