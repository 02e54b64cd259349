//! Dashboard configuration, read from an optional JSON file.

use crate::data::loader::{DataSources, DEFAULT_DATE_FORMAT};
use crate::stats::{DEFAULT_BINS, DEFAULT_PEAK_HOURS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("histogram_bins must be at least 1")]
    NoBins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub day_csv: PathBuf,
    pub hour_csv: PathBuf,
    pub date_format: String,
    pub histogram_bins: usize,
    pub peak_hours: usize,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            day_csv: PathBuf::from("day.csv"),
            hour_csv: PathBuf::from("hour.csv"),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            histogram_bins: DEFAULT_BINS,
            peak_hours: DEFAULT_PEAK_HOURS,
            export_width: 1000,
            export_height: 500,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::NoBins);
        }
        Ok(())
    }

    pub fn sources(&self) -> DataSources {
        DataSources::new(&self.day_csv, &self.hour_csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = DashboardConfig::from_json(r#"{ "day_csv": "data/day.csv" }"#).unwrap();
        assert_eq!(config.day_csv, PathBuf::from("data/day.csv"));
        assert_eq!(config.hour_csv, PathBuf::from("hour.csv"));
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.peak_hours, 3);
        assert_eq!(config.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_zero_bins_rejected() {
        let err = DashboardConfig::from_json(r#"{ "histogram_bins": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoBins));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DashboardConfig::from_json("{ day_csv: "),
            Err(ConfigError::Parse { .. })
        ));
    }
}
