//! Dashboard Configuration
//! Input file locations and parsing options, read from an optional JSON file.

use crate::data::normalize::DEFAULT_DATE_FORMAT;
use crate::data::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Delimiter {0:?} must be a single ASCII character")]
    InvalidDelimiter(char),
    #[error("Date format must not be empty")]
    EmptyDateFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub financial_path: PathBuf,
    pub gps_path: PathBuf,
    pub delimiter: char,
    pub date_format: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            financial_path: PathBuf::from("keuangan_data.csv"),
            gps_path: PathBuf::from("data_gps.csv"),
            delimiter: ',',
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Looked up in the working directory when no path is given.
    pub const DEFAULT_FILE: &'static str = "dashboard.json";

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit path, else `dashboard.json` if present, else defaults.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(&path),
            None => {
                let default = Path::new(Self::DEFAULT_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validated options for the loaders.
    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let control = self.delimiter.is_ascii_control() && self.delimiter != '\t';
        if !self.delimiter.is_ascii() || control {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::EmptyDateFormat);
        }

        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            date_format: self.date_format.clone(),
        })
    }
}
