//! Raw Table Loader Module
//! Reads delimited files with Polars and resolves their headers to canonical fields.

use crate::data::aliases::HeaderAliases;
use crate::data::normalize::DEFAULT_DATE_FORMAT;
use polars::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Cause of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    IoFailure,
    Malformed,
    MissingColumn,
}

impl LoadError {
    pub fn kind(&self) -> LoadFailure {
        match self {
            LoadError::Io { .. } => LoadFailure::IoFailure,
            LoadError::Malformed { .. } => LoadFailure::Malformed,
            LoadError::MissingColumn { .. } => LoadFailure::MissingColumn,
        }
    }

    /// File the failure refers to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Malformed { path, .. }
            | LoadError::MissingColumn { path, .. } => path,
        }
    }
}

/// Load succeeded but nothing survived cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyResultWarning {
    pub path: PathBuf,
    pub discarded_rows: usize,
}

impl fmt::Display for EmptyResultWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No valid rows in {} ({} discarded)",
            self.path.display(),
            self.discarded_rows
        )
    }
}

/// Counters for field-level coercions applied while cleaning a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionReport {
    pub raw_rows: usize,
    pub dropped_rows: usize,
    pub zero_filled: usize,
    pub sentinel_filled: usize,
}

impl CoercionReport {
    pub fn kept_rows(&self) -> usize {
        self.raw_rows - self.dropped_rows
    }
}

/// A cleaned, immutable table plus the recoverable warning, if any.
#[derive(Debug)]
pub struct Loaded<T> {
    pub table: Arc<T>,
    pub warning: Option<EmptyResultWarning>,
}

impl<T> Clone for Loaded<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            warning: self.warning.clone(),
        }
    }
}

/// Parsing options shared by both loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub date_format: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// An all-text DataFrame with its headers resolved to canonical fields.
pub struct RawTable {
    path: PathBuf,
    df: DataFrame,
    fields: HashMap<&'static str, String>,
}

impl RawTable {
    /// Read a delimited file, keeping every column as text.
    pub fn read(path: &Path, delimiter: u8, aliases: &HeaderAliases) -> Result<Self, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        // Schema inference length 0 reads every column as String
        let df = LazyCsvReader::new(path)
            .with_separator(delimiter)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let mut fields = HashMap::new();
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for header in headers {
            let Some(canonical) = aliases.resolve(&header) else {
                debug!(file = %path.display(), column = %header, "ignoring unmapped column");
                continue;
            };

            match fields.entry(canonical) {
                Entry::Vacant(slot) => {
                    slot.insert(header);
                }
                Entry::Occupied(kept) => {
                    warn!(
                        file = %path.display(),
                        kept = %kept.get(),
                        ignored = %header,
                        "two columns resolve to '{}'; keeping the first",
                        canonical
                    );
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            df,
            fields,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of data rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Text values of a canonical field, `None` when the file lacks it.
    pub fn text(&self, canonical: &str) -> Result<Option<&StringChunked>, LoadError> {
        let Some(raw_name) = self.fields.get(canonical) else {
            return Ok(None);
        };

        self.df
            .column(raw_name)
            .and_then(|column| column.as_materialized_series().str())
            .map(Some)
            .map_err(|source| LoadError::Malformed {
                path: self.path.clone(),
                source,
            })
    }

    /// Like [`RawTable::text`], but a missing field is a load failure.
    pub fn require(&self, canonical: &'static str) -> Result<&StringChunked, LoadError> {
        self.text(canonical)?.ok_or_else(|| LoadError::MissingColumn {
            path: self.path.clone(),
            column: canonical,
        })
    }
}
