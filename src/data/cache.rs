//! Table Cache
//! Memoizes cleaned tables keyed by path and file modification signature.

use crate::data::loader::{LoadError, Loaded};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Identity of a file's contents as far as the cache is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileSignature {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct CacheEntry<T> {
    signature: FileSignature,
    loaded: Loaded<T>,
}

/// Per-loader cache of cleaned tables.
pub struct TableCache<T> {
    entries: HashMap<PathBuf, CacheEntry<T>>,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TableCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached table for `path`, or run `load` if the file is new or changed.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Loaded<T>, LoadError>
    where
        F: FnOnce(&Path) -> Result<Loaded<T>, LoadError>,
    {
        let signature = FileSignature::of(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(entry) = self.entries.get(path) {
            if entry.signature == signature {
                debug!(file = %path.display(), "cache hit");
                return Ok(entry.loaded.clone());
            }
        }

        debug!(file = %path.display(), "cache miss");
        let loaded = load(path)?;
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                signature,
                loaded: loaded.clone(),
            },
        );
        Ok(loaded)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn counting_load(calls: &Cell<usize>) -> impl Fn(&Path) -> Result<Loaded<usize>, LoadError> + '_ {
        move |_| {
            calls.set(calls.get() + 1);
            Ok(Loaded {
                table: Arc::new(calls.get()),
                warning: None,
            })
        }
    }

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();

        let calls = Cell::new(0);
        let mut cache = TableCache::new();
        let first = cache.get_or_load(file.path(), counting_load(&calls)).unwrap();
        let second = cache.get_or_load(file.path(), counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first.table, &second.table));
    }

    #[test]
    fn changed_file_is_reloaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();

        let calls = Cell::new(0);
        let mut cache = TableCache::new();
        cache.get_or_load(file.path(), counting_load(&calls)).unwrap();

        writeln!(file, "1,2").unwrap();
        file.flush().unwrap();
        let reloaded = cache.get_or_load(file.path(), counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(*reloaded.table, 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let file = NamedTempFile::new().unwrap();
        let calls = Cell::new(0);
        let mut cache = TableCache::new();

        cache.get_or_load(file.path(), counting_load(&calls)).unwrap();
        assert!(cache.invalidate(file.path()));
        assert!(!cache.invalidate(file.path()));
        cache.get_or_load(file.path(), counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let file = NamedTempFile::new().unwrap();
        let mut cache: TableCache<usize> = TableCache::new();

        let result = cache.get_or_load(file.path(), |path| {
            Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: "date",
            })
        });

        assert!(result.is_err());
        assert!(!cache.invalidate(file.path()));
    }

    #[test]
    fn missing_file_fails_before_loading() {
        let calls = Cell::new(0);
        let mut cache = TableCache::new();
        let result = cache.get_or_load(Path::new("nope/missing.csv"), counting_load(&calls));

        assert!(result.is_err());
        assert_eq!(calls.get(), 0);
    }
}
