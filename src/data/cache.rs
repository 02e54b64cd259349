//! Dataset Cache Module
//! Memoizes loaded rental tables per pair of source files, so repeated
//! requests from the dashboard never re-read unchanged CSVs.

use crate::data::loader::{DataLoader, DataSources, LoaderError, RentalTables};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of one source file: where it is and what it looked like on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self, LoaderError> {
        let not_found = |source| LoaderError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        };
        let metadata = std::fs::metadata(path).map_err(not_found)?;
        let path = std::fs::canonicalize(path).map_err(not_found)?;

        Ok(Self {
            path,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Cache key: the fingerprints of the daily and hourly sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub daily: SourceFingerprint,
    pub hourly: SourceFingerprint,
}

impl CacheKey {
    pub fn for_sources(sources: &DataSources) -> Result<Self, LoaderError> {
        Ok(Self {
            daily: SourceFingerprint::of(&sources.daily)?,
            hourly: SourceFingerprint::of(&sources.hourly)?,
        })
    }
}

/// Memoizing front of [`DataLoader`]. Built once at startup and shared.
pub struct DatasetCache {
    loader: DataLoader,
    entries: Mutex<HashMap<CacheKey, Arc<RentalTables>>>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the tables for these sources, loading them on first use.
    pub fn get_or_load(&self, sources: &DataSources) -> Result<Arc<RentalTables>, LoaderError> {
        let key = CacheKey::for_sources(sources)?;

        if let Some(tables) = self.lock_entries().get(&key) {
            debug!(daily = %key.daily.path.display(), hourly = %key.hourly.path.display(), "Dataset cache hit");
            return Ok(Arc::clone(tables));
        }

        let tables = Arc::new(self.loader.load_tables(sources)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(
            daily = %key.daily.path.display(),
            hourly = %key.hourly.path.display(),
            "Dataset cache filled"
        );

        self.lock_entries().insert(key, Arc::clone(&tables));
        Ok(tables)
    }

    /// Number of times the underlying loader actually ran.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<RentalTables>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DataLoader::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_sources() -> DataSources {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        DataSources::new(dir.join("day.csv"), dir.join("hour.csv"))
    }

    #[test]
    fn test_second_request_is_served_from_cache() {
        let cache = DatasetCache::default();
        let sources = fixture_sources();

        let first = cache.get_or_load(&sources).unwrap();
        let second = cache.get_or_load(&sources).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_source_is_read_again() {
        let dir = std::env::temp_dir().join(format!("bikeshare-cache-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let fixtures = fixture_sources();
        let sources = DataSources::new(dir.join("day.csv"), dir.join("hour.csv"));
        std::fs::copy(&fixtures.daily, &sources.daily).unwrap();
        std::fs::copy(&fixtures.hourly, &sources.hourly).unwrap();

        let cache = DatasetCache::default();
        let before = cache.get_or_load(&sources).unwrap();

        let mut day = std::fs::OpenOptions::new()
            .append(true)
            .open(&sources.daily)
            .unwrap();
        writeln!(
            day,
            "7,2011-12-26,1,0,12,0,1,1,1,0.3,0.3,0.5,0.1,100,900,1000"
        )
        .unwrap();
        drop(day);

        let after = cache.get_or_load(&sources).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(cache.load_count(), 2);
        assert_eq!(before.daily().height(), 6);
        assert_eq!(after.daily().height(), 7);
    }

    #[test]
    fn test_missing_source_is_not_cached() {
        let cache = DatasetCache::default();
        let sources = DataSources::new("missing/day.csv", fixture_sources().hourly);

        let err = cache.get_or_load(&sources).unwrap_err();
        assert!(matches!(err, LoaderError::SourceNotFound { .. }));
        assert!(cache.is_empty());
        assert_eq!(cache.load_count(), 0);
    }
}
