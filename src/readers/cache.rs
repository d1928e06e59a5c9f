use polars::prelude::DataFrame;
use std::collections::{hash_map::Entry, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Optional memo of fully parsed source tables, keyed by file path.
///
/// Disabled caches always call the loader.
pub(crate) struct TableCache {
    enabled: bool,
    tables: Mutex<HashMap<PathBuf, DataFrame>>,
}

impl TableCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            tables: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, DataFrame>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_or_load<E>(
        &self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<DataFrame, E>,
    ) -> Result<DataFrame, E> {
        if !self.enabled {
            return load(path);
        }
        if let Some(cached) = self.lock().get(path) {
            return Ok(cached.clone());
        }

        let loaded = load(path)?;

        match self.lock().entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(loaded.clone());
                Ok(loaded)
            }
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_loads_once_when_enabled() {
        let cache = TableCache::new(true);
        let calls = Cell::new(0);
        let load = |_: &Path| -> Result<DataFrame, ()> {
            calls.set(calls.get() + 1);
            Ok(DataFrame::empty())
        };
        cache.get_or_load(Path::new("a"), load).unwrap();
        cache.get_or_load(Path::new("a"), load).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        cache.get_or_load(Path::new("a"), load).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_disabled_always_loads() {
        let cache = TableCache::new(false);
        let calls = Cell::new(0);
        let load = |_: &Path| -> Result<DataFrame, ()> {
            calls.set(calls.get() + 1);
            Ok(DataFrame::empty())
        };
        cache.get_or_load(Path::new("a"), load).unwrap();
        cache.get_or_load(Path::new("a"), load).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 0);
    }
}
