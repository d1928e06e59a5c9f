//! Read-through store for site metadata and geospatial layers.

use crate::config::DataRoot;
use crate::sites::error::SiteError;
use crate::sites::geospatial::{BasinLayer, ClimateDivisionLayer, SitePointLayer};
use crate::sites::metadata::{Site, SiteMetadata};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lazily loaded, shared value.
struct Slot<T> {
    value: Mutex<Option<Arc<T>>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_or_load(
        &self,
        load: impl FnOnce() -> Result<T, SiteError>,
    ) -> Result<Arc<T>, SiteError> {
        if let Some(value) = self.lock().as_ref() {
            return Ok(Arc::clone(value));
        }
        // Loaded outside the lock. If another caller won the race, theirs is kept.
        let loaded = Arc::new(load()?);
        Ok(Arc::clone(self.lock().get_or_insert(loaded)))
    }

    fn clear(&self) {
        self.lock().take();
    }
}

/// Site metadata, basins, site points and climate divisions, each loaded on
/// first use and kept until [`SiteStore::invalidate`].
pub struct SiteStore {
    data_root: DataRoot,
    metadata: Slot<SiteMetadata>,
    basins: Slot<BasinLayer>,
    site_points: Slot<SitePointLayer>,
    climate_divisions: Slot<ClimateDivisionLayer>,
    site_divisions: Mutex<HashMap<String, Arc<Vec<i32>>>>,
}

impl SiteStore {
    pub fn new(data_root: DataRoot) -> Self {
        Self {
            data_root,
            metadata: Slot::new(),
            basins: Slot::new(),
            site_points: Slot::new(),
            climate_divisions: Slot::new(),
            site_divisions: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_root(&self) -> &DataRoot {
        &self.data_root
    }

    pub fn metadata(&self) -> Result<Arc<SiteMetadata>, SiteError> {
        self.metadata.get_or_load(|| {
            let path = self.data_root.metadata_file();
            debug!("Loading site metadata from {}", path.display());
            SiteMetadata::read_csv(&path)
        })
    }

    pub fn basins(&self) -> Result<Arc<BasinLayer>, SiteError> {
        self.basins
            .get_or_load(|| BasinLayer::read(&self.data_root.geospatial_layer("basins")))
    }

    pub fn site_points(&self) -> Result<Arc<SitePointLayer>, SiteError> {
        self.site_points
            .get_or_load(|| SitePointLayer::read(&self.data_root.geospatial_layer("sites")))
    }

    pub fn climate_divisions(&self) -> Result<Arc<ClimateDivisionLayer>, SiteError> {
        self.climate_divisions
            .get_or_load(|| ClimateDivisionLayer::read(&self.data_root.climate_divisions_file()))
    }

    /// Looks up a site, failing with [`SiteError::UnknownSite`].
    pub fn site(&self, site_id: &str) -> Result<Site, SiteError> {
        self.metadata()?.get(site_id).cloned()
    }

    pub fn validate_site(&self, site_id: &str) -> Result<(), SiteError> {
        self.metadata()?.get(site_id).map(|_| ())
    }

    /// Climate divisions whose area intersects the site's drainage basin.
    ///
    /// A known site without a basin polygon has no divisions.
    pub fn climate_divisions_for_site(&self, site_id: &str) -> Result<Arc<Vec<i32>>, SiteError> {
        self.validate_site(site_id)?;
        if let Some(found) = self.division_cache().get(site_id) {
            return Ok(Arc::clone(found));
        }

        let divisions = match self.basins()?.get(site_id) {
            Some(basin) => self.climate_divisions()?.intersecting(basin),
            None => {
                warn!("No basin polygon for site '{site_id}'");
                Vec::new()
            }
        };
        debug!("Site '{site_id}' overlaps climate divisions {divisions:?}");
        let divisions = Arc::new(divisions);
        Ok(Arc::clone(
            self.division_cache()
                .entry(site_id.to_string())
                .or_insert(divisions),
        ))
    }

    fn division_cache(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<i32>>>> {
        self.site_divisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops everything loaded so far. The next access reads from disk again.
    pub fn invalidate(&self) {
        self.metadata.clear();
        self.basins.clear();
        self.site_points.clear();
        self.climate_divisions.clear();
        self.division_cache().clear();
    }

    /// Invalidates and eagerly reloads the metadata and basin layer.
    pub fn reload(&self) -> Result<(), SiteError> {
        self.invalidate();
        let metadata = self.metadata()?;
        let basins = self.basins()?;
        info!(
            "Reloaded {} sites and {} basins from {}",
            metadata.len(),
            basins.len(),
            self.data_root.path().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_file, SourceFixture};

    #[test]
    fn test_unknown_site() {
        let fixture = SourceFixture::new();
        let store = SiteStore::new(fixture.root().clone());
        assert!(matches!(
            store.validate_site("not_a_site"),
            Err(SiteError::UnknownSite(_))
        ));
        assert!(store.validate_site("dry_creek").is_ok());
    }

    #[test]
    fn test_divisions_cached_until_invalidated() -> Result<(), SiteError> {
        let fixture = SourceFixture::new();
        let store = SiteStore::new(fixture.root().clone());
        let first = store.climate_divisions_for_site("animas_r_at_durango")?;
        assert_eq!(*first, vec![1, 2]);
        let second = store.climate_divisions_for_site("animas_r_at_durango")?;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.climate_divisions_for_site("dry_creek")?.is_empty());

        store.invalidate();
        let third = store.climate_divisions_for_site("animas_r_at_durango")?;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*third, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_reload_picks_up_changes() -> Result<(), SiteError> {
        let fixture = SourceFixture::new();
        let store = SiteStore::new(fixture.root().clone());
        assert_eq!(store.metadata()?.len(), 2);
        write_file(
            fixture.root().path(),
            "metadata.csv",
            "site_id,usgs_id,season_start_month,season_end_month\nonly_site,,4,7\n",
        );
        assert_eq!(store.metadata()?.len(), 2, "stale until reloaded");
        store.invalidate();
        assert_eq!(store.metadata()?.len(), 1);
        assert!(store.reload().is_ok());
        Ok(())
    }
}
