//! The main entry point for reading source data as of a forecast issue date.

use crate::config::DataRoot;
use crate::error::WaterSupplyError;
use crate::parsers::error::ParseError;
use crate::readers::cache::TableCache;
use crate::sites::store::SiteStore;
use crate::stations::selection::{StationMapping, StationSelector, DEFAULT_BUFFER_METERS};
use crate::stations::station::{load_stations, MonitoringStation};
use crate::types::data_source::DataSource;
use crate::types::issue_date::{resolve_issue_date, AnyIssueDate};
use bon::bon;
use polars::prelude::DataFrame;
use std::path::Path;

/// Client for reading water supply forecast source data.
///
/// Every `read_*` method returns only the rows that were knowable on the given
/// issue date, ordered by their time key. Reads are synchronous and parse the
/// source file on each call unless the table cache is enabled with
/// [`WaterSupplyData::with_table_cache`].
///
/// # Examples
///
/// ```no_run
/// # use watersupply::{WaterSupplyData, WaterSupplyError};
/// # fn run() -> Result<(), WaterSupplyError> {
/// let data = WaterSupplyData::new();
/// let pdo = data.read_pdo_data("2021-03-15", None)?;
/// let flow = data.read_usgs_streamflow_data("animas_r_at_durango", "2021-03-15")?;
/// # Ok(())
/// # }
/// ```
pub struct WaterSupplyData {
    pub(crate) data_root: DataRoot,
    pub(crate) sites: SiteStore,
    tables: TableCache,
}

impl Default for WaterSupplyData {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl WaterSupplyData {
    /// Creates a client rooted at `WSFR_DATA_ROOT`, or `./data` when unset.
    pub fn new() -> Self {
        Self::with_data_root(DataRoot::from_env())
    }

    /// Creates a client reading from an explicit data root.
    pub fn with_data_root(data_root: impl Into<DataRoot>) -> Self {
        let data_root = data_root.into();
        Self {
            sites: SiteStore::new(data_root.clone()),
            tables: TableCache::new(false),
            data_root,
        }
    }

    /// Replaces the site store, e.g. to share one between clients.
    pub fn with_site_store(mut self, sites: SiteStore) -> Self {
        self.sites = sites;
        self
    }

    /// Keeps fully parsed source tables in memory, keyed by file path.
    pub fn with_table_cache(mut self, enabled: bool) -> Self {
        self.tables = TableCache::new(enabled);
        self
    }

    pub fn data_root(&self) -> &DataRoot {
        &self.data_root
    }

    pub fn sites(&self) -> &SiteStore {
        &self.sites
    }

    pub fn clear_table_cache(&self) {
        self.tables.clear();
    }

    /// CPC climate divisions whose polygon intersects the site's drainage basin.
    ///
    /// # Errors
    ///
    /// Returns [`WaterSupplyError::Site`] for an unknown site or unreadable layers.
    pub fn climate_divisions_for_site(&self, site_id: &str) -> Result<Vec<i32>, WaterSupplyError> {
        Ok(self.sites.climate_divisions_for_site(site_id)?.to_vec())
    }

    /// Reads any source by its [`DataSource`] variant.
    ///
    /// Global indices validate `site_id` when one is given but otherwise ignore
    /// it. Site-bound sources fail with [`WaterSupplyError::SiteRequired`]
    /// without one.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use watersupply::{DataSource, WaterSupplyData, WaterSupplyError};
    /// # fn run() -> Result<(), WaterSupplyError> {
    /// let data = WaterSupplyData::new();
    /// let oni = data.read(DataSource::Oni, "2021-03-15", None)?;
    /// let snow = data.read(DataSource::Snotel, "2021-03-15", Some("animas_r_at_durango"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn read(
        &self,
        source: DataSource,
        issue_date: impl AnyIssueDate,
        site_id: Option<&str>,
    ) -> Result<DataFrame, WaterSupplyError> {
        let issue_date = resolve_issue_date(issue_date)?;
        let required_site = || site_id.ok_or(WaterSupplyError::SiteRequired(source));
        match source {
            DataSource::Mjo => self.read_mjo_data(issue_date, site_id),
            DataSource::NinoRegionsSst => self.read_nino_regions_sst_data(issue_date, site_id),
            DataSource::Oni => self.read_oni_data(issue_date, site_id),
            DataSource::Pdo => self.read_pdo_data(issue_date, site_id),
            DataSource::Pna => self.read_pna_data(issue_date, site_id),
            DataSource::Soi => self.read_soi_data(issue_date, site_id),
            DataSource::CpcOutlooks {
                variable,
                fy_start_month,
            } => self
                .cpc_outlooks()
                .variable(variable)
                .issue_date(issue_date)
                .maybe_site_id(site_id)
                .fy_start_month(fy_start_month)
                .call(),
            DataSource::UsgsStreamflow => {
                self.read_usgs_streamflow_data(required_site()?, issue_date)
            }
            DataSource::NaturalizedFlow => {
                self.read_test_monthly_naturalized_flow(required_site()?, issue_date)
            }
            DataSource::Snotel => self.read_snotel_data(issue_date, Some(required_site()?)),
        }
    }

    /// Links stations to sites whose basin contains them or lies within the buffer.
    ///
    /// # Arguments
    ///
    /// * `stations` - Station locations. Defaults to the SNOTEL station metadata file.
    /// * `buffer_meters` - Buffer around each basin. Defaults to 40 miles
    ///   ([`DEFAULT_BUFFER_METERS`]); zero keeps only stations inside a basin.
    ///
    /// # Errors
    ///
    /// Fails when the basin layer or the default station file cannot be read.
    #[builder]
    pub fn select_stations(
        &self,
        stations: Option<Vec<MonitoringStation>>,
        buffer_meters: Option<f64>,
    ) -> Result<StationMapping, WaterSupplyError> {
        let stations = match stations {
            Some(stations) => stations,
            None => load_stations(&self.data_root.snotel_station_metadata_file())?,
        };
        let basins = self.sites.basins()?;
        let selector = StationSelector::new(stations);
        Ok(selector.select(&basins, buffer_meters.unwrap_or(DEFAULT_BUFFER_METERS)))
    }

    pub(crate) fn load_table(
        &self,
        path: &Path,
        parse: impl FnOnce(&Path) -> Result<DataFrame, ParseError>,
    ) -> Result<DataFrame, WaterSupplyError> {
        Ok(self.tables.get_or_load(path, parse)?)
    }

    /// Fails with an unknown-site error if a site is given and not in the metadata.
    pub(crate) fn check_site(&self, site_id: Option<&str>) -> Result<(), WaterSupplyError> {
        if let Some(site_id) = site_id {
            self.sites.validate_site(site_id)?;
        }
        Ok(())
    }
}
