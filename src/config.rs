//! Resolution of the data directory and the fixed layout of source files beneath it.

use crate::types::data_source::OutlookVariable;
use log::info;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the data root.
pub const DATA_ROOT_ENV_VAR: &str = "WSFR_DATA_ROOT";

/// Root directory holding every raw source file.
///
/// Paths are derived from a fixed layout:
///
/// ```text
/// metadata.csv
/// geospatial/{basins,sites}.geojson
/// cpc_climate_divisions.geojson
/// teleconnections/{mjo,nino_regions_sst,oni,pdo,pna,soi}.txt
/// cpc_outlooks/cpcllftd.{year}.dat, cpc_outlooks/cpcllfpd.{year}.dat
/// usgs_streamflow/FY{year}/{site_id}.csv
/// test_monthly_naturalized_flow.csv
/// snotel/sites_to_snotel_stations.csv, snotel/station_metadata.csv
/// snotel/FY{year}/{triplet}.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads `WSFR_DATA_ROOT`, falling back to `./data` under the working directory.
    pub fn from_env() -> Self {
        let root = match env::var_os(DATA_ROOT_ENV_VAR) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("data"),
        };
        info!("Using data root {}", root.display());
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.root.join("metadata.csv")
    }

    pub fn geospatial_layer(&self, layer: &str) -> PathBuf {
        self.root.join("geospatial").join(format!("{layer}.geojson"))
    }

    pub fn climate_divisions_file(&self) -> PathBuf {
        self.root.join("cpc_climate_divisions.geojson")
    }

    pub fn teleconnection_file(&self, name: &str) -> PathBuf {
        self.root.join("teleconnections").join(format!("{name}.txt"))
    }

    pub fn cpc_outlook_file(&self, variable: OutlookVariable, year: i32) -> PathBuf {
        self.root
            .join("cpc_outlooks")
            .join(format!("{}.{year}.dat", variable.file_prefix()))
    }

    pub fn usgs_streamflow_file(&self, site_id: &str, forecast_year: i32) -> PathBuf {
        self.root
            .join("usgs_streamflow")
            .join(format!("FY{forecast_year}"))
            .join(format!("{site_id}.csv"))
    }

    pub fn naturalized_flow_file(&self) -> PathBuf {
        self.root.join("test_monthly_naturalized_flow.csv")
    }

    pub fn snotel_mapping_file(&self) -> PathBuf {
        self.root.join("snotel").join("sites_to_snotel_stations.csv")
    }

    pub fn snotel_station_metadata_file(&self) -> PathBuf {
        self.root.join("snotel").join("station_metadata.csv")
    }

    /// Station triplets such as `713:CO:SNTL` are stored with `:` replaced by `_`.
    pub fn snotel_station_file(&self, station_triplet: &str, forecast_year: i32) -> PathBuf {
        self.root
            .join("snotel")
            .join(format!("FY{forecast_year}"))
            .join(format!("{}.csv", station_triplet.replace(':', "_")))
    }
}

impl Default for DataRoot {
    fn default() -> Self {
        Self::from_env()
    }
}

impl From<PathBuf> for DataRoot {
    fn from(root: PathBuf) -> Self {
        Self::new(root)
    }
}

impl From<&Path> for DataRoot {
    fn from(root: &Path) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let root = DataRoot::new("/data");
        assert_eq!(root.metadata_file(), PathBuf::from("/data/metadata.csv"));
        assert_eq!(
            root.teleconnection_file("pdo"),
            PathBuf::from("/data/teleconnections/pdo.txt")
        );
        assert_eq!(
            root.cpc_outlook_file(OutlookVariable::Precipitation, 2021),
            PathBuf::from("/data/cpc_outlooks/cpcllfpd.2021.dat")
        );
        assert_eq!(
            root.usgs_streamflow_file("animas_r_at_durango", 2021),
            PathBuf::from("/data/usgs_streamflow/FY2021/animas_r_at_durango.csv")
        );
        assert_eq!(
            root.snotel_station_file("713:CO:SNTL", 2021),
            PathBuf::from("/data/snotel/FY2021/713_CO_SNTL.csv")
        );
    }
}
