//! Monitoring stations as points for spatial indexing.

use crate::parsers::csv::{optional_string_column, parse_optional_float, read_csv_as_strings, string_column_any};
use crate::stations::error::StationError;
use geo::Point;
use log::warn;
use rstar::{PointDistance, RTreeObject, AABB};
use std::path::Path;

/// A point station, such as a SNOTEL site, located by longitude and latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringStation {
    /// Station identifier, e.g. the SNOTEL triplet `713:CO:SNTL`.
    pub id: String,
    pub name: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
}

impl MonitoringStation {
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            longitude,
            latitude,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// The envelope is the degenerate box at `[longitude, latitude]`.
impl RTreeObject for MonitoringStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.longitude, self.latitude])
    }
}

/// Squared distance in degree space, only used for candidate search.
impl PointDistance for MonitoringStation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.longitude - point[0];
        let dy = self.latitude - point[1];
        dx * dx + dy * dy
    }
}

/// Loads station locations from a CSV with an id column (`stationTriplet`,
/// `station_id` or `id`) plus `longitude` and `latitude`. Rows with missing or
/// non-finite coordinates are skipped.
pub fn load_stations(path: &Path) -> Result<Vec<MonitoringStation>, StationError> {
    let raw = read_csv_as_strings(path)?;
    let ids = string_column_any(&raw, path, &["stationTriplet", "station_id", "id"])?;
    let longitudes = string_column_any(&raw, path, &["longitude", "lon"])?;
    let latitudes = string_column_any(&raw, path, &["latitude", "lat"])?;
    let names = optional_string_column(&raw, path, "name")?;

    let mut stations = Vec::with_capacity(raw.height());
    for row in 0..raw.height() {
        let id = ids.get(row).map(str::trim).filter(|id| !id.is_empty());
        let longitude = parse_optional_float(longitudes.get(row)).filter(|v| v.is_finite());
        let latitude = parse_optional_float(latitudes.get(row)).filter(|v| v.is_finite());
        match (id, longitude, latitude) {
            (Some(id), Some(longitude), Some(latitude)) => stations.push(MonitoringStation {
                id: id.to_string(),
                name: names.and_then(|n| n.get(row)).map(str::to_string),
                longitude,
                latitude,
            }),
            _ => warn!("Skipping station row {} of {}", row + 2, path.display()),
        }
    }
    Ok(stations)
}
