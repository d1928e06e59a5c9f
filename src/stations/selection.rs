//! Spatial join of monitoring stations to site drainage basins.

use crate::parsers::csv::{parse_bool, read_csv_as_strings, string_column, string_column_any};
use crate::sites::geospatial::BasinLayer;
use crate::stations::error::StationError;
use crate::stations::projection::AlbersEqualArea;
use crate::stations::station::MonitoringStation;
use geo::{BoundingRect, EuclideanDistance, Intersects, MultiPolygon, Point};
use log::{debug, info, warn};
use polars::prelude::*;
use rstar::RTree;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

/// Default buffer around basins: 40 miles in meters.
pub const DEFAULT_BUFFER_METERS: f64 = 40.0 * 1609.344;

/// Conservative meters per degree used to size the candidate search.
const METERS_PER_DEGREE: f64 = 110_000.0;

/// A station associated with a site, `in_basin` when the station lies inside
/// or on the edge of the unbuffered basin polygon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SiteStationLink {
    pub site_id: String,
    pub station_id: String,
    pub in_basin: bool,
}

/// Site to station associations, unique per `(site_id, station_id)` and
/// ordered by site then station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationMapping {
    links: Vec<SiteStationLink>,
}

impl StationMapping {
    /// Duplicate pairs collapse into one link, tagged `in_basin` if any of them was.
    pub fn new(links: impl IntoIterator<Item = SiteStationLink>) -> Self {
        let mut merged: BTreeMap<(String, String), bool> = BTreeMap::new();
        for link in links {
            *merged.entry((link.site_id, link.station_id)).or_insert(false) |= link.in_basin;
        }
        Self {
            links: merged
                .into_iter()
                .map(|((site_id, station_id), in_basin)| SiteStationLink {
                    site_id,
                    station_id,
                    in_basin,
                })
                .collect(),
        }
    }

    pub fn links(&self) -> &[SiteStationLink] {
        &self.links
    }

    pub fn station_ids_for_site<'a>(&'a self, site_id: &str) -> Vec<&'a str> {
        self.links
            .iter()
            .filter(|link| link.site_id == site_id)
            .map(|link| link.station_id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "site_id".into(),
                self.links.iter().map(|l| l.site_id.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                "station_id".into(),
                self.links.iter().map(|l| l.station_id.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                "in_basin".into(),
                self.links.iter().map(|l| l.in_basin).collect::<Vec<bool>>(),
            ),
        ])
    }

    /// Writes `site_id`, `station_id`, `in_basin` as CSV, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), StationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StationError::MappingCreate(path.to_path_buf(), e))?;
        }
        let mut file =
            File::create(path).map_err(|e| StationError::MappingCreate(path.to_path_buf(), e))?;
        let mut frame = self
            .to_frame()
            .map_err(|e| StationError::MappingWrite(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| StationError::MappingWrite(path.to_path_buf(), e))?;
        info!("Wrote {} site-station links to {}", self.len(), path.display());
        Ok(())
    }

    /// Reads a mapping file. The station column may be named `station_id` or
    /// `stationTriplet`. A missing `in_basin` column reads as `true`.
    pub fn read_csv(path: &Path) -> Result<Self, StationError> {
        let raw = read_csv_as_strings(path)?;
        let sites = string_column(&raw, path, "site_id")?;
        let stations = string_column_any(&raw, path, &["station_id", "stationTriplet"])?;
        let in_basin = string_column(&raw, path, "in_basin").ok();

        let mut links = Vec::with_capacity(raw.height());
        for row in 0..raw.height() {
            let (Some(site_id), Some(station_id)) = (sites.get(row), stations.get(row)) else {
                warn!("Skipping mapping row {} of {}", row + 2, path.display());
                continue;
            };
            links.push(SiteStationLink {
                site_id: site_id.trim().to_string(),
                station_id: station_id.trim().to_string(),
                in_basin: in_basin
                    .and_then(|c| c.get(row))
                    .and_then(parse_bool)
                    .unwrap_or(true),
            });
        }
        Ok(Self::new(links))
    }
}

/// Finds stations within or near site basins.
pub struct StationSelector {
    tree: RTree<MonitoringStation>,
    projection: AlbersEqualArea,
}

impl StationSelector {
    pub fn new(stations: Vec<MonitoringStation>) -> Self {
        Self {
            tree: RTree::bulk_load(stations),
            projection: AlbersEqualArea::conus(),
        }
    }

    /// Links every station inside a basin, or within `buffer_meters` of it,
    /// to that basin's site. Distances are measured in the CONUS Albers
    /// projection. With a zero buffer only stations inside a basin are linked.
    pub fn select(&self, basins: &BasinLayer, buffer_meters: f64) -> StationMapping {
        let buffer_meters = buffer_meters.max(0.0);
        let mut links = Vec::new();
        for (site_id, basin) in basins.iter() {
            let before = links.len();
            self.select_for_basin(site_id, basin, buffer_meters, &mut links);
            debug!("Site '{site_id}': {} stations", links.len() - before);
        }
        let mapping = StationMapping::new(links);
        info!(
            "Linked {} stations to {} basins with a {buffer_meters} m buffer",
            mapping.len(),
            basins.len()
        );
        mapping
    }

    fn select_for_basin(
        &self,
        site_id: &str,
        basin: &MultiPolygon<f64>,
        buffer_meters: f64,
        links: &mut Vec<SiteStationLink>,
    ) {
        let Some(bounds) = basin.bounding_rect() else {
            return;
        };
        let max_abs_lat = bounds.min().y.abs().max(bounds.max().y.abs()).min(89.0);
        let pad_lat = buffer_meters / METERS_PER_DEGREE;
        let pad_lon = pad_lat / max_abs_lat.to_radians().cos().max(0.01);
        let center = bounds.center();
        let half_width = bounds.width() / 2.0 + pad_lon;
        let half_height = bounds.height() / 2.0 + pad_lat;
        let radius_2 = half_width * half_width + half_height * half_height;

        let projected_basin = (buffer_meters > 0.0).then(|| self.projection.project_multipolygon(basin));
        for station in self.tree.locate_within_distance([center.x, center.y], radius_2) {
            let point = station.point();
            let in_basin = basin.0.iter().any(|polygon| polygon.intersects(&point));
            let within_buffer = in_basin
                || projected_basin.as_ref().is_some_and(|projected| {
                    distance_to_area(self.projection.project_point(point), projected) <= buffer_meters
                });
            if within_buffer {
                links.push(SiteStationLink {
                    site_id: site_id.to_string(),
                    station_id: station.id.clone(),
                    in_basin,
                });
            }
        }
    }
}

fn distance_to_area(point: Point<f64>, area: &MultiPolygon<f64>) -> f64 {
    area.0
        .iter()
        .map(|polygon| point.euclidean_distance(polygon))
        .fold(f64::INFINITY, f64::min)
}
