//! Vector layers stored as GeoJSON feature collections: site basins, site
//! points and CPC climate divisions. Coordinates are longitude/latitude.

use crate::parsers::read_source_text;
use crate::sites::error::SiteError;
use geo::{Coord, Intersects, LineString, MultiPolygon, Point, Polygon};
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point(Vec<f64>),
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

/// Geometry of a single feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    Area(MultiPolygon<f64>),
}

/// A decoded feature with its properties.
#[derive(Debug, Clone)]
pub struct LayerFeature {
    pub properties: Map<String, Value>,
    pub geometry: Option<FeatureGeometry>,
}

impl LayerFeature {
    /// Text value of a property. Numbers are rendered as text.
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn property_i32(&self, key: &str) -> Option<i32> {
        match self.properties.get(key)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
                .and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn position(values: &[f64]) -> Result<Coord<f64>, String> {
    match values {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(format!("position with {} ordinates", values.len())),
    }
}

fn ring(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    positions
        .iter()
        .map(|p| position(p))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, String> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| "polygon without rings".to_string())?;
    let interiors = interiors
        .iter()
        .map(|r| ring(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(ring(exterior)?, interiors))
}

fn convert(geometry: RawGeometry) -> Result<FeatureGeometry, String> {
    Ok(match geometry {
        RawGeometry::Point(coordinates) => FeatureGeometry::Point(Point::from(position(&coordinates)?)),
        RawGeometry::Polygon(rings) => FeatureGeometry::Area(MultiPolygon::new(vec![polygon(&rings)?])),
        RawGeometry::MultiPolygon(polygons) => FeatureGeometry::Area(MultiPolygon::new(
            polygons
                .iter()
                .map(|p| polygon(p))
                .collect::<Result<Vec<_>, _>>()?,
        )),
    })
}

/// Reads every feature of a GeoJSON feature collection.
pub fn read_layer(path: &Path) -> Result<Vec<LayerFeature>, SiteError> {
    let text = read_source_text(path)?;
    let collection: FeatureCollection =
        serde_json::from_str(&text).map_err(|e| SiteError::GeoJsonDecode(path.to_path_buf(), e))?;
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let geometry = feature
                .geometry
                .map(convert)
                .transpose()
                .map_err(|message| SiteError::InvalidGeometry {
                    path: path.to_path_buf(),
                    feature: index,
                    message,
                })?;
            Ok(LayerFeature {
                properties: feature.properties.unwrap_or_default(),
                geometry,
            })
        })
        .collect()
}

fn required_property(
    path: &Path,
    index: usize,
    feature: &LayerFeature,
    key: &str,
) -> Result<String, SiteError> {
    feature
        .property_str(key)
        .ok_or_else(|| SiteError::MissingProperty {
            path: path.to_path_buf(),
            feature: index,
            property: key.to_string(),
        })
}

/// Drainage basin polygons keyed by `site_id`.
#[derive(Debug, Clone, Default)]
pub struct BasinLayer {
    basins: BTreeMap<String, MultiPolygon<f64>>,
}

impl BasinLayer {
    pub fn read(path: &Path) -> Result<Self, SiteError> {
        let mut basins = BTreeMap::new();
        for (index, feature) in read_layer(path)?.into_iter().enumerate() {
            let site_id = required_property(path, index, &feature, "site_id")?;
            match feature.geometry {
                Some(FeatureGeometry::Area(area)) => {
                    basins.insert(site_id, area);
                }
                _ => warn!("Basin for '{site_id}' in {} is not a polygon", path.display()),
            }
        }
        Ok(Self { basins })
    }

    pub fn from_basins(basins: impl IntoIterator<Item = (String, MultiPolygon<f64>)>) -> Self {
        Self {
            basins: basins.into_iter().collect(),
        }
    }

    pub fn get(&self, site_id: &str) -> Option<&MultiPolygon<f64>> {
        self.basins.get(site_id)
    }

    /// Basins in `site_id` order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiPolygon<f64>)> {
        self.basins.iter().map(|(id, area)| (id.as_str(), area))
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }
}

/// Forecast site locations keyed by `site_id`.
#[derive(Debug, Clone, Default)]
pub struct SitePointLayer {
    points: BTreeMap<String, Point<f64>>,
}

impl SitePointLayer {
    pub fn read(path: &Path) -> Result<Self, SiteError> {
        let mut points = BTreeMap::new();
        for (index, feature) in read_layer(path)?.into_iter().enumerate() {
            let site_id = required_property(path, index, &feature, "site_id")?;
            match feature.geometry {
                Some(FeatureGeometry::Point(point)) => {
                    points.insert(site_id, point);
                }
                _ => warn!("Site '{site_id}' in {} is not a point", path.display()),
            }
        }
        Ok(Self { points })
    }

    pub fn get(&self, site_id: &str) -> Option<Point<f64>> {
        self.points.get(site_id).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A CPC forecast division, identified by its `CD` number.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateDivision {
    pub division: i32,
    pub area: MultiPolygon<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ClimateDivisionLayer {
    divisions: Vec<ClimateDivision>,
}

impl ClimateDivisionLayer {
    pub fn read(path: &Path) -> Result<Self, SiteError> {
        let mut divisions = Vec::new();
        for (index, feature) in read_layer(path)?.into_iter().enumerate() {
            let division = feature
                .property_i32("CD")
                .or_else(|| feature.property_i32("cd"))
                .ok_or_else(|| SiteError::MissingProperty {
                    path: path.to_path_buf(),
                    feature: index,
                    property: "CD".to_string(),
                })?;
            if let Some(FeatureGeometry::Area(area)) = feature.geometry {
                divisions.push(ClimateDivision { division, area });
            }
        }
        divisions.sort_by_key(|d| d.division);
        Ok(Self { divisions })
    }

    /// Division numbers whose area intersects `area`, ascending and unique.
    pub fn intersecting(&self, area: &MultiPolygon<f64>) -> Vec<i32> {
        let mut found: Vec<i32> = self
            .divisions
            .iter()
            .filter(|d| multi_polygons_intersect(&d.area, area))
            .map(|d| d.division)
            .collect();
        found.dedup();
        found
    }

    pub fn divisions(&self) -> &[ClimateDivision] {
        &self.divisions
    }
}

fn multi_polygons_intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.0.iter()
        .any(|left| b.0.iter().any(|right| left.intersects(right)))
}
