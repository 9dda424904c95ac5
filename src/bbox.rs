//! Bounding-box filtering of GeoJSON features.
//!
//! Features are kept as raw JSON and their geometry is only decoded while a
//! query runs. A feature that cannot be decoded is left out of the result and
//! never fails the query as a whole.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{error::Error, fmt::Display};

/// An axis-aligned rectangle in decimal degrees.
///
/// Nothing forces `north >= south` or `east >= west`; an inverted box simply
/// matches fewer features.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Box covering a single point.
    fn around(lng: f64, lat: f64) -> Self {
        Self::new(lat, lat, lng, lng)
    }

    fn extend(self, lng: f64, lat: f64) -> Self {
        Self::new(
            self.north.max(lat),
            self.south.min(lat),
            self.east.max(lng),
            self.west.min(lng),
        )
    }

    /// Inclusive rectangle overlap: touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        other.south <= self.north
            && other.north >= self.south
            && other.west <= self.east
            && other.east >= self.west
    }
}

/// Why a feature was left out of a bounding-box result.
#[derive(Debug, PartialEq)]
pub enum FeatureSkip {
    MissingGeometry,
    MissingType,
    UnsupportedGeometry(String),
    MalformedCoordinates,
    NoExteriorRing,
    NoCoordinates,
    InvalidPosition,
}

impl Error for FeatureSkip {}

impl Display for FeatureSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            FeatureSkip::MissingGeometry => "feature has no geometry".to_string(),
            FeatureSkip::MissingType => "geometry has no type".to_string(),
            FeatureSkip::UnsupportedGeometry(kind) => {
                format!("unsupported geometry type '{}'", kind)
            }
            FeatureSkip::MalformedCoordinates => "coordinates are not nested arrays".to_string(),
            FeatureSkip::NoExteriorRing => "polygon has no rings".to_string(),
            FeatureSkip::NoCoordinates => "geometry has no coordinates".to_string(),
            FeatureSkip::InvalidPosition => {
                "position does not start with two numbers".to_string()
            }
        };

        write!(f, "{}", output)
    }
}

/// Computes the bounding box of a feature's geometry.
///
/// Only the `type` tag and `coordinates` member are read, and each position
/// contributes its first two numbers. `LineString`, `MultiLineString` and the
/// exterior ring of a `Polygon` contribute points; every other geometry type
/// is skipped.
pub fn feature_bounds(feature: &JsonValue) -> Result<BoundingBox, FeatureSkip> {
    let geometry = match feature.get("geometry") {
        Some(JsonValue::Null) | None => return Err(FeatureSkip::MissingGeometry),
        Some(geometry) => geometry,
    };
    let kind = geometry
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or(FeatureSkip::MissingType)?;
    let coordinates = || {
        geometry
            .get("coordinates")
            .ok_or(FeatureSkip::NoCoordinates)
            .and_then(as_list)
    };

    match kind {
        "LineString" => bounds_of(coordinates()?),
        "MultiLineString" => {
            let lines = coordinates()?
                .iter()
                .map(as_list)
                .collect::<Result<Vec<_>, _>>()?;
            bounds_of(lines.into_iter().flatten())
        }
        "Polygon" => {
            let exterior = coordinates()?.first().ok_or(FeatureSkip::NoExteriorRing)?;
            bounds_of(as_list(exterior)?)
        }
        other => Err(FeatureSkip::UnsupportedGeometry(other.to_owned())),
    }
}

fn as_list(value: &JsonValue) -> Result<&[JsonValue], FeatureSkip> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(FeatureSkip::MalformedCoordinates)
}

/// Longitude and latitude of a `[lng, lat, ..]` position.
fn lng_lat(position: &JsonValue) -> Result<(f64, f64), FeatureSkip> {
    match position.as_array().map(Vec::as_slice) {
        Some([lng, lat, ..]) => match (lng.as_f64(), lat.as_f64()) {
            (Some(lng), Some(lat)) => Ok((lng, lat)),
            _ => Err(FeatureSkip::InvalidPosition),
        },
        _ => Err(FeatureSkip::InvalidPosition),
    }
}

fn bounds_of<'a, I>(positions: I) -> Result<BoundingBox, FeatureSkip>
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    let mut bounds: Option<BoundingBox> = None;
    for position in positions {
        let (lng, lat) = lng_lat(position)?;
        bounds = Some(match bounds {
            Some(bounds) => bounds.extend(lng, lat),
            None => BoundingBox::around(lng, lat),
        });
    }

    bounds.ok_or(FeatureSkip::NoCoordinates)
}

/// Features of a collection that intersect a query box.
#[derive(Debug)]
pub struct BboxMatch<'a> {
    pub features: Vec<&'a JsonValue>,
    pub total_searched: usize,
    pub bbox: BoundingBox,
}

/// Linear scan over `features`, keeping the ones whose bounds intersect
/// `bbox`. Source order is preserved.
pub fn features_in_bbox<'a>(features: &'a [JsonValue], bbox: &BoundingBox) -> BboxMatch<'a> {
    let matched: Vec<_> = features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| match feature_bounds(feature) {
            Ok(bounds) => Some((feature, bounds)),
            Err(skip) => {
                trace!("skipping feature {}: {}", idx, skip);
                None
            }
        })
        .filter(|(_, bounds)| bbox.intersects(bounds))
        .map(|(feature, _)| feature)
        .collect();

    BboxMatch {
        features: matched,
        total_searched: features.len(),
        bbox: *bbox,
    }
}
