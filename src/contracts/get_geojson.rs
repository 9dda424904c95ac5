use crate::bbox::{BboxMatch, BoundingBox};
use serde_json::Value as JsonValue;
use std::{convert::TryFrom, error::Error, fmt::Display};

/// Query parameters of `GET /geojson`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[non_exhaustive]
pub struct GetGeoJsonParams {
    pub bbox: BoundingBox,
}

impl GetGeoJsonParams {
    pub fn new(
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    ) -> Result<Self, GetGeoJsonParamsInvalid> {
        let values = [
            ("north", north),
            ("south", south),
            ("east", east),
            ("west", west),
        ];
        if let Some(&(name, _)) = values.iter().find(|(_, value)| !value.is_finite()) {
            Err(GetGeoJsonParamsInvalid::NotFinite(name))?;
        }

        Ok(Self {
            bbox: BoundingBox::new(north, south, east, west),
        })
    }
}

#[derive(Debug)]
pub enum GetGeoJsonParamsInvalid {
    InvalidFormat(serde_urlencoded::de::Error),
    Missing(&'static str),
    NotANumber(&'static str, String),
    NotFinite(&'static str),
}

impl Error for GetGeoJsonParamsInvalid {}

impl Display for GetGeoJsonParamsInvalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            GetGeoJsonParamsInvalid::InvalidFormat(query_error) => {
                crate::contracts::invalid_query_message(query_error)
            }
            GetGeoJsonParamsInvalid::Missing(name) => {
                format!("invalid query parameters: missing '{}'", name)
            }
            GetGeoJsonParamsInvalid::NotANumber(name, value) => {
                format!("invalid {}, '{}' is not a number", name, value)
            }
            GetGeoJsonParamsInvalid::NotFinite(name) => {
                format!("invalid {}, should be a finite number of decimal degrees", name)
            }
        };

        write!(f, "{}", output)
    }
}

/// Raw values as they appear in the query string. A repeated key keeps its
/// last value.
#[derive(Default)]
struct GetGeoJsonParamsBuilder {
    north: Option<String>,
    south: Option<String>,
    east: Option<String>,
    west: Option<String>,
}

impl GetGeoJsonParamsBuilder {
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "north" => &mut self.north,
            "south" => &mut self.south,
            "east" => &mut self.east,
            "west" => &mut self.west,
            _ => return,
        };
        *slot = Some(value);
    }

    fn build(self) -> Result<GetGeoJsonParams, GetGeoJsonParamsInvalid> {
        GetGeoJsonParams::new(
            degrees("north", self.north)?,
            degrees("south", self.south)?,
            degrees("east", self.east)?,
            degrees("west", self.west)?,
        )
    }
}

fn degrees(name: &'static str, value: Option<String>) -> Result<f64, GetGeoJsonParamsInvalid> {
    let value = value.ok_or(GetGeoJsonParamsInvalid::Missing(name))?;
    value
        .parse()
        .map_err(|_| GetGeoJsonParamsInvalid::NotANumber(name, value))
}

/// Parses the raw query string of the request URI.
impl TryFrom<Option<&str>> for GetGeoJsonParams {
    type Error = GetGeoJsonParamsInvalid;

    fn try_from(query: Option<&str>) -> Result<Self, Self::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(GetGeoJsonParamsInvalid::InvalidFormat)?;

        let mut builder = GetGeoJsonParamsBuilder::default();
        for (name, value) in pairs {
            builder.set(&name, value);
        }

        builder.build()
    }
}

#[derive(serde::Serialize, Debug)]
pub struct GetGeoJsonMetadata {
    pub total_in_bbox: usize,
    pub total_searched: usize,
    pub bbox: BoundingBox,
}

/// A `FeatureCollection` borrowing its features from the store snapshot.
#[derive(serde::Serialize, Debug)]
pub struct GetGeoJsonResult<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<&'a JsonValue>,
    pub metadata: GetGeoJsonMetadata,
}

impl<'a> From<BboxMatch<'a>> for GetGeoJsonResult<'a> {
    fn from(matched: BboxMatch<'a>) -> Self {
        let metadata = GetGeoJsonMetadata {
            total_in_bbox: matched.features.len(),
            total_searched: matched.total_searched,
            bbox: matched.bbox,
        };

        Self {
            kind: "FeatureCollection",
            features: matched.features,
            metadata,
        }
    }
}
