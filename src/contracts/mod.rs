pub mod get_all_geojson;
pub mod get_geojson;
pub mod health;
pub mod reload;
pub mod root;
pub mod stats;

use std::{error::Error, fmt::Display, str::FromStr};

pub const ROOT_URI: &str = "/";
pub const GEOJSON_URI: &str = "/geojson";
pub const GEOJSON_ALL_URI: &str = "/geojson/all";
pub const RELOAD_URI: &str = "/reload";
pub const STATS_URI: &str = "/stats";
pub const HEALTH_URI: &str = "/health";

pub const URIS: [&str; 6] = [
    ROOT_URI,
    GEOJSON_URI,
    GEOJSON_ALL_URI,
    RELOAD_URI,
    STATS_URI,
    HEALTH_URI,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    GetGeoJson,
    GetAllGeoJson,
    Reload,
    Stats,
    Health,
}

impl Route {
    pub fn uri(&self) -> &'static str {
        match self {
            Route::Root => ROOT_URI,
            Route::GetGeoJson => GEOJSON_URI,
            Route::GetAllGeoJson => GEOJSON_ALL_URI,
            Route::Reload => RELOAD_URI,
            Route::Stats => STATS_URI,
            Route::Health => HEALTH_URI,
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Matches a request path, ignoring a trailing slash.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let without_trailing_slash = match path.trim_end_matches('/') {
            "" => ROOT_URI,
            trimmed => trimmed,
        };

        match without_trailing_slash {
            ROOT_URI => Ok(Route::Root),
            GEOJSON_URI => Ok(Route::GetGeoJson),
            GEOJSON_ALL_URI => Ok(Route::GetAllGeoJson),
            RELOAD_URI => Ok(Route::Reload),
            STATS_URI => Ok(Route::Stats),
            HEALTH_URI => Ok(Route::Health),
            _ => Err(UnknownRoute(path.to_owned())),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl Error for UnknownRoute {}

impl Display for UnknownRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no route matches '{}', expected one of {:?}", self.0, URIS)
    }
}

/// Body of every non-2xx response.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}

pub(crate) fn invalid_query_message(error: &serde_urlencoded::de::Error) -> String {
    format!("invalid query parameters: {}", error)
}
