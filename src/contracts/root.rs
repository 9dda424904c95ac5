use super::{GEOJSON_ALL_URI, GEOJSON_URI, HEALTH_URI, RELOAD_URI, STATS_URI};
use std::collections::BTreeMap;

#[derive(serde::Serialize, Debug, Clone)]
pub struct FilesStatus {
    pub configured: usize,
    pub available: usize,
    pub features_loaded: usize,
}

/// API description served at `/`.
#[derive(serde::Serialize, Debug, Clone)]
#[non_exhaustive]
pub struct RootResult {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub files_status: FilesStatus,
}

impl RootResult {
    pub fn new(files_status: FilesStatus) -> Self {
        let endpoints = vec![
            (GEOJSON_URI, "Filter roads by bounding box"),
            (GEOJSON_ALL_URI, "Get all roads"),
            (STATS_URI, "Get color statistics"),
            (HEALTH_URI, "Health check"),
            (RELOAD_URI, "Reload data files"),
        ]
        .into_iter()
        .collect();

        Self {
            message: "GeoJSON Roads API with Bounding Box Filter",
            version: env!("CARGO_PKG_VERSION"),
            endpoints,
            files_status,
        }
    }
}
