use serde_json::Value as JsonValue;

#[derive(serde::Serialize, Debug)]
pub struct GetAllGeoJsonMetadata {
    pub total_features: usize,
}

/// The whole store snapshot as an unfiltered `FeatureCollection`.
#[derive(serde::Serialize, Debug)]
pub struct GetAllGeoJsonResult<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: &'a [JsonValue],
    pub metadata: GetAllGeoJsonMetadata,
}

impl<'a> GetAllGeoJsonResult<'a> {
    pub fn new(features: &'a [JsonValue]) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
            metadata: GetAllGeoJsonMetadata {
                total_features: features.len(),
            },
        }
    }
}
