use crate::store::StoreHealth;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Error,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct HealthResult {
    pub status: HealthStatus,
    pub features_loaded: usize,
    pub files_available: usize,
    pub files_configured: usize,
}

impl From<StoreHealth> for HealthResult {
    fn from(health: StoreHealth) -> Self {
        let status = if health.healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Error
        };

        Self {
            status,
            features_loaded: health.features_loaded,
            files_available: health.files_available,
            files_configured: health.files_configured,
        }
    }
}
