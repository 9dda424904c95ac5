use crate::store::ColorDistribution;

#[derive(serde::Serialize, Debug, Clone)]
#[non_exhaustive]
pub struct StatsResult {
    pub total_features: usize,
    pub color_distribution: ColorDistribution,
    pub files_configured: usize,
    pub files_loaded: usize,
}

impl StatsResult {
    pub fn new(
        total_features: usize,
        color_distribution: ColorDistribution,
        files_configured: usize,
        files_loaded: usize,
    ) -> Self {
        Self {
            total_features,
            color_distribution,
            files_configured,
            files_loaded,
        }
    }
}
