use crate::store::LoadReport;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ReloadResult {
    pub status: String,
    pub total_features: usize,
    pub files_attempted: usize,
    pub files_loaded: usize,
}

impl From<&LoadReport> for ReloadResult {
    fn from(report: &LoadReport) -> Self {
        Self {
            status: "reloaded".to_string(),
            total_features: report.total_features,
            files_attempted: report.attempted(),
            files_loaded: report.found(),
        }
    }
}
