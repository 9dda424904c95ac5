use crate::{
    contracts::{
        health::HealthResult,
        root::{FilesStatus, RootResult},
    },
    store::FeatureStore,
};
use std::sync::Arc;

pub struct ServerController {
    store: Arc<FeatureStore>,
}

impl ServerController {
    pub fn new(store: Arc<FeatureStore>) -> Self {
        Self { store }
    }

    pub fn health(&self) -> HealthResult {
        let health = self.store.health();
        if !health.healthy {
            warn!(
                "none of the {} configured source files are available",
                health.files_configured
            );
        }
        HealthResult::from(health)
    }

    pub fn root(&self) -> RootResult {
        RootResult::new(FilesStatus {
            configured: self.store.sources().len(),
            available: self.store.available_sources(),
            features_loaded: self.store.all().len(),
        })
    }
}
