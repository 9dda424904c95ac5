use crate::{
    app::{AppResult, ParamsError},
    bbox,
    contracts::{
        get_all_geojson::GetAllGeoJsonResult,
        get_geojson::{GetGeoJsonParams, GetGeoJsonParamsInvalid, GetGeoJsonResult},
        reload::ReloadResult,
        stats::StatsResult,
    },
    store::{FeatureCollection, FeatureStore},
};
use std::{sync::Arc, time};

pub struct FeatureController {
    store: Arc<FeatureStore>,
}

impl FeatureController {
    pub fn new(store: Arc<FeatureStore>) -> Self {
        Self { store }
    }

    /// Snapshot to answer one request from; a concurrent reload won't touch it.
    pub fn snapshot(&self) -> Arc<FeatureCollection> {
        self.store.all()
    }

    pub fn get_geojson<'a>(
        &self,
        snapshot: &'a FeatureCollection,
        params: GetGeoJsonParams,
    ) -> GetGeoJsonResult<'a> {
        let timer = time::Instant::now();
        let matched = bbox::features_in_bbox(snapshot.features(), &params.bbox);
        debug!(
            "{} of {} features intersect {:?}, searched in {:?}",
            matched.features.len(),
            matched.total_searched,
            params.bbox,
            timer.elapsed()
        );

        GetGeoJsonResult::from(matched)
    }

    pub fn get_all_geojson<'a>(&self, snapshot: &'a FeatureCollection) -> GetAllGeoJsonResult<'a> {
        GetAllGeoJsonResult::new(snapshot.features())
    }

    pub async fn reload(&self) -> AppResult<ReloadResult> {
        let store = self.store.clone();
        let report = tokio::task::spawn_blocking(move || store.load()).await?;

        Ok(ReloadResult::from(&report))
    }

    pub fn stats(&self) -> StatsResult {
        let snapshot = self.store.all();

        StatsResult::new(
            snapshot.len(),
            snapshot.color_distribution(),
            self.store.sources().len(),
            self.store.available_sources(),
        )
    }
}

impl ParamsError for GetGeoJsonParamsInvalid {}
