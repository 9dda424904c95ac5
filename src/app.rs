use crate::{
    contracts::{get_geojson::GetGeoJsonParams, ErrorResponse, Route, UnknownRoute},
    controller::{FeatureController, ServerController},
    store::FeatureStore,
};
use hyper::{Body, Response, StatusCode};
use std::{
    convert::TryFrom,
    error::Error,
    fmt::{Debug, Display},
    sync::Arc,
};

pub type AppResult<T> = Result<T, AppError>;

pub struct App {
    feature_controller: FeatureController,
    server_controller: ServerController,
}

impl App {
    pub fn new(store: Arc<FeatureStore>) -> Self {
        let feature_controller = FeatureController::new(store.clone());
        let server_controller = ServerController::new(store);

        Self {
            feature_controller,
            server_controller,
        }
    }

    /// Handle a single GET request that has already been matched to a route
    pub async fn handle_route(
        &self,
        route: Route,
        query: Option<&str>,
    ) -> AppResult<Response<Body>> {
        trace!("handling route '{}' with query {:?}", route, query);

        match route {
            Route::Root => crate::json_response(&self.server_controller.root(), StatusCode::OK),
            Route::GetGeoJson => {
                let params = GetGeoJsonParams::try_from(query)?;
                let snapshot = self.feature_controller.snapshot();
                let result = self.feature_controller.get_geojson(&snapshot, params);
                crate::json_response(&result, StatusCode::OK)
            }
            Route::GetAllGeoJson => {
                let snapshot = self.feature_controller.snapshot();
                let result = self.feature_controller.get_all_geojson(&snapshot);
                crate::json_response(&result, StatusCode::OK)
            }
            Route::Reload => {
                let result = self.feature_controller.reload().await?;
                crate::json_response(&result, StatusCode::OK)
            }
            Route::Stats => crate::json_response(&self.feature_controller.stats(), StatusCode::OK),
            Route::Health => crate::json_response(&self.server_controller.health(), StatusCode::OK),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub context: Option<String>,
}

impl AppError {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: reason(status),
            context: None,
        }
    }

    pub fn with_context<T>(mut self, value: &T) -> Self
    where
        T: Debug,
    {
        self.context = Some(format!("{:?}", value));
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_owned();
        self
    }

    pub fn invalid_params() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse::new(reason(self.status), self.message.clone())
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("error")
        .to_lowercase()
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for AppError {}

impl From<UnknownRoute> for AppError {
    fn from(unknown: UnknownRoute) -> Self {
        AppError::not_found()
            .with_message(&unknown.to_string())
            .with_context(&unknown)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(join_error: tokio::task::JoinError) -> Self {
        AppError::internal_error()
            .with_message("reload task failed")
            .with_context(&join_error)
    }
}

pub trait ParamsError: Error {}

impl<T> From<T> for AppError
where
    T: ParamsError,
{
    fn from(err: T) -> Self {
        AppError::invalid_params()
            .with_message(&err.to_string())
            .with_context(&err)
    }
}
