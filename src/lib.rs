#![allow(clippy::new_without_default)]

use app::{App, AppError, AppResult};
use contracts::Route;
use cors::CorsConfig;
use hyper::{
    header::{self, HeaderValue},
    Body, Method, Request, Response, StatusCode, Uri,
};
use serde::Serialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

pub mod app;
pub mod bbox;
pub mod contracts;
pub mod controller;
pub mod cors;
pub mod store;

#[macro_use]
extern crate log;

/// Sources read by the store, in the order their features are served.
pub const DEFAULT_SOURCE_FILES: [&str; 6] = [
    "resources/split/indore_roads_part1.geojson",
    "resources/split/indore_roads_part2.geojson",
    "resources/split/indore_roads_part3.geojson",
    "resources/split/indore_roads_part4.geojson",
    "resources/split/indore_roads_part5.geojson",
    "resources/split/indore_roads_part6.geojson",
];

#[derive(Clone, Debug)]
pub struct AppSettings {
    pub host: IpAddr,
    pub port: u16,
    pub source_files: Vec<PathBuf>,
}

impl AppSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            source_files: DEFAULT_SOURCE_FILES.iter().map(PathBuf::from).collect(),
        }
    }
}

pub async fn entry_point(
    webserver: Arc<Webserver>,
    request: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    Ok(webserver.handle_request(request).await)
}

pub struct Webserver {
    app: Arc<App>,
    cors: CorsConfig,
}

impl Webserver {
    pub fn new(app: Arc<App>, cors: CorsConfig) -> Self {
        Self { app, cors }
    }

    pub async fn handle_request(&self, request: Request<Body>) -> Response<Body> {
        let timer = Instant::now();
        let (parts, _) = request.into_parts();
        let origin = parts.headers.get(header::ORIGIN);

        let response = if CorsConfig::is_preflight(&parts.method, &parts.headers) {
            self.cors.preflight(&parts.headers)
        } else {
            let mut response = match self.route_request(&parts.method, &parts.uri).await {
                Ok(response) => response,
                Err(error) => {
                    if error.status.is_server_error() {
                        error!("error handling '{}': {:?}", parts.uri, error);
                    } else {
                        warn!("rejected '{}': {}", parts.uri, error);
                    }
                    error_response(&error)
                }
            };
            self.cors.apply(&mut response, origin);
            response
        };

        info!(
            "{} {} -> {} in {:?}",
            parts.method,
            parts.uri,
            response.status().as_u16(),
            timer.elapsed()
        );
        response
    }

    async fn route_request(&self, method: &Method, uri: &Uri) -> AppResult<Response<Body>> {
        let route: Route = uri.path().parse()?;

        match *method {
            Method::GET => self.app.handle_route(route, uri.query()).await,
            _ => Err(AppError::method_not_allowed()
                .with_message(&format!("'{}' only supports GET", route))
                .with_context(method)),
        }
    }
}

pub(crate) fn json_response<T>(body: &T, status: StatusCode) -> AppResult<Response<Body>>
where
    T: Serialize,
{
    let b = serde_json::to_vec(body).map_err(|e| AppError::internal_error().with_context(&e))?;

    Ok(bytes_response(b, status))
}

fn bytes_response(body: Vec<u8>, status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn error_response(error: &AppError) -> Response<Body> {
    match serde_json::to_vec(&error.body()) {
        Ok(b) => bytes_response(b, error.status),
        Err(serde_error) => {
            error!("failed to serialize error body: {}", serde_error);
            let mut response = Response::new(Body::empty());
            *response.status_mut() = error.status;
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        tests::{road, write_source},
        FeatureStore,
    };
    use serde_json::{json, Value as JsonValue};
    use std::fs;
    use tempfile::TempDir;

    fn webserver(sources: Vec<PathBuf>) -> Webserver {
        let store = Arc::new(FeatureStore::new(sources));
        store.load();
        let app = Arc::new(App::new(store));
        Webserver::new(app, CorsConfig::permissive())
    }

    fn roads_fixture(dir: &TempDir) -> Vec<PathBuf> {
        let first = write_source(
            dir,
            "part1.geojson",
            vec![
                road(Some("red"), json!([[10.0, 20.0], [12.0, 22.0]])),
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [11.0, 21.0] },
                    "properties": { "color": "blue" }
                }),
            ],
        );
        let second = write_source(
            dir,
            "part2.geojson",
            vec![
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [[[-40.0, -30.0], [-39.0, -29.0]]]
                    },
                    "properties": { "color": "green" }
                }),
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [] },
                    "properties": {}
                }),
            ],
        );
        vec![first, dir.path().join("part3.geojson"), second]
    }

    async fn get(webserver: &Webserver, uri: &str) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = webserver.handle_request(request).await;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn geojson_filters_by_bbox() {
        let dir = tempfile::tempdir().unwrap();
        let webserver = webserver(roads_fixture(&dir));

        let (status, body) = get(&webserver, "/geojson?north=25&south=15&east=15&west=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 1);
        assert_eq!(body["features"][0]["properties"]["color"], "red");
        assert_eq!(
            body["metadata"],
            json!({
                "total_in_bbox": 1,
                "total_searched": 4,
                "bbox": { "north": 25.0, "south": 15.0, "east": 15.0, "west": 5.0 }
            })
        );

        let (_, body) = get(&webserver, "/geojson?north=10&south=0&east=5&west=0").await;
        assert_eq!(body["metadata"]["total_in_bbox"], 0);
        assert_eq!(body["metadata"]["total_searched"], 4);

        let (_, body) = get(&webserver, "/geojson/?north=90&south=-90&east=180&west=-180").await;
        let colors: Vec<_> = body["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["properties"]["color"].as_str().unwrap())
            .collect();
        assert_eq!(colors, vec!["red", "green"]);
    }

    #[tokio::test]
    async fn geojson_rejects_bad_params() {
        let dir = tempfile::tempdir().unwrap();
        let webserver = webserver(roads_fixture(&dir));

        for uri in &[
            "/geojson",
            "/geojson?north=25&south=15&east=15",
            "/geojson?north=up&south=15&east=15&west=5",
        ] {
            let (status, body) = get(&webserver, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
            assert_eq!(body["error"], "unprocessable entity");
        }
    }

    #[tokio::test]
    async fn all_returns_unfiltered_collection() {
        let dir = tempfile::tempdir().unwrap();
        let webserver = webserver(roads_fixture(&dir));

        let (status, body) = get(&webserver, "/geojson/all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["total_features"], 4);
        let features = body["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(features[1]["geometry"]["type"], "Point");
    }

    #[tokio::test]
    async fn stats_and_health() {
        let dir = tempfile::tempdir().unwrap();
        let sources = roads_fixture(&dir);
        let webserver = webserver(sources.clone());

        let (_, stats) = get(&webserver, "/stats").await;
        assert_eq!(
            stats,
            json!({
                "total_features": 4,
                "color_distribution": {
                    "red": 1, "blue": 1, "yellow": 0, "green": 1, "unknown": 1
                },
                "files_configured": 3,
                "files_loaded": 2
            })
        );

        let (_, health) = get(&webserver, "/health").await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["files_available"], 2);

        for source in &sources {
            let _ = fs::remove_file(source);
        }
        let (status, health) = get(&webserver, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            health,
            json!({
                "status": "error",
                "features_loaded": 4,
                "files_available": 0,
                "files_configured": 3
            })
        );
    }

    #[tokio::test]
    async fn reload_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let webserver = webserver(roads_fixture(&dir));

        let (_, before) = get(&webserver, "/geojson/all").await;
        let (status, reload) = get(&webserver, "/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            reload,
            json!({
                "status": "reloaded",
                "total_features": 4,
                "files_attempted": 3,
                "files_loaded": 2
            })
        );
        let (_, after) = get(&webserver, "/geojson/all").await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn root_describes_api() {
        let dir = tempfile::tempdir().unwrap();
        let webserver = webserver(roads_fixture(&dir));

        let (status, body) = get(&webserver, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["endpoints"].as_object().unwrap().len(), 5);
        assert_eq!(
            body["files_status"],
            json!({ "configured": 3, "available": 2, "features_loaded": 4 })
        );
    }

    #[tokio::test]
    async fn unknown_route_and_method() {
        let webserver = webserver(vec![]);

        let (status, body) = get(&webserver, "/roads").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/reload")
            .body(Body::empty())
            .unwrap();
        let response = webserver.handle_request(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn preflight_and_cors_headers() {
        let webserver = webserver(vec![]);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/geojson")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
            .body(Body::empty())
            .unwrap();
        let response = webserver.handle_request(request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "authorization");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        let vary: Vec<_> = headers.get_all(header::VARY).iter().collect();
        assert_eq!(vary, vec!["Access-Control-Request-Headers", "Origin"]);

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = webserver.handle_request(request).await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
        assert_eq!(response.headers().get_all(header::VARY).iter().count(), 1);
    }

    #[tokio::test]
    async fn plain_options_is_routed() {
        let webserver = webserver(vec![]);

        for (uri, expected) in &[
            ("/geojson", StatusCode::METHOD_NOT_ALLOWED),
            ("/roads", StatusCode::NOT_FOUND),
        ] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(*uri)
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap();
            let response = webserver.handle_request(request).await;
            assert_eq!(response.status(), *expected, "{}", uri);
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "http://localhost:3000"
            );
        }
    }
}
