use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::{
    fmt::Display,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, immutable set of features published by a single load.
#[derive(Debug, Default)]
pub struct FeatureCollection {
    features: Vec<JsonValue>,
}

impl FeatureCollection {
    pub fn new(features: Vec<JsonValue>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[JsonValue] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn color_distribution(&self) -> ColorDistribution {
        let mut distribution = ColorDistribution::default();
        for feature in &self.features {
            let color = feature
                .get("properties")
                .and_then(|properties| properties.get("color"))
                .and_then(JsonValue::as_str)
                .and_then(|color| color.parse::<Color>().ok());
            distribution.record(color);
        }
        distribution
    }
}

/// In-memory feature store backed by an ordered list of GeoJSON files.
///
/// Readers get an `Arc` to the current collection; `load` builds a new
/// collection and swaps it in, so a reader never sees a partial load.
pub struct FeatureStore {
    sources: Vec<PathBuf>,
    snapshot: RwLock<Arc<FeatureCollection>>,
}

impl FeatureStore {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            snapshot: RwLock::new(Arc::new(FeatureCollection::default())),
        }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Reads every configured source in order and publishes the result.
    ///
    /// A source that is missing or cannot be parsed is logged and skipped.
    pub fn load(&self) -> LoadReport {
        let timer = time::Instant::now();
        let mut features = Vec::new();
        let mut reports = Vec::with_capacity(self.sources.len());

        for path in &self.sources {
            let status = match read_source(path) {
                Ok(mut source_features) => {
                    info!(
                        "loaded {} features from '{}'",
                        source_features.len(),
                        path.display()
                    );
                    let count = source_features.len();
                    features.append(&mut source_features);
                    SourceStatus::Loaded(count)
                }
                Err(StoreError::Missing) => {
                    warn!("source file '{}' not found", path.display());
                    SourceStatus::Missing
                }
                Err(error) => {
                    error!("error loading '{}': {}", path.display(), error);
                    SourceStatus::Failed(error.to_string())
                }
            };
            reports.push(SourceReport {
                path: path.clone(),
                status,
            });
        }

        let collection = Arc::new(FeatureCollection::new(features));
        let total_features = collection.len();
        *self.snapshot.write() = collection;

        info!(
            "total features loaded: {} from {} of {} sources in {:?}",
            total_features,
            reports.iter().filter(|r| r.status.is_loaded()).count(),
            reports.len(),
            timer.elapsed()
        );

        LoadReport {
            sources: reports,
            total_features,
        }
    }

    /// The current snapshot. Stays valid even if a reload publishes a newer one.
    pub fn all(&self) -> Arc<FeatureCollection> {
        self.snapshot.read().clone()
    }

    pub fn color_stats(&self) -> ColorDistribution {
        self.all().color_distribution()
    }

    /// Number of configured sources present on disk right now.
    pub fn available_sources(&self) -> usize {
        self.sources.iter().filter(|path| path.exists()).count()
    }

    pub fn health(&self) -> StoreHealth {
        let files_available = self.available_sources();
        StoreHealth {
            healthy: files_available > 0,
            features_loaded: self.all().len(),
            files_available,
            files_configured: self.sources.len(),
        }
    }
}

fn read_source(path: &Path) -> StoreResult<Vec<JsonValue>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::Missing,
        _ => StoreError::Io(e),
    })?;
    let document: JsonValue = serde_json::from_reader(BufReader::new(file))?;

    match document {
        JsonValue::Object(mut object) => match object.remove("features") {
            None => Ok(Vec::new()),
            Some(JsonValue::Array(features)) => Ok(features),
            Some(_) => Err(StoreError::FeaturesNotArray),
        },
        _ => Err(StoreError::NotAnObject),
    }
}

#[derive(Debug)]
pub enum StoreError {
    Missing,
    Io(io::Error),
    Json(serde_json::Error),
    NotAnObject,
    FeaturesNotArray,
}

impl From<io::Error> for StoreError {
    fn from(io_error: io::Error) -> Self {
        StoreError::Io(io_error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(serde_error: serde_json::Error) -> Self {
        StoreError::Json(serde_error)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            StoreError::Missing => "file not found".to_string(),
            StoreError::Io(e) => e.to_string(),
            StoreError::Json(e) => format!("invalid json: {}", e),
            StoreError::NotAnObject => "document is not a json object".to_string(),
            StoreError::FeaturesNotArray => "'features' is not an array".to_string(),
        };

        write!(f, "{}", output)
    }
}

impl std::error::Error for StoreError {}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceStatus {
    Loaded(usize),
    Missing,
    Failed(String),
}

impl SourceStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SourceStatus::Loaded(_))
    }

    /// The file existed when the load ran, whether or not it parsed.
    pub fn is_found(&self) -> bool {
        !matches!(self, SourceStatus::Missing)
    }
}

#[derive(Clone, Debug)]
pub struct SourceReport {
    pub path: PathBuf,
    pub status: SourceStatus,
}

#[derive(Clone, Debug)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
    pub total_features: usize,
}

impl LoadReport {
    pub fn attempted(&self) -> usize {
        self.sources.len()
    }

    pub fn found(&self) -> usize {
        self.sources.iter().filter(|s| s.status.is_found()).count()
    }

    pub fn loaded(&self) -> usize {
        self.sources.iter().filter(|s| s.status.is_loaded()).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreHealth {
    pub healthy: bool,
    pub features_loaded: usize,
    pub files_available: usize,
    pub files_configured: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Color::Red),
            "blue" => Ok(Color::Blue),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            _ => Err(()),
        }
    }
}

/// Feature counts per road color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColorDistribution {
    pub red: usize,
    pub blue: usize,
    pub yellow: usize,
    pub green: usize,
    pub unknown: usize,
}

impl ColorDistribution {
    fn record(&mut self, color: Option<Color>) {
        let count = match color {
            Some(Color::Red) => &mut self.red,
            Some(Color::Blue) => &mut self.blue,
            Some(Color::Yellow) => &mut self.yellow,
            Some(Color::Green) => &mut self.green,
            None => &mut self.unknown,
        };
        *count += 1;
    }

    pub fn total(&self) -> usize {
        self.red + self.blue + self.yellow + self.green + self.unknown
    }
}
