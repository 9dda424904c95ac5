use hyper::{
    service::{make_service_fn, service_fn},
    Server,
};
use roads::{app::App, cors::CorsConfig, store::FeatureStore, AppSettings, Webserver};
use std::{net::IpAddr, path::PathBuf, sync::Arc};
use structopt::StructOpt;

#[macro_use]
extern crate log;

#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "roads-server", about = "Serves road segments as GeoJSON")]
struct Opts {
    #[structopt(long, default_value = "0.0.0.0", env = "ROADS_LISTEN_HOST")]
    host: IpAddr,
    #[structopt(long, default_value = "8000", env = "ROADS_LISTEN_PORT")]
    port: u16,
    /// GeoJSON files to serve, in order. Defaults to the six Indore road parts.
    #[structopt(long, env = "ROADS_SOURCE_FILES", use_delimiter = true)]
    source_files: Vec<PathBuf>,
}

impl From<Opts> for AppSettings {
    fn from(opts: Opts) -> Self {
        let defaults = AppSettings::default();
        let source_files = if opts.source_files.is_empty() {
            defaults.source_files
        } else {
            opts.source_files
        };

        Self {
            host: opts.host,
            port: opts.port,
            source_files,
        }
    }
}

#[tokio::main]
async fn main() {
    let env = std::env::var("ROADS_ENV").unwrap_or_else(|_| "test".to_string());

    let env_file_name = format!("{}.env", env);
    let env_file = dotenv::from_filename(&env_file_name);

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    if let Err(e) = env_file {
        warn!(
            "environment file not found: {}, error: {}",
            env_file_name, e
        );
    }

    let settings = AppSettings::from(Opts::from_args());
    info!("serving {} source files", settings.source_files.len());

    let store = Arc::new(FeatureStore::new(settings.source_files.clone()));
    let report = store.load();
    if store.all().is_empty() {
        warn!(
            "no features loaded from {} of {} sources, starting with an empty collection",
            report.loaded(),
            report.attempted()
        );
    }

    let app = Arc::new(App::new(store));

    let webserver = Arc::new(Webserver::new(app, CorsConfig::permissive()));

    let addr = settings.socket_addr();

    let service = make_service_fn(|_| {
        let webserver = webserver.clone();
        async {
            Ok::<_, hyper::Error>(service_fn(move |request| {
                let webserver = webserver.clone();
                roads::entry_point(webserver, request)
            }))
        }
    });

    let builder = match Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    let server = builder.serve(service).with_graceful_shutdown(shutdown_signal());

    info!("starting server on {:?}", addr);
    if let Err(e) = server.await {
        error!("server error: {}", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
