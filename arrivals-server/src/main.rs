use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use arrivals_server::cache::CachedArrivalSource;
use arrivals_server::config::AppConfig;
use arrivals_server::directory::StationDirectory;
use arrivals_server::session::{ArrivalSession, spawn_poller};
use arrivals_server::upstream::{ArrivalSource, ArrivalsClient, MockArrivalSource};
use arrivals_server::web::{AppState, create_router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "arrivals server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;

    let directory = match &config.platform_file {
        Some(path) => {
            let directory = StationDirectory::load(path)?;
            info!(path = %path.display(), platforms = directory.len(), "loaded platform directory");
            directory
        }
        None => StationDirectory::builtin(),
    };

    match &config.mock_dir {
        Some(dir) => {
            let mock = MockArrivalSource::from_dir(dir)?;
            info!(
                dir = %dir.display(),
                stations = mock.available_stations().await.len(),
                "serving mock arrivals"
            );
            serve(&config, directory, mock).await
        }
        None => {
            // Upstream client with a short-lived per-station cache in front of it
            let client = ArrivalsClient::new(config.arrivals.clone())?;
            let source = CachedArrivalSource::new(client, &config.cache);
            info!(upstream = %config.arrivals.base_url, "using live arrivals API");
            serve(&config, directory, source).await
        }
    }
}

async fn serve<S>(config: &AppConfig, directory: StationDirectory, source: S) -> Result<(), BoxError>
where
    S: ArrivalSource + 'static,
{
    let session = Arc::new(ArrivalSession::new(source, directory));

    for platform in &config.poll_platforms {
        if session.directory().stations(platform).is_empty() {
            warn!(platform = %platform, "polled platform has no stations");
        }
    }

    match config.poll_interval {
        Some(interval) if !config.poll_platforms.is_empty() => {
            spawn_poller(Arc::clone(&session), config.poll_platforms.clone(), interval);
        }
        Some(_) => info!("no platforms to poll; refreshes happen on request"),
        None => info!("polling disabled"),
    }

    let app = create_router(AppState::new(session));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "arrivals server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
