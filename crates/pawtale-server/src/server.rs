use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use pawtale_engine::PetGame;

use crate::handlers;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Cached narration audio, served under `/audio`.
    pub audio_dir: PathBuf,
    /// Pet pictures, served under `/static`.
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            request_timeout_secs: 180,
            audio_dir: PathBuf::from("audio"),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<PetGame>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/species", get(handlers::list_species))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::reset),
        )
        .route("/sessions/{id}/setup", post(handlers::setup))
        .route("/sessions/{id}/actions", post(handlers::act))
        .route("/sessions/{id}/choices", post(handlers::choose))
        .route("/sessions/{id}/reading-level", put(handlers::set_reading_level))
        .route(
            "/sessions/{id}/narration",
            post(handlers::start_narration).get(handlers::narration_status),
        );

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .nest_service("/audio", ServeDir::new(&config.audio_dir))
        .nest_service("/static", ServeDir::new(&config.assets_dir))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve. Returns once the listener is up.
pub async fn start(config: ServerConfig, game: Arc<PetGame>) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(AppState { game }, &config);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(host = %config.host, port = local_addr.port(), "pawtale server started");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "server stopped");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        server,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    pub port: u16,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Resolves when the server task exits.
    pub async fn wait(self) {
        let _ = self.server.await;
    }

    pub fn abort(&self) {
        self.server.abort();
    }
}
