mod auth;
mod error;
pub mod pages;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::Router;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::feed::FeedAssembler;
use crate::follow::FollowGraph;
use crate::media::MediaStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub feeds: FeedAssembler,
    pub follows: FollowGraph,
    pub media: MediaStore,
}

impl AppState {
    /// Wire up the services for `config` on top of an open database.
    #[must_use]
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            feeds: FeedAssembler::from_config(db.clone(), &config),
            follows: FollowGraph::new(db.clone()),
            media: MediaStore::new(&config.media_dir),
            config: Arc::new(config),
            db,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.pool().clone()
    }
}

/// Start the web server and run until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn serve(config: Config, db: Database, shutdown: CancellationToken) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(AppState::new(config, db));

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let media_dir = state.media.root().to_path_buf();
    let body_limit = state.config.max_upload_bytes;
    info!(static_dir = ?static_dir, media_dir = ?media_dir, "Serving files");

    Router::new()
        .merge(routes::router())
        .merge(auth::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/media", ServeDir::new(media_dir))
        .fallback(error::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
