//! Background worker that deletes expired login sessions.

use sqlx::SqlitePool;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn cleanup_once(pool: &SqlitePool) {
    match crate::db::delete_expired_sessions(pool).await {
        Ok(0) => {}
        Ok(count) => {
            tracing::info!(expired_sessions = count, "Cleaned up expired sessions");
        }
        Err(e) => {
            tracing::error!("Failed to delete expired sessions: {e:#}");
        }
    }
}

/// Run the cleanup worker.
/// Cleans up immediately on start, then every `interval` until `shutdown` fires.
pub async fn run_cleanup_worker(pool: SqlitePool, interval: Duration, shutdown: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting session cleanup worker"
    );

    cleanup_once(&pool).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cleanup_once(&pool).await;
            }
            () = shutdown.cancelled() => {
                tracing::info!("Session cleanup worker shutting down");
                break;
            }
        }
    }
}
