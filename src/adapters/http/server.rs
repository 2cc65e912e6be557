//! Keepalive HTTP server
//!
//! Answers on the hosting platform's `PORT` so the process is kept alive, and
//! exposes the monitor status as JSON.

use std::future::Future;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tower_http::trace::TraceLayer;

use crate::application::GraduateMonitor;
use crate::domain::WatchSummary;
use crate::ports::{HolderSource, Notifier, PairSource};

pub const INDEX_TEXT: &str = "Pump.fun -> DexScreener Graduate Watcher (running)";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Server exited while the monitor was running")]
    Exited,

    #[error("Server task failed: {0}")]
    Task(String),
}

/// GET /health body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: i64,
    pub is_running: bool,
    pub ticks: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub watchlist_len: usize,
    pub alerts_sent: u64,
    pub last_error: Option<String>,
}

/// Build the router over a shared monitor handle
pub fn router<P, H, N>(monitor: GraduateMonitor<P, H, N>) -> Router
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health::<P, H, N>))
        .route("/watchlist", get(watchlist::<P, H, N>))
        .layer(TraceLayer::new_for_http())
        .with_state(monitor)
}

async fn index() -> &'static str {
    INDEX_TEXT
}

async fn health<P, H, N>(State(monitor): State<GraduateMonitor<P, H, N>>) -> Json<HealthResponse>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
{
    let status = monitor.status().await;

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - status.started_at).num_seconds(),
        is_running: status.is_running,
        ticks: status.ticks,
        last_tick_at: status.last_tick_at,
        watchlist_len: status.watchlist_len,
        alerts_sent: status.alerts_sent,
        last_error: status.last_error,
    })
}

async fn watchlist<P, H, N>(
    State(monitor): State<GraduateMonitor<P, H, N>>,
) -> Json<Vec<WatchSummary>>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
{
    Json(monitor.watchlist_snapshot().await)
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<P, H, N, F>(
    addr: &str,
    monitor: GraduateMonitor<P, H, N>,
    shutdown: F,
) -> Result<(), ServerError>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(addr).await?;
    serve_listener(listener, monitor, shutdown).await
}

pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Run the monitor loop with the keepalive server on `listener`.
///
/// The server is shut down when the loop ends. A server that exits first
/// stops the monitor and its error is returned.
pub async fn run_with_server<P, H, N>(
    monitor: GraduateMonitor<P, H, N>,
    listener: TcpListener,
) -> Result<(), ServerError>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
{
    let (stop_server, server_stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_listener(listener, monitor.clone(), async move {
        let _ = server_stopped.await;
    }));

    supervise(monitor, server, stop_server).await
}

async fn supervise<P, H, N>(
    monitor: GraduateMonitor<P, H, N>,
    mut server: JoinHandle<Result<(), ServerError>>,
    stop_server: oneshot::Sender<()>,
) -> Result<(), ServerError>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
{
    tokio::select! {
        _ = monitor.run() => {
            let _ = stop_server.send(());
            joined(server.await)
        }
        result = &mut server => {
            monitor.stop().await;
            let err = joined(result).err().unwrap_or(ServerError::Exited);
            tracing::error!("Keepalive server stopped early, stopping monitor: {}", err);
            Err(err)
        }
    }
}

fn joined(result: Result<Result<(), ServerError>, JoinError>) -> Result<(), ServerError> {
    result.map_err(|e| ServerError::Task(e.to_string()))?
}

/// Serve on an already bound listener
pub async fn serve_listener<P, H, N, F>(
    listener: TcpListener,
    monitor: GraduateMonitor<P, H, N>,
    shutdown: F,
) -> Result<(), ServerError>
where
    P: PairSource + 'static,
    H: HolderSource + 'static,
    N: Notifier + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("Keepalive server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(monitor))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Keepalive server stopped");
    Ok(())
}
