//! REST API over an in-memory registry of simulation runs.
//!
//! - `POST /simulations` runs a simulation and records it
//! - `GET /simulations` lists recorded runs, newest first
//! - `GET /simulations/{id}` returns one run with its day summaries

mod handlers;
pub mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::routing::get;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::SimulationConfig;

use types::SimulationRun;

/// Application state shared across all request handlers.
pub struct AppState {
    /// Timing and seeding applied to every submitted run.
    pub simulation: SimulationConfig,
    runs: RwLock<Vec<SimulationRun>>,
    next_id: AtomicU64,
}

impl AppState {
    /// Creates an empty registry that runs requests under `simulation`.
    pub fn new(simulation: SimulationConfig) -> Self {
        Self {
            simulation,
            runs: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/simulations",
            get(handlers::list_runs).post(handlers::create_run),
        )
        .route("/simulations/{id}", get(handlers::get_run))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
