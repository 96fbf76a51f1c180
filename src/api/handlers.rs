//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use crate::sim::orchestrator::RunOrchestrator;

use super::AppState;
use super::types::{ErrorResponse, RunRequest, RunSummary, SimulationRun};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse { error: message }))
}

/// Validates the request, runs the simulation off the async runtime, and
/// records the outcome.
///
/// `POST /simulations` → 201 + `SimulationRun` JSON
/// invalid request → 400 + `ErrorResponse`
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Result<(StatusCode, Json<SimulationRun>), ApiError> {
    let (config, input) = request
        .to_scenario(&state.simulation)
        .prepare()
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let id = state.allocate_id();
    info!(id, chargers = input.chargers.len(), "simulation requested");

    let outcome =
        tokio::task::spawn_blocking(move || RunOrchestrator::new(config).run(&input)).await;
    let run = match outcome {
        Ok(Ok(result)) => SimulationRun::completed(id, request, result),
        Ok(Err(e)) => {
            warn!(id, error = %e, "simulation failed");
            SimulationRun::failed(id, request, e.to_string())
        }
        Err(e) => {
            warn!(id, error = %e, "simulation task aborted");
            SimulationRun::failed(id, request, format!("simulation task aborted: {e}"))
        }
    };

    state.runs.write().await.push(run.clone());
    Ok((StatusCode::CREATED, Json(run)))
}

/// Lists recorded runs without their day summaries, newest id first.
///
/// Runs are recorded as they finish, so registry order can differ from
/// submission order.
///
/// `GET /simulations` → 200 + `Vec<RunSummary>` JSON
pub async fn list_runs(State(state): State<Arc<AppState>>) -> Json<Vec<RunSummary>> {
    let runs = state.runs.read().await;
    let mut summaries: Vec<RunSummary> = runs.iter().map(RunSummary::from).collect();
    summaries.sort_by(|a, b| b.id.cmp(&a.id));
    Json(summaries)
}

/// Returns one run including its day summaries.
///
/// `GET /simulations/{id}` → 200 + `SimulationRun` JSON, or 404
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SimulationRun>, ApiError> {
    let runs = state.runs.read().await;
    runs.iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("no simulation with id {id}")))
}
