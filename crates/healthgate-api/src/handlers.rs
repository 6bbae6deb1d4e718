//! Actuator handlers.
//!
//! Each handler evaluates a probe through the registry and renders its
//! report as JSON.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info};

use healthgate_health::{ProbeError, Status};

use crate::ApiState;

/// Body returned when a probe evaluation fails outright.
#[derive(serde::Serialize)]
struct ErrorBody {
    status: Status,
    error: String,
}

fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Up => StatusCode::OK,
        Status::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(probe: &str, e: &ProbeError) -> axum::response::Response {
    error!(%probe, error = %e, "probe evaluation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            status: Status::Down,
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// GET /hello
pub async fn hello() -> &'static str {
    info!("hello");
    "hello"
}

/// GET /actuator/health
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    match state.registry.health().await {
        Ok(health) => (status_code(health.status), Json(health)).into_response(),
        Err(e) => error_response("health", &e),
    }
}

/// GET /actuator/health/liveness
pub async fn liveness(State(state): State<ApiState>) -> impl IntoResponse {
    match state.registry.liveness().health().await {
        Ok(health) => (status_code(health.status), Json(health)).into_response(),
        Err(e) => error_response("liveness", &e),
    }
}

/// GET /actuator/health/readiness
pub async fn readiness(State(state): State<ApiState>) -> impl IntoResponse {
    match state.registry.readiness().health().await {
        Ok(health) => (status_code(health.status), Json(health)).into_response(),
        Err(e) => error_response("readiness", &e),
    }
}

/// GET /actuator/customReadiness
pub async fn custom_readiness(State(state): State<ApiState>) -> impl IntoResponse {
    readiness(State(state)).await
}
