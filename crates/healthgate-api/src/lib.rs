//! healthgate-api: HTTP surface for the probes.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/hello` | HTTP layer sanity check |
//! | GET | `/actuator/health` | Liveness and readiness combined |
//! | GET | `/actuator/health/liveness` | Liveness report |
//! | GET | `/actuator/health/readiness` | Readiness report |
//! | GET | `/actuator/customReadiness` | Readiness report for external polling |
//!
//! Reports answer 200 when UP and 503 when DOWN. A liveness evaluation
//! error answers 500.

pub mod handlers;

use axum::Router;
use axum::routing::get;
use healthgate_health::ProbeRegistry;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: ProbeRegistry,
}

/// Build the complete router.
pub fn build_router(registry: ProbeRegistry) -> Router {
    let state = ApiState { registry };

    let actuator_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/liveness", get(handlers::liveness))
        .route("/health/readiness", get(handlers::readiness))
        .route("/customReadiness", get(handlers::custom_readiness));

    Router::new()
        .route("/hello", get(handlers::hello))
        .nest("/actuator", actuator_routes)
        .with_state(state)
}
