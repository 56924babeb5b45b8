//! Service routes: liveness, store readiness, build and vocabulary info.

use crate::model::Technology;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    store: &'static str,
}

/// What clients need to talk to this build: its version and the accepted technology names.
#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    technologies: Vec<&'static str>,
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                status: "ok",
                store: "reachable",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "degraded",
                    store: "unreachable",
                }),
            )
        }
    }
}

async fn version() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        technologies: Technology::names(),
    })
}

/// GET /health (empty 200), GET /ready, GET /version.
pub fn service_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
