//! Router assembly: service, developer and project routes behind the body-limit layer.

mod common;
mod developers;
mod projects;

pub use common::service_routes;
pub use developers::developer_routes;
pub use projects::project_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(service_routes(state.clone()))
        .merge(developer_routes(state.clone()))
        .merge(project_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
