//! Developer routes. Guard chains are declared next to each handler.

use crate::handlers::developers::{
    create_developer, create_developer_info, delete_developer, list_developer_projects,
    list_developers, read_developer, update_developer, update_developer_info,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn developer_routes(state: AppState) -> Router {
    Router::new()
        .route("/developers", post(create_developer).get(list_developers))
        .route(
            "/developers/:id",
            get(read_developer).patch(update_developer).delete(delete_developer),
        )
        .route("/developers/:id/projects", get(list_developer_projects))
        .route(
            "/developers/:id/infos",
            post(create_developer_info).patch(update_developer_info),
        )
        .with_state(state)
}
