//! Project routes.

use crate::handlers::projects::{
    attach_technology, create_project, delete_project, detach_technology, list_projects,
    read_project, update_project,
};
use crate::state::AppState;
use axum::{routing::delete, routing::get, routing::post, Router};

pub fn project_routes(state: AppState) -> Router {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(read_project).patch(update_project).delete(delete_project),
        )
        .route("/projects/:id/technologies", post(attach_technology))
        .route("/projects/:id/technologies/:name", delete(detach_technology))
        .with_state(state)
}
