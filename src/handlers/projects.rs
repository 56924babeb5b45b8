//! Project and project-technology handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{NewProject, Technology};
use crate::response::{created, no_content, ok};
use crate::service::{
    is_truthy, json_id, parse_id, run_guards, text_field, FieldMap, Guard, GuardInput, IdSource,
    RequestValidator, DEVELOPER_NOT_FOUND, PROJECT_NOT_FOUND,
};
use crate::sql::PROJECTS;
use crate::state::AppState;

const PROJECT_REQUIRED: &[&str] = &[
    "name",
    "description",
    "estimatedTime",
    "repository",
    "startDate",
    "developerId",
];

const CREATE_GUARDS: &[Guard] = &[Guard::DeveloperExists(IdSource::Body)];
const BY_ID_GUARDS: &[Guard] = &[Guard::ProjectExists];
const UPDATE_GUARDS: &[Guard] = &[Guard::ProjectExists, Guard::DeveloperExists(IdSource::Body)];

fn project_id(raw: &str) -> Result<i32, AppError> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(PROJECT_NOT_FOUND.into()))
}

pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(CREATE_GUARDS, state.store.as_ref(), &GuardInput::body(&body)).await?;
    RequestValidator::require_all_keys(&body, PROJECT_REQUIRED)?;
    let developer_id = body
        .get("developerId")
        .and_then(json_id)
        .ok_or_else(|| AppError::NotFound(DEVELOPER_NOT_FOUND.into()))?;
    let new = NewProject {
        name: text_field(&body, "name")?,
        description: text_field(&body, "description")?,
        estimated_time: text_field(&body, "estimatedTime")?,
        repository: text_field(&body, "repository")?,
        start_date: text_field(&body, "startDate")?,
        end_date: match body.get("endDate") {
            Some(v) if is_truthy(v) => Some(text_field(&body, "endDate")?),
            _ => None,
        },
        developer_id,
    };
    let row = state.store.insert_project(&new).await?;
    tracing::info!(id = row.id, developer_id, "project created");
    Ok(created(row))
}

pub async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store.list_projects().await?))
}

/// One row per attached technology.
pub async fn read_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    Ok(ok(state.store.project_views(project_id(&id)?).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(UPDATE_GUARDS, state.store.as_ref(), &GuardInput::path_and_body(&id, &body)).await?;
    let updatable = PROJECTS.column_names();
    RequestValidator::require_any_key(&body, &updatable)?;
    let fields = FieldMap::sparse(&body, &updatable);
    let row = state
        .store
        .update_project(project_id(&id)?, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(PROJECT_NOT_FOUND.into()))?;
    Ok(ok(row))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    let deleted = state.store.delete_project(project_id(&id)?).await?;
    tracing::info!(id = %id, deleted, "project deleted");
    Ok(no_content())
}

pub async fn attach_technology(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path_and_body(&id, &body)).await?;
    let technology: Technology = body
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or(AppError::UnsupportedTechnology)?
        .parse()?;
    let row = state.store.attach_technology(project_id(&id)?, technology).await?;
    Ok(created(row))
}

pub async fn detach_technology(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    let technology: Technology = name.parse()?;
    let removed = state.store.detach_technology(project_id(&id)?, technology).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!(
            "Technology {} not found on this Project.",
            technology
        )));
    }
    Ok(no_content())
}
