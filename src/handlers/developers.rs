//! Developer and developer-info handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{NewDeveloper, NewDeveloperInfo};
use crate::response::{created, no_content, ok};
use crate::service::{
    parse_id, run_guards, text_field, FieldMap, Guard, GuardInput, IdSource, RequestValidator,
    DEVELOPER_NOT_FOUND,
};
use crate::sql::{DEVELOPERS, DEVELOPER_INFOS};
use crate::state::AppState;

const DEVELOPER_REQUIRED: &[&str] = &["name", "email"];
const INFO_REQUIRED: &[&str] = &["developerSince", "preferredOS"];
const INFO_NOT_FOUND: &str = "Developer info not found.";

const CREATE_GUARDS: &[Guard] = &[Guard::EmailUnused];
const BY_ID_GUARDS: &[Guard] = &[Guard::DeveloperExists(IdSource::Path)];
const UPDATE_GUARDS: &[Guard] = &[Guard::DeveloperExists(IdSource::Path), Guard::EmailUnused];

/// Path id after `DeveloperExists` passed; a parse failure here means the guard was skipped.
fn developer_id(raw: &str) -> Result<i32, AppError> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(DEVELOPER_NOT_FOUND.into()))
}

pub async fn create_developer(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(CREATE_GUARDS, state.store.as_ref(), &GuardInput::body(&body)).await?;
    RequestValidator::require_keys(&body, DEVELOPER_REQUIRED)?;
    let new = NewDeveloper {
        name: text_field(&body, "name")?,
        email: text_field(&body, "email")?,
    };
    let row = state.store.insert_developer(&new).await?;
    tracing::info!(id = row.id, "developer created");
    Ok(created(row))
}

pub async fn list_developers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store.list_developers().await?))
}

pub async fn read_developer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    let row = state
        .store
        .developer_view(developer_id(&id)?)
        .await?
        .ok_or_else(|| AppError::NotFound(DEVELOPER_NOT_FOUND.into()))?;
    Ok(ok(row))
}

pub async fn list_developer_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    Ok(ok(state.store.developer_projects(developer_id(&id)?).await?))
}

pub async fn update_developer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(UPDATE_GUARDS, state.store.as_ref(), &GuardInput::path_and_body(&id, &body)).await?;
    let updatable = DEVELOPERS.column_names();
    RequestValidator::require_any_key(&body, &updatable)?;
    let fields = FieldMap::sparse(&body, &updatable);
    let row = state
        .store
        .update_developer(developer_id(&id)?, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(DEVELOPER_NOT_FOUND.into()))?;
    Ok(ok(row))
}

pub async fn delete_developer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path(&id)).await?;
    let deleted = state.store.delete_developer(developer_id(&id)?).await?;
    tracing::info!(id = %id, deleted, "developer deleted");
    Ok(no_content())
}

pub async fn create_developer_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path_and_body(&id, &body)).await?;
    RequestValidator::require_keys(&body, INFO_REQUIRED)?;
    let new = NewDeveloperInfo {
        developer_since: text_field(&body, "developerSince")?,
        preferred_os: text_field(&body, "preferredOS")?,
    };
    let row = state.store.insert_developer_info(developer_id(&id)?, &new).await?;
    Ok(created(row))
}

pub async fn update_developer_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    run_guards(BY_ID_GUARDS, state.store.as_ref(), &GuardInput::path_and_body(&id, &body)).await?;
    let updatable = DEVELOPER_INFOS.column_names();
    RequestValidator::require_any_key(&body, &updatable)?;
    let fields = FieldMap::sparse(&body, &updatable);
    let row = state
        .store
        .update_developer_info(developer_id(&id)?, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(INFO_NOT_FOUND.into()))?;
    Ok(ok(row))
}
