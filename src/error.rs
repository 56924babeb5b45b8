//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::Technology;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Required or updatable keys missing from the body. `keys` lists the accepted keys on the update path.
    #[error("{message}")]
    MissingKeys {
        message: String,
        keys: Option<Vec<&'static str>>,
    },
    #[error("Technology not supported.")]
    UnsupportedTechnology,
    /// A value the store cannot coerce to the column type (bad date, null in a required column, ...).
    #[error("{0}")]
    InvalidValue(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<&'static str>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingKeys { .. }
            | AppError::UnsupportedTechnology
            | AppError::InvalidValue(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            message: self.to_string(),
            keys: None,
            options: None,
        };
        match self {
            AppError::MissingKeys { keys, .. } => body.keys = keys.clone(),
            AppError::UnsupportedTechnology => body.options = Some(Technology::names()),
            AppError::Db(sqlx::Error::RowNotFound) => body.message = "Not found.".into(),
            AppError::Db(_) => body.message = "Internal server error.".into(),
            _ => {}
        }
        body
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
