//! Response shaping: rows are returned bare, with the status chosen by the operation.

use axum::{http::StatusCode, Json};
use serde::Serialize;

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

/// Deletes answer 204 whether or not a row matched.
pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
