//! JSON object body with rejections reported in the API's error envelope.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::service::Body;

const MISSING_CONTENT_TYPE: &str = "Expected request with `Content-Type: application/json`";

/// Extractor for a JSON object body. Malformed JSON, a wrong content type or a non-object
/// payload are all 400s.
///
/// A request with no body and no content type reads as `{}`, so guard chains still run and
/// validation reports the missing keys.
#[derive(Clone, Debug)]
pub struct JsonBody(pub Body);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(CONTENT_TYPE) {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if bytes.is_empty() {
                return Ok(JsonBody(Body::new()));
            }
            return Err(AppError::BadRequest(MISSING_CONTENT_TYPE.into()));
        }
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        match value {
            Value::Object(map) => Ok(JsonBody(map)),
            _ => Err(AppError::BadRequest("Request body must be a JSON object.".into())),
        }
    }
}
