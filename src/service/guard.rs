//! Pre-handler checks. Each route declares an ordered guard chain; the first guard that halts
//! decides the response and the handler never runs.

use crate::error::AppError;
use crate::service::Body;
use crate::store::Store;
use serde_json::Value;

pub const DEVELOPER_NOT_FOUND: &str = "Developer not found.";
pub const PROJECT_NOT_FOUND: &str = "Project not found.";
pub const EMAIL_EXISTS: &str = "Email already exists.";

/// Where a guard reads the id it checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdSource {
    /// The `:id` path parameter.
    Path,
    /// `developerId` in the JSON body.
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    DeveloperExists(IdSource),
    ProjectExists,
    EmailUnused,
}

#[derive(Debug)]
pub enum Flow {
    Continue,
    Halt(AppError),
}

/// What guards may look at: the raw `:id` segment and the parsed body, when the route has them.
#[derive(Clone, Copy, Default)]
pub struct GuardInput<'a> {
    pub path_id: Option<&'a str>,
    pub body: Option<&'a Body>,
}

impl<'a> GuardInput<'a> {
    pub fn path(id: &'a str) -> Self {
        GuardInput {
            path_id: Some(id),
            body: None,
        }
    }

    pub fn body(body: &'a Body) -> Self {
        GuardInput {
            path_id: None,
            body: Some(body),
        }
    }

    pub fn path_and_body(id: &'a str, body: &'a Body) -> Self {
        GuardInput {
            path_id: Some(id),
            body: Some(body),
        }
    }
}

/// Path ids are plain integers; anything else cannot name a row.
pub fn parse_id(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}

/// Ids in a body may arrive as numbers or numeric strings.
pub fn json_id(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => parse_id(s),
        _ => None,
    }
}

impl Guard {
    pub async fn check(&self, store: &dyn Store, input: &GuardInput<'_>) -> Result<Flow, AppError> {
        match self {
            Guard::DeveloperExists(source) => {
                let raw = match source {
                    IdSource::Path => input.path_id.map(|s| Value::String(s.to_string())),
                    IdSource::Body => input.body.and_then(|b| b.get("developerId")).cloned(),
                };
                // No developerId in the body: nothing to check; the handler decides whether it is required.
                let Some(raw) = raw else {
                    return Ok(Flow::Continue);
                };
                let found = match json_id(&raw) {
                    Some(id) => store.developer_exists(id).await?,
                    None => false,
                };
                Ok(if found {
                    Flow::Continue
                } else {
                    Flow::Halt(AppError::NotFound(DEVELOPER_NOT_FOUND.into()))
                })
            }
            Guard::ProjectExists => {
                let found = match input.path_id.and_then(parse_id) {
                    Some(id) => store.project_exists(id).await?,
                    None => false,
                };
                Ok(if found {
                    Flow::Continue
                } else {
                    Flow::Halt(AppError::NotFound(PROJECT_NOT_FOUND.into()))
                })
            }
            // Checked against every developer, the one being updated included.
            Guard::EmailUnused => {
                let Some(email) = input.body.and_then(|b| b.get("email")).and_then(Value::as_str) else {
                    return Ok(Flow::Continue);
                };
                Ok(if store.email_in_use(email).await? {
                    Flow::Halt(AppError::Conflict(EMAIL_EXISTS.into()))
                } else {
                    Flow::Continue
                })
            }
        }
    }
}

/// Run guards in order; the first halt becomes the error response.
pub async fn run_guards(guards: &[Guard], store: &dyn Store, input: &GuardInput<'_>) -> Result<(), AppError> {
    for guard in guards {
        if let Flow::Halt(err) = guard.check(store, input).await? {
            tracing::debug!(?guard, error = %err, "guard halted request");
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewDeveloper;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn body(v: Value) -> Body {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    async fn store_with_developer() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_developer(&NewDeveloper {
                name: "Ana".into(),
                email: "a@x.com".into(),
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn ids_parse_from_numbers_and_numeric_strings() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(json_id(&json!(3)), Some(3));
        assert_eq!(json_id(&json!("4")), Some(4));
        assert_eq!(json_id(&json!(1.5)), None);
        assert_eq!(json_id(&json!(null)), None);
    }

    #[tokio::test]
    async fn developer_guard_reads_path_id() {
        let store = store_with_developer().await;
        let ok = run_guards(&[Guard::DeveloperExists(IdSource::Path)], &store, &GuardInput::path("1")).await;
        assert!(ok.is_ok());
        let err = run_guards(&[Guard::DeveloperExists(IdSource::Path)], &store, &GuardInput::path("2"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), DEVELOPER_NOT_FOUND);
        let err = run_guards(&[Guard::DeveloperExists(IdSource::Path)], &store, &GuardInput::path("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn developer_guard_reads_body_id_and_skips_when_absent() {
        let store = store_with_developer().await;
        let guards = [Guard::DeveloperExists(IdSource::Body)];
        let b = body(json!({"developerId": 1}));
        assert!(run_guards(&guards, &store, &GuardInput::body(&b)).await.is_ok());
        let b = body(json!({"developerId": 9}));
        assert!(run_guards(&guards, &store, &GuardInput::body(&b)).await.is_err());
        let b = body(json!({"name": "api"}));
        assert!(run_guards(&guards, &store, &GuardInput::body(&b)).await.is_ok());
    }

    #[tokio::test]
    async fn email_guard_conflicts_on_any_holder() {
        let store = store_with_developer().await;
        let b = body(json!({"email": "a@x.com"}));
        let err = run_guards(&[Guard::EmailUnused], &store, &GuardInput::path_and_body("1", &b))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == EMAIL_EXISTS));
        let b = body(json!({"email": "b@x.com"}));
        assert!(run_guards(&[Guard::EmailUnused], &store, &GuardInput::body(&b)).await.is_ok());
    }

    #[tokio::test]
    async fn first_halting_guard_wins() {
        let store = store_with_developer().await;
        let b = body(json!({"email": "a@x.com"}));
        let err = run_guards(
            &[Guard::DeveloperExists(IdSource::Path), Guard::EmailUnused],
            &store,
            &GuardInput::path_and_body("7", &b),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn project_guard_without_path_id_halts() {
        let store = MemoryStore::new();
        let err = run_guards(&[Guard::ProjectExists], &store, &GuardInput::default()).await.unwrap_err();
        assert_eq!(err.to_string(), PROJECT_NOT_FOUND);
    }
}
