//! Request validation by key presence, plus the sparse field map built for partial updates.

use crate::error::AppError;
use crate::sql::SqlValue;
use serde_json::{Map, Value};

/// JSON request body.
pub type Body = Map<String, Value>;

/// `null`, `false`, `0` and `""` are falsy; arrays and objects are truthy even when empty.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Required keys that are absent or falsy, in declared order.
    pub fn missing_keys(body: &Body, required: &[&'static str]) -> Vec<&'static str> {
        required
            .iter()
            .copied()
            .filter(|k| !body.get(*k).is_some_and(is_truthy))
            .collect()
    }

    /// Create path: every required key present with a truthy value.
    pub fn require_keys(body: &Body, required: &[&'static str]) -> Result<(), AppError> {
        let missing = Self::missing_keys(body, required);
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::MissingKeys {
            message: format!("Missing required keys: {}.", missing.join(",")),
            keys: None,
        })
    }

    /// Project create path: every required key present, whatever its value. All-or-nothing message.
    pub fn require_all_keys(body: &Body, required: &[&'static str]) -> Result<(), AppError> {
        if required.iter().all(|k| body.contains_key(*k)) {
            return Ok(());
        }
        Err(AppError::MissingKeys {
            message: format!("Required keys are: {}.", required.join(",")),
            keys: None,
        })
    }

    /// Update path: at least one updatable key present, whatever its value.
    pub fn require_any_key(body: &Body, updatable: &[&'static str]) -> Result<(), AppError> {
        if updatable.iter().any(|k| body.contains_key(*k)) {
            return Ok(());
        }
        Err(AppError::MissingKeys {
            message: "At least one of those keys must be send.".into(),
            keys: Some(updatable.to_vec()),
        })
    }
}

/// Text of a body value for a typed insert. A present `null` is rejected; the store would
/// refuse it for a NOT NULL column anyway.
pub fn text_field(body: &Body, key: &str) -> Result<String, AppError> {
    body.get(key)
        .and_then(|v| SqlValue::from_json(v).into_text())
        .ok_or_else(|| AppError::InvalidValue(format!("{} must not be null.", key)))
}

/// Sparse column -> value map for a partial update, in updatable-key order.
///
/// Only truthy values are copied: a key sent as `""`, `0`, `false` or `null` is dropped, so an
/// update can never blank a column. Validation by presence happens before this, so a body made
/// only of falsy values passes validation and then updates nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(&'static str, Value)>,
}

impl FieldMap {
    pub fn sparse(body: &Body, updatable: &[&'static str]) -> Self {
        let entries = updatable
            .iter()
            .filter_map(|k| {
                body.get(*k)
                    .filter(|v| is_truthy(v))
                    .map(|v| (*k, v.clone()))
            })
            .collect();
        FieldMap { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
