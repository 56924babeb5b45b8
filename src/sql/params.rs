//! Convert serde_json::Value to text bind values. The statement casts each placeholder to the
//! column type, so every value travels as TEXT (or SQL NULL).

use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Json(Value),
}

impl SqlValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::I64(i)
                } else {
                    SqlValue::F64(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => SqlValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(v.clone()),
        }
    }

    /// Text form handed to the driver; `None` binds SQL NULL.
    pub fn into_text(self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::I64(n) => Some(n.to_string()),
            SqlValue::F64(n) => Some(n.to_string()),
            SqlValue::String(s) => Some(s),
            SqlValue::Json(v) => Some(v.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_integer_form() {
        assert_eq!(SqlValue::from_json(&json!(7)).into_text().as_deref(), Some("7"));
        assert_eq!(SqlValue::from_json(&json!(2.5)).into_text().as_deref(), Some("2.5"));
    }

    #[test]
    fn null_binds_as_sql_null() {
        assert_eq!(SqlValue::from_json(&Value::Null), SqlValue::Null);
        assert_eq!(SqlValue::Null.into_text(), None);
    }

    #[test]
    fn strings_are_passed_through_unquoted() {
        let v = SqlValue::from_json(&json!("O'Brien\"; DROP TABLE developers; --"));
        assert_eq!(
            v.into_text().as_deref(),
            Some("O'Brien\"; DROP TABLE developers; --")
        );
    }
}
