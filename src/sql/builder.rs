//! Builds the dynamic partial UPDATE from a sparse field map.

use crate::service::FieldMap;
use crate::sql::{SqlValue, Table};

/// Quote identifier for PostgreSQL (safe: only from the catalogue).
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Statement plus the values bound after the row key. `$1` is always the row key.
#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len() + 1
    }
}

/// `UPDATE t SET (c1, ..., cN) = ROW($2::ty1, ..., $N+1::tyN) WHERE key = $1 RETURNING *`.
/// Fields without a catalogue entry are skipped. With nothing to set this degrades to a
/// `SELECT *` on the same key so the caller still gets the current row (or none).
pub fn update_row(table: &Table, fields: &FieldMap) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, value) in fields.iter() {
        let Some(c) = table.column(name) else { continue };
        let n = q.push_param(SqlValue::from_json(value));
        cols.push(quote_ident(c.name));
        placeholders.push(format!("${}::{}", n, c.pg_type));
    }
    let t = quote_ident(table.name);
    let key = quote_ident(table.key);
    q.sql = if cols.is_empty() {
        format!("SELECT * FROM {} WHERE {} = $1", t, key)
    } else {
        format!(
            "UPDATE {} SET ({}) = ROW({}) WHERE {} = $1 RETURNING *",
            t,
            cols.join(", "),
            placeholders.join(", "),
            key
        )
    };
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{DEVELOPERS, DEVELOPER_INFOS, PROJECTS};
    use serde_json::{json, Map, Value};

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn single_column_update_uses_row_syntax() {
        let fields = FieldMap::sparse(&body(json!({"name": "Ana B"})), &DEVELOPERS.column_names());
        let q = update_row(&DEVELOPERS, &fields);
        assert_eq!(
            q.sql,
            r#"UPDATE "developers" SET ("name") = ROW($2::text) WHERE "id" = $1 RETURNING *"#
        );
        assert_eq!(q.params, vec![SqlValue::String("Ana B".into())]);
    }

    #[test]
    fn columns_follow_catalogue_order_and_carry_casts() {
        let fields = FieldMap::sparse(
            &body(json!({"developerId": 3, "startDate": "2023-01-02", "name": "api"})),
            &PROJECTS.column_names(),
        );
        let q = update_row(&PROJECTS, &fields);
        assert_eq!(
            q.sql,
            r#"UPDATE "projects" SET ("name", "startDate", "developerId") = ROW($2::text, $3::date, $4::integer) WHERE "id" = $1 RETURNING *"#
        );
        assert_eq!(
            q.params,
            vec![
                SqlValue::String("api".into()),
                SqlValue::String("2023-01-02".into()),
                SqlValue::I64(3),
            ]
        );
    }

    #[test]
    fn info_updates_key_on_developer() {
        let fields = FieldMap::sparse(&body(json!({"preferredOS": "Linux"})), &DEVELOPER_INFOS.column_names());
        let q = update_row(&DEVELOPER_INFOS, &fields);
        assert!(q.sql.ends_with(r#"WHERE "developerId" = $1 RETURNING *"#));
    }

    #[test]
    fn values_never_reach_the_statement_text() {
        let evil = "x') = ROW('y'); DROP TABLE developers; --";
        let fields = FieldMap::sparse(&body(json!({"name": evil})), &DEVELOPERS.column_names());
        let q = update_row(&DEVELOPERS, &fields);
        assert!(!q.sql.contains("DROP"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn empty_field_map_selects_current_row() {
        let fields = FieldMap::sparse(&body(json!({"name": ""})), &DEVELOPERS.column_names());
        let q = update_row(&DEVELOPERS, &fields);
        assert_eq!(q.sql, r#"SELECT * FROM "developers" WHERE "id" = $1"#);
        assert!(q.params.is_empty());
    }

    #[test]
    fn quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }
}
