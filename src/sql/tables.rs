//! Column catalogue for the tables that accept partial updates. Only columns listed here may
//! appear in a generated SET list; the order is the order of the `keys` hint on update errors.

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    /// PostgreSQL type used to cast the text bind value.
    pub pg_type: &'static str,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    /// Column matched against `$1` in generated statements.
    pub key: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

pub const DEVELOPERS: Table = Table {
    name: "developers",
    key: "id",
    columns: &[
        Column { name: "email", pg_type: "text" },
        Column { name: "name", pg_type: "text" },
    ],
};

/// Keyed by the owning developer: infos are addressed through `/developers/:id/infos`.
pub const DEVELOPER_INFOS: Table = Table {
    name: "developer_infos",
    key: "developerId",
    columns: &[
        Column { name: "developerSince", pg_type: "date" },
        Column { name: "preferredOS", pg_type: "text" },
    ],
};

pub const PROJECTS: Table = Table {
    name: "projects",
    key: "id",
    columns: &[
        Column { name: "name", pg_type: "text" },
        Column { name: "description", pg_type: "text" },
        Column { name: "estimatedTime", pg_type: "text" },
        Column { name: "repository", pg_type: "text" },
        Column { name: "startDate", pg_type: "date" },
        Column { name: "endDate", pg_type: "date" },
        Column { name: "developerId", pg_type: "integer" },
    ],
};
