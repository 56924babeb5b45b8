use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub estimated_time: String,
    pub repository: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub developer_id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ProjectTechnology {
    pub id: i32,
    pub added_in: DateTime<Utc>,
    pub project_id: i32,
    pub technology_id: i32,
}

/// Project left-joined to its technologies: one row per attached technology, or a single row
/// with null technology columns.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ProjectView {
    pub project_id: i32,
    pub project_name: String,
    pub project_description: String,
    pub project_estimated_time: String,
    pub project_repository: String,
    pub project_start_date: NaiveDate,
    pub project_end_date: Option<NaiveDate>,
    pub project_developer_id: i32,
    pub technology_id: Option<i32>,
    pub technology_name: Option<String>,
}

/// A developer's projects with the developer, its info and each project's technologies flattened.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct DeveloperProjectView {
    pub developer_id: i32,
    pub developer_name: String,
    pub developer_email: String,
    pub developer_info_id: Option<i32>,
    pub developer_info_developer_since: Option<NaiveDate>,
    #[serde(rename = "developerInfoPreferredOS")]
    #[sqlx(rename = "developerInfoPreferredOS")]
    pub developer_info_preferred_os: Option<String>,
    pub project_id: i32,
    pub project_name: String,
    pub project_description: String,
    pub project_estimated_time: String,
    pub project_repository: String,
    pub project_start_date: NaiveDate,
    pub project_end_date: Option<NaiveDate>,
    pub technology_id: Option<i32>,
    pub technology_name: Option<String>,
}

/// Returned after attaching a technology.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ProjectTechnologyView {
    pub technology_id: i32,
    pub technology_name: String,
    pub project_id: i32,
    pub project_name: String,
    pub project_description: String,
    pub project_estimated_time: String,
    pub project_repository: String,
    pub project_start_date: NaiveDate,
    pub project_end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub estimated_time: String,
    pub repository: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub developer_id: i32,
}
