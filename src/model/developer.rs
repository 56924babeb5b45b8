use chrono::NaiveDate;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Developer {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub developer_info_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct DeveloperInfo {
    pub id: i32,
    pub developer_since: NaiveDate,
    #[serde(rename = "preferredOS")]
    #[sqlx(rename = "preferredOS")]
    pub preferred_os: String,
    pub developer_id: i32,
}

/// Developer left-joined to its optional info row. Info columns are null when no info exists.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct DeveloperView {
    pub developer_id: i32,
    pub developer_name: String,
    pub developer_email: String,
    pub developer_info_id: Option<i32>,
    pub developer_info_developer_since: Option<NaiveDate>,
    #[serde(rename = "developerInfoPreferredOS")]
    #[sqlx(rename = "developerInfoPreferredOS")]
    pub developer_info_preferred_os: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewDeveloper {
    pub name: String,
    pub email: String,
}

/// `developer_since` stays textual; the store coerces it to a date.
#[derive(Clone, Debug)]
pub struct NewDeveloperInfo {
    pub developer_since: String,
    pub preferred_os: String,
}
