//! Store seam: every database interaction the guards and handlers perform.
//!
//! `PgStore` is the production implementation; `MemoryStore` mirrors its observable behavior
//! (generated ids, unique emails, cascades, seeded technologies) without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_schema, PgStore};

use crate::error::AppError;
use crate::model::{
    Developer, DeveloperInfo, DeveloperProjectView, DeveloperView, NewDeveloper, NewDeveloperInfo,
    NewProject, Project, ProjectTechnologyView, ProjectView, Technology,
};
use crate::service::FieldMap;
use async_trait::async_trait;

pub const INFO_EXISTS: &str = "Developer infos already exists.";

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn developer_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn email_in_use(&self, email: &str) -> Result<bool, AppError>;
    async fn insert_developer(&self, new: &NewDeveloper) -> Result<Developer, AppError>;
    async fn list_developers(&self) -> Result<Vec<DeveloperView>, AppError>;
    async fn developer_view(&self, id: i32) -> Result<Option<DeveloperView>, AppError>;
    /// Applies the sparse update; `None` when no developer has that id.
    async fn update_developer(&self, id: i32, fields: &FieldMap) -> Result<Option<Developer>, AppError>;
    /// Returns the number of rows deleted. Infos and projects cascade.
    async fn delete_developer(&self, id: i32) -> Result<u64, AppError>;

    /// Inserts the info row and links it from the developer, atomically.
    async fn insert_developer_info(
        &self,
        developer_id: i32,
        new: &NewDeveloperInfo,
    ) -> Result<DeveloperInfo, AppError>;
    async fn update_developer_info(
        &self,
        developer_id: i32,
        fields: &FieldMap,
    ) -> Result<Option<DeveloperInfo>, AppError>;
    async fn developer_projects(&self, developer_id: i32) -> Result<Vec<DeveloperProjectView>, AppError>;

    async fn project_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn insert_project(&self, new: &NewProject) -> Result<Project, AppError>;
    async fn list_projects(&self) -> Result<Vec<ProjectView>, AppError>;
    async fn project_views(&self, id: i32) -> Result<Vec<ProjectView>, AppError>;
    async fn update_project(&self, id: i32, fields: &FieldMap) -> Result<Option<Project>, AppError>;
    async fn delete_project(&self, id: i32) -> Result<u64, AppError>;

    /// Adds a join row stamped with the current time and returns the joined project view, atomically.
    async fn attach_technology(
        &self,
        project_id: i32,
        technology: Technology,
    ) -> Result<ProjectTechnologyView, AppError>;
    /// Returns the number of join rows removed.
    async fn detach_technology(&self, project_id: i32, technology: Technology) -> Result<u64, AppError>;
}
