//! In-process store with the same observable behavior as the PostgreSQL schema.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::model::{
    Developer, DeveloperInfo, DeveloperProjectView, DeveloperView, NewDeveloper, NewDeveloperInfo,
    NewProject, Project, ProjectTechnology, ProjectTechnologyView, ProjectView, Technology,
};
use crate::service::{FieldMap, EMAIL_EXISTS};
use crate::sql::SqlValue;
use crate::store::{Store, INFO_EXISTS};

#[derive(Default)]
struct Sequences {
    developers: i32,
    infos: i32,
    projects: i32,
    links: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    developers: BTreeMap<i32, Developer>,
    infos: BTreeMap<i32, DeveloperInfo>,
    projects: BTreeMap<i32, Project>,
    links: BTreeMap<i32, ProjectTechnology>,
    seq: Sequences,
}

/// Seeded technology ids follow declaration order, starting at 1.
fn technology_id(t: Technology) -> i32 {
    t as i32 + 1
}

fn technology_name(id: i32) -> Option<&'static str> {
    usize::try_from(id - 1)
        .ok()
        .and_then(|i| Technology::ALL.get(i))
        .map(|t| t.as_str())
}

fn text(col: &str, v: &Value) -> Result<String, AppError> {
    SqlValue::from_json(v).into_text().ok_or_else(|| {
        AppError::InvalidValue(format!("null value in column \"{}\" violates not-null constraint", col))
    })
}

/// Input forms PostgreSQL's `::date` cast also accepts under the default `DateStyle` (ISO, MDY).
/// Textual month names and era suffixes are not covered.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%m-%d-%Y"];

fn date(s: &str) -> Result<NaiveDate, AppError> {
    let trimmed = s.trim();
    // Timestamps cast to their date part.
    let day = trimmed
        .split_once(|c: char| c == 'T' || c == ' ')
        .map_or(trimmed, |(day, _)| day);
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(day, f).ok())
        .ok_or_else(|| AppError::InvalidValue(format!("invalid input syntax for type date: \"{}\"", s)))
}

fn integer(s: &str) -> Result<i32, AppError> {
    s.trim()
        .parse()
        .map_err(|_| AppError::InvalidValue(format!("invalid input syntax for type integer: \"{}\"", s)))
}

fn missing_developer(table: &str) -> AppError {
    AppError::InvalidValue(format!(
        "insert or update on table \"{}\" violates foreign key constraint on \"developerId\"",
        table
    ))
}

impl Tables {
    fn info_of(&self, developer_id: i32) -> Option<&DeveloperInfo> {
        self.infos.values().find(|i| i.developer_id == developer_id)
    }

    fn developer_view(&self, d: &Developer) -> DeveloperView {
        let info = self.info_of(d.id);
        DeveloperView {
            developer_id: d.id,
            developer_name: d.name.clone(),
            developer_email: d.email.clone(),
            developer_info_id: info.map(|i| i.id),
            developer_info_developer_since: info.map(|i| i.developer_since),
            developer_info_preferred_os: info.map(|i| i.preferred_os.clone()),
        }
    }

    /// Technologies linked to a project as (id, name), ordered by technology id. A single `None`
    /// stands for "no technologies", mirroring the left join.
    fn technologies_of(&self, project_id: i32) -> Vec<Option<(i32, &'static str)>> {
        let mut techs: Vec<(i32, &'static str)> = self
            .links
            .values()
            .filter(|l| l.project_id == project_id)
            .filter_map(|l| technology_name(l.technology_id).map(|n| (l.technology_id, n)))
            .collect();
        techs.sort_by_key(|(id, _)| *id);
        if techs.is_empty() {
            vec![None]
        } else {
            techs.into_iter().map(Some).collect()
        }
    }

    fn project_views(&self, p: &Project) -> Vec<ProjectView> {
        self.technologies_of(p.id)
            .into_iter()
            .map(|tech| ProjectView {
                project_id: p.id,
                project_name: p.name.clone(),
                project_description: p.description.clone(),
                project_estimated_time: p.estimated_time.clone(),
                project_repository: p.repository.clone(),
                project_start_date: p.start_date,
                project_end_date: p.end_date,
                project_developer_id: p.developer_id,
                technology_id: tech.map(|(id, _)| id),
                technology_name: tech.map(|(_, name)| name.to_string()),
            })
            .collect()
    }

    fn remove_project(&mut self, id: i32) -> u64 {
        self.links.retain(|_, l| l.project_id != id);
        u64::from(self.projects.remove(&id).is_some())
    }
}

/// Store backed by in-process maps behind an async lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn developer_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables.read().await.developers.contains_key(&id))
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.tables.read().await.developers.values().any(|d| d.email == email))
    }

    async fn insert_developer(&self, new: &NewDeveloper) -> Result<Developer, AppError> {
        let mut t = self.tables.write().await;
        if t.developers.values().any(|d| d.email == new.email) {
            return Err(AppError::Conflict(EMAIL_EXISTS.into()));
        }
        let id = next(&mut t.seq.developers);
        let dev = Developer {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            developer_info_id: None,
        };
        t.developers.insert(id, dev.clone());
        Ok(dev)
    }

    async fn list_developers(&self) -> Result<Vec<DeveloperView>, AppError> {
        let t = self.tables.read().await;
        Ok(t.developers.values().map(|d| t.developer_view(d)).collect())
    }

    async fn developer_view(&self, id: i32) -> Result<Option<DeveloperView>, AppError> {
        let t = self.tables.read().await;
        Ok(t.developers.get(&id).map(|d| t.developer_view(d)))
    }

    async fn update_developer(&self, id: i32, fields: &FieldMap) -> Result<Option<Developer>, AppError> {
        let mut t = self.tables.write().await;
        let Some(current) = t.developers.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        for (col, v) in fields.iter() {
            match col {
                "name" => updated.name = text(col, v)?,
                "email" => updated.email = text(col, v)?,
                _ => {}
            }
        }
        if t.developers.values().any(|d| d.id != id && d.email == updated.email) {
            return Err(AppError::Conflict(EMAIL_EXISTS.into()));
        }
        t.developers.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_developer(&self, id: i32) -> Result<u64, AppError> {
        let mut t = self.tables.write().await;
        if t.developers.remove(&id).is_none() {
            return Ok(0);
        }
        t.infos.retain(|_, i| i.developer_id != id);
        let owned: Vec<i32> = t
            .projects
            .values()
            .filter(|p| p.developer_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in owned {
            t.remove_project(project_id);
        }
        Ok(1)
    }

    async fn insert_developer_info(
        &self,
        developer_id: i32,
        new: &NewDeveloperInfo,
    ) -> Result<DeveloperInfo, AppError> {
        let mut t = self.tables.write().await;
        if !t.developers.contains_key(&developer_id) {
            return Err(missing_developer("developer_infos"));
        }
        if t.info_of(developer_id).is_some() {
            return Err(AppError::Conflict(INFO_EXISTS.into()));
        }
        let developer_since = date(&new.developer_since)?;
        let id = next(&mut t.seq.infos);
        let info = DeveloperInfo {
            id,
            developer_since,
            preferred_os: new.preferred_os.clone(),
            developer_id,
        };
        t.infos.insert(id, info.clone());
        if let Some(dev) = t.developers.get_mut(&developer_id) {
            dev.developer_info_id = Some(id);
        }
        Ok(info)
    }

    async fn update_developer_info(
        &self,
        developer_id: i32,
        fields: &FieldMap,
    ) -> Result<Option<DeveloperInfo>, AppError> {
        let mut t = self.tables.write().await;
        let Some(current) = t.info_of(developer_id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        for (col, v) in fields.iter() {
            match col {
                "developerSince" => updated.developer_since = date(&text(col, v)?)?,
                "preferredOS" => updated.preferred_os = text(col, v)?,
                _ => {}
            }
        }
        t.infos.insert(updated.id, updated.clone());
        Ok(Some(updated))
    }

    async fn developer_projects(&self, developer_id: i32) -> Result<Vec<DeveloperProjectView>, AppError> {
        let t = self.tables.read().await;
        let Some(dev) = t.developers.get(&developer_id) else {
            return Ok(Vec::new());
        };
        let info = t.info_of(developer_id);
        let mut rows = Vec::new();
        for p in t.projects.values().filter(|p| p.developer_id == developer_id) {
            for tech in t.technologies_of(p.id) {
                rows.push(DeveloperProjectView {
                    developer_id: dev.id,
                    developer_name: dev.name.clone(),
                    developer_email: dev.email.clone(),
                    developer_info_id: dev.developer_info_id,
                    developer_info_developer_since: info.map(|i| i.developer_since),
                    developer_info_preferred_os: info.map(|i| i.preferred_os.clone()),
                    project_id: p.id,
                    project_name: p.name.clone(),
                    project_description: p.description.clone(),
                    project_estimated_time: p.estimated_time.clone(),
                    project_repository: p.repository.clone(),
                    project_start_date: p.start_date,
                    project_end_date: p.end_date,
                    technology_id: tech.map(|(id, _)| id),
                    technology_name: tech.map(|(_, name)| name.to_string()),
                });
            }
        }
        Ok(rows)
    }

    async fn project_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables.read().await.projects.contains_key(&id))
    }

    async fn insert_project(&self, new: &NewProject) -> Result<Project, AppError> {
        let mut t = self.tables.write().await;
        if !t.developers.contains_key(&new.developer_id) {
            return Err(missing_developer("projects"));
        }
        let start_date = date(&new.start_date)?;
        let end_date = new.end_date.as_deref().map(date).transpose()?;
        let id = next(&mut t.seq.projects);
        let project = Project {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            estimated_time: new.estimated_time.clone(),
            repository: new.repository.clone(),
            start_date,
            end_date,
            developer_id: new.developer_id,
        };
        t.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectView>, AppError> {
        let t = self.tables.read().await;
        Ok(t.projects.values().flat_map(|p| t.project_views(p)).collect())
    }

    async fn project_views(&self, id: i32) -> Result<Vec<ProjectView>, AppError> {
        let t = self.tables.read().await;
        Ok(t.projects.get(&id).map(|p| t.project_views(p)).unwrap_or_default())
    }

    async fn update_project(&self, id: i32, fields: &FieldMap) -> Result<Option<Project>, AppError> {
        let mut t = self.tables.write().await;
        let Some(current) = t.projects.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        for (col, v) in fields.iter() {
            match col {
                "name" => updated.name = text(col, v)?,
                "description" => updated.description = text(col, v)?,
                "estimatedTime" => updated.estimated_time = text(col, v)?,
                "repository" => updated.repository = text(col, v)?,
                "startDate" => updated.start_date = date(&text(col, v)?)?,
                "endDate" => updated.end_date = Some(date(&text(col, v)?)?),
                "developerId" => updated.developer_id = integer(&text(col, v)?)?,
                _ => {}
            }
        }
        if !t.developers.contains_key(&updated.developer_id) {
            return Err(missing_developer("projects"));
        }
        t.projects.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_project(&self, id: i32) -> Result<u64, AppError> {
        Ok(self.tables.write().await.remove_project(id))
    }

    async fn attach_technology(
        &self,
        project_id: i32,
        technology: Technology,
    ) -> Result<ProjectTechnologyView, AppError> {
        let mut t = self.tables.write().await;
        let Some(p) = t.projects.get(&project_id).cloned() else {
            return Err(AppError::InvalidValue(
                "insert or update on table \"projects_technologies\" violates foreign key constraint on \"projectId\"".into(),
            ));
        };
        let id = next(&mut t.seq.links);
        let link = ProjectTechnology {
            id,
            added_in: Utc::now(),
            project_id,
            technology_id: technology_id(technology),
        };
        t.links.insert(id, link);
        Ok(ProjectTechnologyView {
            technology_id: technology_id(technology),
            technology_name: technology.as_str().to_string(),
            project_id: p.id,
            project_name: p.name,
            project_description: p.description,
            project_estimated_time: p.estimated_time,
            project_repository: p.repository,
            project_start_date: p.start_date,
            project_end_date: p.end_date,
        })
    }

    async fn detach_technology(&self, project_id: i32, technology: Technology) -> Result<u64, AppError> {
        let mut t = self.tables.write().await;
        let tech_id = technology_id(technology);
        let before = t.links.len();
        t.links
            .retain(|_, l| !(l.project_id == project_id && l.technology_id == tech_id));
        Ok((before - t.links.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_project(developer_id: i32) -> NewProject {
        NewProject {
            name: "api".into(),
            description: "rest api".into(),
            estimated_time: "2 days".into(),
            repository: "https://example.com/api".into(),
            start_date: "2023-01-02".into(),
            end_date: None,
            developer_id,
        }
    }

    async fn seeded() -> MemoryStore {
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
    fn technology_ids_round_trip_through_seed_order() {
        for tech in Technology::ALL {
            assert_eq!(technology_name(technology_id(tech)), Some(tech.as_str()));
        }
        assert_eq!(technology_name(0), None);
        assert_eq!(technology_name(10), None);
    }

    #[tokio::test]
    async fn info_insert_links_developer() {
        let store = seeded().await;
        let info = store
            .insert_developer_info(
                1,
                &NewDeveloperInfo {
                    developer_since: "2019-05-01".into(),
                    preferred_os: "Linux".into(),
                },
            )
            .await
            .unwrap();
        let view = store.developer_view(1).await.unwrap().unwrap();
        assert_eq!(view.developer_info_id, Some(info.id));
        let again = store
            .insert_developer_info(
                1,
                &NewDeveloperInfo {
                    developer_since: "2019-05-01".into(),
                    preferred_os: "Linux".into(),
                },
            )
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[test]
    fn dates_accept_the_common_cast_forms() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 2);
        for input in ["2023-01-02", " 2023/01/02 ", "2023.01.02", "01/02/2023", "2023-01-02T10:30:00Z", "2023-01-02 10:30"] {
            assert_eq!(date(input).ok(), expected, "{input}");
        }
        assert!(date("2023-02-30").is_err());
        assert!(date("someday").is_err());
        assert!(date("").is_err());
    }

    #[tokio::test]
    async fn bad_dates_are_invalid_values() {
        let store = seeded().await;
        let mut project = new_project(1);
        project.start_date = "yesterday".into();
        assert!(matches!(store.insert_project(&project).await, Err(AppError::InvalidValue(_))));
    }

    #[tokio::test]
    async fn failed_update_leaves_row_untouched() {
        let store = seeded().await;
        store.insert_project(&new_project(1)).await.unwrap();
        let body = json!({"name": "renamed", "startDate": "not a date"});
        let fields = FieldMap::sparse(body.as_object().unwrap(), &["name", "startDate"]);
        assert!(store.update_project(1, &fields).await.is_err());
        let views = store.project_views(1).await.unwrap();
        assert_eq!(views[0].project_name, "api");
    }

    #[tokio::test]
    async fn deleting_developer_cascades() {
        let store = seeded().await;
        store.insert_project(&new_project(1)).await.unwrap();
        store.attach_technology(1, Technology::Python).await.unwrap();
        assert_eq!(store.delete_developer(1).await.unwrap(), 1);
        assert!(!store.project_exists(1).await.unwrap());
        assert!(store.list_projects().await.unwrap().is_empty());
        assert_eq!(store.delete_developer(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn project_views_order_technologies_by_id() {
        let store = seeded().await;
        store.insert_project(&new_project(1)).await.unwrap();
        store.attach_technology(1, Technology::MongoDb).await.unwrap();
        store.attach_technology(1, Technology::JavaScript).await.unwrap();
        let names: Vec<_> = store
            .project_views(1)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.technology_name)
            .collect();
        assert_eq!(names, vec![Some("JavaScript".to_string()), Some("MongoDB".to_string())]);
    }
}
