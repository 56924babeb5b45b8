//! PostgreSQL store over a shared `PgPool`, plus idempotent table DDL.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::AppError;
use crate::model::{
    Developer, DeveloperInfo, DeveloperProjectView, DeveloperView, NewDeveloper, NewDeveloperInfo,
    NewProject, Project, ProjectTechnologyView, ProjectView, Technology,
};
use crate::service::{FieldMap, EMAIL_EXISTS};
use crate::sql::{update_row, Table, DEVELOPERS, DEVELOPER_INFOS, PROJECTS};
use crate::store::{Store, INFO_EXISTS};

/// Tables in dependency order. Deleting a developer cascades to its info and projects; deleting
/// a project cascades to its technology links.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "developers" (
        "id" SERIAL PRIMARY KEY,
        "name" TEXT NOT NULL,
        "email" TEXT NOT NULL UNIQUE,
        "developerInfoId" INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "developer_infos" (
        "id" SERIAL PRIMARY KEY,
        "developerSince" DATE NOT NULL,
        "preferredOS" TEXT NOT NULL,
        "developerId" INTEGER NOT NULL UNIQUE REFERENCES "developers" ("id") ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "technologies" (
        "id" SERIAL PRIMARY KEY,
        "name" TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "projects" (
        "id" SERIAL PRIMARY KEY,
        "name" TEXT NOT NULL,
        "description" TEXT NOT NULL,
        "estimatedTime" TEXT NOT NULL,
        "repository" TEXT NOT NULL,
        "startDate" DATE NOT NULL,
        "endDate" DATE,
        "developerId" INTEGER NOT NULL REFERENCES "developers" ("id") ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "projects_technologies" (
        "id" SERIAL PRIMARY KEY,
        "addedIn" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        "projectId" INTEGER NOT NULL REFERENCES "projects" ("id") ON DELETE CASCADE,
        "technologyId" INTEGER NOT NULL REFERENCES "technologies" ("id") ON DELETE CASCADE
    )
    "#,
];

/// Create the five tables if missing and seed the technology vocabulary.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    for tech in Technology::ALL {
        sqlx::query(r#"INSERT INTO "technologies" ("name") VALUES ($1) ON CONFLICT ("name") DO NOTHING"#)
            .bind(tech.as_str())
            .execute(pool)
            .await?;
    }
    Ok(())
}

const DEVELOPER_VIEW: &str = r#"
    SELECT d."id" AS "developerId",
        d."name" AS "developerName",
        d."email" AS "developerEmail",
        di."id" AS "developerInfoId",
        di."developerSince" AS "developerInfoDeveloperSince",
        di."preferredOS" AS "developerInfoPreferredOS"
    FROM "developers" d
    LEFT JOIN "developer_infos" di ON d."id" = di."developerId"
"#;

const PROJECT_VIEW: &str = r#"
    SELECT p."id" AS "projectId",
        p."name" AS "projectName",
        p."description" AS "projectDescription",
        p."estimatedTime" AS "projectEstimatedTime",
        p."repository" AS "projectRepository",
        p."startDate" AS "projectStartDate",
        p."endDate" AS "projectEndDate",
        p."developerId" AS "projectDeveloperId",
        t."id" AS "technologyId",
        t."name" AS "technologyName"
    FROM "projects" p
    LEFT JOIN "projects_technologies" pt ON pt."projectId" = p."id"
    LEFT JOIN "technologies" t ON pt."technologyId" = t."id"
"#;

const DEVELOPER_PROJECTS: &str = r#"
    SELECT d."id" AS "developerId",
        d."name" AS "developerName",
        d."email" AS "developerEmail",
        d."developerInfoId" AS "developerInfoId",
        di."developerSince" AS "developerInfoDeveloperSince",
        di."preferredOS" AS "developerInfoPreferredOS",
        p."id" AS "projectId",
        p."name" AS "projectName",
        p."description" AS "projectDescription",
        p."estimatedTime" AS "projectEstimatedTime",
        p."repository" AS "projectRepository",
        p."startDate" AS "projectStartDate",
        p."endDate" AS "projectEndDate",
        t."id" AS "technologyId",
        t."name" AS "technologyName"
    FROM "projects" p
    JOIN "developers" d ON p."developerId" = d."id"
    LEFT JOIN "developer_infos" di ON d."id" = di."developerId"
    LEFT JOIN "projects_technologies" pt ON pt."projectId" = p."id"
    LEFT JOIN "technologies" t ON pt."technologyId" = t."id"
    WHERE d."id" = $1
    ORDER BY p."id", t."id"
"#;

const PROJECT_TECHNOLOGY_VIEW: &str = r#"
    SELECT t."id" AS "technologyId",
        t."name" AS "technologyName",
        p."id" AS "projectId",
        p."name" AS "projectName",
        p."description" AS "projectDescription",
        p."estimatedTime" AS "projectEstimatedTime",
        p."repository" AS "projectRepository",
        p."startDate" AS "projectStartDate",
        p."endDate" AS "projectEndDate"
    FROM "projects_technologies" pt
    JOIN "technologies" t ON pt."technologyId" = t."id"
    JOIN "projects" p ON pt."projectId" = p."id"
    WHERE pt."id" = $1
"#;

/// Map constraint and coercion failures to client errors; everything else stays a store fault.
/// `conflict` is the message used for a unique violation on this statement.
fn classify(err: sqlx::Error, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict.to_string());
        }
        let code = db.code().unwrap_or_default();
        // 22xxx data exceptions, 23502 not-null and 23503 foreign-key violations.
        if code.starts_with("22") || code == "23502" || code == "23503" {
            return AppError::InvalidValue(db.message().to_string());
        }
    }
    AppError::Db(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Shutdown hook: waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn update_returning<T>(&self, table: &Table, key: i32, fields: &FieldMap, conflict: &str) -> Result<Option<T>, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let q = update_row(table, fields);
        tracing::debug!(sql = %q.sql, params = q.params.len() + 1, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql).bind(key);
        for p in q.params {
            query = query.bind(p.into_text());
        }
        query.fetch_optional(&self.pool).await.map_err(|e| classify(e, conflict))
    }

    async fn exists(&self, sql: &str, id: i32) -> Result<bool, AppError> {
        tracing::debug!(sql = %sql, params = 1, "query");
        let found: bool = sqlx::query_scalar(sql).bind(id).fetch_one(&self.pool).await?;
        Ok(found)
    }

    async fn delete(&self, sql: &str, id: i32) -> Result<u64, AppError> {
        tracing::debug!(sql = %sql, params = 1, "query");
        let done = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn developer_exists(&self, id: i32) -> Result<bool, AppError> {
        self.exists(r#"SELECT EXISTS(SELECT 1 FROM "developers" WHERE "id" = $1)"#, id).await
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM "developers" WHERE "email" = $1)"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_developer(&self, new: &NewDeveloper) -> Result<Developer, AppError> {
        sqlx::query_as::<_, Developer>(r#"INSERT INTO "developers" ("name", "email") VALUES ($1, $2) RETURNING *"#)
            .bind(&new.name)
            .bind(&new.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, EMAIL_EXISTS))
    }

    async fn list_developers(&self) -> Result<Vec<DeveloperView>, AppError> {
        let sql = format!(r#"{} ORDER BY d."id""#, DEVELOPER_VIEW);
        tracing::debug!(sql = %sql, params = 0, "query");
        Ok(sqlx::query_as::<_, DeveloperView>(&sql).fetch_all(&self.pool).await?)
    }

    async fn developer_view(&self, id: i32) -> Result<Option<DeveloperView>, AppError> {
        let sql = format!(r#"{} WHERE d."id" = $1"#, DEVELOPER_VIEW);
        tracing::debug!(sql = %sql, params = 1, "query");
        Ok(sqlx::query_as::<_, DeveloperView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_developer(&self, id: i32, fields: &FieldMap) -> Result<Option<Developer>, AppError> {
        self.update_returning(&DEVELOPERS, id, fields, EMAIL_EXISTS).await
    }

    async fn delete_developer(&self, id: i32) -> Result<u64, AppError> {
        self.delete(r#"DELETE FROM "developers" WHERE "id" = $1"#, id).await
    }

    async fn insert_developer_info(
        &self,
        developer_id: i32,
        new: &NewDeveloperInfo,
    ) -> Result<DeveloperInfo, AppError> {
        let mut tx = self.pool.begin().await?;
        let info = sqlx::query_as::<_, DeveloperInfo>(
            r#"INSERT INTO "developer_infos" ("developerSince", "preferredOS", "developerId") VALUES ($1::date, $2, $3) RETURNING *"#,
        )
        .bind(&new.developer_since)
        .bind(&new.preferred_os)
        .bind(developer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, INFO_EXISTS))?;
        sqlx::query(r#"UPDATE "developers" SET "developerInfoId" = $1 WHERE "id" = $2"#)
            .bind(info.id)
            .bind(developer_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(info)
    }

    async fn update_developer_info(
        &self,
        developer_id: i32,
        fields: &FieldMap,
    ) -> Result<Option<DeveloperInfo>, AppError> {
        self.update_returning(&DEVELOPER_INFOS, developer_id, fields, INFO_EXISTS).await
    }

    async fn developer_projects(&self, developer_id: i32) -> Result<Vec<DeveloperProjectView>, AppError> {
        tracing::debug!(sql = %DEVELOPER_PROJECTS, params = 1, "query");
        Ok(sqlx::query_as::<_, DeveloperProjectView>(DEVELOPER_PROJECTS)
            .bind(developer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn project_exists(&self, id: i32) -> Result<bool, AppError> {
        self.exists(r#"SELECT EXISTS(SELECT 1 FROM "projects" WHERE "id" = $1)"#, id).await
    }

    async fn insert_project(&self, new: &NewProject) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO "projects"
                ("name", "description", "estimatedTime", "repository", "startDate", "endDate", "developerId")
            VALUES ($1, $2, $3, $4, $5::date, $6::date, $7)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.estimated_time)
        .bind(&new.repository)
        .bind(&new.start_date)
        .bind(&new.end_date)
        .bind(new.developer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "Project already exists."))
    }

    async fn list_projects(&self) -> Result<Vec<ProjectView>, AppError> {
        let sql = format!(r#"{} ORDER BY p."id", t."id""#, PROJECT_VIEW);
        tracing::debug!(sql = %sql, params = 0, "query");
        Ok(sqlx::query_as::<_, ProjectView>(&sql).fetch_all(&self.pool).await?)
    }

    async fn project_views(&self, id: i32) -> Result<Vec<ProjectView>, AppError> {
        let sql = format!(r#"{} WHERE p."id" = $1 ORDER BY t."id""#, PROJECT_VIEW);
        tracing::debug!(sql = %sql, params = 1, "query");
        Ok(sqlx::query_as::<_, ProjectView>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_project(&self, id: i32, fields: &FieldMap) -> Result<Option<Project>, AppError> {
        self.update_returning(&PROJECTS, id, fields, "Project already exists.").await
    }

    async fn delete_project(&self, id: i32) -> Result<u64, AppError> {
        self.delete(r#"DELETE FROM "projects" WHERE "id" = $1"#, id).await
    }

    async fn attach_technology(
        &self,
        project_id: i32,
        technology: Technology,
    ) -> Result<ProjectTechnologyView, AppError> {
        let mut tx = self.pool.begin().await?;
        let technology_id: i32 = sqlx::query_scalar(r#"SELECT "id" FROM "technologies" WHERE "name" = $1"#)
            .bind(technology.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let link_id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "projects_technologies" ("technologyId", "projectId", "addedIn") VALUES ($1, $2, $3) RETURNING "id""#,
        )
        .bind(technology_id)
        .bind(project_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, "Technology already added."))?;
        let view = sqlx::query_as::<_, ProjectTechnologyView>(PROJECT_TECHNOLOGY_VIEW)
            .bind(link_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(view)
    }

    async fn detach_technology(&self, project_id: i32, technology: Technology) -> Result<u64, AppError> {
        let technology_id: Option<i32> = sqlx::query_scalar(r#"SELECT "id" FROM "technologies" WHERE "name" = $1"#)
            .bind(technology.as_str())
            .fetch_optional(&self.pool)
            .await?;
        let Some(technology_id) = technology_id else {
            return Ok(0);
        };
        let done = sqlx::query(r#"DELETE FROM "projects_technologies" WHERE "projectId" = $1 AND "technologyId" = $2"#)
            .bind(project_id)
            .bind(technology_id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
