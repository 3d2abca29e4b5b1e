//! # Project Repository
//!
//! Database operations for projects.
//!
//! Deleting a project is a hard delete: selections, requests, sandblast
//! data and the summary row all go with it (FK cascades in the schema).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chiffrage_core::Project;

/// Repository for project database operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProjectRepository { pool }
    }

    /// Inserts a new project.
    pub async fn insert(&self, project: &Project) -> DbResult<()> {
        debug!(id = %project.id, name = %project.name, "inserting project");

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, client_name, description, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.client_name)
        .bind(&project.description)
        .bind(project.active)
        .bind(project.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates and inserts a project from its display fields.
    pub async fn create(&self, name: &str, client_name: Option<&str>) -> DbResult<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            client_name: client_name.map(str::to_string),
            description: None,
            active: true,
            created_at: Utc::now(),
        };
        self.insert(&project).await?;
        Ok(project)
    }

    /// Gets a project by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, client_name, description, active, created_at
            FROM projects
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    /// Lists active projects, most recent first.
    pub async fn list_active(&self) -> DbResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, client_name, description, active, created_at
            FROM projects
            WHERE active = 1
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    /// Deactivates a project (soft delete; data stays queryable).
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "deactivating project");

        let result = sqlx::query("UPDATE projects SET active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        Ok(())
    }

    /// Hard-deletes a project. Cascades to selections, requests,
    /// sandblast data and the summary row.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "deleting project");

        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }

        Ok(())
    }

    /// Counts projects (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
