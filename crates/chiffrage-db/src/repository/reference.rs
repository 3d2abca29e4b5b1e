//! # Reference Data Repository
//!
//! Categories and disciplines: static lookup data consumed by everything
//! above. Read-mostly; created by the catalog administrator, immutable in
//! practice afterwards.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use chiffrage_core::{validation, Category, CategoryKind, CoreError, Discipline};

/// Repository for reference data (categories and disciplines).
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReferenceRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Inserts a category.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code already exists.
    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        validation::validate_code(&category.code).map_err(CoreError::Validation)?;

        debug!(code = %category.code, "inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, kind, code, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.kind)
        .bind(&category.code)
        .bind(&category.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a category by its ID.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, code, description FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by its business code.
    pub async fn get_category_by_code(&self, code: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, code, description FROM categories WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories, bucket kind then code order.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, code, description FROM categories ORDER BY kind, code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Lists categories of one kind.
    pub async fn list_categories_of_kind(&self, kind: CategoryKind) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, code, description FROM categories WHERE kind = ?1 ORDER BY code",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // -------------------------------------------------------------------------
    // Disciplines
    // -------------------------------------------------------------------------

    /// Inserts a discipline.
    pub async fn insert_discipline(&self, discipline: &Discipline) -> DbResult<()> {
        validation::validate_code(&discipline.code).map_err(CoreError::Validation)?;
        validation::validate_hex_color(&discipline.color).map_err(CoreError::Validation)?;

        debug!(code = %discipline.code, "inserting discipline");

        sqlx::query(
            r#"
            INSERT INTO disciplines (id, name, code, color)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&discipline.id)
        .bind(&discipline.name)
        .bind(&discipline.code)
        .bind(&discipline.color)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a discipline by its ID.
    pub async fn get_discipline(&self, id: &str) -> DbResult<Option<Discipline>> {
        let discipline = sqlx::query_as::<_, Discipline>(
            "SELECT id, name, code, color FROM disciplines WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discipline)
    }

    /// Lists all disciplines in code order.
    pub async fn list_disciplines(&self) -> DbResult<Vec<Discipline>> {
        let disciplines = sqlx::query_as::<_, Discipline>(
            "SELECT id, name, code, color FROM disciplines ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(disciplines)
    }

    /// Counts categories (seed guard).
    pub async fn count_categories(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a reference-data ID.
pub fn generate_reference_id() -> String {
    Uuid::new_v4().to_string()
}
