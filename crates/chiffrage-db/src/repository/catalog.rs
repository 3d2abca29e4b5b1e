//! # Catalog Repository
//!
//! Database operations for administrator-owned catalog items.
//!
//! ## Price Change Propagation
//! ```text
//! update_price(item, new_price)
//!      │
//!      ▼
//! UPDATE catalog_items ... ──► returns CatalogPriceChanged event
//!      │
//!      ▼
//! caller hands the event to SummaryEngine::apply
//!      │
//!      ▼
//! every project with a selection referencing the item is recomputed
//! ```
//!
//! The repository never recomputes by itself; it reports what changed and
//! the engine owns the fan-out.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chiffrage_core::{validation, CatalogItem, CoreError, Money, ProjectEvent};

const ITEM_COLUMNS: &str = r#"
    id, number, designation, characteristics, unit_price_cents, unit,
    category_id, discipline_id, active, created_at, updated_at
"#;

/// Repository for catalog item database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a new catalog item.
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        validation::validate_designation(&item.designation).map_err(CoreError::Validation)?;
        validation::validate_price_cents(item.unit_price_cents).map_err(CoreError::Validation)?;

        debug!(id = %item.id, designation = %item.designation, "inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, number, designation, characteristics, unit_price_cents, unit,
                category_id, discipline_id, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.number)
        .bind(&item.designation)
        .bind(&item.characteristics)
        .bind(item.unit_price_cents)
        .bind(item.unit)
        .bind(&item.category_id)
        .bind(&item.discipline_id)
        .bind(item.active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a catalog item by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let item = sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM catalog_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists active items, catalog number then designation order.
    pub async fn list_active(&self) -> DbResult<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM catalog_items
            WHERE active = 1
            ORDER BY number, designation
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists active items in a category.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM catalog_items
            WHERE category_id = ?1 AND active = 1
            ORDER BY number, designation
            "#
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates an item's descriptive fields (not the price).
    pub async fn update_details(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, "updating catalog item details");

        let result = sqlx::query(
            r#"
            UPDATE catalog_items SET
                number = ?2,
                designation = ?3,
                characteristics = ?4,
                unit = ?5,
                category_id = ?6,
                discipline_id = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.number)
        .bind(&item.designation)
        .bind(&item.characteristics)
        .bind(item.unit)
        .bind(&item.category_id)
        .bind(&item.discipline_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", &item.id));
        }

        Ok(())
    }

    /// Changes an item's unit price.
    ///
    /// Returns the [`ProjectEvent::CatalogPriceChanged`] the caller must
    /// hand to the summary engine so every referencing project gets
    /// recomputed.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<ProjectEvent> {
        validation::validate_price_cents(price.cents()).map_err(CoreError::Validation)?;

        debug!(id = %id, price = %price, "updating catalog item price");

        let result = sqlx::query(
            r#"
            UPDATE catalog_items SET
                unit_price_cents = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", id));
        }

        Ok(ProjectEvent::CatalogPriceChanged {
            catalog_item_id: id.to_string(),
        })
    }

    /// Soft-deletes an item. Existing selections keep their reference;
    /// the item just stops being selectable.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "soft-deleting catalog item");

        let result = sqlx::query(
            "UPDATE catalog_items SET active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", id));
        }

        Ok(())
    }

    /// Counts active items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items WHERE active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new catalog item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
