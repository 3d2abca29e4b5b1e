//! # Selection Repository
//!
//! Database operations for a project's selected line items.
//!
//! ## Source Mapping
//! The store keeps two nullable reference columns with a CHECK constraint
//! forbidding both being set; the domain type is the tagged
//! [`SelectionSource`] sum type. Rows are mapped at the boundary, and a
//! pre-constraint row that somehow carries both references surfaces as a
//! typed domain error instead of being silently mispriced.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chiffrage_core::{validation, CoreError, Money, ProjectEvent, Selection, SelectionSource};

/// Flat row shape; converted to the domain type at the boundary.
#[derive(Debug, sqlx::FromRow)]
struct SelectionRow {
    id: String,
    project_id: String,
    catalog_item_id: Option<String>,
    custom_request_id: Option<String>,
    quantity_hundredths: i64,
    price_override_cents: Option<i64>,
    added_at: DateTime<Utc>,
}

impl SelectionRow {
    fn into_selection(self) -> DbResult<Selection> {
        let source = SelectionSource::from_columns(self.catalog_item_id, self.custom_request_id)
            .ok_or(CoreError::AmbiguousSelectionSource {
                selection_id: self.id.clone(),
            })?;

        Ok(Selection {
            id: self.id,
            project_id: self.project_id,
            source,
            quantity_hundredths: self.quantity_hundredths,
            price_override_cents: self.price_override_cents,
            added_at: self.added_at,
        })
    }
}

const SELECTION_COLUMNS: &str = r#"
    id, project_id, catalog_item_id, custom_request_id,
    quantity_hundredths, price_override_cents, added_at
"#;

/// Repository for selection database operations.
#[derive(Debug, Clone)]
pub struct SelectionRepository {
    pool: SqlitePool,
}

impl SelectionRepository {
    /// Creates a new SelectionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SelectionRepository { pool }
    }

    /// Inserts a new selection.
    pub async fn insert(&self, selection: &Selection) -> DbResult<ProjectEvent> {
        validation::validate_quantity_hundredths(selection.quantity_hundredths)
            .map_err(CoreError::Validation)?;

        debug!(
            id = %selection.id,
            project_id = %selection.project_id,
            "inserting selection"
        );

        let (catalog_item_id, custom_request_id) = selection.source.as_columns();

        sqlx::query(
            r#"
            INSERT INTO selections (
                id, project_id, catalog_item_id, custom_request_id,
                quantity_hundredths, price_override_cents, added_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&selection.id)
        .bind(&selection.project_id)
        .bind(catalog_item_id)
        .bind(custom_request_id)
        .bind(selection.quantity_hundredths)
        .bind(selection.price_override_cents)
        .bind(selection.added_at)
        .execute(&self.pool)
        .await?;

        Ok(ProjectEvent::SelectionChanged {
            project_id: selection.project_id.clone(),
        })
    }

    /// Convenience constructor for a catalog-backed selection.
    pub async fn add_catalog_item(
        &self,
        project_id: &str,
        catalog_item_id: &str,
        quantity_hundredths: i64,
    ) -> DbResult<(Selection, ProjectEvent)> {
        let selection = Selection {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            source: SelectionSource::Catalog {
                item_id: catalog_item_id.to_string(),
            },
            quantity_hundredths,
            price_override_cents: None,
            added_at: Utc::now(),
        };
        let event = self.insert(&selection).await?;
        Ok((selection, event))
    }

    /// Convenience constructor for a request-backed selection.
    pub async fn add_custom_request(
        &self,
        project_id: &str,
        custom_request_id: &str,
        quantity_hundredths: i64,
    ) -> DbResult<(Selection, ProjectEvent)> {
        let selection = Selection {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            source: SelectionSource::Request {
                request_id: custom_request_id.to_string(),
            },
            quantity_hundredths,
            price_override_cents: None,
            added_at: Utc::now(),
        };
        let event = self.insert(&selection).await?;
        Ok((selection, event))
    }

    /// Gets a selection by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Selection>> {
        let row = sqlx::query_as::<_, SelectionRow>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM selections WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SelectionRow::into_selection).transpose()
    }

    /// Lists a project's selections in add order.
    pub async fn list_for_project(&self, project_id: &str) -> DbResult<Vec<Selection>> {
        let rows = sqlx::query_as::<_, SelectionRow>(&format!(
            r#"
            SELECT {SELECTION_COLUMNS} FROM selections
            WHERE project_id = ?1
            ORDER BY added_at
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SelectionRow::into_selection).collect()
    }

    /// Updates a selection's quantity.
    pub async fn update_quantity(
        &self,
        id: &str,
        quantity_hundredths: i64,
    ) -> DbResult<ProjectEvent> {
        validation::validate_quantity_hundredths(quantity_hundredths)
            .map_err(CoreError::Validation)?;

        debug!(id = %id, quantity = quantity_hundredths, "updating selection quantity");

        let result = sqlx::query(
            "UPDATE selections SET quantity_hundredths = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity_hundredths)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Selection", id));
        }

        self.event_for(id).await
    }

    /// Sets or clears a selection's manual price override.
    ///
    /// `None` clears the override (the cascade falls back to the linked
    /// source's price).
    pub async fn set_price_override(
        &self,
        id: &str,
        price: Option<Money>,
    ) -> DbResult<ProjectEvent> {
        if let Some(price) = price {
            validation::validate_price_cents(price.cents()).map_err(CoreError::Validation)?;
        }

        debug!(id = %id, "setting selection price override");

        let result = sqlx::query(
            "UPDATE selections SET price_override_cents = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(price.map(|p| p.cents()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Selection", id));
        }

        self.event_for(id).await
    }

    /// Deletes a selection.
    pub async fn delete(&self, id: &str) -> DbResult<ProjectEvent> {
        debug!(id = %id, "deleting selection");

        let event = self.event_for(id).await?;

        let result = sqlx::query("DELETE FROM selections WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Selection", id));
        }

        Ok(event)
    }

    /// Distinct projects holding a selection that references a catalog
    /// item. The fan-out set for a price change: a set, not a list, so a
    /// project with five selections of the item is recomputed once.
    pub async fn projects_referencing_item(&self, catalog_item_id: &str) -> DbResult<Vec<String>> {
        let project_ids: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT project_id FROM selections WHERE catalog_item_id = ?1",
        )
        .bind(catalog_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(project_ids)
    }

    /// Builds the SelectionChanged event for a selection's project.
    async fn event_for(&self, id: &str) -> DbResult<ProjectEvent> {
        let project_id: Option<String> =
            sqlx::query_scalar("SELECT project_id FROM selections WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match project_id {
            Some(project_id) => Ok(ProjectEvent::SelectionChanged { project_id }),
            None => Err(DbError::not_found("Selection", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_util::{create_item, create_project, seed_reference, test_db};
    use chiffrage_core::{CategoryKind, Money, SelectionSource};

    #[tokio::test]
    async fn test_selection_round_trip() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "selections").await;
        let item = create_item(&db, &refs, CategoryKind::Material, 1_000).await;

        let (selection, _) = db
            .selections()
            .add_catalog_item(&project.id, &item.id, 250)
            .await
            .unwrap();

        let fetched = db
            .selections()
            .get_by_id(&selection.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            fetched.source,
            SelectionSource::Catalog {
                item_id: item.id.clone()
            }
        );
        assert_eq!(fetched.quantity_hundredths, 250);
        assert!(fetched.price_override_cents.is_none());
    }

    #[tokio::test]
    async fn test_override_set_and_clear() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "override").await;
        let item = create_item(&db, &refs, CategoryKind::Material, 1_000).await;

        let (selection, _) = db
            .selections()
            .add_catalog_item(&project.id, &item.id, 100)
            .await
            .unwrap();

        db.selections()
            .set_price_override(&selection.id, Some(Money::from_cents(42)))
            .await
            .unwrap();
        let fetched = db
            .selections()
            .get_by_id(&selection.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.price_override_cents, Some(42));

        db.selections()
            .set_price_override(&selection.id, None)
            .await
            .unwrap();
        let fetched = db
            .selections()
            .get_by_id(&selection.id)
            .await
            .unwrap()
            .unwrap();
        assert!(fetched.price_override_cents.is_none());
    }

    #[tokio::test]
    async fn test_projects_referencing_item_is_distinct() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let p1 = create_project(&db, "P1").await;
        let p2 = create_project(&db, "P2").await;
        let item = create_item(&db, &refs, CategoryKind::Material, 1_000).await;

        for _ in 0..3 {
            db.selections()
                .add_catalog_item(&p1.id, &item.id, 100)
                .await
                .unwrap();
        }
        db.selections()
            .add_catalog_item(&p2.id, &item.id, 100)
            .await
            .unwrap();

        let mut projects = db
            .selections()
            .projects_referencing_item(&item.id)
            .await
            .unwrap();
        projects.sort();
        let mut expected = vec![p1.id, p2.id];
        expected.sort();
        assert_eq!(projects, expected);
    }
}
