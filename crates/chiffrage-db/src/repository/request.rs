//! # Custom Request Repository
//!
//! Database operations for customer-proposed line items.
//!
//! ## Request Lifecycle
//! ```text
//! 1. CREATE
//!    └── insert() → CustomRequest { status: Pending }
//!
//! 2. DECIDE (administrator)
//!    └── approve(id, price, comment) → status: Approved, admin price set
//!    └── reject(id, comment)         → status: Rejected
//!    Both stamp decided_at and are terminal: a decided request cannot
//!    be re-decided.
//!
//! 3. (OPTIONAL) the customer wraps an approved request in a Selection;
//!    from then on it contributes through the selection, not directly.
//! ```
//!
//! Every mutation returns the ProjectEvent the caller hands to the
//! summary engine.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chiffrage_core::{validation, CoreError, CustomRequest, Money, ProjectEvent, RequestStatus};

const REQUEST_COLUMNS: &str = r#"
    id, project_id, category_id, discipline_id, designation, characteristics,
    unit, quantity_hundredths, status, admin_price_cents, admin_comment,
    requested_at, decided_at
"#;

/// Repository for custom request database operations.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    /// Creates a new RequestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RequestRepository { pool }
    }

    /// Inserts a new (pending) request.
    pub async fn insert(&self, request: &CustomRequest) -> DbResult<ProjectEvent> {
        validation::validate_designation(&request.designation).map_err(CoreError::Validation)?;
        validation::validate_quantity_hundredths(request.quantity_hundredths)
            .map_err(CoreError::Validation)?;

        debug!(
            id = %request.id,
            project_id = %request.project_id,
            designation = %request.designation,
            "inserting custom request"
        );

        sqlx::query(
            r#"
            INSERT INTO custom_requests (
                id, project_id, category_id, discipline_id, designation,
                characteristics, unit, quantity_hundredths, status,
                admin_price_cents, admin_comment, requested_at, decided_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&request.id)
        .bind(&request.project_id)
        .bind(&request.category_id)
        .bind(&request.discipline_id)
        .bind(&request.designation)
        .bind(&request.characteristics)
        .bind(request.unit)
        .bind(request.quantity_hundredths)
        .bind(request.status)
        .bind(request.admin_price_cents)
        .bind(&request.admin_comment)
        .bind(request.requested_at)
        .bind(request.decided_at)
        .execute(&self.pool)
        .await?;

        Ok(ProjectEvent::RequestChanged {
            project_id: request.project_id.clone(),
        })
    }

    /// Gets a request by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CustomRequest>> {
        let request = sqlx::query_as::<_, CustomRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM custom_requests WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Lists a project's requests, newest first.
    pub async fn list_for_project(&self, project_id: &str) -> DbResult<Vec<CustomRequest>> {
        let requests = sqlx::query_as::<_, CustomRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM custom_requests
            WHERE project_id = ?1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Lists every pending request, oldest first (the admin work queue).
    pub async fn list_pending(&self) -> DbResult<Vec<CustomRequest>> {
        let requests = sqlx::query_as::<_, CustomRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM custom_requests
            WHERE status = 'pending'
            ORDER BY requested_at
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Approves a pending request with its administrator price.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the request does not exist or is no
    /// longer pending (the transition is terminal).
    pub async fn approve(
        &self,
        id: &str,
        admin_price: Money,
        admin_comment: Option<&str>,
    ) -> DbResult<ProjectEvent> {
        validation::validate_price_cents(admin_price.cents()).map_err(CoreError::Validation)?;

        debug!(id = %id, price = %admin_price, "approving custom request");

        let result = sqlx::query(
            r#"
            UPDATE custom_requests SET
                status = 'approved',
                admin_price_cents = ?2,
                admin_comment = ?3,
                decided_at = ?4
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(admin_price.cents())
        .bind(admin_comment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomRequest (pending)", id));
        }

        self.event_for(id).await
    }

    /// Rejects a pending request.
    ///
    /// Same terminal-transition guard as [`Self::approve`].
    pub async fn reject(&self, id: &str, admin_comment: Option<&str>) -> DbResult<ProjectEvent> {
        debug!(id = %id, "rejecting custom request");

        let result = sqlx::query(
            r#"
            UPDATE custom_requests SET
                status = 'rejected',
                admin_comment = ?2,
                decided_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(admin_comment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomRequest (pending)", id));
        }

        self.event_for(id).await
    }

    /// Updates the quantity of a request (customer edit before decision).
    pub async fn update_quantity(&self, id: &str, quantity_hundredths: i64) -> DbResult<ProjectEvent> {
        validation::validate_quantity_hundredths(quantity_hundredths)
            .map_err(CoreError::Validation)?;

        let result = sqlx::query(
            r#"
            UPDATE custom_requests SET quantity_hundredths = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(quantity_hundredths)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomRequest (pending)", id));
        }

        self.event_for(id).await
    }

    /// Deletes a request. Selections wrapping it go with it (FK cascade).
    pub async fn delete(&self, id: &str) -> DbResult<ProjectEvent> {
        debug!(id = %id, "deleting custom request");

        let event = self.event_for(id).await?;

        let result = sqlx::query("DELETE FROM custom_requests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomRequest", id));
        }

        Ok(event)
    }

    /// Builds the RequestChanged event for a request's project.
    async fn event_for(&self, id: &str) -> DbResult<ProjectEvent> {
        let project_id: Option<String> =
            sqlx::query_scalar("SELECT project_id FROM custom_requests WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match project_id {
            Some(project_id) => Ok(ProjectEvent::RequestChanged { project_id }),
            None => Err(DbError::not_found("CustomRequest", id)),
        }
    }

    /// Counts requests with a given status (for diagnostics).
    pub async fn count_with_status(&self, status: RequestStatus) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM custom_requests WHERE status = ?1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new request ID.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
