//! # Sandblast Repository
//!
//! Database operations for sandblast sessions and their calculations.
//!
//! ## Session Lifecycle
//! ```text
//! 1. FINALIZE A DRAFT
//!    └── finalize_draft() → SandblastSession { validated: false }
//!        Session row + one calculation row per pick, one transaction.
//!
//! 2. VALIDATE
//!    └── validate_session() → validated: true, validated_at stamped
//!        Only now does the session contribute to the project summary.
//!
//! 3. (OPTIONAL) DELETE
//!    └── delete_session() → calculations cascade away
//! ```
//!
//! The in-memory draft itself lives in chiffrage-core; this repository
//! only sees it at the finalize boundary.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chiffrage_core::{
    CoreError, Money, ProjectEvent, SandblastCalculation, SandblastDraft, SandblastSession,
    DEFAULT_SANDBLAST_RATE_CENTS,
};

const SESSION_COLUMNS: &str = r#"
    id, project_id, total_area_micro, price_per_m2_cents, total_cost_cents,
    validated, validated_at, created_at
"#;

const CALCULATION_COLUMNS: &str = r#"
    id, session_id, project_id, piece_type, diameter_dn,
    quantity_hundredths, unit_area_micro, total_area_micro, created_at
"#;

/// Repository for sandblast database operations.
#[derive(Debug, Clone)]
pub struct SandblastRepository {
    pool: SqlitePool,
}

impl SandblastRepository {
    /// Creates a new SandblastRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SandblastRepository { pool }
    }

    /// Persists a draft as an unvalidated session.
    ///
    /// Inserts the session row and one calculation row per pick in a
    /// single transaction: a half-written session can never exist.
    ///
    /// ## Arguments
    /// * `project_id` - owning project
    /// * `draft` - the in-memory working set; must have at least one pick
    /// * `price_per_m2` - billing rate; `None` uses the default
    ///   5 000.00 CFA rate
    ///
    /// ## Errors
    /// `CoreError::EmptyDraft` (as `DbError::Domain`) for an empty draft.
    pub async fn finalize_draft(
        &self,
        project_id: &str,
        draft: &SandblastDraft,
        price_per_m2: Option<Money>,
    ) -> DbResult<(SandblastSession, ProjectEvent)> {
        if draft.is_empty() {
            return Err(CoreError::EmptyDraft.into());
        }

        let rate = price_per_m2.unwrap_or(Money::from_cents(DEFAULT_SANDBLAST_RATE_CENTS));
        let total_area = draft.total_area();
        let now = Utc::now();

        let session = SandblastSession {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            total_area_micro: total_area.micro(),
            price_per_m2_cents: rate.cents(),
            total_cost_cents: total_area.cost_at(rate).cents(),
            validated: false,
            validated_at: None,
            created_at: now,
        };

        debug!(
            id = %session.id,
            project_id = %project_id,
            picks = draft.len(),
            total_area = %total_area,
            "finalizing sandblast draft"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sandblast_sessions (
                id, project_id, total_area_micro, price_per_m2_cents,
                total_cost_cents, validated, validated_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&session.id)
        .bind(&session.project_id)
        .bind(session.total_area_micro)
        .bind(session.price_per_m2_cents)
        .bind(session.total_cost_cents)
        .bind(session.validated)
        .bind(session.validated_at)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await?;

        for pick in draft.picks() {
            sqlx::query(
                r#"
                INSERT INTO sandblast_calculations (
                    id, session_id, project_id, piece_type, diameter_dn,
                    quantity_hundredths, unit_area_micro, total_area_micro, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&session.id)
            .bind(project_id)
            .bind(pick.piece_type)
            .bind(pick.diameter_dn)
            .bind(pick.quantity.hundredths())
            .bind(pick.unit_area.micro())
            .bind(pick.total_area.micro())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let event = ProjectEvent::SandblastChanged {
            project_id: project_id.to_string(),
        };
        Ok((session, event))
    }

    /// Validates a session so it starts contributing to the summary.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the session does not exist or is already
    /// validated.
    pub async fn validate_session(&self, id: &str) -> DbResult<ProjectEvent> {
        debug!(id = %id, "validating sandblast session");

        let result = sqlx::query(
            r#"
            UPDATE sandblast_sessions SET
                validated = 1,
                validated_at = ?2
            WHERE id = ?1 AND validated = 0
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SandblastSession (unvalidated)", id));
        }

        self.event_for(id).await
    }

    /// Gets a session by its ID.
    pub async fn get_session(&self, id: &str) -> DbResult<Option<SandblastSession>> {
        let session = sqlx::query_as::<_, SandblastSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sandblast_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists a project's sessions, newest first.
    pub async fn list_for_project(&self, project_id: &str) -> DbResult<Vec<SandblastSession>> {
        let sessions = sqlx::query_as::<_, SandblastSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sandblast_sessions
            WHERE project_id = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Lists the calculations of a session, in insertion order.
    pub async fn list_calculations(&self, session_id: &str) -> DbResult<Vec<SandblastCalculation>> {
        let calculations = sqlx::query_as::<_, SandblastCalculation>(&format!(
            r#"
            SELECT {CALCULATION_COLUMNS} FROM sandblast_calculations
            WHERE session_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(calculations)
    }

    /// Deletes a session and (via cascade) its calculations.
    pub async fn delete_session(&self, id: &str) -> DbResult<ProjectEvent> {
        debug!(id = %id, "deleting sandblast session");

        let event = self.event_for(id).await?;

        let result = sqlx::query("DELETE FROM sandblast_sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SandblastSession", id));
        }

        Ok(event)
    }

    /// Builds the SandblastChanged event for a session's project.
    async fn event_for(&self, id: &str) -> DbResult<ProjectEvent> {
        let project_id: Option<String> =
            sqlx::query_scalar("SELECT project_id FROM sandblast_sessions WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match project_id {
            Some(project_id) => Ok(ProjectEvent::SandblastChanged { project_id }),
            None => Err(DbError::not_found("SandblastSession", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
