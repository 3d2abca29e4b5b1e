//! # Summary Repository
//!
//! Read path for project summaries.
//!
//! The summary row is created lazily on first access with zero buckets
//! and the default tax rate; it is only ever *written* by the summary
//! engine (see `engine.rs`), and cascade-deleted with its project.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use chiffrage_core::{Summary, DEFAULT_TAX_RATE_BPS};

pub(crate) const SUMMARY_COLUMNS: &str = r#"
    project_id, bucket_material_cents, bucket_labor_cents,
    bucket_transport_cents, bucket_study_cents, total_ht_cents,
    tax_rate_bps, tax_amount_cents, total_ttc_cents, updated_at
"#;

/// Repository for summary reads and lazy creation.
#[derive(Debug, Clone)]
pub struct SummaryRepository {
    pool: SqlitePool,
}

impl SummaryRepository {
    /// Creates a new SummaryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SummaryRepository { pool }
    }

    /// Gets a project's summary, if the row exists.
    pub async fn get(&self, project_id: &str) -> DbResult<Option<Summary>> {
        let summary = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE project_id = ?1"
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Gets a project's summary, creating a zeroed row on first access.
    ///
    /// Lazy creation is never a user-visible failure for an existing
    /// project; a dangling project id surfaces as a foreign key error.
    pub async fn get_or_create(&self, project_id: &str) -> DbResult<Summary> {
        if let Some(summary) = self.get(project_id).await? {
            return Ok(summary);
        }

        debug!(project_id = %project_id, "creating summary row lazily");

        sqlx::query(
            r#"
            INSERT INTO summaries (project_id, tax_rate_bps, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (project_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(DEFAULT_TAX_RATE_BPS)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        // Re-read instead of constructing in memory: a concurrent creator
        // may have won the insert race.
        let summary = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE project_id = ?1"
        ))
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
