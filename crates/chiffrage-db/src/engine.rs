//! # Summary Engine
//!
//! The aggregation engine and the recompute trigger consumer.
//!
//! ## Recompute Protocol
//! ```text
//! Repository mutation ──► ProjectEvent ──► SummaryEngine::apply
//!                                               │
//!                            ┌──────────────────┴───────────────────┐
//!                            │ names a project?                     │
//!                            ▼                                      ▼
//!                      recompute(P)                 CatalogPriceChanged:
//!                                                   SELECT DISTINCT project
//!                                                   fan-out, skip failures
//! ```
//!
//! ## Transaction Scope
//! A recompute is one read-then-write sequence over a single project's
//! summary. It runs inside one sqlx transaction: the contributing
//! entities are read, the totals are computed in chiffrage-core, and the
//! summary row is written, all before the commit. SQLite serializes
//! writers, so a concurrent mutation to the same project's selections
//! cannot be observed half-applied, and two concurrent recomputes of the
//! same project cannot interleave their read and write phases.
//!
//! ## Canonical Source Rule
//! An approved custom request that has been wrapped by a selection
//! contributes through the selection's price cascade only. The direct
//! request query excludes wrapped ids, so a request can never be counted
//! twice.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::repository::summary::{SummaryRepository, SUMMARY_COLUMNS};
use chiffrage_core::{
    compute_totals, CategoryKind, Money, PricedLine, ProjectEvent, Quantity, RequestLine,
    RequestStatus, Summary, TaxRate, DEFAULT_TAX_RATE_BPS,
};

// =============================================================================
// Row Shapes
// =============================================================================

/// One selection with every joined price source, flat from the store.
#[derive(Debug, sqlx::FromRow)]
struct SelectionLineRow {
    quantity_hundredths: i64,
    price_override_cents: Option<i64>,
    catalog_price_cents: Option<i64>,
    catalog_kind: Option<CategoryKind>,
    request_status: Option<RequestStatus>,
    request_price_cents: Option<i64>,
    request_kind: Option<CategoryKind>,
}

impl SelectionLineRow {
    /// Assembles the pure pricing view.
    ///
    /// The admin price only bears when the linked request is approved;
    /// the cascade itself never has to know about request status.
    fn into_priced_line(self) -> PricedLine {
        let request_price = match (self.request_status, self.request_price_cents) {
            (Some(RequestStatus::Approved), Some(cents)) => Some(Money::from_cents(cents)),
            _ => None,
        };

        PricedLine {
            quantity: Quantity::from_hundredths(self.quantity_hundredths),
            price_override: self.price_override_cents.map(Money::from_cents),
            request_price,
            catalog_price: self.catalog_price_cents.map(Money::from_cents),
            category: self.catalog_kind.or(self.request_kind),
        }
    }
}

/// An approved-and-priced request not wrapped by any selection.
#[derive(Debug, sqlx::FromRow)]
struct DirectRequestRow {
    quantity_hundredths: i64,
    admin_price_cents: i64,
    category_kind: Option<CategoryKind>,
}

// =============================================================================
// The Engine
// =============================================================================

/// Owns summary recomputation for all projects.
#[derive(Debug, Clone)]
pub struct SummaryEngine {
    pool: SqlitePool,
}

impl SummaryEngine {
    /// Creates a new SummaryEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SummaryEngine { pool }
    }

    /// Gets a project's summary, creating a zeroed row on first access.
    pub async fn get_or_create(&self, project_id: &str) -> DbResult<Summary> {
        SummaryRepository::new(self.pool.clone())
            .get_or_create(project_id)
            .await
    }

    /// Recomputes a project's summary with its stored tax rate.
    ///
    /// Idempotent: with no intervening mutation, a second call writes the
    /// same values.
    pub async fn recompute(&self, project_id: &str) -> DbResult<Summary> {
        self.recompute_with_rate(project_id, None).await
    }

    /// Recomputes a project's summary.
    ///
    /// ## Arguments
    /// * `rate_override` - tax rate to apply for this recompute. The rate
    ///   lands in the summary row's `tax_rate` field (its only
    ///   persistence) and later recomputes reuse it from there. `None`
    ///   keeps the stored rate.
    pub async fn recompute_with_rate(
        &self,
        project_id: &str,
        rate_override: Option<TaxRate>,
    ) -> DbResult<Summary> {
        let mut tx = self.pool.begin().await?;

        // Lazy row creation; a dangling project id fails here with a
        // foreign key error, which fan-out treats as "skip this project".
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
        .execute(&mut *tx)
        .await?;

        let stored_bps: u32 =
            sqlx::query_scalar("SELECT tax_rate_bps FROM summaries WHERE project_id = ?1")
                .bind(project_id)
                .fetch_one(&mut *tx)
                .await?;
        let tax_rate = rate_override.unwrap_or(TaxRate::from_bps(stored_bps));

        // Every live selection, with both potential price sources and the
        // category kind that routes it to a bucket.
        let line_rows = sqlx::query_as::<_, SelectionLineRow>(
            r#"
            SELECT
                s.quantity_hundredths,
                s.price_override_cents,
                ci.unit_price_cents AS catalog_price_cents,
                cc.kind             AS catalog_kind,
                cr.status           AS request_status,
                cr.admin_price_cents AS request_price_cents,
                rc.kind             AS request_kind
            FROM selections s
            LEFT JOIN catalog_items ci ON ci.id = s.catalog_item_id
            LEFT JOIN categories cc    ON cc.id = ci.category_id
            LEFT JOIN custom_requests cr ON cr.id = s.custom_request_id
            LEFT JOIN categories rc    ON rc.id = cr.category_id
            WHERE s.project_id = ?1
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;

        let lines: Vec<PricedLine> = line_rows
            .into_iter()
            .map(SelectionLineRow::into_priced_line)
            .collect();

        // Approved-and-priced requests that no selection wraps. The
        // NOT IN clause is the double-count guard.
        let direct_rows = sqlx::query_as::<_, DirectRequestRow>(
            r#"
            SELECT
                cr.quantity_hundredths,
                cr.admin_price_cents,
                c.kind AS category_kind
            FROM custom_requests cr
            LEFT JOIN categories c ON c.id = cr.category_id
            WHERE cr.project_id = ?1
              AND cr.status = 'approved'
              AND cr.admin_price_cents IS NOT NULL
              AND cr.id NOT IN (
                  SELECT custom_request_id FROM selections
                  WHERE project_id = ?1 AND custom_request_id IS NOT NULL
              )
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;

        let direct_requests: Vec<RequestLine> = direct_rows
            .into_iter()
            .map(|row| RequestLine {
                quantity: Quantity::from_hundredths(row.quantity_hundredths),
                admin_price: Money::from_cents(row.admin_price_cents),
                category: row.category_kind,
            })
            .collect();

        // Validated sessions bill as labor; unvalidated ones are drafts.
        let session_costs: Vec<Money> = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT total_cost_cents FROM sandblast_sessions
            WHERE project_id = ?1 AND validated = 1
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Money::from_cents)
        .collect();

        let totals = compute_totals(&lines, &direct_requests, &session_costs, tax_rate);

        if totals.skipped_line_count > 0 {
            warn!(
                project_id = %project_id,
                skipped = totals.skipped_line_count,
                "lines without a resolvable category were skipped"
            );
        }

        sqlx::query(
            r#"
            UPDATE summaries SET
                bucket_material_cents = ?2,
                bucket_labor_cents = ?3,
                bucket_transport_cents = ?4,
                bucket_study_cents = ?5,
                total_ht_cents = ?6,
                tax_rate_bps = ?7,
                tax_amount_cents = ?8,
                total_ttc_cents = ?9,
                updated_at = ?10
            WHERE project_id = ?1
            "#,
        )
        .bind(project_id)
        .bind(totals.bucket_material.cents())
        .bind(totals.bucket_labor.cents())
        .bind(totals.bucket_transport.cents())
        .bind(totals.bucket_study.cents())
        .bind(totals.total_ht.cents())
        .bind(totals.tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.total_ttc.cents())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let summary = sqlx::query_as::<_, Summary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE project_id = ?1"
        ))
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            project_id = %project_id,
            total_ht = %summary.total_ht(),
            total_ttc = %summary.total_ttc(),
            priced_lines = totals.priced_line_count,
            "summary recomputed"
        );

        Ok(summary)
    }

    /// Consumes a mutation event: recomputes every affected project.
    ///
    /// Returns the ids of the projects actually recomputed.
    ///
    /// ## Fan-out Semantics
    /// A price change recomputes each distinct referencing project
    /// independently; one failing project (deleted concurrently, summary
    /// row uncreatable) is logged and skipped so the rest of the fan-out
    /// completes.
    pub async fn apply(&self, event: &ProjectEvent) -> DbResult<Vec<String>> {
        match event {
            ProjectEvent::SelectionChanged { project_id }
            | ProjectEvent::RequestChanged { project_id }
            | ProjectEvent::SandblastChanged { project_id } => {
                self.recompute(project_id).await?;
                Ok(vec![project_id.clone()])
            }

            ProjectEvent::CatalogPriceChanged { catalog_item_id } => {
                let project_ids: Vec<String> = sqlx::query_scalar(
                    "SELECT DISTINCT project_id FROM selections WHERE catalog_item_id = ?1",
                )
                .bind(catalog_item_id)
                .fetch_all(&self.pool)
                .await?;

                debug!(
                    catalog_item_id = %catalog_item_id,
                    affected = project_ids.len(),
                    "fanning out price change"
                );

                let mut recomputed = Vec::with_capacity(project_ids.len());
                for project_id in project_ids {
                    match self.recompute(&project_id).await {
                        Ok(_) => recomputed.push(project_id),
                        Err(err) => {
                            warn!(
                                project_id = %project_id,
                                error = %err,
                                "skipping project in price fan-out"
                            );
                        }
                    }
                }
                Ok(recomputed)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_util::{
        assert_same_totals, create_item, create_project, create_request, seed_reference, test_db,
    };
    use chiffrage_core::{
        CategoryKind, Money, PieceType, Quantity, SandblastDraft, TaxRate, DEFAULT_TAX_RATE_BPS,
    };

    #[tokio::test]
    async fn test_lazy_summary_creation() {
        let db = test_db().await;
        let project = create_project(&db, "empty project").await;

        let summary = db.engine().get_or_create(&project.id).await.unwrap();

        assert_eq!(summary.project_id, project.id);
        assert_eq!(summary.total_ht_cents, 0);
        assert_eq!(summary.total_ttc_cents, 0);
        assert_eq!(summary.tax_rate_bps, DEFAULT_TAX_RATE_BPS);

        // Second access reads the same row, it does not recreate it
        let again = db.engine().get_or_create(&project.id).await.unwrap();
        assert_same_totals(&summary, &again);
    }

    #[tokio::test]
    async fn test_recompute_buckets_and_tax() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "tax arithmetic").await;

        // material 1000.00 + labor 500.00 at the default 18% rate
        let material = create_item(&db, &refs, CategoryKind::Material, 100_000).await;
        let labor = create_item(&db, &refs, CategoryKind::Labor, 50_000).await;
        db.selections()
            .add_catalog_item(&project.id, &material.id, 100)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&project.id, &labor.id, 100)
            .await
            .unwrap();

        let summary = db.engine().recompute(&project.id).await.unwrap();

        assert_eq!(summary.bucket_material_cents, 100_000);
        assert_eq!(summary.bucket_labor_cents, 50_000);
        assert_eq!(summary.bucket_transport_cents, 0);
        assert_eq!(summary.bucket_study_cents, 0);
        assert_eq!(summary.total_ht_cents, 150_000);
        assert_eq!(summary.tax_amount_cents, 27_000);
        assert_eq!(summary.total_ttc_cents, 177_000);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "idempotence").await;

        let item = create_item(&db, &refs, CategoryKind::Material, 33_333).await;
        db.selections()
            .add_catalog_item(&project.id, &item.id, 150)
            .await
            .unwrap();

        let first = db.engine().recompute(&project.id).await.unwrap();
        let second = db.engine().recompute(&project.id).await.unwrap();

        assert_same_totals(&first, &second);
    }

    #[tokio::test]
    async fn test_price_precedence_end_to_end() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "precedence").await;

        // Approved request priced at 50.00, wrapped by a selection that
        // overrides to 100.00
        let request = create_request(&db, &refs, &project.id, CategoryKind::Material, 100).await;
        db.requests()
            .approve(&request.id, Money::from_cents(5_000), None)
            .await
            .unwrap();
        let (selection, _) = db
            .selections()
            .add_custom_request(&project.id, &request.id, 100)
            .await
            .unwrap();
        db.selections()
            .set_price_override(&selection.id, Some(Money::from_cents(10_000)))
            .await
            .unwrap();

        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_material_cents, 10_000);

        // Clearing the override exposes the admin price
        db.selections()
            .set_price_override(&selection.id, None)
            .await
            .unwrap();
        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_material_cents, 5_000);
    }

    #[tokio::test]
    async fn test_zero_override_falls_back_to_catalog_price() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "zero override").await;

        let item = create_item(&db, &refs, CategoryKind::Transport, 1_000).await;
        let (selection, _) = db
            .selections()
            .add_catalog_item(&project.id, &item.id, 100)
            .await
            .unwrap();
        db.selections()
            .set_price_override(&selection.id, Some(Money::zero()))
            .await
            .unwrap();

        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_transport_cents, 1_000);
    }

    #[tokio::test]
    async fn test_wrapped_request_counts_once() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "double count guard").await;

        let request = create_request(&db, &refs, &project.id, CategoryKind::Labor, 200).await;
        db.requests()
            .approve(&request.id, Money::from_cents(2_000), None)
            .await
            .unwrap();

        // Unwrapped: contributes directly (2.00 x 20.00 = 40.00)
        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_labor_cents, 4_000);

        // Wrapped: contributes through the selection only, same amount,
        // not twice
        db.selections()
            .add_custom_request(&project.id, &request.id, 200)
            .await
            .unwrap();
        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_labor_cents, 4_000);
    }

    #[tokio::test]
    async fn test_undecided_requests_are_excluded() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "pending excluded").await;

        let pending = create_request(&db, &refs, &project.id, CategoryKind::Study, 100).await;
        let rejected = create_request(&db, &refs, &project.id, CategoryKind::Study, 100).await;
        db.requests().reject(&rejected.id, Some("no")).await.unwrap();

        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_study_cents, 0);
        assert_eq!(summary.total_ht_cents, 0);

        // Approving the pending one brings its cost in
        db.requests()
            .approve(&pending.id, Money::from_cents(7_500), None)
            .await
            .unwrap();
        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.bucket_study_cents, 7_500);
    }

    #[tokio::test]
    async fn test_sessions_contribute_only_when_validated() {
        let db = test_db().await;
        let project = create_project(&db, "sandblast").await;

        let mut draft = SandblastDraft::new();
        draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_whole(12))
            .unwrap(); // 3.96 m²

        let (session, event) = db
            .sandblast()
            .finalize_draft(&project.id, &draft, None)
            .await
            .unwrap();
        db.engine().apply(&event).await.unwrap();

        // Unvalidated: a persisted draft, not yet a contribution
        let summary = db.engine().get_or_create(&project.id).await.unwrap();
        assert_eq!(summary.bucket_labor_cents, 0);

        // Validated: 3.96 m² x 5000.00/m² = 19 800.00 as labor
        let event = db.sandblast().validate_session(&session.id).await.unwrap();
        db.engine().apply(&event).await.unwrap();

        let summary = db.engine().get_or_create(&project.id).await.unwrap();
        assert_eq!(summary.bucket_labor_cents, 1_980_000);
        assert_eq!(summary.total_ht_cents, 1_980_000);
        assert_eq!(summary.tax_amount_cents, 356_400);
        assert_eq!(summary.total_ttc_cents, 2_336_400);
    }

    #[tokio::test]
    async fn test_fan_out_recomputes_exactly_the_referencing_projects() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;

        let p1 = create_project(&db, "P1").await;
        let p2 = create_project(&db, "P2").await;
        let p3 = create_project(&db, "P3").await;

        let shared = create_item(&db, &refs, CategoryKind::Material, 1_000).await;
        let other = create_item(&db, &refs, CategoryKind::Material, 9_000).await;

        // P1 references the shared item twice, P2 once, P3 not at all
        db.selections()
            .add_catalog_item(&p1.id, &shared.id, 100)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&p1.id, &shared.id, 100)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&p2.id, &shared.id, 100)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&p3.id, &other.id, 100)
            .await
            .unwrap();

        let p3_before = db.engine().recompute(&p3.id).await.unwrap();

        let event = db
            .catalog()
            .update_price(&shared.id, Money::from_cents(2_000))
            .await
            .unwrap();
        let mut recomputed = db.engine().apply(&event).await.unwrap();
        recomputed.sort();

        // Exactly one recompute each for P1 and P2, none for P3
        let mut expected = vec![p1.id.clone(), p2.id.clone()];
        expected.sort();
        assert_eq!(recomputed, expected);

        let p1_summary = db.engine().get_or_create(&p1.id).await.unwrap();
        assert_eq!(p1_summary.bucket_material_cents, 4_000); // 2 x 20.00
        let p2_summary = db.engine().get_or_create(&p2.id).await.unwrap();
        assert_eq!(p2_summary.bucket_material_cents, 2_000);

        let p3_after = db.engine().get_or_create(&p3.id).await.unwrap();
        assert_same_totals(&p3_before, &p3_after);
    }

    #[tokio::test]
    async fn test_deletion_reduces_bucket_by_exactly_the_removed_cost() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "deletion").await;

        let cheap = create_item(&db, &refs, CategoryKind::Material, 10_000).await;
        let dear = create_item(&db, &refs, CategoryKind::Material, 5_000).await;
        let labor = create_item(&db, &refs, CategoryKind::Labor, 7_000).await;

        db.selections()
            .add_catalog_item(&project.id, &cheap.id, 100)
            .await
            .unwrap();
        let (doomed, _) = db
            .selections()
            .add_catalog_item(&project.id, &dear.id, 200)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&project.id, &labor.id, 100)
            .await
            .unwrap();

        let before = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(before.bucket_material_cents, 20_000);
        assert_eq!(before.bucket_labor_cents, 7_000);

        // Deleting the 2 x 50.00 selection drops material by exactly
        // 100.00 and touches nothing else
        let event = db.selections().delete(&doomed.id).await.unwrap();
        db.engine().apply(&event).await.unwrap();

        let after = db.engine().get_or_create(&project.id).await.unwrap();
        assert_eq!(after.bucket_material_cents, 10_000);
        assert_eq!(after.bucket_labor_cents, 7_000);
        assert_eq!(after.total_ht_cents, 17_000);
    }

    #[tokio::test]
    async fn test_deleting_approved_request_removes_its_contribution() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "request deletion").await;

        let request = create_request(&db, &refs, &project.id, CategoryKind::Study, 100).await;
        db.requests()
            .approve(&request.id, Money::from_cents(3_000), None)
            .await
            .unwrap();

        let before = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(before.bucket_study_cents, 3_000);

        let event = db.requests().delete(&request.id).await.unwrap();
        db.engine().apply(&event).await.unwrap();

        let after = db.engine().get_or_create(&project.id).await.unwrap();
        assert_eq!(after.bucket_study_cents, 0);
        assert_eq!(after.total_ht_cents, 0);
    }

    #[tokio::test]
    async fn test_tax_rate_override_persists_in_the_row() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "tax override").await;

        let item = create_item(&db, &refs, CategoryKind::Material, 100_000).await;
        db.selections()
            .add_catalog_item(&project.id, &item.id, 100)
            .await
            .unwrap();

        let summary = db
            .engine()
            .recompute_with_rate(&project.id, Some(TaxRate::from_bps(1000)))
            .await
            .unwrap();
        assert_eq!(summary.tax_rate_bps, 1000);
        assert_eq!(summary.tax_amount_cents, 10_000);
        assert_eq!(summary.total_ttc_cents, 110_000);

        // A later recompute without an override reuses the stored rate
        let summary = db.engine().recompute(&project.id).await.unwrap();
        assert_eq!(summary.tax_rate_bps, 1000);
        assert_eq!(summary.tax_amount_cents, 10_000);
    }

    #[tokio::test]
    async fn test_completeness_against_raw_entities() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let project = create_project(&db, "completeness").await;

        // Catalog selections
        let mat_item = create_item(&db, &refs, CategoryKind::Material, 25_000).await;
        let lab_item = create_item(&db, &refs, CategoryKind::Labor, 10_000).await;
        db.selections()
            .add_catalog_item(&project.id, &mat_item.id, 200)
            .await
            .unwrap();
        db.selections()
            .add_catalog_item(&project.id, &lab_item.id, 150)
            .await
            .unwrap();

        // A direct approved request and a wrapped one
        let direct = create_request(&db, &refs, &project.id, CategoryKind::Study, 300).await;
        db.requests()
            .approve(&direct.id, Money::from_cents(5_000), None)
            .await
            .unwrap();
        let wrapped = create_request(&db, &refs, &project.id, CategoryKind::Labor, 200).await;
        db.requests()
            .approve(&wrapped.id, Money::from_cents(2_000), None)
            .await
            .unwrap();
        db.selections()
            .add_custom_request(&project.id, &wrapped.id, 200)
            .await
            .unwrap();

        // One validated and one unvalidated session
        let mut draft = SandblastDraft::new();
        draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_whole(12))
            .unwrap();
        let (validated, _) = db
            .sandblast()
            .finalize_draft(&project.id, &draft, None)
            .await
            .unwrap();
        db.sandblast().validate_session(&validated.id).await.unwrap();

        let mut ignored_draft = SandblastDraft::new();
        ignored_draft
            .add_pick(100, PieceType::StraightPipe, Quantity::from_whole(50))
            .unwrap();
        db.sandblast()
            .finalize_draft(&project.id, &ignored_draft, None)
            .await
            .unwrap();

        let summary = db.engine().recompute(&project.id).await.unwrap();

        // Recomputed independently from the raw entities:
        // material: 2.00 x 250.00                    = 50 000 cents
        // labor:    1.50 x 100.00 + 2.00 x 20.00     = 19 000 cents
        //           + validated session 3.96 x 5000  = 1 980 000 cents
        // study:    3.00 x 50.00                     = 15 000 cents
        let expected_material = 50_000;
        let expected_labor = 15_000 + 4_000 + 1_980_000;
        let expected_study = 15_000;
        let expected_ht = expected_material + expected_labor + expected_study;
        let expected_tax = (expected_ht * 1800 + 5_000) / 10_000;

        assert_eq!(summary.bucket_material_cents, expected_material);
        assert_eq!(summary.bucket_labor_cents, expected_labor);
        assert_eq!(summary.bucket_transport_cents, 0);
        assert_eq!(summary.bucket_study_cents, expected_study);
        assert_eq!(summary.total_ht_cents, expected_ht);
        assert_eq!(summary.tax_amount_cents, expected_tax);
        assert_eq!(summary.total_ttc_cents, expected_ht + expected_tax);
    }

    #[tokio::test]
    async fn test_fan_out_over_unreferenced_item_is_a_no_op() {
        let db = test_db().await;
        let refs = seed_reference(&db).await;
        let lonely = create_item(&db, &refs, CategoryKind::Material, 1_000).await;

        let event = db
            .catalog()
            .update_price(&lonely.id, Money::from_cents(2_000))
            .await
            .unwrap();
        let recomputed = db.engine().apply(&event).await.unwrap();
        assert!(recomputed.is_empty());
    }
}
