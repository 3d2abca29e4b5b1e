//! # Aggregation
//!
//! The bucket-sum and tax algorithm: folds every contributing entity of a
//! project into the four category buckets and derives the totals.
//!
//! ## Contribution Sources
//! ```text
//! Selections ───────────► resolved cost ──► bucket by category kind
//! Direct requests ──────► qty × admin price ──► bucket by category kind
//!   (approved + priced, not wrapped by a selection)
//! Validated sessions ───► total cost ──► labor bucket
//!                                             │
//!                                             ▼
//!                        total_ht = Σ buckets
//!                        tax_amount = total_ht × rate
//!                        total_ttc = total_ht + tax_amount
//! ```
//!
//! This is a single accumulation pass: every source lands in its bucket
//! first, then the totals are computed exactly once. The invariants hold
//! bit-exactly:
//! - `total_ht = material + labor + transport + study`
//! - `tax_amount = total_ht × rate`, rounded half up at the cent
//! - `total_ttc = total_ht + tax_amount`
//!
//! Lines whose category cannot be determined are skipped, not errored;
//! the caller decides whether to log them.

use crate::money::{Money, Quantity};
use crate::pricing::{self, PricedLine};
use crate::types::{CategoryKind, TaxRate};

// =============================================================================
// Inputs
// =============================================================================

/// An approved-and-priced custom request contributing directly, because no
/// selection wraps it. The db layer enforces the exclusion; this type just
/// carries the numbers.
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub quantity: Quantity,
    pub admin_price: Money,
    /// `None` when the request's category row is missing; skipped.
    pub category: Option<CategoryKind>,
}

impl RequestLine {
    fn cost(&self) -> Money {
        self.admin_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Output
// =============================================================================

/// The computed totals of one aggregation pass.
///
/// Mirrors the persisted Summary row, plus reporting fields that are not
/// persisted (`priced_line_count`, `skipped_line_count`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTotals {
    pub bucket_material: Money,
    pub bucket_labor: Money,
    pub bucket_transport: Money,
    pub bucket_study: Money,

    pub total_ht: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total_ttc: Money,

    /// Lines that drew a bearing price and landed in a bucket.
    pub priced_line_count: usize,

    /// Lines skipped because their category could not be resolved.
    pub skipped_line_count: usize,
}

impl SummaryTotals {
    /// All-zero totals at the given rate (the shape of a lazily created
    /// summary).
    pub fn zero(tax_rate: TaxRate) -> Self {
        SummaryTotals {
            bucket_material: Money::zero(),
            bucket_labor: Money::zero(),
            bucket_transport: Money::zero(),
            bucket_study: Money::zero(),
            total_ht: Money::zero(),
            tax_rate,
            tax_amount: Money::zero(),
            total_ttc: Money::zero(),
            priced_line_count: 0,
            skipped_line_count: 0,
        }
    }

    /// Returns the bucket accumulator for a category kind.
    fn bucket_mut(&mut self, kind: CategoryKind) -> &mut Money {
        match kind {
            CategoryKind::Material => &mut self.bucket_material,
            CategoryKind::Labor => &mut self.bucket_labor,
            CategoryKind::Transport => &mut self.bucket_transport,
            CategoryKind::Study => &mut self.bucket_study,
        }
    }

    /// Read access to a bucket.
    pub fn bucket(&self, kind: CategoryKind) -> Money {
        match kind {
            CategoryKind::Material => self.bucket_material,
            CategoryKind::Labor => self.bucket_labor,
            CategoryKind::Transport => self.bucket_transport,
            CategoryKind::Study => self.bucket_study,
        }
    }

    fn finalize(&mut self) {
        self.total_ht =
            self.bucket_material + self.bucket_labor + self.bucket_transport + self.bucket_study;
        self.tax_amount = self.total_ht.calculate_tax(self.tax_rate);
        self.total_ttc = self.total_ht + self.tax_amount;
    }
}

// =============================================================================
// The Algorithm
// =============================================================================

/// Computes a project's totals from its current contributing entities.
///
/// Deterministic and pure: same inputs, same totals, which is what makes
/// recomputation idempotent.
///
/// ## Arguments
/// * `lines` - one [`PricedLine`] per live selection of the project
/// * `direct_requests` - approved-and-priced requests NOT wrapped by a
///   selection (the caller must exclude wrapped ones, or their cost would
///   be counted twice)
/// * `session_costs` - total cost of each validated sandblast session
/// * `tax_rate` - rate to apply to the pre-tax total
pub fn compute_totals(
    lines: &[PricedLine],
    direct_requests: &[RequestLine],
    session_costs: &[Money],
    tax_rate: TaxRate,
) -> SummaryTotals {
    let mut totals = SummaryTotals::zero(tax_rate);

    // Selections route their resolved cost by category kind. No category,
    // no bucket: the line is skipped, never an error.
    for line in lines {
        match line.category {
            Some(kind) => {
                *totals.bucket_mut(kind) += pricing::resolved_cost(line);
                if pricing::has_bearing_price(line) {
                    totals.priced_line_count += 1;
                }
            }
            None => totals.skipped_line_count += 1,
        }
    }

    // Direct custom requests: already gated on approved + priced upstream.
    for request in direct_requests {
        match request.category {
            Some(kind) => {
                *totals.bucket_mut(kind) += request.cost();
                totals.priced_line_count += 1;
            }
            None => totals.skipped_line_count += 1,
        }
    }

    // Validated sandblast sessions bill as labor.
    for cost in session_costs {
        totals.bucket_labor += *cost;
    }

    totals.finalize();
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Quantity;

    fn catalog_line(category: CategoryKind, price_cents: i64, qty_hundredths: i64) -> PricedLine {
        PricedLine {
            quantity: Quantity::from_hundredths(qty_hundredths),
            price_override: None,
            request_price: None,
            catalog_price: Some(Money::from_cents(price_cents)),
            category: Some(category),
        }
    }

    #[test]
    fn test_empty_project_is_all_zeros() {
        let totals = compute_totals(&[], &[], &[], TaxRate::from_bps(1800));
        assert_eq!(totals, SummaryTotals::zero(TaxRate::from_bps(1800)));
    }

    #[test]
    fn test_tax_arithmetic() {
        // material 1000.00 + labor 500.00 at 18%:
        // HT 1500.00, TVA 270.00, TTC 1770.00
        let lines = [
            catalog_line(CategoryKind::Material, 100_000, 100),
            catalog_line(CategoryKind::Labor, 50_000, 100),
        ];
        let totals = compute_totals(&lines, &[], &[], TaxRate::from_bps(1800));

        assert_eq!(totals.bucket_material.cents(), 100_000);
        assert_eq!(totals.bucket_labor.cents(), 50_000);
        assert_eq!(totals.bucket_transport.cents(), 0);
        assert_eq!(totals.bucket_study.cents(), 0);
        assert_eq!(totals.total_ht.cents(), 150_000);
        assert_eq!(totals.tax_amount.cents(), 27_000);
        assert_eq!(totals.total_ttc.cents(), 177_000);
    }

    #[test]
    fn test_each_kind_lands_in_its_bucket() {
        let lines = [
            catalog_line(CategoryKind::Material, 1_000, 100),
            catalog_line(CategoryKind::Labor, 2_000, 100),
            catalog_line(CategoryKind::Transport, 3_000, 100),
            catalog_line(CategoryKind::Study, 4_000, 100),
        ];
        let totals = compute_totals(&lines, &[], &[], TaxRate::zero());

        for (kind, expected) in CategoryKind::ALL.iter().zip([1_000, 2_000, 3_000, 4_000]) {
            assert_eq!(totals.bucket(*kind).cents(), expected);
        }
        assert_eq!(totals.total_ht.cents(), 10_000);
        assert_eq!(totals.tax_amount.cents(), 0);
        assert_eq!(totals.total_ttc.cents(), 10_000);
        assert_eq!(totals.priced_line_count, 4);
    }

    #[test]
    fn test_category_less_lines_are_skipped() {
        let orphan = PricedLine {
            quantity: Quantity::one(),
            price_override: Some(Money::from_cents(99_999)),
            request_price: None,
            catalog_price: None,
            category: None,
        };
        let totals = compute_totals(&[orphan], &[], &[], TaxRate::from_bps(1800));

        assert_eq!(totals.total_ht, Money::zero());
        assert_eq!(totals.skipped_line_count, 1);
        assert_eq!(totals.priced_line_count, 0);
    }

    #[test]
    fn test_direct_requests_contribute() {
        let request = RequestLine {
            quantity: Quantity::from_hundredths(300), // 3.00
            admin_price: Money::from_cents(5_000),    // 50.00
            category: Some(CategoryKind::Study),
        };
        let totals = compute_totals(&[], &[request], &[], TaxRate::zero());

        assert_eq!(totals.bucket_study.cents(), 15_000);
        assert_eq!(totals.priced_line_count, 1);
    }

    #[test]
    fn test_session_costs_bill_as_labor() {
        let sessions = [Money::from_cents(1_980_000), Money::from_cents(20_000)];
        let totals = compute_totals(&[], &[], &sessions, TaxRate::from_bps(1800));

        assert_eq!(totals.bucket_labor.cents(), 2_000_000);
        assert_eq!(totals.total_ht.cents(), 2_000_000);
        assert_eq!(totals.tax_amount.cents(), 360_000);
        assert_eq!(totals.total_ttc.cents(), 2_360_000);
    }

    #[test]
    fn test_sessions_combine_with_labor_lines() {
        // Labor lines and session costs share the labor bucket, and the
        // totals are computed once over the combined value.
        let lines = [catalog_line(CategoryKind::Labor, 50_000, 100)];
        let sessions = [Money::from_cents(25_000)];
        let totals = compute_totals(&lines, &[], &sessions, TaxRate::from_bps(1800));

        assert_eq!(totals.bucket_labor.cents(), 75_000);
        assert_eq!(totals.total_ht.cents(), 75_000);
        assert_eq!(totals.tax_amount.cents(), 13_500);
        assert_eq!(totals.total_ttc.cents(), 88_500);
    }

    #[test]
    fn test_idempotent_for_same_inputs() {
        let lines = [
            catalog_line(CategoryKind::Material, 33_333, 150),
            catalog_line(CategoryKind::Transport, 12_345, 275),
        ];
        let sessions = [Money::from_cents(7_777)];

        let first = compute_totals(&lines, &[], &sessions, TaxRate::from_bps(1800));
        let second = compute_totals(&lines, &[], &sessions, TaxRate::from_bps(1800));
        assert_eq!(first, second);
    }
}
