//! # Sandblast Draft
//!
//! The transient, session-scoped working set of geometry picks.
//!
//! ## Lifecycle
//! ```text
//! Customer action            Draft operation           Persisted?
//! ───────────────            ───────────────           ──────────
//! Pick DN 200 elbow x 12 ──► add_pick()                no
//! Change mind            ──► remove_pick() / clear()   no
//! Review running total   ──► total_area(), preview     no
//! Confirm                ──► db finalize_draft()       session + calcs
//! Validate               ──► db validate_session()     counts in summary
//! ```
//!
//! The draft lives entirely in the caller's memory: one user's in-progress
//! picks are never shared across users and never leak into the persisted
//! summary. Only the finalize step turns the draft into a stored session,
//! and only validation makes that session contribute.
//!
//! ## Thread Safety
//! The draft is plain owned data. A collaborator holding one per user
//! session wraps it in its own synchronization if commands can race.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::geometry::{self, Area, PieceType};
use crate::money::{Money, Quantity};
use crate::MAX_DRAFT_PICKS;

/// One pick in the draft.
///
/// The unit area is frozen at pick time from the geometry table, so a
/// draft reviewed later displays exactly what was computed when the user
/// picked, even across table revisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
    pub piece_type: PieceType,

    /// Nominal diameter in millimeters.
    pub diameter_dn: i64,

    /// Piece count in hundredths.
    pub quantity: Quantity,

    /// Unit surface frozen from the lookup table.
    pub unit_area: Area,

    /// `quantity × unit_area`.
    pub total_area: Area,
}

/// The in-memory sandblast working set.
///
/// ## Invariants
/// - Every pick has an available geometry combination (unavailable ones
///   are rejected at add time, so no silent-zero line can exist here)
/// - Every pick has a positive quantity
/// - At most [`MAX_DRAFT_PICKS`] picks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandblastDraft {
    picks: Vec<DraftPick>,
}

impl SandblastDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        SandblastDraft { picks: Vec::new() }
    }

    /// Adds a pick, resolving its unit surface from the geometry table.
    ///
    /// Picking the same (diameter, piece) again adds a separate line;
    /// the original keeps distinct picks distinct for review.
    ///
    /// ## Errors
    /// - [`CoreError::GeometryUnavailable`] for combinations without a
    ///   surface
    /// - [`CoreError::Validation`] for non-positive quantities
    /// - [`CoreError::DraftTooLarge`] past the pick bound
    pub fn add_pick(
        &mut self,
        diameter_dn: i64,
        piece: PieceType,
        quantity: Quantity,
    ) -> CoreResult<&DraftPick> {
        if !quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if self.picks.len() >= MAX_DRAFT_PICKS {
            return Err(CoreError::DraftTooLarge {
                max: MAX_DRAFT_PICKS,
            });
        }

        let unit_area = geometry::unit_area(diameter_dn, piece)?;

        let index = self.picks.len();
        self.picks.push(DraftPick {
            piece_type: piece,
            diameter_dn,
            quantity,
            unit_area,
            total_area: unit_area.multiply_quantity(quantity),
        });

        Ok(&self.picks[index])
    }

    /// Removes a pick by index. Returns the removed pick, or None when the
    /// index is out of bounds.
    pub fn remove_pick(&mut self, index: usize) -> Option<DraftPick> {
        if index < self.picks.len() {
            Some(self.picks.remove(index))
        } else {
            None
        }
    }

    /// Drops every pick.
    pub fn clear(&mut self) {
        self.picks.clear();
    }

    /// The current picks, in pick order.
    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Running total surface over all picks.
    pub fn total_area(&self) -> Area {
        self.picks
            .iter()
            .fold(Area::zero(), |acc, pick| acc + pick.total_area)
    }

    /// Cost preview at a billing rate, for display before finalizing.
    ///
    /// Matches what the persisted session will cost at the same rate.
    pub fn cost_preview(&self, rate_per_m2: Money) -> Money {
        self.total_area().cost_at(rate_per_m2)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_pick_freezes_areas() {
        let mut draft = SandblastDraft::new();
        let pick = draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_whole(12))
            .unwrap();

        assert_eq!(pick.unit_area.micro(), 330_000);
        assert_eq!(pick.total_area.micro(), 3_960_000);
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn test_unavailable_combination_is_rejected() {
        let mut draft = SandblastDraft::new();
        let err = draft
            .add_pick(750, PieceType::SectorElbow, Quantity::one())
            .unwrap_err();

        assert!(matches!(err, CoreError::GeometryUnavailable { .. }));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let mut draft = SandblastDraft::new();
        assert!(draft
            .add_pick(200, PieceType::Elbow90, Quantity::zero())
            .is_err());
        assert!(draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_hundredths(-100))
            .is_err());
        assert!(draft.is_empty());
    }

    #[test]
    fn test_running_totals() {
        let mut draft = SandblastDraft::new();
        draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_whole(12))
            .unwrap(); // 3.96 m²
        draft
            .add_pick(50, PieceType::StraightPipe, Quantity::from_hundredths(250))
            .unwrap(); // 0.4725 m²

        assert_eq!(draft.total_area().micro(), 4_432_500);

        // Preview at the default 5000.00/m² rate
        let preview = draft.cost_preview(Money::from_cents(500_000));
        assert_eq!(preview.cents(), 2_216_250); // 22 162.50 CFA
    }

    #[test]
    fn test_remove_and_clear() {
        let mut draft = SandblastDraft::new();
        draft
            .add_pick(200, PieceType::Elbow90, Quantity::from_whole(12))
            .unwrap();
        draft
            .add_pick(150, PieceType::SectorElbow, Quantity::from_whole(2))
            .unwrap();

        let removed = draft.remove_pick(0).unwrap();
        assert_eq!(removed.piece_type, PieceType::Elbow90);
        assert_eq!(draft.len(), 1);

        assert!(draft.remove_pick(5).is_none());

        draft.clear();
        assert!(draft.is_empty());
        assert_eq!(draft.total_area(), Area::zero());
    }

    #[test]
    fn test_draft_bound() {
        let mut draft = SandblastDraft::new();
        for _ in 0..MAX_DRAFT_PICKS {
            draft
                .add_pick(200, PieceType::Elbow90, Quantity::one())
                .unwrap();
        }
        let err = draft
            .add_pick(200, PieceType::Elbow90, Quantity::one())
            .unwrap_err();
        assert!(matches!(err, CoreError::DraftTooLarge { .. }));
    }
}
