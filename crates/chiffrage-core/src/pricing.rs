//! # Price Resolution
//!
//! The cascade that decides which unit price applies to a selection line.
//!
//! ## Precedence (first match wins)
//! ```text
//! 1. Manual override on the selection   (if set and non-zero)
//! 2. Admin price of the linked request  (if approved and priced)
//! 3. Catalog unit price                 (if the line references an item)
//! 4. Zero                               (never raises)
//! ```
//!
//! The db layer assembles a [`PricedLine`] per selection from joined rows;
//! resolution itself is a pure function so the cascade is testable without
//! a store.

use crate::money::{Money, Quantity};
use crate::types::CategoryKind;

/// A selection line with every price source it could draw from, plus the
/// resolved category kind that routes its cost to a bucket.
///
/// `request_price` must only be filled when the linked custom request is
/// approved with a non-null admin price; an unapproved or unpriced request
/// is represented as `None` so it cannot bear a price here.
#[derive(Debug, Clone, Default)]
pub struct PricedLine {
    pub quantity: Quantity,

    /// Manual override stored on the selection.
    pub price_override: Option<Money>,

    /// Admin price of the linked request, gated on approval.
    pub request_price: Option<Money>,

    /// Unit price of the linked catalog item.
    pub catalog_price: Option<Money>,

    /// Category kind resolved through the linked item or request.
    /// `None` means the line cannot be routed to a bucket and is skipped
    /// by aggregation.
    pub category: Option<CategoryKind>,
}

/// Resolves the unit price for a line through the cascade.
///
/// A zero override does not bear: it falls through to the next source.
///
/// ```rust
/// use chiffrage_core::money::{Money, Quantity};
/// use chiffrage_core::pricing::{resolve_unit_price, PricedLine};
///
/// let line = PricedLine {
///     quantity: Quantity::one(),
///     price_override: Some(Money::from_cents(10_000)),
///     request_price: Some(Money::from_cents(5_000)),
///     catalog_price: Some(Money::from_cents(1_000)),
///     category: None,
/// };
/// assert_eq!(resolve_unit_price(&line).cents(), 10_000);
/// ```
pub fn resolve_unit_price(line: &PricedLine) -> Money {
    match line.price_override {
        Some(price) if !price.is_zero() => return price,
        _ => {}
    }
    if let Some(price) = line.request_price {
        return price;
    }
    if let Some(price) = line.catalog_price {
        return price;
    }
    Money::zero()
}

/// `quantity × resolved unit price`, rounded to cents.
pub fn resolved_cost(line: &PricedLine) -> Money {
    resolve_unit_price(line).multiply_quantity(line.quantity)
}

/// Whether some price source actually bears for this line.
///
/// Distinct from `resolved_cost() > 0`: a line backed by a zero catalog
/// price is priced (at zero), while a line whose request is still pending
/// has no bearing source at all. Bucket totals do not care, but "count of
/// priced items" reporting does.
pub fn has_bearing_price(line: &PricedLine) -> bool {
    matches!(line.price_override, Some(p) if !p.is_zero())
        || line.request_price.is_some()
        || line.catalog_price.is_some()
}

// =============================================================================
// Unit Tests
// =============================================================================
