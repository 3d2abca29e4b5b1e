//! # chiffrage-core: Pure Business Logic for Project Cost Estimation
//!
//! This crate is the heart of the estimation system. It contains the
//! derived-total aggregation rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Collaborators (forms, auth, imports, document rendering)        │
//! │      create/update/delete entities, read the summary             │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼──────────────────────────────────┐
//! │               ★ chiffrage-core (THIS CRATE) ★                    │
//! │                                                                  │
//! │   money        fixed-point Money/Quantity, tax arithmetic        │
//! │   geometry     DN × piece-type surface table (read-only)         │
//! │   pricing      override → admin price → catalog price → zero     │
//! │   aggregation  bucket fold + HT/TVA/TTC derivation               │
//! │   sandblast    transient draft working set                       │
//! │   events       explicit "project affected" messages              │
//! │                                                                  │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS             │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼──────────────────────────────────┐
//! │                chiffrage-db (persistence layer)                  │
//! │        SQLite repositories, migrations, SummaryEngine            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; recomputation is
//!    idempotent because the algorithm is deterministic
//! 2. **No I/O**: database, network, file system access is forbidden here
//! 3. **Integer Fixed Point**: cents for money, hundredths for quantities,
//!    micro-m² for areas; no float touches a financial value
//! 4. **Explicit Errors**: typed enums, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use chiffrage_core::money::{Money, Quantity};
//! use chiffrage_core::pricing::{resolve_unit_price, PricedLine};
//!
//! let line = PricedLine {
//!     quantity: Quantity::from_whole(3),
//!     price_override: None,
//!     request_price: None,
//!     catalog_price: Some(Money::from_cents(150_000)),
//!     category: None,
//! };
//!
//! // No override, no admin price: the catalog price applies
//! assert_eq!(resolve_unit_price(&line).cents(), 150_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregation;
pub mod error;
pub mod events;
pub mod geometry;
pub mod money;
pub mod pricing;
pub mod sandblast;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregation::{compute_totals, RequestLine, SummaryTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::ProjectEvent;
pub use geometry::{unit_area, Area, PieceType};
pub use money::{Money, Quantity};
pub use pricing::{resolve_unit_price, resolved_cost, PricedLine};
pub use sandblast::{DraftPick, SandblastDraft};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default TVA rate in basis points (18.00%).
///
/// Applied to lazily created summaries; a per-recompute override can
/// replace it (see the summary engine in the db layer).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

/// Default sandblasting rate: 5 000.00 CFA per m², in cents.
///
/// Used when a session is finalized without an explicit rate.
pub const DEFAULT_SANDBLAST_RATE_CENTS: i64 = 500_000;

/// Maximum picks in one sandblast draft.
///
/// Keeps an interactive working set bounded; a project needing more gets
/// a second session.
pub const MAX_DRAFT_PICKS: usize = 100;

/// Maximum line quantity in hundredths (1 000 000.00 units).
///
/// Guards against fat-finger quantities an order of magnitude past
/// anything real.
pub const MAX_QUANTITY_HUNDREDTHS: i64 = 100_000_000;
