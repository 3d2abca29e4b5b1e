//! # Domain Types
//!
//! Core domain types for project cost estimation.
//!
//! ## Type Hierarchy
//! ```text
//! Reference data          Mutable inputs            Derived output
//! ──────────────          ──────────────            ──────────────
//! Category (kind, code)   Selection (source, qty)   Summary (4 buckets,
//! Discipline              CustomRequest (status)             HT/TVA/TTC)
//! UnitKind (closed enum)  SandblastSession
//! CatalogItem (price)     SandblastCalculation
//!
//! TaxRate(u32 bps)  1800 = 18.00%
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 as TEXT, immutable, used for relations
//! - Business key where one exists (category `code`, discipline `code`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{Area, PieceType};
use crate::money::{Money, Quantity};
use crate::DEFAULT_TAX_RATE_BPS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18.00% (the standard TVA rate in this domain)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Default is the standard 18% TVA, not zero: a lazily created summary
/// must already carry the rate a recompute will apply.
impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Project
// =============================================================================

/// An engineering project being estimated.
///
/// Deleting a project cascades to its selections, requests, sandblast
/// data and summary at the store level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Project {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Project name shown to collaborators.
    pub name: String,

    /// Display name of the client the project belongs to.
    pub client_name: Option<String>,

    /// Free-text description.
    pub description: Option<String>,

    /// Whether the project is active (soft delete).
    pub active: bool,

    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// The financial bucket a line item contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Materials and supplies.
    Material,
    /// Labor, including sandblasting sessions.
    Labor,
    /// Transport and logistics.
    Transport,
    /// Studies and engineering.
    Study,
}

impl CategoryKind {
    /// All four kinds, in bucket order.
    pub const ALL: [CategoryKind; 4] = [
        CategoryKind::Material,
        CategoryKind::Labor,
        CategoryKind::Transport,
        CategoryKind::Study,
    ];
}

/// A catalog category. Immutable after creation in practice; its `kind`
/// decides which summary bucket a line feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    /// Business code, unique (e.g. "MAT-01").
    pub code: String,
    pub description: Option<String>,
}

// =============================================================================
// Discipline
// =============================================================================

/// An engineering discipline (piping, electrical, civil, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discipline {
    pub id: String,
    pub name: String,
    /// Business code, unique (e.g. "PIP").
    pub code: String,
    /// Hex color used by collaborator displays (e.g. "#007bff").
    pub color: String,
}

// =============================================================================
// Unit
// =============================================================================

/// Measurement unit for a line item.
///
/// A fixed vocabulary in this domain, so a closed enum rather than a
/// reference table. Stored as its short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum UnitKind {
    /// Single unit.
    #[serde(rename = "u")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "u"))]
    Each,
    /// Linear meter.
    #[serde(rename = "ml")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ml"))]
    LinearMeter,
    /// Square meter.
    #[serde(rename = "m2")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "m2"))]
    SquareMeter,
    /// Cubic meter.
    #[serde(rename = "m3")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "m3"))]
    CubicMeter,
    /// Kilogram.
    #[serde(rename = "kg")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "kg"))]
    Kilogram,
    /// Hour of labor.
    #[serde(rename = "h")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "h"))]
    Hour,
    /// Day of labor.
    #[serde(rename = "j")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "j"))]
    Day,
    /// Assembled set.
    #[serde(rename = "ens")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ens"))]
    Set,
    /// Lump sum.
    #[serde(rename = "ff")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ff"))]
    LumpSum,
}

impl UnitKind {
    /// Short code used in storage and data exchange.
    pub const fn code(&self) -> &'static str {
        match self {
            UnitKind::Each => "u",
            UnitKind::LinearMeter => "ml",
            UnitKind::SquareMeter => "m2",
            UnitKind::CubicMeter => "m3",
            UnitKind::Kilogram => "kg",
            UnitKind::Hour => "h",
            UnitKind::Day => "j",
            UnitKind::Set => "ens",
            UnitKind::LumpSum => "ff",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            UnitKind::Each => "unit",
            UnitKind::LinearMeter => "linear meter",
            UnitKind::SquareMeter => "m²",
            UnitKind::CubicMeter => "m³",
            UnitKind::Kilogram => "kilogram",
            UnitKind::Hour => "hour",
            UnitKind::Day => "day",
            UnitKind::Set => "set",
            UnitKind::LumpSum => "lump sum",
        }
    }
}

impl Default for UnitKind {
    fn default() -> Self {
        UnitKind::Each
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A priced item in the administrator-owned catalog.
///
/// A price change here must propagate to every project referencing the
/// item (see the recomputation trigger in the db layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub id: String,

    /// Catalog numbering (e.g. "3.2.14"), optional.
    pub number: Option<String>,

    /// Display designation shown on estimates.
    pub designation: String,

    /// Technical characteristics, free text.
    pub characteristics: Option<String>,

    /// Unit price in cents.
    pub unit_price_cents: i64,

    pub unit: UnitKind,
    pub category_id: String,
    pub discipline_id: String,

    /// Whether the item can still be selected (soft delete).
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Custom Request
// =============================================================================

/// Lifecycle of a customer-proposed line item.
///
/// `pending → approved` or `pending → rejected`; both transitions are
/// terminal. Only approved requests with an admin price contribute cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

/// A customer-proposed line item awaiting administrative pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomRequest {
    pub id: String,
    pub project_id: String,
    pub category_id: String,
    pub discipline_id: String,

    /// Designation entered by the customer.
    pub designation: String,
    pub characteristics: Option<String>,
    pub unit: UnitKind,

    /// Requested quantity in hundredths.
    pub quantity_hundredths: i64,

    pub status: RequestStatus,

    /// Price set by the administrator on approval, in cents.
    pub admin_price_cents: Option<i64>,

    /// Administrator's comment on the decision.
    pub admin_comment: Option<String>,

    pub requested_at: DateTime<Utc>,

    /// When the administrator approved or rejected the request.
    pub decided_at: Option<DateTime<Utc>>,
}

impl CustomRequest {
    /// Returns the quantity as a fixed-point Quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_hundredths(self.quantity_hundredths)
    }

    /// Returns the administrator price, if one has been set.
    #[inline]
    pub fn admin_price(&self) -> Option<Money> {
        self.admin_price_cents.map(Money::from_cents)
    }

    /// Whether this request carries cost: approved AND priced.
    ///
    /// A pending or rejected request, or an approved one without a price,
    /// is excluded from bucket sums entirely (not merely priced at zero).
    pub fn is_priced(&self) -> bool {
        self.status == RequestStatus::Approved && self.admin_price_cents.is_some()
    }

    /// Total cost of the request (zero unless approved and priced).
    pub fn total_cost(&self) -> Money {
        match self.admin_price() {
            Some(price) if self.status == RequestStatus::Approved => {
                price.multiply_quantity(self.quantity())
            }
            _ => Money::zero(),
        }
    }
}

// =============================================================================
// Selection
// =============================================================================

/// What a selection points at.
///
/// A tagged sum type instead of two nullable foreign keys: the ambiguous
/// "both set" state cannot be expressed, and "neither set" is an explicit,
/// named case (a raw sandblast aggregate awaiting structured modeling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionSource {
    /// A catalog item chosen by the customer.
    Catalog { item_id: String },
    /// An approved custom request wrapped as a line.
    Request { request_id: String },
    /// A legacy sandblast aggregate with no structured reference.
    SandblastAggregate,
}

impl SelectionSource {
    /// The referenced catalog item id, if any.
    pub fn catalog_item_id(&self) -> Option<&str> {
        match self {
            SelectionSource::Catalog { item_id } => Some(item_id),
            _ => None,
        }
    }

    /// The referenced custom request id, if any.
    pub fn custom_request_id(&self) -> Option<&str> {
        match self {
            SelectionSource::Request { request_id } => Some(request_id),
            _ => None,
        }
    }

    /// Rebuilds the source from the two nullable store columns.
    ///
    /// `None` when both columns are set: the store schema forbids that
    /// state, so hitting it means the row predates the constraint and the
    /// caller must decide (the db layer surfaces it as a data error).
    pub fn from_columns(
        catalog_item_id: Option<String>,
        custom_request_id: Option<String>,
    ) -> Option<SelectionSource> {
        match (catalog_item_id, custom_request_id) {
            (Some(item_id), None) => Some(SelectionSource::Catalog { item_id }),
            (None, Some(request_id)) => Some(SelectionSource::Request { request_id }),
            (None, None) => Some(SelectionSource::SandblastAggregate),
            (Some(_), Some(_)) => None,
        }
    }

    /// Splits the source back into the two nullable store columns.
    pub fn as_columns(&self) -> (Option<&str>, Option<&str>) {
        (self.catalog_item_id(), self.custom_request_id())
    }
}

/// A project's chosen quantity of a catalog item or approved request.
///
/// Effective price and cost are computed through the price cascade, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub project_id: String,
    pub source: SelectionSource,

    /// Quantity in hundredths.
    pub quantity_hundredths: i64,

    /// Manual price override in cents. A zero override is treated as
    /// absent by the cascade.
    pub price_override_cents: Option<i64>,

    pub added_at: DateTime<Utc>,
}

impl Selection {
    /// Returns the quantity as a fixed-point Quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_hundredths(self.quantity_hundredths)
    }

    /// Returns the manual override, if set.
    #[inline]
    pub fn price_override(&self) -> Option<Money> {
        self.price_override_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Sandblasting
// =============================================================================

/// One geometry line inside a sandblast session. Immutable once created:
/// `total_area = quantity × unit_area` was computed at creation time from
/// the fixed lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SandblastCalculation {
    pub id: String,
    pub session_id: String,
    pub project_id: String,

    pub piece_type: PieceType,

    /// Nominal diameter in millimeters (DN).
    pub diameter_dn: i64,

    /// Piece count in hundredths.
    pub quantity_hundredths: i64,

    /// Unit surface in micro-m².
    pub unit_area_micro: i64,

    /// Total surface in micro-m².
    pub total_area_micro: i64,

    pub created_at: DateTime<Utc>,
}

impl SandblastCalculation {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_hundredths(self.quantity_hundredths)
    }

    #[inline]
    pub fn unit_area(&self) -> Area {
        Area::from_micro(self.unit_area_micro)
    }

    #[inline]
    pub fn total_area(&self) -> Area {
        Area::from_micro(self.total_area_micro)
    }
}

/// A sandblast costing session for a project.
///
/// Billed as labor. Only `validated` sessions contribute to the summary;
/// an unvalidated session is a persisted draft the customer has not
/// confirmed yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SandblastSession {
    pub id: String,
    pub project_id: String,

    /// Sum of calculation areas in micro-m².
    pub total_area_micro: i64,

    /// Billing rate in cents per m².
    pub price_per_m2_cents: i64,

    /// `total_area × price_per_m2`, rounded to cents.
    pub total_cost_cents: i64,

    pub validated: bool,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SandblastSession {
    #[inline]
    pub fn total_area(&self) -> Area {
        Area::from_micro(self.total_area_micro)
    }

    #[inline]
    pub fn price_per_m2(&self) -> Money {
        Money::from_cents(self.price_per_m2_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// The derived financial summary of a project. One row per project.
///
/// Fully reconstructable from the other entities; created lazily with
/// zero buckets, written only by the aggregation engine, never hand
/// edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Summary {
    pub project_id: String,

    pub bucket_material_cents: i64,
    pub bucket_labor_cents: i64,
    pub bucket_transport_cents: i64,
    pub bucket_study_cents: i64,

    /// Pre-tax total: the sum of the four buckets.
    pub total_ht_cents: i64,

    /// Applied tax rate in basis points.
    pub tax_rate_bps: u32,

    /// `total_ht × tax_rate`, rounded to cents.
    pub tax_amount_cents: i64,

    /// Tax-inclusive total.
    pub total_ttc_cents: i64,

    pub updated_at: DateTime<Utc>,
}

impl Summary {
    /// Returns the bucket for a category kind as Money.
    pub fn bucket(&self, kind: CategoryKind) -> Money {
        let cents = match kind {
            CategoryKind::Material => self.bucket_material_cents,
            CategoryKind::Labor => self.bucket_labor_cents,
            CategoryKind::Transport => self.bucket_transport_cents,
            CategoryKind::Study => self.bucket_study_cents,
        };
        Money::from_cents(cents)
    }

    #[inline]
    pub fn total_ht(&self) -> Money {
        Money::from_cents(self.total_ht_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_amount_cents)
    }

    #[inline]
    pub fn total_ttc(&self) -> Money {
        Money::from_cents(self.total_ttc_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
