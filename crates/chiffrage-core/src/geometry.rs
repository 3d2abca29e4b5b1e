//! # Geometry Lookup
//!
//! The fixed sandblasting surface table: unit surface area per
//! (nominal diameter, piece type) combination.
//!
//! ## How The Table Is Used
//! ```text
//! Customer picks: DN 200 elbow_90, quantity 12
//!      |
//!      v
//! unit_area(200, Elbow90)  ->  0.330000 m²
//!      |
//!      v
//! total_area = 12 x 0.330000 = 3.960000 m²
//!      |
//!      v
//! session cost = total_area x price_per_m² (labor bucket)
//! ```
//!
//! Many combinations are legitimately absent: they are not sandblasted in
//! practice for that diameter. Absence is reported as a typed error, never
//! coerced to a zero-cost line.
//!
//! The table is read-only domain data. There is exactly one copy of it, in
//! this module, shared by the aggregation engine and any collaborator that
//! needs a cost preview.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Quantity};

// =============================================================================
// Piece Type
// =============================================================================

/// The kinds of pipe pieces that can be sandblasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum PieceType {
    /// Straight pipe, per linear meter.
    #[serde(rename = "straight_pipe")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "straight_pipe"))]
    StraightPipe,
    /// 90° elbow.
    #[serde(rename = "elbow_90")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "elbow_90"))]
    Elbow90,
    /// 45° elbow.
    #[serde(rename = "elbow_45")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "elbow_45"))]
    Elbow45,
    /// Long-radius (5D) 90° elbow.
    #[serde(rename = "elbow_90_lr")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "elbow_90_lr"))]
    Elbow90LongRadius,
    /// Sector (mitered) elbow.
    #[serde(rename = "sector_elbow")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "sector_elbow"))]
    SectorElbow,
    /// Tee fitting.
    #[serde(rename = "tee")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "tee"))]
    Tee,
    /// Flange.
    #[serde(rename = "flange")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "flange"))]
    Flange,
    /// Concentric/eccentric reduction.
    #[serde(rename = "reduction")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "reduction"))]
    Reduction,
    /// End cap.
    #[serde(rename = "cap")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cap"))]
    Cap,
}

impl PieceType {
    /// All piece kinds, in table column order.
    pub const ALL: [PieceType; 9] = [
        PieceType::StraightPipe,
        PieceType::Elbow90,
        PieceType::Elbow45,
        PieceType::Elbow90LongRadius,
        PieceType::SectorElbow,
        PieceType::Tee,
        PieceType::Flange,
        PieceType::Reduction,
        PieceType::Cap,
    ];

    /// Storage/exchange code.
    pub const fn code(&self) -> &'static str {
        match self {
            PieceType::StraightPipe => "straight_pipe",
            PieceType::Elbow90 => "elbow_90",
            PieceType::Elbow45 => "elbow_45",
            PieceType::Elbow90LongRadius => "elbow_90_lr",
            PieceType::SectorElbow => "sector_elbow",
            PieceType::Tee => "tee",
            PieceType::Flange => "flange",
            PieceType::Reduction => "reduction",
            PieceType::Cap => "cap",
        }
    }

    /// Column index in the surface table.
    const fn column(&self) -> usize {
        match self {
            PieceType::StraightPipe => 0,
            PieceType::Elbow90 => 1,
            PieceType::Elbow45 => 2,
            PieceType::Elbow90LongRadius => 3,
            PieceType::SectorElbow => 4,
            PieceType::Tee => 5,
            PieceType::Flange => 6,
            PieceType::Reduction => 7,
            PieceType::Cap => 8,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Area Type
// =============================================================================

/// A surface area in millionths of a m² (fixed point, scale 6).
///
/// Unit surfaces are small (a DN 15 45° elbow is 0.002 m²) while project
/// totals can reach thousands of m²; i64 micro-m² covers both without
/// floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Area(i64);

impl Area {
    /// Creates an area from micro-m².
    #[inline]
    pub const fn from_micro(micro: i64) -> Self {
        Area(micro)
    }

    /// Returns the area in micro-m².
    #[inline]
    pub const fn micro(&self) -> i64 {
        self.0
    }

    /// Zero area.
    #[inline]
    pub const fn zero() -> Self {
        Area(0)
    }

    /// Checks if the area is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies a unit area by a fixed-point piece count, rounding half
    /// up at the micro-m² scale.
    pub fn multiply_quantity(&self, qty: Quantity) -> Area {
        let total = (self.0 as i128 * qty.hundredths() as i128 + 50) / 100;
        Area(total as i64)
    }

    /// Bills this area at a rate per m², rounding half up at the cent.
    ///
    /// ```rust
    /// use chiffrage_core::geometry::Area;
    /// use chiffrage_core::money::Money;
    ///
    /// let area = Area::from_micro(3_960_000); // 3.96 m²
    /// let rate = Money::from_cents(500_000);  // 5000.00 CFA per m²
    /// assert_eq!(area.cost_at(rate).cents(), 1_980_000); // 19 800.00 CFA
    /// ```
    pub fn cost_at(&self, rate_per_m2: Money) -> Money {
        let cents = (self.0 as i128 * rate_per_m2.cents() as i128 + 500_000) / 1_000_000;
        Money::from_cents(cents as i64)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:06} m2",
            sign,
            (self.0 / 1_000_000).abs(),
            (self.0 % 1_000_000).abs()
        )
    }
}

impl Default for Area {
    fn default() -> Self {
        Area::zero()
    }
}

impl Add for Area {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Area(self.0 + other.0)
    }
}

impl AddAssign for Area {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

// =============================================================================
// Surface Table
// =============================================================================

/// One table row: a standard nominal diameter with its outer diameter (in
/// tenths of a millimeter, display only) and the unit surface per piece
/// kind in micro-m². Zero means "not sandblasted in practice".
struct DiameterRow {
    dn: i64,
    outer_tenth_mm: i64,
    /// Columns: straight_pipe, elbow_90, elbow_45, elbow_90_lr,
    /// sector_elbow, tee, flange, reduction, cap.
    areas: [i64; 9],
}

/// Unit surfaces per DN, from the reference sandblasting tables.
///
/// Tees, flanges, reductions and caps are never sandblasted separately,
/// so their columns are entirely zero; sector elbows only exist from
/// DN 150 up, and DN 750 straight pipe is not a stocked size.
const SURFACE_TABLE: &[DiameterRow] = &[
    // dn, outer ø (0.1 mm), [tube, e90, e45, e90_lr, sector, tee, flange, red, cap]
    DiameterRow { dn: 15, outer_tenth_mm: 213, areas: [67_000, 4_000, 2_000, 7_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 20, outer_tenth_mm: 267, areas: [84_000, 5_000, 3_000, 13_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 25, outer_tenth_mm: 334, areas: [105_000, 6_000, 3_000, 21_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 32, outer_tenth_mm: 422, areas: [133_000, 10_000, 5_000, 33_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 40, outer_tenth_mm: 483, areas: [152_000, 14_000, 7_000, 45_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 50, outer_tenth_mm: 603, areas: [189_000, 23_000, 11_000, 76_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 65, outer_tenth_mm: 730, areas: [229_000, 34_000, 17_000, 114_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 80, outer_tenth_mm: 889, areas: [279_000, 50_000, 25_000, 167_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 100, outer_tenth_mm: 1143, areas: [359_000, 86_000, 43_000, 287_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 125, outer_tenth_mm: 1397, areas: [439_000, 131_000, 66_000, 438_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 150, outer_tenth_mm: 1683, areas: [529_000, 190_000, 95_000, 633_000, 194_000, 0, 0, 0, 0] },
    DiameterRow { dn: 200, outer_tenth_mm: 2191, areas: [688_000, 330_000, 165_000, 1_099_000, 338_000, 0, 0, 0, 0] },
    DiameterRow { dn: 250, outer_tenth_mm: 2730, areas: [858_000, 513_000, 257_000, 1_711_000, 525_000, 0, 0, 0, 0] },
    DiameterRow { dn: 300, outer_tenth_mm: 3239, areas: [1_018_000, 731_000, 365_000, 2_436_000, 748_000, 0, 0, 0, 0] },
    DiameterRow { dn: 350, outer_tenth_mm: 3556, areas: [1_117_000, 936_000, 468_000, 3_120_000, 958_000, 0, 0, 0, 0] },
    DiameterRow { dn: 400, outer_tenth_mm: 4065, areas: [1_277_000, 1_222_000, 611_000, 4_076_000, 1_252_000, 0, 0, 0, 0] },
    DiameterRow { dn: 450, outer_tenth_mm: 4572, areas: [1_436_000, 1_547_000, 774_000, 5_158_000, 1_585_000, 0, 0, 0, 0] },
    DiameterRow { dn: 500, outer_tenth_mm: 5080, areas: [1_596_000, 1_910_000, 955_000, 6_368_000, 1_953_000, 0, 0, 0, 0] },
    DiameterRow { dn: 600, outer_tenth_mm: 6096, areas: [1_915_000, 2_751_000, 1_376_000, 9_169_000, 2_815_000, 0, 0, 0, 0] },
    DiameterRow { dn: 700, outer_tenth_mm: 7110, areas: [2_234_000, 3_744_000, 1_872_000, 12_480_000, 3_283_000, 0, 0, 0, 0] },
    DiameterRow { dn: 750, outer_tenth_mm: 7620, areas: [0, 4_298_000, 2_149_000, 14_330_000, 0, 0, 0, 0, 0] },
    DiameterRow { dn: 800, outer_tenth_mm: 8130, areas: [2_554_000, 4_892_000, 2_446_000, 16_300_000, 5_003_000, 0, 0, 0, 0] },
    DiameterRow { dn: 900, outer_tenth_mm: 9140, areas: [2_871_000, 6_185_000, 3_093_000, 20_620_000, 6_330_000, 0, 0, 0, 0] },
    DiameterRow { dn: 1000, outer_tenth_mm: 10160, areas: [3_192_000, 7_641_000, 3_821_000, 25_470_000, 7_823_000, 0, 0, 0, 0] },
];

fn row_for(diameter_dn: i64) -> Option<&'static DiameterRow> {
    SURFACE_TABLE.iter().find(|row| row.dn == diameter_dn)
}

// =============================================================================
// Lookup Operations
// =============================================================================

/// Looks up the unit surface for a (diameter, piece) combination.
///
/// ## Errors
/// [`CoreError::GeometryUnavailable`] when the diameter is not a standard
/// DN or the combination has no surface in the reference table. Callers
/// must surface this to the user; it is never a zero-cost line.
///
/// ```rust
/// use chiffrage_core::geometry::{unit_area, PieceType};
///
/// let area = unit_area(200, PieceType::Elbow90).unwrap();
/// assert_eq!(area.micro(), 330_000); // 0.33 m²
///
/// // DN 750 sector elbows are not sandblasted in practice
/// assert!(unit_area(750, PieceType::SectorElbow).is_err());
/// ```
pub fn unit_area(diameter_dn: i64, piece: PieceType) -> CoreResult<Area> {
    let micro = row_for(diameter_dn)
        .map(|row| row.areas[piece.column()])
        .unwrap_or(0);

    if micro == 0 {
        return Err(CoreError::GeometryUnavailable { diameter_dn, piece });
    }

    Ok(Area::from_micro(micro))
}

/// Whether a (diameter, piece) combination has a surface in the table.
pub fn is_available(diameter_dn: i64, piece: PieceType) -> bool {
    unit_area(diameter_dn, piece).is_ok()
}

/// Total surface for a quantity of pieces: `quantity × unit_area`.
///
/// Same availability contract as [`unit_area`].
pub fn total_area(diameter_dn: i64, piece: PieceType, qty: Quantity) -> CoreResult<Area> {
    Ok(unit_area(diameter_dn, piece)?.multiply_quantity(qty))
}

/// The standard nominal diameters, ascending.
pub fn standard_diameters() -> impl Iterator<Item = i64> {
    SURFACE_TABLE.iter().map(|row| row.dn)
}

/// Outer pipe diameter in millimeters for a standard DN (display only).
pub fn outer_diameter_mm(diameter_dn: i64) -> Option<f64> {
    row_for(diameter_dn).map(|row| row.outer_tenth_mm as f64 / 10.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
