//! Data model: the value types passed between components.
//!
//! Everything here is a plain value object: no I/O, no hidden state; the
//! optimizer clones these freely.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geom::{MultiPolygon, Point2, Polygon, Polyline};
use crate::units::ft_to_m;

// ---------------------------------------------------------------------
// Building typology
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BuildingType {
    Bar,
    LShape,
    Podium,
    UShape,
    CourtyardWrap,
}

impl BuildingType {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildingType::Bar => "bar",
            BuildingType::LShape => "l-shape",
            BuildingType::Podium => "podium",
            BuildingType::UShape => "u-shape",
            BuildingType::CourtyardWrap => "courtyard-wrap",
        }
    }
}

// ---------------------------------------------------------------------
// BuildingSpec — the unit of optimization
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LockedFields {
    pub position: bool,
    pub rotation: bool,
    pub dimensions: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuildingSpec {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: BuildingType,
    pub anchor: Point2,
    pub rotation_rad: f64,
    /// `None` means "use this typology's default width" — see
    /// `default_main_dims_m`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub width_m: Option<f64>,
    /// `None` means "use this typology's default depth" — see
    /// `default_main_dims_m`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub depth_m: Option<f64>,
    pub floors: u32,
    pub wing_width_m: Option<f64>,
    pub wing_depth_m: Option<f64>,
    pub courtyard_width_m: Option<f64>,
    pub courtyard_depth_m: Option<f64>,
    pub podium_floors: Option<u32>,
    pub unit_mix: Option<Vec<UnitMixEntry>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub locked: LockedFields,
}

impl BuildingSpec {
    pub fn footprint_floors(&self) -> u32 {
        self.floors.max(1)
    }

    /// Resolve `width_m`/`depth_m`, substituting this typology's default
    /// main-bar dimensions when either was omitted.
    pub fn main_dims_m(&self) -> (f64, f64) {
        let (default_w, default_d) = default_main_dims_m(self.kind);
        (self.width_m.unwrap_or(default_w), self.depth_m.unwrap_or(default_d))
    }

    /// Resolve the wing dimensions for L-shape/U-shape typologies,
    /// substituting the typology's default wing size when omitted.
    pub fn wing_dims_m(&self) -> (f64, f64) {
        let (default_w, default_d) = default_wing_dims_m(self.kind);
        (self.wing_width_m.unwrap_or(default_w), self.wing_depth_m.unwrap_or(default_d))
    }

    /// Resolve the inner courtyard dimensions for the courtyard-wrap
    /// typology, substituting the default when omitted.
    pub fn courtyard_dims_m(&self) -> (f64, f64) {
        (
            self.courtyard_width_m.unwrap_or(ft_to_m(DEFAULT_COURTYARD_INNER_WIDTH_FT)),
            self.courtyard_depth_m.unwrap_or(ft_to_m(DEFAULT_COURTYARD_INNER_DEPTH_FT)),
        )
    }
}

/// Per-typology default main-bar footprint dimensions, in feet, applied only
/// when a `BuildingSpec` omits `width_m`/`depth_m`.
pub const DEFAULT_BAR_DIMS_FT: (f64, f64) = (200.0, 60.0);
pub const DEFAULT_LSHAPE_DIMS_FT: (f64, f64) = (150.0, 60.0);
pub const DEFAULT_PODIUM_DIMS_FT: (f64, f64) = (200.0, 100.0);
pub const DEFAULT_USHAPE_DIMS_FT: (f64, f64) = (200.0, 120.0);
pub const DEFAULT_COURTYARD_WRAP_DIMS_FT: (f64, f64) = (200.0, 150.0);

/// Default wing (L-shape) / notch (U-shape) dimensions, in feet, applied
/// only when a `BuildingSpec` omits `wing_width_m`/`wing_depth_m`.
pub const DEFAULT_LSHAPE_WING_DIMS_FT: (f64, f64) = (80.0, 60.0);
pub const DEFAULT_USHAPE_NOTCH_DIMS_FT: (f64, f64) = (100.0, 60.0);

/// Default inner courtyard dimensions, in feet, applied only when a
/// `BuildingSpec` omits `courtyard_width_m`/`courtyard_depth_m`.
pub const DEFAULT_COURTYARD_INNER_WIDTH_FT: f64 = 120.0;
pub const DEFAULT_COURTYARD_INNER_DEPTH_FT: f64 = 70.0;

fn default_main_dims_m(kind: BuildingType) -> (f64, f64) {
    let (w_ft, d_ft) = match kind {
        BuildingType::Bar => DEFAULT_BAR_DIMS_FT,
        BuildingType::LShape => DEFAULT_LSHAPE_DIMS_FT,
        BuildingType::Podium => DEFAULT_PODIUM_DIMS_FT,
        BuildingType::UShape => DEFAULT_USHAPE_DIMS_FT,
        BuildingType::CourtyardWrap => DEFAULT_COURTYARD_WRAP_DIMS_FT,
    };
    (ft_to_m(w_ft), ft_to_m(d_ft))
}

fn default_wing_dims_m(kind: BuildingType) -> (f64, f64) {
    let (w_ft, d_ft) = match kind {
        BuildingType::UShape => DEFAULT_USHAPE_NOTCH_DIMS_FT,
        _ => DEFAULT_LSHAPE_WING_DIMS_FT,
    };
    (ft_to_m(w_ft), ft_to_m(d_ft))
}

// ---------------------------------------------------------------------
// Unit mix
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnitType {
    Studio,
    #[cfg_attr(feature = "serde", serde(rename = "1br"))]
    OneBr,
    #[cfg_attr(feature = "serde", serde(rename = "2br"))]
    TwoBr,
    #[cfg_attr(feature = "serde", serde(rename = "3br"))]
    ThreeBr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitMixEntry {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: UnitType,
    pub count: u32,
    pub avg_sqft: f64,
    pub rent_per_month: f64,
}

/// Default distribution fallback when a building carries no explicit mix:
/// studio 10%, 1br 40%, 2br 35%, 3br 15%; 85% of GFA is net leasable;
/// weighted average 720 sqft/unit.
pub const DEFAULT_MIX_SHARES: [(UnitType, f64); 4] = [
    (UnitType::Studio, 0.10),
    (UnitType::OneBr, 0.40),
    (UnitType::TwoBr, 0.35),
    (UnitType::ThreeBr, 0.15),
];

/// Net-leasable fraction of GFA used to derive a default unit mix.
pub const DEFAULT_LEASABLE_FRACTION: f64 = 0.85;
/// Weighted-average unit size (sqft) used by the default-mix derivation,
/// the single constant chosen among a few slightly different candidate
/// derivations.
pub const DEFAULT_AVG_UNIT_SQFT: f64 = 720.0;

/// Nominal monthly rent per leasable square foot, used only when a building
/// carries no explicit `unit_mix` (pro-forma default).
pub const DEFAULT_RENT_PER_SQFT_MONTH: f64 = 2.25;

// ---------------------------------------------------------------------
// Pro-forma (full financial model)
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ConstructionType {
    WoodFrame,
    Steel,
    Concrete,
}

impl Default for ConstructionType {
    fn default() -> Self {
        ConstructionType::WoodFrame
    }
}

/// Per-sf hard construction cost by structural type.
pub const CONSTRUCTION_COST_PER_SQFT: [(ConstructionType, f64); 3] = [
    (ConstructionType::WoodFrame, 165.0),
    (ConstructionType::Steel, 210.0),
    (ConstructionType::Concrete, 260.0),
];

/// Market-rate assumptions behind the pro-forma, with built-in defaults.
/// Any field left `None` in a caller-supplied override falls back to its
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketOverrides {
    pub vacancy_rate: Option<f64>,
    pub opex_ratio: Option<f64>,
    pub interest_rate: Option<f64>,
    pub financing_months: Option<f64>,
    pub cap_rate: Option<f64>,
    pub equity_pct: Option<f64>,
}

/// Inputs to the full financial pro-forma (`proForma`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProFormaInputs {
    pub total_gfa_sqft: f64,
    pub site_area_sqft: f64,
    pub unit_mix: Vec<UnitMixEntry>,
    pub surface_stalls: u32,
    pub structured_stalls: u32,
    pub land_cost: f64,
    pub construction_type: ConstructionType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub market_overrides: MarketOverrides,
}

/// Full financial summary for one layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProFormaResult {
    pub gross_potential_rent: f64,
    pub vacancy_loss: f64,
    pub effective_gross_income: f64,
    pub opex: f64,
    pub noi: f64,
    pub total_development_cost: f64,
    pub cost_per_unit: f64,
    pub cost_per_sf: f64,
    pub yield_on_cost: f64,
    pub stabilized_value: f64,
    pub profit: f64,
    pub equity_multiple: f64,
    pub cash_on_cash: f64,
}

// ---------------------------------------------------------------------
// Zoning & design configuration
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoningLimits {
    pub max_far: f64,
    pub max_coverage_pct: f64,
    pub min_parking_ratio: f64,
    pub max_height_ft: Option<f64>,
    pub max_density_du_per_acre: Option<f64>,
    pub max_impervious_pct: Option<f64>,
    pub min_open_space_pct: Option<f64>,
    pub front_setback_ft: f64,
    pub side_setback_ft: f64,
    pub rear_setback_ft: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParkingSpec {
    pub stall_w_m: f64,
    pub stall_d_m: f64,
    pub aisle_w_m: f64,
    pub target_ratio: f64,
    pub ada_pct: f64,
    pub ev_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignParams {
    pub target_far: f64,
    pub target_coverage_pct: f64,
    pub num_buildings: u8,
    pub building_typology: BuildingType,
    pub parking: ParkingSpec,
    pub trial_angles_deg: Vec<f64>,
    /// Land acquisition cost, fed into the full pro-forma.
    #[cfg_attr(feature = "serde", serde(default))]
    pub land_cost: f64,
    /// Structural system driving per-sf hard cost.
    #[cfg_attr(feature = "serde", serde(default))]
    pub construction_type: ConstructionType,
    /// Fraction of parking stalls that are structured rather than surface,
    /// used only by the full pro-forma cost split.
    #[cfg_attr(feature = "serde", serde(default))]
    pub structured_parking_pct: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub market_overrides: MarketOverrides,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanConfig {
    pub zoning: ZoningLimits,
    pub design: DesignParams,
}

// ---------------------------------------------------------------------
// Parking / feasibility / scene
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct ParkingSolution {
    pub bays: Vec<Polygon>,
    pub aisles: Vec<Polygon>,
    pub circulation: Vec<Polygon>,
    pub stalls_achieved: u32,
    pub chosen_angle_deg: f64,
    pub access_point: Point2,
    pub is_fully_connected: bool,
    pub circulation_area_m2: f64,
}

impl Default for ParkingSolution {
    fn default() -> Self {
        Self {
            bays: Vec::new(),
            aisles: Vec::new(),
            circulation: Vec::new(),
            stalls_achieved: 0,
            chosen_angle_deg: 0.0,
            access_point: Point2 { x: 0.0, y: 0.0 },
            is_fully_connected: true,
            circulation_area_m2: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ViolationCode {
    FarExceeded,
    CoverageExceeded,
    ParkingShortfall,
    HeightExceeded,
    DensityExceeded,
    ImperviousExceeded,
    OpenSpaceInsufficient,
    BuildingOverlap,
    BuildingOutsideEnvelope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeasibilityViolation {
    pub code: ViolationCode,
    pub message: String,
    pub delta: Option<f64>,
    pub severity: Severity,
}

impl FeasibilityViolation {
    pub fn error(code: ViolationCode, message: impl Into<String>, delta: Option<f64>) -> Self {
        Self { code, message: message.into(), delta, severity: Severity::Error }
    }

    pub fn warning(code: ViolationCode, message: impl Into<String>, delta: Option<f64>) -> Self {
        Self { code, message: message.into(), delta, severity: Severity::Warning }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ElementType {
    Building,
    ParkingBay,
    ParkingAisle,
    Circulation,
    Greenspace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementProperties {
    pub area_sq_ft: f64,
    pub floors: Option<u32>,
    pub parking_spaces: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementType,
    pub geometry: Polygon,
    pub properties: ElementProperties,
}

/// A road polyline with an optional name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Road {
    pub line: Polyline,
    pub name: Option<String>,
}

/// Aggregate metrics record emitted alongside the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    pub far: f64,
    pub coverage_pct: f64,
    pub parking_ratio: f64,
    pub achieved_units: u32,
    pub unit_mix_summary: String,
    pub open_space_pct: f64,
    pub parking_angle_deg: f64,
    pub stalls_provided: u32,
    pub stalls_required: u32,
    pub zoning_compliant: bool,
    pub violations: Vec<FeasibilityViolation>,
    pub warnings: Vec<FeasibilityViolation>,
    pub cancelled: bool,
}

/// The rendering-ready output of one evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub elements: Vec<Element>,
}

/// Parcel geometry accepted at the envelope boundary: Polygon or
/// MultiPolygon; MultiPolygon normalization selects the largest member.
#[derive(Clone, Debug, PartialEq)]
pub enum ParcelGeometry {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl ParcelGeometry {
    pub fn normalize(&self) -> Option<Polygon> {
        match self {
            ParcelGeometry::Polygon(p) => Some(p.clone()),
            ParcelGeometry::MultiPolygon(mp) => crate::geom::normalize_to_polygon(mp),
        }
    }
}
