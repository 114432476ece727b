//! sf_report — Pure offline report model + renderers (JSON/HTML).
//!
//! Rules:
//! - No network, no I/O here. Callers supply the `Metrics`/`Scene`/pro-forma
//!   artifacts already in memory, typically straight out of `sf_pipeline`.
//! - Stable section order and field names; the model owns its own
//!   presentation-shaped types rather than re-exporting `sf_core::model`
//!   types directly, so a domain change doesn't silently reorder a report.

#![forbid(unsafe_code)]

pub mod render_html;
pub mod render_json;

use sf_core::model::{
    Element, ElementType, FeasibilityViolation, Metrics, ProFormaResult, Scene, Severity,
    ViolationCode,
};

#[derive(Debug)]
pub enum ReportError {
    Serialize(&'static str),
}

// ===== Model =====

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct ReportModel {
    pub cover: CoverSection,
    pub layout: LayoutSection,
    pub feasibility: FeasibilitySection,
    pub proforma: Option<ProFormaSection>,
    pub scene: SceneSection,
    pub integrity: IntegritySection,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct CoverSection {
    pub title: String,
    pub zoning_compliant: bool,
    pub final_score_1dp: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct LayoutSection {
    pub far: f64,
    pub coverage_pct_1dp: String,
    pub parking_ratio: f64,
    pub achieved_units: u32,
    pub unit_mix_summary: String,
    pub open_space_pct_1dp: String,
    pub parking_angle_deg: f64,
    pub stalls_provided: u32,
    pub stalls_required: u32,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct ViolationRow {
    pub code: String,
    pub message: String,
    pub delta: Option<f64>,
    pub severity: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct FeasibilitySection {
    pub compliant: bool,
    pub violations: Vec<ViolationRow>,
    pub warnings: Vec<ViolationRow>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct ProFormaSection {
    pub total_development_cost: f64,
    pub cost_per_unit: f64,
    pub cost_per_sf: f64,
    pub noi: f64,
    pub yield_on_cost_pct_1dp: String,
    pub stabilized_value: f64,
    pub profit: f64,
    pub equity_multiple: f64,
    pub cash_on_cash_pct_1dp: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct ElementCount {
    pub kind: String,
    pub count: u32,
    pub area_sq_ft: f64,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct SceneSection {
    pub element_counts: Vec<ElementCount>,
    pub total_area_sq_ft: f64,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct IntegritySection {
    pub engine_vendor: String,
    pub engine_name: String,
    pub engine_version: String,
    pub seed_used: u64,
    pub iterations: u64,
}

// ===== API =====

/// Build the report model from the pipeline's in-memory outputs (pure, offline).
pub fn build_model(
    metrics: &Metrics,
    proforma: Option<&ProFormaResult>,
    scene: &Scene,
    seed_used: u64,
    iterations: u64,
    final_score: f64,
) -> ReportModel {
    let cover = CoverSection {
        title: "Site Plan Report".to_string(),
        zoning_compliant: metrics.zoning_compliant,
        final_score_1dp: one_decimal(final_score),
    };

    let layout = LayoutSection {
        far: metrics.far,
        coverage_pct_1dp: one_decimal(metrics.coverage_pct),
        parking_ratio: metrics.parking_ratio,
        achieved_units: metrics.achieved_units,
        unit_mix_summary: metrics.unit_mix_summary.clone(),
        open_space_pct_1dp: one_decimal(metrics.open_space_pct),
        parking_angle_deg: metrics.parking_angle_deg,
        stalls_provided: metrics.stalls_provided,
        stalls_required: metrics.stalls_required,
    };

    let feasibility = FeasibilitySection {
        compliant: metrics.zoning_compliant,
        violations: metrics.violations.iter().map(violation_row).collect(),
        warnings: metrics.warnings.iter().map(violation_row).collect(),
    };

    let proforma = proforma.map(|p| ProFormaSection {
        total_development_cost: p.total_development_cost,
        cost_per_unit: p.cost_per_unit,
        cost_per_sf: p.cost_per_sf,
        noi: p.noi,
        yield_on_cost_pct_1dp: one_decimal(p.yield_on_cost * 100.0),
        stabilized_value: p.stabilized_value,
        profit: p.profit,
        equity_multiple: p.equity_multiple,
        cash_on_cash_pct_1dp: one_decimal(p.cash_on_cash * 100.0),
    });

    let scene_section = SceneSection {
        element_counts: element_counts(&scene.elements),
        total_area_sq_ft: scene.elements.iter().map(|e| e.properties.area_sq_ft).sum(),
    };

    let integrity = IntegritySection {
        engine_vendor: "sf-engine".to_string(),
        engine_name: "sf".to_string(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        seed_used,
        iterations,
    };

    ReportModel {
        cover,
        layout,
        feasibility,
        proforma,
        scene: scene_section,
        integrity,
    }
}

fn violation_row(v: &FeasibilityViolation) -> ViolationRow {
    ViolationRow {
        code: violation_code_str(v.code).to_string(),
        message: v.message.clone(),
        delta: v.delta,
        severity: match v.severity {
            Severity::Error => "error".to_string(),
            Severity::Warning => "warning".to_string(),
        },
    }
}

fn violation_code_str(code: ViolationCode) -> &'static str {
    match code {
        ViolationCode::FarExceeded => "far_exceeded",
        ViolationCode::CoverageExceeded => "coverage_exceeded",
        ViolationCode::ParkingShortfall => "parking_shortfall",
        ViolationCode::HeightExceeded => "height_exceeded",
        ViolationCode::DensityExceeded => "density_exceeded",
        ViolationCode::ImperviousExceeded => "impervious_exceeded",
        ViolationCode::OpenSpaceInsufficient => "open_space_insufficient",
        ViolationCode::BuildingOverlap => "building_overlap",
        ViolationCode::BuildingOutsideEnvelope => "building_outside_envelope",
    }
}

fn element_counts(elements: &[Element]) -> Vec<ElementCount> {
    let kinds = [
        ElementType::Building,
        ElementType::ParkingBay,
        ElementType::ParkingAisle,
        ElementType::Circulation,
        ElementType::Greenspace,
    ];
    kinds
        .iter()
        .filter_map(|kind| {
            let matching: Vec<&Element> = elements.iter().filter(|e| e.kind == *kind).collect();
            if matching.is_empty() {
                return None;
            }
            Some(ElementCount {
                kind: element_type_str(*kind).to_string(),
                count: matching.len() as u32,
                area_sq_ft: matching.iter().map(|e| e.properties.area_sq_ft).sum(),
            })
        })
        .collect()
}

fn element_type_str(kind: ElementType) -> &'static str {
    match kind {
        ElementType::Building => "building",
        ElementType::ParkingBay => "parking_bay",
        ElementType::ParkingAisle => "parking_aisle",
        ElementType::Circulation => "circulation",
        ElementType::Greenspace => "greenspace",
    }
}

/// One-decimal percent/score formatting; every quantity here (area, FAR,
/// yield) is already `f64` end to end, so this is plain float formatting.
fn one_decimal(x: f64) -> String {
    format!("{:.1}", x)
}
