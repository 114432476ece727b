//! Feasibility evaluator: checks computed metrics against the
//! zoning envelope and reports every violated limit rather than stopping at
//! the first one, so a caller sees the whole picture in one pass.

use sf_core::model::{FeasibilityViolation, ViolationCode, ZoningLimits};
use sf_core::units::OVERLAP_TOL_M2;

/// Inputs already computed by the rest of the pipeline; this module performs
/// no geometry of its own.
pub struct FeasibilityInputs {
    pub far: f64,
    pub coverage_pct: f64,
    pub parking_ratio: f64,
    pub height_ft: Option<f64>,
    pub density_du_per_acre: Option<f64>,
    pub impervious_pct: Option<f64>,
    pub open_space_pct: Option<f64>,
    pub building_overlap_m2: f64,
    pub buildings_outside_envelope_m2: f64,
}

/// Evaluate all zoning constraints, returning every violation found.
pub fn evaluate(inputs: &FeasibilityInputs, zoning: &ZoningLimits) -> Vec<FeasibilityViolation> {
    let mut out = Vec::new();

    if inputs.far > zoning.max_far {
        out.push(FeasibilityViolation::error(
            ViolationCode::FarExceeded,
            format!("FAR {:.3} exceeds max {:.3}", inputs.far, zoning.max_far),
            Some(inputs.far - zoning.max_far),
        ));
    }

    if inputs.coverage_pct > zoning.max_coverage_pct {
        out.push(FeasibilityViolation::error(
            ViolationCode::CoverageExceeded,
            format!(
                "building coverage {:.1}% exceeds max {:.1}%",
                inputs.coverage_pct, zoning.max_coverage_pct
            ),
            Some(inputs.coverage_pct - zoning.max_coverage_pct),
        ));
    }

    if inputs.parking_ratio < zoning.min_parking_ratio {
        out.push(FeasibilityViolation::error(
            ViolationCode::ParkingShortfall,
            format!(
                "parking ratio {:.3} is below required minimum {:.3}",
                inputs.parking_ratio, zoning.min_parking_ratio
            ),
            Some(zoning.min_parking_ratio - inputs.parking_ratio),
        ));
    }

    if let (Some(height), Some(max_height)) = (inputs.height_ft, zoning.max_height_ft) {
        if height > max_height {
            out.push(FeasibilityViolation::error(
                ViolationCode::HeightExceeded,
                format!("building height {height:.1} ft exceeds max {max_height:.1} ft"),
                Some(height - max_height),
            ));
        }
    }

    if let (Some(density), Some(max_density)) = (inputs.density_du_per_acre, zoning.max_density_du_per_acre) {
        if density > max_density {
            out.push(FeasibilityViolation::error(
                ViolationCode::DensityExceeded,
                format!("density {density:.2} du/acre exceeds max {max_density:.2} du/acre"),
                Some(density - max_density),
            ));
        }
    }

    if let (Some(impervious), Some(max_impervious)) = (inputs.impervious_pct, zoning.max_impervious_pct) {
        if impervious > max_impervious {
            out.push(FeasibilityViolation::error(
                ViolationCode::ImperviousExceeded,
                format!("impervious coverage {impervious:.1}% exceeds max {max_impervious:.1}%"),
                Some(impervious - max_impervious),
            ));
        }
    }

    if let (Some(open_space), Some(min_open_space)) = (inputs.open_space_pct, zoning.min_open_space_pct) {
        if open_space < min_open_space {
            out.push(FeasibilityViolation::warning(
                ViolationCode::OpenSpaceInsufficient,
                format!("open space {open_space:.1}% is below target minimum {min_open_space:.1}%"),
                Some(min_open_space - open_space),
            ));
        }
    }

    if inputs.building_overlap_m2 > OVERLAP_TOL_M2 {
        out.push(FeasibilityViolation::error(
            ViolationCode::BuildingOverlap,
            format!("buildings overlap by {:.2} m^2", inputs.building_overlap_m2),
            Some(inputs.building_overlap_m2),
        ));
    }

    if inputs.buildings_outside_envelope_m2 > OVERLAP_TOL_M2 {
        out.push(FeasibilityViolation::error(
            ViolationCode::BuildingOutsideEnvelope,
            format!(
                "{:.2} m^2 of building footprint falls outside the buildable envelope",
                inputs.buildings_outside_envelope_m2
            ),
            Some(inputs.buildings_outside_envelope_m2),
        ));
    }

    out
}

/// True if no `Severity::Error`-level violation is present (warnings alone
/// do not make a layout infeasible).
pub fn is_compliant(violations: &[FeasibilityViolation]) -> bool {
    !violations
        .iter()
        .any(|v| v.severity == sf_core::model::Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoning() -> ZoningLimits {
        ZoningLimits {
            max_far: 2.0,
            max_coverage_pct: 50.0,
            min_parking_ratio: 1.0,
            max_height_ft: Some(85.0),
            max_density_du_per_acre: Some(40.0),
            max_impervious_pct: Some(80.0),
            min_open_space_pct: Some(10.0),
            front_setback_ft: 20.0,
            side_setback_ft: 10.0,
            rear_setback_ft: 15.0,
        }
    }

    fn compliant_inputs() -> FeasibilityInputs {
        FeasibilityInputs {
            far: 1.5,
            coverage_pct: 40.0,
            parking_ratio: 1.2,
            height_ft: Some(60.0),
            density_du_per_acre: Some(30.0),
            impervious_pct: Some(70.0),
            open_space_pct: Some(15.0),
            building_overlap_m2: 0.0,
            buildings_outside_envelope_m2: 0.0,
        }
    }

    #[test]
    fn compliant_layout_has_no_violations() {
        let v = evaluate(&compliant_inputs(), &zoning());
        assert!(v.is_empty());
        assert!(is_compliant(&v));
    }

    #[test]
    fn far_over_limit_is_flagged() {
        let mut inputs = compliant_inputs();
        inputs.far = 2.5;
        let v = evaluate(&inputs, &zoning());
        assert!(v.iter().any(|x| x.code == ViolationCode::FarExceeded));
        assert!(!is_compliant(&v));
    }

    #[test]
    fn open_space_shortfall_is_a_warning_not_an_error() {
        let mut inputs = compliant_inputs();
        inputs.open_space_pct = Some(2.0);
        let v = evaluate(&inputs, &zoning());
        assert!(v.iter().any(|x| x.code == ViolationCode::OpenSpaceInsufficient));
        assert!(is_compliant(&v));
    }

    #[test]
    fn building_overlap_is_flagged() {
        let mut inputs = compliant_inputs();
        inputs.building_overlap_m2 = 5.0;
        let v = evaluate(&inputs, &zoning());
        assert!(v.iter().any(|x| x.code == ViolationCode::BuildingOverlap));
    }
}
