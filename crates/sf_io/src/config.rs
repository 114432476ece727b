//! Loading and validating `PlanConfig` (zoning limits + design parameters)
//! from JSON. The on-disk units match the human-facing fields of the
//! model directly (feet for setbacks/heights) — no conversion happens here;
//! `sf_core::units` helpers convert at the geometry boundary instead.

use std::path::Path;

use sf_core::model::PlanConfig;

use crate::IoError;

/// Parse a `PlanConfig` from a JSON document.
pub fn parse_plan_config(raw: &str) -> Result<PlanConfig, IoError> {
    let config: PlanConfig = serde_json::from_str(raw)?;
    validate(&config)?;
    Ok(config)
}

/// Load a `PlanConfig` from a file on disk.
pub fn load_plan_config(path: &Path) -> Result<PlanConfig, IoError> {
    let raw = std::fs::read_to_string(path)?;
    parse_plan_config(&raw)
}

fn validate(config: &PlanConfig) -> Result<(), IoError> {
    let z = &config.zoning;
    if !(z.max_far > 0.0) {
        return Err(IoError::Invalid("zoning.max_far must be positive".into()));
    }
    if !(0.0..=100.0).contains(&z.max_coverage_pct) {
        return Err(IoError::Invalid("zoning.max_coverage_pct must be within [0, 100]".into()));
    }
    if z.min_parking_ratio < 0.0 {
        return Err(IoError::Invalid("zoning.min_parking_ratio must be non-negative".into()));
    }
    if z.front_setback_ft < 0.0 || z.side_setback_ft < 0.0 || z.rear_setback_ft < 0.0 {
        return Err(IoError::Invalid("setbacks must be non-negative".into()));
    }

    let d = &config.design;
    if !(d.target_far > 0.0) {
        return Err(IoError::Invalid("design.target_far must be positive".into()));
    }
    if d.num_buildings == 0 {
        return Err(IoError::Invalid("design.num_buildings must be at least 1".into()));
    }
    if d.trial_angles_deg.is_empty() {
        return Err(IoError::Invalid("design.trial_angles_deg must not be empty".into()));
    }
    let p = &d.parking;
    if p.stall_w_m <= 0.0 || p.stall_d_m <= 0.0 || p.aisle_w_m <= 0.0 {
        return Err(IoError::Invalid("parking stall/aisle dimensions must be positive".into()));
    }
    if d.land_cost < 0.0 {
        return Err(IoError::Invalid("design.land_cost must be non-negative".into()));
    }
    if !(0.0..=1.0).contains(&d.structured_parking_pct) {
        return Err(IoError::Invalid("design.structured_parking_pct must be within [0, 1]".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "zoning": {
                "max_far": 2.5,
                "max_coverage_pct": 60.0,
                "min_parking_ratio": 1.2,
                "max_height_ft": 85.0,
                "max_density_du_per_acre": null,
                "max_impervious_pct": null,
                "min_open_space_pct": 10.0,
                "front_setback_ft": 20.0,
                "side_setback_ft": 10.0,
                "rear_setback_ft": 15.0
            },
            "design": {
                "target_far": 2.0,
                "target_coverage_pct": 45.0,
                "num_buildings": 2,
                "building_typology": "bar",
                "parking": {
                    "stall_w_m": 2.7432,
                    "stall_d_m": 5.4864,
                    "aisle_w_m": 7.3152,
                    "target_ratio": 1.2,
                    "ada_pct": 0.04,
                    "ev_pct": 0.1
                },
                "trial_angles_deg": [0.0, 15.0, 30.0, 45.0]
            }
        }"#
    }

    #[test]
    fn parses_valid_config() {
        let cfg = parse_plan_config(sample_json()).unwrap();
        assert_eq!(cfg.design.num_buildings, 2);
    }

    #[test]
    fn rejects_zero_far() {
        let bad = sample_json().replace("\"max_far\": 2.5", "\"max_far\": 0.0");
        assert!(parse_plan_config(&bad).is_err());
    }

    #[test]
    fn rejects_empty_trial_angles() {
        let bad = sample_json().replace("[0.0, 15.0, 30.0, 45.0]", "[]");
        assert!(parse_plan_config(&bad).is_err());
    }
}
