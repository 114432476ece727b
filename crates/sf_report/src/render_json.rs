//! JSON renderer. Field order is fixed by `ReportModel`'s declaration order
//! (serde's struct-derive emits fields in that order regardless of map
//! insertion semantics), so two runs over the same inputs produce
//! byte-identical JSON.

#![cfg(feature = "render_json")]

use crate::{ReportError, ReportModel};

pub fn render_json(model: &ReportModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|_| ReportError::Serialize("report_model"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoverSection, FeasibilitySection, IntegritySection, LayoutSection, SceneSection};

    fn model() -> ReportModel {
        ReportModel {
            cover: CoverSection {
                title: "Site Plan Report".into(),
                zoning_compliant: true,
                final_score_1dp: "0.8".into(),
            },
            layout: LayoutSection {
                far: 1.5,
                coverage_pct_1dp: "40.0".into(),
                parking_ratio: 1.0,
                achieved_units: 50,
                unit_mix_summary: "mix".into(),
                open_space_pct_1dp: "20.0".into(),
                parking_angle_deg: 60.0,
                stalls_provided: 50,
                stalls_required: 48,
            },
            feasibility: FeasibilitySection { compliant: true, violations: vec![], warnings: vec![] },
            proforma: None,
            scene: SceneSection { element_counts: vec![], total_area_sq_ft: 0.0 },
            integrity: IntegritySection {
                engine_vendor: "sf-engine".into(),
                engine_name: "sf".into(),
                engine_version: "0.1.0".into(),
                seed_used: 7,
                iterations: 100,
            },
        }
    }

    #[test]
    fn cover_precedes_layout_in_the_serialized_output() {
        let json = render_json(&model()).unwrap();
        assert!(json.find("\"cover\"").unwrap() < json.find("\"layout\"").unwrap());
    }
}
