//! Pro-forma: turns building footprints and floor counts into an achieved
//! unit count, a human-readable unit mix summary, and a revenue estimate
//! (`compute`, the SA scoring fast path), plus the full financial model
//! (`evaluate`) used for the best-of-4 full score and the standalone
//! `proForma` entry point.

use sf_core::geom::{self, Polygon};
use sf_core::model::{
    BuildingSpec, ConstructionType, ProFormaInputs, ProFormaResult, UnitType,
    CONSTRUCTION_COST_PER_SQFT, DEFAULT_AVG_UNIT_SQFT, DEFAULT_LEASABLE_FRACTION, DEFAULT_MIX_SHARES,
    DEFAULT_RENT_PER_SQFT_MONTH,
};
use sf_core::units::sqm_to_sqft;

const DEFAULT_VACANCY_RATE: f64 = 0.05;
const DEFAULT_OPEX_RATIO: f64 = 0.35;
const SITE_WORK_PER_SQFT: f64 = 15.0;
const SURFACE_STALL_COST: f64 = 5_000.0;
const STRUCTURED_STALL_COST: f64 = 25_000.0;
const SOFT_COST_RATIO: f64 = 0.20;
const CONTINGENCY_RATIO: f64 = 0.05;
const DEFAULT_INTEREST_RATE: f64 = 0.06;
const DEFAULT_FINANCING_MONTHS: f64 = 18.0;
const DEFAULT_CAP_RATE: f64 = 0.055;
const DEFAULT_EQUITY_PCT: f64 = 0.35;

/// Ratio `num / den`, or `0.0` when `den` is zero.
fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Default achieved-unit count when a building has no explicit unit mix:
/// leasable area (85% of GFA) divided by an average 720 sqft unit, floored,
/// never below one unit for any building with positive GFA.
fn default_unit_count(gfa_sqft: f64) -> u32 {
    let leasable_sqft = gfa_sqft * DEFAULT_LEASABLE_FRACTION;
    ((leasable_sqft / DEFAULT_AVG_UNIT_SQFT).floor() as u32).max(1)
}

fn construction_cost_per_sqft(kind: ConstructionType) -> f64 {
    CONSTRUCTION_COST_PER_SQFT
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, cost)| *cost)
        .unwrap_or(165.0)
}

/// Full financial pro-forma: revenue, development cost, and return
/// metrics from GFA, unit mix, parking counts, and land cost.
pub fn evaluate(inputs: &ProFormaInputs) -> ProFormaResult {
    let m = &inputs.market_overrides;
    let vacancy_rate = m.vacancy_rate.unwrap_or(DEFAULT_VACANCY_RATE);
    let opex_ratio = m.opex_ratio.unwrap_or(DEFAULT_OPEX_RATIO);
    let interest_rate = m.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE);
    let months = m.financing_months.unwrap_or(DEFAULT_FINANCING_MONTHS);
    let cap_rate = m.cap_rate.unwrap_or(DEFAULT_CAP_RATE);
    let equity_pct = m.equity_pct.unwrap_or(DEFAULT_EQUITY_PCT);

    let gross_potential_rent: f64 = inputs
        .unit_mix
        .iter()
        .map(|u| u.count as f64 * u.rent_per_month * 12.0)
        .sum();
    let vacancy_loss = gross_potential_rent * vacancy_rate;
    let effective_gross_income = gross_potential_rent - vacancy_loss;
    let opex = effective_gross_income * opex_ratio;
    let noi = effective_gross_income - opex;

    let hard_cost = inputs.total_gfa_sqft * construction_cost_per_sqft(inputs.construction_type)
        + inputs.site_area_sqft * SITE_WORK_PER_SQFT
        + inputs.surface_stalls as f64 * SURFACE_STALL_COST
        + inputs.structured_stalls as f64 * STRUCTURED_STALL_COST;
    let soft_cost = hard_cost * SOFT_COST_RATIO;
    let contingency = (hard_cost + soft_cost) * CONTINGENCY_RATIO;
    let financing = (hard_cost + soft_cost + contingency) * interest_rate * (months / 12.0);
    let total_development_cost = inputs.land_cost + hard_cost + soft_cost + contingency + financing;

    let total_units: u32 = inputs.unit_mix.iter().map(|u| u.count).sum();
    let stabilized_value = safe_div(noi, cap_rate);
    let equity = total_development_cost * equity_pct;

    ProFormaResult {
        gross_potential_rent,
        vacancy_loss,
        effective_gross_income,
        opex,
        noi,
        total_development_cost,
        cost_per_unit: safe_div(total_development_cost, total_units as f64),
        cost_per_sf: safe_div(total_development_cost, inputs.total_gfa_sqft),
        yield_on_cost: safe_div(noi, total_development_cost),
        stabilized_value,
        profit: stabilized_value - total_development_cost,
        equity_multiple: safe_div(stabilized_value, equity),
        cash_on_cash: safe_div(noi, equity),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProFormaSummary {
    pub achieved_units: u32,
    pub unit_mix_summary: String,
    pub total_leasable_sqft: f64,
    pub est_monthly_revenue: f64,
}

/// Compute the pro-forma summary across every building in the layout, given
/// each building's placed footprint (for GFA).
pub fn compute(buildings: &[(BuildingSpec, Polygon)]) -> ProFormaSummary {
    let mut total_units = 0u32;
    let mut total_leasable_sqft = 0.0;
    let mut total_revenue = 0.0;
    let mut counts_by_type: [u32; 4] = [0; 4];

    for (spec, footprint) in buildings {
        let gfa_sqft = sqm_to_sqft(geom::area(footprint)) * spec.footprint_floors() as f64;

        match &spec.unit_mix {
            Some(mix) => {
                for entry in mix {
                    total_units += entry.count;
                    total_leasable_sqft += entry.avg_sqft * entry.count as f64;
                    total_revenue += entry.rent_per_month * entry.count as f64;
                    counts_by_type[unit_type_index(entry.kind)] += entry.count;
                }
            }
            None => {
                let leasable_sqft = gfa_sqft * DEFAULT_LEASABLE_FRACTION;
                let units = default_unit_count(gfa_sqft);
                total_units += units;
                total_leasable_sqft += leasable_sqft;
                total_revenue += leasable_sqft * DEFAULT_RENT_PER_SQFT_MONTH;

                let mut remaining = units;
                for (i, (kind, share)) in DEFAULT_MIX_SHARES.iter().enumerate() {
                    let is_last = i == DEFAULT_MIX_SHARES.len() - 1;
                    let n = if is_last { remaining } else { ((units as f64) * share).round() as u32 };
                    let n = n.min(remaining);
                    counts_by_type[unit_type_index(*kind)] += n;
                    remaining -= n;
                }
            }
        }
    }

    ProFormaSummary {
        achieved_units: total_units,
        unit_mix_summary: format_mix_summary(&counts_by_type),
        total_leasable_sqft,
        est_monthly_revenue: total_revenue,
    }
}

/// Flatten every building's unit mix into one list of entries (explicit mix
/// wins per building; otherwise the default-mix derivation applies), for
/// callers that need entry-level detail rather than the summary `compute`
/// returns — the full pro-forma (`evaluate`) needs real rent figures per
/// entry, not just a count.
pub fn derive_unit_mix(buildings: &[(BuildingSpec, Polygon)]) -> Vec<sf_core::model::UnitMixEntry> {
    use sf_core::model::UnitMixEntry;

    let mut merged = Vec::new();
    for (spec, footprint) in buildings {
        match &spec.unit_mix {
            Some(mix) => merged.extend(mix.iter().cloned()),
            None => {
                let gfa_sqft = sqm_to_sqft(geom::area(footprint)) * spec.footprint_floors() as f64;
                let units = default_unit_count(gfa_sqft);
                let mut remaining = units;
                for (i, (kind, share)) in DEFAULT_MIX_SHARES.iter().enumerate() {
                    let is_last = i == DEFAULT_MIX_SHARES.len() - 1;
                    let n = if is_last { remaining } else { ((units as f64) * share).round() as u32 };
                    let n = n.min(remaining);
                    if n > 0 {
                        merged.push(UnitMixEntry {
                            kind: *kind,
                            count: n,
                            avg_sqft: DEFAULT_AVG_UNIT_SQFT,
                            rent_per_month: DEFAULT_AVG_UNIT_SQFT * DEFAULT_RENT_PER_SQFT_MONTH,
                        });
                    }
                    remaining -= n;
                }
            }
        }
    }
    merged
}

fn unit_type_index(kind: UnitType) -> usize {
    match kind {
        UnitType::Studio => 0,
        UnitType::OneBr => 1,
        UnitType::TwoBr => 2,
        UnitType::ThreeBr => 3,
    }
}

fn format_mix_summary(counts: &[u32; 4]) -> String {
    format!(
        "studio:{} 1br:{} 2br:{} 3br:{}",
        counts[0], counts[1], counts[2], counts[3]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::geom::{rect_polygon, Point2};
    use sf_core::model::{BuildingType, LockedFields, UnitMixEntry};

    fn bar_spec(floors: u32) -> BuildingSpec {
        BuildingSpec {
            id: "b1".into(),
            kind: BuildingType::Bar,
            anchor: Point2 { x: 0.0, y: 0.0 },
            rotation_rad: 0.0,
            width_m: Some(20.0),
            depth_m: Some(15.0),
            floors,
            wing_width_m: None,
            wing_depth_m: None,
            courtyard_width_m: None,
            courtyard_depth_m: None,
            podium_floors: None,
            unit_mix: None,
            locked: LockedFields::default(),
        }
    }

    #[test]
    fn more_floors_yields_more_units() {
        let footprint = rect_polygon(Point2 { x: -10.0, y: -7.5 }, Point2 { x: 10.0, y: 7.5 });
        let low = compute(&[(bar_spec(2), footprint.clone())]);
        let high = compute(&[(bar_spec(8), footprint)]);
        assert!(high.achieved_units > low.achieved_units);
    }

    #[test]
    fn explicit_unit_mix_is_used_verbatim() {
        let mut spec = bar_spec(4);
        spec.unit_mix = Some(vec![
            UnitMixEntry { kind: UnitType::OneBr, count: 10, avg_sqft: 700.0, rent_per_month: 1800.0 },
            UnitMixEntry { kind: UnitType::TwoBr, count: 5, avg_sqft: 950.0, rent_per_month: 2400.0 },
        ]);
        let footprint = rect_polygon(Point2 { x: -10.0, y: -7.5 }, Point2 { x: 10.0, y: 7.5 });
        let summary = compute(&[(spec, footprint)]);
        assert_eq!(summary.achieved_units, 15);
        assert_eq!(summary.est_monthly_revenue, 10.0 * 1800.0 + 5.0 * 2400.0);
    }

    #[test]
    fn default_mix_sums_to_total_units() {
        let footprint = rect_polygon(Point2 { x: -25.0, y: -20.0 }, Point2 { x: 25.0, y: 20.0 });
        let summary = compute(&[(bar_spec(6), footprint)]);
        let parts: u32 = summary
            .unit_mix_summary
            .split_whitespace()
            .filter_map(|tok| tok.rsplit(':').next())
            .filter_map(|n| n.parse::<u32>().ok())
            .sum();
        assert_eq!(parts, summary.achieved_units);
    }

    fn sample_inputs() -> ProFormaInputs {
        // 50,000 sqft GFA, default mix derived via the fallback formula
        // (max(1, floor(50000*0.85/720)) = 59 units), 100 surface stalls,
        // no structured stalls, no land cost.
        let units = ((50_000.0 * DEFAULT_LEASABLE_FRACTION / DEFAULT_AVG_UNIT_SQFT).floor() as u32).max(1);
        let avg_rent = DEFAULT_AVG_UNIT_SQFT * DEFAULT_RENT_PER_SQFT_MONTH;
        ProFormaInputs {
            total_gfa_sqft: 50_000.0,
            site_area_sqft: 50_000.0,
            unit_mix: vec![UnitMixEntry {
                kind: UnitType::OneBr,
                count: units,
                avg_sqft: DEFAULT_AVG_UNIT_SQFT,
                rent_per_month: avg_rent,
            }],
            surface_stalls: 100,
            structured_stalls: 0,
            land_cost: 0.0,
            construction_type: ConstructionType::WoodFrame,
            market_overrides: sf_core::model::MarketOverrides::default(),
        }
    }

    #[test]
    fn full_proforma_matches_sanity_bounds() {
        let result = evaluate(&sample_inputs());
        assert!(result.noi > 0.0);
        assert!(result.total_development_cost > result.noi);
        assert!(result.yield_on_cost > 0.0 && result.yield_on_cost < 0.2);
        let expected_stabilized = result.noi / 0.055;
        assert!((result.stabilized_value - expected_stabilized).abs() / expected_stabilized < 0.01);
    }

    #[test]
    fn derive_unit_mix_total_matches_compute_summary() {
        let footprint = rect_polygon(Point2 { x: -25.0, y: -20.0 }, Point2 { x: 25.0, y: 20.0 });
        let buildings = vec![(bar_spec(6), footprint)];
        let summary = compute(&buildings);
        let mix = derive_unit_mix(&buildings);
        let total: u32 = mix.iter().map(|e| e.count).sum();
        assert_eq!(total, summary.achieved_units);
    }

    #[test]
    fn zero_denominators_yield_zero_ratios_not_nan() {
        let mut inputs = sample_inputs();
        inputs.unit_mix.clear();
        inputs.total_gfa_sqft = 0.0;
        let result = evaluate(&inputs);
        assert_eq!(result.cost_per_unit, 0.0);
        assert_eq!(result.cost_per_sf, 0.0);
        assert_eq!(result.yield_on_cost, 0.0);
    }
}
