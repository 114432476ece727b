//! SA optimizer: geometric-cooling simulated annealing over a
//! variable-length vector of `BuildingSpec`s. Scoring has two paths: a cheap
//! "fast" path used for every SA iteration (clamps each building against the
//! envelope alone, and skips greenspace synthesis), and a "full" path run
//! only on the terminal best-of list, which also clamps each building against
//! its already-placed neighbours to resolve overlap, then recomputes
//! containment and the financial yield.

use std::f64::consts::TAU;

use sf_core::errors::EngineResult;
use sf_core::geom::{self, MultiPolygon, Point2, Polygon};
use sf_core::model::{
    BuildingSpec, DesignParams, FeasibilityViolation, LockedFields, Metrics, ParkingSolution,
    ProFormaInputs, ProFormaResult, Road, Severity, ZoningLimits,
};
use sf_core::rng::EngineRng;
use sf_core::units::{sqm_to_sqft, BUILDING_CLEARANCE_M, M2_TO_ACRES};
use sf_algo::FeasibilityInputs;

use crate::cancel::CancellationToken;

const T_START: f64 = 1.0;
const T_END: f64 = 0.01;
const DEFAULT_MAX_ITERATIONS: u64 = 200;
const PROGRESS_INTERVAL: u64 = 50;
const BEST_OF_SIZE: usize = 4;
const BEST_OF_EPSILON: f64 = 0.01;

const DEFAULT_BUILDING_WIDTH_M: f64 = 20.0;
const DEFAULT_BUILDING_DEPTH_M: f64 = 15.0;
const DEFAULT_WING_WIDTH_M: f64 = 8.0;
const DEFAULT_WING_DEPTH_M: f64 = 6.0;
const DEFAULT_COURTYARD_WIDTH_M: f64 = 8.0;
const DEFAULT_COURTYARD_DEPTH_M: f64 = 6.0;

const GROUND_FLOOR_HEIGHT_FT: f64 = 14.0;
const UPPER_FLOOR_HEIGHT_FT: f64 = 10.0;

/// The outcome of one scored layout, carrying everything downstream (scene
/// assembly, metrics) needs.
pub struct LayoutEvaluation {
    pub buildings: Vec<(BuildingSpec, Polygon)>,
    pub parking: ParkingSolution,
    pub far: f64,
    pub coverage_pct: f64,
    pub parking_ratio: f64,
    pub achieved_units: u32,
    pub unit_mix_summary: String,
    pub open_space_pct: f64,
    pub stalls_provided: u32,
    pub stalls_required: u32,
    pub violations: Vec<FeasibilityViolation>,
    pub score: f64,
    pub proforma: Option<ProFormaResult>,
}

/// Result of a full `optimize` run.
pub struct OptimizeOutcome {
    pub best_scene: sf_core::model::Scene,
    pub best_metrics: Metrics,
    pub best_violations: Vec<FeasibilityViolation>,
    pub best_proforma: Option<ProFormaResult>,
    pub top3: Vec<(sf_core::model::Scene, Metrics)>,
    pub iterations: u64,
    pub final_score: f64,
    pub seed_used: u64,
}

/// Result of a single full-scoring `evaluate` call, no optimization.
pub struct EvaluateOutcome {
    pub scene: sf_core::model::Scene,
    pub metrics: Metrics,
    pub violations: Vec<FeasibilityViolation>,
    pub proforma: Option<ProFormaResult>,
    pub score: f64,
}

pub fn run(
    envelope: &Polygon,
    roads: &[Road],
    zoning: &ZoningLimits,
    design: &DesignParams,
    seed: Option<u64>,
    max_iterations: Option<u64>,
    cancel: Option<&CancellationToken>,
    mut on_progress: Option<&mut dyn FnMut(u64, f64)>,
) -> EngineResult<OptimizeOutcome> {
    let max_iter = max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
    let (seed_used, mut rng) = seed_rng(seed);
    log::debug!("optimize: starting run, seed={seed_used} max_iterations={max_iter}");

    let mut current = initial_layout(envelope, design);
    let mut current_score = score_layout(&current, envelope, roads, zoning, design, false).score;

    let mut best_of: Vec<(f64, Vec<BuildingSpec>)> = vec![(current_score, current.clone())];

    let mut cancelled = false;
    let mut iterations_run = 0u64;

    for k in 0..max_iter {
        if cancel.map(|t| t.is_cancelled()).unwrap_or(false) {
            log::debug!("optimize: cancelled at iteration {k}");
            cancelled = true;
            break;
        }
        iterations_run = k + 1;

        let candidate = mutate_layout(&current, envelope, &mut rng, design);
        let candidate_eval = score_layout(&candidate, envelope, roads, zoning, design, false);
        let delta = candidate_eval.score - current_score;
        let t = temperature(k, max_iter);
        let accept = delta > 0.0 || rng.next_f64() < (delta / t).exp();

        if accept {
            current = candidate;
            current_score = candidate_eval.score;
            push_best_of(&mut best_of, current_score, &current);
        }

        if iterations_run % PROGRESS_INTERVAL == 0 {
            if let Some(cb) = on_progress.as_deref_mut() {
                cb(iterations_run, current_score);
            }
        }
    }

    if let Some(cb) = on_progress.as_deref_mut() {
        cb(iterations_run, current_score);
    }

    let mut full_evals: Vec<LayoutEvaluation> = best_of
        .iter()
        .map(|(_, specs)| score_layout(specs, envelope, roads, zoning, design, true))
        .collect();
    full_evals.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    log::debug!("optimize: ran {iterations_run} iterations, best-of-{} full scoring pass", full_evals.len());
    let best_eval = full_evals.remove(0);
    let best_scene = crate::scene::assemble(&best_eval.buildings, &best_eval.parking, envelope);
    let best_violations = best_eval.violations.clone();
    let final_score = best_eval.score;
    let best_proforma = best_eval.proforma.clone();
    let best_metrics = to_metrics(&best_eval, cancelled);

    let top3 = full_evals
        .into_iter()
        .map(|e| {
            let scene = crate::scene::assemble(&e.buildings, &e.parking, envelope);
            let metrics = to_metrics(&e, false);
            (scene, metrics)
        })
        .collect();

    Ok(OptimizeOutcome {
        best_scene,
        best_metrics,
        best_violations,
        best_proforma,
        top3,
        iterations: iterations_run,
        final_score,
        seed_used,
    })
}

/// A single full-scoring evaluation with no SA search (`evaluate`).
pub fn evaluate(
    envelope: &Polygon,
    roads: &[Road],
    buildings: &[BuildingSpec],
    zoning: &ZoningLimits,
    design: &DesignParams,
) -> EngineResult<EvaluateOutcome> {
    let eval = score_layout(buildings, envelope, roads, zoning, design, true);
    let scene = crate::scene::assemble(&eval.buildings, &eval.parking, envelope);
    let score = eval.score;
    let metrics = to_metrics(&eval, false);
    Ok(EvaluateOutcome { scene, metrics, violations: eval.violations.clone(), proforma: eval.proforma, score })
}

fn seed_rng(seed: Option<u64>) -> (u64, EngineRng) {
    match seed {
        Some(s) => (s, EngineRng::from_seed_u64(s)),
        None => {
            // No seed given: draw one from outside the pure engine so the
            // run is reproducible from the value we report back.
            use rand_core::RngCore;
            let drawn = rand_core::OsRng.next_u64();
            (drawn, EngineRng::from_seed_u64(drawn))
        }
    }
}

fn temperature(k: u64, max_iter: u64) -> f64 {
    let frac = if max_iter == 0 { 1.0 } else { k as f64 / max_iter as f64 };
    T_START * (T_END / T_START).powf(frac)
}

fn push_best_of(list: &mut Vec<(f64, Vec<BuildingSpec>)>, score: f64, layout: &[BuildingSpec]) {
    if list.iter().any(|(s, _)| (s - score).abs() < BEST_OF_EPSILON) {
        return;
    }
    list.push((score, layout.to_vec()));
    list.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    list.truncate(BEST_OF_SIZE);
}

/// Place `design.num_buildings` buildings along the envelope's longest edge,
/// offset inward by the edge normal.
fn initial_layout(envelope: &Polygon, design: &DesignParams) -> Vec<BuildingSpec> {
    let n = design.num_buildings.max(1) as usize;
    let ext = envelope.exterior();
    let pts = ext.0.as_slice();

    let mut edge = (pts[0], *pts.get(1).unwrap_or(&pts[0]));
    let mut best_len = 0.0;
    for w in pts.windows(2) {
        let len = ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt();
        if len > best_len {
            best_len = len;
            edge = (w[0], w[1]);
        }
    }

    let (a, b) = edge;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let edge_len = (dx * dx + dy * dy).sqrt().max(1e-6);
    let (ux, uy) = (dx / edge_len, dy / edge_len);

    let ccw = geom::is_ccw(ext);
    let (mut nx, mut ny) = (-uy, ux);
    if !ccw {
        nx = -nx;
        ny = -ny;
    }
    let inward = (edge_len * 0.1).min(20.0);

    let site_area_m2 = geom::area(envelope);
    let footprint_area = DEFAULT_BUILDING_WIDTH_M * DEFAULT_BUILDING_DEPTH_M;
    let target_gfa_m2 = design.target_far * site_area_m2 / n as f64;
    let floors = ((target_gfa_m2 / footprint_area).round() as u32).max(1);

    (1..=n)
        .map(|i| {
            let t = i as f64 / (n as f64 + 1.0);
            let base = Point2 { x: a.x + ux * edge_len * t, y: a.y + uy * edge_len * t };
            let anchor = Point2 { x: base.x + nx * inward, y: base.y + ny * inward };
            new_building(format!("b{i}"), anchor, design.building_typology, floors)
        })
        .collect()
}

fn new_building(id: String, anchor: Point2, kind: sf_core::model::BuildingType, floors: u32) -> BuildingSpec {
    BuildingSpec {
        id,
        kind,
        anchor,
        rotation_rad: 0.0,
        width_m: Some(DEFAULT_BUILDING_WIDTH_M),
        depth_m: Some(DEFAULT_BUILDING_DEPTH_M),
        floors,
        wing_width_m: Some(DEFAULT_WING_WIDTH_M),
        wing_depth_m: Some(DEFAULT_WING_DEPTH_M),
        courtyard_width_m: Some(DEFAULT_COURTYARD_WIDTH_M),
        courtyard_depth_m: Some(DEFAULT_COURTYARD_DEPTH_M),
        podium_floors: None,
        unit_mix: None,
        locked: LockedFields::default(),
    }
}

/// Apply one of the five mutation kinds, selected by a single uniform
/// draw. Locked fields are inviolate: a mutation targeting one is a no-op.
fn mutate_layout(buildings: &[BuildingSpec], envelope: &Polygon, rng: &mut EngineRng, design: &DesignParams) -> Vec<BuildingSpec> {
    let mut out = buildings.to_vec();
    if out.is_empty() {
        return out;
    }
    let r = rng.next_f64();

    if r < 0.35 {
        move_one(&mut out, rng);
    } else if r < 0.60 {
        resize_one(&mut out, rng);
    } else if r < 0.80 {
        rotate_one(&mut out, rng);
    } else if r < 0.90 && out.len() < design.num_buildings.max(1) as usize {
        add_one(&mut out, envelope, rng, design);
    } else if r >= 0.90 && out.len() > 1 {
        let idx = rng.index(out.len());
        out.remove(idx);
    } else {
        move_one(&mut out, rng);
    }
    out
}

fn move_one(buildings: &mut [BuildingSpec], rng: &mut EngineRng) {
    let idx = rng.index(buildings.len());
    if buildings[idx].locked.position {
        return;
    }
    let angle = rng.uniform(0.0, TAU);
    let dist = rng.uniform(5.0, 20.0);
    buildings[idx].anchor.x += dist * angle.cos();
    buildings[idx].anchor.y += dist * angle.sin();
}

fn resize_one(buildings: &mut [BuildingSpec], rng: &mut EngineRng) {
    let idx = rng.index(buildings.len());
    if buildings[idx].locked.dimensions {
        return;
    }
    let (w, d) = buildings[idx].main_dims_m();
    buildings[idx].width_m = Some((w + rng.uniform(-10.0, 10.0)).max(5.0));
    buildings[idx].depth_m = Some((d + rng.uniform(-10.0, 10.0)).max(5.0));
}

fn rotate_one(buildings: &mut [BuildingSpec], rng: &mut EngineRng) {
    let idx = rng.index(buildings.len());
    if buildings[idx].locked.rotation {
        return;
    }
    let delta = rng.uniform(-std::f64::consts::FRAC_PI_6, std::f64::consts::FRAC_PI_6);
    buildings[idx].rotation_rad += delta;
}

fn add_one(buildings: &mut Vec<BuildingSpec>, envelope: &Polygon, rng: &mut EngineRng, design: &DesignParams) {
    let centre = geom::centroid(envelope).unwrap_or(Point2 { x: 0.0, y: 0.0 });
    let dx = rng.uniform(-20.0, 20.0);
    let dy = rng.uniform(-20.0, 20.0);
    let anchor = Point2 { x: centre.x + dx, y: centre.y + dy };
    let floors = buildings.first().map(|b| b.footprint_floors()).unwrap_or(1);
    let id = format!("gen-{}", rng.ticket());
    buildings.push(new_building(id, anchor, design.building_typology, floors));
}

/// Score a candidate layout. `full` selects the expensive path: real
/// pairwise overlap/containment and the financial yield-on-cost score in
/// place of the cheap yield proxy.
fn score_layout(
    specs: &[BuildingSpec],
    envelope: &Polygon,
    roads: &[Road],
    zoning: &ZoningLimits,
    design: &DesignParams,
    full: bool,
) -> LayoutEvaluation {
    let site_area_m2 = geom::area(envelope);
    let site_sqft = sqm_to_sqft(site_area_m2);

    // Inside the SA loop every candidate is clamped against the envelope
    // alone; only the terminal full pass also clamps each building against
    // its already-placed neighbours, so the emitted scene has no overlap
    // left for `pairwise_overlap` below to merely report.
    let mut buildings: Vec<(BuildingSpec, Polygon)> = Vec::new();
    for spec in specs {
        let clamped = if full {
            let placed: Vec<Polygon> = buildings.iter().map(|(_, fp)| fp.clone()).collect();
            sf_algo::clamp_into_envelope_full(spec, envelope, &placed)
        } else {
            sf_algo::clamp_into_envelope(spec, envelope)
        };
        if let Ok(clamped) = clamped {
            buildings.push((clamped.spec, clamped.footprint));
        }
    }

    let total_floor_area_m2: f64 = buildings.iter().map(|(s, fp)| geom::area(fp) * s.footprint_floors() as f64).sum();
    let footprint_area_m2: f64 = buildings.iter().map(|(_, fp)| geom::area(fp)).sum();
    let far = if site_area_m2 > 0.0 { total_floor_area_m2 / site_area_m2 } else { 0.0 };
    let coverage_pct = if site_area_m2 > 0.0 { footprint_area_m2 / site_area_m2 * 100.0 } else { 0.0 };

    let pf_summary = sf_algo::compute_proforma(&buildings);
    let achieved_units = pf_summary.achieved_units;

    // Subtract each building's clearance rectangle (bounding box expanded by
    // a fixed margin), not the bare footprint, so parking never packs a stall
    // flush against a wall.
    let clearance_rects: Vec<Polygon> = buildings
        .iter()
        .filter_map(|(_, fp)| geom::bbox(fp))
        .map(|bb| {
            geom::rect_polygon(
                Point2 { x: bb.min().x - BUILDING_CLEARANCE_M, y: bb.min().y - BUILDING_CLEARANCE_M },
                Point2 { x: bb.max().x + BUILDING_CLEARANCE_M, y: bb.max().y + BUILDING_CLEARANCE_M },
            )
        })
        .collect();
    let clearance_mp = MultiPolygon::new(clearance_rects);
    let leftover = geom::difference(&MultiPolygon::new(vec![envelope.clone()]), &clearance_mp);
    let available = geom::normalize_to_polygon(&leftover).unwrap_or_else(|| envelope.clone());

    let required_stalls_f = achieved_units as f64 * design.parking.target_ratio;
    let max_stalls = (required_stalls_f * 1.1).ceil().max(0.0) as u32;
    let mut parking = sf_algo::solve_parking(&available, roads, &design.parking, &design.trial_angles_deg);
    let stalls_provided = parking.stalls_achieved.min(max_stalls);
    parking.stalls_achieved = stalls_provided;

    let parking_ratio = if required_stalls_f > 0.0 { stalls_provided as f64 / required_stalls_f } else { 1.0 };

    let height_ft = buildings
        .iter()
        .map(|(s, _)| GROUND_FLOOR_HEIGHT_FT + s.footprint_floors().saturating_sub(1) as f64 * UPPER_FLOOR_HEIGHT_FT)
        .fold(0.0_f64, f64::max);
    let height_ft_opt = if buildings.is_empty() { None } else { Some(height_ft) };

    let density_du_per_acre = if site_area_m2 > 0.0 { achieved_units as f64 / (site_area_m2 * M2_TO_ACRES) } else { 0.0 };

    let parking_area_m2: f64 = parking.bays.iter().map(geom::area).sum::<f64>()
        + parking.aisles.iter().map(geom::area).sum::<f64>()
        + parking.circulation.iter().map(geom::area).sum::<f64>();
    let impervious_pct = if site_area_m2 > 0.0 { (footprint_area_m2 + parking_area_m2) / site_area_m2 * 100.0 } else { 0.0 };
    let open_space_pct = 100.0 - impervious_pct;

    let (building_overlap_m2, buildings_outside_envelope_m2) = if full {
        (pairwise_overlap(&buildings), outside_envelope(&buildings, envelope))
    } else {
        (0.0, 0.0)
    };

    let inputs = FeasibilityInputs {
        far,
        coverage_pct,
        parking_ratio,
        height_ft: height_ft_opt,
        density_du_per_acre: Some(density_du_per_acre),
        impervious_pct: Some(impervious_pct),
        open_space_pct: Some(open_space_pct),
        building_overlap_m2,
        buildings_outside_envelope_m2,
    };
    let violations = sf_algo::evaluate_feasibility(&inputs, zoning);

    let max_reasonable_units = ((site_sqft * 3.0 * 0.85 / 720.0).floor()).max(1.0);
    let unit_count_score = (achieved_units as f64 / max_reasonable_units).min(1.0);

    let parking_score = if required_stalls_f <= 0.0 {
        1.0
    } else {
        let r = stalls_provided as f64 / required_stalls_f;
        if r >= 1.0 {
            1.0
        } else if r >= 0.5 {
            (r - 0.5) / 0.5
        } else {
            0.0
        }
    };

    let far_score = if far > zoning.max_far { 0.0 } else { far / zoning.max_far };

    let coverage_score = if coverage_pct <= zoning.max_coverage_pct {
        1.0
    } else {
        (1.0 - (coverage_pct - zoning.max_coverage_pct) / zoning.max_coverage_pct).max(0.0)
    };

    let open_fraction = (open_space_pct / 100.0).max(0.0);
    let open_score = (2.0 * open_fraction).min(1.0);

    let no_violations_score = if sf_algo::is_compliant(&violations) { 1.0 } else { 0.0 };

    let (yield_score, proforma) = if full {
        let unit_mix = sf_algo::proforma::derive_unit_mix(&buildings);
        let surface_stalls = (stalls_provided as f64 * (1.0 - design.structured_parking_pct)).round() as u32;
        let structured_stalls = stalls_provided.saturating_sub(surface_stalls);
        let pf_inputs = ProFormaInputs {
            total_gfa_sqft: sqm_to_sqft(total_floor_area_m2),
            site_area_sqft: site_sqft,
            unit_mix,
            surface_stalls,
            structured_stalls,
            land_cost: design.land_cost,
            construction_type: design.construction_type,
            market_overrides: design.market_overrides,
        };
        let pf = sf_algo::evaluate_proforma(&pf_inputs);
        ((pf.yield_on_cost / 0.08).clamp(0.0, 1.0), Some(pf))
    } else {
        (0.5 * far_score + 0.5 * unit_count_score, None)
    };

    let score = 0.25 * unit_count_score
        + 0.20 * parking_score
        + 0.15 * far_score
        + 0.10 * coverage_score
        + 0.05 * open_score
        + 0.15 * no_violations_score
        + 0.10 * yield_score;

    LayoutEvaluation {
        buildings,
        parking,
        far,
        coverage_pct,
        parking_ratio,
        achieved_units,
        unit_mix_summary: pf_summary.unit_mix_summary,
        open_space_pct,
        stalls_provided,
        stalls_required: required_stalls_f.ceil() as u32,
        violations,
        score,
        proforma,
    }
}

fn pairwise_overlap(buildings: &[(BuildingSpec, Polygon)]) -> f64 {
    let mut total = 0.0;
    for i in 0..buildings.len() {
        for j in (i + 1)..buildings.len() {
            let inter = geom::intersection_poly(&buildings[i].1, &buildings[j].1);
            total += geom::area_multi(&inter);
        }
    }
    total
}

fn outside_envelope(buildings: &[(BuildingSpec, Polygon)], envelope: &Polygon) -> f64 {
    buildings.iter().map(|(_, fp)| geom::area_multi(&geom::difference_poly(fp, envelope))).sum()
}

fn to_metrics(eval: &LayoutEvaluation, cancelled: bool) -> Metrics {
    Metrics {
        far: eval.far,
        coverage_pct: eval.coverage_pct,
        parking_ratio: eval.parking_ratio,
        achieved_units: eval.achieved_units,
        unit_mix_summary: eval.unit_mix_summary.clone(),
        open_space_pct: eval.open_space_pct,
        parking_angle_deg: eval.parking.chosen_angle_deg,
        stalls_provided: eval.stalls_provided,
        stalls_required: eval.stalls_required,
        zoning_compliant: sf_algo::is_compliant(&eval.violations),
        violations: eval.violations.iter().filter(|v| v.severity == Severity::Error).cloned().collect(),
        warnings: eval.violations.iter().filter(|v| v.severity == Severity::Warning).cloned().collect(),
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::geom::rect_polygon;
    use sf_core::model::{BuildingType, ParkingSpec};

    fn envelope() -> Polygon {
        rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 100.0, y: 100.0 })
    }

    fn zoning() -> ZoningLimits {
        ZoningLimits {
            max_far: 3.0,
            max_coverage_pct: 60.0,
            min_parking_ratio: 0.5,
            max_height_ft: None,
            max_density_du_per_acre: None,
            max_impervious_pct: None,
            min_open_space_pct: None,
            front_setback_ft: 20.0,
            side_setback_ft: 10.0,
            rear_setback_ft: 15.0,
        }
    }

    fn design() -> DesignParams {
        DesignParams {
            target_far: 1.0,
            target_coverage_pct: 30.0,
            num_buildings: 1,
            building_typology: BuildingType::Bar,
            parking: ParkingSpec { stall_w_m: 2.7432, stall_d_m: 5.4864, aisle_w_m: 7.3152, target_ratio: 1.0, ada_pct: 0.04, ev_pct: 0.1 },
            trial_angles_deg: vec![0.0, 90.0],
            land_cost: 0.0,
            construction_type: sf_core::model::ConstructionType::WoodFrame,
            structured_parking_pct: 0.0,
            market_overrides: sf_core::model::MarketOverrides::default(),
        }
    }

    #[test]
    fn initial_layout_places_requested_building_count() {
        let layout = initial_layout(&envelope(), &design());
        assert_eq!(layout.len(), 1);
        assert!(geom::point_in_polygon(layout[0].anchor, &envelope()));
    }

    #[test]
    fn run_reports_the_seed_it_used() {
        let outcome = run(&envelope(), &[], &zoning(), &design(), Some(7), Some(20), None, None).unwrap();
        assert_eq!(outcome.seed_used, 7);
    }

    #[test]
    fn same_seed_gives_identical_final_score() {
        let a = run(&envelope(), &[], &zoning(), &design(), Some(123), Some(30), None, None).unwrap();
        let b = run(&envelope(), &[], &zoning(), &design(), Some(123), Some(30), None, None).unwrap();
        assert_eq!(a.final_score, b.final_score);
        assert_eq!(a.best_metrics.achieved_units, b.best_metrics.achieved_units);
    }

    #[test]
    fn cancellation_is_reflected_in_metrics() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = run(&envelope(), &[], &zoning(), &design(), Some(1), Some(50), Some(&token), None).unwrap();
        assert!(outcome.best_metrics.cancelled);
    }

    #[test]
    fn parking_angle_is_one_of_the_trial_angles() {
        let outcome = run(&envelope(), &[], &zoning(), &design(), Some(5), Some(20), None, None).unwrap();
        assert!(design().trial_angles_deg.contains(&outcome.best_metrics.parking_angle_deg));
    }
}
