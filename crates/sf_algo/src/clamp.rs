//! Building clamp: fits a freshly generated footprint inside the
//! buildable envelope via an escalating strategy ladder — accept as-is,
//! translate toward the envelope centroid, shrink, grid-search (finalization
//! only), or fall back to a guaranteed placeholder square — honoring any
//! locked fields the caller marked on the spec.

use sf_core::errors::EngineResult;
use sf_core::geom::{self, Point2, Polygon};
use sf_core::model::{BuildingSpec, BuildingType};
use sf_core::units::{
    CLAMP_FALLBACK_DIM_M, CLAMP_GRID_STEP_M, CLAMP_SHRINK_SCALES, MIN_SHRINK_DIM_M, OVERLAP_TOL_M2,
};

const MAX_TRANSLATE_STEPS: u32 = 6;

/// Outcome of the clamp ladder: the fitted footprint plus the (possibly
/// adjusted) spec used to produce it.
pub struct ClampResult {
    pub footprint: Polygon,
    pub spec: BuildingSpec,
}

/// Fit one building into the envelope alone, ignoring other buildings. Used
/// inside the SA loop, where every iteration reclamps the whole layout and
/// checking every candidate against every neighbour would be too slow to be
/// worth it.
pub fn clamp_into_envelope(spec: &BuildingSpec, envelope: &Polygon) -> EngineResult<ClampResult> {
    clamp(spec, envelope, &[], false)
}

/// Fit one building into the envelope and away from every already-placed
/// neighbour footprint. Run once per building, in placement order, at
/// finalization, so the scene a caller receives has no building overlap
/// left to merely report.
pub fn clamp_into_envelope_full(
    spec: &BuildingSpec,
    envelope: &Polygon,
    placed: &[Polygon],
) -> EngineResult<ClampResult> {
    clamp(spec, envelope, placed, true)
}

fn clamp(spec: &BuildingSpec, envelope: &Polygon, neighbours: &[Polygon], full: bool) -> EngineResult<ClampResult> {
    let working = spec.clone();
    let footprint = crate::footprint::generate_footprint(&working)?;

    if fits(&footprint, envelope, neighbours) {
        return Ok(ClampResult { footprint, spec: working });
    }

    if !spec.locked.position {
        if let Some((fp, adjusted)) = try_translate(&working, envelope, neighbours) {
            return Ok(ClampResult { footprint: fp, spec: adjusted });
        }
    }

    if !spec.locked.dimensions {
        if let Some((fp, adjusted)) = try_shrink(&working, envelope, neighbours) {
            return Ok(ClampResult { footprint: fp, spec: adjusted });
        }
    }

    if full && !spec.locked.position {
        if let Some((fp, adjusted)) = try_grid_search(&working, envelope, neighbours) {
            return Ok(ClampResult { footprint: fp, spec: adjusted });
        }
    }

    Ok(fallback_square(&working, envelope))
}

fn is_contained(footprint: &Polygon, envelope: &Polygon) -> bool {
    let outside = geom::difference_poly(footprint, envelope);
    geom::area_multi(&outside) <= OVERLAP_TOL_M2
}

fn overlaps_any(footprint: &Polygon, neighbours: &[Polygon]) -> bool {
    neighbours
        .iter()
        .any(|n| geom::area_multi(&geom::intersection_poly(footprint, n)) > OVERLAP_TOL_M2)
}

fn fits(footprint: &Polygon, envelope: &Polygon, neighbours: &[Polygon]) -> bool {
    is_contained(footprint, envelope) && !overlaps_any(footprint, neighbours)
}

/// Nudge the footprint's anchor toward the envelope centroid in equal steps,
/// stopping at the first step that achieves containment and neighbour
/// clearance.
fn try_translate(spec: &BuildingSpec, envelope: &Polygon, neighbours: &[Polygon]) -> Option<(Polygon, BuildingSpec)> {
    let target = geom::centroid(envelope)?;
    let start = spec.anchor;
    let dx = target.x - start.x;
    let dy = target.y - start.y;

    for step in 1..=MAX_TRANSLATE_STEPS {
        let t = step as f64 / MAX_TRANSLATE_STEPS as f64;
        let mut candidate = spec.clone();
        candidate.anchor = Point2 { x: start.x + dx * t, y: start.y + dy * t };
        if let Ok(fp) = crate::footprint::generate_footprint(&candidate) {
            if fits(&fp, envelope, neighbours) {
                return Some((fp, candidate));
            }
        }
    }
    None
}

/// Try the shrink ladder `0.9, 0.8, ..., 0.3`, skipping any scale that would
/// push either main dimension below `MIN_SHRINK_DIM_M`.
fn try_shrink(spec: &BuildingSpec, envelope: &Polygon, neighbours: &[Polygon]) -> Option<(Polygon, BuildingSpec)> {
    for &scale in CLAMP_SHRINK_SCALES.iter() {
        let candidate = scaled_spec(spec, scale);
        let (w, d) = candidate.main_dims_m();
        if w < MIN_SHRINK_DIM_M || d < MIN_SHRINK_DIM_M {
            continue;
        }
        if let Ok(fp) = crate::footprint::generate_footprint(&candidate) {
            if fits(&fp, envelope, neighbours) {
                return Some((fp, candidate));
            }
        }
    }
    None
}

/// Systematic grid of candidate anchors over the envelope's bounding box, at
/// the dimensions `spec` already carries (post-shrink, if shrinking ran).
/// Only run at finalization: it is too expensive to repeat every SA
/// iteration.
fn try_grid_search(spec: &BuildingSpec, envelope: &Polygon, neighbours: &[Polygon]) -> Option<(Polygon, BuildingSpec)> {
    let bb = geom::bbox(envelope)?;
    let mut y = bb.min().y;
    while y <= bb.max().y {
        let mut x = bb.min().x;
        while x <= bb.max().x {
            let mut candidate = spec.clone();
            candidate.anchor = Point2 { x, y };
            if let Ok(fp) = crate::footprint::generate_footprint(&candidate) {
                if fits(&fp, envelope, neighbours) {
                    return Some((fp, candidate));
                }
            }
            x += CLAMP_GRID_STEP_M;
        }
        y += CLAMP_GRID_STEP_M;
    }
    None
}

/// Uniformly scale width/depth (and wing/courtyard dims, proportionally),
/// resolving any typology default first so a spec that omitted a dimension
/// still shrinks from the right baseline.
fn scaled_spec(spec: &BuildingSpec, scale: f64) -> BuildingSpec {
    let (w, d) = spec.main_dims_m();
    let (ww, wd) = spec.wing_dims_m();
    let (cw, cd) = spec.courtyard_dims_m();
    let mut s = spec.clone();
    s.width_m = Some(w * scale);
    s.depth_m = Some(d * scale);
    s.wing_width_m = Some(ww * scale);
    s.wing_depth_m = Some(wd * scale);
    s.courtyard_width_m = Some(cw * scale);
    s.courtyard_depth_m = Some(cd * scale);
    s
}

/// A plain `CLAMP_FALLBACK_DIM_M` square at the envelope centroid (or the
/// spec's own anchor if the envelope has none), forced to the `Bar`
/// typology so no wing/courtyard default dimensions sneak back in. Never
/// fails, so the clamp ladder always terminates with a placement.
fn fallback_square(spec: &BuildingSpec, envelope: &Polygon) -> ClampResult {
    let half = CLAMP_FALLBACK_DIM_M * 0.5;
    let center = geom::centroid(envelope).unwrap_or(spec.anchor);

    let mut s = spec.clone();
    s.kind = BuildingType::Bar;
    s.anchor = center;
    s.rotation_rad = 0.0;
    s.width_m = Some(CLAMP_FALLBACK_DIM_M);
    s.depth_m = Some(CLAMP_FALLBACK_DIM_M);
    s.wing_width_m = None;
    s.wing_depth_m = None;
    s.courtyard_width_m = None;
    s.courtyard_depth_m = None;

    let footprint = geom::rect_polygon(
        Point2 { x: center.x - half, y: center.y - half },
        Point2 { x: center.x + half, y: center.y + half },
    );
    ClampResult { footprint, spec: s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::model::{BuildingType, LockedFields};

    fn envelope_square() -> Polygon {
        geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 50.0, y: 50.0 })
    }

    fn bar_spec(anchor: Point2, width: f64, depth: f64) -> BuildingSpec {
        BuildingSpec {
            id: "b1".into(),
            kind: BuildingType::Bar,
            anchor,
            rotation_rad: 0.0,
            width_m: Some(width),
            depth_m: Some(depth),
            floors: 3,
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
    fn already_contained_footprint_is_accepted_unchanged() {
        let envelope = envelope_square();
        let spec = bar_spec(Point2 { x: 25.0, y: 25.0 }, 20.0, 10.0);
        let result = clamp_into_envelope(&spec, &envelope).unwrap();
        assert_eq!(result.spec.anchor, spec.anchor);
        assert!((geom::area(&result.footprint) - 200.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_bounds_footprint_gets_translated_into_envelope() {
        let envelope = envelope_square();
        let spec = bar_spec(Point2 { x: 48.0, y: 48.0 }, 20.0, 10.0);
        let result = clamp_into_envelope(&spec, &envelope).unwrap();
        let outside = geom::difference_poly(&result.footprint, &envelope);
        assert!(geom::area_multi(&outside) <= OVERLAP_TOL_M2);
    }

    #[test]
    fn oversized_building_shrinks_to_fit() {
        let envelope = envelope_square();
        let spec = bar_spec(Point2 { x: 25.0, y: 25.0 }, 80.0, 80.0);
        let result = clamp_into_envelope(&spec, &envelope).unwrap();
        let (w, _) = result.spec.main_dims_m();
        assert!(w < 80.0);
    }

    #[test]
    fn locked_dimensions_and_position_force_fallback_square_when_oversized() {
        let envelope = envelope_square();
        let mut spec = bar_spec(Point2 { x: 25.0, y: 25.0 }, 80.0, 80.0);
        spec.locked = LockedFields { position: true, rotation: false, dimensions: true };
        let result = clamp_into_envelope(&spec, &envelope).unwrap();
        let (w, d) = result.spec.main_dims_m();
        assert_eq!((w, d), (CLAMP_FALLBACK_DIM_M, CLAMP_FALLBACK_DIM_M));
    }

    #[test]
    fn clamp_is_idempotent() {
        let envelope = envelope_square();
        let spec = bar_spec(Point2 { x: 48.0, y: 48.0 }, 30.0, 20.0);
        let once = clamp_into_envelope(&spec, &envelope).unwrap();
        let twice = clamp_into_envelope(&once.spec, &envelope).unwrap();
        assert_eq!(once.spec.anchor, twice.spec.anchor);
        let (w1, d1) = once.spec.main_dims_m();
        let (w2, d2) = twice.spec.main_dims_m();
        assert!((w1 - w2).abs() < 1e-9);
        assert!((d1 - d2).abs() < 1e-9);
        assert!((geom::area(&once.footprint) - geom::area(&twice.footprint)).abs() < 1e-6);
    }

    #[test]
    fn full_mode_pushes_a_building_away_from_an_already_placed_neighbour() {
        let envelope = envelope_square();
        let neighbour = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 30.0, y: 30.0 });
        let spec = bar_spec(Point2 { x: 15.0, y: 15.0 }, 20.0, 20.0);
        let result = clamp_into_envelope_full(&spec, &envelope, &[neighbour.clone()]).unwrap();
        let overlap = geom::area_multi(&geom::intersection_poly(&result.footprint, &neighbour));
        assert!(overlap <= OVERLAP_TOL_M2);
    }

    #[test]
    fn fast_mode_does_not_consult_neighbours() {
        let envelope = envelope_square();
        let neighbour = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 30.0, y: 30.0 });
        let spec = bar_spec(Point2 { x: 15.0, y: 15.0 }, 20.0, 20.0);
        let result = clamp_into_envelope(&spec, &envelope).unwrap();
        assert_eq!(result.spec.anchor, spec.anchor);
        let _ = neighbour;
    }
}
