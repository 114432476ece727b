//! Building footprint generator: turns a `BuildingSpec` into a
//! ground-floor polygon for one of five typologies. Shapes are built
//! axis-aligned and centered at the origin, then rotated and translated to
//! the spec's anchor — keeps the per-typology geometry code free of
//! trigonometry.

use geo::{Rotate, Translate};

use sf_core::errors::{EngineError, EngineResult};
use sf_core::geom::{self, Point2, Polygon};
use sf_core::model::{BuildingSpec, BuildingType};

/// Generate the ground-floor footprint for a building spec, already placed
/// at its anchor and rotation. Any dimension the spec omits falls back to
/// its typology's default (see `BuildingSpec::main_dims_m` and friends).
pub fn generate_footprint(spec: &BuildingSpec) -> EngineResult<Polygon> {
    let (width_m, depth_m) = spec.main_dims_m();
    if width_m <= 0.0 || depth_m <= 0.0 {
        return Err(EngineError::Invalid("building width/depth must be positive".into()));
    }

    let at_origin = match spec.kind {
        BuildingType::Bar | BuildingType::Podium => bar(width_m, depth_m),
        BuildingType::LShape => l_shape(spec, width_m, depth_m)?,
        BuildingType::UShape => u_shape(spec, width_m, depth_m)?,
        BuildingType::CourtyardWrap => courtyard_wrap(spec, width_m, depth_m)?,
    };

    Ok(place(at_origin, spec.rotation_rad, spec.anchor))
}

fn bar(width_m: f64, depth_m: f64) -> Polygon {
    let (hw, hd) = (width_m * 0.5, depth_m * 0.5);
    geom::rect_polygon(Point2 { x: -hw, y: -hd }, Point2 { x: hw, y: hd })
}

fn wing_dims(spec: &BuildingSpec) -> EngineResult<(f64, f64)> {
    let (w, d) = spec.wing_dims_m();
    if w <= 0.0 || d <= 0.0 {
        return Err(EngineError::Invalid("wing dimensions must be positive".into()));
    }
    Ok((w, d))
}

/// Main bar plus a perpendicular wing along the building's south-west corner.
fn l_shape(spec: &BuildingSpec, width_m: f64, depth_m: f64) -> EngineResult<Polygon> {
    let (ww, wd) = wing_dims(spec)?;
    let main = bar(width_m, depth_m);
    let (hw, hd) = (width_m * 0.5, depth_m * 0.5);
    // Wing extends further south from the main bar's south-west corner.
    let wing = geom::rect_polygon(
        Point2 { x: -hw, y: -hd - wd },
        Point2 { x: -hw + ww, y: -hd },
    );
    union_two(main, wing)
}

/// Main bar with two wings, one at each end, forming a U open to the north.
fn u_shape(spec: &BuildingSpec, width_m: f64, depth_m: f64) -> EngineResult<Polygon> {
    let (ww, wd) = wing_dims(spec)?;
    let main = bar(width_m, depth_m);
    let (hw, hd) = (width_m * 0.5, depth_m * 0.5);
    let left_wing = geom::rect_polygon(
        Point2 { x: -hw, y: hd },
        Point2 { x: -hw + ww, y: hd + wd },
    );
    let right_wing = geom::rect_polygon(
        Point2 { x: hw - ww, y: hd },
        Point2 { x: hw, y: hd + wd },
    );
    let both = union_two(left_wing, right_wing)?;
    union_two(main, both)
}

/// A rectangular ring: the outer footprint minus a smaller inner courtyard.
fn courtyard_wrap(spec: &BuildingSpec, width_m: f64, depth_m: f64) -> EngineResult<Polygon> {
    let (cw, cd) = spec.courtyard_dims_m();
    if cw <= 0.0 || cd <= 0.0 || cw >= width_m || cd >= depth_m {
        return Err(EngineError::Invalid("courtyard must be smaller than the building footprint".into()));
    }
    let outer = bar(width_m, depth_m);
    let inner = bar(cw, cd);
    let diff = geom::difference_poly(&outer, &inner);
    geom::normalize_to_polygon(&diff).ok_or_else(|| EngineError::NumericOverflow("courtyard wrap collapsed".into()))
}

fn union_two(a: Polygon, b: Polygon) -> EngineResult<Polygon> {
    let u = geom::union_poly(&a, &b);
    geom::normalize_to_polygon(&u).ok_or_else(|| EngineError::NumericOverflow("footprint union collapsed".into()))
}

fn place(poly: Polygon, rotation_rad: f64, anchor: Point2) -> Polygon {
    let degrees = rotation_rad.to_degrees();
    poly.rotate_around_point(degrees, geo::Point::new(0.0, 0.0))
        .translate(anchor.x, anchor.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::model::LockedFields;

    fn base_spec(kind: BuildingType) -> BuildingSpec {
        BuildingSpec {
            id: "b1".into(),
            kind,
            anchor: Point2 { x: 50.0, y: 50.0 },
            rotation_rad: 0.0,
            width_m: Some(40.0),
            depth_m: Some(20.0),
            floors: 4,
            wing_width_m: Some(12.0),
            wing_depth_m: Some(15.0),
            courtyard_width_m: Some(20.0),
            courtyard_depth_m: Some(10.0),
            podium_floors: None,
            unit_mix: None,
            locked: LockedFields::default(),
        }
    }

    #[test]
    fn bar_footprint_area_matches_width_times_depth() {
        let spec = base_spec(BuildingType::Bar);
        let poly = generate_footprint(&spec).unwrap();
        assert!((geom::area(&poly) - 40.0 * 20.0).abs() < 1e-6);
    }

    #[test]
    fn l_shape_area_exceeds_bar_alone() {
        let spec = base_spec(BuildingType::LShape);
        let poly = generate_footprint(&spec).unwrap();
        assert!(geom::area(&poly) > 40.0 * 20.0);
    }

    #[test]
    fn courtyard_wrap_area_is_outer_minus_inner() {
        let spec = base_spec(BuildingType::CourtyardWrap);
        let poly = generate_footprint(&spec).unwrap();
        let expected = 40.0 * 20.0 - 20.0 * 10.0;
        assert!((geom::area(&poly) - expected).abs() < 1e-3);
    }

    #[test]
    fn rotation_preserves_area() {
        let mut spec = base_spec(BuildingType::Bar);
        spec.rotation_rad = std::f64::consts::FRAC_PI_4;
        let poly = generate_footprint(&spec).unwrap();
        assert!((geom::area(&poly) - 40.0 * 20.0).abs() < 1e-6);
    }

    #[test]
    fn courtyard_too_large_is_rejected() {
        let mut spec = base_spec(BuildingType::CourtyardWrap);
        spec.courtyard_width_m = Some(100.0);
        assert!(generate_footprint(&spec).is_err());
    }

    #[test]
    fn omitted_dimensions_fall_back_to_typology_defaults() {
        use sf_core::model::DEFAULT_BAR_DIMS_FT;
        use sf_core::units::ft_to_m;

        let mut spec = base_spec(BuildingType::Bar);
        spec.width_m = None;
        spec.depth_m = None;
        let poly = generate_footprint(&spec).unwrap();
        let (w, d) = (ft_to_m(DEFAULT_BAR_DIMS_FT.0), ft_to_m(DEFAULT_BAR_DIMS_FT.1));
        assert!((geom::area(&poly) - w * d).abs() < 1e-6);
    }

    #[test]
    fn omitted_wing_and_courtyard_dimensions_fall_back_to_defaults() {
        let mut spec = base_spec(BuildingType::LShape);
        spec.wing_width_m = None;
        spec.wing_depth_m = None;
        assert!(generate_footprint(&spec).is_ok());

        let mut spec = base_spec(BuildingType::CourtyardWrap);
        spec.width_m = None;
        spec.depth_m = None;
        spec.courtyard_width_m = None;
        spec.courtyard_depth_m = None;
        assert!(generate_footprint(&spec).is_ok());
    }
}
