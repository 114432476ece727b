//! Setback solver: classify parcel edges as front/side/rear and
//! erode the parcel boundary by the zoning setback for each edge's class,
//! producing the buildable envelope.
//!
//! Implemented as a sequence of half-plane intersections rather than a
//! uniform buffer: each edge contributes one inward half-plane, offset by
//! its own setback distance, and the envelope is the intersection of the
//! parcel with all of them. This matches variable (non-uniform) setbacks
//! without needing a general polygon offset algorithm.

use sf_core::errors::{EngineError, EngineResult};
use sf_core::geom::{self, Point2, Polygon};
use sf_core::model::Road;
use sf_core::units::{ft_to_m, FRONT_EDGE_THRESHOLD_M, MIN_POLY_AREA_M2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeClass {
    Front,
    Side,
    Rear,
}

/// Compute the buildable envelope for a parcel given adjacent roads and the
/// zoning setback schedule. Returns `EngineError::CollapsedEnvelope` when the
/// setbacks consume the entire parcel (I-shaped or skinny lots).
pub fn compute_envelope(
    parcel: &Polygon,
    roads: &[Road],
    front_setback_ft: f64,
    side_setback_ft: f64,
    rear_setback_ft: f64,
) -> EngineResult<Polygon> {
    if geom::is_degenerate(parcel) {
        return Err(EngineError::InvalidGeometry("parcel has fewer than 3 unique vertices".into()));
    }

    let bb = geom::bbox(parcel).ok_or_else(|| EngineError::InvalidGeometry("parcel has no bounding box".into()))?;
    let diag = ((bb.width()).powi(2) + (bb.height()).powi(2)).sqrt();
    let half_plane_extent = diag.max(1.0) * 10.0;

    let exterior = parcel.exterior();
    let pts = exterior.0.as_slice();
    if pts.len() < 4 {
        return Err(EngineError::InvalidGeometry("parcel ring too short".into()));
    }

    let ccw = geom::is_ccw(exterior);

    let edges: Vec<(Point2, Point2, Point2)> = pts
        .windows(2)
        .filter_map(|w| {
            let (a, b) = (w[0], w[1]);
            let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            if len < 1e-6 {
                return None;
            }
            let mid = Point2 { x: (a.x + b.x) * 0.5, y: (a.y + b.y) * 0.5 };
            Some((a, b, mid))
        })
        .collect();
    if edges.is_empty() {
        return Err(EngineError::InvalidGeometry("parcel has no non-degenerate edges".into()));
    }

    let classes = classify_edges(&edges, roads);

    let mut envelope = parcel.clone();
    for ((a, b, _), class) in edges.iter().zip(classes.iter()) {
        let setback_ft = match class {
            EdgeClass::Front => front_setback_ft,
            EdgeClass::Side => side_setback_ft,
            EdgeClass::Rear => rear_setback_ft,
        };
        let setback_m = ft_to_m(setback_ft);
        if setback_m <= 0.0 {
            continue;
        }

        let half_plane = inward_half_plane(*a, *b, ccw, setback_m, half_plane_extent);
        let clipped = geom::intersection_poly(&envelope, &half_plane);
        match geom::normalize_to_polygon(&clipped) {
            Some(p) if geom::area(&p) >= MIN_POLY_AREA_M2 => envelope = p,
            _ => return Err(EngineError::CollapsedEnvelope),
        }
    }

    if geom::area(&envelope) < MIN_POLY_AREA_M2 {
        return Err(EngineError::CollapsedEnvelope);
    }
    Ok(envelope)
}

/// Coefficient weighting the outward-normal opposition term in the rear
/// score below; large enough that it dominates the distance term for any
/// parcel of ordinary scale, so rear selection is driven by "facing away
/// from front" first and distance only breaks ties among equally-opposed
/// edges.
const REAR_NORMAL_WEIGHT: f64 = 1000.0;

/// Outward unit normal of edge `a -> b`, for a ring whose winding is `ccw`.
fn outward_normal(a: Point2, b: Point2, ccw: bool) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = (dx / len, dy / len);
    // Right-hand normal of the edge direction points outward for a CCW ring.
    let (mut nx, mut ny) = (uy, -ux);
    if !ccw {
        nx = -nx;
        ny = -ny;
    }
    (nx, ny)
}

/// Classify every edge as exactly one of front/side/rear: the edge whose
/// midpoint sits closest to an adjacent road centerline is front, within
/// `FRONT_EDGE_THRESHOLD_M` (otherwise the longest edge is front by
/// convention); rear is whichever other edge maximizes
/// `‖mid_i - mid_front‖ - REAR_NORMAL_WEIGHT·dot(n_i, n_front)`, so an edge
/// whose outward normal points opposite front's is strongly preferred over
/// one merely far away; everything else is side.
fn classify_edges(edges: &[(Point2, Point2, Point2)], roads: &[Road]) -> Vec<EdgeClass> {
    let ccw = is_ring_ccw(edges);

    let nearest = edges
        .iter()
        .enumerate()
        .map(|(i, (_, _, mid))| {
            let d = roads
                .iter()
                .map(|r| geom::point_to_polyline_distance(*mid, &r.line))
                .fold(f64::INFINITY, f64::min);
            (i, d)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    // Only trust road proximity within the front-edge threshold; otherwise
    // fall back to the longest edge, which is front by convention.
    let front_idx = match nearest {
        Some((i, d)) if d <= FRONT_EDGE_THRESHOLD_M => i,
        _ => edges
            .iter()
            .enumerate()
            .map(|(i, (a, b, _))| (i, (b.x - a.x).powi(2) + (b.y - a.y).powi(2)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0),
    };

    let front_mid = edges[front_idx].2;
    let front_normal = outward_normal(edges[front_idx].0, edges[front_idx].1, ccw);

    let rear_idx = edges
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != front_idx)
        .map(|(i, (a, b, mid))| {
            let dx = mid.x - front_mid.x;
            let dy = mid.y - front_mid.y;
            let dist = (dx * dx + dy * dy).sqrt();
            let (nx, ny) = outward_normal(*a, *b, ccw);
            let dot = nx * front_normal.0 + ny * front_normal.1;
            let score = dist - REAR_NORMAL_WEIGHT * dot;
            (i, score)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(front_idx);

    edges
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i == front_idx {
                EdgeClass::Front
            } else if i == rear_idx {
                EdgeClass::Rear
            } else {
                EdgeClass::Side
            }
        })
        .collect()
}

/// Signed-area winding test over the edge list alone (no closing-vertex
/// assumptions), used because `classify_edges` receives only midpoint
/// triples, not the parcel polygon.
fn is_ring_ccw(edges: &[(Point2, Point2, Point2)]) -> bool {
    let signed_area: f64 = edges.iter().map(|(a, b, _)| a.x * b.y - b.x * a.y).sum();
    signed_area > 0.0
}

/// Build a large rectangle covering the half-plane that is `setback_m` or
/// more to the inward side of the line `a -> b`.
fn inward_half_plane(a: Point2, b: Point2, ccw: bool, setback_m: f64, extent: f64) -> Polygon {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = (dx / len, dy / len);

    // Left-hand normal of the edge direction; for a CCW ring this points
    // into the polygon interior. Flip for CW rings.
    let (mut nx, mut ny) = (-uy, ux);
    if !ccw {
        nx = -nx;
        ny = -ny;
    }

    let origin = Point2 { x: (a.x + b.x) * 0.5, y: (a.y + b.y) * 0.5 };
    let inner = Point2 { x: origin.x + nx * setback_m, y: origin.y + ny * setback_m };

    // Rectangle spanning `extent` along the edge direction and `extent`
    // further inward, with its near edge at the offset line.
    let p1 = Point2 { x: inner.x - ux * extent, y: inner.y - uy * extent };
    let p2 = Point2 { x: inner.x + ux * extent, y: inner.y + uy * extent };
    let p3 = Point2 { x: p2.x + nx * extent, y: p2.y + ny * extent };
    let p4 = Point2 { x: p1.x + nx * extent, y: p1.y + ny * extent };

    Polygon::new(geom::close_ring(geo::LineString::new(vec![p1, p2, p3, p4])), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::geom::rect_polygon;

    fn square_parcel() -> Polygon {
        rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 100.0, y: 100.0 })
    }

    #[test]
    fn uniform_setback_shrinks_rectangle_by_expected_margin() {
        let parcel = square_parcel();
        let envelope = compute_envelope(&parcel, &[], 20.0, 20.0, 20.0).unwrap();
        let setback_m = ft_to_m(20.0);
        let expected_side = 100.0 - 2.0 * setback_m;
        assert!((geom::area(&envelope) - expected_side * expected_side).abs() < 1e-3);
    }

    #[test]
    fn oversized_setback_collapses_envelope() {
        let parcel = square_parcel();
        let result = compute_envelope(&parcel, &[], 200.0, 200.0, 200.0);
        assert!(matches!(result, Err(EngineError::CollapsedEnvelope)));
    }

    #[test]
    fn front_edge_near_road_gets_front_setback() {
        let parcel = square_parcel();
        let road = Road {
            line: geo::LineString::new(vec![Point2 { x: -10.0, y: -1.0 }, Point2 { x: 110.0, y: -1.0 }]),
            name: Some("Main St".into()),
        };
        // Large front setback, tiny side/rear: envelope should shrink a lot
        // from the road-adjacent (south) edge only.
        let envelope = compute_envelope(&parcel, &[road], 50.0, 1.0, 1.0).unwrap();
        let bb = geom::bbox(&envelope).unwrap();
        assert!(bb.min().y > ft_to_m(40.0));
    }

    fn edges_of(parcel: &Polygon) -> Vec<(Point2, Point2, Point2)> {
        parcel
            .exterior()
            .0
            .windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                let mid = Point2 { x: (a.x + b.x) * 0.5, y: (a.y + b.y) * 0.5 };
                (a, b, mid)
            })
            .collect()
    }

    #[test]
    fn rectangle_classifies_to_one_front_one_rear_two_sides() {
        let parcel = square_parcel();
        let edges = edges_of(&parcel);
        let classes = classify_edges(&edges, &[]);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Front).count(), 1);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Rear).count(), 1);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Side).count(), 2);
    }

    #[test]
    fn rectangle_with_road_still_has_one_front_one_rear_two_sides() {
        let parcel = square_parcel();
        let edges = edges_of(&parcel);
        let road = Road {
            line: geo::LineString::new(vec![Point2 { x: -10.0, y: -1.0 }, Point2 { x: 110.0, y: -1.0 }]),
            name: Some("Main St".into()),
        };
        let classes = classify_edges(&edges, &[road]);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Front).count(), 1);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Rear).count(), 1);
        assert_eq!(classes.iter().filter(|c| **c == EdgeClass::Side).count(), 2);
        // The edge closest to the road (south) must be the one marked Front.
        let front_i = classes.iter().position(|c| *c == EdgeClass::Front).unwrap();
        assert!(edges[front_i].2.y < 1.0);
    }

    #[test]
    fn trapezoid_rear_is_the_edge_facing_away_from_front_not_just_the_farthest() {
        // A trapezoid whose short north edge sits almost directly above part
        // of the long south edge: the nearest-by-distance edge to the south
        // (front) midpoint is one of the slanted sides, but the one whose
        // outward normal most opposes front's is the north edge.
        let ring = geo::LineString::new(vec![
            Point2 { x: 0.0, y: 0.0 },
            Point2 { x: 100.0, y: 0.0 },
            Point2 { x: 70.0, y: 90.0 },
            Point2 { x: 30.0, y: 90.0 },
            Point2 { x: 0.0, y: 0.0 },
        ]);
        let parcel = Polygon::new(ring, vec![]);
        let edges = edges_of(&parcel);
        let road = Road {
            line: geo::LineString::new(vec![Point2 { x: -10.0, y: -1.0 }, Point2 { x: 110.0, y: -1.0 }]),
            name: Some("Main St".into()),
        };
        let classes = classify_edges(&edges, &[road]);
        let front_i = classes.iter().position(|c| *c == EdgeClass::Front).unwrap();
        let rear_i = classes.iter().position(|c| *c == EdgeClass::Rear).unwrap();
        assert!(edges[front_i].2.y < 1.0);
        // North edge (index 2, between (70,90) and (30,90)) is the rear.
        assert_eq!(rear_i, 2);
    }
}
