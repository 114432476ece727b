//! Geometry kernel: planar polygon algebra.
//!
//! Built on the `geo` crate rather than a hand-rolled scanline/Vatti
//! implementation: `BooleanOps` gives a real Martinez-Rueda-equivalent
//! union/difference/intersection, a hard requirement for correctness on
//! greenspace synthesis and parking-clearance subtraction.

use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Coord, EuclideanDistance, LineString, Polygon as GeoPolygon,
    MultiPolygon as GeoMultiPolygon, Rect,
};

pub type Point2 = Coord<f64>;
pub type Ring = LineString<f64>;
pub type Polygon = GeoPolygon<f64>;
pub type MultiPolygon = GeoMultiPolygon<f64>;
pub type Bbox = Rect<f64>;
pub type Polyline = LineString<f64>;

use crate::units::MIN_POLY_AREA_M2;

/// Unsigned planar area of a polygon (outer ring minus holes), in m^2.
pub fn area(poly: &Polygon) -> f64 {
    poly.unsigned_area()
}

/// Unsigned area of a multipolygon (sum over members).
pub fn area_multi(mp: &MultiPolygon) -> f64 {
    mp.0.iter().map(area).sum()
}

/// Signed area of a ring (positive if CCW), via the shoelace formula.
pub fn signed_area_ring(ring: &Ring) -> f64 {
    let pts = ring.0.as_slice();
    if pts.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for w in pts.windows(2) {
        acc += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    acc * 0.5
}

/// True if the ring winds counter-clockwise.
pub fn is_ccw(ring: &Ring) -> bool {
    signed_area_ring(ring) > 0.0
}

/// Reverse a ring's point order in place.
pub fn reverse_ring(ring: &mut Ring) {
    ring.0.reverse();
}

/// Axis-aligned bounding box, or `None` for an empty polygon.
pub fn bbox(poly: &Polygon) -> Option<Bbox> {
    poly.bounding_rect()
}

/// Bounding box over a set of polygons (union of their individual bboxes).
pub fn bbox_of_many<'a>(polys: impl Iterator<Item = &'a Polygon>) -> Option<Bbox> {
    polys.filter_map(bbox).reduce(|a, b| {
        let min = Point2 {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        };
        let max = Point2 {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        };
        Rect::new(min, max)
    })
}

/// Centroid of a polygon (area-weighted), or `None` for a degenerate polygon.
pub fn centroid(poly: &Polygon) -> Option<Point2> {
    poly.centroid().map(|c| c.0)
}

/// Ray-casting point-in-ring test. Points exactly on the boundary are
/// treated as inside (matches the "contained within tolerance" usage at
/// call sites, which always pad with `OVERLAP_TOL_M2`-scale slack anyway).
pub fn point_in_ring(pt: Point2, ring: &Ring) -> bool {
    let pts = ring.0.as_slice();
    if pts.len() < 3 {
        return false;
    }
    let mut inside = false;
    let n = pts.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (pts[i].x, pts[i].y);
        let (xj, yj) = (pts[j].x, pts[j].y);
        let intersects = ((yi > pt.y) != (yj > pt.y))
            && (pt.x < (xj - xi) * (pt.y - yi) / (yj - yi) + xi);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Point-in-polygon including hole exclusion.
pub fn point_in_polygon(pt: Point2, poly: &Polygon) -> bool {
    if !point_in_ring(pt, poly.exterior()) {
        return false;
    }
    for hole in poly.interiors() {
        if point_in_ring(pt, hole) {
            return false;
        }
    }
    true
}

fn as_multi(poly: &Polygon) -> MultiPolygon {
    MultiPolygon::new(vec![poly.clone()])
}

/// Filter out multipolygon members below the minimum sliver area.
pub fn filter_slivers(mp: MultiPolygon, min_area_m2: f64) -> MultiPolygon {
    MultiPolygon::new(
        mp.0
            .into_iter()
            .filter(|p| area(p) >= min_area_m2)
            .collect(),
    )
}

/// Union of two polygon-or-multipolygon operands, filtered for slivers.
pub fn union(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    filter_slivers(a.union(b), MIN_POLY_AREA_M2)
}

pub fn union_poly(a: &Polygon, b: &Polygon) -> MultiPolygon {
    union(&as_multi(a), &as_multi(b))
}

/// Difference `a \ b`, filtered for slivers.
pub fn difference(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    filter_slivers(a.difference(b), MIN_POLY_AREA_M2)
}

pub fn difference_poly(a: &Polygon, b: &Polygon) -> MultiPolygon {
    difference(&as_multi(a), &as_multi(b))
}

/// Intersection, filtered for slivers.
pub fn intersection(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    filter_slivers(a.intersection(b), MIN_POLY_AREA_M2)
}

pub fn intersection_poly(a: &Polygon, b: &Polygon) -> MultiPolygon {
    intersection(&as_multi(a), &as_multi(b))
}

/// Pick the largest-area member of a multipolygon.
pub fn normalize_to_polygon(mp: &MultiPolygon) -> Option<Polygon> {
    mp.0
        .iter()
        .max_by(|a, b| area(a).partial_cmp(&area(b)).unwrap_or(std::cmp::Ordering::Equal))
        .cloned()
}

/// Axis-aligned offset: positive expands, negative shrinks. Exact only when
/// `poly` is itself an axis-aligned rectangle, computed by inflating or
/// deflating its bounding box, which is a no-op error for any other shape
/// (callers needing a true variable-offset use the setback solver instead).
pub fn offset_axis_aligned(poly: &Polygon, delta: f64) -> Polygon {
    let Some(bb) = bbox(poly) else {
        return poly.clone();
    };
    let min = Point2 {
        x: bb.min().x - delta,
        y: bb.min().y - delta,
    };
    let max = Point2 {
        x: bb.max().x + delta,
        y: bb.max().y + delta,
    };
    rect_polygon(min, max)
}

/// Build a simple axis-aligned rectangle polygon (CCW, closed).
pub fn rect_polygon(min: Point2, max: Point2) -> Polygon {
    if max.x <= min.x || max.y <= min.y {
        return Polygon::new(Ring::new(vec![]), vec![]);
    }
    let ring = Ring::new(vec![
        Point2 { x: min.x, y: min.y },
        Point2 { x: max.x, y: min.y },
        Point2 { x: max.x, y: max.y },
        Point2 { x: min.x, y: max.y },
        Point2 { x: min.x, y: min.y },
    ]);
    Polygon::new(ring, vec![])
}

/// Minimum perpendicular distance from a point to a polyline.
pub fn point_to_polyline_distance(pt: Point2, line: &Polyline) -> f64 {
    geo::Point::from(pt).euclidean_distance(line)
}

/// Minimum distance between two polygons' exteriors. The parking solver's
/// circulation step uses a cheaper bbox-centroid proxy instead; this is the
/// true distance, kept here for callers that want exactness.
pub fn polygon_distance(a: &Polygon, b: &Polygon) -> f64 {
    a.euclidean_distance(b)
}

/// A polygon is degenerate if its outer ring (after de-duplicating the
/// closing vertex) has fewer than 3 unique points, or any coordinate is
/// non-finite.
pub fn is_degenerate(poly: &Polygon) -> bool {
    let ext = poly.exterior();
    if ext.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return true;
    }
    let mut uniq: Vec<Point2> = Vec::new();
    for c in ext.0.iter() {
        if !uniq.iter().any(|u| (u.x - c.x).abs() < 1e-9 && (u.y - c.y).abs() < 1e-9) {
            uniq.push(*c);
        }
    }
    uniq.len() < 3
}

/// Ensure the ring is closed (first point == last point).
pub fn close_ring(mut ring: Ring) -> Ring {
    if let (Some(first), Some(last)) = (ring.0.first().copied(), ring.0.last().copied()) {
        if (first.x - last.x).abs() > 1e-12 || (first.y - last.y).abs() > 1e-12 {
            ring.0.push(first);
        }
    }
    ring
}

/// Outer-ring perimeter (Euclidean sum; only the outer ring counts).
pub fn perimeter(poly: &Polygon) -> f64 {
    let pts = poly.exterior().0.as_slice();
    pts.windows(2)
        .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        rect_polygon(Point2 { x: min, y: min }, Point2 { x: max, y: max })
    }

    #[test]
    fn area_of_unit_square_is_one() {
        let p = square(0.0, 1.0);
        assert!((area(&p) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ccw_square_has_positive_signed_area() {
        let p = square(0.0, 10.0);
        assert!(signed_area_ring(p.exterior()) > 0.0);
    }

    #[test]
    fn point_in_ring_classifies_correctly() {
        let p = square(0.0, 10.0);
        assert!(point_in_polygon(Point2 { x: 5.0, y: 5.0 }, &p));
        assert!(!point_in_polygon(Point2 { x: 15.0, y: 5.0 }, &p));
    }

    #[test]
    fn offset_shrinks_and_expands_rectangles() {
        let p = square(0.0, 100.0);
        let shrunk = offset_axis_aligned(&p, -10.0);
        assert!((area(&shrunk) - 80.0 * 80.0).abs() < 1e-6);
        let grown = offset_axis_aligned(&p, 10.0);
        assert!((area(&grown) - 120.0 * 120.0).abs() < 1e-6);
    }

    #[test]
    fn difference_removes_overlap() {
        let a = square(0.0, 10.0);
        let b = square(5.0, 15.0);
        let d = difference_poly(&a, &b);
        assert!((area_multi(&d) - 75.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_picks_largest_member() {
        let small = square(0.0, 1.0);
        let big = square(20.0, 30.0);
        let mp = MultiPolygon::new(vec![small, big.clone()]);
        let picked = normalize_to_polygon(&mp).unwrap();
        assert!((area(&picked) - area(&big)).abs() < 1e-9);
    }

    #[test]
    fn degenerate_detects_collapsed_rings() {
        let ring = Ring::new(vec![
            Point2 { x: 0.0, y: 0.0 },
            Point2 { x: 0.0, y: 0.0 },
            Point2 { x: 0.0, y: 0.0 },
        ]);
        let poly = Polygon::new(ring, vec![]);
        assert!(is_degenerate(&poly));
    }
}
