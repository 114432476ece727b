//! Parking bay solver: rotational sweep packing of double-loaded
//! parking rows into the leftover area (envelope minus buildings), plus a
//! circulation spine connecting the packed rows to the leftover area's own
//! longest edge.

use geo::{Rotate, Translate};

use sf_core::geom::{self, Point2, Polygon};
use sf_core::model::{ParkingSolution, ParkingSpec, Road};
use sf_core::units::{
    CONNECTION_THRESHOLD_M, MAIN_DRIVE_WIDTH_M, MAX_OUTPUT_POLYS, MIN_PARKING_POLY_AREA_M2,
};

/// Try every angle in `trial_angles_deg`, pack double-loaded parking rows at
/// each, and keep whichever angle scores best: stalls achieved, penalized
/// for aisle count (each aisle is a break between packable rows — an
/// "island" in the layout) and for area inside the packed bounding box that
/// went unused.
pub fn solve_parking(
    available: &Polygon,
    roads: &[Road],
    parking: &ParkingSpec,
    trial_angles_deg: &[f64],
) -> ParkingSolution {
    let _ = roads;
    let mut best: Option<(ParkingSolution, f64)> = None;

    for &angle in trial_angles_deg {
        let (candidate, bbox_area) = pack_at_angle(available, parking, angle);
        let candidate_score = angle_score(&candidate, bbox_area);
        let better = match &best {
            None => true,
            Some((b, barea)) => candidate_score > angle_score(b, *barea),
        };
        if better {
            best = Some((candidate, bbox_area));
        }
    }

    let mut solution = best.map(|(s, _)| s).unwrap_or_default();
    attach_circulation(&mut solution, available);
    apply_output_limits(&mut solution);
    solution
}

/// `stalls - 2*aisles - 0.001*wastedArea`, where wasted area is whatever part
/// of the rotated bounding box isn't covered by a bay or an aisle.
fn angle_score(solution: &ParkingSolution, bbox_area: f64) -> f64 {
    let island_count = solution.aisles.len() as f64;
    let used_area: f64 = solution.bays.iter().map(geom::area).sum::<f64>()
        + solution.aisles.iter().map(geom::area).sum::<f64>();
    let wasted_area = (bbox_area - used_area).max(0.0);
    solution.stalls_achieved as f64 - 2.0 * island_count - 0.001 * wasted_area
}

/// Pack bays into `available` as if it were rotated by `-angle_deg` (so rows
/// run axis-aligned in the local frame), then rotate the resulting bays back.
/// Returns the solution plus the local bounding-box area used to score waste.
fn pack_at_angle(available: &Polygon, parking: &ParkingSpec, angle_deg: f64) -> (ParkingSolution, f64) {
    let Some(centroid) = geom::centroid(available) else {
        return (ParkingSolution { chosen_angle_deg: angle_deg, ..ParkingSolution::default() }, 0.0);
    };
    let pivot = geo::Point::new(centroid.x, centroid.y);
    let local = available.rotate_around_point(-angle_deg, pivot);
    let Some(bb) = geom::bbox(&local) else {
        return (ParkingSolution { chosen_angle_deg: angle_deg, ..ParkingSolution::default() }, 0.0);
    };
    let bbox_area = bb.width() * bb.height();

    let row_depth = parking.stall_d_m;
    let row_pitch = 2.0 * row_depth + parking.aisle_w_m;
    let stall_w = parking.stall_w_m;

    let mut bays = Vec::new();
    let mut aisles = Vec::new();
    let mut stalls = 0u32;

    let mut y = bb.min().y;
    while y + row_pitch <= bb.max().y {
        let south_row_y0 = y;
        let south_row_y1 = y + row_depth;
        let aisle_y0 = south_row_y1;
        let aisle_y1 = aisle_y0 + parking.aisle_w_m;
        let north_row_y0 = aisle_y1;
        let north_row_y1 = north_row_y0 + row_depth;

        let south_run = pack_row(&local, bb.min().x, bb.max().x, stall_w, south_row_y0, south_row_y1);
        let north_run = pack_row(&local, bb.min().x, bb.max().x, stall_w, north_row_y0, north_row_y1);

        let mut row_had_stall = false;
        if let Some((x0, x1, count)) = south_run {
            bays.push(geom::rect_polygon(Point2 { x: x0, y: south_row_y0 }, Point2 { x: x1, y: south_row_y1 }));
            stalls += count;
            row_had_stall = true;
        }
        if let Some((x0, x1, count)) = north_run {
            bays.push(geom::rect_polygon(Point2 { x: x0, y: north_row_y0 }, Point2 { x: x1, y: north_row_y1 }));
            stalls += count;
            row_had_stall = true;
        }

        if row_had_stall {
            aisles.push(geom::rect_polygon(
                Point2 { x: bb.min().x, y: aisle_y0 },
                Point2 { x: bb.max().x, y: aisle_y1 },
            ));
        }

        y += row_pitch;
    }

    let rotate_back = |p: Polygon| p.rotate_around_point(angle_deg, pivot);
    let solution = ParkingSolution {
        bays: bays.into_iter().map(rotate_back).collect(),
        aisles: aisles.into_iter().map(rotate_back).collect(),
        circulation: Vec::new(),
        stalls_achieved: stalls,
        chosen_angle_deg: angle_deg,
        access_point: centroid,
        is_fully_connected: true,
        circulation_area_m2: 0.0,
    };
    (solution, bbox_area)
}

/// Walk one row of a double-loaded bay left to right in `stall_w` steps,
/// keeping only stalls whose centre lies inside `available`, and merge the
/// whole contiguous run into a single `(x0, x1, stall_count)` bay rather than
/// emitting one rectangle per stall. Returns `None` if the row has no valid
/// stall at all.
fn pack_row(available: &Polygon, x_min: f64, x_max: f64, stall_w: f64, y0: f64, y1: f64) -> Option<(f64, f64, u32)> {
    let mut x = x_min;
    let mut first_x = None;
    let mut last_x = x_min;
    let mut count = 0u32;
    while x + stall_w <= x_max {
        let stall = geom::rect_polygon(Point2 { x, y: y0 }, Point2 { x: x + stall_w, y: y1 });
        if stall_center_inside(&stall, available) {
            if first_x.is_none() {
                first_x = Some(x);
            }
            last_x = x + stall_w;
            count += 1;
        }
        x += stall_w;
    }
    first_x.map(|fx| (fx, last_x, count))
}

fn stall_center_inside(bay: &Polygon, available: &Polygon) -> bool {
    let Some(c) = geom::centroid(bay) else { return false };
    geom::point_in_polygon(c, available)
}

/// Connect the packed rows to the leftover area's own longest edge with a
/// single main drive spine, independent of any road input: the access point
/// is that edge's midpoint, not the point nearest a road.
fn attach_circulation(solution: &mut ParkingSolution, available: &Polygon) {
    if solution.bays.is_empty() {
        solution.is_fully_connected = true;
        return;
    }

    let Some(centroid) = geom::centroid(available) else {
        solution.is_fully_connected = true;
        return;
    };
    let access = longest_edge_midpoint(available);
    solution.access_point = access;

    let dx = access.x - centroid.x;
    let dy = access.y - centroid.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        solution.is_fully_connected = true;
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let (nx, ny) = (-uy, ux);
    let half_w = MAIN_DRIVE_WIDTH_M * 0.5;

    let p1 = Point2 { x: centroid.x + nx * half_w, y: centroid.y + ny * half_w };
    let p2 = Point2 { x: centroid.x - nx * half_w, y: centroid.y - ny * half_w };
    let p3 = Point2 { x: access.x - nx * half_w, y: access.y - ny * half_w };
    let p4 = Point2 { x: access.x + nx * half_w, y: access.y + ny * half_w };
    let spine = Polygon::new(geom::close_ring(geo::LineString::new(vec![p1, p2, p3, p4])), vec![]);

    solution.circulation_area_m2 = geom::area(&spine);
    solution.is_fully_connected = solution
        .aisles
        .iter()
        .filter_map(|a| geom::centroid(a))
        .all(|c| geom::point_to_polyline_distance(c, &spine_as_line(&spine)) <= len + CONNECTION_THRESHOLD_M);
    solution.circulation.push(spine);
}

fn spine_as_line(spine: &Polygon) -> sf_core::geom::Polyline {
    spine.exterior().clone()
}

fn longest_edge_midpoint(poly: &Polygon) -> Point2 {
    let ext = poly.exterior();
    let pts = ext.0.as_slice();
    let mut best_len = 0.0;
    let mut mid = pts[0];
    for w in pts.windows(2) {
        let len = ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt();
        if len > best_len {
            best_len = len;
            mid = Point2 { x: (w[0].x + w[1].x) * 0.5, y: (w[0].y + w[1].y) * 0.5 };
        }
    }
    mid
}

/// Drop slivers below the area threshold, then trim aisles and finally bays
/// (circulation is left alone: it's what keeps the lot connected) until the
/// combined polygon count is within `MAX_OUTPUT_POLYS`.
fn apply_output_limits(solution: &mut ParkingSolution) {
    solution.bays.retain(|p| geom::area(p) >= MIN_PARKING_POLY_AREA_M2);
    solution.aisles.retain(|p| geom::area(p) >= MIN_PARKING_POLY_AREA_M2);
    solution.circulation.retain(|p| geom::area(p) >= MIN_PARKING_POLY_AREA_M2);

    let mut total = solution.bays.len() + solution.aisles.len() + solution.circulation.len();
    while total > MAX_OUTPUT_POLYS && !solution.aisles.is_empty() {
        solution.aisles.pop();
        total -= 1;
    }
    while total > MAX_OUTPUT_POLYS && !solution.bays.is_empty() {
        solution.bays.pop();
        total -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_parking() -> ParkingSpec {
        ParkingSpec {
            stall_w_m: 2.7432,
            stall_d_m: 5.4864,
            aisle_w_m: 7.3152,
            target_ratio: 1.2,
            ada_pct: 0.04,
            ev_pct: 0.1,
        }
    }

    #[test]
    fn packs_more_stalls_in_a_larger_lot() {
        let small = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 20.0, y: 20.0 });
        let big = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 80.0, y: 80.0 });
        let parking = default_parking();
        let small_sol = solve_parking(&small, &[], &parking, &[0.0]);
        let big_sol = solve_parking(&big, &[], &parking, &[0.0]);
        assert!(big_sol.stalls_achieved > small_sol.stalls_achieved);
    }

    #[test]
    fn zero_area_lot_yields_no_stalls() {
        let tiny = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 0.1, y: 0.1 });
        let parking = default_parking();
        let sol = solve_parking(&tiny, &[], &parking, &[0.0, 45.0]);
        assert_eq!(sol.stalls_achieved, 0);
    }

    #[test]
    fn best_angle_is_recorded_on_the_solution() {
        let lot = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 60.0, y: 40.0 });
        let parking = default_parking();
        let sol = solve_parking(&lot, &[], &parking, &[0.0, 30.0, 60.0, 90.0]);
        assert!([0.0, 30.0, 60.0, 90.0].contains(&sol.chosen_angle_deg));
    }

    #[test]
    fn each_qualifying_row_is_one_merged_bay_not_one_rectangle_per_stall() {
        let lot = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 60.0, y: 40.0 });
        let parking = default_parking();
        let sol = solve_parking(&lot, &[], &parking, &[0.0]);
        // Several stalls fit across a 60 m row; they should collapse into far
        // fewer bay polygons than stalls achieved.
        assert!(sol.stalls_achieved > sol.bays.len() as u32 * 2);
    }

    #[test]
    fn circulation_spine_is_emitted_with_no_roads_at_all() {
        let lot = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 60.0, y: 40.0 });
        let parking = default_parking();
        let sol = solve_parking(&lot, &[], &parking, &[0.0]);
        assert!(!sol.circulation.is_empty());
        // The access point is the midpoint of the longest edge: one of the
        // two 60 m sides, at x = 30.
        assert!((sol.access_point.x - 30.0).abs() < 1e-6);
        assert!(sol.access_point.y.abs() < 1e-6 || (sol.access_point.y - 40.0).abs() < 1e-6);
    }

    #[test]
    fn output_polygon_count_never_exceeds_the_cap() {
        let lot = geom::rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 300.0, y: 300.0 });
        let parking = default_parking();
        let sol = solve_parking(&lot, &[], &parking, &[0.0, 30.0, 45.0, 60.0, 90.0]);
        let total = sol.bays.len() + sol.aisles.len() + sol.circulation.len();
        assert!(total <= MAX_OUTPUT_POLYS);
    }
}
