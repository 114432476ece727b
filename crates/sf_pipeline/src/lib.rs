//! Pipeline layer: orchestrates the pure `sf_algo` stages into three public
//! entry points — `computeEnvelope`, `optimize`, and `evaluate` — plus
//! cooperative cancellation and the scene assembler.

#![forbid(unsafe_code)]

pub mod cancel;
pub mod optimize;
pub mod scene;

pub use cancel::CancellationToken;
pub use optimize::{evaluate, run as optimize_layout, EvaluateOutcome, OptimizeOutcome};

use sf_core::errors::EngineResult;
use sf_core::geom::Polygon;
use sf_core::model::{ParcelGeometry, Road, ZoningLimits};

/// `computeEnvelope`: normalize the parcel boundary (selecting the largest
/// member if it arrived as a `MultiPolygon`) and erode it by the zoning
/// setback schedule.
pub fn compute_envelope(parcel: &ParcelGeometry, roads: &[Road], zoning: &ZoningLimits) -> EngineResult<Polygon> {
    let normalized = parcel
        .normalize()
        .ok_or_else(|| sf_core::errors::EngineError::InvalidGeometry("parcel has no usable polygon member".into()))?;
    sf_algo::compute_envelope(
        &normalized,
        roads,
        zoning.front_setback_ft,
        zoning.side_setback_ft,
        zoning.rear_setback_ft,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::geom::{rect_polygon, Point2};

    fn zoning() -> ZoningLimits {
        ZoningLimits {
            max_far: 2.0,
            max_coverage_pct: 50.0,
            min_parking_ratio: 1.0,
            max_height_ft: None,
            max_density_du_per_acre: None,
            max_impervious_pct: None,
            min_open_space_pct: None,
            front_setback_ft: 20.0,
            side_setback_ft: 10.0,
            rear_setback_ft: 15.0,
        }
    }

    #[test]
    fn compute_envelope_normalizes_a_multipolygon_parcel_first() {
        let small = rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 5.0, y: 5.0 });
        let big = rect_polygon(Point2 { x: 0.0, y: 0.0 }, Point2 { x: 200.0, y: 200.0 });
        let parcel = ParcelGeometry::MultiPolygon(sf_core::geom::MultiPolygon::new(vec![small, big]));
        let envelope = compute_envelope(&parcel, &[], &zoning()).unwrap();
        assert!(sf_core::geom::area(&envelope) > 100.0 * 100.0);
    }

    #[test]
    fn compute_envelope_rejects_degenerate_parcel() {
        let degenerate = Polygon::new(sf_core::geom::Ring::new(vec![]), vec![]);
        let parcel = ParcelGeometry::Polygon(degenerate);
        assert!(compute_envelope(&parcel, &[], &zoning()).is_err());
    }
}
