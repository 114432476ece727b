//! Unit conversion constants.
//!
//! All geometry inside the engine is in planar metres; the config/report
//! boundary is in feet for human-facing fields (setbacks, stall sizes).

/// 1 foot in metres.
pub const FT_TO_M: f64 = 0.3048;
/// 1 metre in feet.
pub const M_TO_FT: f64 = 1.0 / FT_TO_M;

/// m^2 -> ft^2.
pub const M2_TO_FT2: f64 = 10.7639;
/// ft^2 -> m^2.
pub const FT2_TO_M2: f64 = 1.0 / M2_TO_FT2;

/// m^2 -> acres.
pub const M2_TO_ACRES: f64 = 2.47105e-4;

/// Minimum polygon area retained after a boolean op.
pub const MIN_POLY_AREA_M2: f64 = 2.0;

/// Tolerance used for building/envelope and building/building overlap tests.
pub const OVERLAP_TOL_M2: f64 = 0.5;

/// Greenspace sliver filter, in square feet.
pub const MIN_GREENSPACE_AREA_SQFT: f64 = 100.0;

/// Main drive spine width.
pub const MAIN_DRIVE_WIDTH_M: f64 = 7.3152;

/// Distance below which an aisle is considered already connected to the drive spine.
pub const CONNECTION_THRESHOLD_M: f64 = 1.524;

/// Road-proximity threshold for front-edge classification: 200 ft.
pub const FRONT_EDGE_THRESHOLD_M: f64 = 60.96;

/// Shrink ladder used by the building clamp, applied in order until one
/// candidate fits.
pub const CLAMP_SHRINK_SCALES: [f64; 7] = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];

/// Floor under either building dimension while the clamp shrink ladder runs;
/// a candidate shrunk past this is not tried.
pub const MIN_SHRINK_DIM_M: f64 = 8.0;

/// Side length of the guaranteed placeholder square the clamp falls back to
/// when no translated/shrunk candidate fits the envelope at all.
pub const CLAMP_FALLBACK_DIM_M: f64 = 10.0;

/// Step used by the full-mode clamp's grid search over candidate anchors.
pub const CLAMP_GRID_STEP_M: f64 = 5.0;

/// Caps the number of polygons the parking packer emits across bays, aisles
/// and circulation combined.
pub const MAX_OUTPUT_POLYS: usize = 50;

/// Parking bay/aisle slivers below this area are dropped rather than emitted.
pub const MIN_PARKING_POLY_AREA_M2: f64 = 1.0;

/// Clearance margin added around a building's bounding box before it is
/// subtracted from the envelope to find the area left over for parking.
pub const BUILDING_CLEARANCE_M: f64 = 1.5;

#[inline]
pub fn ft_to_m(ft: f64) -> f64 {
    ft * FT_TO_M
}

#[inline]
pub fn m_to_ft(m: f64) -> f64 {
    m * M_TO_FT
}

#[inline]
pub fn sqm_to_sqft(m2: f64) -> f64 {
    m2 * M2_TO_FT2
}

#[inline]
pub fn sqft_to_sqm(ft2: f64) -> f64 {
    ft2 * FT2_TO_M2
}
