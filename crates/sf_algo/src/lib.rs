// crates/sf_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Algorithm layer: pure functions over `sf_core` types. Each stage
//! is its own file module; this crate re-exports the entry points the
//! pipeline drives in order.

pub mod clamp;
pub mod feasibility;
pub mod footprint;
pub mod parking;
pub mod proforma;
pub mod setback;

pub use clamp::{clamp_into_envelope, clamp_into_envelope_full, ClampResult};
pub use feasibility::{evaluate as evaluate_feasibility, is_compliant, FeasibilityInputs};
pub use footprint::generate_footprint;
pub use parking::solve_parking;
pub use proforma::{compute as compute_proforma, evaluate as evaluate_proforma, ProFormaSummary};
pub use setback::compute_envelope;
