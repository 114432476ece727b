//! sf_core — Core types, geometry kernel, and deterministic RNG.
//!
//! This crate is **I/O-free**. It defines the stable value types and the
//! planar geometry kernel used across the engine (`sf_io`, `sf_algo`,
//! `sf_pipeline`, `sf_report`, `sf_cli`).
//!
//! - Error taxonomy: [`errors::EngineError`]
//! - Unit conversions (ft/m, sqft/sqm): [`units`]
//! - Planar polygon algebra on top of `geo`: [`geom`]
//! - Data model (`PlanConfig`, `BuildingSpec`, `Scene`, `Metrics`, ...): [`model`]
//! - Seedable RNG for the optimizer's mutation/acceptance draws: [`rng`]
//!
//! Serialization derives are gated behind the `serde` feature.

pub mod errors;
pub mod geom;
pub mod model;
pub mod rng;
pub mod units;
