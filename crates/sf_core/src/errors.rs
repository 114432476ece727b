//! Shared error taxonomy for the engine.
//!
//! Failures are modeled as data, not exceptions: every fallible entry point
//! in `sf_algo`/`sf_pipeline` returns a `Result` built on this enum (or a
//! narrower local error re-exported through it).

use thiserror::Error;

/// Engine-wide error taxonomy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Input polygon degenerate: fewer than 3 unique vertices, a ring that
    /// fails to close, or a coordinate that is NaN/infinite.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The setback solver could not produce a buildable envelope of at
    /// least 1 m^2.
    #[error("envelope collapsed under the given setbacks")]
    CollapsedEnvelope,

    /// Cooperative cancellation tripped; the best layout found so far is
    /// reported by the caller, not by this variant.
    #[error("optimization cancelled")]
    Cancelled,

    /// A boolean kernel operation failed to produce a result (numeric
    /// overflow/degenerate input). Recoverable: callers skip the dependent
    /// synthesis step and continue arithmetic scoring.
    #[error("numeric overflow in boolean geometry op: {0}")]
    NumericOverflow(String),

    /// Generic invalid-input guard for config/parameter validation.
    #[error("invalid input: {0}")]
    Invalid(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
