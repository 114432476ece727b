//! sf_io — parcel/config loading, GeoJSON parsing, canonical JSON and SHA-256
//! hashing for the site-planning engine.
//!
//! - No inline implementations: real logic lives in the file modules below.
//! - Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for sf_io (used by canonical_json/parcel/config/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// GeoJSON parsing errors (parcel/road input).
    #[error("geojson error: {0}")]
    Geometry(String),

    /// Hashing-related errors (e.g., feature disabled).
    #[error("hash error: {0}")]
    Hash(String),

    /// Generic validation / config errors.
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod config;
pub mod hasher;
pub mod parcel;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json;
    pub use crate::config;
    pub use crate::hasher;
    pub use crate::parcel;

    pub use crate::canonical_json::to_canonical_bytes;
    #[cfg(feature = "hash")]
    pub use crate::hasher::sha256_hex;
}
