//! Error types for the morpho engine.
//!
//! All crates return `MorphoResult<T>` from fallible operations.
//! Per-tick failures are reported through diagnostics, not errors.

use thiserror::Error;

/// Unified error type for the morpho engine.
#[derive(Debug, Error)]
pub enum MorphoError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A constraint record is malformed (e.g. `end_time < start_time`).
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// An operation required an initialized simulation mesh.
    #[error("Simulation mesh is not initialized")]
    NotInitialized,

    /// Render mesh binding failed.
    #[error("Skin binding failed: {0}")]
    Binding(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, MorphoError>`.
pub type MorphoResult<T> = Result<T, MorphoError>;
