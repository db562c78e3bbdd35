//! # morpho-types
//!
//! Shared error types and physical constants
//! for the morpho tetrahedral soft-body engine.
//!
//! This crate has no domain logic. It defines the error vocabulary
//! and defaults that all other morpho crates share.

pub mod constants;
pub mod error;

pub use error::{MorphoError, MorphoResult};
