//! # morpho-io
//!
//! Simulation input/output contract and input validation.
//!
//! Defines the boundary types that external systems (CLI, asset pipeline)
//! use to hand a tet mesh, constraints and spring settings to the solver.

pub mod contract;
pub mod validator;

pub use contract::{SimulationInput, SimulationMetrics, SimulationOutput};
pub use validator::{validate_input, ValidationReport};
