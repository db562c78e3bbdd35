//! # morpho-telemetry
//!
//! Event bus for simulation telemetry. Emits structured per-tick events
//! (timing, motion statistics, bad-tet failures, constraint transitions)
//! that are consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
