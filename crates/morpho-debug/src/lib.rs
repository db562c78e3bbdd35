//! # morpho-debug
//!
//! Inspection hooks, binary state snapshots, an external convergence /
//! divergence monitor, and thread-shared debug markers.

pub mod hooks;
pub mod markers;
pub mod monitor;
pub mod snapshot;

pub use hooks::{tick_with_hooks, InspectionHook, TelemetryHook};
pub use markers::{DebugMarkers, MarkerSet};
pub use monitor::{ConvergenceMonitor, MonitorConfig, MonitorStatus};
pub use snapshot::StateSnapshot;
