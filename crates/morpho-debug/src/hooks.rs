//! Inspection hooks for live debugging.
//!
//! Hooks are called around each tick to capture metrics or drive
//! monitoring without touching the solver itself.

use morpho_solver::{SoftBody, TickReport};
use morpho_telemetry::events::{EventKind, SimulationEvent};

/// Trait for simulation inspection hooks.
///
/// # Lifecycle
///
/// ```text
/// for each tick:
///   hook.on_tick_begin(...)
///   body.tick()
///   hook.on_tick_end(...)
/// hook.on_simulation_end()
/// ```
pub trait InspectionHook: Send {
    /// Called before each tick.
    fn on_tick_begin(&mut self, tick: u64, sim_time: f32) {
        let _ = (tick, sim_time);
    }

    /// Called after each tick with its report and the body's new state.
    fn on_tick_end(&mut self, report: &TickReport, body: &SoftBody) {
        let _ = (report, body);
    }

    /// Called when the simulation completes.
    fn on_simulation_end(&mut self) {}

    /// Returns the hook's name for logging.
    fn name(&self) -> &str;
}

/// Tick `body` once, calling every hook around it.
pub fn tick_with_hooks(body: &mut SoftBody, hooks: &mut [Box<dyn InspectionHook>]) -> TickReport {
    for hook in hooks.iter_mut() {
        hook.on_tick_begin(body.tick_count(), body.sim_time());
    }
    let report = body.tick();
    for hook in hooks.iter_mut() {
        hook.on_tick_end(&report, body);
    }
    report
}

/// Hook that turns tick reports into telemetry events.
#[derive(Debug, Default)]
pub struct TelemetryHook {
    events: Vec<SimulationEvent>,
    energy: bool,
}

impl TelemetryHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit the kinetic energy after every successful tick.
    pub fn with_energy(mut self) -> Self {
        self.energy = true;
        self
    }

    /// Drains collected events for dispatch.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events describing one finished tick.
    pub fn events_for(report: &TickReport) -> Vec<SimulationEvent> {
        let tick = report.tick;
        let mut events = Vec::with_capacity(4);
        if report.reset_applied {
            events.push(SimulationEvent::new(tick, EventKind::Reset));
        }
        if report.constraints_activated + report.constraints_ended > 0 {
            events.push(SimulationEvent::new(
                tick,
                EventKind::ConstraintTransition {
                    activated: report.constraints_activated as u32,
                    ended: report.constraints_ended as u32,
                },
            ));
        }
        if report.success {
            events.push(SimulationEvent::new(
                tick,
                EventKind::Convergence {
                    max_displacement: report.stats.max_displacement,
                    mean_displacement: report.stats.mean_displacement,
                    max_velocity_delta: report.stats.max_velocity_delta,
                    mean_velocity_delta: report.stats.mean_velocity_delta,
                },
            ));
        } else {
            events.push(SimulationEvent::new(
                tick,
                EventKind::GeometryFailure {
                    bad_tets: report.bad_tets as u32,
                },
            ));
        }
        events.push(SimulationEvent::new(
            tick,
            EventKind::TickEnd {
                wall_time: report.wall_time,
                success: report.success,
            },
        ));
        events
    }
}

impl InspectionHook for TelemetryHook {
    fn on_tick_begin(&mut self, tick: u64, sim_time: f32) {
        self.events.push(SimulationEvent::new(
            tick,
            EventKind::TickBegin {
                sim_time: sim_time as f64,
            },
        ));
    }

    fn on_tick_end(&mut self, report: &TickReport, body: &SoftBody) {
        self.events.extend(Self::events_for(report));
        if self.energy && report.success {
            self.events.push(SimulationEvent::new(
                report.tick,
                EventKind::Energy {
                    kinetic: body.kinetic_energy(),
                },
            ));
        }
    }

    fn name(&self) -> &str {
        "telemetry_hook"
    }
}
