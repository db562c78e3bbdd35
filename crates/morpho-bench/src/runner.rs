//! Benchmark runner — executes scenarios and collects metrics.

use std::time::Instant;

use morpho_debug::{ConvergenceMonitor, InspectionHook, MonitorStatus, TelemetryHook};
use morpho_io::validate_input;
use morpho_telemetry::bus::EventBus;
use morpho_types::MorphoResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario without telemetry sinks.
    pub fn run(scenario: &Scenario) -> MorphoResult<BenchmarkMetrics> {
        Self::run_with_bus(scenario, &mut EventBus::new())
    }

    /// Run a single scenario, dispatching per-tick telemetry through `bus`.
    ///
    /// Returns metrics for the completed run.
    pub fn run_with_bus(scenario: &Scenario, bus: &mut EventBus) -> MorphoResult<BenchmarkMetrics> {
        validate_input(&scenario.input)?;
        let mut body = scenario.input.instantiate(None)?;
        let initial = body.positions().to_vec();
        let skinned = body.render_mesh().is_some();

        let ticks = scenario.tick_count();
        let mut monitor = ConvergenceMonitor::default();
        let mut telemetry = TelemetryHook::new();

        let mut tick_times: Vec<f64> = Vec::with_capacity(ticks as usize);
        let mut failed_ticks = 0u64;
        let mut last_stats = Default::default();
        let mut steady_tick = None;
        let dispatched_before = bus.dispatched();

        let total_start = Instant::now();

        for _ in 0..ticks {
            telemetry.on_tick_begin(body.tick_count(), body.sim_time());
            let report = body.tick();
            telemetry.on_tick_end(&report, &body);
            tick_times.push(report.wall_time);

            if report.success {
                last_stats = report.stats;
                let status = monitor.observe(&report.stats);
                if status == MonitorStatus::SteadyState && steady_tick.is_none() {
                    steady_tick = Some(report.tick);
                }
                if skinned {
                    body.update_skin();
                }
            } else {
                failed_ticks += 1;
            }

            bus.emit_all(telemetry.drain_events());
            bus.flush();
        }

        telemetry.on_simulation_end();
        bus.finish();

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let max_displacement = body
            .positions()
            .iter()
            .zip(&initial)
            .map(|(p, q)| p.distance(*q))
            .fold(0.0f32, f32::max);

        let avg_tick = if tick_times.is_empty() {
            0.0
        } else {
            tick_times.iter().sum::<f64>() / tick_times.len() as f64
        };
        let min_tick = tick_times.iter().copied().fold(f64::MAX, f64::min);
        let max_tick = tick_times.iter().copied().fold(0.0, f64::max);

        let diverged = monitor.status() == MonitorStatus::Diverged;
        if diverged {
            tracing::warn!(scenario = scenario.kind.name(), "scenario diverged");
        }
        if failed_ticks > 0 {
            tracing::warn!(scenario = scenario.kind.name(), failed_ticks, "ticks failed the bad-tet check");
        }

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            vertex_count: body.vertex_count(),
            tet_count: body.connectivity().tet_count(),
            ticks,
            failed_ticks,
            total_wall_time,
            avg_tick_time: avg_tick,
            min_tick_time: if tick_times.is_empty() { 0.0 } else { min_tick },
            max_tick_time: max_tick,
            final_kinetic_energy: body.kinetic_energy(),
            max_displacement,
            final_tick_displacement: last_stats.max_displacement,
            final_velocity_delta: last_stats.max_velocity_delta,
            steady_tick,
            diverged,
            events: bus.dispatched() - dispatched_before,
        })
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> MorphoResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind)))
            .collect()
    }
}
