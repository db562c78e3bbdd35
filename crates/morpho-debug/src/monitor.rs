//! Convergence and divergence monitoring.
//!
//! The solver reports per-tick motion statistics but never judges them.
//! [`ConvergenceMonitor`] watches those statistics and decides when the
//! body has settled or blown up.

use morpho_solver::{ConvergenceStats, SoftBody, TickReport};
use morpho_types::constants::VERY_BIG;
use serde::{Deserialize, Serialize};

use crate::hooks::InspectionHook;

/// Thresholds for [`ConvergenceMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Per-tick displacement below which a tick counts as calm.
    pub displacement_tolerance: f32,
    /// Per-tick velocity change below which a tick counts as calm.
    pub velocity_tolerance: f32,
    /// Consecutive calm ticks that make a steady state.
    pub steady_ticks: u32,
    /// Magnitude treated as runaway.
    pub very_big: f32,
    /// Consecutive runaway ticks that make a divergence.
    pub divergence_ticks: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            displacement_tolerance: 1.0e-4,
            velocity_tolerance: 1.0e-2,
            steady_ticks: 100,
            very_big: VERY_BIG,
            divergence_ticks: 10,
        }
    }
}

/// Monitor verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
    Running,
    SteadyState,
    /// Terminal until [`ConvergenceMonitor::reset`].
    Diverged,
}

/// Tracks consecutive calm and runaway ticks.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    config: MonitorConfig,
    calm_ticks: u32,
    big_ticks: u32,
    observed: u64,
    status: MonitorStatus,
}

impl ConvergenceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            calm_ticks: 0,
            big_ticks: 0,
            observed: 0,
            status: MonitorStatus::Running,
        }
    }

    #[inline]
    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    #[inline]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Ticks observed since creation or the last reset.
    #[inline]
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// True once the body settled or diverged.
    pub fn should_stop(&self) -> bool {
        self.status != MonitorStatus::Running
    }

    /// Feed one tick's statistics.
    pub fn observe(&mut self, stats: &ConvergenceStats) -> MonitorStatus {
        self.observed += 1;
        if self.status == MonitorStatus::Diverged {
            return self.status;
        }

        if !stats.is_finite() {
            tracing::warn!(tick = self.observed, "non-finite motion statistics, diverged");
            self.status = MonitorStatus::Diverged;
            return self.status;
        }

        if stats.max_displacement > self.config.very_big || stats.max_velocity_delta > self.config.very_big {
            self.big_ticks += 1;
            if self.big_ticks >= self.config.divergence_ticks {
                tracing::warn!(
                    tick = self.observed,
                    max_displacement = stats.max_displacement,
                    "motion above runaway threshold, diverged"
                );
                self.status = MonitorStatus::Diverged;
                return self.status;
            }
        } else {
            self.big_ticks = 0;
        }

        let calm = stats.max_displacement < self.config.displacement_tolerance
            && stats.max_velocity_delta < self.config.velocity_tolerance;
        if calm {
            self.calm_ticks += 1;
        } else {
            self.calm_ticks = 0;
        }

        self.status = if self.calm_ticks >= self.config.steady_ticks {
            MonitorStatus::SteadyState
        } else {
            MonitorStatus::Running
        };
        self.status
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for ConvergenceMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl InspectionHook for ConvergenceMonitor {
    fn on_tick_end(&mut self, report: &TickReport, _body: &SoftBody) {
        if report.reset_applied {
            self.reset();
        }
        if report.success {
            self.observe(&report.stats);
        }
    }

    fn name(&self) -> &str {
        "convergence_monitor"
    }
}
