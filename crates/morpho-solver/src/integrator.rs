//! Time integration.
//!
//! [`VerletIntegrator`] is position Verlet over the current/previous buffer
//! pair: `next = 2·current − previous + (dt² / m)·F`. The result is written
//! over the previous buffer, which then becomes current.

use morpho_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::state::{VertexAttributes, VertexBuffers};

/// Per-tick motion statistics, consumed by convergence monitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceStats {
    /// Largest `|next − current|` over all vertices.
    pub max_displacement: f32,
    /// Mean `|next − current|`.
    pub mean_displacement: f32,
    /// Largest change in reporting velocity since the previous tick.
    pub max_velocity_delta: f32,
    /// Mean change in reporting velocity.
    pub mean_velocity_delta: f32,
}

impl ConvergenceStats {
    /// True when no statistic is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.max_displacement.is_finite()
            && self.mean_displacement.is_finite()
            && self.max_velocity_delta.is_finite()
            && self.mean_velocity_delta.is_finite()
    }
}

/// Trait for explicit time integrators.
///
/// ```text
/// forces.accumulate_forces(buffers.current_mut(), ...);
/// let stats = integrator.step(&mut buffers, &attrs, dt);
/// ```
pub trait Integrator: Send {
    /// Advance every vertex by one step and swap the buffers.
    ///
    /// Reads the force accumulated into the current buffer. Leaves the new
    /// current buffer's force zeroed.
    fn step(&mut self, buffers: &mut VertexBuffers, attrs: &VertexAttributes, dt: f32) -> ConvergenceStats;

    /// Returns the integrator's name.
    fn name(&self) -> &str;
}

/// Position Verlet with a reporting-only central-difference velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerletIntegrator;

impl VerletIntegrator {
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for VerletIntegrator {
    fn step(&mut self, buffers: &mut VertexBuffers, attrs: &VertexAttributes, dt: f32) -> ConvergenceStats {
        let n = buffers.vertex_count();
        let dt2 = dt * dt;
        let inv_2dt = 1.0 / (2.0 * dt);

        let (cur, prev) = buffers.split_mut();
        let mut stats = ConvergenceStats::default();
        let mut sum_disp = 0.0f64;
        let mut sum_dvel = 0.0f64;

        for v in 0..n {
            let c = cur.position[v];
            let p = prev.position[v];
            let mass = attrs.mass[v];

            let next = if attrs.is_position_locked(v) {
                attrs.lock_target[v]
            } else if mass <= 0.0 {
                c
            } else {
                2.0 * c - p + (dt2 / mass) * cur.force[v]
            };

            let velocity = (next - p) * inv_2dt;
            let disp = (next - c).length();
            let dvel = (velocity - cur.velocity[v]).length();

            stats.max_displacement = stats.max_displacement.max(disp);
            stats.max_velocity_delta = stats.max_velocity_delta.max(dvel);
            sum_disp += disp as f64;
            sum_dvel += dvel as f64;

            prev.position[v] = next;
            prev.velocity[v] = velocity;
            prev.force[v] = Vec3::ZERO;
        }

        if n > 0 {
            stats.mean_displacement = (sum_disp / n as f64) as f32;
            stats.mean_velocity_delta = (sum_dvel / n as f64) as f32;
        }
        // f32::max drops NaN; surface it so monitors can see divergence.
        if !sum_disp.is_finite() {
            stats.max_displacement = f32::NAN;
        }
        if !sum_dvel.is_finite() {
            stats.max_velocity_delta = f32::NAN;
        }

        buffers.swap();
        stats
    }

    fn name(&self) -> &str {
        "verlet"
    }
}
