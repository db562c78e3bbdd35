//! Input validation.
//!
//! Validates simulation inputs before the solver receives them, catching
//! data-level errors early with clear diagnostics. Problems the solver
//! tolerates at runtime (out-of-range vertex indices, which it skips) are
//! reported as warnings instead of errors.

use morpho_math::Vec3;
use morpho_solver::{ConstraintPayload, VertexSelector};
use morpho_types::{MorphoError, MorphoResult};

use crate::contract::SimulationInput;

/// Non-fatal findings from [`validate_input`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validates a complete simulation input.
///
/// Checks:
/// - Simulation mesh integrity (SoA consistency, valid indices, markers)
/// - Render mesh integrity (if present)
/// - Solver configuration
/// - Duration, constraint windows and payloads, override values
pub fn validate_input(input: &SimulationInput) -> MorphoResult<ValidationReport> {
    input
        .mesh
        .validate()
        .map_err(|e| MorphoError::InvalidMesh(format!("Simulation mesh: {e}")))?;
    if input.mesh.tet_count() == 0 {
        return Err(MorphoError::InvalidMesh("Simulation mesh has no tets".into()));
    }

    if let Some(ref render) = input.render {
        render
            .validate()
            .map_err(|e| MorphoError::InvalidMesh(format!("Render mesh: {e}")))?;
    }

    input.config.validate()?;

    if !input.duration.is_finite() || input.duration <= 0.0 {
        return Err(MorphoError::InvalidConfig(format!(
            "Duration must be positive and finite, got {}",
            input.duration
        )));
    }

    let n = input.mesh.vertex_count();
    let mut report = ValidationReport::default();

    for (i, constraint) in input.constraints.iter().enumerate() {
        constraint
            .validate()
            .map_err(|e| MorphoError::InvalidConstraint(format!("constraint {i}: {e}")))?;
        if constraint.start_time >= input.duration {
            report
                .warnings
                .push(format!("constraint {i} starts at or after the end of the run"));
        }
        if matches!(constraint.payload, ConstraintPayload::Force(f) if f == Vec3::ZERO) {
            report.warnings.push(format!("constraint {i} applies a zero force"));
        }
        check_selector(&constraint.vertices, n, &format!("constraint {i}"), &mut report);
    }

    for (i, assignment) in input.heterogeneous.iter().enumerate() {
        if !assignment.value.is_finite() || assignment.value < 0.0 {
            return Err(MorphoError::InvalidConfig(format!(
                "heterogeneous assignment {i}: value must be non-negative and finite, got {}",
                assignment.value
            )));
        }
        if !input.enabled_families.contains(&assignment.family) {
            report.warnings.push(format!(
                "heterogeneous assignment {i}: {:?} is never enabled",
                assignment.family
            ));
        }
        check_selector(&assignment.vertices, n, &format!("heterogeneous assignment {i}"), &mut report);
    }

    for (i, force) in input.external_forces.iter().enumerate() {
        if !force.force.is_finite() {
            return Err(MorphoError::InvalidConfig(format!("external force {i} is not finite")));
        }
        check_selector(&force.vertices, n, &format!("external force {i}"), &mut report);
    }

    for warning in &report.warnings {
        tracing::warn!(%warning, "input validation");
    }
    Ok(report)
}

fn check_selector(selector: &VertexSelector, vertex_count: usize, what: &str, report: &mut ValidationReport) {
    if let VertexSelector::Explicit(indices) = selector {
        let out_of_range = indices.iter().filter(|&&v| v as usize >= vertex_count).count();
        if out_of_range > 0 {
            report.warnings.push(format!(
                "{what}: {out_of_range} vertex indices out of range (vertex count {vertex_count}), they will be skipped"
            ));
        }
        if indices.is_empty() {
            report.warnings.push(format!("{what}: empty vertex list"));
        }
    }
}
