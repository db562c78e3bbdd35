//! Per-vertex mass assignment.
//!
//! Runs once, after the rest volumes are known and before the first force
//! evaluation.

use crate::config::MassStrategy;

/// Fill `masses` according to `strategy`.
///
/// `tets` and `rest_volumes` must describe the surviving tets. Vertices not
/// referenced by any tet get zero mass under the volume-based strategies and
/// therefore stay pinned.
pub fn assign_masses(
    strategy: MassStrategy,
    constant: f32,
    tets: &[[u32; 4]],
    rest_volumes: &[f32],
    masses: &mut [f32],
) {
    match strategy {
        MassStrategy::FixedVertexMass => masses.fill(constant),
        MassStrategy::FixedTetDensity => spread_density(constant, tets, rest_volumes, masses),
        MassStrategy::FixedTotalMass => {
            let total_volume: f32 = rest_volumes.iter().map(|v| v.abs()).sum();
            let density = if total_volume > 0.0 {
                constant / total_volume
            } else {
                0.0
            };
            spread_density(density, tets, rest_volumes, masses);
        }
    }
}

fn spread_density(density: f32, tets: &[[u32; 4]], rest_volumes: &[f32], masses: &mut [f32]) {
    masses.fill(0.0);
    for (tet, &volume) in tets.iter().zip(rest_volumes) {
        let share = volume.abs() * density / 4.0;
        for &v in tet {
            masses[v as usize] += share;
        }
    }
}
