//! Benchmark scenarios — procedural tet mesh + constraints + config.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Tet drop** — A voxel block falls onto the floor and settles
//! 2. **Cantilever** — A beam locked at one end sags under gravity
//! 3. **Squash** — A block on the floor is pressed from above, then released

use morpho_io::SimulationInput;
use morpho_math::Vec3;
use morpho_mesh::generators::{box_surface, tet_box};
use morpho_solver::{Constraint, HeterogeneousAssignment, SimulationConfig, SpringFamily, VertexSelector};
use serde::{Deserialize, Serialize};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Block dropped onto the floor.
    TetDrop,
    /// Beam locked at one end.
    Cantilever,
    /// Block squashed by a timed force.
    Squash,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[ScenarioKind::TetDrop, ScenarioKind::Cantilever, ScenarioKind::Squash]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::TetDrop => "tet_drop",
            ScenarioKind::Cantilever => "cantilever",
            ScenarioKind::Squash => "squash",
        }
    }

    /// Parses a name produced by [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Mesh, constraints, overrides, config and duration.
    pub input: SimulationInput,
}

impl Scenario {
    /// Create the tet drop scenario.
    ///
    /// A 0.3 m cube at 3×3×3 voxels (162 tets) starting 0.5 m above the
    /// floor, with a skinned box surface, for 1 second.
    pub fn tet_drop() -> Self {
        let origin = Vec3::new(0.0, 0.5, 0.0);
        let size = Vec3::splat(0.3);
        let mesh = tet_box(3, 3, 3, size, origin);

        let mut input = SimulationInput::new(mesh, SimulationConfig::default(), 1.0);
        input.render = Some(box_surface(origin, origin + size));
        Self {
            kind: ScenarioKind::TetDrop,
            input,
        }
    }

    /// Create the cantilever scenario.
    ///
    /// A 1 m × 0.2 m × 0.2 m beam at 8×2×2 voxels, 1 m above the floor,
    /// with the x = 0 face locked for the whole run.
    pub fn cantilever() -> Self {
        let (cols, rows, layers) = (8, 2, 2);
        let mesh = tet_box(cols, rows, layers, Vec3::new(1.0, 0.2, 0.2), Vec3::new(0.0, 1.0, 0.0));

        // x fastest: the x = 0 face is every (cols + 1)-th vertex
        let root: Vec<u32> = (0..mesh.vertex_count() as u32)
            .step_by(cols + 1)
            .collect();

        let duration = 1.0;
        let mut input = SimulationInput::new(mesh, SimulationConfig::default(), duration);
        input
            .constraints
            .push(Constraint::lock(0.0, duration, VertexSelector::Explicit(root)));
        Self {
            kind: ScenarioKind::Cantilever,
            input,
        }
    }

    /// Create the squash scenario.
    ///
    /// A 0.4 m cube at 4×4×4 voxels resting on the floor. The top layer is
    /// pushed down for the first half second, then released. The bottom
    /// layer carries stiffer distance springs.
    pub fn squash() -> Self {
        let n = 4;
        let mesh = tet_box(n, n, n, Vec3::splat(0.4), Vec3::ZERO);
        let side = n + 1;

        // y is the middle index: vertex = i + side·(j + side·k)
        let layer = |j: usize| -> Vec<u32> {
            (0..side)
                .flat_map(|k| (0..side).map(move |i| (i + side * (j + side * k)) as u32))
                .collect()
        };

        let mut input = SimulationInput::new(mesh, SimulationConfig::default(), 1.0);
        input.constraints.push(Constraint::force(
            0.0,
            0.5,
            VertexSelector::Explicit(layer(n)),
            Vec3::new(0.0, -20.0, 0.0),
        ));
        input.heterogeneous.push(HeterogeneousAssignment {
            family: SpringFamily::Distance,
            vertices: VertexSelector::Explicit(layer(0)),
            value: 2000.0,
        });
        input.enabled_families.push(SpringFamily::Distance);
        Self {
            kind: ScenarioKind::Squash,
            input,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::TetDrop => Self::tet_drop(),
            ScenarioKind::Cantilever => Self::cantilever(),
            ScenarioKind::Squash => Self::squash(),
        }
    }

    /// Shorten or lengthen the run.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.input.duration = duration;
        self
    }

    /// Ticks the runner will execute.
    pub fn tick_count(&self) -> u64 {
        self.input.tick_count()
    }
}
