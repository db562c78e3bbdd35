//! Simulation state — per-vertex kinematic buffers and attributes.
//!
//! Two full kinematic buffers exist, "current" and "previous". Each tick the
//! integrator writes the next positions into the previous buffer and the
//! roles are swapped; nothing is copied.
//!
//! Attributes that do not take part in the swap (mass, normals, lock state)
//! live in [`VertexAttributes`].

use morpho_math::Vec3;

/// One kinematic buffer: position, reporting velocity, force accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBuffer {
    pub position: Vec<Vec3>,
    pub velocity: Vec<Vec3>,
    pub force: Vec<Vec3>,
}

impl KinematicBuffer {
    /// A buffer at `positions` with zero velocity and force.
    pub fn at_rest(positions: &[Vec3]) -> Self {
        let n = positions.len();
        Self {
            position: positions.to_vec(),
            velocity: vec![Vec3::ZERO; n],
            force: vec![Vec3::ZERO; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// The current/previous buffer pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffers {
    buffers: [KinematicBuffer; 2],
    current: usize,
}

impl VertexBuffers {
    /// Both buffers equal to the rest pose, zero velocity.
    pub fn at_rest(positions: &[Vec3]) -> Self {
        Self {
            buffers: [
                KinematicBuffer::at_rest(positions),
                KinematicBuffer::at_rest(positions),
            ],
            current: 0,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.buffers[0].len()
    }

    #[inline]
    pub fn current(&self) -> &KinematicBuffer {
        &self.buffers[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut KinematicBuffer {
        &mut self.buffers[self.current]
    }

    #[inline]
    pub fn previous(&self) -> &KinematicBuffer {
        &self.buffers[1 - self.current]
    }

    /// Mutable access to `(current, previous)` at once.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut KinematicBuffer, &mut KinematicBuffer) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Swap buffer roles. O(1).
    #[inline]
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Total kinetic energy from the reporting velocities: 0.5 · Σ m_i · |v_i|².
    pub fn kinetic_energy(&self, mass: &[f32]) -> f64 {
        let cur = self.current();
        cur.velocity
            .iter()
            .zip(mass)
            .map(|(v, &m)| 0.5 * m as f64 * v.length_squared() as f64)
            .sum()
    }
}

/// Per-vertex data outside the swapped buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttributes {
    /// Unit outward normal (zero for interior vertices).
    pub normal: Vec<Vec3>,
    /// Vertex mass. Non-positive mass pins the vertex in place.
    pub mass: Vec<f32>,
    /// Sum of the payloads of all active force constraints on the vertex.
    pub constraint_force: Vec<Vec3>,
    /// Number of active position constraints covering the vertex.
    pub position_locks: Vec<u32>,
    /// Number of active force constraints covering the vertex.
    pub force_locks: Vec<u32>,
    /// Where a position-locked vertex is held.
    pub lock_target: Vec<Vec3>,
    /// Boundary flag from the mesh provider's markers or the surface faces.
    pub boundary: Vec<bool>,
}

impl VertexAttributes {
    /// Zeroed attributes for `n` vertices with the given boundary flags.
    pub fn new(n: usize, boundary: Vec<bool>) -> Self {
        Self {
            normal: vec![Vec3::ZERO; n],
            mass: vec![0.0; n],
            constraint_force: vec![Vec3::ZERO; n],
            position_locks: vec![0; n],
            force_locks: vec![0; n],
            lock_target: vec![Vec3::ZERO; n],
            boundary,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mass.len()
    }

    #[inline]
    pub fn is_position_locked(&self, v: usize) -> bool {
        self.position_locks[v] > 0
    }

    /// Drops all constraint bookkeeping.
    pub fn clear_constraint_state(&mut self) {
        self.constraint_force.fill(Vec3::ZERO);
        self.position_locks.fill(0);
        self.force_locks.fill(0);
        self.lock_target.fill(Vec3::ZERO);
    }
}
