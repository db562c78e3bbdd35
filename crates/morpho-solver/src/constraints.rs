//! Time-windowed constraints.
//!
//! A constraint is active exactly while the simulation time lies in
//! `[start_time, end_time)`. The scheduler keeps two index lists over the
//! same constraint set, one sorted by start time and one by end time, and
//! walks a cursor along each as time advances. Lock counts are reference
//! counted so overlapping constraints on a vertex release it only when the
//! last one ends.

use morpho_math::Vec3;
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

use crate::state::VertexAttributes;

/// Which vertices a constraint, force, or assignment applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexSelector {
    /// Every vertex of the body.
    All,
    /// An explicit index list. Out-of-range entries are skipped.
    Explicit(Vec<u32>),
}

impl VertexSelector {
    /// Calls `f` for every selected index below `vertex_count` and returns
    /// how many explicit indices were out of range.
    pub fn for_each(&self, vertex_count: usize, mut f: impl FnMut(usize)) -> usize {
        match self {
            Self::All => {
                (0..vertex_count).for_each(f);
                0
            }
            Self::Explicit(indices) => {
                let mut skipped = 0;
                for &v in indices {
                    if (v as usize) < vertex_count {
                        f(v as usize);
                    } else {
                        skipped += 1;
                    }
                }
                skipped
            }
        }
    }

    /// Number of selected vertices, ignoring range checks.
    pub fn len(&self, vertex_count: usize) -> usize {
        match self {
            Self::All => vertex_count,
            Self::Explicit(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self, vertex_count: usize) -> bool {
        self.len(vertex_count) == 0
    }
}

/// What a constraint does while active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintPayload {
    /// Adds a constant force to each selected vertex.
    Force(Vec3),
    /// Freezes each selected vertex where it was at activation.
    Lock,
    /// Holds each selected vertex at the given position.
    Target(Vec3),
}

impl ConstraintPayload {
    #[inline]
    pub fn is_position(&self) -> bool {
        !matches!(self, Self::Force(_))
    }
}

/// A constraint record, owned by the scheduler once added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub start_time: f32,
    pub end_time: f32,
    pub vertices: VertexSelector,
    pub payload: ConstraintPayload,
}

impl Constraint {
    pub fn force(start_time: f32, end_time: f32, vertices: VertexSelector, force: Vec3) -> Self {
        Self {
            start_time,
            end_time,
            vertices,
            payload: ConstraintPayload::Force(force),
        }
    }

    pub fn lock(start_time: f32, end_time: f32, vertices: VertexSelector) -> Self {
        Self {
            start_time,
            end_time,
            vertices,
            payload: ConstraintPayload::Lock,
        }
    }

    pub fn target(start_time: f32, end_time: f32, vertices: VertexSelector, target: Vec3) -> Self {
        Self {
            start_time,
            end_time,
            vertices,
            payload: ConstraintPayload::Target(target),
        }
    }

    /// Checks finite times, `start_time <= end_time`, and a finite payload.
    /// `end_time` may be `f32::INFINITY` for an open-ended constraint.
    pub fn validate(&self) -> MorphoResult<()> {
        if !self.start_time.is_finite() || self.end_time.is_nan() {
            return Err(MorphoError::InvalidConstraint(format!(
                "Constraint window [{}, {}) is not finite",
                self.start_time, self.end_time
            )));
        }
        if self.start_time > self.end_time {
            return Err(MorphoError::InvalidConstraint(format!(
                "Constraint starts at {} after it ends at {}",
                self.start_time, self.end_time
            )));
        }
        match self.payload {
            ConstraintPayload::Force(v) | ConstraintPayload::Target(v) if !v.is_finite() => Err(
                MorphoError::InvalidConstraint("Constraint payload is not finite".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Lifecycle of one constraint. Transitions are monotonic until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintState {
    Pending,
    Active,
    Ended,
}

/// What one [`ConstraintScheduler::advance`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub activated: usize,
    pub ended: usize,
    /// Out-of-range vertex indices skipped during activation.
    pub skipped_indices: usize,
}

/// Activates and deactivates constraints as simulation time advances.
#[derive(Debug, Clone, Default)]
pub struct ConstraintScheduler {
    constraints: Vec<Constraint>,
    states: Vec<ConstraintState>,
    by_start: Vec<usize>,
    by_end: Vec<usize>,
    start_cursor: usize,
    end_cursor: usize,
    last_time: Option<f32>,
}

impl ConstraintScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constraints held, in any state.
    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// All constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// State of constraint `i` (insertion order).
    pub fn state(&self, i: usize) -> Option<ConstraintState> {
        self.states.get(i).copied()
    }

    /// Number of currently active constraints.
    pub fn active_count(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == ConstraintState::Active)
            .count()
    }

    /// Validate and add a constraint. It takes effect at the next
    /// [`advance`](Self::advance), even if its window already started.
    pub fn add(&mut self, constraint: Constraint) -> MorphoResult<()> {
        constraint.validate()?;

        let start = constraint.start_time;
        let end = constraint.end_time;
        let constraints = &self.constraints;

        let start_pos = self
            .by_start
            .partition_point(|&i| constraints[i].start_time <= start)
            .max(self.start_cursor);
        let end_pos = self
            .by_end
            .partition_point(|&i| constraints[i].end_time <= end)
            .max(self.end_cursor);

        let index = self.constraints.len();
        self.constraints.push(constraint);
        self.states.push(ConstraintState::Pending);
        self.by_start.insert(start_pos, index);
        self.by_end.insert(end_pos, index);
        Ok(())
    }

    /// Process every start and end boundary at or before `time`.
    ///
    /// Starts are processed before ends, so a zero-length window activates
    /// and ends in the same call. A `time` earlier than the previous call is
    /// ignored.
    pub fn advance(
        &mut self,
        time: f32,
        attrs: &mut VertexAttributes,
        positions: &[Vec3],
    ) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        if let Some(last) = self.last_time {
            if time < last {
                tracing::warn!(time, last, "constraint time moved backwards, ignoring");
                return report;
            }
        }
        self.last_time = Some(time);

        let n = attrs.vertex_count();

        while let Some(&i) = self.by_start.get(self.start_cursor) {
            if self.constraints[i].start_time > time {
                break;
            }
            self.start_cursor += 1;
            if self.states[i] != ConstraintState::Pending {
                continue;
            }
            let skipped = activate(&self.constraints[i], attrs, positions, n);
            if skipped > 0 {
                tracing::warn!(constraint = i, skipped, "constraint references out-of-range vertices");
                report.skipped_indices += skipped;
            }
            self.states[i] = ConstraintState::Active;
            report.activated += 1;
        }

        while let Some(&i) = self.by_end.get(self.end_cursor) {
            if self.constraints[i].end_time > time {
                break;
            }
            self.end_cursor += 1;
            if self.states[i] == ConstraintState::Active {
                deactivate(&self.constraints[i], attrs, n);
                report.ended += 1;
            }
            self.states[i] = ConstraintState::Ended;
        }

        if report.activated + report.ended > 0 {
            tracing::debug!(time, activated = report.activated, ended = report.ended, "constraints advanced");
        }
        report
    }

    /// Rewind both cursors and mark every constraint pending again. Clears
    /// all lock counts and constraint forces in `attrs`.
    pub fn reset(&mut self, attrs: &mut VertexAttributes) {
        self.start_cursor = 0;
        self.end_cursor = 0;
        self.last_time = None;
        self.states.fill(ConstraintState::Pending);
        attrs.clear_constraint_state();
    }

    /// Deactivate active constraints and drop every constraint.
    pub fn clear(&mut self, attrs: &mut VertexAttributes) {
        let n = attrs.vertex_count();
        for (c, state) in self.constraints.iter().zip(&self.states) {
            if *state == ConstraintState::Active {
                deactivate(c, attrs, n);
            }
        }
        let last_time = self.last_time;
        *self = Self::default();
        self.last_time = last_time;
    }
}

fn activate(c: &Constraint, attrs: &mut VertexAttributes, positions: &[Vec3], n: usize) -> usize {
    match c.payload {
        ConstraintPayload::Force(f) => c.vertices.for_each(n, |v| {
            attrs.force_locks[v] += 1;
            attrs.constraint_force[v] += f;
        }),
        ConstraintPayload::Lock => c.vertices.for_each(n, |v| {
            attrs.position_locks[v] += 1;
            attrs.lock_target[v] = positions[v];
        }),
        ConstraintPayload::Target(target) => c.vertices.for_each(n, |v| {
            attrs.position_locks[v] += 1;
            attrs.lock_target[v] = target;
        }),
    }
}

fn deactivate(c: &Constraint, attrs: &mut VertexAttributes, n: usize) {
    match c.payload {
        ConstraintPayload::Force(f) => {
            c.vertices.for_each(n, |v| {
                attrs.force_locks[v] = attrs.force_locks[v].saturating_sub(1);
                if attrs.force_locks[v] == 0 {
                    attrs.constraint_force[v] = Vec3::ZERO;
                } else {
                    attrs.constraint_force[v] -= f;
                }
            });
        }
        ConstraintPayload::Lock | ConstraintPayload::Target(_) => {
            c.vertices.for_each(n, |v| {
                attrs.position_locks[v] = attrs.position_locks[v].saturating_sub(1);
            });
        }
    }
}
