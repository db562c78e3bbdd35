//! Per-vertex spring-constant overrides.
//!
//! Each of the four spring families can carry a per-vertex array that
//! replaces the global scalar. Arrays are allocated on first use, filled
//! with the scalar current at that moment, and kept from then on; enabling
//! or disabling a family only toggles whether the force model consults it.
//!
//! Where several vertices take part in one force term (an edge, a face, a
//! tet) and their values differ, the largest value is used.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::constraints::VertexSelector;

/// The four spring-constant families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringFamily {
    Volume,
    Area,
    Distance,
    Damping,
}

impl SpringFamily {
    pub const ALL: [SpringFamily; 4] = [Self::Volume, Self::Area, Self::Distance, Self::Damping];

    #[inline]
    fn slot(self) -> usize {
        match self {
            Self::Volume => 0,
            Self::Area => 1,
            Self::Distance => 2,
            Self::Damping => 3,
        }
    }

    /// The global scalar for this family.
    pub fn scalar(self, config: &SimulationConfig) -> f32 {
        match self {
            Self::Volume => config.k_volume,
            Self::Area => config.k_area,
            Self::Distance => config.k_distance,
            Self::Damping => config.k_damping,
        }
    }
}

/// A request to set one family's value on a set of vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeterogeneousAssignment {
    pub family: SpringFamily,
    pub vertices: VertexSelector,
    pub value: f32,
}

/// Per-vertex override arrays for the four spring families.
#[derive(Debug, Clone, PartialEq)]
pub struct HeterogeneousConstants {
    vertex_count: usize,
    arrays: [Option<Vec<f32>>; 4],
    enabled: [bool; 4],
}

impl HeterogeneousConstants {
    /// No arrays allocated, every family disabled.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            arrays: [None, None, None, None],
            enabled: [false; 4],
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Start consulting `family`, allocating its array at `scalar` if needed.
    ///
    /// An array that already exists is not re-defaulted: values assigned
    /// before a `disable` survive the next `enable`.
    pub fn enable(&mut self, family: SpringFamily, scalar: f32) {
        self.ensure(family, scalar);
        self.enabled[family.slot()] = true;
    }

    /// Stop consulting `family`. Its values are kept.
    pub fn disable(&mut self, family: SpringFamily) {
        self.enabled[family.slot()] = false;
    }

    #[inline]
    pub fn is_enabled(&self, family: SpringFamily) -> bool {
        self.enabled[family.slot()]
    }

    /// Whether `family` has an array, enabled or not.
    #[inline]
    pub fn is_allocated(&self, family: SpringFamily) -> bool {
        self.arrays[family.slot()].is_some()
    }

    /// The array of `family` when it is enabled.
    #[inline]
    pub fn values(&self, family: SpringFamily) -> Option<&[f32]> {
        if self.is_enabled(family) {
            self.arrays[family.slot()].as_deref()
        } else {
            None
        }
    }

    /// Set `value` on the selected vertices, allocating the array at
    /// `scalar` first if needed. Returns the number of out-of-range indices
    /// skipped.
    pub fn assign(
        &mut self,
        family: SpringFamily,
        vertices: &VertexSelector,
        value: f32,
        scalar: f32,
    ) -> usize {
        let n = self.vertex_count;
        let array = self.ensure(family, scalar);
        let skipped = vertices.for_each(n, |v| array[v] = value);
        if skipped > 0 {
            tracing::warn!(?family, skipped, "heterogeneous assignment references out-of-range vertices");
        }
        skipped
    }

    /// The constant for a single vertex.
    #[inline]
    pub fn vertex(&self, family: SpringFamily, scalar: f32, v: usize) -> f32 {
        match self.values(family) {
            Some(values) => values[v],
            None => scalar,
        }
    }

    /// The largest constant among `vertices`.
    #[inline]
    pub fn max_over(&self, family: SpringFamily, scalar: f32, vertices: &[u32]) -> f32 {
        match self.values(family) {
            Some(values) => vertices
                .iter()
                .map(|&v| values[v as usize])
                .fold(f32::NEG_INFINITY, f32::max),
            None => scalar,
        }
    }

    /// Copy arrays and toggles from `other` when the vertex counts match.
    /// Returns whether anything was copied.
    pub fn carry_from(&mut self, other: &HeterogeneousConstants) -> bool {
        if other.vertex_count != self.vertex_count {
            return false;
        }
        self.arrays = other.arrays.clone();
        self.enabled = other.enabled;
        true
    }

    fn ensure(&mut self, family: SpringFamily, scalar: f32) -> &mut Vec<f32> {
        let n = self.vertex_count;
        self.arrays[family.slot()].get_or_insert_with(|| vec![scalar; n])
    }
}
