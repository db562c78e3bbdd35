//! Debug markers shared between the simulation and an observer.
//!
//! Any thread holding a clone can drop points or flag vertices; a viewer or
//! a test reads them back. Markers never influence the simulation.

use std::sync::{Arc, Mutex, MutexGuard};

use morpho_math::Vec3;

/// The marker payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    /// Free-standing points in world space.
    pub points: Vec<Vec3>,
    /// Flagged simulation vertex indices.
    pub vertices: Vec<u32>,
}

/// Mutex-guarded marker set. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct DebugMarkers {
    inner: Arc<Mutex<MarkerSet>>,
}

impl DebugMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MarkerSet> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_point(&self, point: Vec3) {
        self.lock().points.push(point);
    }

    /// Flag a vertex. Already-flagged vertices are not duplicated.
    pub fn mark_vertex(&self, vertex: u32) {
        let mut set = self.lock();
        if !set.vertices.contains(&vertex) {
            set.vertices.push(vertex);
        }
    }

    pub fn clear(&self) {
        let mut set = self.lock();
        set.points.clear();
        set.vertices.clear();
    }

    /// Run `f` with the marker set locked.
    pub fn with<R>(&self, f: impl FnOnce(&MarkerSet) -> R) -> R {
        f(&self.lock())
    }

    /// Copy of the current markers.
    pub fn snapshot(&self) -> MarkerSet {
        self.lock().clone()
    }
}
