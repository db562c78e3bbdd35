//! Thread-shared handles.
//!
//! One thread drives `tick()`; other threads push external forces, request
//! resets, and read the latest published positions through these handles.
//! Every handle is a cheap `Clone` of an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use morpho_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constraints::VertexSelector;

/// A force applied to a set of vertices for as long as it stays in the
/// external force list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalForce {
    pub force: Vec3,
    pub vertices: VertexSelector,
}

/// Mutex-guarded external force list, read once per tick.
#[derive(Debug, Clone, Default)]
pub struct ExternalForceHandle {
    inner: Arc<Mutex<Vec<ExternalForce>>>,
}

impl ExternalForceHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list.
    pub fn set(&self, forces: Vec<ExternalForce>) {
        *self.lock() = forces;
    }

    pub fn push(&self, force: ExternalForce) {
        self.lock().push(force);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Run `f` with the list held.
    pub fn with<R>(&self, f: impl FnOnce(&[ExternalForce]) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ExternalForce>> {
        // A panicking writer leaves a valid Vec behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deferred reset request, consumed at the start of the next tick.
#[derive(Debug, Clone, Default)]
pub struct ResetHandle {
    pending: Arc<AtomicBool>,
}

impl ResetHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Positions and normals as of the end of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicSnapshot {
    pub tick: u64,
    pub time: f32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// The latest published [`KinematicSnapshot`], readable from any thread.
#[derive(Debug, Clone, Default)]
pub struct SharedKinematics {
    inner: Arc<RwLock<KinematicSnapshot>>,
}

impl SharedKinematics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot in place, reusing its allocations.
    pub fn publish(&self, tick: u64, time: f32, positions: &[Vec3], normals: &[Vec3]) {
        let mut snap = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        snap.tick = tick;
        snap.time = time;
        snap.positions.clear();
        snap.positions.extend_from_slice(positions);
        snap.normals.clear();
        snap.normals.extend_from_slice(normals);
    }

    /// Clone the current snapshot.
    pub fn snapshot(&self) -> KinematicSnapshot {
        self.read(|s| s.clone())
    }

    /// Run `f` against the current snapshot without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&KinematicSnapshot) -> R) -> R {
        let snap = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&snap)
    }
}
