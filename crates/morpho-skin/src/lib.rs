//! # morpho-skin
//!
//! Binds a high-resolution render mesh to the boundary vertices of a
//! simulation mesh and reconstructs the render mesh every tick.
//!
//! ## Key Types
//!
//! - [`KdTree`] — Static 3-d tree for k-nearest queries over effector rest positions
//! - [`SkinBinding`] — Per render vertex: K effectors, local offsets, normalized weights
//! - [`BindReport`] — How many render vertices came up short of K effectors

pub mod binding;
pub mod kdtree;

pub use binding::{BindReport, SkinBinding, SkinInfluence};
pub use kdtree::KdTree;
