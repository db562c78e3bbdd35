//! # morpho-mesh
//!
//! Tetrahedral simulation meshes and their connectivity.
//!
//! ## Key Types
//!
//! - [`TetMesh`] — Raw simulation input: SoA vertex positions, a flat tet
//!   index buffer, and optional per-vertex boundary markers.
//! - [`RenderMesh`] — High-resolution triangle mesh driven by skinning.
//! - [`Connectivity`] — Deduplicated faces/edges and CSR-style per-vertex
//!   adjacency derived from the tet list.
//! - Procedural generators for tests and benchmarks.

pub mod connectivity;
pub mod generators;
pub mod mesh;

pub use connectivity::{AdjacencyRange, Connectivity, ConnectivityReport, TetIncidence};
pub use mesh::{RenderMesh, TetMesh};
