//! Parametric mesh generation.
//!
//! All generators return CPU-side [`MeshData`](crate::data_structures::mesh::MeshData)
//! with positions, outward normals, texture coordinates and a CCW triangle
//! index list. The scene is Y-up.

pub mod primitives;

pub use primitives::{cuboid, cylinder, lathe, plane, sphere};
