//! Core data types for scene representation:
//!
//! - `mesh` contains CPU mesh data and its GPU buffer counterpart
//! - `material` describes surface appearance (flat color or texture slot)
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `transform` holds position/rotation/scale and the raw GPU form
//! - `scene_graph` enables hierarchical scene organization

pub mod material;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
pub mod transform;
