//! Render pipelines and their uniform plumbing.

pub mod background;
pub mod basic;
pub mod light;
