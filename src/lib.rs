//! hearth
//!
//! A static kitchen and dining interior rendered with wgpu. The scene graph,
//! parametric geometry and texture registry are plain CPU data, so scene
//! assembly is testable without a GPU; the renderer uploads meshes lazily
//! and swaps placeholder textures for real ones as async decodes complete.
//!
//! High-level modules
//! - `app`: winit event loop, frame driver and async asset delivery
//! - `camera`: orbit camera, projection and their uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, materials, transforms and the scene graph
//! - `fixtures`: parametric ceiling fan and lamp generators
//! - `geometry`: primitive mesh generation (plane, cuboid, sphere, cylinder, lathe)
//! - `interior`: the assembled scene, its lights and texture slots
//! - `pipelines`: scene, background and light GPU plumbing
//! - `render`: per-frame batching and draw submission
//! - `resources`: asset IO, OBJ/MTL loading and the texture registry

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod fixtures;
pub mod geometry;
pub mod interior;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use interior::InteriorScene;
