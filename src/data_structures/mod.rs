//! Gallery data structures: geometry, GPU models, textures, the scene and instances.
//!
//! - `geometry` generates box, plane and extruded vertex data on the CPU
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `scene_graph` holds the objects and lights that make up the room

pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
