//! gallery-room
//!
//! A small virtual gallery: a textured box room with paintings on its walls and
//! window frames cut into them, seen through a camera that drifts with the
//! mouse and steps with the arrow keys. Runs natively and in the browser.
//!
//! High-level modules
//! - `config`: everything that describes the room, read once at startup
//! - `scene`: builds the room's objects and lights from the configuration
//! - `camera`: camera, projection, uniforms and the input controller
//! - `gallery`: the controller owning scene and camera, driven by a host
//! - `host`: the surface the gallery is mounted on (window or headless)
//! - `context`: GPU device, queue, surface and shared resources
//! - `data_structures`: geometry, GPU models, textures, instances, the scene graph
//! - `pipelines`: the unlit render pipelines and the light uniform
//! - `resources`: asset loading and scene upload
//! - `render`: batching of the uploaded scene per pipeline
//! - `flow`: the winit event loop tying it together
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gallery;
pub mod host;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use config::GalleryConfig;
pub use flow::run;
pub use gallery::Gallery;
pub use host::{HeadlessHost, HostSurface, InputEvent, KeyPress, Listener, Viewport};
pub use winit::dpi::{PhysicalPosition, PhysicalSize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(GalleryConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
