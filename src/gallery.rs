//! The gallery controller.
//!
//! [`Gallery`] owns the scene and the camera and reacts to input. It does not
//! own any GPU state and never touches a window directly: all of that goes
//! through the [`HostSurface`] it is handed, which keeps it drivable from tests.

use winit::dpi::PhysicalSize;

use crate::{
    camera::{Camera, CameraController},
    config::GalleryConfig,
    data_structures::scene_graph::Scene,
    host::{HostSurface, InputEvent, Listener},
    scene::build_scene,
};

#[derive(Debug)]
pub struct Gallery {
    scene: Scene,
    camera: Camera,
    controller: CameraController,
    mounted: bool,
}

impl Gallery {
    /// Builds the room and places the camera at its starting pose for a
    /// window of `size`.
    pub fn new(config: &GalleryConfig, size: PhysicalSize<u32>) -> Self {
        Self {
            scene: build_scene(config),
            camera: Camera::from_config(&config.camera, size.width.max(1), size.height.max(1)),
            controller: CameraController::new(&config.camera),
            mounted: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Registers the input listeners, sizes the surface to the window and
    /// starts the render loop. Mounting twice is a no-op.
    pub fn mount(&mut self, host: &mut impl HostSurface) {
        if self.mounted {
            return;
        }
        for listener in Listener::ALL {
            host.add_listener(listener);
        }
        let size = host.window_size();
        self.apply_size(host, size);
        self.mounted = true;
        host.request_frame();
        log::info!("gallery mounted at {}x{}", size.width, size.height);
    }

    /// Removes the listeners and cancels the pending frame.
    pub fn unmount(&mut self, host: &mut impl HostSurface) {
        if !self.mounted {
            return;
        }
        for listener in Listener::ALL {
            host.remove_listener(listener);
        }
        host.cancel_frame();
        self.mounted = false;
        log::info!("gallery unmounted");
    }

    /// Handles one input event. Returns whether anything changed.
    ///
    /// Events whose listener is not registered on `host` are dropped.
    pub fn handle_event(&mut self, host: &mut impl HostSurface, event: &InputEvent) -> bool {
        if !host.has_listener(event.listener()) {
            return false;
        }
        match event {
            InputEvent::Resized(size) => self.apply_size(host, *size),
            InputEvent::KeyDown(key) => self.controller.handle_key(&mut self.camera, *key),
            InputEvent::MouseMove(position) => {
                let rect = host.canvas_rect();
                self.controller.handle_mouse(&mut self.camera, *position, &rect)
            }
        }
    }

    /// Runs one tick of the render loop. Returns whether the frame should be
    /// drawn; while mounted the next frame is requested right away.
    pub fn frame(&mut self, host: &mut impl HostSurface) -> bool {
        if !self.mounted {
            return false;
        }
        host.request_frame();
        true
    }

    fn apply_size(&mut self, host: &mut impl HostSurface, size: PhysicalSize<u32>) -> bool {
        if size.width == 0 || size.height == 0 {
            log::debug!("ignoring resize to {}x{}", size.width, size.height);
            return false;
        }
        self.camera.projection.resize(size.width, size.height);
        host.resize_surface(size.width, size.height);
        true
    }
}
