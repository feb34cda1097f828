//! Application event loop.
//!
//! [`run`] opens a window, sets up the GPU [`Context`], uploads the gallery
//! scene and mounts the [`Gallery`] on a [`WindowHost`]. From then on winit
//! drives everything:
//!
//! 1. Window events are translated into [`InputEvent`]s and handed to the gallery
//! 2. A redraw is only a frame of the render loop while one was requested
//! 3. Each frame uploads the camera, draws the batched scene and asks for the next frame
//! 4. Closing the window unmounts the gallery before the loop exits

use std::{fmt::Debug, iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::GalleryConfig,
    context::Context,
    data_structures::model::DrawModel,
    gallery::Gallery,
    host::{InputEvent, Listeners, WindowHost},
    render::{Batch, Batches, GpuScene},
    resources::upload_scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Why a requested frame was not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameError {
    /// The surface no longer matches the window and has to be configured again.
    Reconfigure,
    /// No texture this time, try again with the next frame.
    Skipped,
    Validation,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Reconfigure => f.write_str("surface is lost or outdated"),
            FrameError::Skipped => f.write_str("surface texture timed out or window is occluded"),
            FrameError::Validation => f.write_str("surface texture failed validation"),
        }
    }
}

fn acquire(current: wgpu::CurrentSurfaceTexture) -> Result<wgpu::SurfaceTexture, FrameError> {
    match current {
        wgpu::CurrentSurfaceTexture::Success(texture)
        | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => Ok(texture),
        wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
            Err(FrameError::Skipped)
        }
        wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
            Err(FrameError::Reconfigure)
        }
        wgpu::CurrentSurfaceTexture::Validation => Err(FrameError::Validation),
    }
}

/// GPU context, gallery and the bookkeeping of the window host.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    gallery: Gallery,
    scene: GpuScene,
    listeners: Listeners,
    frame_pending: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: GalleryConfig) -> Self {
        let gallery = Gallery::new(&config, window.inner_size());
        let ctx = Context::new(
            window,
            gallery.camera(),
            gallery.scene().lights(),
            config.clear_colour,
        )
        .await;
        let ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        let scene = upload_scene(gallery.scene(), &ctx.device, &ctx.queue, &ctx.material_layout).await;
        Self {
            ctx,
            gallery,
            scene,
            listeners: Listeners::default(),
            frame_pending: false,
        }
    }

    fn mount(&mut self) {
        let mut host = WindowHost::new(&mut self.ctx, &mut self.listeners, &mut self.frame_pending);
        self.gallery.mount(&mut host);
    }

    fn unmount(&mut self) {
        let mut host = WindowHost::new(&mut self.ctx, &mut self.listeners, &mut self.frame_pending);
        self.gallery.unmount(&mut host);
    }

    fn dispatch(&mut self, event: &InputEvent) {
        let mut host = WindowHost::new(&mut self.ctx, &mut self.listeners, &mut self.frame_pending);
        self.gallery.handle_event(&mut host, event);
    }

    /// Runs the requested frame, if there is one.
    fn frame(&mut self) -> Result<(), FrameError> {
        if !std::mem::take(&mut self.frame_pending) {
            return Ok(());
        }
        let mut host = WindowHost::new(&mut self.ctx, &mut self.listeners, &mut self.frame_pending);
        if !self.gallery.frame(&mut host) {
            return Ok(());
        }
        self.render()
    }

    fn render(&mut self) -> Result<(), FrameError> {
        // Rendering requires the surface to be configured
        if !self.ctx.is_surface_configured {
            return Ok(());
        }
        self.ctx.camera.write(&self.ctx.queue, self.gallery.camera());

        let output = acquire(self.ctx.surface.get_current_texture())?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        // Multisampled frames are drawn off screen and resolved into the surface
        let (target, resolve_target) = match &self.ctx.msaa_target {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: if resolve_target.is_some() {
                            wgpu::StoreOp::Discard
                        } else {
                            wgpu::StoreOp::Store
                        },
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            let batches: Batches<Batch> = Batches::from(&self.scene);
            for (side, batch) in batches.iter() {
                if batch.is_empty() {
                    continue;
                }
                render_pass.set_pipeline(self.ctx.pipelines.for_side(side));
                for (instanced, group) in batch {
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_group_instanced(
                        instanced.model,
                        *group,
                        0..instanced.amount as u32,
                        &self.ctx.camera.bind_group,
                        &self.ctx.light.bind_group,
                    );
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: GalleryConfig,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: GalleryConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            config,
            state: None,
        })
    }
}

pub(crate) enum FlowEvent {
    /// The state finished its async setup on the web.
    #[allow(dead_code)]
    Initialized(Box<AppState>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_canvas(window: &Window, container_id: &str) -> anyhow::Result<()> {
    use winit::platform::web::WindowExtWebSys;

    let canvas = window
        .canvas()
        .ok_or_else(|| anyhow::anyhow!("window has no canvas"))?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let parent: web_sys::Node = match document.get_element_by_id(container_id) {
        Some(container) => container.into(),
        None => document
            .body()
            .ok_or_else(|| anyhow::anyhow!("document has no body"))?
            .into(),
    };
    parent
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("could not attach canvas: {:?}", e))?;
    let style = canvas.style();
    for (property, value) in [("display", "block"), ("width", "100vw"), ("height", "100vh")] {
        style
            .set_property(property, value)
            .map_err(|e| anyhow::anyhow!("could not style canvas: {:?}", e))?;
    }
    Ok(())
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Gallery");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            // keeps the arrow keys from scrolling the page
            window_attributes = window_attributes.with_prevent_default(true);
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        if let Err(e) = attach_canvas(&window, &self.config.container_id) {
            log::error!("{}", e);
        }

        let init_future = AppState::new(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app_state = self.async_runtime.block_on(init_future);
            app_state.mount();
            self.state = Some(app_state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let app_state = init_future.await;
                assert!(
                    proxy
                        .send_event(FlowEvent::Initialized(Box::new(app_state)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(app_state) => {
                // This is the message from our wasm `spawn_local`
                let mut app_state = *app_state;
                app_state.mount();
                self.state = Some(app_state);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                state.unmount();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => match state.frame() {
                Ok(_) => {}
                Err(FrameError::Reconfigure) => {
                    let size = state.ctx.window.inner_size();
                    state.ctx.resize(size.width, size.height);
                }
                Err(FrameError::Skipped) => log::debug!("frame skipped"),
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            event => {
                if let Some(input) = InputEvent::from_window_event(&event) {
                    state.dispatch(&input);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.unmount();
        }
    }
}

/// Opens the gallery and blocks until its window is closed.
pub fn run(config: GalleryConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_are_reconfigured() {
        assert_eq!(
            acquire(wgpu::CurrentSurfaceTexture::Lost).err(),
            Some(FrameError::Reconfigure)
        );
        assert_eq!(
            acquire(wgpu::CurrentSurfaceTexture::Outdated).err(),
            Some(FrameError::Reconfigure)
        );
    }

    #[test]
    fn timeouts_skip_the_frame() {
        assert_eq!(acquire(wgpu::CurrentSurfaceTexture::Timeout).err(), Some(FrameError::Skipped));
        assert_eq!(acquire(wgpu::CurrentSurfaceTexture::Occluded).err(), Some(FrameError::Skipped));
        assert_eq!(
            acquire(wgpu::CurrentSurfaceTexture::Validation).err(),
            Some(FrameError::Validation)
        );
    }
}
