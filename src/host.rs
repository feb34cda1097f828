//! The surface the gallery is hosted on.
//!
//! The gallery never talks to winit or the DOM directly. Everything it needs from
//! its environment (input listeners, frame scheduling, window and canvas sizes,
//! resizing the drawing surface) goes through [`HostSurface`]. Two hosts exist:
//!
//! - [`WindowHost`] drives a real window and the GPU [`Context`]
//! - [`HeadlessHost`] only records what was asked of it, which is what tests use
//!
//! Input arrives as [`InputEvent`]s. An event is only handled while the
//! [`Listener`] it belongs to is registered on the host.

use std::collections::HashSet;

use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::context::Context;

/// The kinds of input the gallery can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Listener {
    Resize,
    KeyDown,
    MouseMove,
}

impl Listener {
    pub const ALL: [Listener; 3] = [Listener::Resize, Listener::KeyDown, Listener::MouseMove];
}

/// Keys the camera reacts to. Everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl From<&Key> for KeyPress {
    fn from(key: &Key) -> Self {
        match key {
            Key::Named(NamedKey::ArrowUp) => KeyPress::ArrowUp,
            Key::Named(NamedKey::ArrowDown) => KeyPress::ArrowDown,
            Key::Named(NamedKey::ArrowLeft) => KeyPress::ArrowLeft,
            Key::Named(NamedKey::ArrowRight) => KeyPress::ArrowRight,
            _ => KeyPress::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// The window now has this size in physical pixels.
    Resized(PhysicalSize<u32>),
    KeyDown(KeyPress),
    /// Cursor position in window coordinates.
    MouseMove(PhysicalPosition<f64>),
}

impl InputEvent {
    pub fn listener(&self) -> Listener {
        match self {
            InputEvent::Resized(_) => Listener::Resize,
            InputEvent::KeyDown(_) => Listener::KeyDown,
            InputEvent::MouseMove(_) => Listener::MouseMove,
        }
    }

    /// Translates the winit events the gallery cares about. Key releases and
    /// everything unrelated to input map to `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => Some(InputEvent::Resized(*size)),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                Some(InputEvent::KeyDown(KeyPress::from(&event.logical_key)))
            }
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMove(*position)),
            _ => None,
        }
    }
}

/// A rectangle in window coordinates, like a DOM bounding client rect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A viewport covering a whole window of the given size.
    pub fn full(size: PhysicalSize<u32>) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: f64::from(size.width),
            height: f64::from(size.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

pub trait HostSurface {
    fn add_listener(&mut self, listener: Listener);

    fn remove_listener(&mut self, listener: Listener);

    fn has_listener(&self, listener: Listener) -> bool;

    /// Schedule one frame callback at the next display refresh.
    fn request_frame(&mut self);

    /// Drop a frame callback that has been requested but not run yet.
    fn cancel_frame(&mut self);

    fn window_size(&self) -> PhysicalSize<u32>;

    /// Where the canvas currently sits inside the window.
    fn canvas_rect(&self) -> Viewport;

    fn resize_surface(&mut self, width: u32, height: u32);
}

/// The set of registered listeners. Shared by both hosts.
#[derive(Debug, Default, Clone)]
pub struct Listeners(HashSet<Listener>);

impl Listeners {
    pub fn insert(&mut self, listener: Listener) {
        self.0.insert(listener);
    }

    pub fn remove(&mut self, listener: Listener) {
        self.0.remove(&listener);
    }

    pub fn contains(&self, listener: Listener) -> bool {
        self.0.contains(&listener)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Host backed by a winit window and the GPU context rendering into it.
///
/// `frame_pending` mirrors an outstanding `requestAnimationFrame`: redraws
/// delivered by the window system while it is `false` are not frames of the
/// render loop and are skipped.
pub struct WindowHost<'a> {
    ctx: &'a mut Context,
    listeners: &'a mut Listeners,
    frame_pending: &'a mut bool,
}

impl<'a> WindowHost<'a> {
    pub fn new(ctx: &'a mut Context, listeners: &'a mut Listeners, frame_pending: &'a mut bool) -> Self {
        Self {
            ctx,
            listeners,
            frame_pending,
        }
    }
}

impl HostSurface for WindowHost<'_> {
    fn add_listener(&mut self, listener: Listener) {
        self.listeners.insert(listener);
    }

    fn remove_listener(&mut self, listener: Listener) {
        self.listeners.remove(listener);
    }

    fn has_listener(&self, listener: Listener) -> bool {
        self.listeners.contains(listener)
    }

    fn request_frame(&mut self) {
        *self.frame_pending = true;
        self.ctx.window.request_redraw();
    }

    fn cancel_frame(&mut self) {
        *self.frame_pending = false;
    }

    fn window_size(&self) -> PhysicalSize<u32> {
        self.ctx.window.inner_size()
    }

    fn canvas_rect(&self) -> Viewport {
        // The canvas fills the window on every platform we run on.
        Viewport::full(self.ctx.window.inner_size())
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }
}

/// A host without a window. It keeps track of listeners, frame requests and the
/// surface size so the gallery can be driven and inspected from tests.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    listeners: Listeners,
    window: PhysicalSize<u32>,
    canvas: Viewport,
    surface: PhysicalSize<u32>,
    frame_pending: bool,
    frame_requests: usize,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        let window = PhysicalSize::new(width, height);
        Self {
            listeners: Listeners::default(),
            window,
            canvas: Viewport::full(window),
            surface: PhysicalSize::new(0, 0),
            frame_pending: false,
            frame_requests: 0,
        }
    }

    /// Changes the window size the way a user dragging the window would, and
    /// returns the resize event that goes with it.
    pub fn resize_window(&mut self, width: u32, height: u32) -> InputEvent {
        self.window = PhysicalSize::new(width, height);
        self.canvas = Viewport::full(self.window);
        InputEvent::Resized(self.window)
    }

    /// Moves the canvas inside the window, e.g. below a page header.
    pub fn set_canvas_rect(&mut self, rect: Viewport) {
        self.canvas = rect;
    }

    pub fn surface_size(&self) -> PhysicalSize<u32> {
        self.surface
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Total number of frames requested so far.
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// Consumes the pending frame request, as the display refresh would.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }
}

impl HostSurface for HeadlessHost {
    fn add_listener(&mut self, listener: Listener) {
        self.listeners.insert(listener);
    }

    fn remove_listener(&mut self, listener: Listener) {
        self.listeners.remove(listener);
    }

    fn has_listener(&self, listener: Listener) -> bool {
        self.listeners.contains(listener)
    }

    fn request_frame(&mut self) {
        self.frame_pending = true;
        self.frame_requests += 1;
    }

    fn cancel_frame(&mut self) {
        self.frame_pending = false;
    }

    fn window_size(&self) -> PhysicalSize<u32> {
        self.window
    }

    fn canvas_rect(&self) -> Viewport {
        self.canvas
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = PhysicalSize::new(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_map_to_their_listener() {
        assert_eq!(
            InputEvent::Resized(PhysicalSize::new(1, 1)).listener(),
            Listener::Resize
        );
        assert_eq!(InputEvent::KeyDown(KeyPress::Other).listener(), Listener::KeyDown);
        assert_eq!(
            InputEvent::MouseMove(PhysicalPosition::new(0.0, 0.0)).listener(),
            Listener::MouseMove
        );
    }

    #[test]
    fn only_arrow_keys_are_recognised() {
        assert_eq!(KeyPress::from(&Key::Named(NamedKey::ArrowUp)), KeyPress::ArrowUp);
        assert_eq!(KeyPress::from(&Key::Named(NamedKey::ArrowRight)), KeyPress::ArrowRight);
        assert_eq!(KeyPress::from(&Key::Named(NamedKey::Enter)), KeyPress::Other);
        assert_eq!(KeyPress::from(&Key::Character("w".into())), KeyPress::Other);
    }

    #[test]
    fn headless_frame_requests_are_consumed_once() {
        let mut host = HeadlessHost::new(800, 600);
        assert!(!host.take_frame());
        host.request_frame();
        assert!(host.frame_pending());
        assert!(host.take_frame());
        assert!(!host.take_frame());
        assert_eq!(host.frame_requests(), 1);
    }

    #[test]
    fn resizing_the_window_moves_the_canvas_rect() {
        let mut host = HeadlessHost::new(800, 600);
        let event = host.resize_window(1024, 768);
        assert_eq!(event, InputEvent::Resized(PhysicalSize::new(1024, 768)));
        assert_eq!(host.canvas_rect().width, 1024.0);
        assert_eq!(host.canvas_rect().height, 768.0);
        // the surface only follows once someone resizes it
        assert_eq!(host.surface_size(), PhysicalSize::new(0, 0));
    }
}
