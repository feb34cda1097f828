#![allow(dead_code)]

use cgmath::{InnerSpace, Vector3};
use gallery_room::{
    GalleryConfig, Gallery, HeadlessHost, InputEvent, KeyPress, PhysicalPosition, PhysicalSize,
    camera::StrafeMode,
};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

pub fn config(strafe: StrafeMode) -> GalleryConfig {
    let mut config = GalleryConfig::default();
    config.camera.strafe = strafe;
    config
}

/// A gallery mounted on a fresh headless host of `WIDTH` x `HEIGHT`.
pub fn mounted(config: &GalleryConfig) -> (Gallery, HeadlessHost) {
    let mut host = HeadlessHost::new(WIDTH, HEIGHT);
    let mut gallery = Gallery::new(config, PhysicalSize::new(WIDTH, HEIGHT));
    gallery.mount(&mut host);
    (gallery, host)
}

pub fn key(key: KeyPress) -> InputEvent {
    InputEvent::KeyDown(key)
}

pub fn cursor(x: f64, y: f64) -> InputEvent {
    InputEvent::MouseMove(PhysicalPosition::new(x, y))
}

pub fn assert_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual - expected).magnitude() < 1e-4,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
