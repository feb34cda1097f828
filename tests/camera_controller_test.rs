use cgmath::{InnerSpace, Point3, Vector2, Vector3};
use gallery_room::{
    HostSurface, KeyPress, PhysicalPosition, PhysicalSize, Viewport,
    camera::{CameraController, StrafeMode},
};

use crate::common::test_utils::{assert_close, config, cursor, key, mounted, HEIGHT, WIDTH};

mod common;

#[test]
fn cursor_at_canvas_center_targets_the_origin() {
    let rect = Viewport::full(PhysicalSize::new(WIDTH, HEIGHT));
    let ndc = CameraController::normalized_cursor(
        PhysicalPosition::new(f64::from(WIDTH) / 2.0, f64::from(HEIGHT) / 2.0),
        &rect,
    )
    .expect("canvas has an area");
    assert!((ndc - Vector2::new(0.0, 0.0)).magnitude() < 1e-6);

    let (gallery, _) = mounted(&config(StrafeMode::Corrected));
    let target = gallery.controller().mouse_target(ndc);
    assert_eq!(target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn cursor_is_measured_relative_to_the_canvas() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Corrected));
    host.set_canvas_rect(Viewport {
        left: 100.0,
        top: 50.0,
        width: 400.0,
        height: 300.0,
    });
    // top left corner of the canvas
    assert!(gallery.handle_event(&mut host, &cursor(100.0, 50.0)));

    // the camera moved a thousandth of the way toward (-100, 100, 0)
    assert_close(
        gallery.camera().position.to_homogeneous().truncate(),
        Vector3::new(100.0 - 0.2, 0.1, 0.0),
    );
    let expected = (Point3::new(-100.0, 100.0, 10.0) - gallery.camera().position).normalize();
    assert_close(gallery.camera().forward(), expected);
}

#[test]
fn mouse_moves_accumulate_per_event() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Corrected));
    let center = cursor(f64::from(WIDTH) / 2.0, f64::from(HEIGHT) / 2.0);
    gallery.handle_event(&mut host, &center);
    let once = gallery.camera().position;
    gallery.handle_event(&mut host, &center);
    let twice = gallery.camera().position;

    assert!((once.x - 99.9).abs() < 1e-4);
    assert!((twice.x - 99.9 * 0.999).abs() < 1e-4);
}

#[test]
fn up_and_down_step_along_the_view_direction() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Corrected));
    // turn the camera away from the default orientation first
    gallery.handle_event(&mut host, &cursor(10.0, 20.0));
    let start = gallery.camera().position;
    let forward = gallery.camera().forward();
    let step = gallery.controller().step_distance();

    assert!(gallery.handle_event(&mut host, &key(KeyPress::ArrowUp)));
    let after_up = gallery.camera().position;
    assert_close(after_up - start, forward * step);

    assert!(gallery.handle_event(&mut host, &key(KeyPress::ArrowDown)));
    assert_close(gallery.camera().position - start, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn legacy_strafe_moves_left_for_both_arrows() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Legacy));
    let start = gallery.camera().position;
    gallery.handle_event(&mut host, &key(KeyPress::ArrowLeft));
    let left = gallery.camera().position - start;
    let mid = gallery.camera().position;
    gallery.handle_event(&mut host, &key(KeyPress::ArrowRight));
    let right = gallery.camera().position - mid;

    assert_close(left, right);
    assert_close(left, Vector3::new(-5.0, 0.0, 0.0));
}

#[test]
fn corrected_strafe_moves_left_and_right() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Corrected));
    let start = gallery.camera().position;
    gallery.handle_event(&mut host, &key(KeyPress::ArrowLeft));
    let left = gallery.camera().position - start;
    let mid = gallery.camera().position;
    gallery.handle_event(&mut host, &key(KeyPress::ArrowRight));
    let right = gallery.camera().position - mid;

    assert_close(left, -right);
    assert_close(gallery.camera().position - start, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn other_keys_do_nothing() {
    let (mut gallery, mut host) = mounted(&config(StrafeMode::Corrected));
    let before = gallery.camera().clone();
    assert!(!gallery.handle_event(&mut host, &key(KeyPress::Other)));
    assert_eq!(gallery.camera().position, before.position);
    assert_eq!(gallery.camera().rotation, before.rotation);
    assert!(host.has_listener(gallery_room::Listener::KeyDown));
}
