use std::sync::Arc;

use cgmath::Vector3;
use gallery_room::{
    GalleryConfig,
    config::{Placement, WindowFrameConfig},
    data_structures::{instance::Instance, scene_graph::Scene},
    scene::{WINDOW_FRAME, build_scene, place_window_frames, window_frame_template},
};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn clones_are_independent_of_each_other_and_the_template() {
    let config = WindowFrameConfig::default();
    let template = window_frame_template(&config);
    let placements: Vec<Placement> = (0..5)
        .map(|i| Placement {
            position: Vector3::new(i as f32 * 10.0, 0.0, 0.0),
            yaw: i as f32 * 0.3,
        })
        .collect();

    let mut scene = Scene::new();
    let indices = place_window_frames(&mut scene, &template, &placements);
    assert_eq!(indices.len(), 5);

    scene.get_mut(indices[2]).expect("clone exists").transform.position = Vector3::new(-1.0, -2.0, -3.0);

    for (i, idx) in indices.iter().enumerate() {
        let clone = scene.get(*idx).expect("clone exists");
        assert!(Arc::ptr_eq(&clone.geometry, &template.geometry));
        if i == 2 {
            assert_close(clone.transform.position, Vector3::new(-1.0, -2.0, -3.0));
        } else {
            assert_eq!(clone.transform, Instance::with_yaw(placements[i].position, placements[i].yaw));
        }
    }
    assert_eq!(template.transform, Instance::default());
}

#[test]
fn default_frames_sit_where_configured_and_share_one_model() {
    let config = GalleryConfig::default();
    let scene = build_scene(&config);
    let frames: Vec<_> = scene.find(WINDOW_FRAME).collect();

    assert_eq!(frames.len(), config.windows.placements.len());
    for (frame, placement) in frames.iter().zip(&config.windows.placements) {
        assert_close(frame.transform.position, placement.position);
        assert!(frame.shares_model_with(frames[0]));
    }

    let group = scene
        .instance_groups()
        .into_iter()
        .find(|group| group.name == WINDOW_FRAME)
        .expect("window frames are grouped");
    assert_eq!(group.transforms.len(), 3);
}

#[test]
fn extruded_frame_has_caps_and_walls() {
    let template = window_frame_template(&WindowFrameConfig::default());
    let geometry = &template.geometry;
    // two caps of four corners and four walls of four corners
    assert_eq!(geometry.vertices.len(), 4 * 2 + 4 * 4);
    // two triangles per cap and per wall
    assert_eq!(geometry.indices.len(), 3 * (2 * 2 + 4 * 2));
    let depths: Vec<f32> = geometry.vertices.iter().map(|v| v.position[2]).collect();
    assert!(depths.iter().all(|z| *z == 0.0 || *z == 30.0));
}
