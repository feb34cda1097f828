//! Builds the gallery room from a [`GalleryConfig`].
//!
//! The room is a box seen from the inside. Paintings are planes hung just in
//! front of the walls, and the window frames are clones of one extruded
//! template, each with its own placement.

use crate::{
    config::{GalleryConfig, LightsConfig, PaintingConfig, Placement, RoomConfig, WindowFrameConfig, hex_to_linear},
    data_structures::{
        geometry::{BoxFace, Geometry, Shape},
        instance::Instance,
        scene_graph::{Light, MaterialDesc, Scene, SceneObject, Side},
    },
};

pub const ROOM: &str = "room";
pub const PAINTING: &str = "painting";
pub const WINDOW_FRAME: &str = "window frame";

/// Populates a fresh scene with the lights, the room, the paintings and the
/// window frames, in that order.
pub fn build_scene(config: &GalleryConfig) -> Scene {
    let mut scene = Scene::new();
    add_lights(&mut scene, &config.lights);
    scene.add(room(&config.room));
    for painting in paintings(&config.paintings) {
        scene.add(painting);
    }
    let template = window_frame_template(&config.windows);
    place_window_frames(&mut scene, &template, &config.windows.placements);
    log::info!(
        "built gallery scene with {} objects and {} lights",
        scene.len(),
        scene.lights().len()
    );
    scene
}

pub fn add_lights(scene: &mut Scene, lights: &LightsConfig) {
    scene.add_light(Light::Ambient {
        color: hex_to_linear(lights.ambient_colour),
        intensity: lights.ambient_intensity,
    });
    scene.add_light(Light::Directional {
        color: hex_to_linear(lights.directional_colour),
        intensity: lights.directional_intensity,
        position: lights.directional_position,
    });
}

/// The room box. Materials follow [`BoxFace::ORDER`]: the walls are tinted,
/// the ceiling is the plain wall texture and the floor repeats its texture.
pub fn room(config: &RoomConfig) -> SceneObject {
    let tint = hex_to_linear(config.wall_tint);
    let materials = BoxFace::ORDER
        .iter()
        .map(|face| {
            let name = format!("{:?} wall", face).to_lowercase();
            let material = MaterialDesc::new(&name, Side::Back);
            match face {
                BoxFace::Top => material.with_texture(&config.wall_texture),
                BoxFace::Bottom => material
                    .with_texture(&config.floor_texture)
                    .with_repeat(config.floor_repeat),
                _ => material.with_texture(&config.wall_texture).with_color(tint),
            }
        })
        .collect();
    let size = config.size;
    SceneObject::new(ROOM, Geometry::cuboid(size.x, size.y, size.z), materials)
}

pub fn paintings(configs: &[PaintingConfig]) -> Vec<SceneObject> {
    configs
        .iter()
        .map(|painting| {
            let material = MaterialDesc::new(&painting.texture, Side::Double).with_texture(&painting.texture);
            let mut object = SceneObject::new(
                PAINTING,
                Geometry::plane(painting.size[0], painting.size[1]),
                vec![material],
            );
            object.transform = Instance::with_yaw(painting.position, painting.yaw);
            object
        })
        .collect()
}

/// A single brown frame extruded from a rectangle. It is never added to the
/// scene itself, only its clones are.
pub fn window_frame_template(config: &WindowFrameConfig) -> SceneObject {
    let shape = Shape::rectangle(config.width, config.height);
    let material = MaterialDesc::new(WINDOW_FRAME, Side::Front).with_color(hex_to_linear(config.colour));
    SceneObject::new(WINDOW_FRAME, Geometry::extrude(&shape, config.depth), vec![material])
}

/// Adds one clone of `template` per placement and returns their indices.
pub fn place_window_frames(scene: &mut Scene, template: &SceneObject, placements: &[Placement]) -> Vec<usize> {
    placements
        .iter()
        .map(|placement| {
            let mut frame = template.clone();
            frame.transform = Instance::with_yaw(placement.position, placement.yaw);
            scene.add(frame)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn room_materials_follow_face_order() {
        let room = room(&RoomConfig::default());
        let config = RoomConfig::default();
        let tint = hex_to_linear(config.wall_tint);

        assert_eq!(room.materials.len(), 6);
        assert!(room.materials.iter().all(|m| m.side == Side::Back));
        for (i, material) in room.materials.iter().enumerate() {
            match BoxFace::ORDER[i] {
                BoxFace::Top => {
                    assert_eq!(material.texture.as_deref(), Some(config.wall_texture.as_str()));
                    assert_eq!(material.color, [1.0; 3]);
                }
                BoxFace::Bottom => {
                    assert_eq!(material.texture.as_deref(), Some(config.floor_texture.as_str()));
                    assert_eq!(material.uv_repeat, [3.0, 8.0]);
                }
                _ => {
                    assert_eq!(material.texture.as_deref(), Some(config.wall_texture.as_str()));
                    assert_eq!(material.color, tint);
                }
            }
        }
        for (i, group) in room.geometry.groups.iter().enumerate() {
            assert_eq!(group.material, i);
        }
    }

    #[test]
    fn paintings_hang_inside_their_wall_facing_the_room() {
        let config = GalleryConfig::default();
        let half = config.room.size / 2.0;
        for painting in paintings(&config.paintings) {
            let p = painting.transform.position;
            let facing = painting.facing();
            // the wall behind the painting is the one it faces away from
            let (distance, axis) = if facing.x.abs() > 0.5 {
                (half.x - p.x.abs(), Vector3::new(-p.x.signum(), 0.0, 0.0))
            } else {
                (half.z - p.z.abs(), Vector3::new(0.0, 0.0, -p.z.signum()))
            };
            assert!(distance > 0.0 && distance <= 12.0, "{:?} is {} from its wall", p, distance);
            assert!((facing - axis).magnitude() < 1e-4, "{:?} faces {:?}", p, facing);
        }
    }

    #[test]
    fn default_scene_has_every_object_once() {
        let scene = build_scene(&GalleryConfig::default());
        assert_eq!(scene.find(ROOM).count(), 1);
        assert_eq!(scene.find(PAINTING).count(), 3);
        assert_eq!(scene.find(WINDOW_FRAME).count(), 3);
        assert_eq!(scene.lights().len(), 2);
        // room, three paintings, one instanced window frame model
        assert_eq!(scene.instance_groups().len(), 5);
    }

    #[test]
    fn window_frame_is_brown_and_one_sided() {
        let template = window_frame_template(&WindowFrameConfig::default());
        assert_eq!(template.materials.len(), 1);
        assert_eq!(template.materials[0].side, Side::Front);
        assert!(template.materials[0].texture.is_none());
        assert_eq!(template.materials[0].color, hex_to_linear(0xa52a2a));
        assert_eq!(template.transform, Instance::default());
    }
}
