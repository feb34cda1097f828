//! Loading assets and moving the scene onto the GPU.

use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, MaterialUniform},
        scene_graph::{InstanceGroup, MaterialDesc, Scene},
        texture::Texture,
    },
    render::{GpuObject, GpuScene},
};

pub mod texture;

/// Every texture path the scene references, once each, in order of first
/// appearance.
pub fn texture_paths(scene: &Scene) -> Vec<&str> {
    let mut seen = HashSet::new();
    scene
        .objects()
        .iter()
        .flat_map(|object| object.materials.iter())
        .filter_map(|material| material.texture.as_deref())
        .filter(|path| seen.insert(*path))
        .collect()
}

/// The loaded texture of `desc`, or `fallback` if it has none or it failed to
/// load.
pub fn select_texture<'t, T>(
    desc: &MaterialDesc,
    textures: &'t HashMap<String, T>,
    fallback: &'t T,
) -> &'t T {
    desc.texture
        .as_ref()
        .and_then(|path| textures.get(path))
        .unwrap_or(fallback)
}

/// Loads every texture the scene references, once per path. Paths that fail to
/// load are logged and left out.
pub async fn load_scene_textures(
    scene: &Scene,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> HashMap<String, Texture> {
    let paths = texture_paths(scene);

    let loaded = futures::future::join_all(
        paths
            .iter()
            .map(|path| texture::load_texture(path, device, queue)),
    )
    .await;

    paths
        .into_iter()
        .zip(loaded)
        .filter_map(|(path, result)| match result {
            Ok(texture) => Some((path.to_string(), texture)),
            Err(e) => {
                log::warn!("texture {} could not be loaded, drawing it untextured: {}", path, e);
                None
            }
        })
        .collect()
}

/// Uploads geometry, materials and instance transforms. Objects sharing a model
/// become a single [`GpuObject`] with one instance per object.
pub async fn upload_scene(
    scene: &Scene,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> GpuScene {
    let textures = load_scene_textures(scene, device, queue).await;
    let white = Texture::create_solid([255; 4], device, queue, "untextured");

    let objects = scene
        .instance_groups()
        .iter()
        .map(|group| upload_group(group, &textures, &white, device, layout))
        .collect::<Vec<_>>();
    log::info!(
        "uploaded {} models with {} textures",
        objects.len(),
        textures.len()
    );
    GpuScene { objects }
}

fn upload_group(
    group: &InstanceGroup<'_>,
    textures: &HashMap<String, Texture>,
    white: &Texture,
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> GpuObject {
    let materials = group
        .materials
        .iter()
        .map(|desc| {
            model::Material::new(
                device,
                &desc.name,
                desc.side,
                select_texture(desc, textures, white).clone(),
                MaterialUniform::new(desc.color, desc.uv_repeat),
                layout,
            )
        })
        .collect();
    let mesh = model::Mesh::from_geometry(device, group.name, group.geometry);

    let instance_data = group
        .transforms
        .iter()
        .map(|transform| transform.to_raw())
        .collect::<Vec<InstanceRaw>>();
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Instance Buffer", group.name)),
        contents: bytemuck::cast_slice(&instance_data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });

    GpuObject {
        name: group.name.to_string(),
        model: model::Model { mesh, materials },
        instance_buffer,
        amount: instance_data.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GalleryConfig,
        data_structures::scene_graph::Side,
        scene::build_scene,
    };

    #[test]
    fn the_room_references_five_textures() {
        let scene = build_scene(&GalleryConfig::default());
        assert_eq!(
            texture_paths(&scene),
            vec![
                "images/wall_texture.jpg",
                "images/floor_texture.jpg",
                "images/painting1.jpg",
                "images/painting2.jpg",
                "images/painting3.jpg",
            ]
        );
    }

    #[test]
    fn missing_textures_fall_back() {
        let textures = HashMap::from([("wall.jpg".to_string(), "wall")]);
        let wall = MaterialDesc::new("wall", Side::Back).with_texture("wall.jpg");
        let broken = MaterialDesc::new("painting", Side::Front).with_texture("missing.jpg");
        let plain = MaterialDesc::new("frame", Side::Double);

        assert_eq!(*select_texture(&wall, &textures, &"white"), "wall");
        assert_eq!(*select_texture(&broken, &textures, &"white"), "white");
        assert_eq!(*select_texture(&plain, &textures, &"white"), "white");
    }
}
