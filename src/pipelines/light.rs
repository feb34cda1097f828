use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::Light;

/// The scene lights as they sit in the light uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// rgb premultiplied by intensity, w unused
    ambient: [f32; 4],
    directional_color: [f32; 4],
    directional_position: [f32; 4],
}

impl LightUniform {
    /// Collects the first ambient and the first directional light. Missing
    /// lights contribute nothing.
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self {
            ambient: [0.0; 4],
            directional_color: [0.0; 4],
            directional_position: [0.0, 1.0, 0.0, 0.0],
        };
        if let Some((color, intensity)) = lights.iter().find_map(|light| match light {
            Light::Ambient { color, intensity } => Some((color, intensity)),
            _ => None,
        }) {
            uniform.ambient = scaled(color, *intensity);
        }
        if let Some((color, intensity, position)) = lights.iter().find_map(|light| match light {
            Light::Directional {
                color,
                intensity,
                position,
            } => Some((color, intensity, position)),
            _ => None,
        }) {
            uniform.directional_color = scaled(color, *intensity);
            uniform.directional_position = [position.x, position.y, position.z, 0.0];
        }
        uniform
    }

    pub fn ambient(&self) -> [f32; 3] {
        [self.ambient[0], self.ambient[1], self.ambient[2]]
    }

    pub fn directional_color(&self) -> [f32; 3] {
        [
            self.directional_color[0],
            self.directional_color[1],
            self.directional_color[2],
        ]
    }
}

fn scaled(color: &[f32; 3], intensity: f32) -> [f32; 4] {
    [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0]
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, lights: &[Light]) -> Self {
        let uniform = LightUniform::from_lights(lights);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
