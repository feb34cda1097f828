//! Instance transformation data for GPU rendering.
//!
//! Every object in the gallery carries an [`Instance`]. Objects that share
//! geometry and materials (the window frames) are drawn together in a single
//! instanced draw call, each with its own transform.

use cgmath::{One, Rad, Rotation3};

use crate::data_structures::model;

/// Per-instance transformation: position, rotation (as quaternion), and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// An instance at `position`, turned `yaw` radians around the y axis.
    pub fn with_yaw(position: cgmath::Vector3<f32>, yaw: f32) -> Self {
        Self {
            position,
            rotation: cgmath::Quaternion::from_angle_y(Rad(yaw)),
            ..Default::default()
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
}

/**
 * The model matrix is passed as four vec4 attributes (a mat4 takes four vertex slots).
 * Locations 5 to 8 leave room for the per-vertex attributes.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only advances to the next instance when it starts a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3, Vector4};

    use super::*;

    #[test]
    fn yaw_turns_the_local_normal_around_y() {
        let instance = Instance::with_yaw(Vector3::new(0.0, 0.0, 0.0), std::f32::consts::FRAC_PI_2);
        let normal = instance.rotation * Vector3::unit_z();
        assert!((normal - Vector3::unit_x()).magnitude() < 1e-5);
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let mut instance = Instance::with_yaw(Vector3::new(10.0, 0.0, 0.0), std::f32::consts::PI);
        instance.scale = Vector3::new(2.0, 2.0, 2.0);
        let moved = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((moved.truncate() - Vector3::new(8.0, 0.0, 0.0)).magnitude() < 1e-4);
    }
}
