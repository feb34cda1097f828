//! Render pipelines.
//!
//! All gallery surfaces use the same unlit shader. They only differ in which
//! side of a triangle is kept, so there is one pipeline per [`Side`].

use crate::data_structures::scene_graph::Side;

pub mod basic;
pub mod light;

#[derive(Debug)]
pub struct Pipelines {
    pub front: wgpu::RenderPipeline,
    pub back: wgpu::RenderPipeline,
    pub double: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        material_layout: &wgpu::BindGroupLayout,
        camera_layout: &wgpu::BindGroupLayout,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mk = |side| {
            basic::mk_basic_pipeline(
                device,
                format,
                sample_count,
                side,
                material_layout,
                camera_layout,
                light_layout,
            )
        };
        Self {
            front: mk(Side::Front),
            back: mk(Side::Back),
            double: mk(Side::Double),
        }
    }

    pub fn for_side(&self, side: Side) -> &wgpu::RenderPipeline {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
            Side::Double => &self.double,
        }
    }
}
