//! Pipeline batching.
//!
//! The uploaded scene is flattened into one batch per pipeline before drawing.
//! A model whose groups use materials with different [`Side`]s (none in the
//! default room, but nothing forbids it) ends up in several batches, one entry
//! per group.
//!
//! # Key types
//!
//! - [`Instanced<'a>`] is a model with its instance buffer
//! - [`Batches`] holds the draw list of each pipeline
//! - [`GpuScene`] owns the GPU side of every scene object

use crate::data_structures::{model::Model, scene_graph::Side};

/// A model drawn `amount` times with the transforms in `instance`.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// One material group of an instanced model.
pub type Batch<'a> = (Instanced<'a>, usize);

/// Per-side draw lists.
pub struct Batches<B> {
    pub front: Vec<B>,
    pub back: Vec<B>,
    pub double: Vec<B>,
}

impl<B> Default for Batches<B> {
    fn default() -> Self {
        Self {
            front: Vec::new(),
            back: Vec::new(),
            double: Vec::new(),
        }
    }
}

impl<B> Batches<B> {
    fn push(&mut self, side: Side, batch: B) {
        match side {
            Side::Front => self.front.push(batch),
            Side::Back => self.back.push(batch),
            Side::Double => self.double.push(batch),
        }
    }

    /// Batches in the order they are drawn.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &[B])> {
        [
            (Side::Back, self.back.as_slice()),
            (Side::Front, self.front.as_slice()),
            (Side::Double, self.double.as_slice()),
        ]
        .into_iter()
    }
}

fn split_groups<'a>(instanced: Instanced<'a>, batches: &mut Batches<Batch<'a>>) {
    if instanced.amount == 0 {
        log::warn!("you attempted to render {} with zero instances", instanced.model.mesh.name);
        return;
    }
    for group in 0..instanced.model.mesh.groups.len() {
        match instanced.model.material_for(group) {
            Some(material) => batches.push(material.side, (instanced, group)),
            None => log::warn!("{} has no material for group {}", instanced.model.mesh.name, group),
        }
    }
}

/// A scene object, or a set of objects sharing a model, on the GPU.
#[derive(Debug)]
pub struct GpuObject {
    pub name: String,
    pub model: Model,
    pub instance_buffer: wgpu::Buffer,
    pub amount: usize,
}

impl<'a> From<&'a GpuObject> for Instanced<'a> {
    fn from(object: &'a GpuObject) -> Self {
        Instanced {
            instance: &object.instance_buffer,
            model: &object.model,
            amount: object.amount,
        }
    }
}

#[derive(Debug, Default)]
pub struct GpuScene {
    pub objects: Vec<GpuObject>,
}

impl<'a> From<&'a GpuScene> for Batches<Batch<'a>> {
    fn from(scene: &'a GpuScene) -> Self {
        let mut batches = Batches::default();
        scene
            .objects
            .iter()
            .for_each(|object| split_groups(Instanced::from(object), &mut batches));
        batches
    }
}
