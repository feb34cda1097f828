//! The scene: what is in the gallery and where.
//!
//! A [`Scene`] is a flat collection of [`SceneObject`]s and [`Light`]s. Objects
//! hold their geometry and materials behind `Arc`s, so cloning an object shares
//! both while giving the clone its own [`Instance`] transform. Objects that
//! share geometry and materials are drawn with one instanced draw call, see
//! [`Scene::instance_groups`].

use std::sync::Arc;

use cgmath::Vector3;

use crate::data_structures::{geometry::Geometry, instance::Instance};

/// Which side of a triangle is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The counter-clockwise side, facing the normal.
    Front,
    /// The inside, used for the room box which is seen from within.
    Back,
    Double,
}

impl Side {
    /// Faces the rasterizer has to throw away for this side to remain.
    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// An unlit material: a colour, optionally multiplied with an image.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    /// Asset path of the image, relative to the asset root.
    pub texture: Option<String>,
    /// Linear rgb.
    pub color: [f32; 3],
    pub side: Side,
    pub uv_repeat: [f32; 2],
}

impl MaterialDesc {
    pub fn new(name: &str, side: Side) -> Self {
        Self {
            name: name.to_string(),
            texture: None,
            color: [1.0; 3],
            side,
            uv_repeat: [1.0, 1.0],
        }
    }

    pub fn with_texture(mut self, path: &str) -> Self {
        self.texture = Some(path.to_string());
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_repeat(mut self, repeat: [f32; 2]) -> Self {
        self.uv_repeat = repeat;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub materials: Arc<Vec<MaterialDesc>>,
    pub transform: Instance,
}

impl SceneObject {
    pub fn new(name: &str, geometry: Geometry, materials: Vec<MaterialDesc>) -> Self {
        Self {
            name: name.to_string(),
            geometry: Arc::new(geometry),
            materials: Arc::new(materials),
            transform: Instance::default(),
        }
    }

    /// Whether both objects can be drawn in one instanced call.
    pub fn shares_model_with(&self, other: &SceneObject) -> bool {
        Arc::ptr_eq(&self.geometry, &other.geometry) && Arc::ptr_eq(&self.materials, &other.materials)
    }

    /// Outward facing direction of the object's local `+z`.
    pub fn facing(&self) -> Vector3<f32> {
        self.transform.rotation * Vector3::unit_z()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vector3<f32>,
    },
}

/// Objects sharing geometry and materials, and the transform of each.
pub struct InstanceGroup<'a> {
    pub name: &'a str,
    pub geometry: &'a Geometry,
    pub materials: &'a [MaterialDesc],
    pub transforms: Vec<&'a Instance>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its index.
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, idx: usize) -> Option<&SceneObject> {
        self.objects.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(idx)
    }

    pub fn find(&self, name: &str) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(move |o| o.name == name)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Groups objects that share geometry and materials, in order of first
    /// appearance.
    pub fn instance_groups(&self) -> Vec<InstanceGroup<'_>> {
        let mut groups: Vec<(usize, InstanceGroup<'_>)> = Vec::new();
        for (idx, object) in self.objects.iter().enumerate() {
            match groups
                .iter_mut()
                .find(|(first, _)| self.objects[*first].shares_model_with(object))
            {
                Some((_, group)) => group.transforms.push(&object.transform),
                None => groups.push((
                    idx,
                    InstanceGroup {
                        name: &object.name,
                        geometry: &object.geometry,
                        materials: &object.materials,
                        transforms: vec![&object.transform],
                    },
                )),
            }
        }
        groups.into_iter().map(|(_, group)| group).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_geometry_but_not_transforms() {
        let template = SceneObject::new("frame", Geometry::plane(1.0, 1.0), vec![MaterialDesc::new("m", Side::Front)]);
        let mut clone = template.clone();
        clone.transform.position = Vector3::new(1.0, 2.0, 3.0);

        assert!(template.shares_model_with(&clone));
        assert_eq!(template.transform, Instance::default());
    }

    #[test]
    fn separately_built_objects_are_not_grouped() {
        let mut scene = Scene::new();
        let a = SceneObject::new("a", Geometry::plane(1.0, 1.0), vec![MaterialDesc::new("m", Side::Front)]);
        let b = SceneObject::new("b", Geometry::plane(1.0, 1.0), vec![MaterialDesc::new("m", Side::Front)]);
        let a2 = a.clone();
        scene.add(a);
        scene.add(b);
        scene.add(a2);

        let groups = scene.instance_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "a");
        assert_eq!(groups[0].transforms.len(), 2);
        assert_eq!(groups[1].transforms.len(), 1);
    }

    #[test]
    fn sides_cull_the_opposite_face() {
        assert_eq!(Side::Front.cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(Side::Back.cull_mode(), Some(wgpu::Face::Front));
        assert_eq!(Side::Double.cull_mode(), None);
    }
}
