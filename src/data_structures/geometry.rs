//! CPU-side mesh generation for the shapes the gallery is made of.
//!
//! Geometry is plain vertex and index data split into [`Group`]s; every group is
//! drawn with one material. Nothing here touches the GPU, the data is uploaded
//! later by [`crate::resources::upload_scene`].

use cgmath::{InnerSpace, Point2, Vector3};

use crate::data_structures::model::ModelVertex;

/// A range of indices drawn with the material at `material`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    pub start: u32,
    pub count: u32,
    pub material: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub groups: Vec<Group>,
}

/// The faces of a box in the order their materials are expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxFace {
    Right,
    Left,
    Top,
    Bottom,
    Front,
    Back,
}

impl BoxFace {
    pub const ORDER: [BoxFace; 6] = [
        BoxFace::Right,
        BoxFace::Left,
        BoxFace::Top,
        BoxFace::Bottom,
        BoxFace::Front,
        BoxFace::Back,
    ];

    /// Outward normal of the face.
    pub fn normal(&self) -> Vector3<f32> {
        match self {
            BoxFace::Right => Vector3::unit_x(),
            BoxFace::Left => -Vector3::unit_x(),
            BoxFace::Top => Vector3::unit_y(),
            BoxFace::Bottom => -Vector3::unit_y(),
            BoxFace::Front => Vector3::unit_z(),
            BoxFace::Back => -Vector3::unit_z(),
        }
    }

    /// The u and v directions of the face's texture. `u x v` is the outward
    /// normal, so corners listed (-u,-v), (u,-v), (u,v), (-u,v) wind
    /// counter-clockwise seen from outside.
    fn tangents(&self) -> (Vector3<f32>, Vector3<f32>) {
        match self {
            BoxFace::Right => (-Vector3::unit_z(), Vector3::unit_y()),
            BoxFace::Left => (Vector3::unit_z(), Vector3::unit_y()),
            BoxFace::Top => (Vector3::unit_x(), -Vector3::unit_z()),
            BoxFace::Bottom => (Vector3::unit_x(), Vector3::unit_z()),
            BoxFace::Front => (Vector3::unit_x(), Vector3::unit_y()),
            BoxFace::Back => (-Vector3::unit_x(), Vector3::unit_y()),
        }
    }
}

impl Geometry {
    fn push_group(&mut self, start: usize, material: usize) {
        self.groups.push(Group {
            start: start as u32,
            count: (self.indices.len() - start) as u32,
            material,
        });
    }

    /// Appends a quad centred on `centre`, spanning `half_u` along `u` and
    /// `half_v` along `v`.
    fn push_quad(
        &mut self,
        centre: Vector3<f32>,
        (u, v): (Vector3<f32>, Vector3<f32>),
        half_u: f32,
        half_v: f32,
        normal: Vector3<f32>,
    ) {
        let base = self.vertices.len() as u32;
        // wgpu samples textures with v pointing down
        let corners = [(-1.0, -1.0, [0.0, 1.0]), (1.0, -1.0, [1.0, 1.0]), (1.0, 1.0, [1.0, 0.0]), (-1.0, 1.0, [0.0, 0.0])];
        for (su, sv, tex_coords) in corners {
            let position = centre + u * (su * half_u) + v * (sv * half_v);
            self.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords,
                normal: normal.into(),
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// An axis aligned box centred on the origin with one group per face, in
    /// [`BoxFace::ORDER`]. Group `i` uses material `i`.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
        let extent = |axis: Vector3<f32>| axis.x.abs() * half.x + axis.y.abs() * half.y + axis.z.abs() * half.z;

        let mut geometry = Geometry::default();
        for (material, face) in BoxFace::ORDER.iter().enumerate() {
            let start = geometry.indices.len();
            let normal = face.normal();
            let (u, v) = face.tangents();
            geometry.push_quad(normal * extent(normal), (u, v), extent(u), extent(v), normal);
            geometry.push_group(start, material);
        }
        geometry
    }

    /// A `width` x `height` rectangle in the x/y plane facing `+z`.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Geometry::default();
        geometry.push_quad(
            Vector3::new(0.0, 0.0, 0.0),
            (Vector3::unit_x(), Vector3::unit_y()),
            width / 2.0,
            height / 2.0,
            Vector3::unit_z(),
        );
        geometry.push_group(0, 0);
        geometry
    }

    /// Sweeps `shape` from `z = 0` to `z = depth`. The result has a back cap,
    /// a front cap and side walls, all in a single group using material 0.
    pub fn extrude(shape: &Shape, depth: f32) -> Self {
        let mut outline = shape.outline();
        if signed_area(&outline) < 0.0 {
            outline.reverse();
        }
        let mut geometry = Geometry::default();
        if outline.len() < 3 {
            return geometry;
        }
        let triangles = triangulate(&outline);

        // caps
        for (z, normal, flip) in [(0.0, -Vector3::unit_z(), true), (depth, Vector3::unit_z(), false)] {
            let base = geometry.vertices.len() as u32;
            for point in &outline {
                geometry.vertices.push(ModelVertex {
                    position: [point.x, point.y, z],
                    tex_coords: [point.x, point.y],
                    normal: normal.into(),
                });
            }
            for [a, b, c] in &triangles {
                let (a, b, c) = (base + *a as u32, base + *b as u32, base + *c as u32);
                if flip {
                    geometry.indices.extend_from_slice(&[a, c, b]);
                } else {
                    geometry.indices.extend_from_slice(&[a, b, c]);
                }
            }
        }

        // walls
        for i in 0..outline.len() {
            let p0 = outline[i];
            let p1 = outline[(i + 1) % outline.len()];
            let edge = p1 - p0;
            if edge.magnitude2() == 0.0 {
                continue;
            }
            let normal = Vector3::new(edge.y, -edge.x, 0.0).normalize();
            let base = geometry.vertices.len() as u32;
            let corners = [
                ([p0.x, p0.y, 0.0], [0.0, 1.0]),
                ([p1.x, p1.y, 0.0], [1.0, 1.0]),
                ([p1.x, p1.y, depth], [1.0, 0.0]),
                ([p0.x, p0.y, depth], [0.0, 0.0]),
            ];
            for (position, tex_coords) in corners {
                geometry.vertices.push(ModelVertex {
                    position,
                    tex_coords,
                    normal: normal.into(),
                });
            }
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        geometry.push_group(0, 0);
        geometry
    }
}

/// A closed 2D outline built from straight segments.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    points: Vec<Point2<f32>>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `width` x `height` rectangle centred on the origin.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        let mut shape = Shape::new();
        shape
            .move_to(-w, -h)
            .line_to(w, -h)
            .line_to(w, h)
            .line_to(-w, h)
            .line_to(-w, -h);
        shape
    }

    /// Starts the outline over at `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.points.clear();
        self.points.push(Point2::new(x, y));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.points.push(Point2::new(x, y));
        self
    }

    /// The outline's corners without the closing point.
    pub fn outline(&self) -> Vec<Point2<f32>> {
        let mut points = self.points.clone();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

fn signed_area(points: &[Point2<f32>]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn inside_triangle(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear clipping for a simple, counter-clockwise polygon. Returns index triples
/// into `points`, each wound counter-clockwise.
fn triangulate(points: &[Point2<f32>]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let (prev, curr, next) = (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
            let (a, b, c) = (points[prev], points[curr], points[next]);
            cross(a, b, c) > 0.0
                && remaining
                    .iter()
                    .filter(|&&j| j != prev && j != curr && j != next)
                    .all(|&j| !inside_triangle(points[j], a, b, c))
        });
        let Some(i) = ear else {
            log::warn!("outline is not a simple polygon, {} corners left untriangulated", n);
            break;
        };
        triangles.push([remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]]);
        remaining.remove(i);
    }
    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_of(geometry: &Geometry, tri: &[u32]) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(geometry.vertices[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn cuboid_has_one_group_per_face_in_order() {
        let geometry = Geometry::cuboid(400.0, 400.0, 900.0);
        assert_eq!(geometry.groups.len(), 6);
        for (i, (group, face)) in geometry.groups.iter().zip(BoxFace::ORDER).enumerate() {
            assert_eq!(group.material, i);
            assert_eq!(group.count, 6);
            let start = group.start as usize;
            let tri = &geometry.indices[start..start + 3];
            assert!((normal_of(&geometry, tri) - face.normal()).magnitude() < 1e-5, "{:?}", face);
        }
    }

    #[test]
    fn cuboid_faces_sit_on_the_box_bounds() {
        let geometry = Geometry::cuboid(400.0, 400.0, 900.0);
        let front = geometry.groups[4];
        for &i in &geometry.indices[front.start as usize..(front.start + front.count) as usize] {
            let [x, y, z] = geometry.vertices[i as usize].position;
            assert_eq!(z, 450.0);
            assert_eq!(x.abs(), 200.0);
            assert_eq!(y.abs(), 200.0);
        }
        let left = geometry.groups[1];
        let i = geometry.indices[left.start as usize];
        assert_eq!(geometry.vertices[i as usize].position[0], -200.0);
    }

    #[test]
    fn plane_faces_positive_z() {
        let geometry = Geometry::plane(90.0, 90.0);
        assert_eq!(geometry.vertices.len(), 4);
        assert_eq!(geometry.indices.len(), 6);
        assert!((normal_of(&geometry, &geometry.indices[0..3]) - Vector3::unit_z()).magnitude() < 1e-5);
    }

    #[test]
    fn shape_drops_the_closing_point() {
        let shape = Shape::rectangle(100.0, 100.0);
        assert_eq!(shape.outline().len(), 4);
    }

    #[test]
    fn extruded_square_has_caps_and_four_walls() {
        let geometry = Geometry::extrude(&Shape::rectangle(100.0, 100.0), 30.0);
        // two caps of two triangles, four walls of two triangles
        assert_eq!(geometry.indices.len(), (2 * 2 + 4 * 2) * 3);
        assert_eq!(geometry.groups.len(), 1);
        let zs: Vec<f32> = geometry.vertices.iter().map(|v| v.position[2]).collect();
        assert!(zs.iter().all(|&z| z == 0.0 || z == 30.0));

        let back_cap = normal_of(&geometry, &geometry.indices[0..3]);
        let front_cap = normal_of(&geometry, &geometry.indices[6..9]);
        assert!((back_cap + Vector3::unit_z()).magnitude() < 1e-5);
        assert!((front_cap - Vector3::unit_z()).magnitude() < 1e-5);
    }

    #[test]
    fn extruded_walls_face_outward() {
        let geometry = Geometry::extrude(&Shape::rectangle(100.0, 100.0), 30.0);
        for tri in geometry.indices[12..].chunks(3) {
            let normal = normal_of(&geometry, tri);
            let centre = tri
                .iter()
                .map(|&i| Vector3::from(geometry.vertices[i as usize].position))
                .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p / 3.0);
            let outward = Vector3::new(centre.x, centre.y, 0.0);
            assert!(normal.dot(outward) > 0.0);
        }
    }

    #[test]
    fn clockwise_outlines_are_rewound() {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).line_to(0.0, 10.0).line_to(10.0, 10.0).line_to(10.0, 0.0);
        let geometry = Geometry::extrude(&shape, 1.0);
        let front_cap = normal_of(&geometry, &geometry.indices[6..9]);
        assert!((front_cap - Vector3::unit_z()).magnitude() < 1e-5);
    }

    #[test]
    fn concave_outline_is_fully_triangulated() {
        // an L shape
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let triangles = triangulate(&points);
        assert_eq!(triangles.len(), 4);
        let area: f32 = triangles
            .iter()
            .map(|[a, b, c]| cross(points[*a], points[*b], points[*c]) / 2.0)
            .sum();
        assert!((area - 3.0).abs() < 1e-5);
    }
}
