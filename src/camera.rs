//! Perspective camera, its GPU uniform and the mouse/keyboard controller.
//!
//! The camera follows the usual right-handed convention: in its local frame it
//! looks down `-z` with `+y` up. Its orientation is a quaternion so that
//! camera-local directions can be turned into world directions directly.

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Quaternion, Rad, Vector2, Vector3, Zero,
};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalPosition;

use crate::{
    config::CameraConfig,
    host::{KeyPress, Viewport},
};

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective projection with a cached matrix.
///
/// The matrix is only recomputed by [`Projection::resize`] (or
/// [`Projection::update_matrix`]), so changing the fields without refreshing
/// leaves the old projection in place.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
            matrix: Matrix4::zero(),
        };
        projection.update_matrix();
        projection
    }

    /// Sets the aspect ratio to `width / height` and refreshes the matrix.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
        self.update_matrix();
    }

    pub fn update_matrix(&mut self) {
        self.matrix = cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub rotation: Quaternion<f32>,
    pub projection: Projection,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, projection: Projection) -> Self {
        Self {
            position: position.into(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            projection,
        }
    }

    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let projection = Projection::new(
            width,
            height,
            cgmath::Deg(config.fov),
            config.znear,
            config.zfar,
        );
        Self::new(config.position, projection)
    }

    /// Turns a direction from camera space into world space.
    pub fn to_world(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.rotation * local
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.to_world(-Vector3::unit_z())
    }

    /// Rotates the camera so that it faces `target`, keeping `+y` as up.
    ///
    /// Looking straight up or down has no unique orientation; the view
    /// direction is nudged slightly off the up axis in that case.
    pub fn look_at(&mut self, target: Point3<f32>) {
        let up = Vector3::unit_y();
        let mut back = self.position - target;
        if back.magnitude2() == 0.0 {
            back.z = 1.0;
        }
        let mut back = back.normalize();
        let mut right = up.cross(back);
        if right.magnitude2() == 0.0 {
            back.z += 0.0001;
            back = back.normalize();
            right = up.cross(back);
        }
        let right = right.normalize();
        let up = back.cross(right);
        self.rotation = Quaternion::from(Matrix3::from_cols(right, up, back)).normalize();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation.conjugate()) * Matrix4::from_translation(-self.position.to_vec())
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection.matrix() * self.view_matrix()
    }
}

/// The camera data as it is laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = camera.view_projection().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: the uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera) {
        self.uniform.update_view_proj(camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// What the right arrow key does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StrafeMode {
    /// Right moves right.
    #[default]
    Corrected,
    /// Right moves left, exactly like the left arrow key. This is how the
    /// gallery first shipped and is kept for anyone relying on it.
    Legacy,
}

/// Moves the camera in response to cursor movement and arrow keys.
///
/// Cursor movement pulls the camera a small, fixed fraction of the way toward a
/// point on the `z = 0` plane and turns it toward the same point pushed
/// `look_ahead` along `+z`. The pull is applied per event, so faster mice
/// move the camera faster. Arrow keys step the camera along its own axes.
#[derive(Clone, Debug)]
pub struct CameraController {
    mouse_range: f32,
    look_ahead: f32,
    lerp_factor: f32,
    step_distance: f32,
    strafe: StrafeMode,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            mouse_range: config.mouse_range,
            look_ahead: config.look_ahead,
            lerp_factor: config.lerp_factor,
            step_distance: config.step_distance,
            strafe: config.strafe,
        }
    }

    pub fn step_distance(&self) -> f32 {
        self.step_distance
    }

    /// Cursor position relative to `rect`, in `[-1, 1]` on both axes with `+y` up.
    /// `None` when the rect has no area.
    pub fn normalized_cursor(cursor: PhysicalPosition<f64>, rect: &Viewport) -> Option<Vector2<f32>> {
        if rect.is_empty() {
            return None;
        }
        let x = (cursor.x - rect.left) / rect.width * 2.0 - 1.0;
        let y = -(cursor.y - rect.top) / rect.height * 2.0 + 1.0;
        Some(Vector2::new(x as f32, y as f32))
    }

    /// The point on the camera's movement plane a normalized cursor maps to.
    pub fn mouse_target(&self, cursor: Vector2<f32>) -> Point3<f32> {
        Point3::new(cursor.x * self.mouse_range, cursor.y * self.mouse_range, 0.0)
    }

    pub fn handle_mouse(&self, camera: &mut Camera, cursor: PhysicalPosition<f64>, rect: &Viewport) -> bool {
        let Some(ndc) = Self::normalized_cursor(cursor, rect) else {
            return false;
        };
        let target = self.mouse_target(ndc);
        camera.position += (target - camera.position) * self.lerp_factor;
        camera.look_at(Point3::new(target.x, target.y, self.look_ahead));
        log::trace!(
            "mouse at {:?} pulls camera toward {:?}, now at {:?}",
            ndc,
            target,
            camera.position
        );
        true
    }

    /// Direction in camera space an arrow key moves along, or `None` for keys
    /// that are ignored.
    pub fn local_direction(&self, key: KeyPress) -> Option<Vector3<f32>> {
        match key {
            KeyPress::ArrowUp => Some(Vector3::new(0.0, 0.0, -1.0)),
            KeyPress::ArrowDown => Some(Vector3::new(0.0, 0.0, 1.0)),
            KeyPress::ArrowLeft => Some(Vector3::new(-1.0, 0.0, 0.0)),
            KeyPress::ArrowRight => match self.strafe {
                StrafeMode::Corrected => Some(Vector3::new(1.0, 0.0, 0.0)),
                StrafeMode::Legacy => Some(Vector3::new(-1.0, 0.0, 0.0)),
            },
            KeyPress::Other => None,
        }
    }

    pub fn handle_key(&self, camera: &mut Camera, key: KeyPress) -> bool {
        let Some(local) = self.local_direction(key) else {
            return false;
        };
        let offset = camera.to_world(local) * self.step_distance;
        camera.position += offset;
        log::trace!("{:?} moved camera by {:?}", key, offset);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    fn camera() -> Camera {
        Camera::from_config(&CameraConfig::default(), 800, 600)
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = camera();
        assert!(close(camera.forward(), Vector3::new(0.0, 0.0, -1.0)));
        assert_eq!(camera.position, Point3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut camera = camera();
        camera.look_at(Point3::new(100.0, 0.0, 10.0));
        assert!(close(camera.forward(), Vector3::new(0.0, 0.0, 1.0)));

        camera.look_at(Point3::new(0.0, 0.0, 0.0));
        assert!(close(camera.forward(), Vector3::new(-1.0, 0.0, 0.0)));
        // up stays up when looking horizontally
        assert!(close(camera.to_world(Vector3::unit_y()), Vector3::unit_y()));
    }

    #[test]
    fn look_at_straight_up_does_not_produce_nan() {
        let mut camera = camera();
        camera.look_at(Point3::new(100.0, 50.0, 0.0));
        let forward = camera.forward();
        assert!(!forward.x.is_nan() && !forward.y.is_nan() && !forward.z.is_nan());
        assert!(forward.y > 0.99);
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let camera = camera();
        let eye = camera.view_matrix() * camera.position.to_homogeneous();
        assert!(eye.truncate().magnitude() < 1e-4);
    }

    #[test]
    fn projection_resize_updates_aspect_and_matrix() {
        let mut projection = Projection::new(800, 600, cgmath::Deg(90.0), 0.1, 1000.0);
        let before = projection.matrix();
        projection.resize(1000, 500);
        assert_eq!(projection.aspect(), 2.0);
        assert_ne!(before, projection.matrix());
        assert_eq!(
            projection.matrix(),
            cgmath::perspective(cgmath::Deg(90.0), 2.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn normalized_cursor_spans_the_rect() {
        let rect = Viewport {
            left: 10.0,
            top: 20.0,
            width: 200.0,
            height: 100.0,
        };
        let top_left = CameraController::normalized_cursor((10.0, 20.0).into(), &rect).unwrap();
        let bottom_right = CameraController::normalized_cursor((210.0, 120.0).into(), &rect).unwrap();
        assert_eq!(top_left, Vector2::new(-1.0, 1.0));
        assert_eq!(bottom_right, Vector2::new(1.0, -1.0));
    }

    #[test]
    fn empty_rect_ignores_mouse() {
        let controller = CameraController::new(&CameraConfig::default());
        let mut camera = camera();
        let rect = Viewport {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
        assert!(!controller.handle_mouse(&mut camera, (5.0, 5.0).into(), &rect));
        assert_eq!(camera.position, Point3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn other_keys_do_nothing() {
        let controller = CameraController::new(&CameraConfig::default());
        let mut camera = camera();
        assert!(!controller.handle_key(&mut camera, KeyPress::Other));
        assert_eq!(camera.position, Point3::new(100.0, 0.0, 0.0));
    }
}
