//! Static configuration of the gallery.
//!
//! [`GalleryConfig::default`] describes the room exactly as it is shown by the
//! `gallery-room` binary: a 400 x 400 x 900 box, three paintings, three window
//! frames, two lights and a camera that starts at `(100, 0, 0)`.
//!
//! The configuration is read once when the gallery is constructed. Changing it
//! afterwards has no effect on a running gallery.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Point3, Vector3};

use crate::camera::StrafeMode;

/// Top-level configuration passed to [`crate::flow::run`].
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    pub room: RoomConfig,
    pub paintings: Vec<PaintingConfig>,
    pub windows: WindowFrameConfig,
    pub lights: LightsConfig,
    pub camera: CameraConfig,
    pub clear_colour: wgpu::Color,
    /// Id of the DOM element the canvas is appended to on the web. The canvas
    /// goes to `<body>` when no element with this id exists.
    pub container_id: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            paintings: vec![
                PaintingConfig {
                    texture: "images/painting1.jpg".to_string(),
                    size: [90.0, 90.0],
                    position: Vector3::new(0.0, 100.0, 439.0),
                    yaw: PI,
                },
                PaintingConfig {
                    texture: "images/painting2.jpg".to_string(),
                    size: [90.0, 90.0],
                    position: Vector3::new(-190.0, 100.0, 100.0),
                    yaw: FRAC_PI_2,
                },
                PaintingConfig {
                    texture: "images/painting3.jpg".to_string(),
                    size: [90.0, 90.0],
                    position: Vector3::new(-190.0, 100.0, -100.0),
                    yaw: FRAC_PI_2,
                },
            ],
            windows: WindowFrameConfig::default(),
            lights: LightsConfig::default(),
            camera: CameraConfig::default(),
            clear_colour: wgpu::Color::BLACK,
            container_id: "gallery".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoomConfig {
    /// Width (x), height (y) and depth (z) of the room box.
    pub size: Vector3<f32>,
    pub wall_texture: String,
    pub floor_texture: String,
    /// sRGB tint applied to the four side walls. The ceiling is untinted.
    pub wall_tint: u32,
    /// How often the floor texture repeats along u and v.
    pub floor_repeat: [f32; 2],
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            size: Vector3::new(400.0, 400.0, 900.0),
            wall_texture: "images/wall_texture.jpg".to_string(),
            floor_texture: "images/floor_texture.jpg".to_string(),
            wall_tint: 0x404040,
            floor_repeat: [3.0, 8.0],
        }
    }
}

#[derive(Clone, Debug)]
pub struct PaintingConfig {
    pub texture: String,
    pub size: [f32; 2],
    pub position: Vector3<f32>,
    /// Rotation around the y axis in radians.
    pub yaw: f32,
}

/// Position and y-rotation of a single window frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub yaw: f32,
}

#[derive(Clone, Debug)]
pub struct WindowFrameConfig {
    pub width: f32,
    pub height: f32,
    /// Extrusion depth of the frame.
    pub depth: f32,
    pub colour: u32,
    pub placements: Vec<Placement>,
}

impl Default for WindowFrameConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            depth: 30.0,
            // css "brown"
            colour: 0xa52a2a,
            placements: vec![
                Placement {
                    position: Vector3::new(0.0, 100.0, 440.0),
                    yaw: 0.0,
                },
                Placement {
                    position: Vector3::new(-191.0, 100.0, 100.0),
                    yaw: -FRAC_PI_2,
                },
                Placement {
                    position: Vector3::new(-191.0, 100.0, -100.0),
                    yaw: -FRAC_PI_2,
                },
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct LightsConfig {
    pub ambient_colour: u32,
    pub ambient_intensity: f32,
    pub directional_colour: u32,
    pub directional_intensity: f32,
    pub directional_position: Vector3<f32>,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient_colour: 0xff00ff,
            ambient_intensity: 1.0,
            directional_colour: 0xffffff,
            directional_intensity: 0.5,
            directional_position: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Camera start pose, projection and input tuning.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Distance the cursor can pull the camera away from the origin on the x/y plane.
    pub mouse_range: f32,
    /// z coordinate of the point the camera looks at after a mouse move.
    pub look_ahead: f32,
    /// Fraction of the way the camera moves toward the cursor target per mouse event.
    pub lerp_factor: f32,
    /// Distance covered by one arrow key press.
    pub step_distance: f32,
    pub strafe: StrafeMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(100.0, 0.0, 0.0),
            fov: 90.0,
            znear: 0.1,
            zfar: 1000.0,
            mouse_range: 100.0,
            look_ahead: 10.0,
            lerp_factor: 0.001,
            step_distance: 5.0,
            strafe: StrafeMode::Corrected,
        }
    }
}

/// Converts a `0xRRGGBB` sRGB colour into linear rgb, which is what the shaders
/// work in before the sRGB surface encodes the result again.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}
