/*
 * Camera Module
 *
 * This module defines the first-person Camera that looks into the dome.
 * It holds position and heading and derives the view and projection
 * matrices handed to the renderer each frame.
 */

use glam::{Mat4, Vec3};

pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);
pub const DEFAULT_SPEED: f32 = 1.5;
pub const DEFAULT_ROTATION_SPEED: f32 = 1.2;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Heading around the vertical axis in radians; zero looks down -Z.
    pub yaw: f32,
    /// Translation speed in world units per second.
    pub speed: f32,
    /// Yaw speed in radians per second.
    pub rotation_speed: f32,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: DEFAULT_POSITION,
            yaw: 0.0,
            speed: DEFAULT_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            fov_y_degrees: 70.0,
            aspect: 1280.0 / 720.0,
            near: 0.1,
            far: 100.0,
        }
    }

    // Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    // Keep the aspect ratio in sync with the window
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn reset(&mut self) {
        self.position = DEFAULT_POSITION;
        self.yaw = 0.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
