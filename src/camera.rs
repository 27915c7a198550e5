use glam::{Vec2, Vec3};
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::{ray::Ray, util::math::degree_to_radian};

/// Direction of the ray leaving the eye through `pixel_coord`.
///
/// The pixel coordinate is centered on the viewport and pushed back along -z
/// by the projection distance implied by the vertical field of view, so the
/// eye always looks toward -z.
///
/// `fov_degrees` must lie in (0, 180) and both `viewport_size` components must
/// be positive; degenerate values are not special-cased.
pub fn ray_direction(fov_degrees: f32, viewport_size: Vec2, pixel_coord: Vec2) -> Vec3 {
    let xy = pixel_coord - viewport_size / 2.0;
    let z = viewport_size.y / (degree_to_radian(fov_degrees) / 2.0).tan();
    Vec3::new(xy.x, xy.y, -z).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub fov_degrees: f32,
}

impl Camera {
    pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
    pub const DEFAULT_FOV_DEGREES: f32 = 45.0;

    pub fn new(eye: Vec3, fov_degrees: f32) -> Self {
        Self { eye, fov_degrees }
    }

    pub fn ray(&self, viewport_size: Vec2, pixel_coord: Vec2) -> Ray {
        Ray::new(
            self.eye,
            ray_direction(self.fov_degrees, viewport_size, pixel_coord),
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EYE, Self::DEFAULT_FOV_DEGREES)
    }
}

/// Moves the eye along the z axis from keyboard input.
pub struct CameraController {
    pub speed: f32,
}

impl CameraController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Returns `true` when the camera moved.
    pub fn process_events(&self, camera: &mut Camera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => self.process_key(camera, *keycode),
            _ => false,
        }
    }

    pub fn process_key(&self, camera: &mut Camera, keycode: VirtualKeyCode) -> bool {
        match keycode {
            VirtualKeyCode::W => {
                camera.eye.z -= self.speed;
                tracing::debug!(eye = %camera.eye, "camera forward");
                true
            }
            VirtualKeyCode::S => {
                camera.eye.z += self.speed;
                tracing::debug!(eye = %camera.eye, "camera backward");
                true
            }
            _ => false,
        }
    }
}
