use glam::{Vec2, Vec3, Vec4};

use crate::{
    camera::Camera,
    march::{classify, march, DistanceInterval, Hit},
    scene::{DistanceEstimator, Scene},
};

pub const HIT_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const MISS_COLOR: Vec4 = Vec4::ZERO;

/// Per-pixel shading setup, shared read-only by every pixel of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelShader {
    pub camera: Camera,
    /// Virtual screen the tex coordinate is placed on.
    pub viewport: Vec2,
    pub interval: DistanceInterval,
    pub hit_color: Vec4,
    pub miss_color: Vec4,
}

impl PixelShader {
    pub fn with_camera(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn shade<E>(&self, scene: &E, tex_coord: Vec2) -> Vec4
    where
        E: DistanceEstimator + ?Sized,
    {
        let ray = self.camera.ray(self.viewport, tex_coord);
        let depth = march(scene, ray.origin, ray.direction, self.interval);
        match classify(depth, self.interval) {
            Hit::Surface(_) => self.hit_color,
            Hit::Miss => self.miss_color,
        }
    }
}

impl Default for PixelShader {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            viewport: Vec2::ONE,
            interval: DistanceInterval::default(),
            hit_color: HIT_COLOR,
            miss_color: MISS_COLOR,
        }
    }
}

/// Color of the reference scene at `tex_coord` in `[0, 1]^2`.
pub fn color(tex_coord: Vec2) -> Vec4 {
    PixelShader::default().shade(&Scene::default(), tex_coord)
}

/// Uniform block read by `raymarch.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub resolution: [f32; 2],
    // vec3 members are 16 byte aligned in WGSL
    _padding: [f32; 2],
    pub eye: [f32; 3],
    pub fov_degrees: f32,
}

impl Uniforms {
    pub fn new(resolution: Vec2, camera: &Camera) -> Self {
        Self {
            resolution: resolution.to_array(),
            _padding: [0.0; 2],
            eye: camera.eye.to_array(),
            fov_degrees: camera.fov_degrees,
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_hits_sphere() {
        assert_eq!(color(Vec2::splat(0.5)), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn corner_pixels_miss() {
        for corner in [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE] {
            assert_eq!(color(corner), Vec4::ZERO, "corner {corner}");
        }
    }

    #[test]
    fn edge_midpoints_still_hit() {
        // The sphere spans a little under half the unit viewport around its center.
        for coord in [Vec2::new(0.06, 0.5), Vec2::new(0.5, 0.94)] {
            assert_eq!(color(coord), HIT_COLOR, "coord {coord}");
        }
    }

    #[test]
    fn moving_the_eye_away_shrinks_the_sphere() {
        let coord = Vec2::new(0.06, 0.5);
        let far_away = PixelShader::with_camera(Camera::new(Vec3::new(0.0, 0.0, 20.0), 45.0));
        assert_eq!(far_away.shade(&Scene::default(), coord), MISS_COLOR);
        assert_eq!(far_away.shade(&Scene::default(), Vec2::splat(0.5)), HIT_COLOR);
    }

    #[test]
    fn custom_colors() {
        let shader = PixelShader {
            hit_color: Vec4::ONE,
            miss_color: Vec4::new(0.1, 0.2, 0.3, 1.0),
            ..PixelShader::default()
        };
        let scene = Scene::default();
        assert_eq!(shader.shade(&scene, Vec2::splat(0.5)), Vec4::ONE);
        assert_eq!(shader.shade(&scene, Vec2::ZERO), Vec4::new(0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 32);
        let uniforms = Uniforms::new(Vec2::new(800.0, 600.0), &Camera::default());
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniforms));
        assert_eq!(floats[0..2], [800.0, 600.0]);
        assert_eq!(floats[4..7], [0.0, 0.0, 5.0]);
        assert_eq!(floats[7], 45.0);
        assert_eq!(uniforms.eye(), Vec3::new(0.0, 0.0, 5.0));
    }
}
