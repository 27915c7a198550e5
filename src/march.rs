use glam::Vec3;

use crate::scene::DistanceEstimator;

/// Upper bound on scene evaluations per ray.
pub const MAX_MARCHING_STEPS: u32 = 255;
/// A sample closer than this to a surface counts as a hit.
pub const EPSILON: f32 = 1e-4;
pub const MIN_DIST: f32 = 0.0;
pub const MAX_DIST: f32 = 100.0;

/// Valid marching range along a ray. `far` is also returned on a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceInterval {
    pub near: f32,
    pub far: f32,
}

impl DistanceInterval {
    pub fn new(near: f32, far: f32) -> Self {
        debug_assert!(
            0.0 <= near && near <= far,
            "invalid marching interval [{near}, {far}]"
        );
        Self { near, far }
    }
}

impl Default for DistanceInterval {
    fn default() -> Self {
        Self::new(MIN_DIST, MAX_DIST)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Surface(f32),
    Miss,
}

impl Hit {
    pub fn is_hit(&self) -> bool {
        matches!(self, Hit::Surface(_))
    }
}

/// Sphere traces `scene` from `eye` along the unit vector `dir`.
///
/// Returns the depth of the first sample within [`EPSILON`] of a surface, or
/// `interval.far` when the ray leaves the interval or runs out of steps.
pub fn march<E>(scene: &E, eye: Vec3, dir: Vec3, interval: DistanceInterval) -> f32
where
    E: DistanceEstimator + ?Sized,
{
    let mut depth = interval.near;
    for _ in 0..MAX_MARCHING_STEPS {
        let dist = scene.distance(eye + depth * dir);
        if dist < EPSILON {
            return depth;
        }
        // The estimate is a lower bound on the distance to any surface.
        depth += dist;
        if depth >= interval.far {
            return interval.far;
        }
    }
    interval.far
}

/// Classifies a depth returned by [`march`].
///
/// `march` already reports every miss as exactly `far`; the tolerance here
/// keeps the check valid for depths that went through other arithmetic.
pub fn classify(depth: f32, interval: DistanceInterval) -> Hit {
    if depth >= interval.far - EPSILON {
        Hit::Miss
    } else {
        Hit::Surface(depth)
    }
}
