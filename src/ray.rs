use glam::Vec3;

/// A ray cast from the eye through one pixel. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        debug_assert!(
            direction.is_normalized(),
            "ray direction must be unit length, got {direction}"
        );
        Self { origin, direction }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_walks_along_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(ray.at(0.0), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.at(4.0), Vec3::new(0.0, 0.0, 1.0));
    }
}
