use glam::Vec3;

/// Anything that can be evaluated as a signed distance estimate at a point.
///
/// Implementations must never overestimate the distance to the nearest
/// surface, otherwise the sphere tracer can step through geometry.
pub trait DistanceEstimator {
    fn distance(&self, point: Vec3) -> f32;
}

impl<F> DistanceEstimator for F
where
    F: Fn(Vec3) -> f32,
{
    #[inline]
    fn distance(&self, point: Vec3) -> f32 {
        self(point)
    }
}

/// Distance from `point` to the reference scene, a unit sphere at the origin.
#[inline]
pub fn scene_distance(point: Vec3) -> f32 {
    point.length() - 1.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 1.0,
        }
    }
}

impl DistanceEstimator for Sphere {
    #[inline]
    fn distance(&self, point: Vec3) -> f32 {
        (point - self.center).length() - self.radius
    }
}

/// Primitive shapes and the min/max combinators between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Union(Box<Shape>, Box<Shape>),
    Intersection(Box<Shape>, Box<Shape>),
    /// Removes the first shape from the second.
    Subtraction(Box<Shape>, Box<Shape>),
}

impl Shape {
    pub fn union(self, other: Shape) -> Self {
        Self::Union(Box::new(self), Box::new(other))
    }

    pub fn intersection(self, other: Shape) -> Self {
        Self::Intersection(Box::new(self), Box::new(other))
    }

    /// `self` with `cutter` carved out of it.
    pub fn subtract(self, cutter: Shape) -> Self {
        Self::Subtraction(Box::new(cutter), Box::new(self))
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl DistanceEstimator for Shape {
    fn distance(&self, point: Vec3) -> f32 {
        match self {
            Shape::Sphere(sphere) => sphere.distance(point),
            Shape::Union(a, b) => a.distance(point).min(b.distance(point)),
            Shape::Intersection(a, b) => a.distance(point).max(b.distance(point)),
            Shape::Subtraction(a, b) => (-a.distance(point)).max(b.distance(point)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub root: Shape,
}

impl Scene {
    pub fn new(root: impl Into<Shape>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Sphere::default())
    }
}

impl DistanceEstimator for Scene {
    #[inline]
    fn distance(&self, point: Vec3) -> f32 {
        self.root.distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Vec3> {
        let mut points = vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 5.0)];
        for i in -4..=4 {
            for j in -4..=4 {
                points.push(Vec3::new(i as f32 * 0.7, j as f32 * 1.3, (i * j) as f32 * 0.25));
            }
        }
        points
    }

    #[test]
    fn reference_sphere_distance() {
        for p in sample_points() {
            let d = scene_distance(p);
            assert_eq!(d, p.length() - 1.0);
            assert!(d >= -1.0);
        }
        assert_eq!(scene_distance(Vec3::ZERO), -1.0);
        assert_eq!(scene_distance(Vec3::Y), 0.0);
        assert_eq!(scene_distance(Vec3::new(0.0, 0.0, 5.0)), 4.0);
    }

    #[test]
    fn default_scene_matches_reference() {
        let scene = Scene::default();
        for p in sample_points() {
            assert_eq!(scene.distance(p), scene_distance(p));
        }
    }

    #[test]
    fn offset_sphere() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(sphere.distance(Vec3::new(1.0, 2.0, 3.0)), -0.5);
        assert_eq!(sphere.distance(Vec3::new(3.0, 2.0, 3.0)), 1.5);
    }

    #[test]
    fn combinators() {
        let left: Shape = Sphere::new(Vec3::new(-1.0, 0.0, 0.0), 1.0).into();
        let right: Shape = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0).into();

        // The origin touches both spheres.
        let union = left.clone().union(right.clone());
        assert_eq!(union.distance(Vec3::new(-2.5, 0.0, 0.0)), 0.5);
        assert_eq!(union.distance(Vec3::new(2.5, 0.0, 0.0)), 0.5);

        let intersection = left.clone().intersection(right.clone());
        assert_eq!(intersection.distance(Vec3::ZERO), 0.0);
        assert_eq!(intersection.distance(Vec3::new(-1.0, 0.0, 0.0)), 1.0);

        // Carving the right sphere out of the left one leaves the far side intact.
        let carved = left.subtract(right);
        assert_eq!(carved.distance(Vec3::new(-2.0, 0.0, 0.0)), 0.0);
        assert!(carved.distance(Vec3::new(0.5, 0.0, 0.0)) > 0.0);
        assert!(carved.distance(Vec3::new(-1.5, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn closures_are_estimators() {
        let plane = |p: Vec3| p.y;
        assert_eq!(plane.distance(Vec3::new(4.0, 2.0, 1.0)), 2.0);
    }
}
