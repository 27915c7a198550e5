pub mod math {
    pub fn degree_to_radian(degree: f32) -> f32 {
        degree * std::f32::consts::PI / 180.0
    }

    /// Approximate float equality, for checks on values that went through
    /// trigonometry or a square root.
    pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
        (a - b).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::math::*;

    #[test]
    fn degree_to_radian_known_angles() {
        assert!(approx_eq(degree_to_radian(180.0), std::f32::consts::PI, 1e-6));
        assert!(approx_eq(degree_to_radian(45.0), std::f32::consts::FRAC_PI_4, 1e-6));
        assert_eq!(degree_to_radian(0.0), 0.0);
    }
}
