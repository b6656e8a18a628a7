//! World-space coordinate helpers.
//!
//! The arena is a Y-up 3D space; gameplay movement happens on the XZ plane.

pub use glam::{Vec2, Vec3};

/// World-space up axis.
pub const UP: Vec3 = Vec3::Y;

/// Drops the vertical component of a vector.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Lifts a planar (x, z) input vector into world space.
#[must_use]
pub fn from_planar(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Checks whether `point` lies inside the sphere of `radius` around `center`.
///
/// Points exactly on the surface count as inside.
#[must_use]
pub fn within_sphere(center: Vec3, radius: f32, point: Vec3) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Horizontal unit direction from `from` towards `to`, or zero if they share
/// the same XZ position.
#[must_use]
pub fn planar_direction(from: Vec3, to: Vec3) -> Vec3 {
    flatten(to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_sphere_boundary() {
        let c = Vec3::ZERO;
        assert!(within_sphere(c, 2.0, Vec3::new(2.0, 0.0, 0.0)));
        assert!(within_sphere(c, 2.0, Vec3::new(0.0, 1.9, 0.0)));
        assert!(!within_sphere(c, 2.0, Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn test_planar_direction_ignores_height() {
        let dir = planar_direction(Vec3::ZERO, Vec3::new(3.0, 10.0, 4.0));
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-5);
        assert_eq!(planar_direction(Vec3::ONE, Vec3::new(1.0, 5.0, 1.0)), Vec3::ZERO);
    }
}
