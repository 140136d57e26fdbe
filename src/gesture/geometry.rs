//! Geometry helpers for landmark math.

use crate::tracking::Landmark;

/// Euclidean distance between two landmarks in 3-D.
pub fn distance(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Angle in degrees at `vertex` between the rays `vertex -> a` and
/// `vertex -> c`.
///
/// The cosine is clamped to [-1, 1] before `acos` to guard against
/// floating-point overshoot. A zero-length ray yields 0 degrees rather
/// than an error.
pub fn angle_at_vertex(a: Landmark, vertex: Landmark, c: Landmark) -> f32 {
    let v1 = [a.x - vertex.x, a.y - vertex.y, a.z - vertex.z];
    let v2 = [c.x - vertex.x, c.y - vertex.y, c.z - vertex.z];

    let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
    let m1 = (v1[0] * v1[0] + v1[1] * v1[1] + v1[2] * v1[2]).sqrt();
    let m2 = (v2[0] * v2[0] + v2[1] * v2[1] + v2[2] * v2[2]).sqrt();

    if m1 * m2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (dot / (m1 * m2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32, z: f32) -> Landmark {
        Landmark { x, y, z }
    }

    #[test]
    fn test_distance_axis_aligned() {
        assert_eq!(distance(lm(0.0, 0.0, 0.0), lm(3.0, 4.0, 0.0)), 5.0);
        assert_eq!(distance(lm(1.0, 1.0, 1.0), lm(1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_angle_right_angle() {
        let angle = angle_at_vertex(lm(1.0, 0.0, 0.0), lm(0.0, 0.0, 0.0), lm(0.0, 1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_angle_straight_line() {
        let angle = angle_at_vertex(lm(-1.0, 0.0, 0.0), lm(0.0, 0.0, 0.0), lm(1.0, 0.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_angle_is_symmetric() {
        let a = lm(0.3, 0.7, 0.1);
        let v = lm(0.5, 0.5, 0.0);
        let c = lm(0.9, 0.2, -0.2);
        assert_eq!(angle_at_vertex(a, v, c), angle_at_vertex(c, v, a));
    }

    #[test]
    fn test_angle_in_range_for_near_collinear_points() {
        // Nearly collinear rays push the raw cosine slightly outside
        // [-1, 1]; the clamp must keep the result finite and in [0, 180].
        let a = lm(0.1, 0.1, 0.1);
        let v = lm(0.2, 0.2, 0.2);
        let c = lm(0.30000001, 0.3, 0.3);
        let angle = angle_at_vertex(a, v, c);
        assert!(angle.is_finite());
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn test_angle_degenerate_ray_is_zero() {
        let v = lm(0.5, 0.5, 0.5);
        assert_eq!(angle_at_vertex(v, v, lm(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(angle_at_vertex(lm(1.0, 0.0, 0.0), v, v), 0.0);
    }
}
