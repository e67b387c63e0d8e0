use crate::math::{Quaternion, Vector3};

/// Rotation of `degrees` about a unit axis
pub fn axis_angle(axis: Vector3, degrees: f32) -> Quaternion {
    let a = degrees.to_radians() * 0.5;
    let sa = a.sin();
    let ca = a.cos();
    Quaternion::new(axis.x * sa, axis.y * sa, axis.z * sa, ca)
}

/// Euler angles in degrees, applied X first, then Y, then Z about the already rotated local axes
pub fn euler_degrees(angles: Vector3) -> Quaternion {
    axis_angle(Vector3::new(1.0, 0.0, 0.0), angles.x)
        * axis_angle(Vector3::new(0.0, 1.0, 0.0), angles.y)
        * axis_angle(Vector3::new(0.0, 0.0, 1.0), angles.z)
}

pub fn quat_dot(a: &Quaternion, b: &Quaternion) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w
}

/// Normalized linear interpolation along the shortest arc. `t` is clamped to [0, 1].
pub fn quat_nlerp(a: Quaternion, b: Quaternion, t: f32) -> Quaternion {
    let t = t.clamp(0.0, 1.0);

    // flip b onto a's hemisphere so we don't go the long way around
    let sign = if quat_dot(&a, &b) < 0.0 { -1.0 } else { 1.0 };

    let x = a.x + (b.x * sign - a.x) * t;
    let y = a.y + (b.y * sign - a.y) * t;
    let z = a.z + (b.z * sign - a.z) * t;
    let w = a.w + (b.w * sign - a.w) * t;

    let len = (x * x + y * y + z * z + w * w).sqrt();
    if len <= f32::EPSILON {
        return a;
    }

    Quaternion::new(x / len, y / len, z / len, w / len)
}

/// Angle in degrees between two orientations
pub fn quat_angle_between(a: &Quaternion, b: &Quaternion) -> f32 {
    let d = quat_dot(a, b).abs().min(1.0);
    (2.0 * d.acos()).to_degrees()
}

/// Component-wise comparison, treating q and -q as the same orientation
pub fn quat_approx_eq(a: &Quaternion, b: &Quaternion, eps: f32) -> bool {
    let sign = if quat_dot(a, b) < 0.0 { -1.0 } else { 1.0 };
    (a.x - b.x * sign).abs() <= eps
        && (a.y - b.y * sign).abs() <= eps
        && (a.z - b.z * sign).abs() <= eps
        && (a.w - b.w * sign).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_angle_matches_expected_half_angle() {
        let q = axis_angle(Vector3::new(0.0, 1.0, 0.0), 90.0);
        let h = std::f32::consts::FRAC_PI_4;
        assert!((q.y - h.sin()).abs() < 1e-6);
        assert!((q.w - h.cos()).abs() < 1e-6);
        assert_eq!(q.x, 0.0);
        assert_eq!(q.z, 0.0);
    }

    #[test]
    fn euler_zero_is_identity() {
        assert!(quat_approx_eq(&euler_degrees(Vector3::zero()), &Quaternion::identity(), 1e-6));
        assert!(quat_approx_eq(&euler_degrees(Vector3::new(0.0, 0.0, 90.0)), &axis_angle(Vector3::new(0.0, 0.0, 1.0), 90.0), 1e-6));
    }

    #[test]
    fn nlerp_endpoints_and_midpoint() {
        let a = Quaternion::identity();
        let b = axis_angle(Vector3::new(0.0, 0.0, 1.0), 90.0);

        assert!(quat_approx_eq(&quat_nlerp(a, b, 0.0), &a, 1e-5));
        assert!(quat_approx_eq(&quat_nlerp(a, b, 1.0), &b, 1e-5));
        assert!((quat_angle_between(&quat_nlerp(a, b, 0.5), &a) - 45.0).abs() < 1e-2);
    }

    #[test]
    fn nlerp_clamps_t() {
        let a = Quaternion::identity();
        let b = axis_angle(Vector3::new(1.0, 0.0, 0.0), 60.0);
        assert!(quat_approx_eq(&quat_nlerp(a, b, 2.0), &b, 1e-5));
        assert!(quat_approx_eq(&quat_nlerp(a, b, -1.0), &a, 1e-5));
    }

    #[test]
    fn nlerp_takes_the_short_way_around() {
        let a = Quaternion::identity();
        let b = axis_angle(Vector3::new(0.0, 1.0, 0.0), 90.0);
        let neg_b = Quaternion::new(-b.x, -b.y, -b.z, -b.w);
        let mid = quat_nlerp(a, neg_b, 0.5);
        assert!((quat_angle_between(&mid, &a) - 45.0).abs() < 1e-2);
    }
}
