//! Small helpers for flattening, projecting and interpolating directions.
use glam::{EulerRot, Quat, Vec3};

/// Returns `vector` with its vertical component removed.
///
/// # Examples
/// ```
/// use character_motor::vector_math::horizontal;
/// use glam::Vec3;
/// assert_eq!(horizontal(Vec3::new(3.0, -2.0, 4.0)), Vec3::new(3.0, 0.0, 4.0));
/// ```
#[must_use]
pub const fn horizontal(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}

/// Projects `vector` onto `onto`, yielding zero when `onto` has no length.
///
/// # Examples
///
/// ```
/// use character_motor::vector_math::project_or_zero;
/// use glam::Vec3;
/// let projected = project_or_zero(Vec3::new(2.0, 5.0, 0.0), Vec3::X);
/// assert_eq!(projected, Vec3::new(2.0, 0.0, 0.0));
/// assert_eq!(project_or_zero(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
/// ```
#[must_use]
pub fn project_or_zero(vector: Vec3, onto: Vec3) -> Vec3 {
    let length_sq = onto.length_squared();
    if length_sq <= f32::EPSILON || !length_sq.is_finite() {
        return Vec3::ZERO;
    }
    onto * (vector.dot(onto) / length_sq)
}

/// Spherically interpolates between two directions.
///
/// `t = 0` yields `from`, `t = 1` yields `to`. Both inputs are normalised
/// first; if either is zero the result is `from` normalised (or zero).
///
/// # Examples
///
/// ```
/// use character_motor::vector_math::slerp_direction;
/// use glam::Vec3;
/// let halfway = slerp_direction(Vec3::Y, Vec3::X, 0.5);
/// let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
/// assert!(halfway.abs_diff_eq(expected, 1e-5));
/// ```
#[must_use]
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let start = from.normalize_or_zero();
    let end = to.normalize_or_zero();
    if start == Vec3::ZERO || end == Vec3::ZERO {
        return start;
    }
    let arc = Quat::from_rotation_arc(start, end);
    Quat::IDENTITY.slerp(arc, t.clamp(0.0, 1.0)) * start
}

/// Re-aims a horizontal velocity so it runs along the ground plane.
///
/// The returned vector keeps the magnitude of `velocity` but is tangent to
/// the surface described by `ground_normal`, so walking uphill or downhill
/// follows the slope instead of drilling into or lifting off it.
#[must_use]
pub fn align_to_ground(velocity: Vec3, ground_normal: Vec3) -> Vec3 {
    let sideways = Vec3::Y.cross(velocity);
    sideways.cross(ground_normal).normalize_or_zero() * velocity.length()
}

/// Extracts the rotation about the world up axis from `rotation`, in radians.
///
/// # Examples
///
/// ```
/// use character_motor::vector_math::yaw_of;
/// use glam::Quat;
/// let yaw = yaw_of(Quat::from_rotation_y(0.5) * Quat::from_rotation_x(0.3));
/// assert!((yaw - 0.5).abs() < 1e-5);
/// ```
#[must_use]
pub fn yaw_of(rotation: Quat) -> f32 {
    let (yaw, _pitch, _roll) = rotation.to_euler(EulerRot::YXZ);
    yaw
}

/// Returns the elevation of `direction` above the horizontal plane, in
/// degrees. Zero-length input has an elevation of zero.
#[must_use]
pub fn elevation_degrees(direction: Vec3) -> f32 {
    direction
        .normalize_or_zero()
        .y
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees()
}
