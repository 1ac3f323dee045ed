//! Free-function vector helpers on top of `nalgebra::Vector3<f64>`
//!
//! nalgebra already provides dot and cross products; the helpers here pin down
//! the exact floating-point behavior the attitude solver relies on (zero-safe
//! normalisation, plane projection and clamped angles).

use nalgebra::Vector3;

/// Canonical body axis +X
pub fn unit_x() -> Vector3<f64> {
    Vector3::new(1.0, 0.0, 0.0)
}

/// Canonical body axis +Y
pub fn unit_y() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, 0.0)
}

/// Canonical body axis +Z
pub fn unit_z() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 1.0)
}

/// Normalise a vector, leaving the zero vector untouched
///
/// Multiplies by the reciprocal of the length rather than dividing each
/// component, so results are reproducible against scenes produced by the
/// scripting front-end.
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    let length = v.norm();
    let length = if length == 0.0 { 1.0 } else { length };
    v * (1.0 / length)
}

/// Normalise a vector, returning `None` for the zero vector
pub fn try_normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let length = v.norm();
    if length == 0.0 || !length.is_finite() {
        None
    } else {
        Some(v * (1.0 / length))
    }
}

/// Project `v` onto the line spanned by `onto`
///
/// Projection onto the zero vector yields the zero vector.
pub fn project_on_vector(v: &Vector3<f64>, onto: &Vector3<f64>) -> Vector3<f64> {
    let denominator = onto.norm_squared();
    if denominator == 0.0 {
        return Vector3::zeros();
    }
    let scalar = onto.dot(v) / denominator;
    onto * scalar
}

/// Remove from `v` its component along `plane_normal`
pub fn project_on_plane(v: &Vector3<f64>, plane_normal: &Vector3<f64>) -> Vector3<f64> {
    v - project_on_vector(v, plane_normal)
}

/// Angle between two vectors in radians, in `[0, π]`
///
/// Returns `None` when either vector has zero length. The cosine is clamped to
/// `[-1, 1]` before `acos` to absorb floating-point overshoot.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let magnitude_product = a.norm() * b.norm();
    if magnitude_product == 0.0 {
        return None;
    }
    let cosine = (a.dot(b) / magnitude_product).clamp(-1.0, 1.0);
    Some(cosine.acos())
}

/// Convert a `[x, y, z]` array into a vector
pub fn from_array(values: [f64; 3]) -> Vector3<f64> {
    Vector3::new(values[0], values[1], values[2])
}

/// Convert a vector into a `[x, y, z]` array
pub fn to_array(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}
