//! # Quaternion Module
//!
//! Rotation quaternions in the **scalar-last** `[x, y, z, w]` convention used
//! throughout the scene, scripts and serialized orientation modes.
//!
//! ## Composition
//!
//! `a.multiply(&b)` (or `a * b`) is the Hamilton product: the resulting
//! rotation applies `b` first and then `a`.
//!
//! ## Normalisation
//!
//! Constructors that build rotations (`from_unit_vectors`, `from_axis_angle`,
//! `from_zyx_euler`) return unit quaternions. Quaternions supplied by users,
//! such as orientation offsets, are stored as given; composing with a
//! non-unit quaternion yields a non-unit result.
//!
//! ## Examples
//!
//! ```rust
//! use quaternions::math::Quaternion;
//! use nalgebra::Vector3;
//!
//! // Rotation taking +Z onto +X
//! let q = Quaternion::from_unit_vectors(&Vector3::z(), &Vector3::x());
//! let rotated = q.rotate_vector(&Vector3::z());
//! assert!((rotated - Vector3::x()).norm() < 1e-12);
//! ```

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

/// Rotation quaternion stored as `x, y, z, w`
///
/// Serializes as a plain `[x, y, z, w]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Creates a quaternion from its components (scalar last)
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quaternion { x, y, z, w }
    }

    /// The identity rotation `[0, 0, 0, 1]`
    pub fn identity() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Creates a quaternion from an `[x, y, z, w]` array
    pub fn from_array(q: [f64; 4]) -> Self {
        Quaternion::new(q[0], q[1], q[2], q[3])
    }

    /// Returns the components as an `[x, y, z, w]` array
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Shortest-arc rotation taking unit vector `from` onto unit vector `to`
    ///
    /// Both inputs must already be normalised.
    ///
    /// # Antiparallel inputs
    ///
    /// When `from` and `to` point in opposite directions the shortest arc is
    /// not unique. The construction then picks a 180° rotation about an axis
    /// perpendicular to `from`: `(-from.y, from.x, 0)` if `|from.x| > |from.z|`,
    /// otherwise `(0, -from.z, from.y)`.
    pub fn from_unit_vectors(from: &Vector3<f64>, to: &Vector3<f64>) -> Self {
        let r = from.dot(to) + 1.0;

        let q = if r < f64::EPSILON {
            if from.x.abs() > from.z.abs() {
                Quaternion::new(-from.y, from.x, 0.0, 0.0)
            } else {
                Quaternion::new(0.0, -from.z, from.y, 0.0)
            }
        } else {
            Quaternion::new(
                from.y * to.z - from.z * to.y,
                from.z * to.x - from.x * to.z,
                from.x * to.y - from.y * to.x,
                r,
            )
        };

        q.normalize()
    }

    /// Rotation of `angle` radians about the unit vector `axis`
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        let half_angle = angle / 2.0;
        let s = half_angle.sin();
        Quaternion::new(axis.x * s, axis.y * s, axis.z * s, half_angle.cos())
    }

    /// Builds a quaternion from ZYX Tait-Bryan angles (yaw, pitch, roll)
    ///
    /// When `degrees` is true the angles are converted to radians first.
    pub fn from_zyx_euler(yaw: f64, pitch: f64, roll: f64, degrees: bool) -> Self {
        let (yaw, pitch, roll) = if degrees {
            (yaw.to_radians(), pitch.to_radians(), roll.to_radians())
        } else {
            (yaw, pitch, roll)
        };

        let cy = (yaw * 0.5).cos();
        let sy = (yaw * 0.5).sin();
        let cp = (pitch * 0.5).cos();
        let sp = (pitch * 0.5).sin();
        let cr = (roll * 0.5).cos();
        let sr = (roll * 0.5).sin();

        Quaternion::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
    }

    /// Hamilton product `self * other`: applies `other` first, then `self`
    pub fn multiply(&self, other: &Quaternion) -> Quaternion {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);

        Quaternion::new(
            ax * bw + aw * bx + ay * bz - az * by,
            ay * bw + aw * by + az * bx - ax * bz,
            az * bw + aw * bz + ax * by - ay * bx,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Euclidean norm of the four components
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Returns the quaternion scaled to unit norm
    ///
    /// A zero quaternion normalises to the identity.
    pub fn normalize(&self) -> Quaternion {
        let length = self.norm();
        if length == 0.0 {
            return Quaternion::identity();
        }
        let inv = 1.0 / length;
        Quaternion::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Conjugate, which is the inverse rotation for unit quaternions
    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotates a vector by this quaternion
    pub fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let (qx, qy, qz, qw) = (self.x, self.y, self.z, self.w);

        // t = 2 * cross(q.xyz, v)
        let tx = 2.0 * (qy * v.z - qz * v.y);
        let ty = 2.0 * (qz * v.x - qx * v.z);
        let tz = 2.0 * (qx * v.y - qy * v.x);

        // v + w * t + cross(q.xyz, t)
        Vector3::new(
            v.x + qw * tx + qy * tz - qz * ty,
            v.y + qw * ty + qz * tx - qx * tz,
            v.z + qw * tz + qx * ty - qy * tx,
        )
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Rotation angle between two orientations in radians
    pub fn angle_to(&self, other: &Quaternion) -> f64 {
        let a = self.normalize();
        let b = other.normalize();
        let dot = (a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w).abs();
        2.0 * dot.min(1.0).acos()
    }

    /// Converts to a nalgebra unit quaternion (renormalising)
    pub fn to_unit_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(self.w, self.x, self.y, self.z))
    }

    /// Creates from a nalgebra unit quaternion
    pub fn from_unit_quaternion(q: &UnitQuaternion<f64>) -> Self {
        Quaternion::new(q.i, q.j, q.k, q.w)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, other: Quaternion) -> Quaternion {
        self.multiply(&other)
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(q: [f64; 4]) -> Self {
        Quaternion::from_array(q)
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        q.to_array()
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.7}, {:.7}, {:.7}, {:.7}]",
            self.x, self.y, self.z, self.w
        )
    }
}
