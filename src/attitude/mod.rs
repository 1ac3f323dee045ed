//! # Attitude Solver
//!
//! Finds the rotation that aligns a body with two target directions.
//!
//! The **primary** body vector is rotated exactly onto the primary target.
//! The **secondary** body vector is then brought as close as possible to the
//! secondary target by twisting about the primary target axis, which is the
//! only freedom left once the primary constraint holds.
//!
//! ## Degenerate inputs
//!
//! - Any zero-length input vector is rejected with
//!   [`AttitudeError::ZeroVector`].
//! - A secondary target parallel to the primary target leaves the twist
//!   undefined. Its projection collapses to the zero vector, the dot product
//!   is zero and the twist comes out as a quarter turn. This is not treated as
//!   an error; callers must avoid the configuration.
//! - Antiparallel primary vectors are handled by the shortest-arc constructor,
//!   see [`Quaternion::from_unit_vectors`].
//!
//! ## Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use quaternions::attitude::find_best_quaternion;
//!
//! let q = find_best_quaternion(
//!     &Vector3::z(),
//!     &Vector3::y(),
//!     &Vector3::x(),
//!     &Vector3::z(),
//! ).unwrap();
//!
//! assert!((q.rotate_vector(&Vector3::z()) - Vector3::x()).norm() < 1e-12);
//! assert!((q.rotate_vector(&Vector3::y()) - Vector3::z()).norm() < 1e-12);
//! ```

use nalgebra::Vector3;
use thiserror::Error;

use crate::math::{normalize_or_zero, project_on_plane, try_normalize, Quaternion};

/// Error type for the attitude solver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttitudeError {
    #[error("{0} vector has zero length")]
    ZeroVector(VectorRole),

    #[error("{0} vector is not finite: {1:?}")]
    NonFinite(VectorRole, [f64; 3]),
}

/// Which of the four solver inputs an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorRole {
    PrimaryBody,
    SecondaryBody,
    PrimaryTarget,
    SecondaryTarget,
}

impl std::fmt::Display for VectorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VectorRole::PrimaryBody => "Primary body",
            VectorRole::SecondaryBody => "Secondary body",
            VectorRole::PrimaryTarget => "Primary target",
            VectorRole::SecondaryTarget => "Secondary target",
        };
        f.write_str(name)
    }
}

fn checked_unit(v: &Vector3<f64>, role: VectorRole) -> Result<Vector3<f64>, AttitudeError> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(AttitudeError::NonFinite(role, [v.x, v.y, v.z]));
    }
    try_normalize(v).ok_or(AttitudeError::ZeroVector(role))
}

/// Best rotation for a dual vector constraint
///
/// Returns `q` such that `q` maps `primary_body` onto `primary_target` and
/// maps `secondary_body` as close as possible to `secondary_target`. Inputs
/// are normalised internally.
///
/// Steps:
/// 1. `q1` = shortest arc from the primary body vector to the primary target
/// 2. rotate the secondary body vector by `q1`
/// 3. project it and the secondary target onto the plane orthogonal to the
///    primary target, then normalise both
/// 4. signed angle between the projections; the sign comes from the cross
///    product's component along the primary target
/// 5. `q2` = rotation about the primary target by that angle
/// 6. result is `q2 * q1`
pub fn find_best_quaternion(
    primary_body: &Vector3<f64>,
    secondary_body: &Vector3<f64>,
    primary_target: &Vector3<f64>,
    secondary_target: &Vector3<f64>,
) -> Result<Quaternion, AttitudeError> {
    let b1 = checked_unit(primary_body, VectorRole::PrimaryBody)?;
    let b2 = checked_unit(secondary_body, VectorRole::SecondaryBody)?;
    let t1 = checked_unit(primary_target, VectorRole::PrimaryTarget)?;
    let t2 = checked_unit(secondary_target, VectorRole::SecondaryTarget)?;

    let q1 = Quaternion::from_unit_vectors(&b1, &t1);
    let rotated_b2 = q1.rotate_vector(&b2);

    let projected_b2 = normalize_or_zero(&project_on_plane(&rotated_b2, &t1));
    let projected_t2 = normalize_or_zero(&project_on_plane(&t2, &t1));

    let angle = projected_b2.dot(&projected_t2).clamp(-1.0, 1.0).acos();
    let direction = if projected_b2.cross(&projected_t2).dot(&t1) < 0.0 {
        -1.0
    } else {
        1.0
    };

    let q2 = Quaternion::from_axis_angle(&t1, direction * angle);

    Ok(q2.multiply(&q1))
}
