//! Inertial (ECI) ⇄ Earth-fixed (ECEF) rotation about the polar axis
//!
//! The transformation is a pure rotation by the Greenwich Mean Sidereal Time
//! angle; no polar motion, nutation or translation is applied. Velocities are
//! rotated with the same matrix (the Earth-rotation transport term is not
//! added), matching how positions and velocities are fed to the attitude
//! solver.

use chrono::{DateTime, Utc};
use nalgebra::{Matrix3, Vector3};

use crate::time::gmst;

/// Rotation matrix taking ECI vectors into ECEF for the given GMST (radians)
pub fn eci_to_ecef_matrix(gmst_rad: f64) -> Matrix3<f64> {
    let (s, c) = gmst_rad.sin_cos();
    Matrix3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotates an ECI vector into ECEF for the given GMST (radians)
pub fn eci_to_ecef(eci: &Vector3<f64>, gmst_rad: f64) -> Vector3<f64> {
    let (s, c) = gmst_rad.sin_cos();
    Vector3::new(eci.x * c + eci.y * s, eci.x * -s + eci.y * c, eci.z)
}

/// Rotates an ECEF vector back into ECI for the given GMST (radians)
pub fn ecef_to_eci(ecef: &Vector3<f64>, gmst_rad: f64) -> Vector3<f64> {
    let (s, c) = gmst_rad.sin_cos();
    Vector3::new(ecef.x * c - ecef.y * s, ecef.x * s + ecef.y * c, ecef.z)
}

/// Rotates an ECI vector into ECEF at a UTC instant
pub fn eci_to_ecef_at(eci: &Vector3<f64>, timestamp: &DateTime<Utc>) -> Vector3<f64> {
    eci_to_ecef(eci, gmst(timestamp))
}
