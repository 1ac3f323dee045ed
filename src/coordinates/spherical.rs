//! # Spherical and Geographic Coordinates
//!
//! Conversions between Earth-fixed Cartesian positions and
//! (latitude, longitude, radius) / (latitude, longitude, altitude) triples.
//!
//! ## Conventions
//!
//! - **Latitude** is measured from the equatorial plane, `[-90°, 90°]`
//!   (not colatitude).
//! - **Longitude** is measured in the XY plane from +X toward +Y,
//!   `(-180°, 180°]`.
//! - **Z** points to the north pole.
//!
//! ## Spherical Earth
//!
//! Geographic conversions add [`EARTH_RADIUS_KM`] to the altitude and treat
//! the Earth as a sphere. This is not a geodetic (ellipsoidal) conversion; the
//! same spherical model must be used in both directions so that
//! `xyz2geo(geo2xyz(g)) == g`.
//!
//! ## Examples
//!
//! ```rust
//! use quaternions::coordinates::{geo2xyz, xyz2geo};
//! use quaternions::constants::EARTH_RADIUS_KM;
//!
//! let p = geo2xyz(0.0, 0.0, 0.0);
//! assert_eq!(p.x, EARTH_RADIUS_KM);
//!
//! let g = xyz2geo(&p).unwrap();
//! assert!(g.lat.abs() < 1e-12 && g.lon.abs() < 1e-12 && g.alt.abs() < 1e-9);
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEG2RAD, EARTH_RADIUS_KM, RAD2DEG};

/// Error type for coordinate conversions
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Radius cannot be zero")]
    ZeroRadius,

    #[error("Non-finite coordinate component: {0:?}")]
    NonFinite([f64; 3]),
}

/// Latitude/longitude in degrees plus distance from the Earth's centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
}

impl Spherical {
    pub fn to_array(&self) -> [f64; 3] {
        [self.lat, self.lon, self.radius]
    }
}

/// Latitude/longitude in degrees plus altitude above the spherical Earth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geographic {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Geographic {
    pub fn to_array(&self) -> [f64; 3] {
        [self.lat, self.lon, self.alt]
    }
}

/// Converts (latitude°, longitude°, radius) to Cartesian coordinates
///
/// - `x = r * cos(lat) * cos(lon)`
/// - `y = r * cos(lat) * sin(lon)`
/// - `z = r * sin(lat)`
pub fn sph2xyz(lat: f64, lon: f64, radius: f64) -> Vector3<f64> {
    let lat_rad = lat * DEG2RAD;
    let lon_rad = lon * DEG2RAD;

    Vector3::new(
        radius * lat_rad.cos() * lon_rad.cos(),
        radius * lat_rad.cos() * lon_rad.sin(),
        radius * lat_rad.sin(),
    )
}

/// Converts Cartesian coordinates to (latitude°, longitude°, radius)
///
/// # Errors
///
/// [`CoordinateError::ZeroRadius`] at the origin, where the latitude is
/// undefined, and [`CoordinateError::NonFinite`] for NaN/infinite input.
pub fn xyz2sph(point: &Vector3<f64>) -> Result<Spherical, CoordinateError> {
    if !point.iter().all(|c| c.is_finite()) {
        return Err(CoordinateError::NonFinite([point.x, point.y, point.z]));
    }

    let radius = point.norm();
    if radius == 0.0 {
        return Err(CoordinateError::ZeroRadius);
    }

    let lat = 90.0 - (point.z / radius).acos() * RAD2DEG;
    let lon = point.y.atan2(point.x) * RAD2DEG;

    Ok(Spherical { lat, lon, radius })
}

/// Converts geographic (latitude°, longitude°, altitude km) to Cartesian km
pub fn geo2xyz(lat: f64, lon: f64, alt: f64) -> Vector3<f64> {
    sph2xyz(lat, lon, alt + EARTH_RADIUS_KM)
}

/// Converts Cartesian km to geographic (latitude°, longitude°, altitude km)
pub fn xyz2geo(point: &Vector3<f64>) -> Result<Geographic, CoordinateError> {
    let sph = xyz2sph(point)?;
    Ok(Geographic {
        lat: sph.lat,
        lon: sph.lon,
        alt: sph.radius - EARTH_RADIUS_KM,
    })
}

/// Great-circle distance in km between two geographic locations (haversine)
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * DEG2RAD;
    let phi2 = lat2 * DEG2RAD;
    let d_phi = (lat2 - lat1) * DEG2RAD;
    let d_lambda = (lon2 - lon1) * DEG2RAD;

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Straight-line distance between two points
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (b - a).norm()
}
