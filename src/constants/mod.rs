//! Constants module for geometric and orbital calculations

use std::f64::consts::PI;

// Earth constants
/// Mean Earth radius in kilometers used by the spherical-Earth conversions
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Time constants
/// Milliseconds in a day
pub const DAY_MS: f64 = 86_400_000.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Days in a Julian century
pub const JULIAN_CENTURY: f64 = 36_525.0;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;

/// Convert an angle in radians to degrees
pub fn rad2deg(x: f64) -> f64 {
    x * RAD2DEG
}

/// Convert an angle in degrees to radians
pub fn deg2rad(x: f64) -> f64 {
    x * DEG2RAD
}
