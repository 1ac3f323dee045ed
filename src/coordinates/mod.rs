//! Coordinate conversion layer
//!
//! - [`spherical`]: geographic / spherical ⇄ Earth-fixed Cartesian
//! - [`frames`]: inertial ⇄ Earth-fixed rotation by sidereal time

pub mod frames;
pub mod spherical;

pub use frames::{ecef_to_eci, eci_to_ecef, eci_to_ecef_at};
pub use spherical::{
    distance, geo2xyz, haversine_distance, sph2xyz, xyz2geo, xyz2sph, CoordinateError, Geographic,
    Spherical,
};
