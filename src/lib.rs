//! Quaternions: attitude and geometry kernel for an Earth-centred scene
//!
//! This crate provides the numeric core behind a scriptable satellite and
//! ground-station visualiser: coordinate conversions between geographic,
//! spherical, Earth-fixed (ECEF) and inertial (ECI) frames, a dual-vector
//! attitude solver, symbolic target resolution (Nadir, Velocity, Sun, Moon,
//! point-to-point vectors) and a TLE → SGP4 → ECEF pipeline that poses
//! satellites over time.
//!
//! The [`scene::Scene`] registry owns every named point and line and exposes
//! the scripting operations; [`commands`] wraps them in a serde-tagged command
//! enum so whole scripts can be loaded from JSON.

use thiserror::Error;

pub mod attitude;
pub mod commands;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod math;
pub mod orientation;
pub mod points;
pub mod propagation;
pub mod scene;
pub mod targets;
pub mod time;
pub mod tle;

// Re-export commonly used types
pub use attitude::find_best_quaternion;
pub use math::Quaternion;
pub use orientation::{ObservatoryMode, OrientationMode};
pub use scene::Scene;
pub use targets::{BodyVector, NamedTarget, PointRef, TargetVector, VectorArg};

/// Main error type for the quaternions library
#[derive(Debug, Error)]
pub enum QuaternionsError {
    #[error("Point '{0}' does not exist")]
    UnknownPoint(String),

    #[error("Line '{0}' does not exist")]
    UnknownLine(String),

    #[error("Name '{0}' must be alphanumeric and may contain underscores (_) or dashes (-)")]
    InvalidName(String),

    #[error("Name '{0}' is reserved for celestial bodies")]
    ReservedName(String),

    #[error("Name '{0}' is already in use")]
    NameInUse(String),

    #[error("Invalid vector argument: {0}")]
    InvalidVector(String),

    #[error("Point '{0}' has no orientation")]
    NotOriented(String),

    #[error("Point '{0}' is not a satellite")]
    NotSatellite(String),

    #[error("Satellite '{0}' does not use a dynamic orientation mode")]
    NotDynamic(String),

    #[error("Point '{0}' has no camera")]
    NoCamera(String),

    #[error("Point '{0}' already has a camera")]
    CameraExists(String),

    #[error("Velocity target is only valid for objects with velocity data")]
    MissingVelocity,

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Coordinate error: {0}")]
    Coordinate(#[from] coordinates::CoordinateError),

    #[error("Attitude error: {0}")]
    Attitude(#[from] attitude::AttitudeError),

    #[error("Time error: {0}")]
    Time(#[from] time::TimeError),

    #[error("TLE error: {0}")]
    Tle(#[from] tle::TleError),

    #[error("Propagation error: {0}")]
    Propagation(#[from] propagation::PropagationError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for quaternions operations
pub type Result<T> = std::result::Result<T, QuaternionsError>;
