//! Scene points: markers, oriented points, satellites and observatories
//!
//! Every point has a position in the Earth-fixed frame (km) and an attitude
//! quaternion. Plain markers keep the identity attitude and refuse rotation.
//! Satellites and observatories recompute their pose on every
//! [`Scene::update`](crate::scene::Scene::update).

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::math::vector::{to_array, unit_x, unit_y, unit_z};
use crate::math::Quaternion;
use crate::orientation::{calculate_orientation, ObservatoryMode, OrientationMode};
use crate::propagation::Propagator;
use crate::scene::Scene;
use crate::targets::Observer;
use crate::tle::Tle;
use crate::Result;

/// Default marker colour
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Default observatory colour
pub const OBSERVATORY_COLOR: &str = "#ff0000";

/// Rotation taking the camera's native -Z view axis onto body +Z
pub fn camera_to_z() -> Quaternion {
    Quaternion::from_axis_angle(&unit_x(), PI)
}

/// Camera mounted on an oriented point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera attitude in the body frame
    pub orientation: Quaternion,
    /// Vertical field of view in degrees
    pub fov: f64,
}

impl CameraConfig {
    pub fn new(orientation: Quaternion, fov: f64) -> Self {
        Self { orientation, fov }
    }
}

/// A camera attached to a point; `local` is relative to the point's body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov: f64,
    pub local: Quaternion,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Camera {
            fov: config.fov,
            local: config.orientation.multiply(&camera_to_z()),
        }
    }
}

/// Viewing axes of a camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAxes {
    pub direction: [f64; 3],
    pub rows: [f64; 3],
    pub columns: [f64; 3],
}

impl CameraAxes {
    /// Canonical camera axes rotated by `q`
    pub fn rotated_by(q: &Quaternion) -> Self {
        CameraAxes {
            direction: to_array(&q.rotate_vector(&Vector3::new(0.0, 0.0, -1.0))),
            rows: to_array(&q.rotate_vector(&Vector3::new(-1.0, 0.0, 0.0))),
            columns: to_array(&q.rotate_vector(&Vector3::new(0.0, 1.0, 0.0))),
        }
    }
}

/// Body axes expressed in the Earth-fixed frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: [f64; 3],
    pub y: [f64; 3],
    pub z: [f64; 3],
}

/// Result of a satellite update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub orientation: Quaternion,
}

/// A satellite: element set plus orientation mode
#[derive(Debug, Clone)]
pub struct Satellite {
    tle: Tle,
    pub mode: OrientationMode,
    pub velocity: Option<Vector3<f64>>,
}

impl Satellite {
    pub fn new(tle: Tle, mode: OrientationMode) -> Self {
        Satellite {
            tle,
            mode,
            velocity: None,
        }
    }

    pub fn tle(&self) -> &Tle {
        &self.tle
    }

    /// Pose at `timestamp` given the current scene state
    ///
    /// Propagates the elements, rotates position and velocity into the
    /// Earth-fixed frame and solves the orientation mode. Does not touch the
    /// scene; the result depends only on the elements, the mode, the
    /// timestamp and the scene snapshot.
    pub fn pose(&self, timestamp: &DateTime<Utc>, scene: &Scene) -> Result<Pose> {
        let state = Propagator::new(&self.tle)?.ecef(timestamp)?;
        let observer = Observer::moving(state.position, state.velocity);
        let orientation = calculate_orientation(scene, &self.mode, &observer)?;

        Ok(Pose {
            position: state.position,
            velocity: state.velocity,
            orientation,
        })
    }
}

/// A ground station whose camera follows an observatory mode
#[derive(Debug, Clone)]
pub struct Observatory {
    mode: OrientationMode,
}

impl Observatory {
    pub fn new(mode: &ObservatoryMode) -> Self {
        Observatory {
            mode: mode.to_orientation_mode(),
        }
    }

    pub fn mode(&self) -> &OrientationMode {
        &self.mode
    }

    /// Camera attitude relative to the observatory body
    ///
    /// The mode yields the camera attitude in the Earth-fixed frame; it is
    /// brought into the body frame by the inverse of the body attitude.
    pub fn camera_local(
        &self,
        scene: &Scene,
        position: Vector3<f64>,
        body: &Quaternion,
    ) -> Result<Quaternion> {
        let q = calculate_orientation(scene, &self.mode, &Observer::stationary(position))?;
        Ok(body.conjugate().multiply(&q.multiply(&camera_to_z())))
    }
}

/// What a point is
#[derive(Debug, Clone)]
pub enum PointKind {
    Marker,
    Oriented,
    Satellite(Satellite),
    Observatory(Observatory),
}

/// Filter for listing points by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointFilter {
    Point,
    OrientedPoint,
    Satellite,
    Observatory,
}

impl std::str::FromStr for PointFilter {
    type Err = crate::QuaternionsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Point" => Ok(PointFilter::Point),
            "OrientedPoint" => Ok(PointFilter::OrientedPoint),
            "Satellite" => Ok(PointFilter::Satellite),
            "Observatory" => Ok(PointFilter::Observatory),
            other => Err(crate::QuaternionsError::InvalidVector(format!(
                "unknown point filter '{}'",
                other
            ))),
        }
    }
}

/// A named entity of the scene
#[derive(Debug, Clone)]
pub struct Point {
    pub position: Vector3<f64>,
    pub orientation: Quaternion,
    pub camera: Option<Camera>,
    pub color: String,
    pub kind: PointKind,
}

impl Point {
    pub fn marker(position: Vector3<f64>) -> Self {
        Point {
            position,
            orientation: Quaternion::identity(),
            camera: None,
            color: DEFAULT_COLOR.to_string(),
            kind: PointKind::Marker,
        }
    }

    pub fn oriented(position: Vector3<f64>, orientation: Quaternion) -> Self {
        Point {
            orientation,
            kind: PointKind::Oriented,
            ..Point::marker(position)
        }
    }

    pub fn satellite(satellite: Satellite, camera: Option<&CameraConfig>) -> Self {
        Point {
            camera: camera.map(Camera::from_config),
            kind: PointKind::Satellite(satellite),
            ..Point::marker(Vector3::zeros())
        }
    }

    pub fn observatory(
        position: Vector3<f64>,
        orientation: Quaternion,
        fov: f64,
        mode: &ObservatoryMode,
    ) -> Self {
        Point {
            position,
            orientation,
            camera: Some(Camera::from_config(&CameraConfig::new(
                Quaternion::identity(),
                fov,
            ))),
            color: OBSERVATORY_COLOR.to_string(),
            kind: PointKind::Observatory(Observatory::new(mode)),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// False only for plain markers
    pub fn is_oriented(&self) -> bool {
        !matches!(self.kind, PointKind::Marker)
    }

    pub fn as_satellite(&self) -> Option<&Satellite> {
        match &self.kind {
            PointKind::Satellite(satellite) => Some(satellite),
            _ => None,
        }
    }

    pub fn as_satellite_mut(&mut self) -> Option<&mut Satellite> {
        match &mut self.kind {
            PointKind::Satellite(satellite) => Some(satellite),
            _ => None,
        }
    }

    pub fn matches(&self, filter: PointFilter) -> bool {
        matches!(
            (filter, &self.kind),
            (PointFilter::Point, PointKind::Marker)
                | (PointFilter::OrientedPoint, PointKind::Oriented)
                | (PointFilter::OrientedPoint, PointKind::Observatory(_))
                | (PointFilter::Satellite, PointKind::Satellite(_))
                | (PointFilter::Observatory, PointKind::Observatory(_))
        )
    }

    /// Body axes in the Earth-fixed frame
    pub fn frame(&self) -> Frame {
        let q = &self.orientation;
        Frame {
            x: to_array(&q.rotate_vector(&unit_x())),
            y: to_array(&q.rotate_vector(&unit_y())),
            z: to_array(&q.rotate_vector(&unit_z())),
        }
    }

    /// Camera attitude in the Earth-fixed frame
    pub fn camera_world_orientation(&self) -> Option<Quaternion> {
        self.camera
            .map(|camera| self.orientation.multiply(&camera.local))
    }

    /// Camera axes in the Earth-fixed frame
    pub fn camera_ecef_axes(&self) -> Option<CameraAxes> {
        self.camera_world_orientation()
            .map(|q| CameraAxes::rotated_by(&q))
    }

    /// Camera axes in the body frame
    pub fn camera_body_axes(&self) -> Option<CameraAxes> {
        self.camera.map(|camera| CameraAxes::rotated_by(&camera.local))
    }

    /// Kind name as used by point filters
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            PointKind::Marker => "Point",
            PointKind::Oriented => "OrientedPoint",
            PointKind::Satellite(_) => "Satellite",
            PointKind::Observatory(_) => "Observatory",
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at [{:.3}, {:.3}, {:.3}] km, q = {}",
            self.kind_name(),
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{NamedTarget, TargetVector};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_marker_frame_is_identity() {
        let point = Point::marker(Vector3::new(1.0, 2.0, 3.0));
        let frame = point.frame();
        assert_eq!(frame.x, [1.0, 0.0, 0.0]);
        assert_eq!(frame.y, [0.0, 1.0, 0.0]);
        assert_eq!(frame.z, [0.0, 0.0, 1.0]);
        assert!(!point.is_oriented());
        assert!(point.camera_ecef_axes().is_none());
    }

    #[test]
    fn test_oriented_frame() {
        let q = Quaternion::from_axis_angle(&unit_z(), FRAC_PI_2);
        let point = Point::oriented(Vector3::zeros(), q);
        let frame = point.frame();
        assert_relative_eq!(frame.x[1], 1.0, epsilon = 1e-15);
        assert_relative_eq!(frame.y[0], -1.0, epsilon = 1e-15);
        assert_relative_eq!(frame.z[2], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_default_camera_looks_along_body_z() {
        let camera = Camera::from_config(&CameraConfig::new(Quaternion::identity(), 30.0));
        let point = Point {
            camera: Some(camera),
            ..Point::oriented(Vector3::zeros(), Quaternion::identity())
        };

        let body = point.camera_body_axes().unwrap();
        assert_relative_eq!(body.direction[2], 1.0, epsilon = 1e-15);
        assert_relative_eq!(body.rows[0], -1.0, epsilon = 1e-15);
        assert_relative_eq!(body.columns[1], -1.0, epsilon = 1e-15);

        // Rotate the body so +Z points to -X
        let q = Quaternion::from_unit_vectors(&unit_z(), &(-unit_x()));
        let turned = Point {
            orientation: q,
            ..point
        };
        let ecef = turned.camera_ecef_axes().unwrap();
        assert_relative_eq!(ecef.direction[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_filters() {
        let marker = Point::marker(Vector3::zeros());
        let oriented = Point::oriented(Vector3::zeros(), Quaternion::identity());
        let observatory = Point::observatory(
            Vector3::zeros(),
            Quaternion::identity(),
            20.0,
            &ObservatoryMode::Fixed {
                ecef_quaternion: Quaternion::identity(),
            },
        );

        assert!(marker.matches(PointFilter::Point));
        assert!(!marker.matches(PointFilter::OrientedPoint));
        assert!(oriented.matches(PointFilter::OrientedPoint));
        assert!(!oriented.matches(PointFilter::Satellite));
        assert!(observatory.matches(PointFilter::Observatory));
        assert!(observatory.matches(PointFilter::OrientedPoint));
        assert_eq!(observatory.color, OBSERVATORY_COLOR);
        assert_eq!("Satellite".parse::<PointFilter>().unwrap(), PointFilter::Satellite);
        assert!("Planet".parse::<PointFilter>().is_err());
    }

    #[test]
    fn test_observatory_camera_follows_fixed_mode() {
        let scene = Scene::empty();
        let target = Quaternion::from_axis_angle(&unit_y(), 0.3);
        let body = Quaternion::from_axis_angle(&unit_z(), 1.2);
        let observatory = Observatory::new(&ObservatoryMode::Fixed {
            ecef_quaternion: target,
        });

        let local = observatory
            .camera_local(&scene, Vector3::new(6371.0, 0.0, 0.0), &body)
            .unwrap();

        // body * local recovers the Earth-fixed camera attitude
        let world = body.multiply(&local);
        let expected = target.multiply(&camera_to_z());
        let v = Vector3::new(0.2, -0.5, 0.7);
        assert_relative_eq!(world.rotate_vector(&v), expected.rotate_vector(&v), epsilon = 1e-12);
    }

    #[test]
    fn test_observatory_dynamic_points_camera_at_target() {
        let scene = Scene::empty();
        let observatory = Observatory::new(&ObservatoryMode::Dynamic {
            primary_target_vector: TargetVector::Named(NamedTarget::TargetPointing {
                target: crate::targets::PointRef::Coordinates([7000.0, 0.0, 0.0]),
            }),
            secondary_target_vector: TargetVector::Literal([0.0, 0.0, 1.0]),
        });
        let point = Point {
            camera: Some(Camera {
                fov: 10.0,
                local: observatory
                    .camera_local(&scene, Vector3::new(6371.0, 0.0, 0.0), &Quaternion::identity())
                    .unwrap(),
            }),
            ..Point::oriented(Vector3::new(6371.0, 0.0, 0.0), Quaternion::identity())
        };

        let axes = point.camera_ecef_axes().unwrap();
        assert_relative_eq!(axes.direction[0], 1.0, epsilon = 1e-12);
    }
}
