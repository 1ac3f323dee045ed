//! Named-entity registry and scripting operations
//!
//! The [`Scene`] exclusively owns every point and line by name. Names are
//! unique across points and lines, must match `^[a-zA-Z0-9_-]+$`, and may not
//! be `Sun` or `Moon`. Operations either succeed or return a
//! [`QuaternionsError`] without mutating the registry.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use nalgebra::Vector3;
use regex::Regex;
use std::collections::BTreeMap;

use crate::attitude::find_best_quaternion;
use crate::config::{DefaultScene, Settings};
use crate::coordinates::geo2xyz;
use crate::math::vector::from_array;
use crate::math::{angle_between, Quaternion};
use crate::orientation::{ObservatoryMode, OrientationMode};
use crate::points::{
    Camera, CameraAxes, CameraConfig, Frame, Point, PointFilter, PointKind, Pose, Satellite,
};
use crate::propagation::propagate_ecef;
use crate::targets::{resolve_point, resolve_vector, BodyVector, PointRef, VectorArg};
use crate::time::SimClock;
use crate::tle::{Tle, TleCache, TleFetcher, TleSource};
use crate::{QuaternionsError, Result};

/// Name of the Moon body
pub const MOON: &str = "Moon";

/// Name of the Sun body
pub const SUN: &str = "Sun";

/// Names reserved for celestial bodies
pub const RESERVED_NAMES: [&str; 2] = [MOON, SUN];

/// Mean Earth-Moon distance in km
pub const MOON_DISTANCE_KM: f64 = 384_400.0;

lazy_static! {
    static ref NAME_PATTERN: std::result::Result<Regex, regex::Error> =
        Regex::new(r"^[a-zA-Z0-9_-]+$");
}

/// A named line between two point references, re-resolved on every use
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub start: PointRef,
    pub end: PointRef,
}

/// Snapshot of the celestial bodies used by symbolic targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bodies {
    /// Moon position in the Earth-fixed frame (km)
    pub moon_position: Vector3<f64>,
    /// Direction of the sunlight source, used as-is for the `Sun` target
    pub sun_direction: Vector3<f64>,
}

impl Default for Bodies {
    fn default() -> Self {
        Bodies {
            moon_position: Vector3::new(MOON_DISTANCE_KM, 0.0, 0.0),
            sun_direction: Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// A per-entity failure collected during [`Scene::update`]
#[derive(Debug)]
pub struct UpdateFailure {
    pub name: String,
    pub error: QuaternionsError,
}

/// Registry of points, lines, cached TLEs, celestial bodies and sim time
#[derive(Debug, Clone)]
pub struct Scene {
    points: BTreeMap<String, Point>,
    lines: BTreeMap<String, Line>,
    tles: TleCache,
    bodies: Bodies,
    clock: SimClock,
    defaults: DefaultScene,
}

impl Scene {
    /// A scene with no entities
    pub fn empty() -> Self {
        Scene {
            points: BTreeMap::new(),
            lines: BTreeMap::new(),
            tles: TleCache::new(),
            bodies: Bodies::default(),
            clock: SimClock::default(),
            defaults: DefaultScene::default(),
        }
    }

    /// A scene holding the default `sat` point and `nadir` line
    pub fn new() -> Result<Self> {
        Self::with_defaults(DefaultScene::default())
    }

    pub fn with_defaults(defaults: DefaultScene) -> Result<Self> {
        let mut scene = Scene {
            defaults,
            ..Scene::empty()
        };
        scene.reset()?;
        Ok(scene)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_defaults(settings.default_scene.clone())
    }

    /// Check that `name` can be used for a new point or line
    pub fn validate_name(&self, name: &str) -> Result<()> {
        let pattern = NAME_PATTERN
            .as_ref()
            .map_err(|e| QuaternionsError::InvalidName(format!("{} ({})", name, e)))?;

        if !pattern.is_match(name) {
            return Err(QuaternionsError::InvalidName(name.to_string()));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(QuaternionsError::ReservedName(name.to_string()));
        }
        if self.points.contains_key(name) || self.lines.contains_key(name) {
            return Err(QuaternionsError::NameInUse(name.to_string()));
        }
        Ok(())
    }

    pub fn point(&self, name: &str) -> Option<&Point> {
        self.points.get(name)
    }

    /// Like [`Scene::point`] but with an error for unknown names
    pub fn get_point(&self, name: &str) -> Result<&Point> {
        self.points
            .get(name)
            .ok_or_else(|| QuaternionsError::UnknownPoint(name.to_string()))
    }

    fn get_point_mut(&mut self, name: &str) -> Result<&mut Point> {
        self.points
            .get_mut(name)
            .ok_or_else(|| QuaternionsError::UnknownPoint(name.to_string()))
    }

    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.get(name)
    }

    pub fn points(&self) -> impl Iterator<Item = (&String, &Point)> {
        self.points.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&String, &Line)> {
        self.lines.iter()
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn set_bodies(&mut self, bodies: Bodies) {
        self.bodies = bodies;
    }

    pub fn set_moon_position(&mut self, position: Vector3<f64>) {
        self.bodies.moon_position = position;
    }

    pub fn set_sun_direction(&mut self, direction: Vector3<f64>) {
        self.bodies.sun_direction = direction;
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    pub fn tles(&self) -> &TleCache {
        &self.tles
    }

    pub fn tles_mut(&mut self) -> &mut TleCache {
        &mut self.tles
    }

    /// Position of a literal or named point (`Moon` included)
    pub fn position_of(&self, point: &PointRef) -> Result<Vector3<f64>> {
        resolve_point(self, point)
    }

    /// Insert an already built point under a validated name
    pub fn insert_point(&mut self, name: &str, point: Point) -> Result<()> {
        self.validate_name(name)?;
        log::debug!("Adding {} '{}'", point.kind_name(), name);
        self.points.insert(name.to_string(), point);
        Ok(())
    }

    fn parent_offset(&self, relative_to: Option<&str>) -> Result<Vector3<f64>> {
        match relative_to {
            Some(parent) => self.position_of(&PointRef::named(parent)),
            None => Ok(Vector3::zeros()),
        }
    }

    /// Add a marker, or an oriented point when `orientation` is given
    ///
    /// With `relative_to` (a point name or `Moon`) the coordinates are an
    /// offset from that parent's current position.
    pub fn add_point(
        &mut self,
        name: &str,
        coordinates: [f64; 3],
        orientation: Option<Quaternion>,
        relative_to: Option<&str>,
    ) -> Result<()> {
        self.validate_name(name)?;
        let position = self.parent_offset(relative_to)? + from_array(coordinates);
        let point = match orientation {
            Some(q) => Point::oriented(position, q),
            None => Point::marker(position),
        };
        self.insert_point(name, point)
    }

    /// Add a ground station with a camera driven by `mode`
    pub fn add_observatory(
        &mut self,
        name: &str,
        coordinates: [f64; 3],
        orientation: Quaternion,
        fov: f64,
        mode: &ObservatoryMode,
        relative_to: Option<&str>,
    ) -> Result<()> {
        self.validate_name(name)?;
        let position = self.parent_offset(relative_to)? + from_array(coordinates);
        self.insert_point(name, Point::observatory(position, orientation, fov, mode))?;

        if let Err(error) = self.update_observatory(name) {
            log::warn!("Initial camera update of '{}' failed: {}", name, error);
        }
        Ok(())
    }

    /// Raw TLE text for a catalog number through the session cache
    pub fn fetch_tle(&mut self, id: &str, fetcher: &dyn TleFetcher) -> Result<String> {
        Ok(self.tles.get_or_fetch(id, fetcher)?)
    }

    fn load_tle(&mut self, source: &TleSource, fetcher: &dyn TleFetcher) -> Result<Tle> {
        let text = match source {
            TleSource::Tle { tle } => tle.clone(),
            TleSource::Norad { id } => self.fetch_tle(id, fetcher)?,
        };
        Ok(Tle::parse(&text)?)
    }

    /// Add a satellite and pose it at the current sim time
    ///
    /// `mode` defaults to body `z` at nadir and body `y` along the velocity.
    pub fn add_satellite(
        &mut self,
        name: &str,
        source: &TleSource,
        mode: Option<OrientationMode>,
        camera: Option<&CameraConfig>,
        fetcher: &dyn TleFetcher,
    ) -> Result<()> {
        self.validate_name(name)?;
        let tle = self.load_tle(source, fetcher)?;
        let satellite = Satellite::new(tle, mode.unwrap_or_default());
        self.insert_point(name, Point::satellite(satellite, camera))?;

        let now = self.clock.now();
        if let Err(error) = self.update_satellite(name, &now) {
            log::warn!("Initial update of satellite '{}' failed: {}", name, error);
        }
        Ok(())
    }

    /// Attach a camera to an oriented point
    pub fn add_camera(&mut self, name: &str, config: &CameraConfig) -> Result<()> {
        let point = self.get_point_mut(name)?;
        if !point.is_oriented() {
            return Err(QuaternionsError::NotOriented(name.to_string()));
        }
        if point.camera.is_some() {
            return Err(QuaternionsError::CameraExists(name.to_string()));
        }
        point.camera = Some(Camera::from_config(config));
        Ok(())
    }

    pub fn set_color(&mut self, name: &str, color: &str) -> Result<()> {
        self.get_point_mut(name)?.color = color.to_string();
        Ok(())
    }

    pub fn delete_point(&mut self, name: &str) -> Result<()> {
        match self.points.remove(name) {
            Some(_) => {
                log::debug!("Deleted point '{}'", name);
                Ok(())
            }
            None => Err(QuaternionsError::UnknownPoint(name.to_string())),
        }
    }

    /// Create a line; both ends must resolve now
    pub fn create_line(&mut self, name: &str, start: PointRef, end: PointRef) -> Result<()> {
        self.validate_name(name)?;
        self.position_of(&start)?;
        self.position_of(&end)?;
        self.lines.insert(name.to_string(), Line { start, end });
        Ok(())
    }

    pub fn delete_line(&mut self, name: &str) -> Result<()> {
        self.lines
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| QuaternionsError::UnknownLine(name.to_string()))
    }

    /// Move a point; with `use_geo` the position is (lat°, lon°, alt km)
    pub fn mov(&mut self, name: &str, position: [f64; 3], use_geo: bool) -> Result<()> {
        let position = if use_geo {
            geo2xyz(position[0], position[1], position[2])
        } else {
            from_array(position)
        };
        self.get_point_mut(name)?.position = position;
        Ok(())
    }

    /// Set a point's attitude
    pub fn rot(&mut self, name: &str, q: Quaternion) -> Result<()> {
        let point = self.get_point_mut(name)?;
        if !point.is_oriented() {
            return Err(QuaternionsError::NotOriented(name.to_string()));
        }
        point.orientation = q;
        Ok(())
    }

    /// Compose a rotation onto a point's attitude (`current * q`)
    pub fn relative_rot(&mut self, name: &str, q: Quaternion) -> Result<()> {
        let point = self.get_point_mut(name)?;
        if !point.is_oriented() {
            return Err(QuaternionsError::NotOriented(name.to_string()));
        }
        point.orientation = point.orientation.multiply(&q);
        Ok(())
    }

    /// Angle in degrees between two resolvable vectors
    pub fn angle(&self, a: &VectorArg, b: &VectorArg) -> Result<f64> {
        let a = resolve_vector(self, a)?;
        let b = resolve_vector(self, b)?;
        angle_between(&a, &b)
            .map(f64::to_degrees)
            .ok_or_else(|| {
                QuaternionsError::DegenerateGeometry(
                    "cannot calculate angle with zero-length vector".to_string(),
                )
            })
    }

    /// Dual-vector attitude from body vectors and resolvable targets
    pub fn find_best_quaternion(
        &self,
        primary_body: &BodyVector,
        secondary_body: &BodyVector,
        primary_target: &VectorArg,
        secondary_target: &VectorArg,
    ) -> Result<Quaternion> {
        let primary_target = resolve_vector(self, primary_target)?;
        let secondary_target = resolve_vector(self, secondary_target)?;
        Ok(find_best_quaternion(
            &primary_body.resolve(),
            &secondary_body.resolve(),
            &primary_target,
            &secondary_target,
        )?)
    }

    /// Move a point to where a catalogued satellite is at `timestamp`
    pub fn mov2sat(
        &mut self,
        name: &str,
        id: &str,
        timestamp: &DateTime<Utc>,
        fetcher: &dyn TleFetcher,
    ) -> Result<()> {
        self.get_point(name)?;
        let text = self.fetch_tle(id, fetcher)?;
        let state = propagate_ecef(&Tle::parse(&text)?, timestamp)?;
        self.get_point_mut(name)?.position = state.position;
        log::info!("Point {} moved to satellite {} position at {}", name, id, timestamp);
        Ok(())
    }

    /// Replace the offset quaternion of a dynamic satellite
    pub fn set_offset(&mut self, name: &str, offset: Quaternion) -> Result<()> {
        let satellite = self
            .get_point_mut(name)?
            .as_satellite_mut()
            .ok_or_else(|| QuaternionsError::NotSatellite(name.to_string()))?;
        if satellite.mode.set_offset(offset) {
            Ok(())
        } else {
            Err(QuaternionsError::NotDynamic(name.to_string()))
        }
    }

    /// Body axes of an oriented point in the Earth-fixed frame
    pub fn frame(&self, name: &str) -> Result<Frame> {
        let point = self.get_point(name)?;
        if !point.is_oriented() {
            return Err(QuaternionsError::NotOriented(name.to_string()));
        }
        Ok(point.frame())
    }

    /// Camera axes of a point in the Earth-fixed frame
    pub fn camera_axes(&self, name: &str) -> Result<CameraAxes> {
        self.get_point(name)?
            .camera_ecef_axes()
            .ok_or_else(|| QuaternionsError::NoCamera(name.to_string()))
    }

    /// Names of all points, or of those matching `filter`, in name order
    pub fn list_points(&self, filter: Option<PointFilter>) -> Vec<String> {
        self.points
            .iter()
            .filter(|(_, point)| filter.map_or(true, |f| point.matches(f)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Remove every entity and recreate the default point and line
    ///
    /// The default point is an oriented point at the configured geographic
    /// position with identity attitude; the default line runs from it to the
    /// Earth centre. The TLE cache, bodies and clock are kept.
    pub fn reset(&mut self) -> Result<()> {
        self.points.clear();
        self.lines.clear();

        let DefaultScene {
            satellite_name,
            satellite_geo,
            nadir_line,
        } = self.defaults.clone();

        self.add_point(&satellite_name, [0.0, 0.0, 0.0], Some(Quaternion::identity()), None)?;
        self.mov(&satellite_name, satellite_geo, true)?;
        self.create_line(
            &nadir_line,
            PointRef::named(satellite_name.as_str()),
            PointRef::Coordinates([0.0, 0.0, 0.0]),
        )?;

        log::info!(
            "Scene has been reset. Only '{}' and '{}' remain.",
            satellite_name,
            nadir_line
        );
        Ok(())
    }

    /// Pose of a satellite at `timestamp` without applying it
    pub fn satellite_pose(&self, name: &str, timestamp: &DateTime<Utc>) -> Result<Pose> {
        self.get_point(name)?
            .as_satellite()
            .ok_or_else(|| QuaternionsError::NotSatellite(name.to_string()))?
            .pose(timestamp, self)
    }

    /// Recompute and apply one satellite's pose
    pub fn update_satellite(&mut self, name: &str, timestamp: &DateTime<Utc>) -> Result<Pose> {
        let pose = self.satellite_pose(name, timestamp)?;
        let point = self.get_point_mut(name)?;
        point.position = pose.position;
        point.orientation = pose.orientation;
        if let Some(satellite) = point.as_satellite_mut() {
            satellite.velocity = Some(pose.velocity);
        }
        Ok(pose)
    }

    fn update_observatory(&mut self, name: &str) -> Result<()> {
        let point = self.get_point(name)?;
        let local = match &point.kind {
            PointKind::Observatory(observatory) => {
                observatory.camera_local(self, point.position, &point.orientation)?
            }
            _ => return Ok(()),
        };
        if let Some(camera) = self.get_point_mut(name)?.camera.as_mut() {
            camera.local = local;
        }
        Ok(())
    }

    /// Update every satellite, then every observatory camera, at `timestamp`
    ///
    /// A failure for one entity is logged and collected; the others are still
    /// updated.
    pub fn update(&mut self, timestamp: &DateTime<Utc>) -> Vec<UpdateFailure> {
        let mut failures = Vec::new();

        let satellites = self.list_points(Some(PointFilter::Satellite));
        for name in satellites {
            if let Err(error) = self.update_satellite(&name, timestamp) {
                log::warn!("Failed to update satellite '{}': {}", name, error);
                failures.push(UpdateFailure { name, error });
            }
        }

        let observatories = self.list_points(Some(PointFilter::Observatory));
        for name in observatories {
            if let Err(error) = self.update_observatory(&name) {
                log::warn!("Failed to update observatory '{}': {}", name, error);
                failures.push(UpdateFailure { name, error });
            }
        }

        failures
    }

    /// Advance sim time by a wall-clock interval and update the scene
    pub fn tick(&mut self, elapsed: Duration) -> Result<Vec<UpdateFailure>> {
        let now = self.clock.advance(elapsed)?;
        Ok(self.update(&now))
    }
}
