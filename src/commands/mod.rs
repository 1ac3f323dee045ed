//! Scripted command surface
//!
//! [`Command`] is the serde form of every scene operation. A script is a JSON
//! array of commands:
//!
//! ```json
//! [
//!   {"type": "add_point", "name": "KS", "coordinates": [45.0, 10.0, 0.0], "use_geo": true},
//!   {"type": "create_line", "name": "los", "start": "sat", "end": "KS"},
//!   {"type": "angle", "a": "los", "b": "nadir"}
//! ]
//! ```
//!
//! [`execute`] runs one command and returns its output or the failure as a
//! value. [`run_script`] runs every command in order and keeps going after a
//! failure, so one bad line does not end a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{deg2rad, rad2deg};
use crate::coordinates::{distance, geo2xyz, haversine_distance, sph2xyz, xyz2geo, xyz2sph};
use crate::coordinates::{Geographic, Spherical};
use crate::math::vector::{from_array, to_array};
use crate::math::Quaternion;
use crate::orientation::{ObservatoryMode, OrientationMode};
use crate::points::{CameraAxes, CameraConfig, Frame, PointFilter};
use crate::scene::Scene;
use crate::targets::{BodyVector, PointRef, VectorArg};
use crate::time::utc_date;
use crate::tle::{TleFetcher, TleSource};
use crate::{QuaternionsError, Result};

/// Error type for loading command scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_quaternion() -> Quaternion {
    Quaternion::identity()
}

/// One scene operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Move a point; with `use_geo` the position is (lat°, lon°, alt km)
    Mov {
        name: String,
        position: [f64; 3],
        #[serde(default)]
        use_geo: bool,
    },
    Rot {
        name: String,
        quaternion: Quaternion,
    },
    RelativeRot {
        name: String,
        quaternion: Quaternion,
    },
    AddPoint {
        name: String,
        coordinates: [f64; 3],
        #[serde(default)]
        use_geo: bool,
        #[serde(default)]
        quaternion: Option<Quaternion>,
        #[serde(default)]
        relative_to: Option<String>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        camera: Option<CameraConfig>,
    },
    AddObservatory {
        name: String,
        coordinates: [f64; 3],
        #[serde(default)]
        use_geo: bool,
        #[serde(default = "default_quaternion")]
        quaternion: Quaternion,
        fov: f64,
        mode: ObservatoryMode,
        #[serde(default)]
        relative_to: Option<String>,
    },
    AddSatellite {
        name: String,
        source: TleSource,
        #[serde(default)]
        mode: Option<OrientationMode>,
        #[serde(default)]
        camera: Option<CameraConfig>,
    },
    AddCamera {
        name: String,
        camera: CameraConfig,
    },
    SetColor {
        name: String,
        color: String,
    },
    DeletePoint {
        name: String,
    },
    CreateLine {
        name: String,
        start: PointRef,
        end: PointRef,
    },
    DeleteLine {
        name: String,
    },
    /// Angle in degrees between two vectors
    Angle {
        a: VectorArg,
        b: VectorArg,
    },
    #[serde(rename = "rad2deg")]
    Rad2Deg {
        value: f64,
    },
    #[serde(rename = "deg2rad")]
    Deg2Rad {
        value: f64,
    },
    FetchTle {
        id: String,
    },
    /// Move a point to a satellite's position; sim time when no timestamp
    #[serde(rename = "mov2sat")]
    Mov2Sat {
        name: String,
        id: String,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    FindBestQuaternion {
        primary_body_vector: BodyVector,
        secondary_body_vector: BodyVector,
        primary_target_vector: VectorArg,
        secondary_target_vector: VectorArg,
    },
    SetOffset {
        name: String,
        quaternion: Quaternion,
    },
    /// Position of a point (or `Moon`)
    Point {
        name: String,
    },
    Frame {
        name: String,
    },
    CameraAxes {
        name: String,
    },
    ListPoints {
        #[serde(default)]
        filter: Option<PointFilter>,
    },
    ValidateName {
        name: String,
    },
    Reset,
    SetTime {
        time: DateTime<Utc>,
    },
    SetSpeed {
        speed: f64,
    },
    ResumeSimTime,
    PauseSimTime,
    ToggleSimTime,
    /// Update satellites and observatories; sim time when no timestamp
    Update {
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    SetBodies {
        #[serde(default)]
        moon_position: Option<[f64; 3]>,
        #[serde(default)]
        sun_direction: Option<[f64; 3]>,
    },
    ZyxToQuaternion {
        yaw: f64,
        pitch: f64,
        roll: f64,
        #[serde(default)]
        degrees: bool,
    },
    #[serde(rename = "geo2xyz")]
    Geo2Xyz {
        lat: f64,
        lon: f64,
        alt: f64,
    },
    #[serde(rename = "sph2xyz")]
    Sph2Xyz {
        lat: f64,
        lon: f64,
        radius: f64,
    },
    #[serde(rename = "xyz2geo")]
    Xyz2Geo {
        position: [f64; 3],
    },
    #[serde(rename = "xyz2sph")]
    Xyz2Sph {
        position: [f64; 3],
    },
    UtcDate {
        year: i32,
        month: u32,
        day: u32,
        #[serde(default)]
        hour: u32,
        #[serde(default)]
        minute: u32,
        #[serde(default)]
        second: u32,
    },
    HaversineDistance {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },
    Distance {
        a: [f64; 3],
        b: [f64; 3],
    },
}

impl Command {
    /// Script name of the command, as used in the `type` field
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mov { .. } => "mov",
            Command::Rot { .. } => "rot",
            Command::RelativeRot { .. } => "relative_rot",
            Command::AddPoint { .. } => "add_point",
            Command::AddObservatory { .. } => "add_observatory",
            Command::AddSatellite { .. } => "add_satellite",
            Command::AddCamera { .. } => "add_camera",
            Command::SetColor { .. } => "set_color",
            Command::DeletePoint { .. } => "delete_point",
            Command::CreateLine { .. } => "create_line",
            Command::DeleteLine { .. } => "delete_line",
            Command::Angle { .. } => "angle",
            Command::Rad2Deg { .. } => "rad2deg",
            Command::Deg2Rad { .. } => "deg2rad",
            Command::FetchTle { .. } => "fetch_tle",
            Command::Mov2Sat { .. } => "mov2sat",
            Command::FindBestQuaternion { .. } => "find_best_quaternion",
            Command::SetOffset { .. } => "set_offset",
            Command::Point { .. } => "point",
            Command::Frame { .. } => "frame",
            Command::CameraAxes { .. } => "camera_axes",
            Command::ListPoints { .. } => "list_points",
            Command::ValidateName { .. } => "validate_name",
            Command::Reset => "reset",
            Command::SetTime { .. } => "set_time",
            Command::SetSpeed { .. } => "set_speed",
            Command::ResumeSimTime => "resume_sim_time",
            Command::PauseSimTime => "pause_sim_time",
            Command::ToggleSimTime => "toggle_sim_time",
            Command::Update { .. } => "update",
            Command::SetBodies { .. } => "set_bodies",
            Command::ZyxToQuaternion { .. } => "zyx_to_quaternion",
            Command::Geo2Xyz { .. } => "geo2xyz",
            Command::Sph2Xyz { .. } => "sph2xyz",
            Command::Xyz2Geo { .. } => "xyz2geo",
            Command::Xyz2Sph { .. } => "xyz2sph",
            Command::UtcDate { .. } => "utc_date",
            Command::HaversineDistance { .. } => "haversine_distance",
            Command::Distance { .. } => "distance",
        }
    }
}

/// Value produced by a successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Done,
    Flag(bool),
    Scalar(f64),
    Vector([f64; 3]),
    Quaternion(Quaternion),
    Geographic(Geographic),
    Spherical(Spherical),
    Frame(Frame),
    CameraAxes(CameraAxes),
    Time(DateTime<Utc>),
    Text(String),
    Names(Vec<String>),
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Done => write!(f, "ok"),
            CommandOutput::Flag(value) => write!(f, "{}", value),
            CommandOutput::Scalar(value) => write!(f, "{}", value),
            CommandOutput::Vector(v) => write!(f, "[{}, {}, {}]", v[0], v[1], v[2]),
            CommandOutput::Quaternion(q) => write!(f, "{}", q),
            CommandOutput::Geographic(g) => {
                write!(f, "lat {:.6}°, lon {:.6}°, alt {:.3} km", g.lat, g.lon, g.alt)
            }
            CommandOutput::Spherical(s) => {
                write!(f, "lat {:.6}°, lon {:.6}°, r {:.3} km", s.lat, s.lon, s.radius)
            }
            CommandOutput::Frame(frame) => {
                write!(f, "x {:?}, y {:?}, z {:?}", frame.x, frame.y, frame.z)
            }
            CommandOutput::CameraAxes(axes) => write!(
                f,
                "direction {:?}, rows {:?}, columns {:?}",
                axes.direction, axes.rows, axes.columns
            ),
            CommandOutput::Time(time) => write!(f, "{}", time.to_rfc3339()),
            CommandOutput::Text(text) => write!(f, "{}", text),
            CommandOutput::Names(names) => write!(f, "{}", names.join(", ")),
        }
    }
}

/// Run one command against the scene
pub fn execute(
    scene: &mut Scene,
    command: &Command,
    fetcher: &dyn TleFetcher,
) -> Result<CommandOutput> {
    log::debug!("Executing {}", command.name());

    let output = match command {
        Command::Mov {
            name,
            position,
            use_geo,
        } => {
            scene.mov(name, *position, *use_geo)?;
            CommandOutput::Done
        }
        Command::Rot { name, quaternion } => {
            scene.rot(name, *quaternion)?;
            CommandOutput::Done
        }
        Command::RelativeRot { name, quaternion } => {
            scene.relative_rot(name, *quaternion)?;
            CommandOutput::Done
        }
        Command::AddPoint {
            name,
            coordinates,
            use_geo,
            quaternion,
            relative_to,
            color,
            camera,
        } => {
            // Cameras need an attitude to hang off
            if camera.is_some() && quaternion.is_none() {
                return Err(QuaternionsError::NotOriented(name.clone()));
            }
            let coordinates = as_cartesian(*coordinates, *use_geo);
            scene.add_point(name, coordinates, *quaternion, relative_to.as_deref())?;

            if let Err(error) = decorate_point(scene, name, color.as_deref(), camera.as_ref()) {
                scene.delete_point(name)?;
                return Err(error);
            }
            CommandOutput::Done
        }
        Command::AddObservatory {
            name,
            coordinates,
            use_geo,
            quaternion,
            fov,
            mode,
            relative_to,
        } => {
            let coordinates = as_cartesian(*coordinates, *use_geo);
            scene.add_observatory(
                name,
                coordinates,
                *quaternion,
                *fov,
                mode,
                relative_to.as_deref(),
            )?;
            CommandOutput::Done
        }
        Command::AddSatellite {
            name,
            source,
            mode,
            camera,
        } => {
            scene.add_satellite(name, source, mode.clone(), camera.as_ref(), fetcher)?;
            CommandOutput::Done
        }
        Command::AddCamera { name, camera } => {
            scene.add_camera(name, camera)?;
            CommandOutput::Done
        }
        Command::SetColor { name, color } => {
            scene.set_color(name, color)?;
            CommandOutput::Done
        }
        Command::DeletePoint { name } => {
            scene.delete_point(name)?;
            CommandOutput::Done
        }
        Command::CreateLine { name, start, end } => {
            scene.create_line(name, start.clone(), end.clone())?;
            CommandOutput::Done
        }
        Command::DeleteLine { name } => {
            scene.delete_line(name)?;
            CommandOutput::Done
        }
        Command::Angle { a, b } => CommandOutput::Scalar(scene.angle(a, b)?),
        Command::Rad2Deg { value } => CommandOutput::Scalar(rad2deg(*value)),
        Command::Deg2Rad { value } => CommandOutput::Scalar(deg2rad(*value)),
        Command::FetchTle { id } => CommandOutput::Text(scene.fetch_tle(id, fetcher)?),
        Command::Mov2Sat {
            name,
            id,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(|| scene.clock().now());
            scene.mov2sat(name, id, &timestamp, fetcher)?;
            CommandOutput::Done
        }
        Command::FindBestQuaternion {
            primary_body_vector,
            secondary_body_vector,
            primary_target_vector,
            secondary_target_vector,
        } => CommandOutput::Quaternion(scene.find_best_quaternion(
            primary_body_vector,
            secondary_body_vector,
            primary_target_vector,
            secondary_target_vector,
        )?),
        Command::SetOffset { name, quaternion } => {
            scene.set_offset(name, *quaternion)?;
            CommandOutput::Done
        }
        Command::Point { name } => {
            let position = scene.position_of(&PointRef::named(name.as_str()))?;
            CommandOutput::Vector(to_array(&position))
        }
        Command::Frame { name } => CommandOutput::Frame(scene.frame(name)?),
        Command::CameraAxes { name } => CommandOutput::CameraAxes(scene.camera_axes(name)?),
        Command::ListPoints { filter } => CommandOutput::Names(scene.list_points(*filter)),
        Command::ValidateName { name } => {
            scene.validate_name(name)?;
            CommandOutput::Done
        }
        Command::Reset => {
            scene.reset()?;
            CommandOutput::Done
        }
        Command::SetTime { time } => {
            scene.clock_mut().set_time(*time);
            CommandOutput::Time(*time)
        }
        Command::SetSpeed { speed } => {
            scene.clock_mut().set_speed(*speed)?;
            CommandOutput::Done
        }
        Command::ResumeSimTime => {
            scene.clock_mut().resume();
            CommandOutput::Flag(true)
        }
        Command::PauseSimTime => {
            scene.clock_mut().pause();
            CommandOutput::Flag(false)
        }
        Command::ToggleSimTime => CommandOutput::Flag(scene.clock_mut().toggle()),
        Command::Update { timestamp } => {
            let timestamp = timestamp.unwrap_or_else(|| scene.clock().now());
            let failed = scene
                .update(&timestamp)
                .into_iter()
                .map(|failure| failure.name)
                .collect();
            CommandOutput::Names(failed)
        }
        Command::SetBodies {
            moon_position,
            sun_direction,
        } => {
            if let Some(moon) = moon_position {
                scene.set_moon_position(from_array(*moon));
            }
            if let Some(sun) = sun_direction {
                scene.set_sun_direction(from_array(*sun));
            }
            CommandOutput::Done
        }
        Command::ZyxToQuaternion {
            yaw,
            pitch,
            roll,
            degrees,
        } => CommandOutput::Quaternion(Quaternion::from_zyx_euler(*yaw, *pitch, *roll, *degrees)),
        Command::Geo2Xyz { lat, lon, alt } => {
            CommandOutput::Vector(to_array(&geo2xyz(*lat, *lon, *alt)))
        }
        Command::Sph2Xyz { lat, lon, radius } => {
            CommandOutput::Vector(to_array(&sph2xyz(*lat, *lon, *radius)))
        }
        Command::Xyz2Geo { position } => {
            CommandOutput::Geographic(xyz2geo(&from_array(*position))?)
        }
        Command::Xyz2Sph { position } => {
            CommandOutput::Spherical(xyz2sph(&from_array(*position))?)
        }
        Command::UtcDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } => CommandOutput::Time(utc_date(*year, *month, *day, *hour, *minute, *second)?),
        Command::HaversineDistance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => CommandOutput::Scalar(haversine_distance(*lat1, *lon1, *lat2, *lon2)),
        Command::Distance { a, b } => {
            CommandOutput::Scalar(distance(&from_array(*a), &from_array(*b)))
        }
    };

    Ok(output)
}

fn decorate_point(
    scene: &mut Scene,
    name: &str,
    color: Option<&str>,
    camera: Option<&CameraConfig>,
) -> Result<()> {
    if let Some(color) = color {
        scene.set_color(name, color)?;
    }
    if let Some(camera) = camera {
        scene.add_camera(name, camera)?;
    }
    Ok(())
}

fn as_cartesian(coordinates: [f64; 3], use_geo: bool) -> [f64; 3] {
    if use_geo {
        to_array(&geo2xyz(coordinates[0], coordinates[1], coordinates[2]))
    } else {
        coordinates
    }
}

/// Parse a JSON array of commands
pub fn parse_script(text: &str) -> std::result::Result<Vec<Command>, ScriptError> {
    Ok(serde_json::from_str(text)?)
}

/// Load a JSON command script from disk
pub fn load_script<P: AsRef<Path>>(path: P) -> std::result::Result<Vec<Command>, ScriptError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&text)
}

/// Result of one script command
#[derive(Debug)]
pub struct StepResult {
    pub index: usize,
    pub command: &'static str,
    pub result: Result<CommandOutput>,
}

/// Execute every command in order; failures are recorded, not fatal
pub fn run_script(
    scene: &mut Scene,
    commands: &[Command],
    fetcher: &dyn TleFetcher,
) -> Vec<StepResult> {
    commands
        .iter()
        .enumerate()
        .map(|(index, command)| {
            let result = execute(scene, command, fetcher);
            match &result {
                Ok(output) => log::info!("[{}] {} -> {}", index, command.name(), output),
                Err(error) => log::warn!("[{}] {} failed: {}", index, command.name(), error),
            }
            StepResult {
                index,
                command: command.name(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::tests::ISS_TLE;
    use crate::tle::StaticFetcher;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn run(scene: &mut Scene, json: &str) -> Result<CommandOutput> {
        let command: Command = serde_json::from_str(json).unwrap();
        execute(scene, &command, &StaticFetcher::new().with("25544", ISS_TLE))
    }

    #[test]
    fn test_command_names_match_serde_tags() {
        let commands = vec![
            Command::Reset,
            Command::Rad2Deg { value: 1.0 },
            Command::Mov2Sat {
                name: "sat".to_string(),
                id: "25544".to_string(),
                timestamp: None,
            },
            Command::Geo2Xyz {
                lat: 0.0,
                lon: 0.0,
                alt: 0.0,
            },
            Command::ToggleSimTime,
            Command::FindBestQuaternion {
                primary_body_vector: BodyVector::Literal([0.0, 0.0, 1.0]),
                secondary_body_vector: BodyVector::Literal([0.0, 1.0, 0.0]),
                primary_target_vector: VectorArg::Literal([1.0, 0.0, 0.0]),
                secondary_target_vector: VectorArg::Literal([0.0, 0.0, 1.0]),
            },
        ];
        for command in commands {
            let value = serde_json::to_value(&command).unwrap();
            assert_eq!(value["type"], command.name());
        }
    }

    #[test]
    fn test_find_best_quaternion_command() {
        let mut scene = Scene::new().unwrap();
        let output = run(
            &mut scene,
            r#"{"type": "find_best_quaternion",
                "primary_body_vector": "z",
                "secondary_body_vector": [0, 1, 0],
                "primary_target_vector": [1, 0, 0],
                "secondary_target_vector": [0, 0, 1]}"#,
        )
        .unwrap();

        match output {
            CommandOutput::Quaternion(q) => {
                assert_relative_eq!(q.x, 0.5, epsilon = 1e-12);
                assert_relative_eq!(q.y, 0.5, epsilon = 1e-12);
                assert_relative_eq!(q.z, 0.5, epsilon = 1e-12);
                assert_relative_eq!(q.w, 0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_geo_commands() {
        let mut scene = Scene::empty();
        let output = run(&mut scene, r#"{"type": "geo2xyz", "lat": 0, "lon": 90, "alt": 0}"#).unwrap();
        match output {
            CommandOutput::Vector(v) => {
                assert_relative_eq!(v[0], 0.0, epsilon = 1e-9);
                assert_relative_eq!(v[1], 6371.0, epsilon = 1e-9);
            }
            other => panic!("unexpected output {:?}", other),
        }

        assert!(matches!(
            run(&mut scene, r#"{"type": "xyz2sph", "position": [0, 0, 0]}"#),
            Err(QuaternionsError::Coordinate(_))
        ));
    }

    #[test]
    fn test_add_point_with_geo_and_camera() {
        let mut scene = Scene::new().unwrap();
        run(
            &mut scene,
            r##"{"type": "add_point", "name": "KS", "coordinates": [0, 0, 0], "use_geo": true,
                "quaternion": [0, 0, 0, 1], "color": "#00ff00",
                "camera": {"orientation": [0, 0, 0, 1], "fov": 20}}"##,
        )
        .unwrap();

        let point = scene.get_point("KS").unwrap();
        assert_relative_eq!(point.position.x, 6371.0, epsilon = 1e-9);
        assert_eq!(point.color, "#00ff00");
        assert!(point.camera.is_some());

        let names = run(&mut scene, r#"{"type": "list_points", "filter": "OrientedPoint"}"#).unwrap();
        assert_eq!(
            names,
            CommandOutput::Names(vec!["KS".to_string(), "sat".to_string()])
        );
    }

    #[test]
    fn test_failed_add_point_leaves_no_point() {
        let mut scene = Scene::new().unwrap();
        let before = scene.list_points(None);

        // Camera without a quaternion
        assert!(matches!(
            run(
                &mut scene,
                r#"{"type": "add_point", "name": "M", "coordinates": [1, 2, 3],
                    "camera": {"orientation": [0, 0, 0, 1], "fov": 20}}"#,
            ),
            Err(QuaternionsError::NotOriented(_))
        ));
        assert_eq!(scene.list_points(None), before);
        assert!(scene.point("M").is_none());

        // Unknown parent
        assert!(run(
            &mut scene,
            r#"{"type": "add_point", "name": "M", "coordinates": [1, 2, 3], "relative_to": "ghost"}"#,
        )
        .is_err());
        assert_eq!(scene.list_points(None), before);
    }

    #[test]
    fn test_sim_time_commands() {
        let mut scene = Scene::empty();
        assert_eq!(
            run(&mut scene, r#"{"type": "pause_sim_time"}"#).unwrap(),
            CommandOutput::Flag(false)
        );
        assert_eq!(
            run(&mut scene, r#"{"type": "toggle_sim_time"}"#).unwrap(),
            CommandOutput::Flag(true)
        );
        run(&mut scene, r#"{"type": "set_time", "time": "2008-09-20T12:25:40Z"}"#).unwrap();
        assert_eq!(scene.clock().now().to_rfc3339(), "2008-09-20T12:25:40+00:00");

        assert!(matches!(
            run(&mut scene, r#"{"type": "utc_date", "year": 2023, "month": 2, "day": 30}"#),
            Err(QuaternionsError::Time(_))
        ));
    }

    #[test]
    fn test_satellite_commands() {
        let mut scene = Scene::new().unwrap();
        run(&mut scene, r#"{"type": "set_time", "time": "2008-09-20T12:25:40Z"}"#).unwrap();
        run(
            &mut scene,
            r#"{"type": "add_satellite", "name": "iss", "source": {"type": "norad", "id": "25544"},
                "mode": {"type": "fixed", "ecef_quaternion": [0, 0, 0, 1]}}"#,
        )
        .unwrap();
        assert!(scene.tles().contains("25544"));

        let failed = run(&mut scene, r#"{"type": "update"}"#).unwrap();
        assert_eq!(failed, CommandOutput::Names(vec![]));

        assert!(matches!(
            run(&mut scene, r#"{"type": "set_offset", "name": "iss", "quaternion": [0, 0, 0, 1]}"#),
            Err(QuaternionsError::NotDynamic(_))
        ));

        run(&mut scene, r#"{"type": "mov2sat", "name": "sat", "id": "25544"}"#).unwrap();
        assert_eq!(
            scene.get_point("sat").unwrap().position,
            scene.get_point("iss").unwrap().position
        );
    }

    #[test]
    fn test_unknown_command_is_a_parse_error() {
        assert!(matches!(
            parse_script(r#"[{"type": "teleport", "name": "sat"}]"#),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_run_script_continues_after_failure() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"type": "add_point", "name": "A", "coordinates": [1, 0, 0]}},
                {{"type": "angle", "a": "A->Nope", "b": [1, 0, 0]}},
                {{"type": "add_point", "name": "B", "coordinates": [0, 1, 0]}},
                {{"type": "angle", "a": [1, 0, 0], "b": "A->B"}}
            ]"#
        )
        .unwrap();

        let commands = load_script(file.path()).unwrap();
        let mut scene = Scene::empty();
        let results = run_script(&mut scene, &commands, &StaticFetcher::new());

        assert_eq!(results.len(), 4);
        assert!(matches!(
            results[1].result,
            Err(QuaternionsError::UnknownPoint(ref name)) if name == "Nope"
        ));
        assert!(scene.point("B").is_some());
        match &results[3].result {
            Ok(CommandOutput::Scalar(angle)) => assert_relative_eq!(*angle, 135.0, epsilon = 1e-12),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_missing_script_file() {
        assert!(matches!(
            load_script("/nonexistent/script.json"),
            Err(ScriptError::Read { .. })
        ));
    }
}
