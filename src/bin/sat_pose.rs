//! Satellite Pose Tool
//!
//! Propagates a satellite from its TLE and prints the Earth-fixed position,
//! geographic coordinates and attitude quaternion over a time range.
//!
//! Usage:
//!   cargo run --bin sat_pose -- --norad 25544 --minutes 90 --step 10
//!   cargo run --bin sat_pose -- --tle-file iss.tle --start 2024-01-01T00:00:00Z

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, ValueEnum};
use quaternions::config::Settings;
use quaternions::coordinates::xyz2geo;
use quaternions::points::Satellite;
use quaternions::targets::{Axis, NamedTarget};
use quaternions::tle::{Tle, TleFetcher};
use quaternions::{OrientationMode, Scene};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Body z to nadir, body y along the velocity
    NadirVelocity,
    /// Body z along the velocity, body y to nadir
    VelocityNadir,
    /// Body z to the Sun, body y to nadir
    SunNadir,
    /// Identity attitude in the Earth-fixed frame
    Fixed,
}

impl Mode {
    fn orientation(self) -> OrientationMode {
        match self {
            Mode::NadirVelocity => OrientationMode::nadir_velocity(),
            Mode::VelocityNadir => OrientationMode::dynamic(
                Axis::Z,
                Axis::Y,
                NamedTarget::Velocity,
                NamedTarget::Nadir,
            ),
            Mode::SunNadir => {
                OrientationMode::dynamic(Axis::Z, Axis::Y, NamedTarget::Sun, NamedTarget::Nadir)
            }
            Mode::Fixed => OrientationMode::fixed(quaternions::Quaternion::identity()),
        }
    }
}

/// Satellite Pose Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints satellite position and attitude over a time range",
    long_about = None
)]
struct Args {
    /// Satellite catalog number to fetch
    #[arg(short, long, conflicts_with = "tle_file")]
    norad: Option<String>,

    /// Read the TLE from a file instead of fetching it
    #[arg(short, long)]
    tle_file: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Start time (RFC 3339); defaults to now
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Length of the time range in minutes
    #[arg(short, long, default_value_t = 90)]
    minutes: i64,

    /// Step between samples in minutes
    #[arg(long, default_value_t = 10)]
    step: i64,

    /// Orientation mode
    #[arg(long, value_enum, default_value_t = Mode::NadirVelocity)]
    mode: Mode,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load_or_default(args.settings.as_ref())?;

    let text = match (&args.tle_file, &args.norad) {
        (Some(path), _) => fs::read_to_string(path)?,
        (None, Some(id)) => {
            if settings.disk_cache {
                settings.cached_fetcher().fetch(id)?
            } else {
                settings.celestrak_fetcher().fetch(id)?
            }
        }
        (None, None) => return Err("either --norad or --tle-file is required".into()),
    };
    let tle = Tle::parse(&text)?;

    if args.step <= 0 {
        return Err("--step must be positive".into());
    }

    println!("Satellite: {}", tle.name().unwrap_or("(unnamed)"));
    println!("Catalog number: {}", tle.norad_id());
    println!("Mode: {:?}\n", args.mode);

    let satellite = Satellite::new(tle, args.mode.orientation());
    let scene = Scene::empty();
    let start = args.start.unwrap_or_else(Utc::now);

    println!(
        "{:<25} {:>10} {:>10} {:>10} {:>9} {:>10} {:>9}  quaternion [x, y, z, w]",
        "time", "x km", "y km", "z km", "lat", "lon", "alt km"
    );

    let mut minute = 0;
    while minute <= args.minutes {
        let timestamp = start + Duration::minutes(minute);
        match satellite.pose(&timestamp, &scene) {
            Ok(pose) => {
                let geo = xyz2geo(&pose.position)?;
                println!(
                    "{:<25} {:>10.2} {:>10.2} {:>10.2} {:>9.4} {:>10.4} {:>9.2}  {}",
                    timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
                    pose.position.x,
                    pose.position.y,
                    pose.position.z,
                    geo.lat,
                    geo.lon,
                    geo.alt,
                    pose.orientation
                );
            }
            Err(e) => println!("{:<25} ERROR: {}", timestamp.format("%Y-%m-%dT%H:%M:%SZ"), e),
        }
        minute += args.step;
    }

    Ok(())
}
