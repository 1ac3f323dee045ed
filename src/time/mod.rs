//! Time module for sidereal-time and simulation-clock calculations
//!
//! Timestamps are `chrono::DateTime<Utc>`. UTC is used as an approximation of
//! UT1 for the sidereal angle, which is well within the accuracy of the
//! spherical-Earth scene.

use crate::constants::{DAY_MS, DEG2RAD, J2000, JULIAN_CENTURY, UNIX_EPOCH_JD};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("Invalid date components provided: {0}")]
    InvalidDate(String),

    #[error("Invalid simulation speed: {0}")]
    InvalidSpeed(f64),

    #[error("Simulation time out of range: {0}")]
    Overflow(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Julian date of a UTC instant (millisecond resolution)
pub fn julian_date(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.timestamp_millis() as f64 / DAY_MS + UNIX_EPOCH_JD
}

/// Julian centuries elapsed since the J2000.0 epoch
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000) / JULIAN_CENTURY
}

/// Greenwich Mean Sidereal Time in degrees, normalised to `[0, 360)`
///
/// IAU 1982 polynomial in Julian centuries since J2000:
/// `280.46061837 + 360.98564736629 d + 0.000387933 T² - T³ / 38710000`
pub fn gmst_degrees_from_jd(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    let d = jd - J2000;
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    theta.rem_euclid(360.0)
}

/// Greenwich Mean Sidereal Time in radians at a UTC instant
pub fn gmst(timestamp: &DateTime<Utc>) -> f64 {
    gmst_degrees_from_jd(julian_date(timestamp)) * DEG2RAD
}

/// Creates a UTC instant, rejecting impossible calendar components
///
/// ```rust
/// use quaternions::time::utc_date;
///
/// assert!(utc_date(2024, 2, 29, 12, 0, 0).is_ok());
/// assert!(utc_date(2024, 2, 30, 0, 0, 0).is_err());
/// ```
pub fn utc_date(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| {
            TimeError::InvalidDate(format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                year, month, day, hour, minute, second
            ))
        })
}

/// Largest sim-time multiplier magnitude accepted by [`SimClock::set_speed`]
pub const MAX_SPEED: f64 = 1.0e6;

/// Simulation clock driving the animation loop
///
/// Sim time only moves while the clock is running; `speed` scales wall-clock
/// time into sim time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    time: DateTime<Utc>,
    running: bool,
    speed: f64,
}

impl SimClock {
    /// Create a running clock starting at `start` at real-time speed
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            time: start,
            running: true,
            speed: 1.0,
        }
    }

    /// Current simulation time
    pub fn now(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Flip between running and paused, returning the new running state
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Jump to a new simulation time without changing the running state
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    /// Set the sim-time multiplier; must be finite and within `MAX_SPEED`
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !speed.is_finite() || speed.abs() > MAX_SPEED {
            return Err(TimeError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(())
    }

    /// Advance by a wall-clock interval, returning the new sim time
    ///
    /// The clock is left untouched if the step would leave chrono's range.
    pub fn advance(&mut self, elapsed: Duration) -> Result<DateTime<Utc>> {
        if self.running {
            // Float to int casts saturate, so huge steps fail below
            let millis = (elapsed.num_milliseconds() as f64 * self.speed).round() as i64;
            self.time = Duration::try_milliseconds(millis)
                .and_then(|step| self.time.checked_add_signed(step))
                .ok_or_else(|| {
                    TimeError::Overflow(format!(
                        "{} advanced by {} ms",
                        self.time.to_rfc3339(),
                        millis
                    ))
                })?;
        }
        Ok(self.time)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, x{})",
            self.time.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            if self.running { "running" } else { "paused" },
            self.speed
        )
    }
}
