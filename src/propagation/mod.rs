//! SGP4 propagation of element sets into Earth-fixed states

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use thiserror::Error;

use crate::coordinates::frames::eci_to_ecef;
use crate::math::vector::from_array;
use crate::time::gmst;
use crate::tle::{Tle, TleError};

/// Error type for orbit propagation
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Invalid elements: {0}")]
    Elements(#[from] TleError),

    #[error("Propagator initialisation failed: {0}")]
    Constants(String),

    #[error("Timestamp outside the element epoch range: {0}")]
    Epoch(String),

    #[error("No fix {minutes:.1} minutes from epoch: {reason}")]
    NoFix { minutes: f64, reason: String },
}

/// Result type for propagation
pub type Result<T> = std::result::Result<T, PropagationError>;

/// Position (km) and velocity (km/s) in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// A TLE prepared for repeated propagation
pub struct Propagator {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

impl Propagator {
    pub fn new(tle: &Tle) -> Result<Self> {
        let elements = tle.elements()?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| PropagationError::Constants(format!("{:?}", e)))?;
        Ok(Self {
            elements,
            constants,
        })
    }

    /// Minutes between the element epoch and `timestamp`
    pub fn minutes_since_epoch(&self, timestamp: &DateTime<Utc>) -> Result<f64> {
        self.elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map(|minutes| minutes.0)
            .map_err(|e| PropagationError::Epoch(e.to_string()))
    }

    /// Inertial (TEME) state at `timestamp`
    pub fn eci(&self, timestamp: &DateTime<Utc>) -> Result<StateVector> {
        let minutes = self.minutes_since_epoch(timestamp)?;
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::NoFix {
                minutes,
                reason: format!("{:?}", e),
            })?;

        Ok(StateVector {
            position: from_array(prediction.position),
            velocity: from_array(prediction.velocity),
        })
    }

    /// Earth-fixed state at `timestamp`
    ///
    /// Position and velocity are both rotated by the sidereal angle at
    /// `timestamp`.
    pub fn ecef(&self, timestamp: &DateTime<Utc>) -> Result<StateVector> {
        let eci = self.eci(timestamp)?;
        let theta = gmst(timestamp);
        Ok(StateVector {
            position: eci_to_ecef(&eci.position, theta),
            velocity: eci_to_ecef(&eci.velocity, theta),
        })
    }
}

/// One-shot Earth-fixed state of `tle` at `timestamp`
pub fn propagate_ecef(tle: &Tle, timestamp: &DateTime<Utc>) -> Result<StateVector> {
    Propagator::new(tle)?.ecef(timestamp)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tle::tests::ISS_TLE;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    /// ISS elements with an extreme drag term; the orbit decays within a day
    pub(crate) const DECAYING_TLE: &str = "DECAYING
1 25544U 98067A   08264.51782528 -.00002182  00000-0  50000-0 0  2923
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn epoch() -> DateTime<Utc> {
        // 2008 day 264.51782528
        Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
    }

    #[test]
    fn test_minutes_since_epoch() {
        let propagator = Propagator::new(&Tle::parse(ISS_TLE).unwrap()).unwrap();
        let minutes = propagator.minutes_since_epoch(&epoch()).unwrap();
        assert!(minutes.abs() < 0.1, "{}", minutes);

        let later = propagator
            .minutes_since_epoch(&(epoch() + Duration::hours(1)))
            .unwrap();
        assert_relative_eq!(later - minutes, 60.0, epsilon = 1e-9);

        // Sub-second offsets survive
        let nudged = propagator
            .minutes_since_epoch(&(epoch() + Duration::milliseconds(1500)))
            .unwrap();
        assert_relative_eq!(nudged - minutes, 0.025, epsilon = 1e-9);
    }

    #[test]
    fn test_decayed_orbit_has_no_fix() {
        let tle = Tle::parse(DECAYING_TLE).unwrap();
        assert!(propagate_ecef(&tle, &epoch()).is_ok());

        match propagate_ecef(&tle, &(epoch() + Duration::days(30))) {
            Err(PropagationError::NoFix { minutes, reason }) => {
                assert_relative_eq!(minutes, 30.0 * 1440.0, epsilon = 1.0);
                assert!(!reason.is_empty());
            }
            other => panic!("expected no fix, got {:?}", other),
        }
    }

    #[test]
    fn test_leo_altitude_and_speed() {
        let tle = Tle::parse(ISS_TLE).unwrap();
        for hours in [0, 1, 6, 24] {
            let t = epoch() + Duration::hours(hours);
            let state = propagate_ecef(&tle, &t).unwrap();
            let radius = state.position.norm();
            assert!(radius > 6600.0 && radius < 6800.0, "radius {}", radius);

            let speed = Propagator::new(&tle).unwrap().eci(&t).unwrap().velocity.norm();
            assert!(speed > 7.5 && speed < 7.9, "speed {}", speed);
        }
    }

    #[test]
    fn test_ecef_preserves_norm_and_z() {
        let propagator = Propagator::new(&Tle::parse(ISS_TLE).unwrap()).unwrap();
        let t = epoch() + Duration::minutes(37);
        let eci = propagator.eci(&t).unwrap();
        let ecef = propagator.ecef(&t).unwrap();
        assert_relative_eq!(eci.position.norm(), ecef.position.norm(), max_relative = 1e-12);
        assert_eq!(eci.position.z, ecef.position.z);
        assert_relative_eq!(eci.velocity.norm(), ecef.velocity.norm(), max_relative = 1e-12);
    }

    #[test]
    fn test_same_timestamp_is_bit_identical() {
        let tle = Tle::parse(ISS_TLE).unwrap();
        let t = epoch() + Duration::minutes(12);
        assert_eq!(propagate_ecef(&tle, &t).unwrap(), propagate_ecef(&tle, &t).unwrap());
    }
}
