//! Orientation modes and per-frame attitude calculation
//!
//! A mode either pins the attitude to a constant Earth-fixed quaternion or
//! derives it every frame from two body vectors and two (possibly symbolic)
//! targets through the dual-vector solver.

use serde::{Deserialize, Serialize};

use crate::attitude::find_best_quaternion;
use crate::math::Quaternion;
use crate::scene::Scene;
use crate::targets::{resolve_target, Axis, BodyVector, NamedTarget, Observer, TargetVector};
use crate::Result;

/// How a point's attitude is derived each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrientationMode {
    /// Constant quaternion expressed in the Earth-fixed frame
    Fixed { ecef_quaternion: Quaternion },

    /// Primary body vector aligned exactly, secondary as close as possible
    Dynamic {
        primary_body_vector: BodyVector,
        secondary_body_vector: BodyVector,
        primary_target_vector: TargetVector,
        secondary_target_vector: TargetVector,
        /// Post-multiplied onto the solved attitude
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<Quaternion>,
    },
}

impl OrientationMode {
    pub fn fixed(ecef_quaternion: Quaternion) -> Self {
        OrientationMode::Fixed { ecef_quaternion }
    }

    /// Dynamic mode without offset
    pub fn dynamic(
        primary_body_vector: impl Into<BodyVector>,
        secondary_body_vector: impl Into<BodyVector>,
        primary_target_vector: impl Into<TargetVector>,
        secondary_target_vector: impl Into<TargetVector>,
    ) -> Self {
        OrientationMode::Dynamic {
            primary_body_vector: primary_body_vector.into(),
            secondary_body_vector: secondary_body_vector.into(),
            primary_target_vector: primary_target_vector.into(),
            secondary_target_vector: secondary_target_vector.into(),
            offset: None,
        }
    }

    /// Body +Z towards nadir, body +Y along the velocity
    pub fn nadir_velocity() -> Self {
        OrientationMode::dynamic(Axis::Z, Axis::Y, NamedTarget::Nadir, NamedTarget::Velocity)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, OrientationMode::Dynamic { .. })
    }

    /// Sets the offset of a dynamic mode; returns false for fixed modes
    pub fn set_offset(&mut self, new_offset: Quaternion) -> bool {
        match self {
            OrientationMode::Dynamic { offset, .. } => {
                *offset = Some(new_offset);
                true
            }
            OrientationMode::Fixed { .. } => false,
        }
    }

    /// Attitude for an observer in the given scene state
    pub fn calculate(&self, scene: &Scene, observer: &Observer) -> Result<Quaternion> {
        calculate_orientation(scene, self, observer)
    }
}

impl Default for OrientationMode {
    fn default() -> Self {
        OrientationMode::nadir_velocity()
    }
}

/// Orientation of an observatory camera
///
/// Dynamic observatories always point body `z` at the primary target and body
/// `[0, -1, 0]` at the secondary target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObservatoryMode {
    Fixed {
        ecef_quaternion: Quaternion,
    },
    Dynamic {
        primary_target_vector: TargetVector,
        secondary_target_vector: TargetVector,
    },
}

impl ObservatoryMode {
    pub fn to_orientation_mode(&self) -> OrientationMode {
        match self {
            ObservatoryMode::Fixed { ecef_quaternion } => OrientationMode::fixed(*ecef_quaternion),
            ObservatoryMode::Dynamic {
                primary_target_vector,
                secondary_target_vector,
            } => OrientationMode::dynamic(
                Axis::Z,
                [0.0, -1.0, 0.0],
                primary_target_vector.clone(),
                secondary_target_vector.clone(),
            ),
        }
    }
}

impl From<ObservatoryMode> for OrientationMode {
    fn from(mode: ObservatoryMode) -> Self {
        mode.to_orientation_mode()
    }
}

/// Attitude quaternion for `mode` as seen from `observer`
pub fn calculate_orientation(
    scene: &Scene,
    mode: &OrientationMode,
    observer: &Observer,
) -> Result<Quaternion> {
    match mode {
        OrientationMode::Fixed { ecef_quaternion } => Ok(*ecef_quaternion),
        OrientationMode::Dynamic {
            primary_body_vector,
            secondary_body_vector,
            primary_target_vector,
            secondary_target_vector,
            offset,
        } => {
            let primary_target = resolve_target(scene, primary_target_vector, observer)?;
            let secondary_target = resolve_target(scene, secondary_target_vector, observer)?;

            let q = find_best_quaternion(
                &primary_body_vector.resolve(),
                &secondary_body_vector.resolve(),
                &primary_target,
                &secondary_target,
            )?;

            Ok(match offset {
                Some(offset) => q.multiply(offset),
                None => q,
            })
        }
    }
}
