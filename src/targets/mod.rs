//! Vector and target resolution
//!
//! Script arguments and orientation modes refer to directions symbolically.
//! The types here capture every accepted shape as a sum type, and the
//! `resolve_*` functions turn them into concrete vectors against the current
//! [`Scene`].
//!
//! | Argument                 | Resolves to                                   |
//! |--------------------------|-----------------------------------------------|
//! | `[x, y, z]`              | the literal vector                            |
//! | `"x"`, `"y"`, `"z"`      | canonical body axis (body vectors only)       |
//! | `"A->B"`                 | position of `B` minus position of `A`         |
//! | `"<line>"`               | end minus start of a named line               |
//! | `{"type": "Nadir"}`      | `-normalize(position)`                        |
//! | `{"type": "Velocity"}`   | `normalize(velocity)`                         |
//! | `{"type": "Moon"}`       | `normalize(moon - position)`                  |
//! | `{"type": "Sun"}`        | sun light direction as stored in the scene    |
//! | `{"type": "TargetPointing", "target": ..}` | `normalize(target - position)` |

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::math::normalize_or_zero;
use crate::math::vector::{from_array, unit_x, unit_y, unit_z};
use crate::scene::{Scene, MOON};
use crate::{QuaternionsError, Result};

/// Separator of the point-to-point vector syntax
pub const ARROW: &str = "->";

/// A position given either literally or by point name
///
/// `"Moon"` is accepted as a name and resolves to the current Moon position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointRef {
    Coordinates([f64; 3]),
    Named(String),
}

impl PointRef {
    pub fn named(name: impl Into<String>) -> Self {
        PointRef::Named(name.into())
    }
}

impl From<[f64; 3]> for PointRef {
    fn from(coordinates: [f64; 3]) -> Self {
        PointRef::Coordinates(coordinates)
    }
}

impl From<&str> for PointRef {
    fn from(name: &str) -> Self {
        PointRef::Named(name.to_string())
    }
}

/// Canonical body axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "x", alias = "X")]
    X,
    #[serde(rename = "y", alias = "Y")]
    Y,
    #[serde(rename = "z", alias = "Z")]
    Z,
}

impl Axis {
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => unit_x(),
            Axis::Y => unit_y(),
            Axis::Z => unit_z(),
        }
    }
}

/// A direction in the body frame: a literal vector or a named axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyVector {
    Literal([f64; 3]),
    Axis(Axis),
}

impl BodyVector {
    /// Body vectors need no scene state
    pub fn resolve(&self) -> Vector3<f64> {
        match self {
            BodyVector::Literal(v) => from_array(*v),
            BodyVector::Axis(axis) => axis.unit(),
        }
    }
}

impl From<Axis> for BodyVector {
    fn from(axis: Axis) -> Self {
        BodyVector::Axis(axis)
    }
}

impl From<[f64; 3]> for BodyVector {
    fn from(v: [f64; 3]) -> Self {
        BodyVector::Literal(v)
    }
}

impl FromStr for BodyVector {
    type Err = QuaternionsError;

    /// Parses `x`, `y` or `z` (any case) or a comma separated triple
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(BodyVector::Axis(Axis::X)),
            "y" => Ok(BodyVector::Axis(Axis::Y)),
            "z" => Ok(BodyVector::Axis(Axis::Z)),
            _ => parse_triple(s).map(BodyVector::Literal).ok_or_else(|| {
                QuaternionsError::InvalidVector(format!(
                    "body vector '{}' must be 3 numbers or one of 'x', 'y', 'z'",
                    s
                ))
            }),
        }
    }
}

/// A direction in the scene frame: literal, `"A->B"`, or a line name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorArg {
    Literal([f64; 3]),
    Reference(String),
}

impl From<[f64; 3]> for VectorArg {
    fn from(v: [f64; 3]) -> Self {
        VectorArg::Literal(v)
    }
}

impl From<&str> for VectorArg {
    fn from(s: &str) -> Self {
        VectorArg::Reference(s.to_string())
    }
}

impl FromStr for VectorArg {
    type Err = std::convert::Infallible;

    /// Comma separated triples become literals, anything else a reference
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match parse_triple(s) {
            Some(v) => VectorArg::Literal(v),
            None => VectorArg::Reference(s.to_string()),
        })
    }
}

/// Symbolic targets computed from the observer's orbital state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NamedTarget {
    Moon,
    Sun,
    Velocity,
    Nadir,
    TargetPointing { target: PointRef },
}

impl fmt::Display for NamedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedTarget::Moon => write!(f, "Moon"),
            NamedTarget::Sun => write!(f, "Sun"),
            NamedTarget::Velocity => write!(f, "Velocity"),
            NamedTarget::Nadir => write!(f, "Nadir"),
            NamedTarget::TargetPointing { target } => match target {
                PointRef::Named(name) => write!(f, "TargetPointing({})", name),
                PointRef::Coordinates(c) => {
                    write!(f, "TargetPointing([{}, {}, {}])", c[0], c[1], c[2])
                }
            },
        }
    }
}

/// Target direction of an orientation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetVector {
    Named(NamedTarget),
    Literal([f64; 3]),
    Reference(String),
}

impl From<NamedTarget> for TargetVector {
    fn from(target: NamedTarget) -> Self {
        TargetVector::Named(target)
    }
}

impl From<[f64; 3]> for TargetVector {
    fn from(v: [f64; 3]) -> Self {
        TargetVector::Literal(v)
    }
}

/// Position and (if moving) velocity of the object a target is resolved for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub position: Vector3<f64>,
    pub velocity: Option<Vector3<f64>>,
}

impl Observer {
    pub fn stationary(position: Vector3<f64>) -> Self {
        Observer {
            position,
            velocity: None,
        }
    }

    pub fn moving(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Observer {
            position,
            velocity: Some(velocity),
        }
    }
}

fn parse_triple(s: &str) -> Option<[f64; 3]> {
    let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
    let values: Vec<f64> = trimmed
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [x, y, z] => Some([*x, *y, *z]),
        _ => None,
    }
}

/// Position of a point reference
pub fn resolve_point(scene: &Scene, point: &PointRef) -> Result<Vector3<f64>> {
    match point {
        PointRef::Coordinates(c) => Ok(from_array(*c)),
        PointRef::Named(name) => position_by_name(scene, name),
    }
}

fn position_by_name(scene: &Scene, name: &str) -> Result<Vector3<f64>> {
    if name == MOON {
        return Ok(scene.bodies().moon_position);
    }
    scene
        .point(name)
        .map(|point| point.position)
        .ok_or_else(|| QuaternionsError::UnknownPoint(name.to_string()))
}

/// Current end-minus-start vector of a named line
pub fn resolve_line(scene: &Scene, name: &str) -> Result<Vector3<f64>> {
    let line = scene
        .line(name)
        .ok_or_else(|| QuaternionsError::UnknownLine(name.to_string()))?;
    let start = resolve_point(scene, &line.start)?;
    let end = resolve_point(scene, &line.end)?;
    Ok(end - start)
}

/// Resolve a literal, `"A->B"` or line-name argument
///
/// ```rust
/// use quaternions::scene::Scene;
/// use quaternions::targets::{resolve_vector, VectorArg};
///
/// let mut scene = Scene::empty();
/// scene.add_point("A", [1.0, 0.0, 0.0], None, None).unwrap();
/// scene.add_point("B", [1.0, 2.0, 0.0], None, None).unwrap();
///
/// let v = resolve_vector(&scene, &VectorArg::from("A -> B")).unwrap();
/// assert_eq!(v.y, 2.0);
/// assert!(resolve_vector(&scene, &VectorArg::from("Nope->B")).is_err());
/// ```
pub fn resolve_vector(scene: &Scene, arg: &VectorArg) -> Result<Vector3<f64>> {
    match arg {
        VectorArg::Literal(v) => Ok(from_array(*v)),
        VectorArg::Reference(reference) => resolve_reference(scene, reference),
    }
}

fn resolve_reference(scene: &Scene, reference: &str) -> Result<Vector3<f64>> {
    if let Some((start, end)) = reference.split_once(ARROW) {
        let start = position_by_name(scene, start.trim())?;
        let end = position_by_name(scene, end.trim())?;
        return Ok(end - start);
    }

    if scene.line(reference).is_some() {
        return resolve_line(scene, reference);
    }

    Err(QuaternionsError::InvalidVector(format!(
        "'{}' is neither a line name nor '<start>{}<end>'",
        reference, ARROW
    )))
}

/// Direction of a symbolic target as seen from `observer`
pub fn resolve_named_target(
    scene: &Scene,
    target: &NamedTarget,
    observer: &Observer,
) -> Result<Vector3<f64>> {
    let position = observer.position;
    match target {
        NamedTarget::Moon => Ok(normalize_or_zero(&(scene.bodies().moon_position - position))),
        // Already a direction
        NamedTarget::Sun => Ok(scene.bodies().sun_direction),
        NamedTarget::Velocity => observer
            .velocity
            .map(|v| normalize_or_zero(&v))
            .ok_or(QuaternionsError::MissingVelocity),
        NamedTarget::Nadir => Ok(-normalize_or_zero(&position)),
        NamedTarget::TargetPointing { target } => {
            let target_position = resolve_point(scene, target)?;
            Ok(normalize_or_zero(&(target_position - position)))
        }
    }
}

/// Resolve an orientation-mode target vector
pub fn resolve_target(
    scene: &Scene,
    target: &TargetVector,
    observer: &Observer,
) -> Result<Vector3<f64>> {
    match target {
        TargetVector::Named(named) => resolve_named_target(scene, named, observer),
        TargetVector::Literal(v) => Ok(from_array(*v)),
        TargetVector::Reference(reference) => resolve_reference(scene, reference),
    }
}
