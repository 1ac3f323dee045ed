//! Vector and quaternion primitives

pub mod quaternion;
pub mod vector;

pub use quaternion::Quaternion;
pub use vector::{angle_between, normalize_or_zero, project_on_plane, try_normalize};
