//! Scalar snapshot field types shared by every wire shape.
//!
//! These types appear verbatim in the client form, the dispatch form, and
//! parser results. The pipeline never mutates them; it only copies them
//! across message boundaries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The user a snapshot belongs to.
///
/// Immutable once created; owned by the client/ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Client-assigned user identifier. First level of the blob-store scope.
    pub user_id: u64,
    /// Display name.
    pub username: String,
    /// Birth date as seconds since the Unix epoch.
    pub birthday: i64,
    /// Self-reported gender.
    pub gender: Gender,
}

/// User gender marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

/// Head pose at snapshot time: spatial translation plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pose {
    /// Position in space.
    pub translation: Translation,
    /// Orientation quaternion.
    pub rotation: Rotation,
}

/// Spatial position component of a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Translation {
    /// X coordinate in meters.
    pub x: f64,
    /// Y coordinate in meters.
    pub y: f64,
    /// Z coordinate in meters.
    pub z: f64,
}

/// Orientation quaternion component of a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rotation {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// W (scalar) component.
    pub w: f64,
}

/// Cognition readings at snapshot time, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Feelings {
    /// Hunger level.
    pub hunger: f32,
    /// Thirst level.
    pub thirst: f32,
    /// Exhaustion level.
    pub exhaustion: f32,
    /// Happiness level.
    pub happiness: f32,
}
