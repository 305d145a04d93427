//! # Persisted path document
//!
//! The interchange format used to save and load a planned path, consumed by
//! both the editor and the robot itself. Two schema versions exist in the
//! wild:
//!
//! - v1.2: carries a full `motion_profile` section with the sampled points.
//! - v1.0/v1.1 ("legacy"): no `motion_profile` section; the profile must be
//!   regenerated from the `metadata` limits on load.
//!
//! Both must load losslessly, including the `action_points` map of discrete
//! robot behaviours attached to anchor control points.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::traj::{ControlPoint, ProfileSample, ProfileType, TrajectoryPoint};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The schema version written by this software.
pub const CURRENT_VERSION: &str = "1.2";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A complete persisted path document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFile {
    pub metadata: Metadata,

    pub control_points: Vec<ControlPoint>,

    /// Discrete robot behaviours keyed by anchor control point index.
    ///
    /// Serialised with string keys (JSON maps cannot key on integers); the
    /// round trip through `BTreeMap<usize, _>` is lossless.
    #[serde(default)]
    pub action_points: BTreeMap<usize, ActionPoint>,

    #[serde(default)]
    pub trajectory: Vec<TrajectoryPoint>,

    /// Absent in legacy documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_profile: Option<MotionProfileDoc>,
}

/// Document metadata.
///
/// The defaults on the limit fields match what the original editor assumed
/// when a field was missing, so sparse legacy documents load identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub path_length: f64,

    #[serde(default)]
    pub total_time: f64,

    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: f64,

    #[serde(default = "default_max_angular_velocity")]
    pub max_angular_velocity: f64,

    #[serde(default)]
    pub profile_type: ProfileType,
}

/// Discrete behaviours attached to one anchor point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPoint {
    /// Named intake routine to trigger at this anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tongue: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligner: Option<bool>,
}

/// The motion profile section of a v1.2 document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionProfileDoc {
    #[serde(rename = "type")]
    pub profile_type: ProfileType,

    pub max_speed: f64,
    pub max_acceleration: f64,
    pub max_deceleration: f64,
    pub max_jerk: f64,

    pub profile_points: Vec<ProfileSample>,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_velocity() -> f64 {
    60.0
}

fn default_max_acceleration() -> f64 {
    100.0
}

fn default_max_angular_velocity() -> f64 {
    3.0
}
