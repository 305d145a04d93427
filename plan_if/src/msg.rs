//! # Request and response definitions for the planning operations
//!
//! These mirror the contract an external request/response layer (an HTTP
//! endpoint, a bench driver, a test harness) uses to talk to the core. The
//! core itself never performs any transport.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::traj::{
    ControlPoint, ControllerGains, ProfileSample, ProfileType, RobotState, SimulationParameters,
    TrajectoryPoint,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Request a trajectory to be generated from a list of control points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub control_points: Vec<ControlPoint>,
}

/// The generated trajectory and its total arc length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResponse {
    pub trajectory: Vec<TrajectoryPoint>,
    pub length: f64,
}

/// Request a velocity profile to be synthesised over a path length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub path_length: f64,

    #[serde(rename = "type")]
    pub profile_type: ProfileType,

    pub max_vel: f64,
    pub max_accel: f64,
    pub max_decel: f64,
    pub max_jerk: f64,
}

/// The sampled velocity profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Vec<ProfileSample>,
}

/// Per-run tuning supplied at simulation start.
///
/// On the wire this is a single flat map holding both the controller gains
/// and the simulation parameters, any of which may be omitted.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct StartParams {
    #[serde(flatten)]
    pub sim: SimulationParameters,

    #[serde(flatten)]
    pub gains: ControllerGains,
}

/// Request a simulation run to be started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimStartRequest {
    pub trajectory: Vec<TrajectoryPoint>,
    pub profile: Vec<ProfileSample>,
    pub path_length: f64,
    pub params: StartParams,

    /// `[x, y, theta]` with theta in degrees, field convention.
    pub start_pose: [f64; 3],
}

/// The outcome of a single simulation step.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    /// False when the simulation was not running and no step was taken.
    pub running: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RobotState>,
}
