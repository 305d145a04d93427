//! # Core trajectory wire types
//!
//! Field coordinates are a symmetric square (by default `[-72, 72]` on each
//! axis). Headings use the field convention: 0 radians points along +Y
//! ("up"), with positive angles rotating toward +X. This convention is part
//! of the wire contract and is threaded through path generation, the
//! tracking controller and the kinematic integration — it must not be
//! normalised to the mathematical convention.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A user-placed path control point in field coordinates.
///
/// Control points are grouped in chains of 4 (anchor, handle, handle,
/// anchor) to form cubic Bezier segments. A trailing pair with no following
/// anchor degrades to a straight segment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

/// One sampled point of a generated trajectory.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Position in field coordinates.
    pub x: f64,
    pub y: f64,

    /// Heading in radians, field convention (0 = +Y, positive toward +X).
    pub theta: f64,

    /// Cumulative arc length from the path start, monotonically
    /// non-decreasing.
    pub distance: f64,

    /// Signed rate of heading change per unit arc length. Left at 0 for the
    /// first and last points of a trajectory.
    #[serde(default)]
    pub curvature: f64,

    /// Target velocity attached to the point by a display layer. Not set by
    /// the path generator.
    #[serde(default)]
    pub velocity: f64,
}

/// One sample of a generated motion profile.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ProfileSample {
    /// Sample time from the profile start in seconds.
    pub time: f64,

    /// Target velocity, clamped to `[0, max_speed]`.
    pub velocity: f64,

    /// Target acceleration.
    pub acceleration: f64,

    /// Target jerk.
    pub jerk: f64,
}

/// A snapshot of the simulated robot state, returned by each simulation
/// step.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RobotState {
    pub x: f64,
    pub y: f64,

    /// Heading in radians, field convention.
    pub theta: f64,

    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,

    /// Distance the robot has travelled along its own track.
    pub distance_traveled: f64,

    /// Simulated time since the run started in seconds.
    pub time: f64,

    /// True once the completion predicate has fired and the run has stopped.
    pub finished: bool,
}

/// Immutable per-run simulation parameters.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Maximum linear velocity in field units per second.
    pub max_vel: f64,

    /// Maximum linear acceleration in field units per second squared.
    pub max_accel: f64,

    /// Maximum angular velocity in radians per second.
    pub max_angular_vel: f64,

    /// Lower bound of the square field on both axes.
    pub field_min: f64,

    /// Upper bound of the square field on both axes.
    pub field_max: f64,

    /// Robot radius, used to shrink the reachable field area.
    pub robot_radius: f64,

    /// Minimum lookahead distance for reference point selection.
    pub min_lookahead: f64,

    /// Velocity gain on the lookahead distance.
    pub lookahead_gain: f64,
}

/// Gains for the tracking controller, immutable for a simulation run.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerGains {
    /// Gain on the forward (longitudinal) error.
    pub kx: f64,

    /// Gain on the lateral error.
    pub ky: f64,

    /// Gain on the heading error.
    pub ktheta: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kind of velocity profile to synthesise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    /// Velocity ramps linearly to a peak, cruises, ramps linearly down.
    #[serde(rename = "trapezoidal")]
    Trapezoidal,

    /// Jerk-limited profile in which acceleration itself ramps, producing
    /// smooth velocity transitions.
    #[serde(rename = "s-curve")]
    SCurve,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            max_vel: 60.0,
            max_accel: 100.0,
            max_angular_vel: 3.0,
            field_min: -72.0,
            field_max: 72.0,
            robot_radius: 8.0,
            min_lookahead: 10.0,
            lookahead_gain: 0.1,
        }
    }
}

impl Default for ControllerGains {
    fn default() -> Self {
        Self {
            kx: 1.5,
            ky: 3.0,
            ktheta: 2.0,
        }
    }
}

impl Default for ProfileType {
    fn default() -> Self {
        ProfileType::Trapezoidal
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_profile_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProfileType::Trapezoidal).unwrap(),
            "\"trapezoidal\""
        );
        assert_eq!(
            serde_json::to_string(&ProfileType::SCurve).unwrap(),
            "\"s-curve\""
        );

        let parsed: ProfileType = serde_json::from_str("\"s-curve\"").unwrap();
        assert_eq!(parsed, ProfileType::SCurve);
    }

    #[test]
    fn test_sim_params_partial_deserialise() {
        // Callers may supply only the parameters they want to override
        let params: SimulationParameters =
            serde_json::from_str("{\"max_vel\": 30.0}").unwrap();

        assert_eq!(params.max_vel, 30.0);
        assert_eq!(params.field_max, 72.0);
        assert_eq!(params.robot_radius, 8.0);
    }
}
