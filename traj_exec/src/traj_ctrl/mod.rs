//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the target
//! trajectory. It uses a linear time-varying (LTV) unicycle feedback law:
//! the world-frame position error to a moving reference pose is rotated
//! into the robot frame, and the commanded linear and angular velocities
//! are the reference feedforward terms plus gain-weighted error terms.
//!
//! The rotation into the robot frame uses the field heading convention
//! (0 = +Y, positive toward +X), so the sin/cos roles are swapped relative
//! to the usual rotation matrix. The controller, the path generator and the
//! kinematic integration must all agree on this convention.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use plan_if::traj::ControllerGains;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Reference speed below which the velocity-scaled error terms are dropped
/// in favour of direct heading feedback. With a near-stationary reference
/// the scaled terms vanish and would leave the heading uncontrolled.
const MIN_TRACKING_SPEED: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A robot pose on the field plane.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct Pose {
    /// Position in field coordinates.
    pub position: Vector2<f64>,

    /// Heading in radians, field convention.
    pub heading_rad: f64,
}

/// A velocity command for a unicycle-model robot.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct UnicycleCmd {
    /// Commanded linear velocity in field units per second.
    pub speed: f64,

    /// Commanded angular velocity in radians per second.
    pub turn_rate_rads: f64,
}

/// The LTV unicycle tracking controller.
///
/// Stateless: every command is a pure function of the current pose, the
/// reference pose and the reference velocities.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct LtvUnicycleController {
    gains: ControllerGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, heading_rad: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading_rad,
        }
    }
}

impl LtvUnicycleController {
    /// Create a new controller with the given gains.
    pub fn new(gains: ControllerGains) -> Self {
        Self { gains }
    }

    /// Get the command tracking the given reference.
    ///
    /// `ref_speed` and `ref_turn_rate` are the feedforward velocities of
    /// the reference point moving along the trajectory.
    pub fn get_cmd(
        &self,
        current: &Pose,
        reference: &Pose,
        ref_speed: f64,
        ref_turn_rate: f64,
    ) -> UnicycleCmd {
        let current_theta = wrap_pi(current.heading_rad);
        let reference_theta = wrap_pi(reference.heading_rad);

        // World-frame position error
        let err = reference.position - current.position;

        // Rotate the error into the robot frame. Forward error is along the
        // heading, lateral error across it; sin/cos are swapped by the
        // field convention.
        let (sin_theta, cos_theta) = current_theta.sin_cos();
        let forward_err = err[0] * sin_theta + err[1] * cos_theta;
        let lateral_err = err[0] * cos_theta - err[1] * sin_theta;

        let heading_err = wrap_pi(reference_theta - current_theta);

        let speed = ref_speed * heading_err.cos() + self.gains.kx * forward_err;

        let turn_rate_rads = if ref_speed.abs() > MIN_TRACKING_SPEED {
            ref_turn_rate
                + ref_speed * (self.gains.ky * lateral_err + self.gains.ktheta * heading_err.sin())
        } else {
            ref_turn_rate + self.gains.ktheta * heading_err
        };

        UnicycleCmd {
            speed,
            turn_rate_rads,
        }
    }
}
