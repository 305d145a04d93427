//! Trapezoidal profile solving and sampling
//!
//! The profile is parameterised by target distance, not target time. When
//! the distance needed to accelerate to the commanded speed and decelerate
//! back exceeds the target, the profile degrades to a triangle whose peak
//! is solved analytically from `d = v^2/2a + v^2/2b`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use plan_if::traj::ProfileSample;

use super::MotionProfile;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack on the final-sample time comparison, so that floating point noise
/// on `total_time` doesn't drop the last sample out of the decel phase.
const PHASE_END_SLACK_S: f64 = 0.001;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve a trapezoidal profile over the target distance.
///
/// Limits must be validated by the caller; the distance must be positive.
pub(super) fn solve(distance: f64, v_max: f64, accel: f64, decel: f64) -> MotionProfile {
    // Distance needed to reach v_max and to stop from it
    let d_accel_limit = v_max.powi(2) / (2.0 * accel);
    let d_decel_limit = v_max.powi(2) / (2.0 * decel);

    let (v_peak, t_accel, t_cruise, t_decel);

    if d_accel_limit + d_decel_limit > distance {
        // Triangle profile (short move): solve d = v^2/2a + v^2/2b for v
        v_peak = (distance * 2.0 * accel * decel / (accel + decel)).sqrt();
        t_accel = v_peak / accel;
        t_decel = v_peak / decel;
        t_cruise = 0.0;
    } else {
        // Full trapezoid, cruise fills the remaining distance
        v_peak = v_max;
        t_accel = v_max / accel;
        t_decel = v_max / decel;

        let d_cruise = distance - d_accel_limit - d_decel_limit;
        t_cruise = d_cruise / v_peak;
    }

    MotionProfile {
        v_peak,
        t_jerk: 0.0,
        t_accel,
        t_cruise,
        t_decel,
        total_time: t_accel + t_cruise + t_decel,
    }
}

/// Sample a solved trapezoidal profile into uniform time steps.
pub(super) fn sample(
    profile: &MotionProfile,
    accel: f64,
    decel: f64,
    num_samples: usize,
) -> Vec<ProfileSample> {
    let mut samples = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let t = if num_samples > 1 {
            profile.total_time / ((num_samples - 1) as f64) * (i as f64)
        } else {
            0.0
        };

        let (velocity, acceleration, jerk);

        if t < profile.t_accel {
            // Ramp up
            let v = if profile.t_accel > 0.0 { accel * t } else { 0.0 };
            velocity = v.min(profile.v_peak);
            acceleration = accel;
            jerk = 0.0;
        } else if t < profile.t_accel + profile.t_cruise {
            // Cruise
            velocity = profile.v_peak;
            acceleration = 0.0;
            jerk = 0.0;
        } else if t <= profile.total_time + PHASE_END_SLACK_S {
            // Ramp down
            let t_decel_elapsed = t - profile.t_accel - profile.t_cruise;
            velocity = profile.v_peak - decel * t_decel_elapsed;
            acceleration = -decel;
            jerk = 0.0;
        } else {
            velocity = 0.0;
            acceleration = 0.0;
            jerk = 0.0;
        }

        samples.push(ProfileSample {
            time: t,
            velocity: velocity.max(0.0),
            acceleration,
            jerk,
        });
    }

    samples
}
