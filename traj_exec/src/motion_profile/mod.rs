//! # Motion profile module
//!
//! Synthesises a 1-D velocity-vs-time profile whose integral equals a
//! target arc length exactly, then samples it into a fixed-count time
//! series. Two profile kinds are supported:
//!
//! - Trapezoidal: velocity ramps linearly to a peak, cruises, ramps down.
//!   Short moves that cannot reach the commanded cruise speed degrade to a
//!   triangular profile with an analytically solved peak.
//! - S-curve: jerk-limited, so acceleration itself ramps. Short moves are
//!   solved by bisection over candidate peak velocities.
//!
//! The module also provides the distance-to-velocity lookup used by the
//! simulator. The lookup integrates the sampled series with left-endpoint
//! rectangles; this approximation is deliberate and the simulator's
//! completion thresholds are tuned against it, so it must not be replaced
//! with exact arc-length inversion.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod s_curve;
mod trapezoid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use plan_if::traj::{ProfileSample, ProfileType};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of samples in a generated profile.
pub const DEFAULT_NUM_SAMPLES: usize = 200;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scalar description of one solved velocity program.
///
/// Invariant: `t_accel + t_cruise + t_decel == total_time` and
/// `0 <= v_peak <= max_speed`. For S-curve profiles `t_jerk <= t_accel / 2`;
/// for trapezoidal profiles `t_jerk` is zero.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct MotionProfile {
    /// Peak velocity reached by the profile.
    pub v_peak: f64,

    /// Duration of one jerk-limited ramp within the acceleration phase.
    pub t_jerk: f64,

    /// Duration of the acceleration phase.
    pub t_accel: f64,

    /// Duration of the constant-velocity cruise phase.
    pub t_cruise: f64,

    /// Duration of the deceleration phase.
    pub t_decel: f64,

    /// Total profile duration.
    pub total_time: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by profile synthesis.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// A kinematic limit which must be strictly positive was not. Rejected
    /// at entry so that non-finite values cannot propagate through the
    /// solver.
    #[error("Kinematic limit {0} must be strictly positive, got {1}")]
    NonPositiveLimit(&'static str, f64),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve a profile of the given kind over a target distance and sample it
/// into `num_samples` uniform time steps spanning `[0, total_time]`.
///
/// A non-positive target distance is a defined degenerate input and yields
/// an all-zero profile. Non-positive kinematic limits are caller
/// misconfiguration and are rejected.
pub fn generate(
    profile_type: ProfileType,
    target_distance: f64,
    max_speed: f64,
    max_accel: f64,
    max_decel: f64,
    max_jerk: f64,
    num_samples: usize,
) -> Result<Vec<ProfileSample>, ProfileError> {
    if max_accel <= 0.0 {
        return Err(ProfileError::NonPositiveLimit("max_accel", max_accel));
    }
    if max_decel <= 0.0 {
        return Err(ProfileError::NonPositiveLimit("max_decel", max_decel));
    }
    if profile_type == ProfileType::SCurve && max_jerk <= 0.0 {
        return Err(ProfileError::NonPositiveLimit("max_jerk", max_jerk));
    }

    // Profiles over a degenerate distance are all-zero by definition
    if target_distance <= 0.0 {
        return Ok(vec![
            ProfileSample {
                time: 0.0,
                velocity: 0.0,
                acceleration: 0.0,
                jerk: 0.0,
            };
            num_samples
        ]);
    }

    let samples = match profile_type {
        ProfileType::Trapezoidal => {
            let profile = trapezoid::solve(target_distance, max_speed, max_accel, max_decel);
            trapezoid::sample(&profile, max_accel, max_decel, num_samples)
        }
        ProfileType::SCurve => {
            let profile = s_curve::solve(target_distance, max_speed, max_accel, max_decel, max_jerk);
            s_curve::sample(&profile, max_speed, max_jerk, num_samples)
        }
    };

    Ok(samples)
}

/// Solve a profile of the given kind without sampling it.
pub fn solve(
    profile_type: ProfileType,
    target_distance: f64,
    max_speed: f64,
    max_accel: f64,
    max_decel: f64,
    max_jerk: f64,
) -> Result<MotionProfile, ProfileError> {
    if max_accel <= 0.0 {
        return Err(ProfileError::NonPositiveLimit("max_accel", max_accel));
    }
    if max_decel <= 0.0 {
        return Err(ProfileError::NonPositiveLimit("max_decel", max_decel));
    }

    if target_distance <= 0.0 {
        return Ok(MotionProfile::default());
    }

    match profile_type {
        ProfileType::Trapezoidal => {
            Ok(trapezoid::solve(target_distance, max_speed, max_accel, max_decel))
        }
        ProfileType::SCurve => {
            if max_jerk <= 0.0 {
                return Err(ProfileError::NonPositiveLimit("max_jerk", max_jerk));
            }
            Ok(s_curve::solve(target_distance, max_speed, max_accel, max_decel, max_jerk))
        }
    }
}

/// Map a travelled distance to the instantaneous target velocity.
///
/// Walks the sampled profile in time order accumulating `v * dt` rectangles
/// until the running sum reaches the query distance, then returns that
/// sample's velocity. Returns 0 for an empty profile, a degenerate path
/// length, or a query beyond the profile's total accumulated distance.
pub fn velocity_at_distance(
    distance: f64,
    path_length: f64,
    profile: &[ProfileSample],
) -> f64 {
    if profile.is_empty() || path_length <= 0.0 {
        return 0.0;
    }

    let dt = if profile.len() > 1 {
        profile[1].time - profile[0].time
    } else {
        0.0
    };

    let mut current_dist = 0.0;

    for sample in profile {
        current_dist += sample.velocity * dt;
        if current_dist >= distance {
            return sample.velocity;
        }
    }

    0.0
}

#[cfg(test)]
mod test {
    use super::*;

    /// Trapezoid-rule integral of a sampled velocity series.
    fn integrate_distance(samples: &[ProfileSample]) -> f64 {
        samples
            .windows(2)
            .map(|w| 0.5 * (w[0].velocity + w[1].velocity) * (w[1].time - w[0].time))
            .sum()
    }

    #[test]
    fn test_trapezoidal_distance_integrity() {
        // Short (triangular) through long (full-cruise) regimes
        for &distance in &[5.0, 10.0, 36.0, 50.0, 200.0, 1000.0] {
            let samples = generate(
                ProfileType::Trapezoidal,
                distance,
                60.0,
                100.0,
                100.0,
                500.0,
                DEFAULT_NUM_SAMPLES,
            )
            .unwrap();

            let integrated = integrate_distance(&samples);
            assert!(
                (integrated - distance).abs() / distance < 0.01,
                "distance {} integrated as {}",
                distance,
                integrated
            );

            // Profiles always start from rest
            assert_eq!(samples[0].velocity, 0.0);
        }
    }

    #[test]
    fn test_s_curve_distance_integrity() {
        for &distance in &[5.0, 10.0, 48.0, 100.0, 500.0] {
            let samples = generate(
                ProfileType::SCurve,
                distance,
                60.0,
                100.0,
                100.0,
                500.0,
                DEFAULT_NUM_SAMPLES,
            )
            .unwrap();

            let integrated = integrate_distance(&samples);
            assert!(
                (integrated - distance).abs() / distance < 0.01,
                "distance {} integrated as {}",
                distance,
                integrated
            );

            assert_eq!(samples[0].velocity, 0.0);
        }
    }

    #[test]
    fn test_peak_velocity_bound() {
        for &distance in &[0.1, 1.0, 10.0, 100.0, 10_000.0] {
            for &profile_type in &[ProfileType::Trapezoidal, ProfileType::SCurve] {
                let profile =
                    solve(profile_type, distance, 60.0, 100.0, 80.0, 500.0).unwrap();

                assert!(profile.v_peak >= 0.0);
                assert!(profile.v_peak <= 60.0);

                // Phase times must sum to the total
                let t_sum = profile.t_accel + profile.t_cruise + profile.t_decel;
                assert!((t_sum - profile.total_time).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_velocity_clamped_to_limits() {
        for &profile_type in &[ProfileType::Trapezoidal, ProfileType::SCurve] {
            let samples = generate(
                profile_type,
                200.0,
                60.0,
                100.0,
                100.0,
                500.0,
                DEFAULT_NUM_SAMPLES,
            )
            .unwrap();

            for sample in &samples {
                assert!(sample.velocity >= 0.0);
                assert!(sample.velocity <= 60.0);
            }
        }
    }

    #[test]
    fn test_zero_distance_profile() {
        let samples = generate(
            ProfileType::Trapezoidal,
            0.0,
            60.0,
            100.0,
            100.0,
            500.0,
            DEFAULT_NUM_SAMPLES,
        )
        .unwrap();

        assert_eq!(samples.len(), DEFAULT_NUM_SAMPLES);
        for sample in &samples {
            assert_eq!(sample.time, 0.0);
            assert_eq!(sample.velocity, 0.0);
            assert_eq!(sample.acceleration, 0.0);
            assert_eq!(sample.jerk, 0.0);
        }

        let profile = solve(ProfileType::SCurve, -5.0, 60.0, 100.0, 100.0, 500.0).unwrap();
        assert_eq!(profile.v_peak, 0.0);
        assert_eq!(profile.total_time, 0.0);
    }

    #[test]
    fn test_non_positive_limits_rejected() {
        assert!(generate(
            ProfileType::Trapezoidal,
            10.0,
            60.0,
            0.0,
            100.0,
            500.0,
            DEFAULT_NUM_SAMPLES
        )
        .is_err());

        assert!(generate(
            ProfileType::Trapezoidal,
            10.0,
            60.0,
            100.0,
            -1.0,
            500.0,
            DEFAULT_NUM_SAMPLES
        )
        .is_err());

        assert!(generate(
            ProfileType::SCurve,
            10.0,
            60.0,
            100.0,
            100.0,
            0.0,
            DEFAULT_NUM_SAMPLES
        )
        .is_err());
    }

    #[test]
    fn test_velocity_lookup_sentinels() {
        // Empty profile
        assert_eq!(velocity_at_distance(5.0, 50.0, &[]), 0.0);

        let samples = generate(
            ProfileType::Trapezoidal,
            50.0,
            60.0,
            100.0,
            100.0,
            500.0,
            DEFAULT_NUM_SAMPLES,
        )
        .unwrap();

        // Degenerate path length
        assert_eq!(velocity_at_distance(5.0, 0.0, &samples), 0.0);

        // Query beyond the profile's accumulated distance
        assert_eq!(velocity_at_distance(1e6, 50.0, &samples), 0.0);

        // A mid-path query returns a positive velocity
        assert!(velocity_at_distance(25.0, 50.0, &samples) > 0.0);
    }
}
