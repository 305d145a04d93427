//! S-curve (jerk-limited) profile solving and sampling
//!
//! The acceleration and deceleration phases are forced symmetric by taking
//! the stricter of the two acceleration limits, which makes the minimum
//! round-trip distance for a candidate peak velocity a closed form: by
//! symmetry of the acceleration waveform the average velocity over the
//! accel phase is half the peak, so `d_accel = v * t_accel / 2` whether or
//! not the waveform saturates at the acceleration limit.
//!
//! Long moves cruise at the commanded speed. Short moves bisect over
//! candidate peak velocities; the round-trip distance is monotonic in the
//! peak, so 20 iterations pin the peak to about 1e-6 of the speed range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use plan_if::traj::ProfileSample;

use super::MotionProfile;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of bisection iterations used for short moves.
const BISECTION_ITERS: usize = 20;

/// Slack on the final-sample time comparison (see the trapezoid sampler).
const PHASE_END_SLACK_S: f64 = 0.001;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve an S-curve profile over the target distance.
///
/// Limits must be validated by the caller; the distance must be positive.
pub(super) fn solve(
    distance: f64,
    v_max: f64,
    max_accel: f64,
    max_decel: f64,
    max_jerk: f64,
) -> MotionProfile {
    // Stricter limit keeps accel and decel phases symmetric
    let limit_a = max_accel.abs().min(max_decel.abs());

    // Can we reach v_max within the target distance?
    let (min_dist_vmax, t_jerk_vmax, t_accel_vmax) = min_round_trip(v_max, limit_a, max_jerk);

    let (v_peak, t_jerk, t_accel, t_cruise, t_decel);

    if min_dist_vmax <= distance {
        // Long move: cruise at v_max for the remaining distance
        v_peak = v_max;
        t_jerk = t_jerk_vmax;
        t_accel = t_accel_vmax;
        t_decel = t_accel_vmax;

        let dist_cruise = distance - min_dist_vmax;
        t_cruise = if v_peak > 0.0 { dist_cruise / v_peak } else { 0.0 };
    } else {
        // Short move: bisect for the peak whose round trip consumes the
        // whole distance
        let mut low = 0.0;
        let mut high = v_max;

        for _ in 0..BISECTION_ITERS {
            let mid = (low + high) / 2.0;
            let (d, _, _) = min_round_trip(mid, limit_a, max_jerk);

            if d > distance {
                high = mid;
            } else {
                low = mid;
            }
        }

        v_peak = low;

        let (_, t_j, t_a) = min_round_trip(v_peak, limit_a, max_jerk);
        t_jerk = t_j;
        t_accel = t_a;
        t_decel = t_a;
        t_cruise = 0.0;
    }

    MotionProfile {
        v_peak,
        t_jerk,
        t_accel,
        t_cruise,
        t_decel,
        total_time: t_accel + t_cruise + t_decel,
    }
}

/// Sample a solved S-curve profile into uniform time steps.
///
/// Each of the canonical phases has a closed-form velocity as the integral
/// of the acceleration waveform. Deceleration-phase velocity is computed by
/// mirroring the accel-phase formulas on elapsed decel time and subtracting
/// the "velocity lost" from the peak.
pub(super) fn sample(
    profile: &MotionProfile,
    max_speed: f64,
    max_jerk: f64,
    num_samples: usize,
) -> Vec<ProfileSample> {
    let t_j = profile.t_jerk;
    let t_a = profile.t_accel;
    let t_c = profile.t_cruise;
    let t_d = profile.t_decel;
    let v_peak = profile.v_peak;

    // Peak acceleration actually reached. In the saturated (trapezoidal
    // acceleration) case t_jerk is limit_a / jerk, so this is limit_a; in
    // the triangular case the waveform peaks at the top of the jerk ramp.
    let a_peak = t_j * max_jerk;

    let mut samples = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let t = if num_samples > 1 {
            profile.total_time / ((num_samples - 1) as f64) * (i as f64)
        } else {
            0.0
        };

        let mut velocity = 0.0;
        let mut acceleration = 0.0;
        let mut jerk = 0.0;

        if t < t_a {
            // Acceleration phase
            if t < t_j {
                // Jerk ramp up
                jerk = max_jerk;
                acceleration = max_jerk * t;
                velocity = 0.5 * max_jerk * t.powi(2);
            } else if t < t_a - t_j {
                // Constant acceleration
                let dt = t - t_j;
                acceleration = a_peak;
                velocity = 0.5 * max_jerk * t_j.powi(2) + a_peak * dt;
            } else {
                // Jerk ramp down
                let dt = t - (t_a - t_j);
                jerk = -max_jerk;
                acceleration = a_peak - max_jerk * dt;

                let v_start = 0.5 * max_jerk * t_j.powi(2) + a_peak * (t_a - 2.0 * t_j);
                velocity = v_start + a_peak * dt - 0.5 * max_jerk * dt.powi(2);
            }
        } else if t < t_a + t_c {
            // Cruise phase
            velocity = v_peak;
        } else if t <= profile.total_time + PHASE_END_SLACK_S {
            // Deceleration phase: mirror the accel formulas on elapsed
            // decel time and subtract the velocity lost from the peak
            let t_curr = t - t_a - t_c;

            let v_loss;
            if t_curr < t_j {
                jerk = -max_jerk;
                acceleration = -max_jerk * t_curr;
                v_loss = 0.5 * max_jerk * t_curr.powi(2);
            } else if t_curr < t_d - t_j {
                let dt = t_curr - t_j;
                acceleration = -a_peak;
                v_loss = 0.5 * max_jerk * t_j.powi(2) + a_peak * dt;
            } else {
                let dt = t_curr - (t_d - t_j);
                jerk = max_jerk;
                acceleration = -a_peak + max_jerk * dt;

                let v_start_loss = 0.5 * max_jerk * t_j.powi(2) + a_peak * (t_d - 2.0 * t_j);
                v_loss = v_start_loss + a_peak * dt - 0.5 * max_jerk * dt.powi(2);
            }

            velocity = v_peak - v_loss;
        }

        samples.push(ProfileSample {
            time: t,
            velocity: velocity.max(0.0).min(max_speed),
            acceleration,
            jerk,
        });
    }

    samples
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Minimum round-trip distance (accelerate from rest to `v` then decelerate
/// back to rest) under the jerk limit, with the jerk ramp time and total
/// accel phase time.
///
/// Below `limit_a^2 / jerk` the acceleration waveform never saturates and
/// is triangular; above it the waveform is trapezoidal with a constant
/// segment at `limit_a`. Either way the accel-phase distance is
/// `v * t_accel / 2` by symmetry.
fn min_round_trip(v_target: f64, limit_a: f64, max_jerk: f64) -> (f64, f64, f64) {
    let v_at_max_accel = limit_a.powi(2) / max_jerk;

    let (t_jerk, t_accel_total);

    if v_target < v_at_max_accel {
        // Jerk limited: the acceleration limit is never reached
        t_jerk = (v_target / max_jerk).sqrt();
        t_accel_total = 2.0 * t_jerk;
    } else {
        // Accel limited: saturate at limit_a between the two jerk ramps
        t_jerk = limit_a / max_jerk;

        let t_ramp = v_target / limit_a - t_jerk;
        t_accel_total = 2.0 * t_jerk + t_ramp;
    }

    let d_accel = v_target * t_accel_total / 2.0;

    (2.0 * d_accel, t_jerk, t_accel_total)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_long_move_cruises() {
        // limit 100, jerk 500: t_jerk = 0.2, t_accel = 0.8, round trip 48
        let profile = solve(200.0, 60.0, 100.0, 100.0, 500.0);

        assert_eq!(profile.v_peak, 60.0);
        assert!((profile.t_jerk - 0.2).abs() < 1e-9);
        assert!((profile.t_accel - 0.8).abs() < 1e-9);
        assert_eq!(profile.t_accel, profile.t_decel);

        let expected_cruise = (200.0 - 48.0) / 60.0;
        assert!((profile.t_cruise - expected_cruise).abs() < 1e-9);
    }

    #[test]
    fn test_short_move_bisection_converges() {
        let distance = 10.0;
        let profile = solve(distance, 60.0, 100.0, 100.0, 500.0);

        assert!(profile.v_peak < 60.0);
        assert_eq!(profile.t_cruise, 0.0);

        // The round trip at the found peak must reproduce the target
        // distance to bisection precision
        let (d, _, _) = min_round_trip(profile.v_peak, 100.0, 500.0);
        assert!((d - distance).abs() < 60.0 / (1u64 << 20) as f64 * 10.0);

        // Analytic check: accel-limited branch gives
        // v^2/a + 0.2 v = d  =>  v = (-20 + sqrt(400 + 4000)) / 2
        let expected = (-20.0 + 4400.0f64.sqrt()) / 2.0;
        assert!((profile.v_peak - expected).abs() < 1e-3);
    }

    #[test]
    fn test_jerk_limited_shape() {
        // Tiny move: the acceleration limit is never reached, so the accel
        // phase is exactly two jerk ramps
        let profile = solve(0.5, 60.0, 100.0, 100.0, 500.0);

        assert!((profile.t_accel - 2.0 * profile.t_jerk).abs() < 1e-9);
        assert!(profile.t_jerk <= profile.t_accel / 2.0 + 1e-12);
    }

    #[test]
    fn test_stricter_limit_used() {
        // Asymmetric limits: decel 50 governs both phases
        let strict = solve(100.0, 60.0, 100.0, 50.0, 500.0);
        let symmetric = solve(100.0, 60.0, 50.0, 50.0, 500.0);

        assert!((strict.t_accel - symmetric.t_accel).abs() < 1e-12);
        assert!((strict.total_time - symmetric.total_time).abs() < 1e-12);
    }

    #[test]
    fn test_sample_continuity() {
        // Velocity must be continuous across phase boundaries to sampling
        // resolution
        let profile = solve(200.0, 60.0, 100.0, 100.0, 500.0);
        let samples = sample(&profile, 60.0, 500.0, 400);

        for w in samples.windows(2) {
            let dv = (w[1].velocity - w[0].velocity).abs();
            let dt = w[1].time - w[0].time;

            // Max slope is the acceleration limit; allow some slack for the
            // discrete boundary crossing
            assert!(
                dv <= 100.0 * dt + 0.5,
                "velocity jump {} over dt {} at t {}",
                dv,
                dt,
                w[0].time
            );
        }

        // Ends at rest
        assert!(samples.last().unwrap().velocity.abs() < 1e-6);
    }
}
