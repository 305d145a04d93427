//! # Path generation module
//!
//! Converts a chain of user-placed control points into a densely sampled
//! trajectory. Control points are consumed in groups of 4 with a stride of
//! 3 (anchor, handle, handle, anchor), each group forming one cubic Bezier
//! segment. A trailing pair of points with no anchor to complete a group is
//! treated as a straight segment.
//!
//! Headings use the field convention (0 = +Y, positive toward +X), so they
//! are computed as `atan2(tangent.x, tangent.y)` rather than the usual
//! argument order. Curvature is derived after sampling by central finite
//! differences of heading over arc length.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod curve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use plan_if::msg::PathResponse;
use plan_if::traj::{ControlPoint, TrajectoryPoint};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples taken along each Bezier segment.
const BEZIER_NUM_SAMPLES: usize = 120;

/// First Bezier sample parameter. Starting just above zero avoids emitting
/// a duplicate zero-length sample at the segment join.
const BEZIER_T_START: f64 = 0.025;

/// Number of samples taken along each straight segment.
const LINE_NUM_SAMPLES: usize = 20;

/// First straight-segment sample parameter.
const LINE_T_START: f64 = 0.05;

/// Minimum arc-length separation for the curvature finite difference.
/// Below this the denominator is considered degenerate and the curvature is
/// left at zero.
const CURVATURE_MIN_DIST: f64 = 0.01;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a trajectory from an ordered list of control points.
///
/// Fewer than 2 control points is a defined degenerate input and produces
/// an empty trajectory with zero length, not an error.
pub fn generate(control_points: &[ControlPoint]) -> PathResponse {
    if control_points.len() < 2 {
        return PathResponse {
            trajectory: Vec::new(),
            length: 0.0,
        };
    }

    let points: Vec<Vector2<f64>> = control_points
        .iter()
        .map(|cp| Vector2::new(cp.x, cp.y))
        .collect();

    let mut trajectory: Vec<TrajectoryPoint> = Vec::new();
    let mut cumulative_distance = 0.0;

    // Walk the chain in strides of 3, one Bezier group at a time
    let mut i = 0;
    while i + 1 < points.len() {
        if i + 3 < points.len() {
            sample_bezier_segment(
                points[i],
                points[i + 1],
                points[i + 2],
                points[i + 3],
                &mut trajectory,
                &mut cumulative_distance,
            );
        } else {
            // Not enough points left for a full group: straight segment to
            // the next point
            sample_line_segment(
                points[i],
                points[i + 1],
                &mut trajectory,
                &mut cumulative_distance,
            );
        }

        i += 3;
    }

    apply_curvature(&mut trajectory);

    PathResponse {
        trajectory,
        length: cumulative_distance,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample one cubic Bezier segment, appending to the trajectory.
fn sample_bezier_segment(
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    p3: Vector2<f64>,
    trajectory: &mut Vec<TrajectoryPoint>,
    cumulative_distance: &mut f64,
) {
    let mut prev_pt = p0;

    for k in 0..BEZIER_NUM_SAMPLES {
        let t = BEZIER_T_START
            + (1.0 - BEZIER_T_START) * (k as f64) / ((BEZIER_NUM_SAMPLES - 1) as f64);

        let pt = curve::point(t, p0, p1, p2, p3);
        let tangent = curve::tangent(t, p0, p1, p2, p3);

        // Field convention heading
        let theta = tangent[0].atan2(tangent[1]);

        *cumulative_distance += (pt - prev_pt).norm();

        trajectory.push(TrajectoryPoint {
            x: pt[0],
            y: pt[1],
            theta,
            distance: *cumulative_distance,
            curvature: 0.0,
            velocity: 0.0,
        });

        prev_pt = pt;
    }
}

/// Sample one straight segment, appending to the trajectory.
fn sample_line_segment(
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    trajectory: &mut Vec<TrajectoryPoint>,
    cumulative_distance: &mut f64,
) {
    let direction = p1 - p0;

    let theta = if direction.norm() > 0.0 {
        direction[0].atan2(direction[1])
    } else {
        0.0
    };

    let mut prev_pt = p0;

    for k in 0..LINE_NUM_SAMPLES {
        let t = LINE_T_START + (1.0 - LINE_T_START) * (k as f64) / ((LINE_NUM_SAMPLES - 1) as f64);

        let pt = p0 + direction * t;

        *cumulative_distance += (pt - prev_pt).norm();

        trajectory.push(TrajectoryPoint {
            x: pt[0],
            y: pt[1],
            theta,
            distance: *cumulative_distance,
            curvature: 0.0,
            velocity: 0.0,
        });

        prev_pt = pt;
    }
}

/// Fill in curvature at interior points by central finite difference of
/// heading over arc length. The first and last points keep zero curvature.
fn apply_curvature(trajectory: &mut [TrajectoryPoint]) {
    if trajectory.len() < 3 {
        return;
    }

    for i in 1..trajectory.len() - 1 {
        let delta_angle = wrap_pi(trajectory[i + 1].theta - trajectory[i - 1].theta);
        let delta_dist = trajectory[i + 1].distance - trajectory[i - 1].distance;

        if delta_dist > CURVATURE_MIN_DIST {
            trajectory[i].curvature = delta_angle / delta_dist;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_degenerate_input() {
        let result = generate(&[]);
        assert!(result.trajectory.is_empty());
        assert_eq!(result.length, 0.0);

        let result = generate(&[ControlPoint { x: 1.0, y: 1.0 }]);
        assert!(result.trajectory.is_empty());
        assert_eq!(result.length, 0.0);
    }

    #[test]
    fn test_single_bezier_group() {
        // One full group of 4 control points
        let cps = [
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.0, y: 20.0 },
            ControlPoint { x: 20.0, y: 40.0 },
            ControlPoint { x: 20.0, y: 60.0 },
        ];

        let result = generate(&cps);

        assert_eq!(result.trajectory.len(), BEZIER_NUM_SAMPLES);

        // Accumulated length equals the last point's distance
        let last = result.trajectory.last().unwrap();
        assert!((last.distance - result.length).abs() < 1e-9);
        assert!(result.length > 0.0);

        // Distances are monotonically non-decreasing
        for pair in result.trajectory.windows(2) {
            assert!(pair[1].distance >= pair[0].distance);
        }

        // First heading matches the tangent at the first sample parameter,
        // in the field convention
        let p: Vec<_> = cps.iter().map(|cp| Vector2::new(cp.x, cp.y)).collect();
        let tangent = curve::tangent(BEZIER_T_START, p[0], p[1], p[2], p[3]);
        let expected_theta = tangent[0].atan2(tangent[1]);
        assert!((result.trajectory[0].theta - expected_theta).abs() < 1e-12);
    }

    #[test]
    fn test_trailing_pair_is_straight_segment() {
        // Two points only: a single straight segment
        let cps = [
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.0, y: 50.0 },
        ];

        let result = generate(&cps);

        assert_eq!(result.trajectory.len(), LINE_NUM_SAMPLES);
        assert!((result.length - 50.0).abs() < 1e-9);

        // Straight up the +Y axis is heading zero in the field convention
        for pt in &result.trajectory {
            assert!(pt.theta.abs() < 1e-12);
            assert!(pt.curvature.abs() < 1e-12);
        }
    }

    #[test]
    fn test_curvature_sign() {
        // A quarter turn from +Y toward +X: heading increases along the
        // path, so interior curvature must be positive
        let cps = [
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.0, y: 25.0 },
            ControlPoint { x: 25.0, y: 50.0 },
            ControlPoint { x: 50.0, y: 50.0 },
        ];

        let result = generate(&cps);

        for pt in &result.trajectory[1..result.trajectory.len() - 1] {
            assert!(
                pt.curvature > 0.0,
                "expected positive curvature, got {} at ({}, {})",
                pt.curvature,
                pt.x,
                pt.y
            );
        }

        // The mirrored path turns the other way
        let mirrored: Vec<ControlPoint> = cps
            .iter()
            .map(|cp| ControlPoint { x: -cp.x, y: cp.y })
            .collect();

        let result = generate(&mirrored);

        for pt in &result.trajectory[1..result.trajectory.len() - 1] {
            assert!(pt.curvature < 0.0);
        }
    }

    #[test]
    fn test_group_plus_trailing_pair() {
        // 4 + 2 points: one Bezier group then a straight tail
        let cps = [
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.0, y: 20.0 },
            ControlPoint { x: 20.0, y: 40.0 },
            ControlPoint { x: 20.0, y: 60.0 },
            ControlPoint { x: 20.0, y: 80.0 },
        ];

        let result = generate(&cps);

        assert_eq!(
            result.trajectory.len(),
            BEZIER_NUM_SAMPLES + LINE_NUM_SAMPLES
        );

        // The straight tail continues up +Y from the group's end anchor
        let tail = &result.trajectory[BEZIER_NUM_SAMPLES..];
        for pt in tail {
            assert!(pt.theta.abs() < 1e-12);
        }
    }
}
