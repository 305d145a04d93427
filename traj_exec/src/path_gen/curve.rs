//! Cubic Bezier curve geometry
//!
//! Pure evaluation of a cubic Bezier curve and its derivative. Control
//! points are `p0` (start anchor), `p1`/`p2` (handles) and `p3` (end
//! anchor).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the curve position at parameter `t` in `[0, 1]`.
pub fn point(
    t: f64,
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    p3: Vector2<f64>,
) -> Vector2<f64> {
    let u = 1.0 - t;

    u.powi(3) * p0 + 3.0 * u.powi(2) * t * p1 + 3.0 * u * t.powi(2) * p2 + t.powi(3) * p3
}

/// Evaluate the analytic curve tangent (first derivative) at parameter `t`.
pub fn tangent(
    t: f64,
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    p3: Vector2<f64>,
) -> Vector2<f64> {
    let u = 1.0 - t;

    3.0 * u.powi(2) * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t.powi(2) * (p3 - p2)
}
