//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap an angle into the range `[-pi, pi)`.
///
/// All headings in the software live in the signed range, so this is the
/// wrap used for heading errors and curvature deltas.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + std::ops::Rem,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign,
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    // Sum all elements of the points
    let mut sum = T::from(0).unwrap();

    for i in 0..point_0.len() {
        sum += (point_0[i] - point_1[i]).powi(2);
    }

    // Return the squareroot of the sum
    Some(sum.sqrt())
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Rem,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(0f64)).abs() < 1e-12);
        assert!((wrap_pi(PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_pi(3.0 * PI) - -PI).abs() < 1e-12);
        assert!((wrap_pi(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_pi(2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5f64, &0f64, &1f64), 1f64);
        assert_eq!(clamp(&-5f64, &0f64, &1f64), 0f64);
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5f64);
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[0f64, 0f64], &[3f64, 4f64]), Some(5f64));
        assert_eq!(norm::<f64>(&[0f64], &[0f64, 1f64]), None);
    }
}
