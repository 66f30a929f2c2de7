//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Wrap an angle into the range `[-pi, pi)`.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.6, -0.5, 0.5), 0.5);
        assert_eq!(clamp(-0.6, -0.5, 0.5), -0.5);
        assert_eq!(clamp(0.1, -0.5, 0.5), 0.1);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((-1.0, 1.0), (0.0, 1.0), 0.0), 0.5);
        assert_eq!(lin_map((-1.0, 1.0), (0.0, 1.0), -1.0), 0.0);
    }

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(0.5) - 0.5f64).abs() < 1e-12);
        assert!((wrap_pi(2.0 * PI + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_pi(-2.0 * PI - 0.5) + 0.5).abs() < 1e-12);
        assert!((wrap_pi(PI + 0.1) - (-PI + 0.1)).abs() < 1e-12);
    }
}
