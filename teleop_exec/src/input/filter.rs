//! Exponential smoothing filter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::ops::{Add, Mul};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// First order low-pass filter (exponential moving average).
///
/// The filter holds only its coefficient. The smoothed value is owned by the caller and passed
/// back in on every update, so one filter can be shared by any number of channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    /// Weight of the new raw value, in `[0, 1]`. Lower values smooth more.
    alpha: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LowPassFilter {
    /// Create a new filter, clamping `alpha` into `[0, 1]`.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: util::maths::clamp(alpha, 0.0, 1.0),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Return the next smoothed value, `raw * alpha + prev * (1 - alpha)`.
    pub fn update<V>(&self, raw: &V, prev: &V) -> V
    where
        V: Clone + Mul<f64, Output = V> + Add<Output = V>,
    {
        raw.clone() * self.alpha + prev.clone() * (1.0 - self.alpha)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::{DVector, Vector3};

    #[test]
    fn test_step_response() {
        let filter = LowPassFilter::new(0.1);

        let s = filter.update(&Vector3::new(1.0, 0.0, -2.0), &Vector3::zeros());
        assert!((s - Vector3::new(0.1, 0.0, -0.2)).norm() < 1e-12);

        let s = filter.update(&Vector3::new(1.0, 0.0, -2.0), &s);
        assert!((s - Vector3::new(0.19, 0.0, -0.38)).norm() < 1e-12);
    }

    #[test]
    fn test_decays_under_zero_input() {
        let filter = LowPassFilter::new(0.1);
        let zero = DVector::zeros(4);
        let mut prev = DVector::from_vec(vec![0.0, 0.0, 1.0, -1.0]);

        for _ in 0..20 {
            let next = filter.update(&zero, &prev);

            // Each step is exactly a (1 - alpha) decay, so the norm only ever shrinks
            assert!((next.clone() - prev.clone() * 0.9).norm() < 1e-12);
            assert!(next.norm() < prev.norm());

            prev = next;
        }
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(LowPassFilter::new(1.5).alpha(), 1.0);
        assert_eq!(LowPassFilter::new(-0.5).alpha(), 0.0);
    }
}
