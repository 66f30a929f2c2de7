//! Differential drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::LocoCtrl;
use teleop_if::eqpt::wheels::{LEFT_WHEEL, RIGHT_WHEEL};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Mix the turn demand `x` and speed demand `y`, both in `[-1, 1]`, into wheel rates.
    ///
    /// At speed the inside wheel is slowed, giving an arc. Below the turn limit the demand blends
    /// towards turning on the spot, so a pure `x` demand spins the robot.
    ///
    /// Returns the wheel rates, positive forwards for both wheels, and the turn blend used.
    pub(crate) fn calc_diff_drive(&self, x: f64, y: f64) -> ([f64; 2], f64) {
        let (left, right) = match (y >= 0.0, x <= 0.0) {
            (true, true) => (1.0, 1.0 - x),
            (true, false) => (1.0 + x, 1.0),
            (false, true) => (1.0 - x, 1.0),
            (false, false) => (1.0, 1.0 + x),
        };

        let (left, right) = (left * y, right * y);

        let turn_scale = if y.abs() > self.params.turn_limit {
            0.0
        } else {
            1.0 - (y / self.params.turn_limit).abs()
        };

        let mut rates = [0.0; 2];
        rates[LEFT_WHEEL] = ((1.0 - turn_scale) * left + turn_scale * x) * self.params.speed_scale;
        rates[RIGHT_WHEEL] = ((1.0 - turn_scale) * right - turn_scale * x) * self.params.speed_scale;

        (rates, turn_scale)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-12 && (a[1] - b[1]).abs() < 1e-12
    }

    #[test]
    fn test_straight() {
        let lc = LocoCtrl::default();

        let (rates, turn_scale) = lc.calc_diff_drive(0.0, 1.0);
        assert!(approx(rates, [5.0, 5.0]));
        assert_eq!(turn_scale, 0.0);

        let (rates, _) = lc.calc_diff_drive(0.0, -1.0);
        assert!(approx(rates, [-5.0, -5.0]));
    }

    #[test]
    fn test_spin_on_the_spot() {
        let lc = LocoCtrl::default();

        let (rates, turn_scale) = lc.calc_diff_drive(1.0, 0.0);
        assert_eq!(turn_scale, 1.0);
        assert!(approx(rates, [5.0, -5.0]));
    }

    #[test]
    fn test_arc_at_speed() {
        let lc = LocoCtrl::default();

        // Above the turn limit only the arc mixing applies
        let (rates, _) = lc.calc_diff_drive(-0.5, 0.8);
        assert!(approx(rates, [0.8 * 5.0, 1.5 * 0.8 * 5.0]));

        let (rates, _) = lc.calc_diff_drive(0.5, -0.8);
        assert!(approx(rates, [-0.8 * 5.0, -1.5 * 0.8 * 5.0]));
    }

    #[test]
    fn test_blend_below_turn_limit() {
        let lc = LocoCtrl::default();

        let (rates, turn_scale) = lc.calc_diff_drive(0.2, 0.25);
        assert!((turn_scale - 0.5).abs() < 1e-12);

        let left = (0.5 * 1.2 * 0.25 + 0.5 * 0.2) * 5.0;
        let right = (0.5 * 0.25 - 0.5 * 0.2) * 5.0;
        assert!(approx(rates, [left, right]));
    }
}
