//! Filters: a lightweight one-pole low-pass.
//!
//! `OnePoleLP` uses the inexpensive `y += a * (x - y)` form with a raw
//! smoothing factor, so its response does not track the sample rate.

use crate::dsp::kill_denormals;

/// One-pole low-pass `y += a * (x - y)`.
#[derive(Copy, Clone, Debug)]
pub struct OnePoleLP {
    a: f32,
    y: f32,
}

impl OnePoleLP {
    /// Create a low-pass with a raw smoothing coefficient in (0, 1].
    #[inline]
    pub fn with_coeff(a: f32) -> Self {
        debug_assert!(a > 0.0 && a <= 1.0, "one-pole coefficient out of range: {a}");
        Self { a, y: 0.0 }
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.y += self.a * (x - self.y);
        self.y = kill_denormals(self.y);
        self.y
    }

    #[inline] pub fn value(&self) -> f32 { self.y }

    #[inline] pub fn reset(&mut self) { self.y = 0.0; }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pole_lp_moves_towards_input() {
        let mut lp = OnePoleLP::with_coeff(0.01);
        let mut y = 0.0;
        for _ in 0..2_000 {
            y = lp.process(1.0);
        }
        assert!(y > 0.9, "y={}", y);
    }

    #[test]
    fn raw_coefficient_follows_recurrence() {
        let mut lp = OnePoleLP::with_coeff(0.01);
        assert!((lp.process(1.0) - 0.01).abs() < 1e-7);
        // 0.01 + 0.01 * (1 - 0.01)
        assert!((lp.process(1.0) - 0.0199).abs() < 1e-7);
        lp.reset();
        assert_eq!(lp.value(), 0.0);
    }

    #[test]
    fn state_stays_within_input_range() {
        let mut lp = OnePoleLP::with_coeff(0.01);
        for i in 0..10_000 {
            let x = if i % 3 == 0 { 1.0 } else { -1.0 };
            let y = lp.process(x);
            assert!((-1.0..=1.0).contains(&y));
        }
    }
}
