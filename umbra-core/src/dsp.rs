//! Scalar math shared by the drone nodes.
//!
//! Phases are measured in turns (`[0, 1)`), not radians. The sine backend is
//! picked at compile time: `std`, `libm` (feature `no-std`) or `micromath`,
//! and `fast-math` swaps in a polynomial for the oscillator hot path.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
    }
}

// --------------------------------- Constants -------------------------------------

pub const TAU: f32 = 2.0 * PI;

/// A very small epsilon used in denormal handling.
pub const EPS_SMALL: f32 = 1.0e-20;

/// Level above which the limiter starts compressing.
pub const KNEE: f32 = 0.8;

/// Gain applied to the part of the signal above [`KNEE`].
pub const KNEE_SLOPE: f32 = 0.2;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

/// Wrap phase into [0, 1).
///
/// Subtracts (or adds) whole turns, so a phase that is already in range is
/// returned bit-identical.
#[inline]
pub fn wrap_phase01(mut p: f32) -> f32 {
    while p >= 1.0 {
        p -= 1.0;
    }
    while p < 0.0 {
        p += 1.0;
    }
    // -tiny + 1.0 can round up to exactly 1.0
    if p >= 1.0 { 0.0 } else { p }
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if x > -EPS_SMALL && x < EPS_SMALL { 0.0 } else { x }
}

// --------------------------------- Trig ------------------------------------------

/// `sin(phase01 · 2π)`.
///
/// With `fast-math` the argument is folded into [-π/2, π/2] and fed to an
/// odd 7th-order polynomial (max abs error ~2e-4 over the circle).
#[inline]
pub fn sin_turns(phase01: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            // fold turns into [-0.5, 0.5), then mirror into [-0.25, 0.25]
            let mut t = phase01;
            if t >= 0.5 { t -= 1.0; }
            if t > 0.25 { t = 0.5 - t; } else if t < -0.25 { t = -0.5 - t; }
            let x = t * TAU;
            let x2 = x * x;
            let x3 = x2 * x;
            x + (-1.0 / 6.0) * x3
              + (1.0 / 120.0) * x3 * x2
              + (-1.0 / 5040.0) * x3 * x2 * x2
        } else {
            m_sin(phase01 * TAU)
        }
    }
}

// --------------------------------- Nonlinearities --------------------------------

/// Piecewise-linear soft knee: unity gain inside `[-KNEE, KNEE]`,
/// `KNEE_SLOPE` gain beyond it. Symmetric around zero.
///
/// Any input in `[-1.8, 1.8]` maps into `[-1, 1]`.
#[inline]
pub fn soft_knee(x: f32) -> f32 {
    if x > KNEE {
        KNEE + (x - KNEE) * KNEE_SLOPE
    } else if x < -KNEE {
        -KNEE + (x + KNEE) * KNEE_SLOPE
    } else {
        x
    }
}

// ------------------------------------ Tests --------------------------------------
