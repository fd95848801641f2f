//! Building blocks (nodes) for the drone voice.
//!
//! These are zero-allocation, per-sample components designed for realtime use.
//! Everything here is small and cheap to move; no locks, no heap.
//!
//! Contents:
//! - `Osc`           : sine phase accumulator with stable `[0,1)` wrap
//! - `BreathLfo`     : 0.1 Hz amplitude "breathing", `0.7 + 0.3·sin`
//! - `WindNoise`     : uniform noise through a fixed one-pole low-pass
//! - `OscillatorBank`: detuned fundamental, 2nd/3rd/5th harmonics, tritone
//!
//! Notes:
//! - Frequency is **Hz**; methods expect the current **sample rate** when stepping.

use rand::Rng;
use umbra_core::dsp::{sin_turns, wrap_phase01};
use umbra_core::filters::OnePoleLP;

/// Free-running sine oscillator. Phase is kept in turns.
#[derive(Copy, Clone, Debug, Default)]
pub struct Osc {
    phase: f32, // [0,1)
}

impl Osc {
    #[inline]
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Emit `sin(phase · 2π)` for the current phase, then advance by one sample.
    #[inline]
    pub fn next(&mut self, freq_hz: f32, sr: f32) -> f32 {
        let s = sin_turns(self.phase);
        self.phase = wrap_phase01(self.phase + freq_hz / sr);
        s
    }

    #[inline] pub fn phase(&self) -> f32 { self.phase }
}

// ------------------------------------ LFO ----------------------------------------

pub const LFO_RATE_HZ: f32 = 0.1;
pub const LFO_FLOOR: f32 = 0.7;
pub const LFO_DEPTH: f32 = 0.3;

/// Breathing gain at `phase` (turns). Centred on 0.7, so it dips to 0.4 at
/// the trough and peaks at 1.0.
#[inline]
pub fn breath_gain(phase: f32) -> f32 {
    LFO_FLOOR + LFO_DEPTH * sin_turns(phase)
}

/// Slow multiplicative modulator simulating breathing.
#[derive(Copy, Clone, Debug, Default)]
pub struct BreathLfo {
    phase: f32,
}

impl BreathLfo {
    /// Advance one sample and return the gain, in `[0.4, 1.0]`.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        self.phase = wrap_phase01(self.phase + LFO_RATE_HZ / sr);
        breath_gain(self.phase)
    }

    #[inline] pub fn phase(&self) -> f32 { self.phase }
}

// ------------------------------------ Wind ---------------------------------------

/// Smoothing coefficient of the wind filter. Fixed, independent of sample rate.
pub const WIND_ALPHA: f32 = 0.01;

/// White noise smoothed into a low rumble.
///
/// The randomness source is injected so renders can be reproduced.
#[derive(Clone, Debug)]
pub struct WindNoise<R> {
    rng: R,
    lp: OnePoleLP,
}

impl<R: Rng> WindNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, lp: OnePoleLP::with_coeff(WIND_ALPHA) }
    }

    /// Draw one raw sample in `[-1, 1]` and return the filtered value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let raw: f32 = self.rng.gen_range(-1.0..=1.0);
        self.lp.process(raw)
    }

    /// Current filter state.
    #[inline] pub fn value(&self) -> f32 { self.lp.value() }
}

// ------------------------------------ Bank ---------------------------------------

pub const FUNDAMENTAL_GAIN: f32 = 0.5;
pub const HARM2_GAIN: f32 = 0.2;
pub const HARM3_GAIN: f32 = 0.1;
pub const HARM5_GAIN: f32 = 0.05;

/// Relative detune of the fundamental at full tension.
pub const DETUNE_DEPTH: f32 = 0.02;

/// Tension above which the tritone voice sounds.
pub const DISSONANCE_THRESHOLD: f32 = 0.5;
pub const DISSONANCE_SLOPE: f32 = 0.2;
pub const TRITONE_RATIO: f32 = 1.414_213_56;

/// Gain of the tritone oscillator: 0 up to the threshold, then a linear ramp
/// reaching 0.1 at full tension.
#[inline]
pub fn dissonance_gain(tension: f32) -> f32 {
    if tension > DISSONANCE_THRESHOLD {
        (tension - DISSONANCE_THRESHOLD) * DISSONANCE_SLOPE
    } else {
        0.0
    }
}

/// Phase accumulators of a drone voice, in turns.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Phases {
    pub base: f32,
    pub harm2: f32,
    pub harm3: f32,
    pub harm5: f32,
    pub lfo: f32,
    pub dissonance: f32,
}

impl Phases {
    pub fn as_array(&self) -> [f32; 6] {
        [self.base, self.harm2, self.harm3, self.harm5, self.lfo, self.dissonance]
    }
}

/// Additive bank: fundamental plus harmonics, and a tritone that fades in
/// with tension. The tritone keeps its own phase and only advances while it
/// is sounding.
#[derive(Copy, Clone, Debug, Default)]
pub struct OscillatorBank {
    fundamental: Osc,
    harm2: Osc,
    harm3: Osc,
    harm5: Osc,
    dissonance: Osc,
}

impl OscillatorBank {
    /// One sample of the summed bank.
    #[inline]
    pub fn next(&mut self, base_hz: f32, tension: f32, sr: f32) -> f32 {
        let detune = 1.0 + tension * DETUNE_DEPTH;

        let mut s = FUNDAMENTAL_GAIN * self.fundamental.next(base_hz * detune, sr)
            + HARM2_GAIN * self.harm2.next(2.0 * base_hz, sr)
            + HARM3_GAIN * self.harm3.next(3.0 * base_hz, sr)
            + HARM5_GAIN * self.harm5.next(5.0 * base_hz, sr);

        if tension > DISSONANCE_THRESHOLD {
            s += dissonance_gain(tension) * self.dissonance.next(base_hz * TRITONE_RATIO, sr);
        }
        s
    }

    /// Bank phases; the LFO slot is left at zero for the voice to fill in.
    pub fn phases(&self) -> Phases {
        Phases {
            base: self.fundamental.phase(),
            harm2: self.harm2.phase(),
            harm3: self.harm3.phase(),
            harm5: self.harm5.phase(),
            lfo: 0.0,
            dissonance: self.dissonance.phase(),
        }
    }
}

// ------------------------------------ Tests --------------------------------------
