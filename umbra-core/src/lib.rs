#![cfg_attr(not(feature = "std"), no_std)]
//! Umbra Core — no_std-ready DSP primitives for the drone synthesizer.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm` for math
//! - `micromath`: use `micromath` as the math backend instead
//! - `fast-math`: polynomial sine on the oscillator hot path
//!
//! Modules
//! - [`dsp`]       : math backend, phase wrap, sine-of-turns, soft knee
//! - [`envelopes`] : wall-clock fade envelope with its state machine
//! - [`filters`]   : one-pole low-pass
//!
//! Design
//! - No heap allocations; pure sample-by-sample primitives
//! - Friendly to embedded / real-time targets

pub mod dsp;
pub mod envelopes;
pub mod filters;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{clamp, kill_denormals, sin_turns, soft_knee, wrap_phase01, TAU};
    pub use crate::envelopes::{EnvelopeState, FadeEnvelope, DEFAULT_FADE_SECONDS};
    pub use crate::filters::OnePoleLP;
}
