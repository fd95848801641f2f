//! Thread-crossing parameter block.
//!
//! The control side (game loop) writes, the render side reads. Every field is
//! a lock-free atomic so `generate` never waits on the control thread. Each
//! value is independent, so relaxed ordering is enough; the render side takes
//! one [`ParamSnapshot`] per block, which keeps a block internally consistent.
//!
//! Writes clamp silently into the documented range. NaN writes are dropped.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_BASE_FREQUENCY_HZ: f32 = 20.0;
pub const MAX_BASE_FREQUENCY_HZ: f32 = 200.0;

/// A1.
pub const DEFAULT_BASE_FREQUENCY_HZ: f32 = 55.0;
pub const DEFAULT_INTENSITY: f32 = 0.5;
pub const DEFAULT_TENSION: f32 = 0.0;
pub const DEFAULT_WIND_ENABLED: bool = true;

/// `f32` stored as raw bits in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    #[inline]
    pub fn new(v: f32) -> Self {
        Self(AtomicU32::new(v.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, v: f32) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Store `v` and return the previous value.
    #[inline]
    pub fn swap(&self, v: f32) -> f32 {
        f32::from_bits(self.0.swap(v.to_bits(), Ordering::Relaxed))
    }
}

/// Parameters shared between the control and render halves of a drone.
#[derive(Debug)]
pub struct SharedParams {
    intensity: AtomicF32,
    tension: AtomicF32,
    base_frequency_hz: AtomicF32,
    wind_enabled: AtomicBool,
    // Written by the envelope controller only.
    envelope: AtomicF32,
    playing: AtomicBool,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self {
            intensity: AtomicF32::new(DEFAULT_INTENSITY),
            tension: AtomicF32::new(DEFAULT_TENSION),
            base_frequency_hz: AtomicF32::new(DEFAULT_BASE_FREQUENCY_HZ),
            wind_enabled: AtomicBool::new(DEFAULT_WIND_ENABLED),
            envelope: AtomicF32::new(0.0),
            playing: AtomicBool::new(false),
        }
    }
}

impl SharedParams {
    pub fn set_intensity(&self, v: f32) {
        if !v.is_nan() {
            self.intensity.store(v.clamp(0.0, 1.0));
        }
    }

    pub fn set_tension(&self, v: f32) {
        if !v.is_nan() {
            self.tension.store(v.clamp(0.0, 1.0));
        }
    }

    pub fn set_base_frequency(&self, hz: f32) {
        if !hz.is_nan() {
            self.base_frequency_hz
                .store(hz.clamp(MIN_BASE_FREQUENCY_HZ, MAX_BASE_FREQUENCY_HZ));
        }
    }

    #[inline]
    pub fn set_wind_enabled(&self, on: bool) {
        self.wind_enabled.store(on, Ordering::Relaxed);
    }

    #[inline] pub fn intensity(&self) -> f32 { self.intensity.load() }
    #[inline] pub fn tension(&self) -> f32 { self.tension.load() }
    #[inline] pub fn base_frequency(&self) -> f32 { self.base_frequency_hz.load() }
    #[inline] pub fn wind_enabled(&self) -> bool { self.wind_enabled.load(Ordering::Relaxed) }

    #[inline]
    pub(crate) fn publish_envelope(&self, value: f32, playing: bool) {
        self.envelope.store(value);
        self.playing.store(playing, Ordering::Relaxed);
    }

    #[inline] pub fn envelope(&self) -> f32 { self.envelope.load() }
    #[inline] pub fn playing(&self) -> bool { self.playing.load(Ordering::Relaxed) }

    /// Copy every field the render path needs.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            intensity: self.intensity(),
            tension: self.tension(),
            base_frequency_hz: self.base_frequency(),
            wind_enabled: self.wind_enabled(),
            envelope: self.envelope(),
            playing: self.playing(),
        }
    }

    pub fn apply(&self, preset: &MoodPreset) {
        self.set_intensity(preset.intensity);
        self.set_tension(preset.tension);
        self.set_base_frequency(preset.base_frequency_hz);
        self.set_wind_enabled(preset.wind_enabled);
    }
}

/// Plain copy of [`SharedParams`] for one render block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParamSnapshot {
    pub intensity: f32,
    pub tension: f32,
    pub base_frequency_hz: f32,
    pub wind_enabled: bool,
    pub envelope: f32,
    pub playing: bool,
}

// ------------------------------------ Moods --------------------------------------

/// Coarse drone character, switched on gameplay events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Default atmospheric drone.
    #[default]
    Neutral,
    /// Dangerous moments: dissonance on, a little louder.
    Tension,
    /// Brighter and cleaner, no wind.
    Triumph,
    /// Deep, quiet and sparse.
    Slumber,
}

/// Full parameter set a [`Mood`] maps to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoodPreset {
    pub intensity: f32,
    pub tension: f32,
    pub base_frequency_hz: f32,
    pub wind_enabled: bool,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Neutral, Mood::Tension, Mood::Triumph, Mood::Slumber];

    pub fn preset(self) -> MoodPreset {
        match self {
            Mood::Neutral => MoodPreset {
                intensity: DEFAULT_INTENSITY,
                tension: DEFAULT_TENSION,
                base_frequency_hz: DEFAULT_BASE_FREQUENCY_HZ,
                wind_enabled: DEFAULT_WIND_ENABLED,
            },
            Mood::Tension => MoodPreset {
                intensity: 0.7,
                tension: 0.85,
                base_frequency_hz: 55.0,
                wind_enabled: true,
            },
            Mood::Triumph => MoodPreset {
                intensity: 0.6,
                tension: 0.0,
                base_frequency_hz: 82.41, // E2
                wind_enabled: false,
            },
            Mood::Slumber => MoodPreset {
                intensity: 0.35,
                tension: 0.0,
                base_frequency_hz: 27.5, // A0
                wind_enabled: true,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Tension => "tension",
            Mood::Triumph => "triumph",
            Mood::Slumber => "slumber",
        }
    }
}

impl core::fmt::Display for Mood {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mood `{0}` (expected neutral, tension, triumph or slumber)")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_drone() {
        let p = SharedParams::default();
        assert_eq!(p.intensity(), 0.5);
        assert_eq!(p.tension(), 0.0);
        assert_eq!(p.base_frequency(), 55.0);
        assert!(p.wind_enabled());
        assert_eq!(p.envelope(), 0.0);
        assert!(!p.playing());
    }

    #[test]
    fn writes_are_clamped() {
        let p = SharedParams::default();
        p.set_intensity(2.0);
        assert_eq!(p.intensity(), 1.0);
        p.set_intensity(-3.0);
        assert_eq!(p.intensity(), 0.0);
        p.set_tension(1.5);
        assert_eq!(p.tension(), 1.0);
        p.set_base_frequency(500.0);
        assert_eq!(p.base_frequency(), 200.0);
        p.set_base_frequency(1.0);
        assert_eq!(p.base_frequency(), 20.0);
        p.set_base_frequency(f32::INFINITY);
        assert_eq!(p.base_frequency(), 200.0);
    }

    #[test]
    fn nan_writes_are_ignored() {
        let p = SharedParams::default();
        p.set_intensity(0.8);
        p.set_intensity(f32::NAN);
        assert_eq!(p.intensity(), 0.8);
        p.set_base_frequency(f32::NAN);
        assert_eq!(p.base_frequency(), 55.0);
    }

    #[test]
    fn in_range_writes_round_trip_exactly() {
        let p = SharedParams::default();
        p.set_intensity(0.8);
        assert_eq!(p.intensity(), 0.8);
        p.set_tension(0.75);
        assert_eq!(p.tension(), 0.75);
        p.set_base_frequency(110.0);
        assert_eq!(p.base_frequency(), 110.0);
        p.set_wind_enabled(false);
        assert!(!p.wind_enabled());
    }

    #[test]
    fn snapshot_copies_everything() {
        let p = SharedParams::default();
        p.set_tension(0.6);
        p.publish_envelope(0.25, true);
        let s = p.snapshot();
        assert_eq!(s.tension, 0.6);
        assert_eq!(s.envelope, 0.25);
        assert!(s.playing);
        assert_eq!(s.base_frequency_hz, 55.0);
    }

    #[test]
    fn mood_presets_are_in_range() {
        for mood in Mood::ALL {
            let preset = mood.preset();
            let p = SharedParams::default();
            p.apply(&preset);
            assert_eq!(p.intensity(), preset.intensity, "{mood}");
            assert_eq!(p.tension(), preset.tension, "{mood}");
            assert_eq!(p.base_frequency(), preset.base_frequency_hz, "{mood}");
        }
        assert!(Mood::Tension.preset().tension > 0.5);
    }

    #[test]
    fn mood_parses_case_insensitively() {
        assert_eq!("Slumber".parse::<Mood>(), Ok(Mood::Slumber));
        assert_eq!(" tension ".parse::<Mood>(), Ok(Mood::Tension));
        assert!("cheerful".parse::<Mood>().is_err());
    }
}
