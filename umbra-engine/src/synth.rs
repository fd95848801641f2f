//! Single-owner facade over the two halves of a drone.
//!
//! `Synthesizer` is what most callers construct: one object with the full
//! lifecycle and parameter API. Hosts that render on a dedicated audio thread
//! call [`Synthesizer::split`] and hand the [`DroneVoice`] to the callback
//! while the game loop keeps the [`DroneControl`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use umbra_core::envelopes::{EnvelopeState, DEFAULT_FADE_SECONDS};

use crate::config::{ConfigError, DroneConfig};
use crate::control::DroneControl;
use crate::graph::AudioGenerator;
use crate::nodes::Phases;
use crate::params::{Mood, SharedParams};
use crate::voice::DroneVoice;

#[derive(Debug)]
pub struct Synthesizer<R = StdRng> {
    control: DroneControl,
    voice: DroneVoice<R>,
}

impl Synthesizer<StdRng> {
    /// Drone with default parameters and wind seeded from OS entropy.
    ///
    /// # Panics
    /// If `sample_rate` or `channels` is zero.
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self::with_rng(sample_rate, channels, StdRng::from_entropy())
    }

    /// Like [`Synthesizer::new`] but reproducible.
    pub fn with_seed(sample_rate: u32, channels: u32, seed: u64) -> Self {
        Self::with_rng(sample_rate, channels, StdRng::seed_from_u64(seed))
    }

    /// Validate `cfg` and build a drone with its parameters applied.
    pub fn from_config(cfg: &DroneConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut synth = Self::build(cfg.sample_rate, cfg.channels, cfg.fade_seconds, rng);
        synth.control.set_mood_glide(cfg.mood_glide_seconds);
        synth.set_intensity(cfg.intensity);
        synth.set_tension(cfg.tension);
        synth.set_base_frequency(cfg.base_frequency_hz);
        synth.set_wind_enabled(cfg.wind_enabled);
        if let Some(mood) = cfg.mood {
            synth.set_mood_now(mood);
        }
        debug!(
            sample_rate = cfg.sample_rate,
            channels = cfg.channels,
            fade_s = cfg.fade_seconds,
            "drone configured"
        );
        Ok(synth)
    }
}

impl<R: Rng> Synthesizer<R> {
    /// Drone with default parameters and an injected randomness source.
    ///
    /// # Panics
    /// If `sample_rate` or `channels` is zero.
    pub fn with_rng(sample_rate: u32, channels: u32, rng: R) -> Self {
        Self::build(sample_rate, channels, DEFAULT_FADE_SECONDS, rng)
    }

    fn build(sample_rate: u32, channels: u32, fade_seconds: f32, rng: R) -> Self {
        let params = Arc::new(SharedParams::default());
        let voice = DroneVoice::new(sample_rate, channels, rng, params.clone());
        let control = DroneControl::new(fade_seconds, params);
        Self { control, voice }
    }

    /// Separate the control and render halves for use on two threads.
    pub fn split(self) -> (DroneControl, DroneVoice<R>) {
        (self.control, self.voice)
    }

    #[inline] pub fn control(&self) -> &DroneControl { &self.control }
    #[inline] pub fn control_mut(&mut self) -> &mut DroneControl { &mut self.control }
    #[inline] pub fn voice(&self) -> &DroneVoice<R> { &self.voice }

    // ----------------------------- lifecycle -------------------------------------

    #[inline] pub fn start(&mut self) { self.control.start(); }
    #[inline] pub fn stop(&mut self) { self.control.stop(); }
    #[inline] pub fn update(&mut self, delta_seconds: f32) { self.control.update(delta_seconds); }

    #[inline] pub fn state(&self) -> EnvelopeState { self.control.state() }
    #[inline] pub fn envelope(&self) -> f32 { self.control.envelope() }
    #[inline] pub fn envelope_target(&self) -> f32 { self.control.envelope_target() }
    #[inline] pub fn phases(&self) -> Phases { self.voice.phases() }

    // ----------------------------- parameters ------------------------------------

    #[inline] pub fn set_intensity(&mut self, v: f32) { self.control.set_intensity(v); }
    #[inline] pub fn set_tension(&mut self, v: f32) { self.control.set_tension(v); }
    #[inline] pub fn set_base_frequency(&mut self, hz: f32) { self.control.set_base_frequency(hz); }
    #[inline] pub fn set_wind_enabled(&mut self, on: bool) { self.control.set_wind_enabled(on); }
    #[inline] pub fn set_mood(&mut self, mood: Mood) { self.control.set_mood(mood); }
    #[inline] pub fn set_mood_now(&mut self, mood: Mood) { self.control.set_mood_now(mood); }

    #[inline] pub fn intensity(&self) -> f32 { self.control.intensity() }
    #[inline] pub fn tension(&self) -> f32 { self.control.tension() }
    #[inline] pub fn base_frequency(&self) -> f32 { self.control.base_frequency() }
    #[inline] pub fn wind_enabled(&self) -> bool { self.control.wind_enabled() }
    #[inline] pub fn mood(&self) -> Mood { self.control.mood() }
    #[inline] pub fn target_mood(&self) -> Mood { self.control.target_mood() }
}

impl<R: Rng> AudioGenerator for Synthesizer<R> {
    #[inline]
    fn sample_rate(&self) -> u32 {
        self.voice.sample_rate()
    }

    #[inline]
    fn channels(&self) -> u32 {
        self.voice.channels()
    }

    #[inline]
    fn generate(&mut self, buffer: &mut [f32], frames: usize) {
        self.voice.generate(buffer, frames);
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn steady(sample_rate: u32, channels: u32) -> Synthesizer {
        let mut s = Synthesizer::with_seed(sample_rate, channels, 1234);
        s.start();
        s.update(2.0);
        s
    }

    #[test]
    fn fresh_synth_is_idle_with_defaults() {
        let s = Synthesizer::with_seed(44_100, 2, 0);
        assert_eq!(s.state(), EnvelopeState::Idle);
        assert_eq!(s.envelope(), 0.0);
        assert!(s.intensity() > 0.0 && s.intensity() <= 1.0);
        assert_eq!(s.tension(), 0.0);
        assert_eq!(s.base_frequency(), 55.0);
        assert!(s.wind_enabled());
        assert_eq!(s.mood(), Mood::Neutral);
    }

    #[test]
    fn parameter_clamping() {
        let mut s = Synthesizer::with_seed(44_100, 2, 0);
        s.set_intensity(2.0);
        assert_eq!(s.intensity(), 1.0);
        s.set_intensity(-3.0);
        assert_eq!(s.intensity(), 0.0);
        s.set_base_frequency(500.0);
        assert_eq!(s.base_frequency(), 200.0);
        s.set_tension(0.75);
        assert_eq!(s.tension(), 0.75);
        s.set_wind_enabled(false);
        assert!(!s.wind_enabled());
    }

    #[test]
    fn envelope_converges_in_one_step() {
        let s = steady(44_100, 2);
        assert_eq!(s.envelope(), 1.0);
        assert_eq!(s.envelope_target(), 1.0);
        assert_eq!(s.state(), EnvelopeState::Steady);
    }

    #[test]
    fn envelope_converges_over_many_steps() {
        let mut s = Synthesizer::with_seed(44_100, 2, 0);
        s.start();
        for _ in 0..16 {
            s.update(0.125);
        }
        assert_eq!(s.envelope(), 1.0);
        assert_eq!(s.state(), EnvelopeState::Steady);
    }

    #[test]
    fn deterministic_silence() {
        let mut s = Synthesizer::with_seed(44_100, 2, 0);
        s.set_wind_enabled(false);
        s.set_intensity(0.0);
        s.start();
        s.update(0.5);

        let mut a = vec![1.0_f32; 2 * 256];
        let mut b = vec![-1.0_f32; 2 * 256];
        s.generate(&mut a, 256);
        s.generate(&mut b, 256);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
        assert!(a.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn fundamental_phase_after_800_samples() {
        let mut s = steady(44_100, 2);
        s.set_intensity(1.0);
        s.set_wind_enabled(false);
        s.set_tension(0.0);
        s.set_base_frequency(55.0);

        let mut buf = vec![0.0_f32; 2 * 800];
        s.generate(&mut buf, 800);

        let expected = (55.0_f64 * 800.0 / 44_100.0) % 1.0;
        let got = f64::from(s.phases().base);
        assert!((got - expected).abs() < 1e-3, "got={got} expected={expected}");
        assert!((expected - 0.998).abs() < 1e-3);
    }

    #[test]
    fn output_is_bounded_at_full_drive() {
        let mut s = steady(48_000, 2);
        s.set_intensity(1.0);
        s.set_tension(1.0);
        s.set_base_frequency(200.0);
        let mut buf = vec![0.0_f32; 2 * 4096];
        for _ in 0..50 {
            s.generate(&mut buf, 4096);
            assert!(buf.iter().all(|x| (-1.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn phases_stay_wrapped() {
        let mut s = steady(8_000, 1);
        s.set_tension(0.9);
        s.set_base_frequency(200.0);
        let mut buf = vec![0.0_f32; 1000];
        for n in 0..200 {
            s.generate(&mut buf, 1 + n % 1000);
            for p in s.phases().as_array() {
                assert!((0.0..1.0).contains(&p), "phase {p}");
            }
        }
    }

    #[test]
    fn same_seed_renders_identically() {
        let mut a = steady(44_100, 2);
        let mut b = steady(44_100, 2);
        let mut x = vec![0.0_f32; 2 * 1024];
        let mut y = vec![0.0_f32; 2 * 1024];
        a.generate(&mut x, 1024);
        b.generate(&mut y, 1024);
        assert_eq!(x, y);
    }

    #[test]
    fn stopped_synth_goes_silent() {
        let mut s = steady(44_100, 1);
        s.stop();
        s.update(1.0);
        s.update(1.0);
        assert_eq!(s.state(), EnvelopeState::Stopped);
        let mut buf = vec![1.0_f32; 128];
        s.generate(&mut buf, 128);
        assert!(buf.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn from_config_applies_mood_last() {
        let cfg = DroneConfig {
            seed: Some(3),
            tension: 0.1,
            mood: Some(Mood::Tension),
            ..Default::default()
        };
        let s = Synthesizer::from_config(&cfg).unwrap();
        assert_eq!(s.tension(), Mood::Tension.preset().tension);
        assert_eq!(s.mood(), Mood::Tension);
    }

    #[test]
    fn configured_glide_drives_mood_changes() {
        let cfg = DroneConfig { seed: Some(3), mood_glide_seconds: 4.0, ..Default::default() };
        let mut s = Synthesizer::from_config(&cfg).unwrap();
        s.set_mood(Mood::Slumber);
        s.update(2.0);
        assert_eq!(s.mood(), Mood::Neutral);
        assert!((s.base_frequency() - 41.25).abs() < 1e-3);
        s.update(2.0);
        assert_eq!(s.mood(), Mood::Slumber);
        assert_eq!(s.base_frequency(), 27.5);
    }

    #[test]
    fn from_config_rejects_zero_rate() {
        let cfg = DroneConfig { sample_rate: 0, ..Default::default() };
        assert_eq!(Synthesizer::from_config(&cfg).unwrap_err(), ConfigError::ZeroSampleRate);
    }

    #[test]
    #[should_panic]
    fn zero_sample_rate_panics() {
        let _ = Synthesizer::with_seed(0, 2, 0);
    }
}
