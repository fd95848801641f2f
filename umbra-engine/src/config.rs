//! Construction-time configuration for a drone.
//!
//! Loaded by hosts from TOML (or built in code). Missing fields fall back to
//! the defaults of the reference drone: 44.1 kHz stereo, 2 s fades, A1 root.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_core::envelopes::DEFAULT_FADE_SECONDS;

use crate::control::DEFAULT_MOOD_GLIDE_SECONDS;
use crate::params::{
    Mood, DEFAULT_BASE_FREQUENCY_HZ, DEFAULT_INTENSITY, DEFAULT_TENSION, DEFAULT_WIND_ENABLED,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    #[error("channel count must be at least 1")]
    ZeroChannels,
    #[error("fade duration must be a positive number of seconds, got {0}")]
    BadFade(f32),
    #[error("mood glide must be a non-negative number of seconds, got {0}")]
    BadGlide(f32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    pub sample_rate: u32,
    pub channels: u32,
    pub fade_seconds: f32,
    /// Time a mood change takes to settle. Zero switches instantly.
    pub mood_glide_seconds: f32,
    /// Seed for the wind noise. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub intensity: f32,
    pub tension: f32,
    pub base_frequency_hz: f32,
    pub wind_enabled: bool,
    /// Applied after the individual parameters, overriding them, without a
    /// glide.
    pub mood: Option<Mood>,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            fade_seconds: DEFAULT_FADE_SECONDS,
            mood_glide_seconds: DEFAULT_MOOD_GLIDE_SECONDS,
            seed: None,
            intensity: DEFAULT_INTENSITY,
            tension: DEFAULT_TENSION,
            base_frequency_hz: DEFAULT_BASE_FREQUENCY_HZ,
            wind_enabled: DEFAULT_WIND_ENABLED,
            mood: None,
        }
    }
}

impl DroneConfig {
    /// Reject values that would make construction panic. Parameter values are
    /// not checked; they are clamped when applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if !(self.fade_seconds.is_finite() && self.fade_seconds > 0.0) {
            return Err(ConfigError::BadFade(self.fade_seconds));
        }
        if !(self.mood_glide_seconds.is_finite() && self.mood_glide_seconds >= 0.0) {
            return Err(ConfigError::BadGlide(self.mood_glide_seconds));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(DroneConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let cfg = DroneConfig { sample_rate: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSampleRate));
        let cfg = DroneConfig { channels: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroChannels));
        let cfg = DroneConfig { fade_seconds: -1.0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::BadFade(-1.0)));
        let cfg = DroneConfig { mood_glide_seconds: -0.5, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::BadGlide(-0.5)));
        let cfg = DroneConfig { mood_glide_seconds: 0.0, ..Default::default() };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg: DroneConfig = toml::from_str(
            r#"
            sample_rate = 48000
            mood = "slumber"
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(cfg.sample_rate, 48_000);
        assert_eq!(cfg.channels, 2);
        assert_eq!(cfg.mood, Some(Mood::Slumber));
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.fade_seconds, 2.0);
        assert_eq!(cfg.mood_glide_seconds, 2.27);
    }
}
