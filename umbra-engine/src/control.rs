//! Control half of a drone: the envelope controller and the parameter surface.
//!
//! Lives on the game-loop thread. It owns the fade timer and target and is the
//! only writer of the published envelope value and playing flag. Setters clamp
//! silently and never fail.
//!
//! Mood changes glide: intensity, tension and base frequency move linearly
//! from their current values to the new preset over the glide time, stepped
//! by [`DroneControl::update`]. The wind flag switches when the glide starts.

use std::sync::Arc;

use tracing::debug;
use umbra_core::envelopes::{EnvelopeState, FadeEnvelope};

use crate::params::{Mood, MoodPreset, SharedParams};

/// Mood glide time: 100 000 samples at 44.1 kHz.
pub const DEFAULT_MOOD_GLIDE_SECONDS: f32 = 2.27;

#[derive(Copy, Clone, Debug)]
struct MoodGlide {
    from: MoodPreset,
    to: MoodPreset,
    elapsed: f32,
}

#[inline]
fn lerp(a: f32, b: f32, k: f32) -> f32 {
    a + (b - a) * k
}

#[derive(Debug)]
pub struct DroneControl {
    env: FadeEnvelope,
    mood: Mood,
    target_mood: Mood,
    glide: Option<MoodGlide>,
    glide_seconds: f32,
    params: Arc<SharedParams>,
}

impl DroneControl {
    /// # Panics
    /// If `fade_seconds` is not a positive finite number.
    pub fn new(fade_seconds: f32, params: Arc<SharedParams>) -> Self {
        let env = FadeEnvelope::new(fade_seconds);
        params.publish_envelope(env.value(), env.is_audible());
        Self {
            env,
            mood: Mood::default(),
            target_mood: Mood::default(),
            glide: None,
            glide_seconds: DEFAULT_MOOD_GLIDE_SECONDS,
            params,
        }
    }

    /// Fade in. Calling it again mid-fade restarts the fade timer.
    pub fn start(&mut self) {
        self.env.start();
        self.publish();
        debug!(fade_s = self.env.duration(), "drone fading in");
    }

    /// Fade out. The voice goes quiet once the fade completes.
    pub fn stop(&mut self) {
        self.env.stop();
        self.publish();
        debug!(fade_s = self.env.duration(), "drone fading out");
    }

    /// Advance the fade and any mood glide by `delta_seconds` of wall-clock
    /// time. Call once per control tick; both stall if this stops being
    /// called. Negative or NaN deltas count as zero.
    pub fn update(&mut self, delta_seconds: f32) {
        let delta = if delta_seconds > 0.0 { delta_seconds } else { 0.0 };
        if let Some(settled) = self.env.update(delta) {
            debug!(state = ?settled, envelope = self.env.value(), "fade complete");
        }
        self.publish();
        self.step_glide(delta);
    }

    #[inline]
    fn publish(&self) {
        self.params.publish_envelope(self.env.value(), self.env.is_audible());
    }

    fn step_glide(&mut self, delta: f32) {
        let Some(glide) = self.glide.as_mut() else {
            return;
        };
        glide.elapsed += delta;
        let k = glide.elapsed / self.glide_seconds;
        let (from, to) = (glide.from, glide.to);

        if k >= 1.0 {
            self.params.set_intensity(to.intensity);
            self.params.set_tension(to.tension);
            self.params.set_base_frequency(to.base_frequency_hz);
            self.glide = None;
            self.mood = self.target_mood;
            debug!(mood = %self.mood, "mood settled");
        } else {
            self.params.set_intensity(lerp(from.intensity, to.intensity, k));
            self.params.set_tension(lerp(from.tension, to.tension, k));
            self.params
                .set_base_frequency(lerp(from.base_frequency_hz, to.base_frequency_hz, k));
        }
    }

    #[inline] pub fn state(&self) -> EnvelopeState { self.env.state() }
    #[inline] pub fn envelope(&self) -> f32 { self.env.value() }
    #[inline] pub fn envelope_target(&self) -> f32 { self.env.target() }
    #[inline] pub fn is_fading(&self) -> bool { self.env.is_fading() }

    // ----------------------------- parameter surface -----------------------------
    //
    // A manual write during a mood glide pins that parameter for the rest of
    // the glide.

    pub fn set_intensity(&mut self, v: f32) {
        self.params.set_intensity(v);
        let v = self.params.intensity();
        if let Some(g) = self.glide.as_mut() {
            (g.from.intensity, g.to.intensity) = (v, v);
        }
    }

    pub fn set_tension(&mut self, v: f32) {
        self.params.set_tension(v);
        let v = self.params.tension();
        if let Some(g) = self.glide.as_mut() {
            (g.from.tension, g.to.tension) = (v, v);
        }
    }

    pub fn set_base_frequency(&mut self, hz: f32) {
        self.params.set_base_frequency(hz);
        let hz = self.params.base_frequency();
        if let Some(g) = self.glide.as_mut() {
            (g.from.base_frequency_hz, g.to.base_frequency_hz) = (hz, hz);
        }
    }

    #[inline] pub fn set_wind_enabled(&self, on: bool) { self.params.set_wind_enabled(on); }

    #[inline] pub fn intensity(&self) -> f32 { self.params.intensity() }
    #[inline] pub fn tension(&self) -> f32 { self.params.tension() }
    #[inline] pub fn base_frequency(&self) -> f32 { self.params.base_frequency() }
    #[inline] pub fn wind_enabled(&self) -> bool { self.params.wind_enabled() }

    // ----------------------------------- moods -----------------------------------

    /// Glide towards the preset of `mood`. Asking for the current mood, or
    /// for the one already being glided to, does nothing.
    pub fn set_mood(&mut self, mood: Mood) {
        if mood == self.mood || mood == self.target_mood {
            return;
        }
        if self.glide_seconds <= 0.0 {
            self.set_mood_now(mood);
            return;
        }

        let to = mood.preset();
        self.params.set_wind_enabled(to.wind_enabled);
        self.glide = Some(MoodGlide { from: self.current_preset(), to, elapsed: 0.0 });
        debug!(from = %self.mood, to = %mood, glide_s = self.glide_seconds, "mood glide started");
        self.target_mood = mood;
    }

    /// Jump straight to the preset of `mood`, cancelling any glide.
    pub fn set_mood_now(&mut self, mood: Mood) {
        self.params.apply(&mood.preset());
        self.glide = None;
        if mood != self.mood {
            debug!(from = %self.mood, to = %mood, "drone mood changed");
        }
        self.mood = mood;
        self.target_mood = mood;
    }

    /// Glide time for later [`set_mood`](Self::set_mood) calls. Zero or
    /// less switches instantly.
    pub fn set_mood_glide(&mut self, seconds: f32) {
        self.glide_seconds = if seconds > 0.0 { seconds } else { 0.0 };
    }

    fn current_preset(&self) -> MoodPreset {
        MoodPreset {
            intensity: self.params.intensity(),
            tension: self.params.tension(),
            base_frequency_hz: self.params.base_frequency(),
            wind_enabled: self.params.wind_enabled(),
        }
    }

    /// Mood whose preset is fully in effect. Changes when a glide completes;
    /// individual setters do not change it.
    #[inline] pub fn mood(&self) -> Mood { self.mood }
    /// Mood being glided to, or the current mood when settled.
    #[inline] pub fn target_mood(&self) -> Mood { self.target_mood }
    #[inline] pub fn is_gliding(&self) -> bool { self.glide.is_some() }
    #[inline] pub fn mood_glide(&self) -> f32 { self.glide_seconds }

    /// The shared block this controller writes to.
    #[inline] pub fn params(&self) -> &Arc<SharedParams> { &self.params }
}

// ------------------------------------ Tests --------------------------------------
