//! Fade envelope for a long-running voice.
//!
//! Unlike per-sample ADSR generators, `FadeEnvelope` is ticked from the
//! control side with a wall-clock `delta` in seconds. The audio side only
//! ever reads the current value, so the fade shape depends on how often
//! `update` is called, not on the audio block size.
//!
//! The approach recurrence is
//!
//! ```text
//! t        = 1 - remaining / duration
//! current += (target - current) * t
//! remaining -= delta
//! ```
//!
//! where `t` is recomputed from the *current* remaining time on every call.
//! The first tick after `start`/`stop` therefore moves nothing, and later
//! ticks pull harder as the timer runs down. When the timer expires the
//! value snaps to the target.

/// Lifecycle of a faded voice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Never started; silent.
    Idle,
    FadingIn,
    /// Fade-in finished, holding at full level.
    Steady,
    FadingOut,
    /// Fade-out finished; the voice should stop producing output.
    Stopped,
}

impl EnvelopeState {
    /// Whether a voice in this state should be rendering.
    #[inline]
    pub fn is_audible(self) -> bool {
        matches!(self, Self::FadingIn | Self::Steady | Self::FadingOut)
    }
}

/// Default fade length in seconds.
pub const DEFAULT_FADE_SECONDS: f32 = 2.0;

#[derive(Copy, Clone, Debug)]
pub struct FadeEnvelope {
    duration: f32,
    current: f32,
    target: f32,
    remaining: f32,
    active: bool,
    state: EnvelopeState,
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_SECONDS)
    }
}

impl FadeEnvelope {
    /// # Panics
    /// If `fade_seconds` is not a positive finite number.
    pub fn new(fade_seconds: f32) -> Self {
        assert!(
            fade_seconds.is_finite() && fade_seconds > 0.0,
            "fade duration must be positive, got {fade_seconds}"
        );
        Self {
            duration: fade_seconds,
            current: 0.0,
            target: 0.0,
            remaining: 0.0,
            active: false,
            state: EnvelopeState::Idle,
        }
    }

    /// Begin (or restart) a fade towards full level.
    #[inline]
    pub fn start(&mut self) {
        self.begin(1.0, EnvelopeState::FadingIn);
    }

    /// Begin (or restart) a fade towards silence.
    #[inline]
    pub fn stop(&mut self) {
        self.begin(0.0, EnvelopeState::FadingOut);
    }

    #[inline]
    fn begin(&mut self, target: f32, state: EnvelopeState) {
        self.target = target;
        self.active = true;
        self.remaining = self.duration;
        self.state = state;
    }

    /// Advance the fade by `delta` seconds.
    ///
    /// Returns the settled state on the call that completes a fade,
    /// `None` otherwise. Does nothing while no fade is running.
    ///
    /// Negative and NaN deltas count as zero, so `remaining` never grows
    /// past `duration` and the value stays between its start and target.
    pub fn update(&mut self, delta: f32) -> Option<EnvelopeState> {
        if !self.active {
            return None;
        }
        let delta = if delta > 0.0 { delta } else { 0.0 };

        let t = 1.0 - self.remaining / self.duration;
        self.current += (self.target - self.current) * t;
        self.remaining -= delta;

        if self.remaining > 0.0 {
            return None;
        }

        self.current = self.target;
        self.active = false;
        self.state = if self.target == 0.0 {
            EnvelopeState::Stopped
        } else {
            EnvelopeState::Steady
        };
        Some(self.state)
    }

    #[inline] pub fn value(&self) -> f32 { self.current }
    #[inline] pub fn target(&self) -> f32 { self.target }
    #[inline] pub fn state(&self) -> EnvelopeState { self.state }
    #[inline] pub fn is_fading(&self) -> bool { self.active }
    #[inline] pub fn remaining(&self) -> f32 { self.remaining }
    #[inline] pub fn duration(&self) -> f32 { self.duration }
    #[inline] pub fn is_audible(&self) -> bool { self.state.is_audible() }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_silent() {
        let env = FadeEnvelope::default();
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.value(), 0.0);
        assert!(!env.is_fading());
        assert!(!env.is_audible());
    }

    #[test]
    fn single_full_step_snaps_to_target() {
        let mut env = FadeEnvelope::default();
        env.start();
        assert_eq!(env.state(), EnvelopeState::FadingIn);
        assert_eq!(env.update(2.0), Some(EnvelopeState::Steady));
        assert_eq!(env.value(), 1.0);
        assert_eq!(env.target(), 1.0);
        assert!(!env.is_fading());
    }

    #[test]
    fn accumulated_steps_converge_exactly() {
        let mut env = FadeEnvelope::default();
        env.start();
        let mut settled = None;
        for _ in 0..8 {
            settled = env.update(0.25);
        }
        assert_eq!(settled, Some(EnvelopeState::Steady));
        assert_eq!(env.value(), 1.0);
    }

    #[test]
    fn recurrence_uses_remaining_time() {
        let mut env = FadeEnvelope::default();
        env.start();

        // t = 0 on the first tick
        env.update(0.5);
        assert_eq!(env.value(), 0.0);

        // remaining 1.5 -> t = 0.25
        env.update(0.5);
        assert!((env.value() - 0.25).abs() < 1e-6);

        // remaining 1.0 -> t = 0.5: 0.25 + 0.75 * 0.5
        env.update(0.5);
        assert!((env.value() - 0.625).abs() < 1e-6);
        assert_eq!(env.state(), EnvelopeState::FadingIn);
    }

    #[test]
    fn value_holds_between_fades() {
        let mut env = FadeEnvelope::default();
        env.start();
        env.update(2.0);
        assert_eq!(env.update(10.0), None);
        assert_eq!(env.value(), 1.0);
        assert_eq!(env.state(), EnvelopeState::Steady);
    }

    #[test]
    fn stop_fades_to_stopped() {
        let mut env = FadeEnvelope::default();
        env.start();
        env.update(2.0);
        env.stop();
        assert_eq!(env.state(), EnvelopeState::FadingOut);
        assert!(env.is_audible());
        assert_eq!(env.update(1.0), None);
        assert_eq!(env.update(1.0), Some(EnvelopeState::Stopped));
        assert_eq!(env.value(), 0.0);
        assert!(!env.is_audible());
    }

    #[test]
    fn restarting_a_fade_resets_the_timer() {
        let mut env = FadeEnvelope::default();
        env.start();
        env.update(1.5);
        assert!((env.remaining() - 0.5).abs() < 1e-6);
        env.start();
        assert_eq!(env.remaining(), 2.0);
        assert_eq!(env.state(), EnvelopeState::FadingIn);
    }

    #[test]
    fn custom_duration_scales_recurrence() {
        let mut env = FadeEnvelope::new(4.0);
        env.start();
        env.update(1.0);
        // remaining 3.0 of 4.0 -> t = 0.25
        env.update(1.0);
        assert!((env.value() - 0.25).abs() < 1e-6);
        env.update(2.0);
        assert_eq!(env.state(), EnvelopeState::Steady);
    }

    #[test]
    fn negative_and_nan_deltas_do_not_rewind() {
        let mut env = FadeEnvelope::default();
        env.start();
        env.update(2.0);
        env.stop();
        for _ in 0..5 {
            assert_eq!(env.update(-1.0), None);
            assert!((0.0..=1.0).contains(&env.value()), "v={}", env.value());
        }
        env.update(f32::NAN);
        assert_eq!(env.remaining(), 2.0);
        assert_eq!(env.value(), 1.0);
        assert_eq!(env.update(2.0), Some(EnvelopeState::Stopped));
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    #[should_panic]
    fn zero_duration_is_rejected() {
        let _ = FadeEnvelope::new(0.0);
    }
}
