//! Render half of a drone.
//!
//! `DroneVoice` owns every piece of per-sample state (oscillator phases, the
//! breathing LFO, the wind filter and its RNG). The control thread never
//! touches it; the only inputs are read from the shared parameter block once
//! per rendered block.
//!
//! Per sample:
//!
//! ```text
//! s  = bank(base, tension)            // fundamental, harmonics, tritone
//! s += 0.1 * wind                     // only while wind is enabled
//! s *= lfo                            // 0.7 + 0.3 sin, in [0.4, 1.0]
//! s *= intensity * envelope
//! s  = soft_knee(s)                   // written to every channel
//! ```

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use umbra_core::dsp::soft_knee;

use crate::graph::{write_frame, AudioGenerator};
use crate::nodes::{BreathLfo, OscillatorBank, Phases, WindNoise};
use crate::params::{ParamSnapshot, SharedParams};

/// Mix weight of the filtered wind layer.
pub const WIND_GAIN: f32 = 0.1;

pub struct DroneVoice<R = StdRng> {
    sample_rate: u32,
    channels: u32,
    sr: f32,
    bank: OscillatorBank,
    lfo: BreathLfo,
    wind: WindNoise<R>,
    params: Arc<SharedParams>,
}

impl<R> core::fmt::Debug for DroneVoice<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DroneVoice")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("bank", &self.bank)
            .field("lfo", &self.lfo)
            .finish_non_exhaustive()
    }
}

impl<R: Rng> DroneVoice<R> {
    /// # Panics
    /// If `sample_rate` or `channels` is zero.
    pub fn new(sample_rate: u32, channels: u32, rng: R, params: Arc<SharedParams>) -> Self {
        assert!(sample_rate > 0, "sample rate must be non-zero");
        assert!(channels >= 1, "channel count must be at least 1");
        Self {
            sample_rate,
            channels,
            sr: sample_rate as f32,
            bank: OscillatorBank::default(),
            lfo: BreathLfo::default(),
            wind: WindNoise::new(rng),
            params,
        }
    }

    /// All phase accumulators, each in `[0, 1)`.
    pub fn phases(&self) -> Phases {
        Phases { lfo: self.lfo.phase(), ..self.bank.phases() }
    }

    /// Running state of the wind low-pass.
    #[inline]
    pub fn wind_state(&self) -> f32 {
        self.wind.value()
    }

    #[inline]
    fn next_sample(&mut self, p: &ParamSnapshot) -> f32 {
        let mut s = self.bank.next(p.base_frequency_hz, p.tension, self.sr);
        if p.wind_enabled {
            s += WIND_GAIN * self.wind.next();
        }
        s *= self.lfo.next(self.sr);
        master(s, p.intensity * p.envelope)
    }
}

/// Output stage: level first, then the knee.
#[inline]
fn master(s: f32, gain: f32) -> f32 {
    if gain == 0.0 {
        // keep silent blocks bit-exact (no -0.0)
        return 0.0;
    }
    soft_knee(s * gain)
}

impl<R: Rng> AudioGenerator for DroneVoice<R> {
    #[inline]
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    fn channels(&self) -> u32 {
        self.channels
    }

    fn generate(&mut self, buffer: &mut [f32], frames: usize) {
        let ch = self.channels as usize;
        let needed = frames * ch;
        assert!(
            buffer.len() >= needed,
            "buffer holds {} samples, {frames} frames x {ch} channels requested",
            buffer.len()
        );
        let out = &mut buffer[..needed];

        let p = self.params.snapshot();
        if !p.playing {
            out.fill(0.0);
            return;
        }

        for frame in out.chunks_exact_mut(ch) {
            let s = self.next_sample(&p);
            write_frame(frame, s);
        }
    }
}

// ------------------------------------ Tests --------------------------------------
