//! Umbra Engine — procedural ambient drone.
//!
//! Crate layout:
//! - [`graph`]   : `AudioGenerator` trait hosts render through
//! - [`nodes`]   : oscillator bank, breathing LFO, wind noise
//! - [`params`]  : lock-free parameter block shared by both halves, moods
//! - [`voice`]   : render half (`DroneVoice`), owned by the audio thread
//! - [`control`] : control half (`DroneControl`), owned by the game loop
//! - [`synth`]   : `Synthesizer` facade and `split` into the two halves
//! - [`config`]  : serde-loadable construction config
//!
//! The render path never allocates, locks or logs. Parameters cross threads
//! as atomics and are clamped on write.

pub mod config;
pub mod control;
pub mod graph;
pub mod nodes;
pub mod params;
pub mod synth;
pub mod voice;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use config::{ConfigError, DroneConfig};
pub use control::{DroneControl, DEFAULT_MOOD_GLIDE_SECONDS};
pub use graph::AudioGenerator;
pub use nodes::{dissonance_gain, Phases};
pub use params::{Mood, MoodPreset, SharedParams};
pub use synth::Synthesizer;
pub use umbra_core::envelopes::EnvelopeState;
pub use voice::DroneVoice;
