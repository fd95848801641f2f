//! Block-rendering seam between synthesizers and audio hosts.
//!
//! A host (cpal callback, FFI caller, offline renderer) only needs
//! [`AudioGenerator`]: it asks for a number of frames and gets them written
//! interleaved into the buffer it owns. Implementations must not allocate,
//! lock or log inside `generate`.

/// Anything that can fill interleaved `f32` blocks on demand.
pub trait AudioGenerator {
    /// Output sample rate in Hz. Fixed for the lifetime of the generator.
    fn sample_rate(&self) -> u32;

    /// Interleaved channel count. Fixed for the lifetime of the generator.
    fn channels(&self) -> u32;

    /// Write exactly `frames * channels()` interleaved samples to the front
    /// of `buffer`.
    ///
    /// # Panics
    /// If `buffer` holds fewer than `frames * channels()` samples.
    fn generate(&mut self, buffer: &mut [f32], frames: usize);

    /// Fill as many whole frames as `buffer` holds.
    #[inline]
    fn render(&mut self, buffer: &mut [f32]) {
        let frames = buffer.len() / self.channels() as usize;
        self.generate(buffer, frames);
    }
}

/// Copy one mono sample to every channel of a frame.
#[inline]
pub fn write_frame(frame: &mut [f32], sample: f32) {
    for ch in frame.iter_mut() {
        *ch = sample;
    }
}
