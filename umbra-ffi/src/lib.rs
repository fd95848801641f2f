//! C ABI wrapper for the Umbra drone.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handles (heap-allocated; free with the matching `*_destroy`):
//!   - `UmbraSynth`: control and render on one handle, for single-threaded hosts.
//!   - `UmbraControl` / `UmbraVoice`: the two halves from `umbra_split`.
//! - `*_generate` writes `frames * channels` interleaved `f32` samples.
//! - Null handles are ignored; getters return 0 / false.
//!
//! Threading
//! - A `UmbraSynth` must be used from one thread at a time.
//! - After `umbra_split`, the game thread owns the `UmbraControl` and the
//!   audio callback owns the `UmbraVoice`. They share only atomics, so
//!   neither side ever waits on the other and no host lock is needed.

use std::ptr;
use std::slice;

use umbra_engine::{AudioGenerator, DroneControl, DroneVoice, EnvelopeState, Mood, Synthesizer};

/// Opaque synthesizer handed to C.
pub struct UmbraSynth {
    inner: Synthesizer,
}

/// Control half: lifecycle, fades, parameters, moods.
pub struct UmbraControl {
    inner: DroneControl,
}

/// Render half: fills audio buffers.
pub struct UmbraVoice {
    inner: DroneVoice,
}

fn state_code(s: EnvelopeState) -> u32 {
    match s {
        EnvelopeState::Idle => 0,
        EnvelopeState::FadingIn => 1,
        EnvelopeState::Steady => 2,
        EnvelopeState::FadingOut => 3,
        EnvelopeState::Stopped => 4,
    }
}

#[inline]
fn with_ref<T, U>(handle: *const T, default: U, f: impl FnOnce(&T) -> U) -> U {
    // SAFETY: non-null handles come from this crate and are not yet destroyed.
    match unsafe { handle.as_ref() } {
        Some(h) => f(h),
        None => default,
    }
}

#[inline]
fn with_mut<T, U>(handle: *mut T, default: U, f: impl FnOnce(&mut T) -> U) -> U {
    // SAFETY: as above; the owning thread has exclusive access for the call.
    match unsafe { handle.as_mut() } {
        Some(h) => f(h),
        None => default,
    }
}

/// Shared body of the two generate entry points.
fn generate_into<G: AudioGenerator>(gen: &mut G, buffer: *mut f32, frames: u32) -> u32 {
    if buffer.is_null() || frames == 0 {
        return 0;
    }
    let frames = frames as usize;
    let len = frames * gen.channels() as usize;
    // SAFETY: caller provides room for `frames * channels` samples.
    let out = unsafe { slice::from_raw_parts_mut(buffer, len) };
    gen.generate(out, frames);
    frames as u32
}

fn set_mood_code(control: &mut DroneControl, mood: u32) -> bool {
    match Mood::ALL.get(mood as usize) {
        Some(&m) => {
            control.set_mood(m);
            true
        }
        None => false,
    }
}

#[inline]
fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

#[inline]
fn destroy<T>(handle: *mut T) {
    if !handle.is_null() {
        // SAFETY: pointer came from `into_handle` and is destroyed once.
        unsafe { drop(Box::from_raw(handle)) };
    }
}

// --- Creation / destruction -------------------------------------------------------

/// Create a synthesizer with entropy-seeded wind noise.
/// Returns null if `sample_rate` or `channels` is zero.
#[no_mangle]
pub extern "C" fn umbra_create(sample_rate: u32, channels: u32) -> *mut UmbraSynth {
    if sample_rate == 0 || channels == 0 {
        return ptr::null_mut();
    }
    into_handle(UmbraSynth { inner: Synthesizer::new(sample_rate, channels) })
}

/// Like `umbra_create`, with reproducible wind noise.
#[no_mangle]
pub extern "C" fn umbra_create_seeded(sample_rate: u32, channels: u32, seed: u64) -> *mut UmbraSynth {
    if sample_rate == 0 || channels == 0 {
        return ptr::null_mut();
    }
    into_handle(UmbraSynth { inner: Synthesizer::with_seed(sample_rate, channels, seed) })
}

/// Destroy a handle from `umbra_create*`. Null is a no-op.
#[no_mangle]
pub extern "C" fn umbra_destroy(synth: *mut UmbraSynth) {
    destroy(synth);
}

/// Split `synth` into a control half and a render half.
///
/// On success `synth` is consumed (do not destroy or use it again), both
/// out-pointers are filled and `true` is returned. On a null argument
/// nothing changes and `false` is returned.
#[no_mangle]
pub extern "C" fn umbra_split(
    synth: *mut UmbraSynth,
    out_control: *mut *mut UmbraControl,
    out_voice: *mut *mut UmbraVoice,
) -> bool {
    if synth.is_null() || out_control.is_null() || out_voice.is_null() {
        return false;
    }
    // SAFETY: checked non-null; ownership moves out of the C handle here.
    let synth = unsafe { Box::from_raw(synth) };
    let (control, voice) = synth.inner.split();
    // SAFETY: checked non-null; caller provides writable slots.
    unsafe {
        *out_control = into_handle(UmbraControl { inner: control });
        *out_voice = into_handle(UmbraVoice { inner: voice });
    }
    true
}

#[no_mangle]
pub extern "C" fn umbra_control_destroy(control: *mut UmbraControl) {
    destroy(control);
}

#[no_mangle]
pub extern "C" fn umbra_voice_destroy(voice: *mut UmbraVoice) {
    destroy(voice);
}

// --- Single-handle API ------------------------------------------------------------

#[no_mangle]
pub extern "C" fn umbra_start(synth: *mut UmbraSynth) {
    with_mut(synth, (), |s| s.inner.start());
}

#[no_mangle]
pub extern "C" fn umbra_stop(synth: *mut UmbraSynth) {
    with_mut(synth, (), |s| s.inner.stop());
}

/// Advance fades and mood glides by `delta_seconds`.
#[no_mangle]
pub extern "C" fn umbra_update(synth: *mut UmbraSynth, delta_seconds: f32) {
    with_mut(synth, (), |s| s.inner.update(delta_seconds));
}

/// Fill `frames * channels` interleaved samples.
///
/// Returns the number of frames written (0 on a null argument).
#[no_mangle]
pub extern "C" fn umbra_generate(synth: *mut UmbraSynth, buffer: *mut f32, frames: u32) -> u32 {
    with_mut(synth, 0, |s| generate_into(&mut s.inner, buffer, frames))
}

#[no_mangle]
pub extern "C" fn umbra_set_intensity(synth: *mut UmbraSynth, intensity: f32) {
    with_mut(synth, (), |s| s.inner.set_intensity(intensity));
}

#[no_mangle]
pub extern "C" fn umbra_set_tension(synth: *mut UmbraSynth, tension: f32) {
    with_mut(synth, (), |s| s.inner.set_tension(tension));
}

#[no_mangle]
pub extern "C" fn umbra_set_base_frequency(synth: *mut UmbraSynth, hz: f32) {
    with_mut(synth, (), |s| s.inner.set_base_frequency(hz));
}

#[no_mangle]
pub extern "C" fn umbra_set_wind_enabled(synth: *mut UmbraSynth, enabled: bool) {
    with_mut(synth, (), |s| s.inner.set_wind_enabled(enabled));
}

/// Glide to a mood preset (`UMBRA_MOOD_*`). Returns false for an unknown code.
#[no_mangle]
pub extern "C" fn umbra_set_mood(synth: *mut UmbraSynth, mood: u32) -> bool {
    with_mut(synth, false, |s| set_mood_code(s.inner.control_mut(), mood))
}

#[no_mangle]
pub extern "C" fn umbra_get_intensity(synth: *const UmbraSynth) -> f32 {
    with_ref(synth, 0.0, |s| s.inner.intensity())
}

#[no_mangle]
pub extern "C" fn umbra_get_tension(synth: *const UmbraSynth) -> f32 {
    with_ref(synth, 0.0, |s| s.inner.tension())
}

#[no_mangle]
pub extern "C" fn umbra_get_base_frequency(synth: *const UmbraSynth) -> f32 {
    with_ref(synth, 0.0, |s| s.inner.base_frequency())
}

#[no_mangle]
pub extern "C" fn umbra_get_wind_enabled(synth: *const UmbraSynth) -> bool {
    with_ref(synth, false, |s| s.inner.wind_enabled())
}

#[no_mangle]
pub extern "C" fn umbra_envelope(synth: *const UmbraSynth) -> f32 {
    with_ref(synth, 0.0, |s| s.inner.envelope())
}

/// Current envelope state as `UMBRA_STATE_*`.
#[no_mangle]
pub extern "C" fn umbra_state(synth: *const UmbraSynth) -> u32 {
    with_ref(synth, 0, |s| state_code(s.inner.state()))
}

#[no_mangle]
pub extern "C" fn umbra_channels(synth: *const UmbraSynth) -> u32 {
    with_ref(synth, 0, |s| s.inner.channels())
}

// --- Control half -----------------------------------------------------------------

#[no_mangle]
pub extern "C" fn umbra_control_start(control: *mut UmbraControl) {
    with_mut(control, (), |c| c.inner.start());
}

#[no_mangle]
pub extern "C" fn umbra_control_stop(control: *mut UmbraControl) {
    with_mut(control, (), |c| c.inner.stop());
}

#[no_mangle]
pub extern "C" fn umbra_control_update(control: *mut UmbraControl, delta_seconds: f32) {
    with_mut(control, (), |c| c.inner.update(delta_seconds));
}

#[no_mangle]
pub extern "C" fn umbra_control_set_intensity(control: *mut UmbraControl, intensity: f32) {
    with_mut(control, (), |c| c.inner.set_intensity(intensity));
}

#[no_mangle]
pub extern "C" fn umbra_control_set_tension(control: *mut UmbraControl, tension: f32) {
    with_mut(control, (), |c| c.inner.set_tension(tension));
}

#[no_mangle]
pub extern "C" fn umbra_control_set_base_frequency(control: *mut UmbraControl, hz: f32) {
    with_mut(control, (), |c| c.inner.set_base_frequency(hz));
}

#[no_mangle]
pub extern "C" fn umbra_control_set_wind_enabled(control: *mut UmbraControl, enabled: bool) {
    with_mut(control, (), |c| c.inner.set_wind_enabled(enabled));
}

#[no_mangle]
pub extern "C" fn umbra_control_set_mood(control: *mut UmbraControl, mood: u32) -> bool {
    with_mut(control, false, |c| set_mood_code(&mut c.inner, mood))
}

#[no_mangle]
pub extern "C" fn umbra_control_get_intensity(control: *const UmbraControl) -> f32 {
    with_ref(control, 0.0, |c| c.inner.intensity())
}

#[no_mangle]
pub extern "C" fn umbra_control_get_tension(control: *const UmbraControl) -> f32 {
    with_ref(control, 0.0, |c| c.inner.tension())
}

#[no_mangle]
pub extern "C" fn umbra_control_get_base_frequency(control: *const UmbraControl) -> f32 {
    with_ref(control, 0.0, |c| c.inner.base_frequency())
}

#[no_mangle]
pub extern "C" fn umbra_control_get_wind_enabled(control: *const UmbraControl) -> bool {
    with_ref(control, false, |c| c.inner.wind_enabled())
}

#[no_mangle]
pub extern "C" fn umbra_control_envelope(control: *const UmbraControl) -> f32 {
    with_ref(control, 0.0, |c| c.inner.envelope())
}

#[no_mangle]
pub extern "C" fn umbra_control_state(control: *const UmbraControl) -> u32 {
    with_ref(control, 0, |c| state_code(c.inner.state()))
}

// --- Render half ------------------------------------------------------------------

/// Audio-thread entry point: never blocks on the control thread.
#[no_mangle]
pub extern "C" fn umbra_voice_generate(voice: *mut UmbraVoice, buffer: *mut f32, frames: u32) -> u32 {
    with_mut(voice, 0, |v| generate_into(&mut v.inner, buffer, frames))
}

#[no_mangle]
pub extern "C" fn umbra_voice_channels(voice: *const UmbraVoice) -> u32 {
    with_ref(voice, 0, |v| v.inner.channels())
}

// ------------------------------------ Tests --------------------------------------
