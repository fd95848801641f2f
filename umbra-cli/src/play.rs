//! `umbra play`: cpal output stream on the audio thread, control loop on main.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};
use umbra_engine::params::AtomicF32;
use umbra_engine::{AudioGenerator, DroneControl, EnvelopeState, Mood, Synthesizer};

use crate::DroneArgs;

/// Control loop rate, like a game's frame rate.
const TICK: Duration = Duration::from_micros(16_667);

/// Frames rendered per pass through the scratch buffer in the callback.
const SCRATCH_FRAMES: usize = 1024;

/// How long a danger event holds the tension mood.
const DANGER_HOLD: Duration = Duration::from_secs(6);

#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    drone: DroneArgs,

    /// Output device name (see `list-devices`)
    #[arg(long)]
    device: Option<String>,

    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    channels: Option<u16>,

    /// Fade out and exit after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Switch to the tension mood for a few seconds at this interval, in seconds
    #[arg(long)]
    danger_every: Option<u64>,
}

pub fn list_output_devices() -> Result<()> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices()? {
            if d.name()? == name {
                return Ok(d);
            }
        }
        bail!("requested device not found: {name}");
    }
    host.default_output_device()
        .ok_or_else(|| anyhow!("no default output device"))
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig> {
    // If nothing requested, default is already concrete.
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // Pick a SupportedStreamConfigRange first.
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch = range.channels();
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = req_ch.map_or(0, |c| u64::from(ch.abs_diff(c)));
        let sr_pen = match req_sr {
            Some(sr) if !(sr_min..=sr_max).contains(&sr) => {
                u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr)))
            }
            _ => 0,
        };

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| anyhow!("no supported output configs"))?;

    // Choose a concrete sample rate and convert the range into a concrete config.
    let pick_sr = match req_sr {
        Some(sr) => {
            let lo = range.min_sample_rate().0;
            let hi = range.max_sample_rate().0;
            cpal::SampleRate(sr.clamp(lo, hi))
        }
        None => range.max_sample_rate(),
    };

    Ok(range.with_sample_rate(pick_sr))
}

/// Block peak published by the callback, drained by the control loop.
#[derive(Debug)]
struct PeakMeter(AtomicF32);

impl PeakMeter {
    fn new() -> Self {
        Self(AtomicF32::new(0.0))
    }

    /// Audio thread; single writer.
    #[inline]
    fn observe(&self, block: &[f32]) {
        let peak = block.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        if peak > self.0.load() {
            self.0.store(peak);
        }
    }

    fn take(&self) -> f32 {
        self.0.swap(0.0)
    }
}

fn build_stream<T, G>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut voice: G,
    meter: Arc<PeakMeter>,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
    G: AudioGenerator + Send + 'static,
{
    let channels = cfg.channels as usize;
    // allocated here, never inside the callback
    let mut scratch = vec![0.0_f32; SCRATCH_FRAMES * channels];

    let err_fn = |e: cpal::StreamError| error!("stream error: {e}");

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            for chunk in output.chunks_mut(scratch.len()) {
                let block = &mut scratch[..chunk.len()];
                voice.render(block);
                for (o, &s) in chunk.iter_mut().zip(block.iter()) {
                    *o = T::from_sample(s);
                }
                meter.observe(block);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

pub fn run(args: PlayArgs) -> Result<()> {
    let device = pick_device(args.device.as_deref())?;
    let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    let cfg = sup_cfg.config();

    let mut drone_cfg = args.drone.resolve()?;
    drone_cfg.sample_rate = cfg.sample_rate.0;
    drone_cfg.channels = u32::from(cfg.channels);

    let synth = Synthesizer::from_config(&drone_cfg).context("invalid drone config")?;
    let (control, voice) = synth.split();
    let meter = Arc::new(PeakMeter::new());

    let device_name = device.name()?;
    info!(device = %device_name, ?cfg, ?sample_format, mood = %control.mood(), "opening stream");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32, _>(&device, &cfg, voice, meter.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16, _>(&device, &cfg, voice, meter.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16, _>(&device, &cfg, voice, meter.clone())?,
        other => bail!("unsupported device sample format: {other:?}"),
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler({
        let interrupted = interrupted.clone();
        move || interrupted.store(true, Ordering::SeqCst)
    })
    .context("failed to install Ctrl+C handler")?;

    stream.play()?;
    if args.duration.is_none() {
        info!("press Ctrl+C to fade out and stop");
    }

    game_loop(
        control,
        &meter,
        &interrupted,
        args.duration.map(Duration::from_secs),
        args.danger_every.map(Duration::from_secs),
    );
    Ok(())
}

/// Tick the controller at a fixed rate until the drone has faded out.
fn game_loop(
    mut control: DroneControl,
    meter: &PeakMeter,
    interrupted: &AtomicBool,
    duration: Option<Duration>,
    danger_every: Option<Duration>,
) {
    let started = Instant::now();
    let mut last = started;
    let mut last_meter = started;
    let mut stopping = false;

    let calm_mood = control.mood();
    let mut next_danger = danger_every.map(|every| started + every);
    let mut danger_until: Option<Instant> = None;

    control.start();

    loop {
        thread::sleep(TICK);
        let now = Instant::now();
        control.update((now - last).as_secs_f32());
        last = now;

        if let (Some(at), Some(every)) = (next_danger, danger_every) {
            if now >= at && !stopping {
                control.set_mood(Mood::Tension);
                danger_until = Some(now + DANGER_HOLD);
                next_danger = Some(at + every);
                info!(mood = %Mood::Tension, "danger");
            }
        }
        if danger_until.is_some_and(|until| now >= until) {
            control.set_mood(calm_mood);
            danger_until = None;
            info!(mood = %calm_mood, "danger passed");
        }

        if !stopping && interrupted.load(Ordering::SeqCst) {
            control.stop();
            stopping = true;
            info!("interrupted, fading out");
        }
        if !stopping && duration.is_some_and(|d| now - started >= d) {
            control.stop();
            stopping = true;
            info!("fading out");
        }

        if now - last_meter >= Duration::from_secs(1) {
            info!(
                peak = format_args!("{:.3}", meter.take()),
                envelope = format_args!("{:.3}", control.envelope()),
                state = ?control.state(),
                "meter"
            );
            last_meter = now;
        }

        if stopping && control.state() == EnvelopeState::Stopped {
            info!("stopped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_engine::SharedParams;

    #[test]
    fn interrupt_fades_out_before_returning() {
        let control = DroneControl::new(0.1, Arc::new(SharedParams::default()));
        let params = control.params().clone();
        let interrupted = AtomicBool::new(true);

        game_loop(control, &PeakMeter::new(), &interrupted, None, None);

        assert!(!params.playing());
        assert_eq!(params.envelope(), 0.0);
    }

    #[test]
    fn meter_keeps_block_peak_until_taken() {
        let m = PeakMeter::new();
        m.observe(&[0.1, -0.6, 0.3]);
        m.observe(&[0.2]);
        assert_eq!(m.take(), 0.6);
        assert_eq!(m.take(), 0.0);
    }
}
