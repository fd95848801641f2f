//! `umbra render`: offline render to a 32-bit float WAV.
//!
//! Control ticks are simulated: every tick renders `tick_ms` worth of frames
//! and then advances the envelope by the same amount of time, so the file
//! sounds like a live session driven at that frame rate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use umbra_engine::{AudioGenerator, EnvelopeState, Synthesizer};

use crate::DroneArgs;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    drone: DroneArgs,

    /// Output WAV path
    #[arg(long, short)]
    out: PathBuf,

    /// Time at which the fade-out begins, in seconds
    #[arg(long, default_value_t = 20.0)]
    seconds: f32,

    /// Simulated control tick, in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    tick_ms: f32,

    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    channels: Option<u16>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut cfg = args.drone.resolve()?;
    if let Some(sr) = args.sample_rate {
        cfg.sample_rate = sr;
    }
    if let Some(ch) = args.channels {
        cfg.channels = u32::from(ch);
    }

    let mut synth = Synthesizer::from_config(&cfg).context("invalid drone config")?;
    let channels = u16::try_from(cfg.channels).context("too many channels for WAV")?;

    let spec = hound::WavSpec {
        channels,
        sample_rate: cfg.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.out, spec)
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    let sr = cfg.sample_rate as f32;
    let tick_frames = ((args.tick_ms.max(0.1) / 1000.0) * sr).round().max(1.0) as usize;
    let tick_seconds = tick_frames as f32 / sr;
    let stop_at = (args.seconds.max(0.0) * sr) as usize;

    info!(
        out = %args.out.display(),
        sample_rate = cfg.sample_rate,
        channels,
        tick_frames,
        mood = %synth.mood(),
        "rendering"
    );

    let mut buf = vec![0.0_f32; tick_frames * usize::from(channels)];
    let mut written = 0usize;
    synth.start();

    loop {
        if written >= stop_at && synth.state() != EnvelopeState::FadingOut {
            if synth.state() == EnvelopeState::Stopped {
                break;
            }
            synth.stop();
        }

        synth.generate(&mut buf, tick_frames);
        for &s in &buf {
            writer.write_sample(s)?;
        }
        written += tick_frames;
        synth.update(tick_seconds);
    }

    writer.finalize().context("failed to finalize WAV")?;
    info!(frames = written, seconds = written as f32 / sr, "done");
    Ok(())
}
