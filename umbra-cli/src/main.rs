//! Umbra CLI — real-time player and offline renderer for the drone.

mod play;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use umbra_engine::{DroneConfig, Mood};

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Procedural ambient drone player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio output devices
    ListDevices,

    /// Play the drone on an output device; the main thread acts as the game loop
    Play(play::PlayArgs),

    /// Render the drone to a WAV file with simulated control ticks
    Render(render::RenderArgs),
}

/// Options shared by `play` and `render`.
#[derive(Args, Debug)]
pub struct DroneArgs {
    /// TOML file with a drone config (missing keys use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mood preset: neutral, tension, triumph or slumber
    #[arg(long)]
    mood: Option<Mood>,

    /// Seed for the wind noise
    #[arg(long)]
    seed: Option<u64>,
}

impl DroneArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve(&self) -> Result<DroneConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => DroneConfig::default(),
        };
        if self.mood.is_some() {
            cfg.mood = self.mood;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        Ok(cfg)
    }
}

fn load_config(path: &Path) -> Result<DroneConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListDevices => play::list_output_devices(),
        Commands::Play(args) => play::run(args),
        Commands::Render(args) => render::run(args),
    }
}
