//! Command-line argument parsing for the terrain streamer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain streamer command-line arguments.
///
/// CLI values override settings loaded from `terrain.ron`.
#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Tiled LOD terrain streamer")]
pub struct CliArgs {
    /// World seed for height generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Core chunk size in height samples.
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of simulated update ticks.
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,

    /// Viewer speed in world units per tick.
    #[arg(long, default_value_t = 4.0)]
    pub speed: f32,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(size) = args.chunk_size {
            self.terrain.map_chunk_size = size;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
