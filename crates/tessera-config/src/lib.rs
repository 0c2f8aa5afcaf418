//! Configuration system for the tessera terrain streamer.
//!
//! Settings persist to disk as RON files, tolerate missing and unknown fields,
//! and can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, FalloffConfig, LayerConfig, LodConfig, LodLevelConfig,
    MaterialsConfig, NoiseConfig, NormalizeMode, StreamingConfig, TerrainConfig,
};
pub use error::ConfigError;
