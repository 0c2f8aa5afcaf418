//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE: &str = "terrain.ron";

/// Top-level streamer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mesh shape and world scale.
    pub terrain: TerrainConfig,
    /// Height sample generation.
    pub noise: NoiseConfig,
    /// Level-of-detail table.
    pub lod: LodConfig,
    /// Viewer hysteresis and worker pools.
    pub streaming: StreamingConfig,
    /// Height-layer material parameters.
    pub materials: MaterialsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain mesh configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side length of a chunk's core sample grid. Bordered grids carry two
    /// extra samples per axis and neighbouring tiles are spaced
    /// `map_chunk_size - 1` terrain units apart. Every LOD stride must divide
    /// `map_chunk_size - 1`.
    pub map_chunk_size: u32,
    /// World units per terrain unit, applied uniformly on all axes.
    pub uniform_scale: f32,
    /// Vertical scale applied after the height curve.
    pub height_multiplier: f32,
    /// Height curve keyframes as `(sample, output)` pairs.
    pub height_curve: Vec<(f32, f32)>,
    /// Emit unshared vertices with per-face normals.
    pub flat_shading: bool,
}

/// How raw noise is normalised into the `[0, 1]` sample range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Normalise against the min/max of the generated grid. Tiles will not line up.
    Local,
    /// Normalise against the theoretical amplitude. Seamless across tiles.
    Global,
}

/// Island falloff shaping parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FalloffConfig {
    /// Curve steepness exponent.
    pub a: f32,
    /// Curve shift.
    pub b: f32,
}

/// Height sample generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// World seed.
    pub seed: u64,
    /// Horizontal scale of the broadest features, in terrain units.
    pub scale: f64,
    /// Number of noise octaves.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Constant offset added to every sample coordinate.
    pub offset: (f64, f64),
    /// Normalisation strategy.
    pub normalize_mode: NormalizeMode,
    /// Optional island falloff.
    pub falloff: Option<FalloffConfig>,
}

/// One row of the level-of-detail table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LodLevelConfig {
    /// Mesh detail level; stride is 1 for 0, otherwise `2 * lod`.
    pub lod: u32,
    /// Maximum viewer distance, in terrain units, at which this row applies.
    pub visible_distance_threshold: f32,
    /// Whether meshes of this row also serve as colliders.
    pub use_for_collider: bool,
}

/// Level-of-detail table configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Rows ordered from nearest to farthest.
    pub levels: Vec<LodLevelConfig>,
}

/// Streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Distance the viewer must travel before visible chunks are recomputed.
    pub viewer_move_threshold: f32,
    /// Height generation worker threads (0 = derive from CPU count).
    pub height_workers: usize,
    /// Mesh building worker threads (0 = derive from CPU count).
    pub mesh_workers: usize,
    /// Maximum queued requests per worker pool.
    pub max_in_flight: usize,
}

/// A single height-banded texture layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerConfig {
    /// Human-readable layer name, also used to look up its texture.
    pub name: String,
    /// Linear RGB tint.
    pub tint: [f32; 3],
    /// How strongly the tint replaces the texture (0..1).
    pub tint_strength: f32,
    /// Normalised height at which this layer begins (0..1).
    pub start_height: f32,
    /// Blend width with the layer below (0..1).
    pub blend_strength: f32,
    /// Texture tiling scale.
    pub texture_scale: f32,
}

/// Height-layer material configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialsConfig {
    /// Layers ordered from lowest to highest.
    pub layers: Vec<LayerConfig>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map_chunk_size: 121,
            uniform_scale: 2.0,
            height_multiplier: 30.0,
            height_curve: vec![(0.0, 0.0), (0.4, 0.1), (1.0, 1.0)],
            flat_shading: false,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 60.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
            normalize_mode: NormalizeMode::Global,
            falloff: None,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                LodLevelConfig {
                    lod: 0,
                    visible_distance_threshold: 150.0,
                    use_for_collider: true,
                },
                LodLevelConfig {
                    lod: 1,
                    visible_distance_threshold: 300.0,
                    use_for_collider: false,
                },
                LodLevelConfig {
                    lod: 2,
                    visible_distance_threshold: 450.0,
                    use_for_collider: false,
                },
                LodLevelConfig {
                    lod: 4,
                    visible_distance_threshold: 600.0,
                    use_for_collider: false,
                },
            ],
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            viewer_move_threshold: 25.0,
            height_workers: 0,
            mesh_workers: 0,
            max_in_flight: 256,
        }
    }
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        let layer = |name: &str, tint: [f32; 3], start_height: f32, blend_strength: f32| {
            LayerConfig {
                name: name.to_string(),
                tint,
                tint_strength: 0.3,
                start_height,
                blend_strength,
                texture_scale: 10.0,
            }
        };
        Self {
            layers: vec![
                layer("water", [0.15, 0.35, 0.75], 0.0, 0.0),
                layer("sand", [0.85, 0.8, 0.55], 0.1, 0.05),
                layer("grass", [0.3, 0.6, 0.2], 0.2, 0.1),
                layer("rock", [0.45, 0.4, 0.38], 0.55, 0.1),
                layer("snow", [0.95, 0.95, 0.97], 0.8, 0.08),
            ],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `terrain.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
