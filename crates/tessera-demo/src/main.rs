//! Headless driver for the terrain streamer.
//!
//! Configuration is loaded from `terrain.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p tessera-demo` to fly a viewer over the terrain and log
//! streaming statistics. Run with `cargo run -p tessera-demo -- --ticks 2000 --speed 8`
//! for a longer flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::{Mat4, Vec3};
use tessera_config::{CliArgs, Config};
use tessera_materials::{LayerTable, MaterialError};
use tessera_mesh::{MeshData, MeshError, MeshSettings};
use tessera_streaming::{
    ChunkStreamer, StreamerError, StreamerSettings, TerrainSurface, WorkerBackend,
    viewer_position,
};
use tessera_terrain::{ChunkCoord, HeightGridError, NoiseHeightSource};
use tracing::{error, info};

/// Anything that stops the streamer from starting.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("mesh settings: {0}")]
    Mesh(#[from] MeshError),
    #[error("streamer settings: {0}")]
    Streamer(#[from] StreamerError),
    #[error("height source: {0}")]
    Heights(#[from] HeightGridError),
    #[error("materials: {0}")]
    Materials(#[from] MaterialError),
    #[error("worker pools: {0}")]
    Workers(#[from] std::io::Error),
}

/// Counts what the streamer hands to the surface.
#[derive(Default)]
struct StatsSurface {
    created: usize,
    visible: usize,
    render_meshes: usize,
    render_vertices: usize,
    colliders: usize,
}

impl TerrainSurface for StatsSurface {
    fn chunk_created(&mut self, _coord: ChunkCoord, _transform: Mat4) {
        self.created += 1;
    }

    fn set_visible(&mut self, _coord: ChunkCoord, visible: bool) {
        if visible {
            self.visible += 1;
        } else {
            self.visible = self.visible.saturating_sub(1);
        }
    }

    fn set_render_mesh(&mut self, _coord: ChunkCoord, _lod_index: usize, mesh: Arc<MeshData>) {
        self.render_meshes += 1;
        self.render_vertices += mesh.vertex_count();
    }

    fn set_collision_mesh(&mut self, _coord: ChunkCoord, _mesh: Arc<MeshData>) {
        self.colliders += 1;
    }
}

type Streamer = ChunkStreamer<WorkerBackend, StatsSurface>;

fn build_streamer(config: &Config) -> Result<(Streamer, LayerTable), StartupError> {
    let mesh_settings = MeshSettings::from_config(&config.terrain)?;
    let settings = StreamerSettings::from_config(config)?;
    mesh_settings.validate(settings.bordered_size(), settings.lod_table().detail_levels())?;

    let uniform_scale = settings.uniform_scale();
    let mut layers = LayerTable::from_config(&config.materials)?;
    layers.update_mesh_heights(
        uniform_scale * mesh_settings.min_height(),
        uniform_scale * mesh_settings.max_height(),
    );

    let source = NoiseHeightSource::from_config(&config.noise, config.terrain.map_chunk_size as usize)?;
    let backend = WorkerBackend::new(Arc::new(source), Arc::new(mesh_settings), &config.streaming)?;

    info!(
        "chunk size {}, {} lod rows, view distance {}, radius {} chunks",
        settings.chunk_size(),
        settings.lod_table().len(),
        settings.max_view_distance(),
        settings.chunks_visible()
    );
    Ok((
        ChunkStreamer::new(settings, backend, StatsSurface::default()),
        layers,
    ))
}

/// Viewer world position at `tick`: a slow spiral outward from the origin.
fn flight_position(tick: u32, speed: f32) -> Vec3 {
    let t = tick as f32;
    let heading = t * 0.004;
    let radius = t * speed * 0.5;
    Vec3::new(radius * heading.cos(), 40.0, radius * heading.sin())
}

fn log_progress(tick: u32, streamer: &Streamer) {
    let stats = streamer.stats();
    let surface = streamer.surface();
    info!(
        "tick {tick}: {} chunks, {} visible, {} passes, {} height / {} mesh requests ({} rejected), {} in flight, {} colliders",
        streamer.chunk_count(),
        surface.visible,
        stats.passes,
        stats.height_requests,
        stats.mesh_requests,
        stats.rejected_requests,
        streamer.backend().in_flight(),
        surface.colliders,
    );
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("tessera"))
            .unwrap_or_else(|| PathBuf::from(".tessera"))
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let (mut streamer, layers) = match build_streamer(&config) {
        Ok(built) => built,
        Err(e) => {
            error!("configuration rejected, not streaming: {e}");
            std::process::exit(1);
        }
    };

    let params = layers.gpu_params();
    info!(
        "{} material layers, heights {:.1}..{:.1} ({} byte block)",
        params.layer_count,
        params.min_height,
        params.max_height,
        params.as_bytes().len()
    );

    let uniform_scale = streamer.settings().uniform_scale();
    let start = Instant::now();
    for tick in 0..args.ticks {
        let world = flight_position(tick, args.speed);
        streamer.on_viewer_moved(viewer_position(world, uniform_scale));
        streamer.process_completions();
        if tick % 60 == 0 {
            log_progress(tick, &streamer);
        }
        std::thread::sleep(Duration::from_millis(4));
    }

    // Let outstanding work land so the summary reflects the final position.
    let deadline = Instant::now() + Duration::from_secs(10);
    while streamer.backend().in_flight() > 0 && Instant::now() < deadline {
        streamer.process_completions();
        std::thread::sleep(Duration::from_millis(4));
    }
    streamer.process_completions();

    log_progress(args.ticks, &streamer);
    let surface = streamer.surface();
    info!(
        "flight finished in {:.2}s: {} chunks created, {} render meshes assigned ({} vertices)",
        start.elapsed().as_secs_f32(),
        surface.created,
        surface.render_meshes,
        surface.render_vertices
    );
}
