//! Generation backends: where height and mesh requests go, and how their
//! results come back to the streamer.

use std::sync::Arc;

use tessera_config::StreamingConfig;
use tessera_mesh::{MeshData, MeshSettings, MeshingPipeline, MeshingTask};
use tessera_terrain::{AsyncHeightGenerator, ChunkCoord, HeightGrid, HeightRange, HeightSource};

/// A finished request, delivered back to the main context.
#[derive(Clone, Debug)]
pub enum Completion {
    Height {
        coord: ChunkCoord,
        grid: Arc<HeightGrid>,
        range: HeightRange,
    },
    Mesh {
        coord: ChunkCoord,
        slot: usize,
        mesh: Arc<MeshData>,
    },
}

impl Completion {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Completion::Height { coord, .. } | Completion::Mesh { coord, .. } => *coord,
        }
    }
}

/// Fire-and-forget request sink.
///
/// Requests return `false` when they were not accepted (queue full, workers
/// gone); the streamer then treats the request as never issued.
pub trait GenerationBackend {
    fn request_height(&mut self, coord: ChunkCoord) -> bool;

    /// Build the mesh for LOD table row `slot` at detail level `lod`.
    fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        slot: usize,
        lod: u32,
        grid: Arc<HeightGrid>,
    ) -> bool;

    /// Results finished since the last call.
    fn drain_completions(&mut self) -> Vec<Completion> {
        Vec::new()
    }
}

/// Thread-pool backend: a height generator and a meshing pipeline.
pub struct WorkerBackend {
    heights: AsyncHeightGenerator,
    meshes: MeshingPipeline,
}

impl WorkerBackend {
    /// Spawn both pools. Zero worker counts pick a CPU-based default.
    pub fn new<S: HeightSource + 'static>(
        source: Arc<S>,
        mesh_settings: Arc<MeshSettings>,
        config: &StreamingConfig,
    ) -> std::io::Result<Self> {
        let workers = |configured: usize| {
            if configured == 0 {
                AsyncHeightGenerator::default_thread_count()
            } else {
                configured
            }
        };
        let height_workers = workers(config.height_workers);
        let mesh_workers = workers(config.mesh_workers);
        tracing::info!(
            "starting {height_workers} height workers and {mesh_workers} mesh workers (max {} in flight)",
            config.max_in_flight
        );
        Ok(Self {
            heights: AsyncHeightGenerator::new(source, height_workers, config.max_in_flight)?,
            meshes: MeshingPipeline::new(mesh_workers, config.max_in_flight, mesh_settings)?,
        })
    }

    /// Requests queued or executing across both pools.
    pub fn in_flight(&self) -> usize {
        self.heights.in_flight_count() as usize + self.meshes.in_flight_count()
    }
}

impl GenerationBackend for WorkerBackend {
    fn request_height(&mut self, coord: ChunkCoord) -> bool {
        self.heights.submit(coord)
    }

    fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        slot: usize,
        lod: u32,
        grid: Arc<HeightGrid>,
    ) -> bool {
        self.meshes.submit(MeshingTask {
            coord,
            slot,
            lod,
            grid,
        })
    }

    fn drain_completions(&mut self) -> Vec<Completion> {
        let heights = self.heights.drain_results().into_iter().map(|g| {
            tracing::trace!("chunk {} heights generated in {}us", g.coord, g.generation_time_us);
            Completion::Height {
                coord: g.coord,
                grid: Arc::new(g.grid),
                range: g.range,
            }
        });
        let meshes = self.meshes.drain_results().into_iter().map(|m| {
            tracing::trace!("chunk {} slot {} meshed in {}us", m.coord, m.slot, m.build_time_us);
            Completion::Mesh {
                coord: m.coord,
                slot: m.slot,
                mesh: Arc::new(m.mesh),
            }
        });
        heights.chain(meshes).collect()
    }
}
