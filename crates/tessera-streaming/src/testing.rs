//! Recording test doubles for the backend and surface seams.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use tessera_mesh::{MeshData, MeshSettings};
use tessera_terrain::{ChunkCoord, HeightGrid};

use crate::backend::{Completion, GenerationBackend};
use crate::surface::TerrainSurface;

/// A mesh request as the backend received it.
#[derive(Clone, Debug)]
pub struct MeshRequest {
    pub coord: ChunkCoord,
    pub slot: usize,
    pub lod: u32,
    pub grid: Arc<HeightGrid>,
}

/// Records accepted requests and hands back whatever completions a test
/// pushes into `completions`.
#[derive(Debug)]
pub struct RecordingBackend {
    pub height_requests: Vec<ChunkCoord>,
    pub mesh_requests: Vec<MeshRequest>,
    /// When `false`, every request is refused.
    pub accept: bool,
    pub completions: Vec<Completion>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            height_requests: Vec::new(),
            mesh_requests: Vec::new(),
            accept: true,
            completions: Vec::new(),
        }
    }
}

impl RecordingBackend {
    /// Mesh requests recorded for `coord`.
    pub fn mesh_requests_for(&self, coord: ChunkCoord) -> Vec<&MeshRequest> {
        self.mesh_requests.iter().filter(|r| r.coord == coord).collect()
    }

    /// Build every recorded mesh request synchronously.
    pub fn build_requested(&self, settings: &MeshSettings) -> Vec<Completion> {
        self.mesh_requests
            .iter()
            .filter_map(|r| {
                let mesh = settings.build(&r.grid, r.lod).ok()?;
                Some(Completion::Mesh {
                    coord: r.coord,
                    slot: r.slot,
                    mesh: Arc::new(mesh),
                })
            })
            .collect()
    }
}

impl GenerationBackend for RecordingBackend {
    fn request_height(&mut self, coord: ChunkCoord) -> bool {
        if self.accept {
            self.height_requests.push(coord);
        }
        self.accept
    }

    fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        slot: usize,
        lod: u32,
        grid: Arc<HeightGrid>,
    ) -> bool {
        if self.accept {
            self.mesh_requests.push(MeshRequest {
                coord,
                slot,
                lod,
                grid,
            });
        }
        self.accept
    }

    fn drain_completions(&mut self) -> Vec<Completion> {
        std::mem::take(&mut self.completions)
    }
}

/// Surface calls in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created(ChunkCoord),
    Visibility(ChunkCoord, bool),
    Render(ChunkCoord, usize),
    Collision(ChunkCoord),
}

/// Records every surface call and keeps the latest mesh per chunk.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub created: Vec<ChunkCoord>,
    pub render: FxHashMap<ChunkCoord, (usize, Arc<MeshData>)>,
    pub collision: FxHashMap<ChunkCoord, Arc<MeshData>>,
    pub events: Vec<SurfaceEvent>,
}

impl TerrainSurface for RecordingSurface {
    fn chunk_created(&mut self, coord: ChunkCoord, _transform: Mat4) {
        self.created.push(coord);
        self.events.push(SurfaceEvent::Created(coord));
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        self.events.push(SurfaceEvent::Visibility(coord, visible));
    }

    fn set_render_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: Arc<MeshData>) {
        self.render.insert(coord, (lod_index, mesh));
        self.events.push(SurfaceEvent::Render(coord, lod_index));
    }

    fn set_collision_mesh(&mut self, coord: ChunkCoord, mesh: Arc<MeshData>) {
        self.collision.insert(coord, mesh);
        self.events.push(SurfaceEvent::Collision(coord));
    }
}

/// A level grid of side `size`.
pub fn flat_grid(size: usize) -> HeightGrid {
    HeightGrid::new(size, vec![0.5; size * size]).expect("test grid size must be at least 3")
}
