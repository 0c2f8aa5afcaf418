//! Per-tile streaming state.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};
use tessera_lod::ChunkBounds;
use tessera_mesh::MeshData;
use tessera_terrain::{ChunkCoord, HeightGrid, HeightRange};

/// Progress of a chunk's height grid.
#[derive(Clone, Debug, Default)]
pub enum HeightState {
    #[default]
    NotRequested,
    Requested,
    Received {
        grid: Arc<HeightGrid>,
        range: HeightRange,
    },
}

/// Cache slot for one LOD table row.
#[derive(Clone, Debug, Default)]
pub enum MeshSlot {
    #[default]
    NotRequested,
    Requested,
    Ready(Arc<MeshData>),
}

impl MeshSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, MeshSlot::Ready(_))
    }
}

/// One terrain tile.
///
/// Chunks are never evicted: grids and meshes stay cached for the session so
/// revisiting an area reuses them.
#[derive(Debug)]
pub struct Chunk {
    pub(crate) coord: ChunkCoord,
    pub(crate) bounds: ChunkBounds,
    pub(crate) height: HeightState,
    /// One slot per LOD table row, shared by the render and collision tracks.
    pub(crate) meshes: Vec<MeshSlot>,
    pub(crate) assigned_lod: Option<usize>,
    pub(crate) collision_assigned: bool,
    pub(crate) visible: bool,
}

impl Chunk {
    pub(crate) fn new(coord: ChunkCoord, chunk_size: f32, lod_count: usize) -> Self {
        let center = Vec2::new(coord.x as f32, coord.y as f32) * chunk_size;
        Self {
            coord,
            bounds: ChunkBounds::new(center, chunk_size),
            height: HeightState::NotRequested,
            meshes: vec![MeshSlot::NotRequested; lod_count],
            assigned_lod: None,
            collision_assigned: false,
            visible: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Footprint on the terrain plane, in terrain units.
    pub fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    pub fn height_state(&self) -> &HeightState {
        &self.height
    }

    /// The height grid, once received.
    pub fn height_grid(&self) -> Option<&Arc<HeightGrid>> {
        match &self.height {
            HeightState::Received { grid, .. } => Some(grid),
            _ => None,
        }
    }

    pub fn height_range(&self) -> Option<HeightRange> {
        match &self.height {
            HeightState::Received { range, .. } => Some(*range),
            _ => None,
        }
    }

    /// Cache slot for LOD table row `index`.
    pub fn mesh_slot(&self, index: usize) -> Option<&MeshSlot> {
        self.meshes.get(index)
    }

    /// Row whose mesh is currently displayed.
    pub fn assigned_lod(&self) -> Option<usize> {
        self.assigned_lod
    }

    pub fn has_collision_mesh(&self) -> bool {
        self.collision_assigned
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Model-to-world transform: footprint centre scaled uniformly.
    pub fn world_transform(&self, uniform_scale: f32) -> Mat4 {
        let center = self.bounds.center;
        Mat4::from_scale_rotation_translation(
            Vec3::splat(uniform_scale),
            Quat::IDENTITY,
            Vec3::new(center.x, 0.0, center.y) * uniform_scale,
        )
    }
}
