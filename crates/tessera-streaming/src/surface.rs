//! The render/collision consumer of finished chunk meshes.

use std::sync::Arc;

use glam::Mat4;
use tessera_mesh::MeshData;
use tessera_terrain::ChunkCoord;

/// Receives geometry and visibility for chunks. Setters only; nothing flows
/// back into the streamer.
pub trait TerrainSurface {
    /// A chunk entered the registry, placed at `transform` in world space.
    fn chunk_created(&mut self, coord: ChunkCoord, transform: Mat4) {
        let _ = (coord, transform);
    }

    /// Show or hide a chunk.
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);

    /// Display `mesh`, built for LOD table row `lod_index`.
    fn set_render_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: Arc<MeshData>);

    /// Use `mesh` as the chunk's collider.
    fn set_collision_mesh(&mut self, coord: ChunkCoord, mesh: Arc<MeshData>);
}
