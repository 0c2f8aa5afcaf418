//! Viewer position feed and chunk-grid rounding.

use glam::{Vec2, Vec3};
use tessera_terrain::ChunkCoord;

/// Project a world position onto the terrain plane and undo the world scale.
pub fn viewer_position(world: Vec3, uniform_scale: f32) -> Vec2 {
    Vec2::new(world.x, world.z) / uniform_scale
}

/// Chunk whose footprint centre is nearest to `position`.
///
/// Halves round to the nearest even coordinate.
pub fn chunk_coord_at(position: Vec2, chunk_size: f32) -> ChunkCoord {
    ChunkCoord::new(
        (position.x / chunk_size).round_ties_even() as i32,
        (position.y / chunk_size).round_ties_even() as i32,
    )
}

/// Chunk radius to enumerate around the viewer for a view distance.
pub fn chunks_visible(max_view_distance: f32, chunk_size: f32) -> i32 {
    (max_view_distance / chunk_size).round_ties_even() as i32
}
