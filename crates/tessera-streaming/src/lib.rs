//! Chunk streaming around a moving viewer: per-tile state, LOD assignment,
//! request de-duplication, and the seams to generation workers and the
//! render/collision surface.

mod backend;
mod chunk;
mod streamer;
mod surface;
mod viewer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{Completion, GenerationBackend, WorkerBackend};
pub use chunk::{Chunk, HeightState, MeshSlot};
pub use streamer::{ChunkStreamer, StreamerError, StreamerSettings, StreamerStats};
pub use surface::TerrainSurface;
pub use viewer::{chunk_coord_at, chunks_visible, viewer_position};
