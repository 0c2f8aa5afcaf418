//! Level-of-detail management: the validated LOD table, distance-based
//! selection, and viewer-to-footprint distances.

mod bounds;
mod selector;

pub use bounds::ChunkBounds;
pub use selector::{LodInfo, LodTable, LodTableError};
