//! Height sample generation: chunk coordinates, bordered height grids, seeded
//! fBm noise with optional island falloff, and a background generator pool.

mod async_generation;
mod coord;
mod falloff;
mod height_grid;
mod heightmap;
mod source;

pub use async_generation::{AsyncHeightGenerator, GeneratedHeights};
pub use coord::ChunkCoord;
pub use falloff::{FalloffMap, falloff_value};
pub use height_grid::{HeightGrid, HeightGridError, HeightRange};
pub use heightmap::{HeightmapParams, HeightmapSampler};
pub use source::{HeightSource, NoiseHeightSource};
