//! Height-banded terrain materials: layer definitions, the GPU parameter
//! block, and a CPU mirror of the shader's height blending.

mod layer;
mod params;

pub use layer::{LayerTable, MaterialError, TerrainLayer};
pub use params::{MAX_LAYERS, TerrainMaterialParams};
