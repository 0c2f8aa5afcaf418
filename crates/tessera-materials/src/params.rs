//! GPU-friendly packed material parameters.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Maximum number of layers the parameter block can carry.
pub const MAX_LAYERS: usize = 8;

/// Terrain material uniform block, 272 bytes, std140-compatible.
///
/// Unused layer slots are zeroed; shaders iterate `layer_count` entries.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainMaterialParams {
    /// Number of active layers.
    pub layer_count: u32,
    /// World height mapped to 0 in the blend.
    pub min_height: f32,
    /// World height mapped to 1 in the blend.
    pub max_height: f32,
    pub _pad: u32,
    /// xyz = tint, w = tint strength.
    pub tints: [[f32; 4]; MAX_LAYERS],
    /// x = start height, y = blend strength, z = texture scale, w unused.
    pub bands: [[f32; 4]; MAX_LAYERS],
}

const_assert_eq!(std::mem::size_of::<TerrainMaterialParams>(), 272);
const_assert_eq!(std::mem::size_of::<TerrainMaterialParams>() % 16, 0);

impl TerrainMaterialParams {
    /// Raw bytes for a uniform buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
