//! Interleaved vertex format for terrain mesh upload.
//!
//! ## Attribute Packing
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x2 | uv       |

use std::mem;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use crate::mesh_data::MeshData;

/// One interleaved terrain vertex, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Byte offsets of each attribute, indexed by shader location.
pub const TERRAIN_VERTEX_OFFSETS: [usize; 3] = [
    mem::offset_of!(TerrainVertex, position),
    mem::offset_of!(TerrainVertex, normal),
    mem::offset_of!(TerrainVertex, uv),
];

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

const_assert_eq!(mem::size_of::<TerrainVertex>(), 32);
const_assert_eq!(TERRAIN_VERTEX_OFFSETS[0], 0);
const_assert_eq!(TERRAIN_VERTEX_OFFSETS[1], 12);
const_assert_eq!(TERRAIN_VERTEX_OFFSETS[2], 24);

impl MeshData {
    /// Pack positions, normals and uvs into one vertex buffer.
    pub fn interleave(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| TerrainVertex {
                position,
                normal,
                uv,
            })
            .collect()
    }

    /// Interleaved vertices as raw bytes, ready for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleave()).to_vec()
    }

    /// Indices as raw bytes, ready for an index buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
