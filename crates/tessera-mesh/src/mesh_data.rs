//! Renderable terrain mesh output.

use glam::Vec3;

/// The renderable part of a terrain LOD mesh.
///
/// Holds interior vertices only; border geometry used while baking normals
/// is discarded before this is produced. Every index in `indices` refers to
/// an entry of `positions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in chunk-local model space.
    pub positions: Vec<[f32; 3]>,
    /// Unit normals, one per vertex.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates in `[0, 1]` across the chunk footprint.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Unshare vertices so every triangle carries its own face normal.
    ///
    /// Produces three vertices per triangle and a trivial `0..n` index list.
    pub fn flat_shaded(&self) -> MeshData {
        let mut out = MeshData {
            positions: Vec::with_capacity(self.indices.len()),
            normals: Vec::with_capacity(self.indices.len()),
            uvs: Vec::with_capacity(self.indices.len()),
            indices: Vec::with_capacity(self.indices.len()),
        };

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(self.positions[i as usize]));
            let normal = (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Y);
            for &i in tri {
                out.indices.push(out.positions.len() as u32);
                out.positions.push(self.positions[i as usize]);
                out.uvs.push(self.uvs[i as usize]);
                out.normals.push(normal.to_array());
            }
        }

        out
    }
}
