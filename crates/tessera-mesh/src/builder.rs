//! LOD mesh building from bordered height grids.
//!
//! The core of the grid is walked in steps of the LOD's simplification
//! stride, always starting and ending on the first and last core lines.
//! Samples on the outermost ring become *border* vertices: they are
//! positioned like any other vertex and take part in normal accumulation, but
//! never reach the output. Because adjacent tiles read identical samples
//! along and beyond a shared edge, the heights and normals they produce there
//! agree at every LOD without any cross-chunk communication.

use glam::Vec3;
use tessera_config::TerrainConfig;
use tessera_terrain::HeightGrid;

use crate::height_curve::{HeightCurve, HeightCurveError};
use crate::mesh_data::MeshData;

/// Errors returned when a grid cannot be meshed at the requested detail level.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// The stride does not land on the last core line.
    #[error(
        "stride {stride} (lod {lod}) does not divide the core span of bordered size {bordered_size}"
    )]
    StrideMismatch {
        /// Requested detail level.
        lod: u32,
        /// Its simplification stride.
        stride: usize,
        /// Side length of the grid, border included.
        bordered_size: usize,
    },

    /// The stride leaves fewer than two vertices per core line.
    #[error("stride {stride} (lod {lod}) is too coarse for bordered size {bordered_size}")]
    TooCoarse {
        /// Requested detail level.
        lod: u32,
        /// Its simplification stride.
        stride: usize,
        /// Side length of the grid, border included.
        bordered_size: usize,
    },

    /// The configured height curve is malformed.
    #[error("invalid height curve: {0}")]
    Curve(#[from] HeightCurveError),
}

/// Per-session meshing parameters shared by every chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSettings {
    /// Vertical scale applied after the height curve.
    pub height_multiplier: f32,
    /// Remapping applied to each raw sample.
    pub height_curve: HeightCurve,
    /// Emit unshared vertices with per-face normals.
    pub flat_shading: bool,
}

impl MeshSettings {
    /// Build settings from the terrain section of the config.
    pub fn from_config(config: &TerrainConfig) -> Result<Self, MeshError> {
        Ok(Self {
            height_multiplier: config.height_multiplier,
            height_curve: HeightCurve::new(config.height_curve.clone())?,
            flat_shading: config.flat_shading,
        })
    }

    /// Lowest mesh height these settings can produce.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// Highest mesh height these settings can produce.
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }

    /// Check every detail level in `levels` against grids of side `bordered_size`.
    pub fn validate(
        &self,
        bordered_size: usize,
        levels: impl IntoIterator<Item = u32>,
    ) -> Result<(), MeshError> {
        for lod in levels {
            check_stride(bordered_size, lod)?;
        }
        Ok(())
    }

    /// Build the mesh for `grid` at detail level `lod`, honouring `flat_shading`.
    pub fn build(&self, grid: &HeightGrid, lod: u32) -> Result<MeshData, MeshError> {
        let mesh = build_terrain_mesh(grid, self.height_multiplier, &self.height_curve, lod)?;
        Ok(if self.flat_shading {
            mesh.flat_shaded()
        } else {
            mesh
        })
    }
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            height_multiplier: 1.0,
            height_curve: HeightCurve::linear(),
            flat_shading: false,
        }
    }
}

/// A vertex slot in one of the two buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexIndex {
    /// Rendered vertex, index into the output vertex buffer.
    Interior(u32),
    /// Normal-only vertex on the border ring.
    Border(u32),
}

/// Lattice step for a detail level: 1 at level 0, otherwise `2 * lod`.
pub fn simplification_stride(lod: u32) -> usize {
    if lod == 0 { 1 } else { 2 * lod as usize }
}

/// Check that detail level `lod` can mesh grids of side `bordered_size`.
///
/// The stride must divide the core span `bordered_size - 3` so that the
/// lattice lands on the first and last core lines.
pub fn check_stride(bordered_size: usize, lod: u32) -> Result<usize, MeshError> {
    let stride = simplification_stride(lod);
    let span = bordered_size.saturating_sub(3);
    if span < stride {
        return Err(MeshError::TooCoarse {
            lod,
            stride,
            bordered_size,
        });
    }
    if span % stride != 0 {
        return Err(MeshError::StrideMismatch {
            lod,
            stride,
            bordered_size,
        });
    }
    Ok(stride)
}

/// Sample lines visited at `stride`: the border ring plus every `stride`-th
/// core line from the first core line to the last.
fn lattice_lines(size: usize, stride: usize) -> Vec<usize> {
    let mut lines = Vec::with_capacity((size - 3) / stride + 3);
    lines.push(0);
    lines.extend((1..size - 1).step_by(stride));
    lines.push(size - 1);
    lines
}

/// Interior and border buckets collected during one lattice walk.
struct MeshBuckets {
    interior_positions: Vec<Vec3>,
    interior_uvs: Vec<[f32; 2]>,
    border_positions: Vec<Vec3>,
    interior_triangles: Vec<[u32; 3]>,
    border_triangles: Vec<[VertexIndex; 3]>,
}

impl MeshBuckets {
    fn with_capacity(lines: usize) -> Self {
        let interior_line = lines - 2;
        let interior = interior_line * interior_line;
        Self {
            interior_positions: Vec::with_capacity(interior),
            interior_uvs: Vec::with_capacity(interior),
            border_positions: Vec::with_capacity(lines * lines - interior),
            interior_triangles: Vec::with_capacity(2 * (interior_line - 1) * (interior_line - 1)),
            border_triangles: Vec::new(),
        }
    }

    /// Walk `grid` along `lines` in both axes, routing every vertex and
    /// triangle into its bucket.
    fn walk(
        grid: &HeightGrid,
        height_multiplier: f32,
        height_curve: &HeightCurve,
        lines: &[usize],
    ) -> Self {
        let count = lines.len();
        let footprint = (grid.core_size() - 1) as f32;
        let top_left_x = -footprint / 2.0;
        let top_left_z = footprint / 2.0;

        let mut buckets = Self::with_capacity(count);
        let mut lattice = Vec::with_capacity(count * count);
        for &y in lines {
            for &x in lines {
                // Offsets from the first core line; the border ring sits at -1 and footprint + 1.
                let ox = x as f32 - 1.0;
                let oy = y as f32 - 1.0;
                let height = height_curve.evaluate(grid.get(x, y)) * height_multiplier;
                let position = Vec3::new(top_left_x + ox, height, top_left_z - oy);
                let uv = [ox / footprint, oy / footprint];
                lattice.push(buckets.push_vertex(grid.is_border(x, y), position, uv));
            }
        }

        for row in 0..count - 1 {
            for col in 0..count - 1 {
                let a = lattice[row * count + col];
                let b = lattice[row * count + col + 1];
                let c = lattice[(row + 1) * count + col];
                let d = lattice[(row + 1) * count + col + 1];
                buckets.push_triangle([a, d, c]);
                buckets.push_triangle([d, a, b]);
            }
        }
        buckets
    }

    fn push_vertex(&mut self, border: bool, position: Vec3, uv: [f32; 2]) -> VertexIndex {
        if border {
            self.border_positions.push(position);
            VertexIndex::Border(self.border_positions.len() as u32 - 1)
        } else {
            self.interior_positions.push(position);
            self.interior_uvs.push(uv);
            VertexIndex::Interior(self.interior_positions.len() as u32 - 1)
        }
    }

    fn push_triangle(&mut self, tri: [VertexIndex; 3]) {
        match tri {
            [
                VertexIndex::Interior(a),
                VertexIndex::Interior(b),
                VertexIndex::Interior(c),
            ] => self.interior_triangles.push([a, b, c]),
            _ => self.border_triangles.push(tri),
        }
    }

    fn position(&self, index: VertexIndex) -> Vec3 {
        match index {
            VertexIndex::Interior(i) => self.interior_positions[i as usize],
            VertexIndex::Border(i) => self.border_positions[i as usize],
        }
    }

    /// Area-weighted normals for interior vertices, fed by both buckets.
    fn bake_normals(&self) -> Vec<[f32; 3]> {
        let mut accumulated = vec![Vec3::ZERO; self.interior_positions.len()];

        let interior = self
            .interior_triangles
            .iter()
            .map(|&t| t.map(VertexIndex::Interior));
        for tri in interior.chain(self.border_triangles.iter().copied()) {
            let [a, b, c] = tri.map(|i| self.position(i));
            let face = (b - a).cross(c - a);
            for index in tri {
                if let VertexIndex::Interior(i) = index {
                    accumulated[i as usize] += face;
                }
            }
        }

        accumulated
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect()
    }

    fn into_mesh(self, normals: Vec<[f32; 3]>) -> MeshData {
        MeshData {
            positions: self.interior_positions.iter().map(|p| p.to_array()).collect(),
            normals,
            uvs: self.interior_uvs,
            indices: self.interior_triangles.into_iter().flatten().collect(),
        }
    }
}

/// Build the renderable mesh of `grid` at detail level `lod`.
///
/// The interior spans the core lines `1..=size - 2` at every stride, so it
/// covers `core_size - 1` units centred on the chunk origin and neighbouring
/// tiles read the same samples along their shared edge. Normals are always
/// baked on the full-resolution lattice; coarser lattices pick them up at
/// their own vertices. Rows of the grid run toward -Z. Pure and
/// deterministic, so it can run on any thread.
pub fn build_terrain_mesh(
    grid: &HeightGrid,
    height_multiplier: f32,
    height_curve: &HeightCurve,
    lod: u32,
) -> Result<MeshData, MeshError> {
    let size = grid.bordered_size();
    let stride = check_stride(size, lod)?;

    let full = MeshBuckets::walk(grid, height_multiplier, height_curve, &lattice_lines(size, 1));
    let field = full.bake_normals();
    if stride == 1 {
        return Ok(full.into_mesh(field));
    }

    let lines = lattice_lines(size, stride);
    let core_lines = &lines[1..lines.len() - 1];
    let core_size = grid.core_size();
    // Full-resolution interior vertices are row-major over core lines 1..=size - 2.
    let normals = core_lines
        .iter()
        .flat_map(|&y| core_lines.iter().map(move |&x| (y - 1) * core_size + (x - 1)))
        .map(|i| field[i])
        .collect();
    let coarse = MeshBuckets::walk(grid, height_multiplier, height_curve, &lines);
    Ok(coarse.into_mesh(normals))
}
