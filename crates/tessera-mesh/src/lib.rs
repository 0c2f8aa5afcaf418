//! Terrain meshing: height curves, seam-safe LOD mesh building from bordered
//! height grids, flat shading, GPU vertex packing, and an async meshing pool.

pub mod async_mesh;
pub mod builder;
pub mod height_curve;
pub mod mesh_data;
pub mod vertex_format;

pub use async_mesh::{MeshingPipeline, MeshingResult, MeshingTask};
pub use builder::{
    MeshError, MeshSettings, VertexIndex, build_terrain_mesh, check_stride, simplification_stride,
};
pub use height_curve::{HeightCurve, HeightCurveError};
pub use mesh_data::MeshData;
pub use vertex_format::TerrainVertex;
