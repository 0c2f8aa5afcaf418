//! Height sample sources: anything that can fill a bordered grid for a chunk.

use tessera_config::{NoiseConfig, NormalizeMode};

use crate::coord::ChunkCoord;
use crate::falloff::FalloffMap;
use crate::height_grid::{HeightGrid, HeightGridError};
use crate::heightmap::{HeightmapParams, HeightmapSampler};

/// Produces bordered height grids for chunk coordinates.
///
/// Implementations must be pure with respect to `coord`: asking twice for the
/// same chunk yields the same grid. Calls may arrive concurrently from worker
/// threads.
pub trait HeightSource: Send + Sync {
    /// Side length of the grids this source produces, border included.
    fn bordered_size(&self) -> usize;

    /// Generate the bordered grid for `coord`.
    fn generate(&self, coord: ChunkCoord) -> Result<HeightGrid, HeightGridError>;
}

/// Fractal-noise height source with optional island falloff.
///
/// Grid sample `(x, y)` of chunk `c` is taken at
/// `(x - h + c.x * s, y - h - c.y * s)` where `h` is half the bordered span
/// and `s` the tile spacing, so rows run toward world -Z and neighbouring
/// tiles read identical values along their shared border.
pub struct NoiseHeightSource {
    sampler: HeightmapSampler,
    bordered_size: usize,
    falloff: Option<FalloffMap>,
}

impl NoiseHeightSource {
    /// Create a source producing grids for chunks of core size `map_chunk_size`.
    pub fn new(
        params: HeightmapParams,
        map_chunk_size: usize,
        falloff: Option<(f32, f32)>,
    ) -> Result<Self, HeightGridError> {
        let bordered_size = map_chunk_size + 2;
        if map_chunk_size < 2 {
            return Err(HeightGridError::Degenerate(bordered_size));
        }
        Ok(Self {
            sampler: HeightmapSampler::new(params),
            bordered_size,
            falloff: falloff.map(|(a, b)| FalloffMap::new(bordered_size, a, b)),
        })
    }

    /// Build a source from the noise section of the config.
    pub fn from_config(config: &NoiseConfig, map_chunk_size: usize) -> Result<Self, HeightGridError> {
        Self::new(
            HeightmapParams::from(config),
            map_chunk_size,
            config.falloff.map(|f| (f.a, f.b)),
        )
    }

    /// Distance between neighbouring tile origins in sample units.
    pub fn chunk_spacing(&self) -> usize {
        self.bordered_size - 3
    }

    fn raw_grid(&self, coord: ChunkCoord) -> Vec<f64> {
        let size = self.bordered_size;
        let half = (size - 1) as f64 / 2.0;
        let spacing = self.chunk_spacing() as f64;
        let origin_x = coord.x as f64 * spacing;
        let origin_y = coord.y as f64 * spacing;

        let mut raw = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let sx = x as f64 - half + origin_x;
                let sy = y as f64 - half - origin_y;
                raw.push(self.sampler.sample(sx, sy));
            }
        }
        raw
    }
}

impl HeightSource for NoiseHeightSource {
    fn bordered_size(&self) -> usize {
        self.bordered_size
    }

    fn generate(&self, coord: ChunkCoord) -> Result<HeightGrid, HeightGridError> {
        let size = self.bordered_size;
        let raw = self.raw_grid(coord);

        let normalized: Vec<f32> = match self.sampler.params().normalize_mode {
            NormalizeMode::Global => raw
                .iter()
                .map(|&r| self.sampler.normalize_global(r) as f32)
                .collect(),
            NormalizeMode::Local => {
                let (lo, hi) = raw
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                        (lo.min(r), hi.max(r))
                    });
                let span = hi - lo;
                raw.iter()
                    .map(|&r| if span > 0.0 { ((r - lo) / span) as f32 } else { 0.0 })
                    .collect()
            }
        };

        HeightGrid::from_fn(size, |x, y| {
            let h = normalized[y * size + x];
            match &self.falloff {
                Some(falloff) => (h - falloff.get(x, y)).clamp(0.0, 1.0),
                None => h,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(map_chunk_size: usize) -> NoiseHeightSource {
        NoiseHeightSource::new(
            HeightmapParams {
                seed: 3,
                scale: 25.0,
                ..Default::default()
            },
            map_chunk_size,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_has_bordered_size() {
        let src = source(17);
        let grid = src.generate(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(grid.bordered_size(), 19);
        assert_eq!(src.bordered_size(), 19);
        assert_eq!(src.chunk_spacing(), 16);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let src = source(17);
        let a = src.generate(ChunkCoord::new(4, -2)).unwrap();
        let b = src.generate(ChunkCoord::new(4, -2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_global_samples_in_unit_range() {
        let grid = source(33).generate(ChunkCoord::new(1, 1)).unwrap();
        let range = grid.range();
        assert!(range.min >= 0.0 && range.max <= 1.0, "{range:?}");
    }

    #[test]
    fn test_neighbouring_chunks_share_border_samples_east() {
        let src = source(17);
        let size = src.bordered_size();
        let a = src.generate(ChunkCoord::new(0, 0)).unwrap();
        let b = src.generate(ChunkCoord::new(1, 0)).unwrap();
        let spacing = src.chunk_spacing();
        // Column x of `b` sits at column x + spacing of `a`.
        for y in 0..size {
            for x in 0..(size - spacing) {
                assert_eq!(b.get(x, y), a.get(x + spacing, y), "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_neighbouring_chunks_share_border_samples_north() {
        let src = source(17);
        let size = src.bordered_size();
        let a = src.generate(ChunkCoord::new(0, 0)).unwrap();
        let b = src.generate(ChunkCoord::new(0, 1)).unwrap();
        let spacing = src.chunk_spacing();
        // Rows run toward -Z, so the northern chunk's lower rows overlap our upper rows.
        for y in spacing..size {
            for x in 0..size {
                assert_eq!(b.get(x, y), a.get(x, y - spacing), "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_local_normalization_spans_unit_range() {
        let src = NoiseHeightSource::new(
            HeightmapParams {
                seed: 9,
                scale: 10.0,
                normalize_mode: NormalizeMode::Local,
                ..Default::default()
            },
            33,
            None,
        )
        .unwrap();
        let range = src.generate(ChunkCoord::new(0, 0)).unwrap().range();
        assert_eq!(range.min, 0.0);
        assert!((range.max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_falloff_flattens_rim() {
        let src = NoiseHeightSource::new(HeightmapParams::default(), 33, Some((3.0, 2.2))).unwrap();
        let grid = src.generate(ChunkCoord::new(0, 0)).unwrap();
        for i in 0..grid.bordered_size() {
            assert!(grid.get(0, i) < 0.05, "rim sample too high: {}", grid.get(0, i));
        }
    }

    #[test]
    fn test_degenerate_chunk_size_rejected() {
        assert!(NoiseHeightSource::new(HeightmapParams::default(), 1, None).is_err());
    }
}
