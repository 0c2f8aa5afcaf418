//! Square grids of height samples padded with one border ring.

/// Errors returned when constructing a [`HeightGrid`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeightGridError {
    /// The grid has no core samples inside its border ring.
    #[error("bordered size {0} leaves no core samples (minimum is 3)")]
    Degenerate(usize),

    /// The sample buffer does not match `size * size`.
    #[error("expected {expected} samples for a {size}x{size} grid, got {actual}")]
    LengthMismatch {
        /// Requested side length.
        size: usize,
        /// `size * size`.
        expected: usize,
        /// Buffer length supplied.
        actual: usize,
    },
}

/// Minimum and maximum sample of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRange {
    /// Smallest sample.
    pub min: f32,
    /// Largest sample.
    pub max: f32,
}

/// A square, row-major grid of height samples.
///
/// The outermost ring holds border samples that overlap the neighbouring
/// tiles; they exist only so that edge normals can be computed without
/// talking to those neighbours. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    size: usize,
    samples: Vec<f32>,
}

impl HeightGrid {
    /// Wrap a row-major sample buffer of side length `size` (border included).
    pub fn new(size: usize, samples: Vec<f32>) -> Result<Self, HeightGridError> {
        if size < 3 {
            return Err(HeightGridError::Degenerate(size));
        }
        let expected = size * size;
        if samples.len() != expected {
            return Err(HeightGridError::LengthMismatch {
                size,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self { size, samples })
    }

    /// Build a grid by evaluating `f(x, y)` for every sample.
    pub fn from_fn(
        size: usize,
        mut f: impl FnMut(usize, usize) -> f32,
    ) -> Result<Self, HeightGridError> {
        let mut samples = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                samples.push(f(x, y));
            }
        }
        Self::new(size, samples)
    }

    /// Side length including the border ring.
    pub fn bordered_size(&self) -> usize {
        self.size
    }

    /// Side length of the core region.
    pub fn core_size(&self) -> usize {
        self.size - 2
    }

    /// Sample at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the bordered grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.size && y < self.size, "sample ({x}, {y}) out of range");
        self.samples[y * self.size + x]
    }

    /// Returns `true` if `(x, y)` lies on the outermost ring.
    #[inline]
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x == self.size - 1 || y == self.size - 1
    }

    /// Raw row-major samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Min/max over every sample, border included.
    pub fn range(&self) -> HeightRange {
        let (min, max) = self
            .samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        HeightRange { min, max }
    }
}
