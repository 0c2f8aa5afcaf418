//! Island falloff: pushes samples near a grid's rim toward zero.

/// Falloff curve `v^a / (v^a + (b - b*v)^a)` for `v` in `[0, 1]`.
///
/// `v = 0` at the grid centre yields 0 (no falloff); `v = 1` at the rim yields 1.
pub fn falloff_value(v: f32, a: f32, b: f32) -> f32 {
    let va = v.powf(a);
    let denom = va + (b - b * v).powf(a);
    if denom == 0.0 { 0.0 } else { va / denom }
}

/// Precomputed falloff values for a square grid.
#[derive(Clone, Debug)]
pub struct FalloffMap {
    size: usize,
    values: Vec<f32>,
}

impl FalloffMap {
    /// Build the falloff map for a `size` x `size` grid.
    pub fn new(size: usize, a: f32, b: f32) -> Self {
        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let fx = x as f32 / size as f32 * 2.0 - 1.0;
                let fy = y as f32 / size as f32 * 2.0 - 1.0;
                values.push(falloff_value(fx.abs().max(fy.abs()), a, b));
            }
        }
        Self { size, values }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Falloff at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }
}
