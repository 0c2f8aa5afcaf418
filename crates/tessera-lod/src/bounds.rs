//! Square chunk footprints on the terrain plane.

use glam::Vec2;

/// Axis-aligned square footprint of one chunk, in terrain units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub center: Vec2,
    pub size: f32,
}

impl ChunkBounds {
    pub fn new(center: Vec2, size: f32) -> Self {
        Self { center, size }
    }

    /// Squared distance from `point` to the footprint; zero inside it.
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let half = Vec2::splat(self.size * 0.5);
        let outside = ((point - self.center).abs() - half).max(Vec2::ZERO);
        outside.length_squared()
    }

    /// Distance from `point` to the footprint; zero inside it.
    pub fn distance(&self, point: Vec2) -> f32 {
        self.sqr_distance(point).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_is_zero() {
        let bounds = ChunkBounds::new(Vec2::new(100.0, 0.0), 100.0);
        assert_eq!(bounds.distance(Vec2::new(120.0, 30.0)), 0.0);
        assert_eq!(bounds.sqr_distance(Vec2::new(50.0, 50.0)), 0.0);
    }

    #[test]
    fn test_axis_distance() {
        let bounds = ChunkBounds::new(Vec2::new(200.0, 0.0), 100.0);
        assert_eq!(bounds.distance(Vec2::ZERO), 150.0);
        assert_eq!(bounds.distance(Vec2::new(-200.0, 0.0)), 350.0);
    }

    #[test]
    fn test_corner_distance() {
        let bounds = ChunkBounds::new(Vec2::ZERO, 2.0);
        let d = bounds.distance(Vec2::new(4.0, 5.0));
        assert!((d - 5.0).abs() < 1e-6, "expected 3-4-5 triangle, got {d}");
    }
}
