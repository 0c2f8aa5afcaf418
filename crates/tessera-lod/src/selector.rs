//! Distance-based LOD selection over a validated threshold table.

use tessera_config::LodConfig;

/// One row of the LOD table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodInfo {
    /// Mesh detail level handed to the builder.
    pub lod: u32,
    /// Maximum viewer distance at which this row applies.
    pub visible_distance_threshold: f32,
    /// Whether this row's mesh also serves as the collider.
    pub use_for_collider: bool,
}

/// Errors returned when validating a LOD table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodTableError {
    #[error("lod table must have at least one entry")]
    Empty,

    #[error("lod entry {index} has non-positive threshold {threshold}")]
    NonPositiveThreshold { index: usize, threshold: f32 },

    #[error("lod entry {index} threshold {threshold} does not exceed the previous entry")]
    NotIncreasing { index: usize, threshold: f32 },

    #[error("lod table must flag exactly one collision entry, found {0}")]
    CollisionCount(usize),
}

/// Ordered LOD table with strictly increasing thresholds.
///
/// Index 0 is the most detailed row. The last threshold is the maximum view
/// distance: chunks farther than it are not shown at all.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    levels: Vec<LodInfo>,
    collision_index: usize,
}

impl LodTable {
    /// Validate and build a table.
    pub fn new(levels: Vec<LodInfo>) -> Result<Self, LodTableError> {
        if levels.is_empty() {
            return Err(LodTableError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            let threshold = level.visible_distance_threshold;
            // Written to also reject NaN.
            if !(threshold > 0.0) {
                return Err(LodTableError::NonPositiveThreshold { index, threshold });
            }
            if index > 0 && threshold <= levels[index - 1].visible_distance_threshold {
                return Err(LodTableError::NotIncreasing { index, threshold });
            }
        }

        let mut colliders = levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.use_for_collider)
            .map(|(index, _)| index);
        let collision_index = match (colliders.next(), colliders.count()) {
            (Some(index), 0) => index,
            (None, _) => return Err(LodTableError::CollisionCount(0)),
            (Some(_), extra) => return Err(LodTableError::CollisionCount(extra + 1)),
        };

        Ok(Self {
            levels,
            collision_index,
        })
    }

    /// Build a table from the `lod` config section.
    pub fn from_config(config: &LodConfig) -> Result<Self, LodTableError> {
        Self::new(
            config
                .levels
                .iter()
                .map(|level| LodInfo {
                    lod: level.lod,
                    visible_distance_threshold: level.visible_distance_threshold,
                    use_for_collider: level.use_for_collider,
                })
                .collect(),
        )
    }

    /// All rows, most detailed first.
    pub fn levels(&self) -> &[LodInfo] {
        &self.levels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Row at `index`, if configured.
    pub fn get(&self, index: usize) -> Option<&LodInfo> {
        self.levels.get(index)
    }

    /// Index of the row flagged for collision.
    pub fn collision_index(&self) -> usize {
        self.collision_index
    }

    /// Distance beyond which chunks are hidden.
    pub fn max_view_distance(&self) -> f32 {
        self.levels[self.levels.len() - 1].visible_distance_threshold
    }

    /// Detail levels in table order.
    pub fn detail_levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.iter().map(|level| level.lod)
    }

    /// Select the row for a chunk `distance` away from the viewer.
    ///
    /// Returns the first index whose threshold is at least `distance`, so a
    /// distance exactly on a threshold stays in the nearer band. Returns `None`
    /// beyond the maximum view distance.
    pub fn select(&self, distance: f32) -> Option<usize> {
        debug_assert!(distance >= 0.0, "distance must be non-negative");
        if distance > self.max_view_distance() {
            return None;
        }
        let index = self
            .levels
            .iter()
            .position(|level| distance <= level.visible_distance_threshold)
            .unwrap_or(self.levels.len() - 1);
        Some(index)
    }
}
