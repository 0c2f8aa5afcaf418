//! The chunk streamer: decides which tiles exist around the viewer, which
//! LOD each shows, and which generation requests must be issued.
//!
//! All state is owned here and mutated from the main context only. Worker
//! results re-enter through [`ChunkStreamer::apply`] and are re-validated
//! against the current viewer position before anything is shown.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use tessera_config::Config;
use tessera_lod::{LodTable, LodTableError};
use tessera_mesh::{MeshData, MeshError, check_stride};
use tessera_terrain::{ChunkCoord, HeightGrid, HeightRange};

use crate::backend::{Completion, GenerationBackend};
use crate::chunk::{Chunk, HeightState, MeshSlot};
use crate::surface::TerrainSurface;
use crate::viewer::{chunk_coord_at, chunks_visible};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Configuration errors caught before streaming starts.
#[derive(Debug, thiserror::Error)]
pub enum StreamerError {
    #[error("map chunk size {0} is too small, need at least 2")]
    ChunkSize(u32),

    #[error("invalid lod table: {0}")]
    LodTable(#[from] LodTableError),

    #[error("lod table row {index} cannot mesh this chunk size: {source}")]
    Stride {
        index: usize,
        #[source]
        source: MeshError,
    },

    #[error("viewer move threshold must be non-negative, got {0}")]
    MoveThreshold(f32),

    #[error("uniform scale must be positive, got {0}")]
    UniformScale(f32),
}

/// Validated streamer parameters.
#[derive(Clone, Debug)]
pub struct StreamerSettings {
    map_chunk_size: u32,
    lod_table: LodTable,
    viewer_move_threshold: f32,
    uniform_scale: f32,
}

impl StreamerSettings {
    /// Validate the combination of chunk size, LOD table and viewer hysteresis.
    pub fn new(
        map_chunk_size: u32,
        lod_table: LodTable,
        viewer_move_threshold: f32,
        uniform_scale: f32,
    ) -> Result<Self, StreamerError> {
        if map_chunk_size < 2 {
            return Err(StreamerError::ChunkSize(map_chunk_size));
        }
        let bordered_size = map_chunk_size as usize + 2;
        for (index, level) in lod_table.levels().iter().enumerate() {
            check_stride(bordered_size, level.lod)
                .map_err(|source| StreamerError::Stride { index, source })?;
        }
        if !(viewer_move_threshold >= 0.0) {
            return Err(StreamerError::MoveThreshold(viewer_move_threshold));
        }
        if !(uniform_scale > 0.0) {
            return Err(StreamerError::UniformScale(uniform_scale));
        }
        Ok(Self {
            map_chunk_size,
            lod_table,
            viewer_move_threshold,
            uniform_scale,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, StreamerError> {
        Self::new(
            config.terrain.map_chunk_size,
            LodTable::from_config(&config.lod)?,
            config.streaming.viewer_move_threshold,
            config.terrain.uniform_scale,
        )
    }

    /// Side length of height grids, border included.
    pub fn bordered_size(&self) -> usize {
        self.map_chunk_size as usize + 2
    }

    /// Distance between neighbouring chunk centres, in terrain units.
    pub fn chunk_size(&self) -> f32 {
        (self.map_chunk_size - 1) as f32
    }

    pub fn lod_table(&self) -> &LodTable {
        &self.lod_table
    }

    pub fn max_view_distance(&self) -> f32 {
        self.lod_table.max_view_distance()
    }

    /// Chunk radius enumerated around the viewer.
    pub fn chunks_visible(&self) -> i32 {
        chunks_visible(self.max_view_distance(), self.chunk_size())
    }

    pub fn viewer_move_threshold(&self) -> f32 {
        self.viewer_move_threshold
    }

    pub fn uniform_scale(&self) -> f32 {
        self.uniform_scale
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running counters, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerStats {
    /// Full visibility recomputations.
    pub passes: u64,
    pub height_requests: u64,
    pub mesh_requests: u64,
    /// Requests the backend refused.
    pub rejected_requests: u64,
    pub render_assignments: u64,
    pub collision_assignments: u64,
}

// ---------------------------------------------------------------------------
// ChunkStreamer
// ---------------------------------------------------------------------------

/// Owns every live chunk and drives requests for them.
pub struct ChunkStreamer<B, S> {
    settings: StreamerSettings,
    backend: B,
    surface: S,
    chunks: FxHashMap<ChunkCoord, Chunk>,
    /// Chunks made visible by the most recent updates.
    visible: FxHashSet<ChunkCoord>,
    viewer: Vec2,
    /// Viewer position at the last full pass; `None` until the first one.
    last_update_position: Option<Vec2>,
    stats: StreamerStats,
}

impl<B: GenerationBackend, S: TerrainSurface> ChunkStreamer<B, S> {
    pub fn new(settings: StreamerSettings, backend: B, surface: S) -> Self {
        Self {
            settings,
            backend,
            surface,
            chunks: FxHashMap::default(),
            visible: FxHashSet::default(),
            viewer: Vec2::ZERO,
            last_update_position: None,
            stats: StreamerStats::default(),
        }
    }

    /// Feed a new viewer position, in terrain units.
    ///
    /// Recomputes the visible set only when the viewer has moved more than
    /// the move threshold since the last pass, or on the first call. Returns
    /// whether a pass ran.
    pub fn on_viewer_moved(&mut self, position: Vec2) -> bool {
        self.viewer = position;
        if let Some(last) = self.last_update_position {
            let threshold = self.settings.viewer_move_threshold;
            if (position - last).length_squared() <= threshold * threshold {
                return false;
            }
        }
        self.last_update_position = Some(position);
        self.update_visible_chunks();
        true
    }

    /// Recompute the required chunk set around the current viewer position.
    pub fn update_visible_chunks(&mut self) {
        self.stats.passes += 1;
        let previous = std::mem::take(&mut self.visible);

        let chunk_size = self.settings.chunk_size();
        let radius = self.settings.chunks_visible();
        let center = chunk_coord_at(self.viewer, chunk_size);
        let lod_count = self.settings.lod_table.len();

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx, dy);
                if !self.chunks.contains_key(&coord) {
                    let chunk = Chunk::new(coord, chunk_size, lod_count);
                    self.surface
                        .chunk_created(coord, chunk.world_transform(self.settings.uniform_scale));
                    self.chunks.insert(coord, chunk);
                }
                self.update_chunk(coord);
            }
        }

        for coord in previous.difference(&self.visible) {
            if let Some(chunk) = self.chunks.get_mut(coord) {
                set_visible(chunk, false, &mut self.surface);
            }
        }

        tracing::debug!(
            "visibility pass at {} around {center}: {} chunks known, {} visible",
            self.viewer,
            self.chunks.len(),
            self.visible.len()
        );
    }

    /// Re-evaluate one chunk against the current viewer position.
    ///
    /// Requests its height grid if it has none yet; otherwise selects its LOD,
    /// assigns or requests the matching meshes and updates visibility.
    pub fn update_chunk(&mut self, coord: ChunkCoord) {
        let Self {
            settings,
            backend,
            surface,
            chunks,
            visible,
            viewer,
            stats,
            ..
        } = self;
        let Some(chunk) = chunks.get_mut(&coord) else {
            return;
        };

        if matches!(chunk.height, HeightState::NotRequested) {
            request_height(chunk, backend, stats);
            return;
        }
        let Some(grid) = chunk.height_grid().cloned() else {
            return;
        };

        let distance = chunk.bounds.distance(*viewer);
        let table = &settings.lod_table;
        let Some(lod_index) = table.select(distance) else {
            tracing::trace!("chunk {coord} at {distance:.1} is beyond view distance");
            set_visible(chunk, false, surface);
            visible.remove(&coord);
            return;
        };
        let detail = table.levels()[lod_index].lod;
        tracing::trace!("chunk {coord} at {distance:.1} resolves to lod row {lod_index}");

        if chunk.assigned_lod != Some(lod_index) {
            match chunk.meshes[lod_index].clone() {
                MeshSlot::Ready(mesh) => {
                    surface.set_render_mesh(coord, lod_index, mesh);
                    chunk.assigned_lod = Some(lod_index);
                    stats.render_assignments += 1;
                }
                MeshSlot::NotRequested => {
                    request_mesh(chunk, lod_index, detail, &grid, backend, stats);
                }
                MeshSlot::Requested => {}
            }
        }

        if lod_index == table.collision_index() && !chunk.collision_assigned {
            match chunk.meshes[lod_index].clone() {
                MeshSlot::Ready(mesh) => {
                    surface.set_collision_mesh(coord, mesh);
                    chunk.collision_assigned = true;
                    stats.collision_assignments += 1;
                }
                MeshSlot::NotRequested => {
                    request_mesh(chunk, lod_index, detail, &grid, backend, stats);
                }
                MeshSlot::Requested => {}
            }
        }

        set_visible(chunk, true, surface);
        visible.insert(coord);
    }

    /// Store a delivered height grid and re-evaluate its chunk.
    pub fn on_height_received(
        &mut self,
        coord: ChunkCoord,
        grid: Arc<HeightGrid>,
        range: HeightRange,
    ) {
        let expected = self.settings.bordered_size();
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            tracing::warn!("height grid for unknown chunk {coord} dropped");
            return;
        };
        if matches!(chunk.height, HeightState::Received { .. }) {
            tracing::debug!("duplicate height grid for chunk {coord} ignored");
            return;
        }
        if grid.bordered_size() != expected {
            tracing::error!(
                "height grid for chunk {coord} has side {}, expected {expected}",
                grid.bordered_size()
            );
            chunk.height = HeightState::NotRequested;
            return;
        }
        tracing::debug!("chunk {coord} heights received ({:.3}..{:.3})", range.min, range.max);
        chunk.height = HeightState::Received { grid, range };
        self.update_chunk(coord);
    }

    /// Cache a delivered mesh and re-evaluate its chunk.
    pub fn on_mesh_ready(&mut self, coord: ChunkCoord, slot: usize, mesh: Arc<MeshData>) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            tracing::warn!("mesh for unknown chunk {coord} dropped");
            return;
        };
        let Some(cache) = chunk.meshes.get_mut(slot) else {
            tracing::warn!("mesh for chunk {coord} targets missing lod row {slot}");
            return;
        };
        tracing::debug!(
            "chunk {coord} lod row {slot} ready ({} vertices)",
            mesh.vertex_count()
        );
        *cache = MeshSlot::Ready(mesh);
        self.update_chunk(coord);
    }

    /// Route a worker result to its handler.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Height { coord, grid, range } => self.on_height_received(coord, grid, range),
            Completion::Mesh { coord, slot, mesh } => self.on_mesh_ready(coord, slot, mesh),
        }
    }

    /// Drain the backend and apply every finished request. Returns how many
    /// were applied.
    pub fn process_completions(&mut self) -> usize {
        let completions = self.backend.drain_completions();
        let count = completions.len();
        for completion in completions {
            self.apply(completion);
        }
        count
    }

    pub fn settings(&self) -> &StreamerSettings {
        &self.settings
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates currently marked visible.
    pub fn visible_chunks(&self) -> &FxHashSet<ChunkCoord> {
        &self.visible
    }

    /// Latest viewer position, in terrain units.
    pub fn viewer_position(&self) -> Vec2 {
        self.viewer
    }

    pub fn stats(&self) -> StreamerStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn set_visible<S: TerrainSurface>(chunk: &mut Chunk, visible: bool, surface: &mut S) {
    if chunk.visible != visible {
        chunk.visible = visible;
        surface.set_visible(chunk.coord, visible);
    }
}

fn request_height<B: GenerationBackend>(
    chunk: &mut Chunk,
    backend: &mut B,
    stats: &mut StreamerStats,
) {
    chunk.height = HeightState::Requested;
    if backend.request_height(chunk.coord) {
        stats.height_requests += 1;
        tracing::debug!("requested heights for chunk {}", chunk.coord);
    } else {
        chunk.height = HeightState::NotRequested;
        stats.rejected_requests += 1;
    }
}

fn request_mesh<B: GenerationBackend>(
    chunk: &mut Chunk,
    slot: usize,
    detail: u32,
    grid: &Arc<HeightGrid>,
    backend: &mut B,
    stats: &mut StreamerStats,
) {
    // Marked first so a re-entrant update cannot issue a duplicate.
    chunk.meshes[slot] = MeshSlot::Requested;
    if backend.request_mesh(chunk.coord, slot, detail, Arc::clone(grid)) {
        stats.mesh_requests += 1;
        tracing::debug!("requested lod row {slot} for chunk {}", chunk.coord);
    } else {
        chunk.meshes[slot] = MeshSlot::NotRequested;
        stats.rejected_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingBackend, RecordingSurface, SurfaceEvent, flat_grid};
    use tessera_lod::LodInfo;

    /// Chunk size 100, rows `[lod 0 to 100 (collider), lod 1 to 300]`.
    fn settings() -> StreamerSettings {
        let table = LodTable::new(vec![
            LodInfo {
                lod: 0,
                visible_distance_threshold: 100.0,
                use_for_collider: true,
            },
            LodInfo {
                lod: 1,
                visible_distance_threshold: 300.0,
                use_for_collider: false,
            },
        ])
        .unwrap();
        StreamerSettings::new(101, table, 25.0, 1.0).unwrap()
    }

    fn streamer() -> ChunkStreamer<RecordingBackend, RecordingSurface> {
        ChunkStreamer::new(settings(), RecordingBackend::default(), RecordingSurface::default())
    }

    fn deliver_height(s: &mut ChunkStreamer<RecordingBackend, RecordingSurface>, coord: ChunkCoord) {
        let grid = Arc::new(flat_grid(s.settings().bordered_size()));
        let range = grid.range();
        s.on_height_received(coord, grid, range);
    }

    fn mesh() -> Arc<MeshData> {
        Arc::new(MeshData::new())
    }

    #[test]
    fn test_settings_derived_values() {
        let s = settings();
        assert_eq!(s.bordered_size(), 103);
        assert_eq!(s.chunk_size(), 100.0);
        assert_eq!(s.max_view_distance(), 300.0);
        assert_eq!(s.chunks_visible(), 3);
    }

    #[test]
    fn test_settings_reject_bad_stride() {
        let table = LodTable::new(vec![LodInfo {
            lod: 1,
            visible_distance_threshold: 100.0,
            use_for_collider: true,
        }])
        .unwrap();
        // Bordered size 102: stride 2 does not divide the core span 99.
        assert!(matches!(
            StreamerSettings::new(100, table.clone(), 25.0, 1.0),
            Err(StreamerError::Stride { index: 0, .. })
        ));
        assert!(matches!(
            StreamerSettings::new(1, table.clone(), 25.0, 1.0),
            Err(StreamerError::ChunkSize(1))
        ));
        assert!(matches!(
            StreamerSettings::new(101, table, 25.0, 0.0),
            Err(StreamerError::UniformScale(_))
        ));
    }

    #[test]
    fn test_settings_from_default_config() {
        let s = StreamerSettings::from_config(&Config::default()).unwrap();
        assert_eq!(s.bordered_size(), 123);
        assert_eq!(s.chunk_size(), 120.0);
    }

    #[test]
    fn test_first_move_creates_chunks_and_requests_heights() {
        let mut s = streamer();
        assert!(s.on_viewer_moved(Vec2::ZERO));
        assert_eq!(s.chunk_count(), 49);
        assert_eq!(s.backend().height_requests.len(), 49);
        assert!(s.backend().mesh_requests.is_empty());
        assert!(s.visible_chunks().is_empty(), "nothing visible before heights arrive");
        assert_eq!(s.surface().created.len(), 49);
    }

    #[test]
    fn test_small_moves_do_not_recompute() {
        let mut s = streamer();
        assert!(s.on_viewer_moved(Vec2::ZERO));
        assert!(!s.on_viewer_moved(Vec2::new(20.0, 10.0)));
        assert!(!s.on_viewer_moved(Vec2::new(25.0, 0.0)), "exactly the threshold does not trigger");
        assert!(s.on_viewer_moved(Vec2::new(25.1, 0.0)));
        assert_eq!(s.stats().passes, 2);
        assert_eq!(s.viewer_position(), Vec2::new(25.1, 0.0));
    }

    #[test]
    fn test_height_requested_once_per_chunk() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        s.on_viewer_moved(Vec2::new(30.0, 0.0));
        s.update_visible_chunks();
        let mut coords = s.backend().height_requests.clone();
        let total = coords.len();
        coords.sort();
        coords.dedup();
        assert_eq!(coords.len(), total, "duplicate height request issued");
    }

    #[test]
    fn test_height_arrival_requests_selected_lod() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(2, 0);
        deliver_height(&mut s, coord);

        let requests = &s.backend().mesh_requests;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].coord, coord);
        assert_eq!(requests[0].slot, 1);
        assert_eq!(requests[0].lod, 1);
        let chunk = s.chunk(coord).unwrap();
        assert!(chunk.is_visible());
        assert_eq!(chunk.assigned_lod(), None, "mesh not yet delivered");
        assert!(s.visible_chunks().contains(&coord));
    }

    #[test]
    fn test_mesh_arrival_assigns_render_mesh() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(2, 0);
        deliver_height(&mut s, coord);
        s.on_mesh_ready(coord, 1, mesh());

        let chunk = s.chunk(coord).unwrap();
        assert_eq!(chunk.assigned_lod(), Some(1));
        assert!(!chunk.has_collision_mesh(), "row 1 is not the collider");
        assert_eq!(s.surface().render.get(&coord).map(|(i, _)| *i), Some(1));
        assert!(s.surface().collision.get(&coord).is_none());
        assert_eq!(s.backend().mesh_requests.len(), 1);
    }

    #[test]
    fn test_collision_row_shares_render_request() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(0, 0);
        deliver_height(&mut s, coord);
        assert_eq!(s.backend().mesh_requests.len(), 1, "one request per (chunk, row)");

        s.on_mesh_ready(coord, 0, mesh());
        let chunk = s.chunk(coord).unwrap();
        assert_eq!(chunk.assigned_lod(), Some(0));
        assert!(chunk.has_collision_mesh());
        assert!(s.surface().collision.contains_key(&coord));
        assert_eq!(s.stats().collision_assignments, 1);
    }

    #[test]
    fn test_cached_mesh_reused_without_request() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(0, 0);
        deliver_height(&mut s, coord);
        s.on_mesh_ready(coord, 0, mesh());

        // Move so the chunk falls into row 1, then back.
        s.on_viewer_moved(Vec2::new(-250.0, 0.0));
        assert_eq!(s.backend().mesh_requests.len(), 2);
        s.on_mesh_ready(coord, 1, mesh());
        assert_eq!(s.chunk(coord).unwrap().assigned_lod(), Some(1));

        s.on_viewer_moved(Vec2::ZERO);
        assert_eq!(s.chunk(coord).unwrap().assigned_lod(), Some(0));
        assert_eq!(s.backend().mesh_requests.len(), 2, "cached row 0 reused");
    }

    #[test]
    fn test_out_of_range_chunk_hidden() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(3, 3);
        deliver_height(&mut s, coord);
        // Corner chunk: distance sqrt(250^2 + 250^2) > 300.
        let chunk = s.chunk(coord).unwrap();
        assert!(!chunk.is_visible());
        assert!(s.backend().mesh_requests.is_empty());
    }

    #[test]
    fn test_leaving_chunks_marked_invisible() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(-3, 0);
        deliver_height(&mut s, coord);
        assert!(s.chunk(coord).unwrap().is_visible());

        s.on_viewer_moved(Vec2::new(300.0, 0.0));
        assert!(!s.chunk(coord).unwrap().is_visible());
        assert!(!s.visible_chunks().contains(&coord));
        assert!(
            s.surface()
                .events
                .contains(&SurfaceEvent::Visibility(coord, false))
        );
    }

    #[test]
    fn test_late_height_for_irrelevant_chunk_is_cached_only() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(3, 0);
        s.on_viewer_moved(Vec2::new(-1000.0, 0.0));
        deliver_height(&mut s, coord);

        let chunk = s.chunk(coord).unwrap();
        assert!(chunk.height_grid().is_some());
        assert!(!chunk.is_visible());
        assert!(
            s.backend().mesh_requests.iter().all(|r| r.coord != coord),
            "no mesh requested for a chunk out of range"
        );
    }

    #[test]
    fn test_stale_mesh_is_cached_not_shown() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(2, 0);
        deliver_height(&mut s, coord);
        s.on_viewer_moved(Vec2::new(-1000.0, 0.0));
        s.on_mesh_ready(coord, 1, mesh());

        let chunk = s.chunk(coord).unwrap();
        assert!(chunk.mesh_slot(1).unwrap().is_ready());
        assert_eq!(chunk.assigned_lod(), None);
        assert!(s.surface().render.get(&coord).is_none());
    }

    #[test]
    fn test_rejected_requests_are_retried_on_next_pass() {
        let mut s = streamer();
        s.backend_mut().accept = false;
        s.on_viewer_moved(Vec2::ZERO);
        assert!(s.backend().height_requests.is_empty());
        assert_eq!(s.stats().rejected_requests, 49);
        let chunk = s.chunk(ChunkCoord::new(0, 0)).unwrap();
        assert!(matches!(chunk.height_state(), HeightState::NotRequested));

        s.backend_mut().accept = true;
        s.update_visible_chunks();
        assert_eq!(s.backend().height_requests.len(), 49);
    }

    #[test]
    fn test_wrong_sized_grid_rejected() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(0, 0);
        let grid = Arc::new(flat_grid(17));
        let range = grid.range();
        s.on_height_received(coord, grid, range);
        let chunk = s.chunk(coord).unwrap();
        assert!(matches!(chunk.height_state(), HeightState::NotRequested));
        assert!(s.backend().mesh_requests.is_empty());
    }

    #[test]
    fn test_unknown_completions_ignored() {
        let mut s = streamer();
        s.on_mesh_ready(ChunkCoord::new(9, 9), 0, mesh());
        deliver_height(&mut s, ChunkCoord::new(9, 9));
        assert_eq!(s.chunk_count(), 0);

        s.on_viewer_moved(Vec2::ZERO);
        s.on_mesh_ready(ChunkCoord::new(0, 0), 7, mesh());
        assert!(s.surface().events.iter().all(|e| !matches!(e, SurfaceEvent::Render(..))));
    }

    #[test]
    fn test_process_completions_applies_backend_results() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(0, 1);
        let grid = Arc::new(flat_grid(103));
        let range = grid.range();
        s.backend_mut().completions.push(Completion::Height { coord, grid, range });
        assert_eq!(s.process_completions(), 1);
        assert!(s.chunk(coord).unwrap().height_grid().is_some());
        assert_eq!(s.process_completions(), 0);
    }

    #[test]
    fn test_lod_index_monotonic_over_distance() {
        let mut s = streamer();
        s.on_viewer_moved(Vec2::ZERO);
        let coord = ChunkCoord::new(0, 0);
        deliver_height(&mut s, coord);

        let mut prev: Option<usize> = Some(0);
        for step in 1..=20 {
            let x = -(step as f32) * 20.0;
            s.on_viewer_moved(Vec2::new(x, 0.0));
            if let Some(slot) = s.backend().mesh_requests.iter().map(|r| r.slot).last() {
                s.on_mesh_ready(coord, slot, mesh());
            }
            let chunk = s.chunk(coord).unwrap();
            let current = if chunk.is_visible() { chunk.assigned_lod() } else { None };
            let distance = (-x - 50.0).max(0.0);
            assert_eq!(chunk.is_visible(), distance <= 300.0, "visibility at distance {distance}");
            match (prev, current) {
                (Some(a), Some(b)) => assert!(b >= a, "lod decreased at distance {distance}"),
                (None, Some(_)) => panic!("chunk reappeared at distance {distance}"),
                _ => {}
            }
            prev = current;
        }
    }
}
