//! Streaming scenarios driven from viewer movement to surface assignment.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use tessera_config::StreamingConfig;
use tessera_lod::{LodInfo, LodTable};
use tessera_mesh::MeshSettings;
use tessera_streaming::testing::{RecordingBackend, RecordingSurface};
use tessera_streaming::{ChunkStreamer, StreamerSettings, WorkerBackend, viewer_position};
use tessera_terrain::{ChunkCoord, HeightSource, HeightmapParams, NoiseHeightSource};

const MAP_CHUNK_SIZE: u32 = 101;

/// Chunk size 100; row 0 (stride 1) to 100, row 1 (stride 2) to 300.
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
    StreamerSettings::new(MAP_CHUNK_SIZE, table, 25.0, 1.0).unwrap()
}

fn noise_source() -> Arc<NoiseHeightSource> {
    let params = HeightmapParams {
        seed: 42,
        ..Default::default()
    };
    Arc::new(NoiseHeightSource::new(params, MAP_CHUNK_SIZE as usize, None).unwrap())
}

#[test]
fn test_chunk_at_150_resolves_to_row_1_then_hides_at_350() {
    let source = noise_source();
    let mesh_settings = MeshSettings::default();
    let mut streamer = ChunkStreamer::new(
        settings(),
        RecordingBackend::default(),
        RecordingSurface::default(),
    );
    assert_eq!(streamer.settings().chunks_visible(), 3);

    streamer.on_viewer_moved(Vec2::ZERO);
    let coord = ChunkCoord::new(2, 0);
    assert_eq!(streamer.chunk(coord).unwrap().bounds().distance(Vec2::ZERO), 150.0);

    let grid = Arc::new(source.generate(coord).unwrap());
    let range = grid.range();
    streamer.on_height_received(coord, grid, range);

    let requests = streamer.backend().mesh_requests_for(coord);
    assert_eq!(requests.len(), 1, "exactly one mesh request");
    assert_eq!(requests[0].slot, 1);
    assert_eq!(requests[0].lod, 1);

    let completions = streamer.backend().build_requested(&mesh_settings);
    for completion in completions {
        streamer.apply(completion);
    }
    let chunk = streamer.chunk(coord).unwrap();
    assert!(chunk.is_visible());
    assert_eq!(chunk.assigned_lod(), Some(1));
    assert!(streamer.surface().render.contains_key(&coord));

    // Re-running passes without data changes issues nothing new.
    streamer.update_visible_chunks();
    streamer.update_visible_chunks();
    assert_eq!(streamer.backend().mesh_requests_for(coord).len(), 1);

    assert!(streamer.on_viewer_moved(Vec2::new(-200.0, 0.0)));
    let chunk = streamer.chunk(coord).unwrap();
    assert_eq!(chunk.bounds().distance(Vec2::new(-200.0, 0.0)), 350.0);
    assert!(!chunk.is_visible());
    assert!(!streamer.visible_chunks().contains(&coord));
    assert_eq!(
        streamer.backend().mesh_requests_for(coord).len(),
        1,
        "hiding must not request meshes"
    );
}

#[test]
fn test_repeated_builds_are_bit_identical() {
    let source = noise_source();
    let settings = MeshSettings::default();
    let grid = source.generate(ChunkCoord::new(-1, 4)).unwrap();
    let a = settings.build(&grid, 1).unwrap();
    let b = settings.build(&grid, 1).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_neighbouring_chunks_agree_on_edges_at_every_lod() {
    let source = noise_source();
    let settings = MeshSettings {
        height_multiplier: 30.0,
        ..Default::default()
    };
    let west_grid = source.generate(ChunkCoord::new(0, 0)).unwrap();
    let east_grid = source.generate(ChunkCoord::new(1, 0)).unwrap();
    for lod in [0, 1, 2] {
        let west = settings.build(&west_grid, lod).unwrap();
        let east = settings.build(&east_grid, lod).unwrap();
        let line = (west.vertex_count() as f64).sqrt() as usize;
        for row in 0..line {
            let w = row * line + line - 1;
            let e = row * line;
            assert!(
                (west.positions[w][1] - east.positions[e][1]).abs() < 1e-4,
                "lod {lod} row {row}: edge heights {} vs {}",
                west.positions[w][1],
                east.positions[e][1]
            );
            for k in 0..3 {
                assert!(
                    (west.normals[w][k] - east.normals[e][k]).abs() < 1e-4,
                    "lod {lod} row {row}: west {:?} vs east {:?}",
                    west.normals[w],
                    east.normals[e]
                );
            }
        }
    }
}

#[test]
fn test_worker_backend_streams_around_viewer() {
    let config = StreamingConfig {
        height_workers: 2,
        mesh_workers: 2,
        ..Default::default()
    };
    let backend =
        WorkerBackend::new(noise_source(), Arc::new(MeshSettings::default()), &config).unwrap();
    let mut streamer = ChunkStreamer::new(settings(), backend, RecordingSurface::default());

    // World position scaled by 1.0 projects straight onto the terrain plane.
    streamer.on_viewer_moved(viewer_position(Vec3::new(0.0, 40.0, 0.0), 1.0));
    let near = ChunkCoord::new(0, 0);
    let far = ChunkCoord::new(2, 0);

    let deadline = Instant::now() + Duration::from_secs(60);
    loop {
        streamer.process_completions();
        let near_ready = streamer.chunk(near).and_then(|c| c.assigned_lod()) == Some(0);
        let far_ready = streamer.chunk(far).and_then(|c| c.assigned_lod()) == Some(1);
        if near_ready && far_ready && streamer.chunk(near).unwrap().has_collision_mesh() {
            break;
        }
        assert!(Instant::now() < deadline, "timed out waiting for meshes");
        std::thread::sleep(Duration::from_millis(2));
    }

    let near_mesh = &streamer.surface().render[&near].1;
    assert_eq!(near_mesh.vertex_count(), 101 * 101);
    let far_mesh = &streamer.surface().render[&far].1;
    assert_eq!(far_mesh.vertex_count(), 51 * 51);
    assert!(streamer.surface().collision.contains_key(&near));
    assert!(!streamer.surface().collision.contains_key(&far));

    streamer.on_viewer_moved(Vec2::new(-200.0, 0.0));
    assert!(!streamer.chunk(far).unwrap().is_visible());
    assert!(streamer.chunk(near).unwrap().is_visible());
}
