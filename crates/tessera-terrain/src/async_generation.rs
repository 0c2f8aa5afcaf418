//! Asynchronous height grid generation on a worker thread pool.
//!
//! Offloads noise sampling to background threads and delivers completed
//! grids through a channel drained once per tick on the main thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use dashmap::DashMap;

use crate::coord::ChunkCoord;
use crate::height_grid::{HeightGrid, HeightRange};
use crate::source::HeightSource;

/// A generated height grid ready to hand to its chunk.
#[derive(Debug)]
pub struct GeneratedHeights {
    /// The chunk the grid belongs to.
    pub coord: ChunkCoord,
    /// The bordered height grid.
    pub grid: HeightGrid,
    /// Min/max over the grid.
    pub range: HeightRange,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Generates height grids for chunk coordinates across a thread pool.
pub struct AsyncHeightGenerator {
    /// Sender for submitting coordinates to workers.
    task_sender: Sender<ChunkCoord>,
    /// Receiver for collecting completed grids on the main thread.
    result_receiver: Receiver<GeneratedHeights>,
    /// Coordinates queued or being generated.
    pending: Arc<DashMap<ChunkCoord, ()>>,
    /// Current number of in-flight tasks.
    in_flight: Arc<AtomicU64>,
}

impl AsyncHeightGenerator {
    /// Spawn `thread_count` workers sharing `source`.
    ///
    /// `max_queued` bounds the task queue; submissions beyond it are rejected.
    pub fn new<S: HeightSource + 'static>(
        source: Arc<S>,
        thread_count: usize,
        max_queued: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<ChunkCoord>(max_queued.max(1));
        let (result_sender, result_receiver) = unbounded::<GeneratedHeights>();
        let in_flight = Arc::new(AtomicU64::new(0));
        let pending: Arc<DashMap<ChunkCoord, ()>> = Arc::new(DashMap::new());

        for i in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let pending = Arc::clone(&pending);
            let source = Arc::clone(&source);

            std::thread::Builder::new()
                .name(format!("height-worker-{i}"))
                .spawn(move || {
                    while let Ok(coord) = receiver.recv() {
                        let start = std::time::Instant::now();
                        let result = source.generate(coord);
                        if let Err(e) = &result {
                            // Nothing will be drained for this coord.
                            pending.remove(&coord);
                            tracing::error!("height generation for chunk {coord} failed: {e}");
                        }
                        // Decrement before sending so a drained result implies a settled count.
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                        if let Ok(grid) = result {
                            let range = grid.range();
                            let _ = sender.send(GeneratedHeights {
                                coord,
                                grid,
                                range,
                                generation_time_us: start.elapsed().as_micros() as u64,
                            });
                        }
                    }
                })?;
        }

        Ok(Self {
            task_sender,
            result_receiver,
            pending,
            in_flight,
        })
    }

    /// Thread count based on CPU cores, leaving headroom for the main thread.
    pub fn default_thread_count() -> usize {
        let cpus = num_cpus::get().max(2);
        (cpus - 2).max(1)
    }

    /// Queue a chunk for generation.
    ///
    /// Returns `false` if the queue is full or the workers are gone.
    pub fn submit(&self, coord: ChunkCoord) -> bool {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(coord, ());
        if self.task_sender.try_send(coord).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            self.pending.remove(&coord);
            tracing::warn!("height queue full, dropped request for chunk {coord}");
            return false;
        }
        true
    }

    /// Drain all completed grids. Call once per tick on the main thread.
    pub fn drain_results(&self) -> Vec<GeneratedHeights> {
        let mut results = Vec::new();
        while let Ok(generated) = self.result_receiver.try_recv() {
            self.pending.remove(&generated.coord);
            results.push(generated);
        }
        results
    }

    /// Number of tasks currently queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a grid for `coord` is queued or being generated.
    pub fn is_pending(&self, coord: &ChunkCoord) -> bool {
        self.pending.contains_key(coord)
    }
}
