//! Asynchronous meshing pipeline: offloads LOD mesh builds to a thread pool
//! using shared height grids and channels for result delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use tessera_terrain::{ChunkCoord, HeightGrid};

use crate::builder::MeshSettings;
use crate::mesh_data::MeshData;

/// A self-contained meshing task that can run on any thread.
pub struct MeshingTask {
    /// The chunk this mesh is for.
    pub coord: ChunkCoord,
    /// LOD table slot the result fills.
    pub slot: usize,
    /// Detail level to build at.
    pub lod: u32,
    /// The chunk's height grid, shared with the main thread.
    pub grid: Arc<HeightGrid>,
}

/// The result of a completed meshing task.
pub struct MeshingResult {
    /// The chunk this mesh is for.
    pub coord: ChunkCoord,
    /// LOD table slot the mesh fills.
    pub slot: usize,
    /// The built mesh.
    pub mesh: MeshData,
    /// Build time in microseconds.
    pub build_time_us: u64,
}

/// Asynchronous meshing pipeline backed by a thread pool.
///
/// The main thread submits [`MeshingTask`]s via [`submit`](Self::submit) and
/// collects [`MeshingResult`]s each tick via
/// [`drain_results`](Self::drain_results). Meshing never blocks the main
/// thread.
pub struct MeshingPipeline {
    task_sender: Option<crossbeam_channel::Sender<MeshingTask>>,
    result_receiver: crossbeam_channel::Receiver<MeshingResult>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks that can be in flight simultaneously.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
}

impl MeshingPipeline {
    /// Creates a pipeline with `worker_count` threads and a task budget.
    pub fn new(
        worker_count: usize,
        budget: usize,
        settings: Arc<MeshSettings>,
    ) -> std::io::Result<Self> {
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let worker_count = worker_count.max(1);
        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx: crossbeam_channel::Receiver<MeshingTask> = task_rx.clone();
            let tx = result_tx.clone();
            let settings = Arc::clone(&settings);
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("mesh-worker-{i}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let start = std::time::Instant::now();
                        let built = settings.build(&task.grid, task.lod);
                        flight.fetch_sub(1, Ordering::Relaxed);
                        match built {
                            Ok(mesh) => {
                                let _ = tx.send(MeshingResult {
                                    coord: task.coord,
                                    slot: task.slot,
                                    mesh,
                                    build_time_us: start.elapsed().as_micros() as u64,
                                });
                            }
                            Err(e) => {
                                tracing::error!(
                                    "meshing chunk {} at lod {} failed: {e}",
                                    task.coord,
                                    task.lod
                                );
                            }
                        }
                    }
                })?;
            handles.push(handle);
        }

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
        })
    }

    /// Submit a meshing task. Returns `false` if the budget is exhausted
    /// or the pipeline has been shut down.
    pub fn submit(&self, task: MeshingTask) -> bool {
        let sender = match &self.task_sender {
            Some(s) => s,
            None => return false,
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            tracing::warn!("mesh budget exhausted, dropped request for chunk {}", task.coord);
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.try_send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Drain all completed results. Called once per tick on the main thread.
    pub fn drain_results(&self) -> Vec<MeshingResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            results.push(result);
        }
        results
    }

    /// Number of tasks currently being processed or queued by workers.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Shut down all worker threads gracefully.
    ///
    /// Drops the task sender to signal workers to exit, then joins all threads.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for MeshingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
