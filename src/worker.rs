//! Worker thread implementation.
//!
//! Each worker owns one ready queue, prefers its own work, and falls back to
//! stealing from its peers. A worker that finds nothing parks on the
//! coordinator's condition variable until a submission, a resume, or
//! shutdown wakes it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use core_affinity::CoreId;
use log::{debug, error, trace};

use crate::job_system::Control;
use crate::metrics::ThreadStats;
use crate::queue::ReadyQueues;

/// A worker thread that executes jobs from the ready queues.
pub(crate) struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

/// Parameters for creating a new worker thread.
pub(crate) struct WorkerParams {
    pub(crate) id: usize,
    pub(crate) queues: Arc<ReadyQueues>,
    pub(crate) control: Arc<Control>,
    pub(crate) stats: Arc<ThreadStats>,
    pub(crate) core_id: Option<CoreId>,
}

impl Worker {
    /// Creates and starts a new worker thread.
    pub(crate) fn new(params: WorkerParams) -> Self {
        let id = params.id;
        let handle = thread::Builder::new()
            .name(format!("jobgraph-worker-{id}"))
            .spawn(move || {
                if let Some(core_id) = params.core_id {
                    core_affinity::set_for_current(core_id);
                }
                Worker::run_loop(params);
            })
            .expect("failed to spawn worker thread");

        Worker {
            id,
            handle: Some(handle),
        }
    }

    /// Main execution loop for the worker thread.
    fn run_loop(params: WorkerParams) {
        let WorkerParams {
            id,
            queues,
            control,
            stats,
            ..
        } = params;

        debug!("worker {id} started");
        loop {
            // Pause is cooperative: queues are left untouched and anything
            // already running finishes. Shutdown overrides pause so a paused
            // pool can still drain and join.
            if control.is_paused() && !control.shutdown_requested() {
                thread::yield_now();
                continue;
            }

            let search_start = Instant::now();
            let mut stolen = false;
            let job = queues.pop_local(id).or_else(|| {
                stolen = true;
                queues.steal(id)
            });

            let Some(job) = job else {
                stats.add_idle(search_start.elapsed());
                if control.park() {
                    debug!("worker {id} exiting");
                    return;
                }
                continue;
            };

            if stolen {
                stats.record_steal();
                trace!("worker {id} stole {}", job.name());
            }

            // Drain the job plus everything it makes ready, iteratively:
            // deep chains cost heap, not stack, and the popped job is only
            // dropped once its entire fan-out has run.
            let run_start = Instant::now();
            let mut run_next = vec![job];
            while let Some(job) = run_next.pop() {
                let mut ready = job.execute();
                stats.record_executed();
                run_next.append(&mut ready);
            }
            stats.add_active(run_start.elapsed());
            control.complete_one();
        }
    }

    /// Returns the worker's ID.
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Waits for the worker thread to finish.
    pub(crate) fn join(mut self) -> thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

/// The fixed set of worker threads servicing the ready queues.
pub(crate) struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Spawns one worker per ready queue.
    ///
    /// With `pin_to_cores` set, workers are pinned to cores in index order,
    /// wrapping when there are more workers than cores.
    pub(crate) fn new(
        queues: &Arc<ReadyQueues>,
        control: &Arc<Control>,
        stats: &[Arc<ThreadStats>],
        pin_to_cores: bool,
    ) -> Self {
        let core_ids = if pin_to_cores {
            core_affinity::get_core_ids().unwrap_or_default()
        } else {
            Vec::new()
        };

        let workers = stats
            .iter()
            .enumerate()
            .map(|(id, stats)| {
                Worker::new(WorkerParams {
                    id,
                    queues: Arc::clone(queues),
                    control: Arc::clone(control),
                    stats: Arc::clone(stats),
                    core_id: core_ids.get(id % core_ids.len().max(1)).copied(),
                })
            })
            .collect();

        WorkerPool { workers }
    }

    /// Returns the number of worker threads in the pool.
    pub(crate) fn size(&self) -> usize {
        self.workers.len()
    }

    /// Joins every worker, returning how many panicked.
    ///
    /// Callers must have requested shutdown first or this blocks forever.
    pub(crate) fn join_all(&mut self) -> usize {
        let mut failed = 0;
        for worker in self.workers.drain(..) {
            let id = worker.id();
            if worker.join().is_err() {
                failed += 1;
                error!("worker {id} panicked during execution");
            }
        }
        failed
    }
}
