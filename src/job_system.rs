//! High-level job system interface.
//!
//! The [`JobSystem`] is the primary entry point for scheduling parallel
//! work. It owns the ready queues, the worker pool, the registry of jobs
//! gated behind dependencies, and the counters that define quiescence.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam::utils::Backoff;
use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::error::Error;
use crate::job::Job;
use crate::metrics::{ThreadStats, ThreadUtilization};
use crate::queue::ReadyQueues;
use crate::registry::PendingRegistry;
use crate::worker::WorkerPool;

/// Shared flags, counters, and the park condition variable.
///
/// All park-predicate inputs are atomics; writers take `park_lock` around
/// the mutation (or immediately before notifying) so a worker evaluating the
/// predicate under the lock can never miss a wake-up.
pub(crate) struct Control {
    paused: AtomicBool,
    shutdown: AtomicBool,
    submitted: AtomicUsize,
    completed: AtomicUsize,
    park_lock: Mutex<()>,
    work_available: Condvar,
}

impl Control {
    fn new() -> Self {
        Control {
            // The pool starts paused; resume() or one of the waits releases
            // the workers.
            paused: AtomicBool::new(true),
            shutdown: AtomicBool::new(false),
            submitted: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            park_lock: Mutex::new(()),
            work_available: Condvar::new(),
        }
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Acquire)
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Counts a submission. Runs under the park lock, and before the queue
    /// push, so the predicate sees the job the instant it exists and
    /// `submitted >= completed` holds at every instant.
    fn record_submission(&self) {
        let _guard = self.park_lock.lock();
        self.submitted.fetch_add(1, Ordering::Release);
    }

    /// Counts a completed queue job (inline dependants are not counted;
    /// they stay accounted to the registry until they finish).
    pub(crate) fn complete_one(&self) {
        self.completed.fetch_add(1, Ordering::Release);
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.broadcast();
    }

    /// Wakes every parked worker. Broadcast, not single notify: stealing
    /// means any parked worker may service a new job.
    fn broadcast(&self) {
        drop(self.park_lock.lock());
        self.work_available.notify_all();
    }

    /// Blocks until there is a reason to run. Returns `true` when the worker
    /// should exit: shutdown was requested and every submitted job has
    /// completed.
    pub(crate) fn park(&self) -> bool {
        let mut guard = self.park_lock.lock();
        loop {
            if self.shutdown_requested()
                || (!self.is_paused() && self.submitted() > self.completed())
            {
                break;
            }
            self.work_available.wait(&mut guard);
        }
        self.shutdown_requested() && self.submitted() == self.completed()
    }
}

/// The main job system managing worker threads and job execution.
///
/// Jobs are distributed round-robin across per-worker ready queues; idle
/// workers steal from their peers. Jobs submitted with dependencies wait in
/// a registry and are executed inline by whichever worker resolves their
/// last predecessor.
///
/// The pool is created paused; call [`resume`](Self::resume) (or one of the
/// wait operations, which resume implicitly) to start execution.
pub struct JobSystem {
    queues: Arc<ReadyQueues>,
    registry: PendingRegistry,
    control: Arc<Control>,
    stats: Vec<Arc<ThreadStats>>,
    pool: WorkerPool,
    joined: bool,
}

impl JobSystem {
    /// Creates a new job system with the specified number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `worker_count` is zero.
    pub fn new(worker_count: usize) -> Self {
        Self::with_pinning(worker_count, false)
    }

    /// Creates a new job system with each worker pinned to a CPU core.
    ///
    /// Workers are assigned to cores in index order, wrapping when there are
    /// more workers than cores.
    pub fn new_with_affinity(worker_count: usize) -> Self {
        Self::with_pinning(worker_count, true)
    }

    /// Creates a job system with one worker per available CPU core.
    pub fn with_default_threads() -> Self {
        let worker_count = thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(4);
        Self::new(worker_count)
    }

    fn with_pinning(worker_count: usize, pin_to_cores: bool) -> Self {
        assert!(worker_count > 0, "worker count must be nonzero");

        let queues = Arc::new(ReadyQueues::new(worker_count));
        let control = Arc::new(Control::new());
        let stats: Vec<_> = (0..worker_count)
            .map(|_| Arc::new(ThreadStats::new()))
            .collect();
        let pool = WorkerPool::new(&queues, &control, &stats, pin_to_cores);

        JobSystem {
            queues,
            registry: PendingRegistry::new(),
            control,
            stats,
            pool,
            joined: false,
        }
    }

    /// Submits a job with no ordering constraints.
    ///
    /// Ownership of the job transfers to the engine; keep a clone of the
    /// handle to wait on it.
    pub fn submit(&self, job: Job) {
        self.control.record_submission();
        let target = self.queues.push(job);
        trace!("submitted to queue {target}");
        self.control.broadcast();
    }

    /// Submits a job that must run after every job in `dependencies`.
    ///
    /// Predecessors that already finished are silently treated as satisfied.
    /// If every predecessor finished, the job is enqueued immediately;
    /// otherwise it waits in the registry and the worker resolving its last
    /// dependency executes it inline.
    ///
    /// The dependency graph must be acyclic. Cycles are not detected; jobs
    /// on a cycle stay gated forever.
    pub fn submit_with_dependencies(&self, job: Job, dependencies: &[Job]) {
        if dependencies.is_empty() {
            trace!("{}: no dependencies, submitting directly", job.name());
            self.submit(job);
            return;
        }

        self.registry.insert(&job);

        // Submission hold: one extra dependency keeps the job from going
        // ready while edges are still being attached, so a predecessor that
        // finishes mid-loop cannot start it early.
        job.add_dependency();
        for dependency in dependencies {
            if !dependency.add_dependant(&job) {
                debug!(
                    "{}: predecessor {} already finished, edge dropped",
                    job.name(),
                    dependency.name()
                );
            }
        }

        if job.resolve_dependency() {
            // Every predecessor finished before registration completed.
            self.registry.remove(&job);
            self.submit(job);
        }
    }

    /// Temporarily stops workers from picking up new jobs.
    ///
    /// Cooperative: jobs already executing run to completion.
    pub fn pause(&self) {
        debug!("pausing job execution");
        self.control.set_paused(true);
    }

    /// Resumes job execution.
    pub fn resume(&self) {
        debug!("resuming job execution");
        self.control.set_paused(false);
        // Workers parked while the pool was paused re-evaluate the predicate
        // now rather than on the next submission.
        self.control.broadcast();
    }

    /// Blocks until `job` has finished, resuming the pool first.
    ///
    /// Spins with yields rather than sleeping; callers are expected to wait
    /// for work measured in milliseconds or more.
    pub fn wait(&self, job: &Job) {
        self.resume();
        let backoff = Backoff::new();
        while !job.is_finished() {
            backoff.snooze();
        }
        trace!("{}: finished", job.name());
    }

    /// Blocks until every submitted job has completed, resuming the pool
    /// first.
    ///
    /// Quiescence requires empty queues, no registry entry still gated
    /// behind a dependency, and the completed count having caught up with
    /// submissions; the last clause covers dependants executing inline
    /// inside a predecessor that has already left its queue. Dependants
    /// registered after this call returns are not accounted for.
    pub fn wait_for_all_jobs(&self) {
        self.resume();
        let backoff = Backoff::new();
        while self.pending_jobs() > 0 || self.control.submitted() != self.control.completed() {
            backoff.snooze();
        }
    }

    /// Number of jobs waiting to run: queued jobs plus registry entries
    /// still gated behind a dependency.
    pub fn pending_jobs(&self) -> usize {
        self.queues.len() + self.registry.pending_count()
    }

    /// Total jobs enqueued on the ready queues so far.
    pub fn submitted_jobs(&self) -> usize {
        self.control.submitted()
    }

    /// Total queue jobs that have finished, dependant fan-out included.
    pub fn completed_jobs(&self) -> usize {
        self.control.completed()
    }

    /// Returns the number of worker threads in the system.
    pub fn num_workers(&self) -> usize {
        self.pool.size()
    }

    /// Returns a utilization snapshot for every worker thread.
    pub fn thread_utilization(&self) -> Vec<ThreadUtilization> {
        self.stats
            .iter()
            .enumerate()
            .map(|(thread, stats)| stats.snapshot(thread))
            .collect()
    }

    /// Prints the active/idle split for each worker thread.
    pub fn print_thread_utilization(&self) {
        for snapshot in self.thread_utilization() {
            println!("{snapshot}");
        }
    }

    /// Shuts down the job system, draining all submitted work first.
    ///
    /// Returns an error if any worker threads panicked.
    pub fn shutdown(mut self) -> Result<(), Error> {
        let failed = self.signal_and_join();
        if failed > 0 {
            Err(Error::WorkerPanicked(failed))
        } else {
            Ok(())
        }
    }

    fn signal_and_join(&mut self) -> usize {
        debug!("shutting down job system");
        self.control.request_shutdown();
        let failed = self.pool.join_all();
        // Shutdown drains the queues, so anything still gated here had a
        // predecessor that never ran.
        if !self.registry.is_empty() {
            warn!("shut down with jobs still gated behind unresolved dependencies");
        }
        self.joined = true;
        failed
    }
}

impl Default for JobSystem {
    fn default() -> Self {
        JobSystem::with_default_threads()
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        if !self.joined {
            self.signal_and_join();
        }
    }
}
