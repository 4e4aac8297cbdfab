//! Registry of jobs waiting on unresolved dependencies.
//!
//! Jobs submitted with at least one unfinished predecessor are parked here
//! instead of a ready queue, so quiescence checks can still count them.
//! Promotion out of the registry happens implicitly: the last resolving
//! worker executes the job inline, and the finished entry is pruned the next
//! time the registry is read.

use parking_lot::Mutex;

use crate::job::Job;

/// Jobs submitted before their predecessors finished.
pub(crate) struct PendingRegistry {
    jobs: Mutex<Vec<Job>>,
}

impl PendingRegistry {
    pub(crate) fn new() -> Self {
        PendingRegistry {
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Registers a job whose dependencies are still being attached.
    pub(crate) fn insert(&self, job: &Job) {
        self.jobs.lock().push(job.clone());
    }

    /// Unregisters a job that turned out to have no pending predecessors.
    pub(crate) fn remove(&self, job: &Job) {
        self.jobs.lock().retain(|entry| !entry.same_job(job));
    }

    /// Number of registered jobs still gated behind a dependency.
    ///
    /// Finished entries are pruned here rather than from the execution path,
    /// which keeps workers off the registry lock entirely.
    pub(crate) fn pending_count(&self) -> usize {
        let mut jobs = self.jobs.lock();
        jobs.retain(|entry| !entry.is_finished());
        jobs.iter().filter(|entry| !entry.is_ready()).count()
    }

    /// True when no registered job is still gated behind a dependency.
    pub(crate) fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.jobs.lock().len()
    }
}
