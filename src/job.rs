//! Job definitions and dependency resolution.
//!
//! A [`Job`] couples a one-shot closure with the bookkeeping needed to order
//! it against other jobs: a remaining-dependency counter, the list of
//! dependants gated behind it, and a finished flag observed by waiters.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

/// Boxed one-shot closure executed by a worker thread.
pub(crate) type WorkFn = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    /// The work itself. Taken on execution so it can run at most once.
    work: Mutex<Option<WorkFn>>,
    /// Identifier used only for diagnostics.
    name: String,
    /// Unfinished predecessors. The job is ready when this reaches zero.
    remaining_dependencies: AtomicI32,
    /// Ready-transition hook slot. Stored but never invoked.
    on_ready: Mutex<Option<WorkFn>>,
    /// Jobs gated behind this one.
    dependants: Mutex<Vec<Job>>,
    /// Set after the work returns, before the dependant fan-out.
    finished: AtomicBool,
}

/// A unit of work with optional ordering predecessors.
///
/// `Job` is a cheap clonable handle; every clone refers to the same
/// underlying job. The handle held by the submitter stays valid for
/// inspection (`is_finished`) after ownership of the work transfers to the
/// engine on submission.
#[derive(Clone)]
pub struct Job {
    inner: Arc<Inner>,
}

impl Job {
    /// Creates a new job from a closure and a diagnostic name.
    ///
    /// The job carries no dependencies until it is submitted with
    /// predecessors or another job registers it as a dependant.
    pub fn new<F>(work: F, name: impl Into<String>) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Job {
            inner: Arc::new(Inner {
                work: Mutex::new(Some(Box::new(work))),
                name: name.into(),
                remaining_dependencies: AtomicI32::new(0),
                on_ready: Mutex::new(None),
                dependants: Mutex::new(Vec::new()),
                finished: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the job's diagnostic name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True when every predecessor has finished.
    pub fn is_ready(&self) -> bool {
        self.inner.remaining_dependencies.load(Ordering::Relaxed) == 0
    }

    /// True once the job's work has returned.
    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    /// Sets a hook associated with the job's ready transition.
    ///
    /// The slot is reserved for future use: the scheduler stores the
    /// callback but never invokes it.
    pub fn set_on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.inner.on_ready.lock();
        if slot.is_some() {
            trace!("{}: on_ready callback overwritten", self.name());
        }
        *slot = Some(Box::new(callback));
    }

    /// Registers `dependant` to run after this job.
    ///
    /// Returns `false` if this job already finished, in which case no edge is
    /// recorded and the caller must treat the predecessor as satisfied.
    /// Returning `true` guarantees exactly one later decrement of the
    /// dependant's counter.
    pub fn add_dependant(&self, dependant: &Job) -> bool {
        if self.is_finished() {
            return false;
        }

        let mut dependants = self.inner.dependants.lock();
        // `execute` publishes `finished` before taking this lock for its
        // fan-out snapshot, so a second check here is decisive: either the
        // entry lands in the snapshot or the registration is rejected.
        if self.is_finished() {
            return false;
        }
        trace!("{}: adding dependant {}", self.name(), dependant.name());
        dependants.push(dependant.clone());
        dependant.add_dependency();
        true
    }

    /// Records one more unfinished predecessor.
    ///
    /// Called from [`add_dependant`](Self::add_dependant) under the
    /// predecessor's dependants lock, and by the coordinator's submission
    /// hold.
    pub(crate) fn add_dependency(&self) {
        let remaining = self.inner.remaining_dependencies.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("{}: dependency added, remaining: {}", self.name(), remaining);
    }

    /// Marks one predecessor as finished.
    ///
    /// Returns `true` when this call resolved the last dependency, i.e. the
    /// job just became ready and must now be executed by the caller. The
    /// acquire-release decrement makes every write of the finished
    /// predecessor visible to whoever observes the counter at zero.
    pub(crate) fn resolve_dependency(&self) -> bool {
        let remaining = self
            .inner
            .remaining_dependencies
            .fetch_sub(1, Ordering::AcqRel)
            - 1;
        trace!("{}: resolving dependency, remaining: {}", self.name(), remaining);
        remaining == 0
    }

    /// Runs the work, publishes completion, and notifies dependants.
    ///
    /// Returns the dependants whose last dependency this job resolved; the
    /// calling worker executes them next. No lock is held while the user
    /// closure runs, and the dependants list is snapshotted before any
    /// resolver is invoked.
    pub(crate) fn execute(&self) -> Vec<Job> {
        trace!("{}: executing", self.name());
        let work = self.inner.work.lock().take();
        if let Some(work) = work {
            work();
        }
        self.inner.finished.store(true, Ordering::Release);

        let snapshot = self.inner.dependants.lock().clone();
        let mut ready = Vec::new();
        for dependant in snapshot {
            if !dependant.is_ready() && dependant.resolve_dependency() {
                ready.push(dependant);
            }
        }
        ready
    }

    /// True when both handles refer to the same job.
    pub(crate) fn same_job(&self, other: &Job) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.inner.name)
            .field(
                "remaining_dependencies",
                &self.inner.remaining_dependencies.load(Ordering::Relaxed),
            )
            .field("finished", &self.is_finished())
            .finish()
    }
}
