//! Per-worker ready queues.
//!
//! One FIFO deque per worker thread, each behind its own mutex. Submission
//! pushes to the back of the next queue in round-robin order; the owning
//! worker pops from the front, and idle workers steal from the front of
//! foreign queues.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::job::Job;

/// The ready-queue array shared between the coordinator and the workers.
pub(crate) struct ReadyQueues {
    queues: Vec<Mutex<VecDeque<Job>>>,
    next: AtomicUsize,
}

impl ReadyQueues {
    /// Creates one queue per worker.
    pub(crate) fn new(worker_count: usize) -> Self {
        ReadyQueues {
            queues: (0..worker_count).map(|_| Mutex::new(VecDeque::new())).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Enqueues a job on the next queue in round-robin order.
    ///
    /// Returns the index of the queue chosen. Placement is deliberately not
    /// load-aware; stealing rebalances.
    pub(crate) fn push(&self, job: Job) -> usize {
        let target = self.next.fetch_add(1, Ordering::Relaxed) % self.queues.len();
        self.queues[target].lock().push_back(job);
        target
    }

    /// Pops the front of the caller's own queue.
    pub(crate) fn pop_local(&self, worker: usize) -> Option<Job> {
        self.queues[worker].lock().pop_front()
    }

    /// Takes the front of the first non-empty foreign queue, in index order.
    pub(crate) fn steal(&self, thief: usize) -> Option<Job> {
        for (index, queue) in self.queues.iter().enumerate() {
            if index == thief {
                continue;
            }
            if let Some(job) = queue.lock().pop_front() {
                return Some(job);
            }
        }
        None
    }

    /// Total number of queued jobs, summed one queue lock at a time.
    pub(crate) fn len(&self) -> usize {
        self.queues.iter().map(|queue| queue.lock().len()).sum()
    }
}
