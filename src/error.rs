//! Error types for the job system.

use thiserror::Error;

/// Errors reported by the job system.
///
/// The scheduling engine itself has no runtime failure modes; the only
/// fallible surface is shutdown, which joins the worker threads and reports
/// any that panicked while draining.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more worker threads panicked before they could be joined.
    #[error("{0} worker thread(s) panicked during shutdown")]
    WorkerPanicked(usize),
}
