//! # jobgraph - Dependency-Aware Job Scheduler
//!
//! A multi-threaded job scheduler for embarrassingly-parallel workloads
//! where work graphs form dynamically. Jobs are opaque closures ordered by
//! explicit pairwise constraints ("X must complete before Y starts") and
//! executed by a fixed pool of worker threads.
//!
//! ## Architecture
//!
//! - **Jobs**: one-shot closures with a remaining-dependency counter and a
//!   list of dependants gated behind them
//! - **Ready queues**: one FIFO queue per worker; submission is round-robin
//! - **Work stealing**: idle workers take from the front of foreign queues
//! - **Inline resolution**: the worker resolving a job's last dependency
//!   executes it immediately, draining chains without re-queueing
//! - **Pause/resume and quiescence**: cooperative pause, and a submitted ==
//!   completed predicate backing `wait_for_all_jobs` and shutdown
//!
//! ## Example
//!
//! ```no_run
//! use jobgraph::{Job, JobSystem};
//!
//! let job_system = JobSystem::new(4); // 4 worker threads
//!
//! let load = Job::new(|| println!("loading"), "load");
//! let parse = Job::new(|| println!("parsing"), "parse");
//!
//! job_system.submit_with_dependencies(parse.clone(), &[load.clone()]);
//! job_system.submit(load);
//! job_system.wait(&parse);
//! ```

pub mod error;
pub mod job;
pub mod job_system;
pub mod metrics;
mod queue;
mod registry;
mod worker;

pub use error::Error;
pub use job::Job;
pub use job_system::JobSystem;
pub use metrics::ThreadUtilization;

#[cfg(test)]
mod tests;
