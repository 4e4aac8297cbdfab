//! Integration tests for the job scheduler.

use crate::{Job, JobSystem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_basic_job_execution() {
    let job_system = JobSystem::new(2);
    let value = Arc::new(AtomicUsize::new(0));
    let value_clone = value.clone();

    let job = Job::new(
        move || {
            value_clone.store(42, Ordering::SeqCst);
        },
        "basic",
    );
    job_system.submit(job.clone());
    job_system.wait(&job);

    assert_eq!(value.load(Ordering::SeqCst), 42);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_parallel_job_execution() {
    let job_system = JobSystem::new(4);
    let sum = Arc::new(AtomicUsize::new(0));

    let num_jobs = 100;
    for index in 0..num_jobs {
        let sum_clone = sum.clone();
        job_system.submit(Job::new(
            move || {
                sum_clone.fetch_add(index, Ordering::SeqCst);
            },
            format!("add-{index}"),
        ));
    }
    job_system.wait_for_all_jobs();

    let expected_sum: usize = (0..num_jobs).sum();
    assert_eq!(sum.load(Ordering::SeqCst), expected_sum);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_dependency_chain_runs_in_order() {
    let job_system = JobSystem::new(4);
    let order = Arc::new(Mutex::new(Vec::new()));

    let make = |name: &'static str| {
        let order = order.clone();
        Job::new(
            move || {
                order.lock().unwrap().push(name);
            },
            name,
        )
    };

    let first = make("first");
    let second = make("second");
    let third = make("third");

    job_system.submit_with_dependencies(third.clone(), &[second.clone()]);
    job_system.submit_with_dependencies(second.clone(), &[first.clone()]);
    job_system.submit(first);
    job_system.wait(&third);

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_pending_jobs_counts_gated_work() {
    let job_system = JobSystem::new(2);

    // While paused nothing runs, so both the queue entry and the gated
    // registry entry are observable.
    let root = Job::new(|| {}, "root");
    let gated = Job::new(|| {}, "gated");
    job_system.submit_with_dependencies(gated.clone(), &[root.clone()]);
    job_system.submit(root);

    assert_eq!(job_system.pending_jobs(), 2);

    job_system.wait_for_all_jobs();
    assert_eq!(job_system.pending_jobs(), 0);
    assert!(gated.is_finished());
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_fan_out_runs_every_dependant_once() {
    let job_system = JobSystem::new(4);
    let runs = Arc::new(AtomicUsize::new(0));

    let root = Job::new(|| {}, "root");
    let mut leaves = Vec::new();
    for index in 0..32 {
        let runs_clone = runs.clone();
        let leaf = Job::new(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
            },
            format!("leaf-{index}"),
        );
        job_system.submit_with_dependencies(leaf.clone(), &[root.clone()]);
        leaves.push(leaf);
    }
    job_system.submit(root);
    job_system.wait_for_all_jobs();

    assert_eq!(runs.load(Ordering::SeqCst), 32);
    assert!(leaves.iter().all(|leaf| leaf.is_finished()));
    job_system.shutdown().expect("shutdown failed");
}
