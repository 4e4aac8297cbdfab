//! High-volume and pathological-graph stress tests.

use jobgraph::{Job, JobSystem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn spin_work() {
    let mut total = 0u64;
    for value in 0..100 {
        total = total.wrapping_add(value * value);
    }
    std::hint::black_box(total);
}

#[test]
fn test_hundred_thousand_independent_jobs() {
    let job_system = JobSystem::with_default_threads();
    let runs = Arc::new(AtomicUsize::new(0));
    let num_jobs = 100_000;

    job_system.resume();
    for _ in 0..num_jobs {
        let runs_clone = runs.clone();
        job_system.submit(Job::new(
            move || {
                spin_work();
                runs_clone.fetch_add(1, Ordering::Relaxed);
            },
            "stress",
        ));
    }
    job_system.wait_for_all_jobs();

    assert_eq!(runs.load(Ordering::Relaxed), num_jobs);
    assert_eq!(job_system.completed_jobs(), num_jobs);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
#[ignore = "long-running full-scale stress run"]
fn test_one_million_independent_jobs() {
    let job_system = JobSystem::with_default_threads();
    let runs = Arc::new(AtomicUsize::new(0));
    let num_jobs = 1_000_000;

    job_system.resume();
    for _ in 0..num_jobs {
        let runs_clone = runs.clone();
        job_system.submit(Job::new(
            move || {
                spin_work();
                runs_clone.fetch_add(1, Ordering::Relaxed);
            },
            "stress",
        ));
    }
    job_system.wait_for_all_jobs();

    assert_eq!(runs.load(Ordering::Relaxed), num_jobs);
    assert_eq!(job_system.completed_jobs(), num_jobs);

    // Workers should have spent the bulk of their measured time executing.
    let snapshots = job_system.thread_utilization();
    let active_total: f64 = snapshots.iter().map(|snapshot| snapshot.active_percent()).sum();
    assert!(active_total > 0.0);

    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_deep_chain_drains_iteratively() {
    // A long linear chain resolves inline on whichever worker finishes the
    // root; depth must cost heap, not stack.
    let job_system = JobSystem::new(2);
    let runs = Arc::new(AtomicUsize::new(0));
    let depth = 50_000;

    let root = Job::new(|| {}, "link-0");
    let mut previous = root.clone();
    let mut last = root.clone();
    for index in 1..depth {
        let runs_clone = runs.clone();
        let link = Job::new(
            move || {
                runs_clone.fetch_add(1, Ordering::Relaxed);
            },
            format!("link-{index}"),
        );
        job_system.submit_with_dependencies(link.clone(), &[previous]);
        previous = link.clone();
        last = link;
    }
    job_system.submit(root);
    job_system.wait(&last);

    assert_eq!(runs.load(Ordering::Relaxed), depth - 1);
    job_system.wait_for_all_jobs();
    assert_eq!(job_system.pending_jobs(), 0);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_wide_fan_out_and_join() {
    // One root fans out to many leaves which all join into a single sink.
    let job_system = JobSystem::new(4);
    let runs = Arc::new(AtomicUsize::new(0));
    let width = 1_000;

    job_system.pause();
    let root = Job::new(|| {}, "root");
    let sink = Job::new(|| {}, "sink");
    let mut leaves = Vec::with_capacity(width);
    for index in 0..width {
        let runs_clone = runs.clone();
        let leaf = Job::new(
            move || {
                runs_clone.fetch_add(1, Ordering::Relaxed);
            },
            format!("leaf-{index}"),
        );
        job_system.submit_with_dependencies(leaf.clone(), &[root.clone()]);
        leaves.push(leaf);
    }
    job_system.submit_with_dependencies(sink.clone(), &leaves);
    job_system.submit(root);

    job_system.wait(&sink);
    assert_eq!(runs.load(Ordering::Relaxed), width);
    assert!(sink.is_finished());
    job_system.shutdown().expect("shutdown failed");
}
