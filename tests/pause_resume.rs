//! Pause and resume semantics.

use jobgraph::{Job, JobSystem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_pool_starts_paused() {
    let job_system = JobSystem::new(2);
    let runs = Arc::new(AtomicUsize::new(0));

    for index in 0..100 {
        let runs_clone = runs.clone();
        job_system.submit(Job::new(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
            },
            format!("job-{index}"),
        ));
    }

    // Nothing may run until the pool is resumed.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(job_system.completed_jobs(), 0);
    assert_eq!(job_system.pending_jobs(), 100);

    job_system.resume();
    job_system.wait_for_all_jobs();
    assert_eq!(runs.load(Ordering::SeqCst), 100);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_pause_halts_progress_without_losing_jobs() {
    let job_system = JobSystem::new(2);
    let runs = Arc::new(AtomicUsize::new(0));

    job_system.resume();
    for index in 0..200 {
        let runs_clone = runs.clone();
        job_system.submit(Job::new(
            move || {
                thread::sleep(Duration::from_micros(200));
                runs_clone.fetch_add(1, Ordering::SeqCst);
            },
            format!("job-{index}"),
        ));
    }

    job_system.pause();
    // In-flight jobs run to completion; give them time to settle, then the
    // completed count must hold steady.
    thread::sleep(Duration::from_millis(20));
    let frozen = runs.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(runs.load(Ordering::SeqCst), frozen);

    job_system.resume();
    job_system.wait_for_all_jobs();
    assert_eq!(runs.load(Ordering::SeqCst), 200);
    job_system.shutdown().expect("shutdown failed");
}

#[test]
fn test_resume_wakes_parked_workers() {
    let job_system = JobSystem::new(2);
    let runs = Arc::new(AtomicUsize::new(0));

    // Let the workers run dry and park, then pause and submit.
    job_system.resume();
    thread::sleep(Duration::from_millis(20));
    job_system.pause();

    let runs_clone = runs.clone();
    job_system.submit(Job::new(
        move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        },
        "after-park",
    ));

    job_system.resume();
    job_system.wait_for_all_jobs();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    job_system.shutdown().expect("shutdown failed");
}
