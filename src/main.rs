use jobgraph::{Job, JobSystem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// CPU-bound busy work used by the stress example.
fn sum_of_squares(start: usize, end: usize) {
    let mut result = 0.0f64;
    for value in start..=end {
        result += (value * value) as f64;
    }
    std::hint::black_box(result);
}

fn main() {
    env_logger::init();
    println!("jobgraph - Dependency-Aware Job Scheduler\n");

    let num_threads = 4;
    let job_system = JobSystem::new(num_threads);
    println!("Initialized job system with {num_threads} worker threads\n");

    // Example 1: interdependent job graph, dependants submitted first
    println!("Example 1: Dependency graph");
    let job1 = Job::new(|| println!("  Running job 1"), "job-1");
    let job2 = Job::new(|| println!("  Running job 2"), "job-2");
    let job3 = Job::new(|| println!("  Running job 3"), "job-3");
    let job4 = Job::new(|| println!("  Running job 4"), "job-4");
    let job5 = Job::new(|| println!("  Running job 5"), "job-5");
    let job6 = Job::new(|| println!("  Running job 6"), "job-6");
    let job7 = Job::new(|| println!("  Running job 7"), "job-7");

    job_system.submit_with_dependencies(job6, &[job3.clone(), job4.clone()]);
    job_system.submit_with_dependencies(job5, &[job3.clone(), job4.clone()]);
    job_system.submit_with_dependencies(job4, &[job3.clone()]);
    job_system.submit_with_dependencies(job7, &[job1.clone(), job2.clone()]);
    job_system.submit_with_dependencies(job3, &[job1.clone(), job2.clone()]);
    job_system.submit(job1);
    job_system.submit(job2);

    job_system.wait_for_all_jobs();
    println!("  Graph completed\n");

    // Example 2: parallel computation
    println!("Example 2: Parallel computation");
    let sum = Arc::new(AtomicUsize::new(0));
    let num_jobs = 100;

    let start = Instant::now();
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

    let duration = start.elapsed();
    let expected_sum: usize = (0..num_jobs).sum();
    println!("  Executed {num_jobs} jobs in {duration:?}");
    println!(
        "  Sum result: {} (expected: {expected_sum})\n",
        sum.load(Ordering::SeqCst)
    );

    // Example 3: CPU-bound stress run
    println!("Example 3: Stress run");
    let num_jobs = 100_000;

    let start = Instant::now();
    for _ in 0..num_jobs {
        job_system.submit(Job::new(|| sum_of_squares(1, 1_000), "stress"));
    }
    job_system.wait_for_all_jobs();

    let duration = start.elapsed();
    let jobs_per_second = num_jobs as f64 / duration.as_secs_f64();
    println!("  Executed {num_jobs} jobs in {duration:?}");
    println!("  Throughput: {jobs_per_second:.2} jobs/second\n");

    println!("Thread utilization:");
    job_system.print_thread_utilization();

    println!("\nShutting down job system...");
    match job_system.shutdown() {
        Ok(()) => println!("Done!"),
        Err(error) => eprintln!("Shutdown error: {error}"),
    }
}
