use crate::config::Config;
use crate::payload::{PayloadGenerator, ReferenceTables};
use crate::pool::{PoolShared, WorkerPool};
use crate::queue::WorkQueue;
use crate::stats::{Report, StatsCollector};
use crate::transport::Transport;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Run one complete load test and summarize it.
///
/// Per-request failures, panicking transports included, only show up in the
/// report's error count; an `Err` here means the pool could not be started.
pub fn run_load_test(config: &Config, transport: Arc<dyn Transport>) -> Result<Report> {
    let workers = config.load.workers;
    let total = config.load.total_requests;

    let queue = Arc::new(WorkQueue::seeded(total, workers));
    let stats = Arc::new(StatsCollector::new());
    let shared = Arc::new(PoolShared {
        queue: Arc::clone(&queue),
        stats: Arc::clone(&stats),
        transport,
        generator: PayloadGenerator::new(
            Arc::new(ReferenceTables::standard()),
            config.scenario.seed,
        ),
        log_every: config.load.log_every,
    });

    info!(
        "Sending {} requests to {} with {} workers",
        total, config.target.url, workers
    );

    let start = Instant::now();
    let pool = WorkerPool::spawn(workers, shared)?;
    let processed = pool.join();
    let elapsed = start.elapsed();

    info!(
        "All workers finished: {} requests in {:.2}s",
        processed,
        elapsed.as_secs_f64()
    );

    Ok(stats.summarize(elapsed, total))
}
