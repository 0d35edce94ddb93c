use crate::payload::PayloadGenerator;
use crate::queue::{WorkItem, WorkQueue};
use crate::stats::StatsCollector;
use crate::transport::Transport;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

const HTTP_OK: u16 = 200;

/// State every worker thread reads from.
pub struct PoolShared {
    pub queue: Arc<WorkQueue>,
    pub stats: Arc<StatsCollector>,
    pub transport: Arc<dyn Transport>,
    pub generator: PayloadGenerator,
    /// Request ids divisible by this are logged at info level
    pub log_every: u64,
}

/// Fixed set of worker threads draining one [`WorkQueue`].
pub struct WorkerPool {
    handles: Vec<(usize, JoinHandle<u64>)>,
}

impl WorkerPool {
    /// Start exactly `workers` threads. Each runs until it dequeues a
    /// `Shutdown` item, so the queue must eventually hold one per worker.
    pub fn spawn(workers: usize, shared: Arc<PoolShared>) -> Result<Self> {
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || run_worker(id, &shared))
                .with_context(|| format!("Failed to spawn worker-{id}"))?;
            handles.push((id, handle));
        }
        debug!(workers, "worker pool started");
        Ok(Self { handles })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker. Returns the total number of requests processed.
    ///
    /// A worker that died is logged and skipped; whatever it recorded before
    /// dying stays in the stats.
    pub fn join(self) -> u64 {
        let mut processed = 0u64;

        for (id, handle) in self.handles {
            match handle.join() {
                Ok(n) => {
                    debug!(worker = id, processed = n, "worker finished");
                    processed += n;
                }
                Err(cause) => {
                    error!(worker = id, "Worker thread panicked: {}", panic_message(&*cause));
                }
            }
        }

        processed
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(s) = cause.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

pub(crate) fn run_worker(id: usize, shared: &PoolShared) -> u64 {
    let mut rng = StdRng::from_entropy();
    let mut processed = 0u64;

    loop {
        let request_id = match shared.queue.get() {
            WorkItem::Request(n) => n,
            WorkItem::Shutdown => break,
        };

        let payload = shared.generator.generate_for(request_id, &mut rng);

        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| shared.transport.post(&payload)));
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let success = match outcome {
            Ok(Ok(status)) => {
                if shared.log_every > 0 && request_id % shared.log_every == 0 {
                    info!(
                        worker = id,
                        request = request_id,
                        status,
                        latency_ms,
                        guest = %payload.guest_name,
                        "request completed"
                    );
                } else if status != HTTP_OK {
                    debug!(worker = id, request = request_id, status, "non-200 response");
                }
                status == HTTP_OK
            }
            Ok(Err(e)) => {
                warn!(worker = id, request = request_id, "Request error: {:#}", e);
                false
            }
            Err(cause) => {
                error!(
                    worker = id,
                    request = request_id,
                    "Transport panicked: {}",
                    panic_message(&*cause)
                );
                false
            }
        };

        shared.stats.record(latency_ms, success);
        shared.queue.mark_done();
        processed += 1;
    }

    processed
}
