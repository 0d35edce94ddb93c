use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Samples {
    success: u64,
    errors: u64,
    latencies_ms: Vec<f64>,
}

/// Shared per-request outcome accumulator.
///
/// All three fields move together under one lock. Read it with
/// [`StatsCollector::summarize`] only after every recorder has finished.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<Samples>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Samples> {
        // A panicking recorder cannot leave the counters half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, latency_ms: f64, success: bool) {
        let mut s = self.lock();
        s.latencies_ms.push(latency_ms);
        if success {
            s.success += 1;
        } else {
            s.errors += 1;
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let s = self.lock();
        StatsSnapshot {
            success: s.success,
            errors: s.errors,
            samples: s.latencies_ms.len() as u64,
        }
    }

    /// Build the final report. `elapsed` is the driver's wall-clock time.
    pub fn summarize(&self, elapsed: Duration, total_requests: u64) -> Report {
        let s = self.lock();
        let mut sorted = s.latencies_ms.clone();
        sorted.sort_by(f64::total_cmp);

        let elapsed_secs = elapsed.as_secs_f64();
        let throughput_rps = if total_requests == 0 || elapsed_secs <= 0.0 {
            0.0
        } else {
            total_requests as f64 / elapsed_secs
        };

        Report {
            elapsed_secs,
            total_requests,
            success: s.success,
            errors: s.errors,
            throughput_rps,
            latency: LatencySummary::from_sorted(&sorted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub success: u64,
    pub errors: u64,
    pub samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: u64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub stdev_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencySummary {
    /// `None` for an empty slice. Input must be sorted ascending.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min_ms, &max_ms) = (sorted.first()?, sorted.last()?);
        let n = sorted.len() as f64;
        let mean_ms = sorted.iter().sum::<f64>() / n;

        let stdev_ms = if sorted.len() > 1 {
            let var = sorted.iter().map(|x| (x - mean_ms).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count: sorted.len() as u64,
            min_ms,
            max_ms,
            mean_ms,
            stdev_ms,
            p50_ms: percentile(sorted, 500),
            p95_ms: percentile(sorted, 950),
            p99_ms: percentile(sorted, 990),
        })
    }
}

/// Nearest-rank percentile without interpolation: index `floor(len * p)`,
/// with `p` given in per-mille. Empty input yields 0.
pub fn percentile(sorted: &[f64], per_mille: u64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (sorted.len() as u64 * per_mille / 1000) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Final run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub elapsed_secs: f64,
    pub total_requests: u64,
    pub success: u64,
    pub errors: u64,
    pub throughput_rps: f64,
    pub latency: Option<LatencySummary>,
}

impl Report {
    pub fn completed(&self) -> u64 {
        self.success + self.errors
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Stress Summary ===")?;
        writeln!(f, "Elapsed: {:.2}s", self.elapsed_secs)?;
        writeln!(f, "Success: {}", self.success)?;
        writeln!(f, "Errors: {}", self.errors)?;
        write!(f, "Throughput: {:.2} req/s", self.throughput_rps)?;

        if let Some(l) = &self.latency {
            writeln!(f)?;
            writeln!(f, "Latency min: {:.2}ms", l.min_ms)?;
            writeln!(f, "Latency max: {:.2}ms", l.max_ms)?;
            writeln!(f, "Latency mean: {:.2}ms", l.mean_ms)?;
            writeln!(f, "Latency stdev: {:.2}ms", l.stdev_ms)?;
            writeln!(f, "Latency p50: {:.2}ms", l.p50_ms)?;
            writeln!(f, "Latency p95: {:.2}ms", l.p95_ms)?;
            write!(f, "Latency p99: {:.2}ms", l.p99_ms)?;
        }
        Ok(())
    }
}
