use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stress_core::{run_load_test, Config, HttpTransport, MockTransport, Report, Transport};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stress")]
#[command(about = "Reservation API stress runner - POSTs randomized reservations from a fixed worker pool")]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Submission mode
    #[arg(long, value_enum, default_value_t = Mode::Http)]
    mode: Mode,

    /// Worker thread count (overrides config and STRESS_WORKERS)
    #[arg(long)]
    workers: Option<usize>,

    /// Total requests to send (overrides config and STRESS_TOTAL_REQUESTS)
    #[arg(long)]
    total_requests: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Target URL
    #[arg(long)]
    url: Option<String>,

    /// Seed for reproducible payloads
    #[arg(long)]
    seed: Option<u64>,

    /// Log every Nth request at info level
    #[arg(long)]
    log_every: Option<u64>,

    /// Status code the mock transport answers with
    #[arg(long, default_value_t = 200)]
    mock_status: u16,

    /// Simulated latency of the mock transport in milliseconds
    #[arg(long, default_value_t = 5)]
    mock_delay_ms: u64,

    /// Directory the JSON result file is written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Skip writing the JSON result file
    #[arg(long)]
    no_export: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Mock,
    Http,
}

#[derive(Debug, Serialize)]
struct RunResult<'a> {
    timestamp: String,
    mode: Mode,
    transport: &'static str,
    config: &'a Config,
    report: &'a Report,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!(
        "Starting stress run in {:?} mode: workers={} total_requests={} timeout_ms={}",
        args.mode, config.load.workers, config.load.total_requests, config.target.timeout_ms
    );
    if let Some(seed) = config.scenario.seed {
        info!("Seed: {}", seed);
    }

    let transport: Arc<dyn Transport> = match args.mode {
        Mode::Mock => Arc::new(MockTransport::new(args.mock_status, args.mock_delay_ms)),
        Mode::Http => Arc::new(
            HttpTransport::new(config.target.url.clone(), config.target.timeout())
                .context("Failed to create HTTP transport")?,
        ),
    };
    info!("Using transport: {}", transport.name());

    let transport_name = transport.name();
    let report = run_load_test(&config, transport)?;

    println!();
    println!("{report}");
    println!();

    if !args.no_export {
        let result = RunResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: args.mode,
            transport: transport_name,
            config: &config,
            report: &report,
        };
        match write_result(&args.results_dir, &result) {
            Ok(path) => info!("Results written to {}", path.display()),
            Err(e) => warn!("Failed to write results: {:#}", e),
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    load_config_with(args, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then `STRESS_*` variables, then flags.
fn load_config_with<F>(args: &Args, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    config.apply_env_with(env)?;

    if let Some(url) = &args.url {
        config.target.url = url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.target.timeout_ms = timeout_ms;
    }
    if let Some(workers) = args.workers {
        config.load.workers = workers;
    }
    if let Some(total) = args.total_requests {
        config.load.total_requests = total;
    }
    if let Some(log_every) = args.log_every {
        config.load.log_every = log_every;
    }
    if args.seed.is_some() {
        config.scenario.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

fn write_result(dir: &Path, result: &RunResult<'_>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("stress_{stamp}.json"));
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stress_core::StatsCollector;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "stress",
            "--mode",
            "mock",
            "--workers",
            "3",
            "--total-requests",
            "0",
            "--url",
            "http://127.0.0.1:18080",
            "--seed",
            "9",
        ]);
        assert_eq!(args.mode, Mode::Mock);

        let config = load_config_with(&args, |_| None).unwrap();
        assert_eq!(config.load.workers, 3);
        assert_eq!(config.load.total_requests, 0);
        assert_eq!(config.target.url, "http://127.0.0.1:18080");
        assert_eq!(config.scenario.seed, Some(9));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let args = Args::parse_from(["stress", "--workers", "0"]);
        assert!(load_config_with(&args, |_| None).is_err());
    }

    #[test]
    fn test_flags_beat_env() {
        let env = |key: &str| match key {
            "STRESS_WORKERS" => Some("8".to_string()),
            "STRESS_TIMEOUT_MS" => Some("750".to_string()),
            _ => None,
        };
        let args = Args::parse_from(["stress", "--workers", "2"]);

        let config = load_config_with(&args, env).unwrap();
        assert_eq!(config.load.workers, 2);
        assert_eq!(config.target.timeout_ms, 750);
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let args = Args::parse_from(["stress"]);
        let err = load_config_with(&args, |key| {
            (key == "STRESS_TIMEOUT_MS").then(|| "abc".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("STRESS_TIMEOUT_MS"));
    }

    #[test]
    fn test_write_result() {
        let dir = std::env::temp_dir().join(format!("stress-results-{}", std::process::id()));
        let config = Config::default();
        let report = StatsCollector::new().summarize(std::time::Duration::ZERO, 0);
        let result = RunResult {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            mode: Mode::Mock,
            transport: "mock",
            config: &config,
            report: &report,
        };

        let path = write_result(&dir, &result).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "mock");
        assert_eq!(value["report"]["success"], 0);
        assert!(value["report"]["latency"].is_null());

        std::fs::remove_dir_all(&dir).ok();
    }
}
