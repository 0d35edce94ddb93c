use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TOTAL_REQUESTS: u64 = 1_000;
pub const DEFAULT_LOG_EVERY: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `STRESS_*` overrides using an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STRESS_TARGET_URL") {
            self.target.url = url;
        }
        if let Some(v) = parse_var(&lookup, "STRESS_TIMEOUT_MS")? {
            self.target.timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "STRESS_WORKERS")? {
            self.load.workers = v;
        }
        if let Some(v) = parse_var(&lookup, "STRESS_TOTAL_REQUESTS")? {
            self.load.total_requests = v;
        }
        if let Some(v) = parse_var(&lookup, "STRESS_LOG_EVERY")? {
            self.load.log_every = v;
        }
        if let Some(v) = parse_var(&lookup, "STRESS_SEED")? {
            self.scenario.seed = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.load.workers == 0 {
            anyhow::bail!("load.workers must be at least 1");
        }
        if self.target.timeout_ms == 0 {
            anyhow::bail!("target.timeout_ms must be non-zero");
        }
        if self.load.log_every == 0 {
            anyhow::bail!("load.log_every must be non-zero");
        }

        let url = url::Url::parse(&self.target.url)
            .with_context(|| format!("Invalid target URL: {}", self.target.url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "Target URL must be http:// or https:// (got {})",
                self.target.url
            );
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {key}: {raw:?}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Endpoint every reservation is POSTed to
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TargetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Requests issued over the whole run
    #[serde(default = "default_total_requests")]
    pub total_requests: u64,
    /// Log every Nth request id at info level
    #[serde(default = "default_log_every")]
    pub log_every: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            total_requests: DEFAULT_TOTAL_REQUESTS,
            log_every: DEFAULT_LOG_EVERY,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for reproducible payloads; unset means entropy-seeded
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_total_requests() -> u64 {
    DEFAULT_TOTAL_REQUESTS
}

fn default_log_every() -> u64 {
    DEFAULT_LOG_EVERY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_serde() {
        let config_str = r#"
[target]
url = "http://localhost:9090"
timeout_ms = 2000

[load]
workers = 4
total_requests = 250

[scenario]
seed = 42
        "#;

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.target.url, "http://localhost:9090");
        assert_eq!(config.target.timeout_ms, 2000);
        assert_eq!(config.load.workers, 4);
        assert_eq!(config.load.total_requests, 250);
        assert_eq!(config.load.log_every, DEFAULT_LOG_EVERY);
        assert_eq!(config.scenario.seed, Some(42));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.target.url, DEFAULT_TARGET_URL);
        assert_eq!(config.target.timeout(), Duration::from_secs(5));
        assert_eq!(config.load.workers, DEFAULT_WORKERS);
        assert_eq!(config.load.total_requests, DEFAULT_TOTAL_REQUESTS);
        assert_eq!(config.scenario.seed, None);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STRESS_TARGET_URL", "http://127.0.0.1:18080"),
            ("STRESS_WORKERS", "32"),
            ("STRESS_TOTAL_REQUESTS", "0"),
            ("STRESS_SEED", " 7 "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_with(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.target.url, "http://127.0.0.1:18080");
        assert_eq!(config.target.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.load.workers, 32);
        assert_eq!(config.load.total_requests, 0);
        assert_eq!(config.scenario.seed, Some(7));
        config.validate().unwrap();
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env_with(|k| (k == "STRESS_WORKERS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("STRESS_WORKERS"));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.load.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target.url = "ftp://localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
