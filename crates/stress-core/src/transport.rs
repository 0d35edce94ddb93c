use crate::payload::Reservation;
use anyhow::{Context, Result};
use std::thread::sleep;
use std::time::Duration;

/// Blocking request adapter used by the worker pool.
///
/// `Ok` carries the response status code; `Err` is a transport failure
/// (connection refused, DNS, timeout).
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    fn post(&self, payload: &Reservation) -> Result<u16>;
}

/// Mock transport for dry runs (fixed status with configurable delay)
pub struct MockTransport {
    status: u16,
    delay: Duration,
}

impl MockTransport {
    pub fn new(status: u16, delay_ms: u64) -> Self {
        Self {
            status,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn post(&self, _payload: &Reservation) -> Result<u16> {
        if !self.delay.is_zero() {
            sleep(self.delay);
        }
        Ok(self.status)
    }
}

/// HTTP/JSON transport; one client and connection pool shared by every worker
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    fn post(&self, payload: &Reservation) -> Result<u16> {
        // `json` also sets Content-Type: application/json
        let response = self.client.post(&self.url).json(payload).send()?;
        Ok(response.status().as_u16())
    }
}
