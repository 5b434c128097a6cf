//! Internet connectivity probe run before activation.

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::Client;

pub const DEFAULT_PROBE_URL: &str = "http://google.com/generate_204";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub trait ConnectivityChecker {
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

/// Probes a URL that answers 204 when the network is reachable.
#[derive(Debug, Clone)]
pub struct HttpConnectivityChecker {
    client: Client,
    probe_url: String,
    timeout: Duration,
}

impl HttpConnectivityChecker {
    pub fn new(probe_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            probe_url: probe_url.into(),
            timeout,
        }
    }

    pub fn probe_url(&self) -> &str {
        &self.probe_url
    }
}

impl Default for HttpConnectivityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_URL, DEFAULT_PROBE_TIMEOUT)
    }
}

impl ConnectivityChecker for HttpConnectivityChecker {
    /// `true` if the probe URL answers with HTTP 2xx within the timeout.
    async fn is_online(&self) -> bool {
        match self
            .client
            .get(&self.probe_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                debug!("Connectivity probe succeeded: {}", resp.status());
                true
            }
            Ok(resp) => {
                debug!(
                    "Connectivity probe to {} failed: status={}",
                    self.probe_url,
                    resp.status()
                );
                false
            }
            Err(e) => {
                debug!("Connectivity probe to {} failed: {e}", self.probe_url);
                false
            }
        }
    }
}

/// For hosts that skip the connectivity check.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl ConnectivityChecker for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}
