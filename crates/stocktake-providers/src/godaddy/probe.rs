//! HTTP liveness probe for domains

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::{ProviderError, Result};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const PROBE_CONCURRENCY: usize = 8;
const MAX_REDIRECTS: usize = 10;

/// Issues a plain `GET http://<domain>` and summarises the outcome.
///
/// A probe never fails: every error is folded into the summary string.
pub struct Prober {
    client: Client,
    concurrency: usize,
}

impl Prober {
    pub fn new(timeout: Duration, concurrency: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ProviderError::Http {
                provider: "GoDaddy",
                url: "http://".to_string(),
                message: format!("failed to create probe client: {e}"),
            })?;

        Ok(Self {
            client,
            concurrency: concurrency.max(1),
        })
    }

    /// `Reason - code` on any response, `Error - ...` otherwise
    pub async fn probe(&self, domain: &str) -> String {
        let summary = match self.client.get(format!("http://{domain}")).send().await {
            Ok(response) => {
                let status = response.status();
                format!(
                    "{} - {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    status.as_u16()
                )
            }
            Err(e) => error_summary(&e),
        };
        debug!(domain, summary = %summary, "probed");
        summary
    }

    /// Probe every domain with bounded parallelism, keeping input order
    pub async fn probe_all(&self, domains: &[String]) -> Vec<String> {
        stream::iter(domains.iter().cloned())
            .map(|domain| async move { self.probe(&domain).await })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

fn error_summary(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Error - Timeout".to_string()
    } else if e.is_redirect() {
        "Error - Too many redirects".to_string()
    } else if e.is_connect() {
        format!("Error - {}", connect_failure(e))
    } else {
        format!("Error - {e}")
    }
}

/// Name the root cause of a connect failure, e.g. `ECONNREFUSED`
fn connect_failure(e: &reqwest::Error) -> String {
    let mut source: Option<&(dyn StdError + 'static)> = e.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            return io_failure(io);
        }
        let message = err.to_string();
        if is_dns_failure(&message) {
            return "ENOTFOUND".to_string();
        }
        source = err.source();
    }
    "Connection failed".to_string()
}

fn io_failure(io: &io::Error) -> String {
    match io.kind() {
        io::ErrorKind::ConnectionRefused => "ECONNREFUSED".to_string(),
        io::ErrorKind::ConnectionReset => "ECONNRESET".to_string(),
        io::ErrorKind::ConnectionAborted => "ECONNABORTED".to_string(),
        io::ErrorKind::TimedOut => "ETIMEDOUT".to_string(),
        io::ErrorKind::HostUnreachable => "EHOSTUNREACH".to_string(),
        io::ErrorKind::NetworkUnreachable => "ENETUNREACH".to_string(),
        _ if is_dns_failure(&io.to_string()) => "ENOTFOUND".to_string(),
        kind => kind.to_string(),
    }
}

fn is_dns_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("dns error")
        || message.contains("failed to lookup address")
        || message.contains("name or service not known")
        || message.contains("no such host")
}
