//! GoDaddy domains API
//!
//! The domain listing is not paginated. Each active domain is probed over
//! plain HTTP before it is recorded.

pub mod normalize;
pub mod probe;
pub mod types;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use stocktake_core::{GoDaddyCredentials, ResourceRecords};
use tracing::debug;

use crate::http::{ApiClient, DEFAULT_TIMEOUT};
use crate::{Inventory, Result};

use self::probe::{PROBE_CONCURRENCY, PROBE_TIMEOUT, Prober};
use self::types::Domain;

pub const GODADDY_API_URL: &str = "https://api.godaddy.com";

const PROVIDER: &str = "GoDaddy";

/// GoDaddy connection settings
#[derive(Debug, Clone)]
pub struct GoDaddyConfig {
    pub credentials: GoDaddyCredentials,
    /// Base URL for the API (e.g. `https://api.godaddy.com`).
    pub api_base_url: String,
    pub timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_concurrency: usize,
}

impl GoDaddyConfig {
    pub fn new(credentials: GoDaddyCredentials) -> Self {
        Self {
            credentials,
            api_base_url: GODADDY_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            probe_concurrency: PROBE_CONCURRENCY,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Resources the `data` command can dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoDaddyResource {
    Domains,
}

impl GoDaddyResource {
    pub const ALL: [GoDaddyResource; 1] = [GoDaddyResource::Domains];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoDaddyResource::Domains => "domains",
        }
    }
}

impl fmt::Display for GoDaddyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoDaddyResource {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or(())
    }
}

/// GoDaddy API client
pub struct GoDaddyClient {
    api: ApiClient,
    prober: Prober,
}

impl GoDaddyClient {
    pub fn new(config: GoDaddyConfig) -> Result<Self> {
        let authorization = format!(
            "sso-key {}:{}",
            config.credentials.api_key.expose(),
            config.credentials.api_secret.expose()
        );
        let api = ApiClient::new(
            PROVIDER,
            &config.api_base_url,
            &authorization,
            config.timeout,
        )?;
        let prober = Prober::new(config.probe_timeout, config.probe_concurrency)?;
        Ok(Self { api, prober })
    }

    /// Active domains
    pub async fn domains(&self) -> Result<Vec<Domain>> {
        let url = self.api.url("v1/domains");
        self.api
            .get_json(&url, &[("statuses", "ACTIVE".to_string())])
            .await
    }

    /// Raw listing of one resource, as JSON
    pub async fn data(&self, resource: GoDaddyResource) -> Result<Value> {
        match resource {
            GoDaddyResource::Domains => {
                let domains = self.domains().await?;
                serde_json::to_value(domains)
                    .map_err(|e| self.api.decode_error(&self.api.url("v1/domains"), e))
            }
        }
    }
}

#[async_trait]
impl Inventory for GoDaddyClient {
    fn label(&self) -> &'static str {
        "GoDaddy"
    }

    async fn collect(&self) -> Result<Vec<ResourceRecords>> {
        let domains = self.domains().await?;
        debug!(count = domains.len(), "fetched GoDaddy domains");

        let names: Vec<String> = domains.iter().map(|d| d.domain.clone()).collect();
        let responses = self.prober.probe_all(&names).await;

        let records: Vec<_> = domains
            .iter()
            .zip(responses)
            .map(|(domain, response)| normalize::domain(domain, response))
            .collect();

        Ok(vec![ResourceRecords::new("domain", records)?])
    }
}
