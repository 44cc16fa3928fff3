//! SendGrid v3 API
//!
//! Listings are paginated through the `Link` response header.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::LINK;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocktake_core::{MergeableRecord, ResourceRecords, SendGridCredentials, name_or_default};
use tracing::debug;

use crate::http::{ApiClient, DEFAULT_TIMEOUT};
use crate::{Inventory, Result};

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3";

const PROVIDER: &str = "SendGrid";

/// SendGrid connection settings
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub credentials: SendGridCredentials,
    /// Base URL for the API (e.g. `https://api.sendgrid.com/v3`).
    pub api_base_url: String,
    pub timeout: Duration,
}

impl SendGridConfig {
    pub fn new(credentials: SendGridCredentials) -> Self {
        Self {
            credentials,
            api_base_url: SENDGRID_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// An API key; the secret itself is never returned by the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    #[serde(default)]
    pub name: String,
    pub api_key_id: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    result: Vec<T>,
}

/// Resources the `data` command can dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendGridResource {
    ApiKeys,
}

impl SendGridResource {
    pub const ALL: [SendGridResource; 1] = [SendGridResource::ApiKeys];

    pub fn as_str(&self) -> &'static str {
        match self {
            SendGridResource::ApiKeys => "apikeys",
        }
    }
}

impl fmt::Display for SendGridResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SendGridResource {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or(())
    }
}

pub fn apikey(key: &ApiKey) -> MergeableRecord {
    MergeableRecord::bare(name_or_default(Some(key.name.as_str())), "apikey")
}

/// SendGrid API client
pub struct SendGridClient {
    api: ApiClient,
}

impl SendGridClient {
    pub fn new(config: SendGridConfig) -> Result<Self> {
        let authorization = format!("Bearer {}", config.credentials.api_key.expose());
        let api = ApiClient::new(
            PROVIDER,
            &config.api_base_url,
            &authorization,
            config.timeout,
        )?;
        Ok(Self { api })
    }

    /// Every API key, following `Link: rel="next"`.
    ///
    /// Requests stay on the configured host; only the query of the link is
    /// carried over.
    pub async fn api_keys(&self) -> Result<Vec<ApiKey>> {
        let url = self.api.url("api_keys");
        let mut query: Vec<(String, String)> = Vec::new();
        let mut keys = Vec::new();

        loop {
            let params: Vec<(&str, String)> =
                query.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
            let response = self.api.get(&url, &params).await?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link)
                .and_then(|link| next_query(&link));

            let page: Page<ApiKey> = self.api.json(&url, response).await?;
            debug!(url = %url, count = page.result.len(), "fetched page");
            let exhausted = page.result.is_empty();
            keys.extend(page.result);

            match next {
                Some(next) if !exhausted && next != query => query = next,
                _ => break,
            }
        }

        Ok(keys)
    }

    /// Raw listing of one resource, as JSON
    pub async fn data(&self, resource: SendGridResource) -> Result<Value> {
        match resource {
            SendGridResource::ApiKeys => {
                let keys = self.api_keys().await?;
                serde_json::to_value(keys)
                    .map_err(|e| self.api.decode_error(&self.api.url("api_keys"), e))
            }
        }
    }
}

/// Target of the `rel="next"` entry of a `Link` header
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Query pairs of a pagination link
fn next_query(link: &str) -> Option<Vec<(String, String)>> {
    let url = Url::parse(link).ok()?;
    Some(
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
    )
}

#[async_trait]
impl Inventory for SendGridClient {
    fn label(&self) -> &'static str {
        "SendGrid"
    }

    async fn collect(&self) -> Result<Vec<ResourceRecords>> {
        let keys = self.api_keys().await?;
        debug!(count = keys.len(), "fetched SendGrid API keys");
        Ok(vec![ResourceRecords::new(
            "apikey",
            keys.iter().map(apikey).collect(),
        )?])
    }
}
