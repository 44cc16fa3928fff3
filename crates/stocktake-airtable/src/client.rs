//! Airtable REST client implementing [`Datastore`].

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use stocktake_core::{
    DEFAULT_BATCH_SIZE, Datastore, NewRow, RowUpdate, Secret, StoreError, StoreResult, StoredRow,
};
use tracing::{debug, warn};

use crate::wire::{CreateRequest, ListResponse, UpdateRequest, error_message};

/// Public Airtable API endpoint
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com";

/// Connection settings for one Airtable base.
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// Personal access token.
    pub api_key: Secret,
    /// Base identifier (`app...`).
    pub base: String,
    /// Base URL for the API (e.g. `https://api.airtable.com`).
    pub api_base_url: String,
    /// Timeout for each HTTP request.
    pub timeout: Duration,
    /// First wait after a 429 response; doubles on each retry.
    pub retry_initial_interval: Duration,
    /// Give up retrying 429 responses after this long.
    pub retry_max_elapsed: Duration,
}

impl AirtableConfig {
    /// Settings for the public API.
    pub fn new(api_key: Secret, base: impl Into<String>) -> Self {
        Self {
            api_key,
            base: base.into(),
            api_base_url: AIRTABLE_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry_initial_interval: Duration::from_millis(500),
            retry_max_elapsed: Duration::from_secs(60),
        }
    }

    /// Point the client at another host.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Airtable datastore.
pub struct AirtableStore {
    config: AirtableConfig,
    client: Client,
}

impl AirtableStore {
    /// Creates a new store.
    pub fn new(config: AirtableConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// The base this store reads and writes.
    pub fn base(&self) -> &str {
        &self.config.base
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            StoreError::Transport(format!("invalid API URL {}: {e}", self.config.api_base_url))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Transport(format!("invalid API URL {}", self.config.api_base_url))
            })?
            .pop_if_empty()
            .extend(["v0", self.config.base.as_str(), table]);

        Ok(url)
    }

    /// Send a request, retrying while Airtable answers 429.
    ///
    /// `build` is called once per attempt.
    async fn send<F>(&self, build: F) -> StoreResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.retry_initial_interval)
            .with_max_elapsed_time(Some(self.config.retry_max_elapsed))
            .build();

        let build = &build;
        backoff::future::retry(policy, move || async move {
            let response = build()
                .bearer_auth(self.config.api_key.expose())
                .send()
                .await
                .map_err(|e| backoff::Error::permanent(transport_error(e)))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Airtable rate limit hit, backing off");
                return Err(backoff::Error::transient(StoreError::RateLimited));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(backoff::Error::permanent(StoreError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                }));
            }
            Ok(response)
        })
        .await
    }

    fn check_batch(&self, size: usize) -> StoreResult<()> {
        let limit = self.max_batch_size();
        if size > limit {
            return Err(StoreError::BatchTooLarge { size, limit });
        }
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[async_trait]
impl Datastore for AirtableStore {
    fn max_batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }

    async fn select_all(&self, table: &str, view: &str) -> StoreResult<Vec<StoredRow>> {
        let url = self.table_url(table)?;
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page_offset = offset.take();
            let response = self
                .send(|| {
                    let request = self.client.get(url.clone()).query(&[("view", view)]);
                    match &page_offset {
                        Some(offset) => request.query(&[("offset", offset)]),
                        None => request,
                    }
                })
                .await?;

            let page: ListResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            debug!(table, count = page.records.len(), "fetched page");
            rows.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(table, total = rows.len(), "fetched all rows");
        Ok(rows)
    }

    async fn create_batch(&self, table: &str, rows: &[NewRow]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.check_batch(rows.len())?;

        let url = self.table_url(table)?;
        let body = CreateRequest::new(rows);
        self.send(|| self.client.post(url.clone()).json(&body))
            .await?;

        debug!(table, count = rows.len(), "created rows");
        Ok(())
    }

    async fn update_batch(&self, table: &str, updates: &[RowUpdate]) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        self.check_batch(updates.len())?;

        let url = self.table_url(table)?;
        let body = UpdateRequest { records: updates };
        self.send(|| self.client.patch(url.clone()).json(&body))
            .await?;

        debug!(table, count = updates.len(), "updated rows");
        Ok(())
    }
}
