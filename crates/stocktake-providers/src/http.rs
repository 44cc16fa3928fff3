//! Shared JSON-over-HTTP plumbing for the REST providers

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{ProviderError, Result};

/// Default timeout for provider API requests
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An authenticated client rooted at one API base URL
pub(crate) struct ApiClient {
    provider: &'static str,
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(
        provider: &'static str,
        base_url: &str,
        authorization: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(authorization).map_err(|e| ProviderError::Http {
            provider,
            url: base_url.to_string(),
            message: format!("invalid credentials: {e}"),
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http {
                provider,
                url: base_url.to_string(),
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Absolute URL of an endpoint path such as `droplets`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a URL, failing on any non-success status
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: self.provider,
                status: status.as_u16(),
                url: url.to_string(),
                body: body.trim().to_string(),
            });
        }
        Ok(response)
    }

    /// Decode a successful response body
    pub async fn json<T: DeserializeOwned>(&self, url: &str, response: Response) -> Result<T> {
        response.json().await.map_err(|e| ProviderError::Decode {
            provider: self.provider,
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET a URL and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(url, query).await?;
        self.json(url, response).await
    }

    pub fn decode_error(&self, url: &str, e: serde_json::Error) -> ProviderError {
        ProviderError::Decode {
            provider: self.provider,
            url: url.to_string(),
            message: e.to_string(),
        }
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                provider: self.provider,
                url: url.to_string(),
            }
        } else {
            ProviderError::Http {
                provider: self.provider,
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}
