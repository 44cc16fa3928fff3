//! DigitalOcean v2 API
//!
//! Every listing is paginated through `links.pages.next`; only the `page`
//! number is taken from that link so requests stay on the configured host.

pub mod normalize;
pub mod types;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stocktake_core::{DigitalOceanCredentials, ResourceRecords};
use tracing::{debug, warn};

use crate::http::{ApiClient, DEFAULT_TIMEOUT};
use crate::{Inventory, Result};

use self::normalize::SizeCosts;
use self::types::{Cluster, Database, Droplet, LoadBalancer, Size, Snapshot, Volume};

pub const DIGITALOCEAN_API_URL: &str = "https://api.digitalocean.com/v2";

const PROVIDER: &str = "DigitalOcean";

/// DigitalOcean connection settings
#[derive(Debug, Clone)]
pub struct DigitalOceanConfig {
    pub credentials: DigitalOceanCredentials,
    /// Base URL for the API (e.g. `https://api.digitalocean.com/v2`).
    pub api_base_url: String,
    pub per_page: u32,
    pub timeout: Duration,
}

impl DigitalOceanConfig {
    pub fn new(credentials: DigitalOceanCredentials) -> Self {
        Self {
            credentials,
            api_base_url: DIGITALOCEAN_API_URL.to_string(),
            per_page: 50,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Resources the `data` command can dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoResource {
    Droplets,
    Clusters,
    Databases,
    Volumes,
    Sizes,
    Snapshots,
    LoadBalancers,
}

impl DoResource {
    pub const ALL: [DoResource; 7] = [
        DoResource::Droplets,
        DoResource::Clusters,
        DoResource::Databases,
        DoResource::Volumes,
        DoResource::Sizes,
        DoResource::Snapshots,
        DoResource::LoadBalancers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DoResource::Droplets => "droplets",
            DoResource::Clusters => "clusters",
            DoResource::Databases => "databases",
            DoResource::Volumes => "volumes",
            DoResource::Sizes => "sizes",
            DoResource::Snapshots => "snapshots",
            DoResource::LoadBalancers => "loadbalancers",
        }
    }
}

impl fmt::Display for DoResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoResource {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or(())
    }
}

/// DigitalOcean API client
pub struct DigitalOceanClient {
    api: ApiClient,
    per_page: u32,
}

impl DigitalOceanClient {
    pub fn new(config: DigitalOceanConfig) -> Result<Self> {
        let authorization = format!("Bearer {}", config.credentials.api_key.expose());
        let api = ApiClient::new(
            PROVIDER,
            &config.api_base_url,
            &authorization,
            config.timeout,
        )?;
        Ok(Self {
            api,
            per_page: config.per_page,
        })
    }

    /// Fetch every page of `path`, collecting the array under `key`
    async fn paginate<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>> {
        let url = self.api.url(path);
        let mut items = Vec::new();
        let mut page: Option<String> = None;

        loop {
            let mut query = vec![("per_page", self.per_page.to_string())];
            if let Some(page) = &page {
                query.push(("page", page.clone()));
            }

            let mut body: Value = self.api.get_json(&url, &query).await?;
            debug!(path, page = page.as_deref().unwrap_or("1"), "fetched page");

            let batch = match body.get_mut(key).map(Value::take) {
                Some(batch) => serde_json::from_value::<Vec<T>>(batch)
                    .map_err(|e| self.api.decode_error(&url, e))?,
                None => Vec::new(),
            };
            items.extend(batch);

            match next_page(&body) {
                Some(next) if page.as_deref() == Some(next.as_str()) => {
                    warn!(path, page = %next, "next page repeats the current one, stopping");
                    break;
                }
                Some(next) => page = Some(next),
                None => break,
            }
        }

        Ok(items)
    }

    pub async fn sizes(&self) -> Result<Vec<Size>> {
        self.paginate("sizes", "sizes").await
    }

    /// Monthly price per size slug
    pub async fn size_costs(&self) -> Result<SizeCosts> {
        Ok(normalize::size_costs(&self.sizes().await?))
    }

    /// Droplets, excluding Kubernetes worker nodes
    pub async fn droplets(&self) -> Result<Vec<Droplet>> {
        let droplets: Vec<Droplet> = self.paginate("droplets", "droplets").await?;
        Ok(droplets
            .into_iter()
            .filter(|d| !normalize::is_kubernetes_node(d))
            .collect())
    }

    pub async fn clusters(&self) -> Result<Vec<Cluster>> {
        self.paginate("kubernetes/clusters", "kubernetes_clusters")
            .await
    }

    pub async fn databases(&self) -> Result<Vec<Database>> {
        self.paginate("databases", "databases").await
    }

    pub async fn volumes(&self) -> Result<Vec<Volume>> {
        self.paginate("volumes", "volumes").await
    }

    pub async fn snapshots(&self) -> Result<Vec<Snapshot>> {
        self.paginate("snapshots", "snapshots").await
    }

    pub async fn load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        self.paginate("load_balancers", "load_balancers").await
    }

    /// Raw listing of one resource, as JSON
    pub async fn data(&self, resource: DoResource) -> Result<Value> {
        let value = match resource {
            DoResource::Droplets => to_json(self.droplets().await?),
            DoResource::Clusters => to_json(self.clusters().await?),
            DoResource::Databases => to_json(self.databases().await?),
            DoResource::Volumes => to_json(self.volumes().await?),
            DoResource::Sizes => to_json(self.size_costs().await?),
            DoResource::Snapshots => to_json(self.snapshots().await?),
            DoResource::LoadBalancers => to_json(self.load_balancers().await?),
        };
        value.map_err(|e| self.api.decode_error(&self.api.url(resource.as_str()), e))
    }
}

fn to_json<T: serde::Serialize>(value: T) -> serde_json::Result<Value> {
    serde_json::to_value(value)
}

/// The `page` query parameter of `links.pages.next`, if any
fn next_page(body: &Value) -> Option<String> {
    let next = body.pointer("/links/pages/next")?.as_str()?;
    let url = Url::parse(next).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl Inventory for DigitalOceanClient {
    fn label(&self) -> &'static str {
        "DO"
    }

    async fn collect(&self) -> Result<Vec<ResourceRecords>> {
        let (costs, droplets, clusters, databases, volumes, snapshots, load_balancers) = tokio::try_join!(
            self.size_costs(),
            self.droplets(),
            self.clusters(),
            self.databases(),
            self.volumes(),
            self.snapshots(),
            self.load_balancers(),
        )?;

        debug!(
            sizes = costs.len(),
            droplets = droplets.len(),
            clusters = clusters.len(),
            databases = databases.len(),
            volumes = volumes.len(),
            snapshots = snapshots.len(),
            load_balancers = load_balancers.len(),
            "fetched DigitalOcean resources"
        );

        Ok(vec![
            ResourceRecords::new("droplet", normalize::droplets(&droplets, &costs))?,
            ResourceRecords::new(
                "cluster",
                clusters
                    .iter()
                    .map(|c| normalize::cluster(c, &costs))
                    .collect(),
            )?,
            ResourceRecords::new(
                "database",
                databases.iter().map(normalize::database).collect(),
            )?,
            ResourceRecords::new("volume", volumes.iter().map(normalize::volume).collect())?,
            ResourceRecords::new("snapshot", normalize::snapshots(&snapshots, &droplets))?,
            ResourceRecords::new(
                "loadbalancer",
                load_balancers.iter().map(normalize::load_balancer).collect(),
            )?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_page_reads_page_number() {
        let body = json!({
            "links": {"pages": {"next": "https://api.digitalocean.com/v2/droplets?page=3&per_page=50"}}
        });
        assert_eq!(next_page(&body).as_deref(), Some("3"));
    }

    #[test]
    fn test_next_page_absent_on_last_page() {
        assert_eq!(next_page(&json!({"links": {"pages": {"prev": "x"}}})), None);
        assert_eq!(next_page(&json!({"links": {}})), None);
    }

    #[test]
    fn test_resource_names_round_trip() {
        for resource in DoResource::ALL {
            assert_eq!(resource.as_str().parse::<DoResource>(), Ok(resource));
        }
        assert!("kubernetes".parse::<DoResource>().is_err());
    }
}
