//! AWS inventory through the official SDK
//!
//! Credentials come from the SDK default chain. Each service is queried in
//! its own fixed region.

pub mod normalize;
pub mod types;

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::error::DisplayErrorContext;
use serde_json::Value;
use stocktake_core::ResourceRecords;
use tracing::debug;

use crate::{Inventory, ProviderError, Result};

use self::normalize::BundlePrices;
use self::types::{Bucket, DbInstance, Domain, LightsailBundle, LightsailInstance};

/// Regions queried per service
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub s3_region: String,
    pub lightsail_region: String,
    pub route53_domains_region: String,
    pub rds_region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            s3_region: "us-east-1".to_string(),
            lightsail_region: "eu-west-2".to_string(),
            // Route 53 Domains only exists in us-east-1
            route53_domains_region: "us-east-1".to_string(),
            rds_region: "eu-west-2".to_string(),
        }
    }
}

/// Resources the `data` command can dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsResource {
    Buckets,
    Lightsails,
    Domains,
    Databases,
}

impl AwsResource {
    pub const ALL: [AwsResource; 4] = [
        AwsResource::Buckets,
        AwsResource::Lightsails,
        AwsResource::Domains,
        AwsResource::Databases,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AwsResource::Buckets => "buckets",
            AwsResource::Lightsails => "lightsails",
            AwsResource::Domains => "domains",
            AwsResource::Databases => "databases",
        }
    }
}

impl fmt::Display for AwsResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AwsResource {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or(())
    }
}

fn aws_error<E: StdError>(operation: &'static str, err: E) -> ProviderError {
    ProviderError::Aws {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// One SDK client per service
pub struct AwsClient {
    s3: aws_sdk_s3::Client,
    lightsail: aws_sdk_lightsail::Client,
    route53_domains: aws_sdk_route53domains::Client,
    rds: aws_sdk_rds::Client,
}

impl AwsClient {
    /// Load the default credential chain and build the service clients
    pub async fn from_env(config: AwsConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_shared(&shared, config)
    }

    pub fn from_shared(shared: &SdkConfig, config: AwsConfig) -> Self {
        let s3 = aws_sdk_s3::config::Builder::from(shared)
            .region(aws_sdk_s3::config::Region::new(config.s3_region))
            .build();
        let lightsail = aws_sdk_lightsail::config::Builder::from(shared)
            .region(aws_sdk_lightsail::config::Region::new(config.lightsail_region))
            .build();
        let route53_domains = aws_sdk_route53domains::config::Builder::from(shared)
            .region(aws_sdk_route53domains::config::Region::new(
                config.route53_domains_region,
            ))
            .build();
        let rds = aws_sdk_rds::config::Builder::from(shared)
            .region(aws_sdk_rds::config::Region::new(config.rds_region))
            .build();

        Self {
            s3: aws_sdk_s3::Client::from_conf(s3),
            lightsail: aws_sdk_lightsail::Client::from_conf(lightsail),
            route53_domains: aws_sdk_route53domains::Client::from_conf(route53_domains),
            rds: aws_sdk_rds::Client::from_conf(rds),
        }
    }

    pub async fn buckets(&self) -> Result<Vec<Bucket>> {
        let output = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| aws_error("s3:ListBuckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().map(str::to_string),
            })
            .collect())
    }

    pub async fn lightsails(&self) -> Result<Vec<LightsailInstance>> {
        let mut instances = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let output = self
                .lightsail
                .get_instances()
                .set_page_token(token.take())
                .send()
                .await
                .map_err(|e| aws_error("lightsail:GetInstances", e))?;

            instances.extend(output.instances().iter().map(|i| LightsailInstance {
                name: i.name().map(str::to_string),
                bundle_id: i.bundle_id().map(str::to_string),
                blueprint_id: i.blueprint_id().map(str::to_string),
                state: i.state().and_then(|s| s.name()).map(str::to_string),
            }));

            match output.next_page_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(instances)
    }

    /// All bundles, including retired ones still attached to old instances
    pub async fn lightsail_bundles(&self) -> Result<Vec<LightsailBundle>> {
        let mut bundles = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let output = self
                .lightsail
                .get_bundles()
                .include_inactive(true)
                .set_page_token(token.take())
                .send()
                .await
                .map_err(|e| aws_error("lightsail:GetBundles", e))?;

            bundles.extend(output.bundles().iter().filter_map(|b| {
                Some(LightsailBundle {
                    bundle_id: b.bundle_id()?.to_string(),
                    price: f64::from(b.price()?),
                })
            }));

            match output.next_page_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(bundles)
    }

    pub async fn bundle_prices(&self) -> Result<BundlePrices> {
        Ok(normalize::bundle_prices(&self.lightsail_bundles().await?))
    }

    pub async fn domains(&self) -> Result<Vec<Domain>> {
        let mut domains = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .route53_domains
                .list_domains()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| aws_error("route53domains:ListDomains", e))?;

            domains.extend(output.domains().iter().map(|d| Domain {
                domain_name: d.domain_name().map(str::to_string),
                auto_renew: d.auto_renew(),
            }));

            match output.next_page_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(domains)
    }

    pub async fn databases(&self) -> Result<Vec<DbInstance>> {
        let mut databases = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .rds
                .describe_db_instances()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| aws_error("rds:DescribeDBInstances", e))?;

            databases.extend(output.db_instances().iter().map(|d| DbInstance {
                db_name: d.db_name().map(str::to_string),
                identifier: d.db_instance_identifier().map(str::to_string),
                engine: d.engine().map(str::to_string),
                class: d.db_instance_class().map(str::to_string),
            }));

            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(databases)
    }

    /// Raw listing of one resource, as JSON
    pub async fn data(&self, resource: AwsResource) -> Result<Value> {
        let value = match resource {
            AwsResource::Buckets => serde_json::to_value(self.buckets().await?),
            AwsResource::Lightsails => serde_json::to_value(self.lightsails().await?),
            AwsResource::Domains => serde_json::to_value(self.domains().await?),
            AwsResource::Databases => serde_json::to_value(self.databases().await?),
        };
        value.map_err(|e| ProviderError::Decode {
            provider: "AWS",
            url: resource.as_str().to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Inventory for AwsClient {
    fn label(&self) -> &'static str {
        "AWS"
    }

    async fn collect(&self) -> Result<Vec<ResourceRecords>> {
        let (buckets, lightsails, prices, domains, databases) = tokio::try_join!(
            self.buckets(),
            self.lightsails(),
            self.bundle_prices(),
            self.domains(),
            self.databases(),
        )?;

        debug!(
            buckets = buckets.len(),
            lightsails = lightsails.len(),
            bundles = prices.len(),
            domains = domains.len(),
            databases = databases.len(),
            "fetched AWS resources"
        );

        Ok(vec![
            ResourceRecords::new("bucket", buckets.iter().map(normalize::bucket).collect())?,
            ResourceRecords::new(
                "lightsail",
                lightsails
                    .iter()
                    .map(|i| normalize::lightsail(i, &prices))
                    .collect(),
            )?,
            ResourceRecords::new("domain", domains.iter().map(normalize::domain).collect())?,
            ResourceRecords::new(
                "database",
                databases.iter().map(normalize::database).collect(),
            )?,
        ])
    }
}
