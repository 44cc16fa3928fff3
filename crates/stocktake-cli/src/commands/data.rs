//! The `data` command: raw provider listings as JSON

use std::str::FromStr;

use serde_json::Value;
use stocktake_core::{DigitalOceanCredentials, GoDaddyCredentials, SendGridCredentials};
use stocktake_providers::aws::AwsResource;
use stocktake_providers::digitalocean::DoResource;
use stocktake_providers::godaddy::GoDaddyResource;
use stocktake_providers::sendgrid::SendGridResource;

use crate::cli::Service;
use crate::context::AppContext;
use crate::error::{CliError, Result};

/// A service resource that can be dumped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTarget {
    Aws(AwsResource),
    DigitalOcean(DoResource),
    GoDaddy(GoDaddyResource),
    SendGrid(SendGridResource),
}

impl DataTarget {
    /// Resolve `resource` within `service`
    pub fn parse(service: Service, resource: &str) -> Result<Self> {
        let target = match service {
            Service::Aws => parse_as(resource).map(DataTarget::Aws),
            Service::DigitalOcean => parse_as(resource).map(DataTarget::DigitalOcean),
            Service::GoDaddy => parse_as(resource).map(DataTarget::GoDaddy),
            Service::SendGrid => parse_as(resource).map(DataTarget::SendGrid),
        };

        target.ok_or_else(|| {
            CliError::user(format!(
                "Unknown resource '{}.{}', options: {}",
                service.as_str(),
                resource,
                options(service)
            ))
        })
    }
}

fn parse_as<T: FromStr>(resource: &str) -> Option<T> {
    resource.parse().ok()
}

/// Resource names a service offers
pub fn resource_names(service: Service) -> Vec<&'static str> {
    match service {
        Service::Aws => AwsResource::ALL.iter().map(AwsResource::as_str).collect(),
        Service::DigitalOcean => DoResource::ALL.iter().map(DoResource::as_str).collect(),
        Service::GoDaddy => GoDaddyResource::ALL
            .iter()
            .map(GoDaddyResource::as_str)
            .collect(),
        Service::SendGrid => SendGridResource::ALL
            .iter()
            .map(SendGridResource::as_str)
            .collect(),
    }
}

/// `"a", "b"` listing of a service's resources
fn options(service: Service) -> String {
    resource_names(service)
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the data command
pub async fn run_data(ctx: &AppContext, service: Service, resource: Option<&str>) -> Result<()> {
    let Some(resource) = resource else {
        println!(
            "Available {} resources: {}",
            service.as_str(),
            options(service)
        );
        return Ok(());
    };

    let target = DataTarget::parse(service, resource)?;
    let value = fetch(ctx, target).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn fetch(ctx: &AppContext, target: DataTarget) -> Result<Value> {
    let value = match target {
        DataTarget::Aws(resource) => ctx.aws().await.data(resource).await?,
        DataTarget::DigitalOcean(resource) => {
            ctx.digitalocean(DigitalOceanCredentials::from_env()?)?
                .data(resource)
                .await?
        }
        DataTarget::GoDaddy(resource) => {
            ctx.godaddy(GoDaddyCredentials::from_env()?)?
                .data(resource)
                .await?
        }
        DataTarget::SendGrid(resource) => {
            ctx.sendgrid(SendGridCredentials::from_env()?)?
                .data(resource)
                .await?
        }
    };
    Ok(value)
}
