//! Runtime context for commands
//!
//! Holds the loaded config and run options, and builds one client per
//! provider on demand from the environment credentials.

use std::path::{Path, PathBuf};

use stocktake_airtable::{AirtableConfig, AirtableStore};
use stocktake_core::{
    AirtableCredentials, AppConfig, DigitalOceanCredentials, Endpoints, GoDaddyCredentials,
    RunOptions, SendGridCredentials,
};
use stocktake_providers::aws::{AwsClient, AwsConfig};
use stocktake_providers::digitalocean::{DigitalOceanClient, DigitalOceanConfig};
use stocktake_providers::godaddy::{GoDaddyClient, GoDaddyConfig};
use stocktake_providers::sendgrid::{SendGridClient, SendGridConfig};

use crate::error::{CliError, Result};

/// Shared state for one CLI invocation
#[derive(Debug)]
pub struct AppContext {
    config: Option<AppConfig>,
    options: RunOptions,
}

impl AppContext {
    /// Context for commands that write to Airtable; a config file is required
    pub fn load(cwd: &Path, explicit: Option<&Path>, options: RunOptions) -> Result<Self> {
        let config = match explicit {
            Some(path) => AppConfig::load(&resolve(cwd, path))?,
            None => AppConfig::discover(cwd)?,
        };
        Ok(Self {
            config: Some(config),
            options,
        })
    }

    /// Context for read-only commands; a config file is used when present
    pub fn load_optional(cwd: &Path, explicit: Option<&Path>, options: RunOptions) -> Result<Self> {
        let config = match explicit {
            Some(path) => Some(AppConfig::load(&resolve(cwd, path))?),
            None => AppConfig::find(cwd)
                .map(|path| AppConfig::load(&path))
                .transpose()?,
        };
        Ok(Self { config, options })
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    pub fn config(&self) -> Result<&AppConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| CliError::user("No configuration loaded"))
    }

    fn endpoints(&self) -> Endpoints {
        self.config
            .as_ref()
            .map(|c| c.endpoints.clone())
            .unwrap_or_default()
    }

    pub fn store(&self, credentials: AirtableCredentials) -> Result<AirtableStore> {
        let config = self.config()?;
        let mut airtable = AirtableConfig::new(credentials.api_key, config.base.clone());
        if let Some(url) = &config.endpoints.airtable {
            airtable = airtable.with_api_base_url(url.clone());
        }
        Ok(AirtableStore::new(airtable)?)
    }

    pub async fn aws(&self) -> AwsClient {
        AwsClient::from_env(AwsConfig::default()).await
    }

    pub fn digitalocean(&self, credentials: DigitalOceanCredentials) -> Result<DigitalOceanClient> {
        let mut config = DigitalOceanConfig::new(credentials);
        if let Some(url) = self.endpoints().digitalocean {
            config = config.with_api_base_url(url);
        }
        Ok(DigitalOceanClient::new(config)?)
    }

    pub fn godaddy(&self, credentials: GoDaddyCredentials) -> Result<GoDaddyClient> {
        let mut config = GoDaddyConfig::new(credentials);
        if let Some(url) = self.endpoints().godaddy {
            config = config.with_api_base_url(url);
        }
        Ok(GoDaddyClient::new(config)?)
    }

    pub fn sendgrid(&self, credentials: SendGridCredentials) -> Result<SendGridClient> {
        let mut config = SendGridConfig::new(credentials);
        if let Some(url) = self.endpoints().sendgrid {
            config = config.with_api_base_url(url);
        }
        Ok(SendGridClient::new(config)?)
    }
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Combine two credential lookups, reporting every missing variable at once
pub fn both<A, B>(
    first: stocktake_core::Result<A>,
    second: stocktake_core::Result<B>,
) -> Result<(A, B)> {
    use stocktake_core::Error;

    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(Error::MissingEnv { mut names }), Err(Error::MissingEnv { names: more })) => {
            names.extend(more);
            Err(Error::MissingEnv { names }.into())
        }
        (Err(e), _) | (_, Err(e)) => Err(e.into()),
    }
}
