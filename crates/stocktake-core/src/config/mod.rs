//! Configuration for a Stocktake run
//!
//! - **app**: the datastore base and one table per provider, read from
//!   `stocktake.toml` or `config.json`
//! - **env**: provider credentials read from environment variables

mod app;
mod env;

pub use app::{AppConfig, CONFIG_CANDIDATES, ConfigFormat, Endpoints, TableConfig};
pub use env::{
    AIRTABLE_API_KEY, AirtableCredentials, Credentials, DO_API_KEY, DigitalOceanCredentials,
    GODADDY_API_KEY, GODADDY_API_SECRET, GoDaddyCredentials, SENDGRID_API_KEY, Secret,
    SendGridCredentials,
};
