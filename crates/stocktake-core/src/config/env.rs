//! Provider credentials from the environment
//!
//! Every lookup goes through a closure so tests never touch the process
//! environment. Missing variables are collected and reported together.

use std::fmt;

use crate::{Error, Result};

pub const AIRTABLE_API_KEY: &str = "AIRTABLE_API_KEY";
pub const DO_API_KEY: &str = "DO_API_KEY";
pub const GODADDY_API_KEY: &str = "GODADDY_API_KEY";
pub const GODADDY_API_SECRET: &str = "GODADDY_API_SECRET";
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";

/// A credential value that never shows up in debug output
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Read every name in `names`, failing with all the missing ones at once.
/// Blank values count as missing.
fn require<const N: usize>(
    lookup: &impl Fn(&str) -> Option<String>,
    names: [&str; N],
) -> Result<[Secret; N]> {
    let mut missing = Vec::new();
    let values = names.map(|name| match lookup(name) {
        Some(value) if !value.trim().is_empty() => Secret(value),
        _ => {
            missing.push(name.to_string());
            Secret::default()
        }
    });

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(Error::MissingEnv { names: missing })
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Airtable personal access token
#[derive(Debug, Clone)]
pub struct AirtableCredentials {
    pub api_key: Secret,
}

impl AirtableCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [api_key] = require(&lookup, [AIRTABLE_API_KEY])?;
        Ok(Self { api_key })
    }
}

/// DigitalOcean API token
#[derive(Debug, Clone)]
pub struct DigitalOceanCredentials {
    pub api_key: Secret,
}

impl DigitalOceanCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [api_key] = require(&lookup, [DO_API_KEY])?;
        Ok(Self { api_key })
    }
}

/// GoDaddy key and secret pair
#[derive(Debug, Clone)]
pub struct GoDaddyCredentials {
    pub api_key: Secret,
    pub api_secret: Secret,
}

impl GoDaddyCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [api_key, api_secret] = require(&lookup, [GODADDY_API_KEY, GODADDY_API_SECRET])?;
        Ok(Self {
            api_key,
            api_secret,
        })
    }
}

/// SendGrid API key
#[derive(Debug, Clone)]
pub struct SendGridCredentials {
    pub api_key: Secret,
}

impl SendGridCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [api_key] = require(&lookup, [SENDGRID_API_KEY])?;
        Ok(Self { api_key })
    }
}

/// Every credential needed by a full run.
///
/// AWS is absent: its SDK resolves credentials through its own chain.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub airtable: AirtableCredentials,
    pub digitalocean: DigitalOceanCredentials,
    pub godaddy: GoDaddyCredentials,
    pub sendgrid: SendGridCredentials,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [airtable, digitalocean, godaddy_key, godaddy_secret, sendgrid] = require(
            &lookup,
            [
                AIRTABLE_API_KEY,
                DO_API_KEY,
                GODADDY_API_KEY,
                GODADDY_API_SECRET,
                SENDGRID_API_KEY,
            ],
        )?;

        Ok(Self {
            airtable: AirtableCredentials { api_key: airtable },
            digitalocean: DigitalOceanCredentials {
                api_key: digitalocean,
            },
            godaddy: GoDaddyCredentials {
                api_key: godaddy_key,
                api_secret: godaddy_secret,
            },
            sendgrid: SendGridCredentials { api_key: sendgrid },
        })
    }
}
