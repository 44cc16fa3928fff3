//! Application config file loading
//!
//! The file names the datastore base and the table each provider is
//! reconciled into. Format is detected from the file extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File names looked up, in order, when no path is given
pub const CONFIG_CANDIDATES: [&str; 2] = ["stocktake.toml", "config.json"];

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Table names, one per provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub aws: String,

    #[serde(rename = "do")]
    pub digitalocean: String,

    pub godaddy: String,

    pub sendgrid: String,
}

/// API base URL overrides, for proxies and local test servers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoints {
    pub airtable: Option<String>,

    #[serde(rename = "do")]
    pub digitalocean: Option<String>,

    pub godaddy: Option<String>,

    pub sendgrid: Option<String>,
}

/// Validated application config
///
/// ```
/// use stocktake_core::{AppConfig, ConfigFormat};
///
/// let config = AppConfig::parse(r#"
/// base = "appXXXXXXXXXXXXXX"
///
/// [tables]
/// aws = "AWS"
/// do = "DigitalOcean"
/// godaddy = "GoDaddy"
/// sendgrid = "SendGrid"
/// "#, ConfigFormat::Toml, "stocktake.toml".as_ref()).unwrap();
///
/// assert_eq!(config.tables.digitalocean, "DigitalOcean");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Datastore base identifier
    pub base: String,

    /// Table per provider
    pub tables: TableConfig,

    /// Optional API base URL overrides
    #[serde(default, skip_serializing_if = "is_default")]
    pub endpoints: Endpoints,
}

fn is_default(endpoints: &Endpoints) -> bool {
    *endpoints == Endpoints::default()
}

impl AppConfig {
    /// Load and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be parsed, has
    /// unknown keys or empty values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format, path)
    }

    /// Load the first of [`CONFIG_CANDIDATES`] found in `dir`
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => Self::load(&path),
            None => Err(Error::ConfigNotFound {
                path: dir.join(CONFIG_CANDIDATES[0]),
            }),
        }
    }

    /// Path of the first config candidate present in `dir`
    pub fn find(dir: &Path) -> Option<PathBuf> {
        CONFIG_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parse and validate config content; `path` is only used in errors
    pub fn parse(content: &str, format: ConfigFormat, path: &Path) -> Result<Self> {
        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.name().to_string(),
            message,
        };

        let config: AppConfig = match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject empty identifiers
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base", &self.base),
            ("tables.aws", &self.tables.aws),
            ("tables.do", &self.tables.digitalocean),
            ("tables.godaddy", &self.tables.godaddy),
            ("tables.sendgrid", &self.tables.sendgrid),
        ];

        let endpoints = [
            ("endpoints.airtable", &self.endpoints.airtable),
            ("endpoints.do", &self.endpoints.digitalocean),
            ("endpoints.godaddy", &self.endpoints.godaddy),
            ("endpoints.sendgrid", &self.endpoints.sendgrid),
        ];
        let present = endpoints
            .into_iter()
            .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)));

        for (field, value) in fields.into_iter().chain(present) {
            if value.trim().is_empty() {
                return Err(Error::ConfigInvalid {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}
