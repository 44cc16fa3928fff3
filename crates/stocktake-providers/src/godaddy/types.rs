//! Partial typing of GoDaddy domain objects

use serde::{Deserialize, Serialize};

/// A registered domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub domain: String,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub renew_auto: Option<bool>,
}
