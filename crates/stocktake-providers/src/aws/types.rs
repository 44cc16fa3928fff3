//! Plain descriptors of the AWS resources Stocktake records
//!
//! SDK output types are not serializable, so each listing is copied into one
//! of these before normalizing or dumping it as JSON.

use serde::{Deserialize, Serialize};

/// An S3 bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: Option<String>,
}

/// A Lightsail virtual server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightsailInstance {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
    pub blueprint_id: Option<String>,
    pub state: Option<String>,
}

/// A Lightsail price plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightsailBundle {
    pub bundle_id: String,
    pub price: f64,
}

/// A Route 53 registered domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub domain_name: Option<String>,
    pub auto_renew: Option<bool>,
}

/// An RDS database instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstance {
    pub db_name: Option<String>,
    pub identifier: Option<String>,
    pub engine: Option<String>,
    pub class: Option<String>,
}
