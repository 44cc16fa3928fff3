//! GoDaddy descriptors to records

use chrono::{DateTime, Utc};
use stocktake_core::{MergeableRecord, name_or_default};
use tracing::warn;

use super::types::Domain;
use crate::fields::DomainFields;

/// Format an RFC 3339 timestamp as `yyyy-mm-dd` (UTC).
///
/// Empty or unparseable input gives `None`.
pub fn expiry_date(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => Some(date.with_timezone(&Utc).format("%Y-%m-%d").to_string()),
        Err(e) => {
            warn!(value = raw, error = %e, "unparseable domain expiry date");
            None
        }
    }
}

/// A domain record with its probe outcome
pub fn domain(domain: &Domain, http_response: String) -> MergeableRecord<DomainFields> {
    MergeableRecord::new(
        name_or_default(Some(domain.domain.as_str())),
        "domain",
        DomainFields {
            expires: expiry_date(domain.expires.as_deref()),
            http_response,
        },
    )
}
