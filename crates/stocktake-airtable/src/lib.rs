//! Airtable datastore for Stocktake
//!
//! Implements [`stocktake_core::Datastore`] over the Airtable REST API:
//!
//! - `GET /v0/{base}/{table}` with `offset` pagination for reads
//! - `POST` and `PATCH` of at most ten records for writes
//! - bearer-token auth, request timeouts, and bounded backoff on HTTP 429

mod client;
mod wire;

pub use client::{AIRTABLE_API_URL, AirtableConfig, AirtableStore};
