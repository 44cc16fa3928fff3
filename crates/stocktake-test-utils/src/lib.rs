//! Shared test utilities for the Stocktake workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`store`]: [`MemoryDatastore`](store::MemoryDatastore), an in-memory
//!   datastore that records every call
//! - [`rows`]: builders for stored rows from JSON literals

pub mod rows;
pub mod store;

pub use rows::{fields, row};
pub use store::{MemoryDatastore, StoreCall};
