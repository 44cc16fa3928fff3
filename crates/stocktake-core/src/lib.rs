//! Core reconciliation layer for Stocktake
//!
//! This crate keeps a tabular datastore in step with live cloud inventory.
//! It provides:
//!
//! - **Record model**: [`MergeableRecord`] (what a resource should look like)
//!   and [`StoredRow`] (what the datastore currently holds)
//! - **Reconciliation engine**: [`plan`] computes creates, updates and unlinks
//!   for one resource type; [`Reconciler`] executes them in capped batches
//! - **Result aggregation**: [`MergeResult`] counts that add up across types
//!   and providers
//! - **Datastore seam**: the [`Datastore`] trait implemented by the Airtable
//!   adapter and by in-memory fakes
//! - **Configuration**: [`AppConfig`] and provider [`Credentials`]
//!
//! # Architecture
//!
//! ```text
//!          stocktake-cli
//!         /      |      \
//! providers   airtable   |
//!         \      |      /
//!          stocktake-core
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stocktake_core::{MergeableRecord, Reconciler, RunOptions};
//!
//! let reconciler = Reconciler::new(&store, "Resources", RunOptions::default());
//! let result = reconciler
//!     .merge_records("bucket", &[MergeableRecord::bare("assets", "bucket")])
//!     .await?;
//! println!("created {}", result.created);
//! ```

pub mod config;
pub mod datastore;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod result;

pub use config::{
    AirtableCredentials, AppConfig, ConfigFormat, Credentials, DigitalOceanCredentials, Endpoints,
    GoDaddyCredentials, Secret, SendGridCredentials, TableConfig,
};
pub use datastore::{DEFAULT_BATCH_SIZE, Datastore, StoreError, StoreResult};
pub use error::{Error, Result};
pub use reconcile::{
    DEFAULT_VIEW, ReconcilePlan, Reconciler, ResourceRecords, RunOptions, WriteOperation, plan,
};
pub use record::{
    FieldMap, MergeableRecord, NoFields, NewRow, RecordStatus, RowUpdate, StoredRow, UNNAMED,
    name_or_default,
};
pub use result::MergeResult;
