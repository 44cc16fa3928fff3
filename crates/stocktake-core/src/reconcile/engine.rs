//! Reconciler implementation
//!
//! The Reconciler coordinates state between freshly fetched resources and the
//! rows of one datastore table.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::datastore::Datastore;
use crate::record::{FieldMap, MergeableRecord, StoredRow};
use crate::result::MergeResult;
use crate::{Error, Result};

use super::plan::{ReconcilePlan, plan};

/// View used to read tables when none is configured
pub const DEFAULT_VIEW: &str = "Grid view";

/// Options for mutating operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// If true, plans are computed and counted but nothing is written.
    pub dry_run: bool,
}

impl RunOptions {
    /// Options for a dry run
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// The kind of write a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Create => f.write_str("create"),
            WriteOperation::Update => f.write_str("update"),
        }
    }
}

/// The records of one resource type, ready to merge
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecords {
    pub record_type: String,
    pub records: Vec<MergeableRecord<FieldMap>>,
}

impl ResourceRecords {
    /// Group typed records under `record_type`
    pub fn new<F: Serialize>(
        record_type: impl Into<String>,
        records: Vec<MergeableRecord<F>>,
    ) -> Result<Self> {
        Ok(Self {
            record_type: record_type.into(),
            records: records
                .into_iter()
                .map(MergeableRecord::erase)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Engine for converging one datastore table to fetched resources
///
/// Each call reconciles a single resource type:
/// - **unlink** rows of that type with no live resource
/// - **update** rows whose fields differ
/// - **create** rows for new resources
///
/// Writes go out in chunks of at most [`Datastore::max_batch_size`] rows,
/// one chunk at a time.
pub struct Reconciler<'a, D: Datastore + ?Sized> {
    store: &'a D,
    table: String,
    view: String,
    options: RunOptions,
}

impl<'a, D: Datastore + ?Sized> Reconciler<'a, D> {
    /// Create a reconciler for `table`, reading through [`DEFAULT_VIEW`]
    pub fn new(store: &'a D, table: impl Into<String>, options: RunOptions) -> Self {
        Self {
            store,
            table: table.into(),
            view: DEFAULT_VIEW.to_string(),
            options,
        }
    }

    /// Read the table through another view
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    /// The table being reconciled
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The options writes are performed with
    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Reconcile `target` against an already-fetched snapshot of the table.
    ///
    /// `existing` must hold every row of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid (see [`plan`]) or a batch
    /// write fails. Batches written before the failure stay written.
    pub async fn reconcile<F: Serialize>(
        &self,
        existing: &[StoredRow],
        record_type: &str,
        target: &[MergeableRecord<F>],
    ) -> Result<MergeResult> {
        let plan = plan(existing, record_type, target)?;
        self.execute(&plan).await
    }

    /// Fetch the current rows and reconcile `target` against them.
    ///
    /// Should be called once per resource type, e.g. once for "bucket" in
    /// the AWS table.
    pub async fn merge_records<F: Serialize>(
        &self,
        record_type: &str,
        target: &[MergeableRecord<F>],
    ) -> Result<MergeResult> {
        debug!(table = %self.table, record_type, "merging records");
        let existing = self.fetch_rows().await?;
        self.reconcile(&existing, record_type, target).await
    }

    /// Merge several resource types one after the other and sum the results
    pub async fn merge_all(&self, groups: &[ResourceRecords]) -> Result<MergeResult> {
        let mut total = MergeResult::zero();
        for group in groups {
            total += self
                .merge_records(&group.record_type, &group.records)
                .await?;
        }
        Ok(total)
    }

    /// Perform the writes of a plan.
    ///
    /// In a dry run every chunk is still visited, but no write is issued.
    pub async fn execute(&self, plan: &ReconcilePlan) -> Result<MergeResult> {
        let batch_size = self.store.max_batch_size().max(1);
        let prefix = if self.options.dry_run { "[dry-run] " } else { "" };

        if !plan.creates.is_empty() {
            debug!("{}Creating {} new records", prefix, plan.creates.len());
            for chunk in plan.creates.chunks(batch_size) {
                if self.options.dry_run {
                    debug!("[dry-run] Would create {} records", chunk.len());
                    continue;
                }
                self.store
                    .create_batch(&self.table, chunk)
                    .await
                    .map_err(|source| self.write_error(WriteOperation::Create, plan, source))?;
            }
        }

        if !plan.updates.is_empty() {
            debug!("{}Updating {} records", prefix, plan.updates.len());
            for chunk in plan.updates.chunks(batch_size) {
                if self.options.dry_run {
                    debug!("[dry-run] Would update {} records", chunk.len());
                    continue;
                }
                self.store
                    .update_batch(&self.table, chunk)
                    .await
                    .map_err(|source| self.write_error(WriteOperation::Update, plan, source))?;
            }
        }

        let result = plan.result();
        info!(
            table = %self.table,
            record_type = %plan.record_type,
            unlinked = result.unlinked,
            updated = result.updated,
            created = result.created,
            dry_run = self.options.dry_run,
            "reconciled"
        );
        Ok(result)
    }

    async fn fetch_rows(&self) -> Result<Vec<StoredRow>> {
        self.store
            .select_all(&self.table, &self.view)
            .await
            .map_err(|source| Error::Fetch {
                table: self.table.clone(),
                source,
            })
    }

    fn write_error(
        &self,
        operation: WriteOperation,
        plan: &ReconcilePlan,
        source: crate::StoreError,
    ) -> Error {
        Error::Write {
            operation,
            record_type: plan.record_type.clone(),
            table: self.table.clone(),
            source,
        }
    }
}
