//! Inventory trait

use async_trait::async_trait;
use stocktake_core::ResourceRecords;

use crate::Result;

/// A provider whose live resources can be mirrored into one table
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Short label used in run output, e.g. `DO`
    fn label(&self) -> &'static str;

    /// Fetch every resource kind and group the normalized records by type,
    /// in the order they should be merged.
    async fn collect(&self) -> Result<Vec<ResourceRecords>>;
}
