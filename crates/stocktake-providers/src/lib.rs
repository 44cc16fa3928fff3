//! Cloud provider inventories for Stocktake
//!
//! Each provider module has three layers:
//!
//! - **client**: authenticated, fully paginated fetches returning raw
//!   descriptors
//! - **types**: the partial typing of those descriptors (also what the
//!   `data` command prints)
//! - **normalize**: pure functions mapping descriptors to
//!   [`MergeableRecord`](stocktake_core::MergeableRecord)s
//!
//! Every client implements [`Inventory`], which fetches all resource kinds of
//! the provider and groups them by record type, ready for the reconciler.

pub mod aws;
pub mod digitalocean;
pub mod error;
pub mod fields;
pub mod godaddy;
mod http;
pub mod inventory;
pub mod sendgrid;

pub use error::{ProviderError, Result};
pub use fields::{CostFields, DomainFields, round_cents};
pub use inventory::Inventory;
