//! Reconciliation of fetched resources against stored rows
//!
//! This module provides:
//! - **plan**: compute the creates, updates and unlinks for one resource type
//! - **engine**: execute a plan against a [`Datastore`](crate::Datastore) in
//!   capped, sequential batches, honouring dry runs

mod engine;
mod plan;

pub use engine::{DEFAULT_VIEW, Reconciler, ResourceRecords, RunOptions, WriteOperation};
pub use plan::{ReconcilePlan, field_matches, plan};
