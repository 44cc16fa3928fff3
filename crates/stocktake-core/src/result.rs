//! Aggregated outcome counts of a reconciliation

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Counts of the operations a reconciliation performed (or would perform in
/// a dry run).
///
/// Results add up field by field, so per-type results fold into a provider
/// result and provider results fold into a run result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeResult {
    /// Rows transitioned to `unlinked`
    pub unlinked: usize,
    /// Rows whose fields were rewritten
    pub updated: usize,
    /// Rows created
    pub created: usize,
}

impl MergeResult {
    /// The identity result: nothing happened
    pub const fn zero() -> Self {
        Self {
            unlinked: 0,
            updated: 0,
            created: 0,
        }
    }

    /// Sum any number of results
    pub fn combine<I>(results: I) -> Self
    where
        I: IntoIterator<Item = MergeResult>,
    {
        results.into_iter().sum()
    }

    /// Total number of row writes
    pub fn total(&self) -> usize {
        self.unlinked + self.updated + self.created
    }

    /// Whether no row was touched
    pub fn is_noop(&self) -> bool {
        self.total() == 0
    }
}

impl Add for MergeResult {
    type Output = MergeResult;

    fn add(self, other: MergeResult) -> MergeResult {
        MergeResult {
            unlinked: self.unlinked + other.unlinked,
            updated: self.updated + other.updated,
            created: self.created + other.created,
        }
    }
}

impl AddAssign for MergeResult {
    fn add_assign(&mut self, other: MergeResult) {
        *self = *self + other;
    }
}

impl Sum for MergeResult {
    fn sum<I: Iterator<Item = MergeResult>>(iter: I) -> Self {
        iter.fold(MergeResult::zero(), Add::add)
    }
}

impl<'a> Sum<&'a MergeResult> for MergeResult {
    fn sum<I: Iterator<Item = &'a MergeResult>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
