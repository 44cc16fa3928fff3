//! [`MemoryDatastore`] for engine and CLI tests.
//!
//! Behaves like the hosted table it stands in for: writes larger than the
//! batch limit are refused, updates only touch the columns they carry, and
//! blank values are dropped on write.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use stocktake_core::{
    DEFAULT_BATCH_SIZE, Datastore, FieldMap, NewRow, RowUpdate, StoreError, StoreResult,
    StoredRow,
};

/// One call received by the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    SelectAll { table: String, view: String },
    Create { table: String, rows: Vec<NewRow> },
    Update { table: String, updates: Vec<RowUpdate> },
}

impl StoreCall {
    /// Whether this call writes
    pub fn is_write(&self) -> bool {
        !matches!(self, StoreCall::SelectAll { .. })
    }

    /// Rows carried by a write call
    pub fn len(&self) -> usize {
        match self {
            StoreCall::SelectAll { .. } => 0,
            StoreCall::Create { rows, .. } => rows.len(),
            StoreCall::Update { updates, .. } => updates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct State {
    tables: BTreeMap<String, Vec<StoredRow>>,
    calls: Vec<StoreCall>,
    next_id: usize,
    writes: usize,
    fail_write: Option<usize>,
    fail_reads: bool,
}

/// An in-memory datastore.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stocktake_test_utils::{MemoryDatastore, row};
///
/// let store = MemoryDatastore::new()
///     .with_rows("DO", vec![row("rec1", json!({"Name": "web-1", "Type": "droplet"}))]);
/// assert_eq!(store.rows("DO").len(), 1);
/// assert!(store.calls().is_empty());
/// ```
pub struct MemoryDatastore {
    state: Mutex<State>,
    max_batch_size: usize,
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatastore {
    /// An empty store with the default batch limit.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            max_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Change the batch limit.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Seed `table` with rows. Seeding is not recorded as a call.
    pub fn with_rows(self, table: &str, rows: Vec<StoredRow>) -> Self {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Fail the `n`th write call (1-based) with a server error.
    pub fn fail_on_write(self, n: usize) -> Self {
        self.lock().fail_write = Some(n);
        self
    }

    /// Fail every read with a timeout.
    pub fn fail_reads(self) -> Self {
        self.lock().fail_reads = true;
        self
    }

    /// Snapshot of the rows in `table`.
    pub fn rows(&self, table: &str) -> Vec<StoredRow> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// The row named `name` of type `record_type` in `table`.
    pub fn find(&self, table: &str, record_type: &str, name: &str) -> Option<StoredRow> {
        self.rows(table)
            .into_iter()
            .find(|r| r.record_type() == Some(record_type) && r.name() == Some(name))
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Write calls received so far, in order.
    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_write).collect()
    }

    /// Forget recorded calls, keeping the rows.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_write(&self, state: &mut State, size: usize) -> StoreResult<()> {
        if size > self.max_batch_size {
            return Err(StoreError::BatchTooLarge {
                size,
                limit: self.max_batch_size,
            });
        }
        state.writes += 1;
        if state.fail_write == Some(state.writes) {
            return Err(StoreError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn strip_blank(fields: &FieldMap) -> FieldMap {
    fields
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn select_all(&self, table: &str, view: &str) -> StoreResult<Vec<StoredRow>> {
        let mut state = self.lock();
        state.calls.push(StoreCall::SelectAll {
            table: table.to_string(),
            view: view.to_string(),
        });
        if state.fail_reads {
            return Err(StoreError::Timeout);
        }
        Ok(state.tables.get(table).cloned().unwrap_or_default())
    }

    async fn create_batch(&self, table: &str, rows: &[NewRow]) -> StoreResult<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Create {
            table: table.to_string(),
            rows: rows.to_vec(),
        });
        self.check_write(&mut state, rows.len())?;

        let mut created = Vec::with_capacity(rows.len());
        for new in rows {
            state.next_id += 1;
            created.push(StoredRow::new(
                format!("rec{:04}", state.next_id),
                strip_blank(&new.fields),
            ));
        }
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(created);
        Ok(())
    }

    async fn update_batch(&self, table: &str, updates: &[RowUpdate]) -> StoreResult<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Update {
            table: table.to_string(),
            updates: updates.to_vec(),
        });
        self.check_write(&mut state, updates.len())?;

        let rows = state.tables.entry(table.to_string()).or_default();
        if let Some(unknown) = updates
            .iter()
            .find(|u| !rows.iter().any(|r| r.id == u.id))
        {
            return Err(StoreError::Api {
                status: 404,
                message: format!("record {} not found", unknown.id),
            });
        }

        for update in updates {
            if let Some(row) = rows.iter_mut().find(|r| r.id == update.id) {
                for (column, value) in &update.fields {
                    if is_blank(value) {
                        row.fields.remove(column);
                    } else {
                        row.fields.insert(column.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }
}
