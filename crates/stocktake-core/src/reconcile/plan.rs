//! Planning step of a reconciliation
//!
//! Pure: given the stored rows and the target records of one type, decide
//! which rows to create, update or unlink. Nothing is written here.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::record::{FieldMap, MergeableRecord, NewRow, RecordStatus, RowUpdate, StoredRow};
use crate::result::MergeResult;
use crate::{Error, Result};

/// The writes needed to converge one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// The type this plan reconciles
    pub record_type: String,
    /// Rows to create, in target order
    pub creates: Vec<NewRow>,
    /// Unlink updates first, then field updates in target order
    pub updates: Vec<RowUpdate>,
    /// How many leading entries of `updates` are unlinks
    pub unlinked: usize,
}

impl ReconcilePlan {
    /// An empty plan for `record_type`
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            ..Default::default()
        }
    }

    /// Whether the plan performs no writes
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }

    /// The counts this plan reports once executed.
    ///
    /// Unlinks travel in the update batch but are counted separately.
    pub fn result(&self) -> MergeResult {
        MergeResult {
            unlinked: self.unlinked,
            updated: self.updates.len().saturating_sub(self.unlinked),
            created: self.creates.len(),
        }
    }
}

/// Compute the plan that converges the `record_type` rows of `existing` to
/// `target`.
///
/// `existing` must be the complete table, not a page of it. Rows of other
/// types are never touched, even when their name matches a target record.
///
/// # Errors
///
/// - [`Error::TypeMismatch`] if a target record is of another type
/// - [`Error::DuplicateRecord`] if two target records share a name
/// - [`Error::InvalidFields`] if a record's fields are not an object
pub fn plan<F: Serialize>(
    existing: &[StoredRow],
    record_type: &str,
    target: &[MergeableRecord<F>],
) -> Result<ReconcilePlan> {
    let mut names: HashSet<&str> = HashSet::with_capacity(target.len());
    for record in target {
        if record.record_type != record_type {
            return Err(Error::TypeMismatch {
                expected: record_type.to_string(),
                found: record.record_type.clone(),
                name: record.name.clone(),
            });
        }
        if !names.insert(record.name.as_str()) {
            return Err(Error::DuplicateRecord {
                record_type: record_type.to_string(),
                name: record.name.clone(),
            });
        }
    }

    let incoming = target
        .iter()
        .map(MergeableRecord::to_fields)
        .collect::<Result<Vec<_>>>()?;

    let typed: Vec<&StoredRow> = existing
        .iter()
        .filter(|row| row.record_type() == Some(record_type))
        .collect();

    let mut plan = ReconcilePlan::new(record_type);

    //
    // 1 - Unlink stored rows that no longer have a live resource
    //
    for row in &typed {
        let linked = row.name().is_some_and(|name| names.contains(name));
        if !linked && !row.is_unlinked() {
            debug!(
                name = row.name().unwrap_or_default(),
                record_type, "record is now unlinked"
            );
            plan.updates
                .push(RowUpdate::status(row.id.clone(), RecordStatus::Unlinked));
        }
    }
    plan.unlinked = plan.updates.len();

    //
    // 2 - Create missing rows and update rows that differ
    //
    // First stored row wins when the table itself holds duplicate names.
    let mut by_name: HashMap<&str, &StoredRow> = HashMap::with_capacity(typed.len());
    for row in &typed {
        if let Some(name) = row.name() {
            by_name.entry(name).or_insert(*row);
        }
    }

    for (record, fields) in target.iter().zip(incoming) {
        match by_name.get(record.name.as_str()) {
            Some(row) if has_changed(row, &fields) => {
                debug!(name = %record.name, record_type, "update");
                plan.updates.push(RowUpdate::new(row.id.clone(), fields));
            }
            Some(_) => {
                debug!(name = %record.name, record_type, "unchanged");
            }
            None => {
                debug!(name = %record.name, record_type, "create");
                plan.creates.push(NewRow::created(fields));
            }
        }
    }

    Ok(plan)
}

/// Whether any incoming column differs from the stored row
fn has_changed(row: &StoredRow, incoming: &FieldMap) -> bool {
    incoming
        .iter()
        .any(|(column, value)| !field_matches(row.get(column), value))
}

/// Compare a stored column with an incoming value.
///
/// Equality is strict except for two datastore quirks: empty columns are
/// omitted from stored rows (so absent equals a blank incoming value), and
/// numbers come back without their original representation (`10` equals
/// `10.0`).
pub fn field_matches(stored: Option<&Value>, incoming: &Value) -> bool {
    match (stored, incoming) {
        (None | Some(Value::Null), incoming) => is_blank(incoming),
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(stored), incoming) => stored == incoming,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Number(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Cost {
        #[serde(rename = "Cost")]
        cost: Option<f64>,
    }

    fn stored(id: &str, fields: Value) -> StoredRow {
        match fields {
            Value::Object(map) => StoredRow::new(id, map),
            _ => panic!("fields must be an object"),
        }
    }

    fn droplet(name: &str, cost: f64) -> MergeableRecord<Cost> {
        MergeableRecord::new(name, "droplet", Cost { cost: Some(cost) })
    }

    #[test]
    fn test_changed_cost_stages_full_update() {
        let existing = vec![stored(
            "rec1",
            json!({"Name": "web-1", "Type": "droplet", "Status": "active", "Cost": 10}),
        )];

        let plan = plan(&existing, "droplet", &[droplet("web-1", 15.0)]).unwrap();

        assert_eq!(plan.result(), MergeResult { unlinked: 0, updated: 1, created: 0 });
        assert_eq!(plan.updates[0].id, "rec1");
        assert_eq!(
            Value::Object(plan.updates[0].fields.clone()),
            json!({"Name": "web-1", "Type": "droplet", "Cost": 15.0})
        );
    }

    #[test]
    fn test_integer_and_float_costs_are_equal() {
        let existing = vec![stored(
            "rec1",
            json!({"Name": "web-1", "Type": "droplet", "Status": "active", "Cost": 10}),
        )];

        let plan = plan(&existing, "droplet", &[droplet("web-1", 10.0)]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_missing_row_is_created_active() {
        let plan = plan(&[], "bucket", &[MergeableRecord::bare("bucket-a", "bucket")]).unwrap();

        assert_eq!(plan.result(), MergeResult { unlinked: 0, updated: 0, created: 1 });
        assert_eq!(plan.creates[0].fields["Status"], json!("active"));
    }

    #[test]
    fn test_stale_row_is_unlinked() {
        let existing = vec![stored(
            "rec2",
            json!({"Name": "old-db", "Type": "database", "Status": "active"}),
        )];
        let target: Vec<MergeableRecord> = vec![];

        let plan = plan(&existing, "database", &target).unwrap();

        assert_eq!(plan.result(), MergeResult { unlinked: 1, updated: 0, created: 0 });
        assert_eq!(plan.updates[0], RowUpdate::status("rec2", RecordStatus::Unlinked));
    }

    #[test]
    fn test_unlinked_row_is_not_unlinked_again() {
        let existing = vec![stored(
            "rec2",
            json!({"Name": "old-db", "Type": "database", "Status": "unlinked"}),
        )];
        let target: Vec<MergeableRecord> = vec![];

        let plan = plan(&existing, "database", &target).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_other_types_are_left_alone() {
        let existing = vec![
            stored("rec1", json!({"Name": "shared", "Type": "volume", "Status": "active"})),
            stored("rec2", json!({"Name": "gone", "Type": "volume", "Status": "active"})),
        ];

        let plan = plan(&existing, "snapshot", &[MergeableRecord::bare("shared", "snapshot")])
            .unwrap();

        assert_eq!(plan.result(), MergeResult { unlinked: 0, updated: 0, created: 1 });
        assert_eq!(plan.creates[0].fields["Type"], json!("snapshot"));
    }

    #[test]
    fn test_reappearing_unchanged_row_stays_unlinked() {
        // An unlinked row that comes back only differs if a field differs;
        // the Status column is not part of the incoming fields.
        let existing = vec![stored(
            "rec3",
            json!({"Name": "web-1", "Type": "droplet", "Status": "unlinked", "Cost": 5}),
        )];

        let plan = plan(&existing, "droplet", &[droplet("web-1", 5.0)]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_result_of_inconsistent_plan_does_not_underflow() {
        let mut plan = ReconcilePlan::new("droplet");
        plan.unlinked = 2;
        plan.updates.push(RowUpdate::status("rec1", RecordStatus::Unlinked));

        assert_eq!(plan.result(), MergeResult { unlinked: 2, updated: 0, created: 0 });
    }

    #[test]
    fn test_unlinks_come_before_field_updates() {
        let existing = vec![
            stored("rec1", json!({"Name": "a", "Type": "droplet", "Cost": 1})),
            stored("rec2", json!({"Name": "b", "Type": "droplet", "Cost": 1})),
        ];

        let plan = plan(&existing, "droplet", &[droplet("a", 2.0)]).unwrap();

        assert_eq!(plan.unlinked, 1);
        assert_eq!(plan.updates[0].id, "rec2");
        assert_eq!(plan.updates[1].id, "rec1");
        assert_eq!(plan.result(), MergeResult { unlinked: 1, updated: 1, created: 0 });
    }

    #[test]
    fn test_duplicate_target_names_are_rejected() {
        let result = plan(&[], "droplet", &[droplet("web-1", 1.0), droplet("web-1", 2.0)]);
        assert!(matches!(
            result,
            Err(Error::DuplicateRecord { ref name, .. }) if name == "web-1"
        ));
    }

    #[test]
    fn test_foreign_type_in_target_is_rejected() {
        let result = plan(&[], "droplet", &[MergeableRecord::bare("assets", "bucket")]);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_row_without_name_is_unlinked() {
        let existing = vec![stored("rec1", json!({"Type": "bucket", "Status": "active"}))];
        let plan = plan(&existing, "bucket", &[MergeableRecord::bare("a", "bucket")]).unwrap();
        assert_eq!(plan.result(), MergeResult { unlinked: 1, updated: 0, created: 1 });
    }

    #[test]
    fn test_field_matches_blank_values() {
        assert!(field_matches(None, &Value::Null));
        assert!(field_matches(None, &json!("")));
        assert!(field_matches(None, &json!(false)));
        assert!(field_matches(Some(&Value::Null), &json!([])));
        assert!(!field_matches(None, &json!(0)));
        assert!(!field_matches(None, &json!("OK - 200")));
    }

    #[test]
    fn test_field_matches_is_strict_across_kinds() {
        assert!(field_matches(Some(&json!("10")), &json!("10")));
        assert!(!field_matches(Some(&json!("10")), &json!(10)));
        assert!(!field_matches(Some(&json!(10)), &Value::Null));
        assert!(field_matches(Some(&json!(2.5)), &json!(2.5)));
    }
}
