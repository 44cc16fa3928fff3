//! Record model shared by the engine, the datastore and the normalizers
//!
//! A [`MergeableRecord`] is what a resource *should* look like in the
//! datastore. A [`StoredRow`] is what the datastore currently holds. Both
//! carry the mandatory `Name` and `Type` columns; rows also carry `Status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Column values keyed by column name
pub type FieldMap = serde_json::Map<String, Value>;

/// Column holding the resource name
pub const NAME_FIELD: &str = "Name";
/// Column holding the resource kind
pub const TYPE_FIELD: &str = "Type";
/// Column holding the lifecycle status
pub const STATUS_FIELD: &str = "Status";

/// Name used when a provider returns a resource without one
pub const UNNAMED: &str = "Unnamed";

/// Substitute [`UNNAMED`] for a missing or blank provider name.
///
/// `Name` takes part in matching, so it must never be empty.
pub fn name_or_default(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => UNNAMED.to_string(),
    }
}

/// Lifecycle status of a stored row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Observed in the most recent reconciliation
    Active,
    /// Written by older runs; read but never written by this engine
    New,
    /// No longer backed by a live resource
    Unlinked,
}

impl RecordStatus {
    /// Status given to rows the engine creates
    pub const CREATED: RecordStatus = RecordStatus::Active;

    /// The column value for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::New => "new",
            RecordStatus::Unlinked => "unlinked",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordStatus::Active),
            "new" => Ok(RecordStatus::New),
            "unlinked" => Ok(RecordStatus::Unlinked),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Field schema for kinds that only carry `Name` and `Type`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoFields {}

/// A resource as it should appear in the datastore.
///
/// `F` is the kind-specific field schema. It must serialize to a JSON object
/// whose keys are column names, e.g.
///
/// ```
/// use serde::Serialize;
/// use stocktake_core::MergeableRecord;
///
/// #[derive(Serialize)]
/// struct Cost {
///     #[serde(rename = "Cost")]
///     cost: Option<f64>,
/// }
///
/// let record = MergeableRecord::new("web-1", "droplet", Cost { cost: Some(12.0) });
/// let fields = record.to_fields().unwrap();
/// assert_eq!(fields["Name"], "web-1");
/// assert_eq!(fields["Cost"], 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeableRecord<F = NoFields> {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Type")]
    pub record_type: String,

    #[serde(flatten)]
    pub fields: F,
}

impl<F> MergeableRecord<F> {
    /// Create a record with kind-specific fields
    pub fn new(name: impl Into<String>, record_type: impl Into<String>, fields: F) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            fields,
        }
    }
}

impl MergeableRecord<NoFields> {
    /// Create a record with no kind-specific fields
    pub fn bare(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self::new(name, record_type, NoFields {})
    }
}

impl<F: Serialize> MergeableRecord<F> {
    /// All columns of this record, including `Name` and `Type`
    pub fn to_fields(&self) -> Result<FieldMap> {
        let value = serde_json::to_value(self).map_err(|_| self.invalid_fields())?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(self.invalid_fields()),
        }
    }

    /// Replace the typed field schema with its column map.
    ///
    /// Lets records of different kinds travel in one collection.
    pub fn erase(self) -> Result<MergeableRecord<FieldMap>> {
        let fields = match serde_json::to_value(&self.fields) {
            Ok(Value::Object(map)) => map,
            _ => return Err(self.invalid_fields()),
        };
        Ok(MergeableRecord {
            name: self.name,
            record_type: self.record_type,
            fields,
        })
    }

    fn invalid_fields(&self) -> Error {
        Error::InvalidFields {
            record_type: self.record_type.clone(),
        }
    }
}

/// A row currently held by the datastore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    /// Opaque datastore identifier
    pub id: String,

    /// Column values; empty columns may be absent
    #[serde(default)]
    pub fields: FieldMap,
}

impl StoredRow {
    /// Create a row from its id and columns
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Value of a column, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// The `Name` column
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD).and_then(Value::as_str)
    }

    /// The `Type` column
    pub fn record_type(&self) -> Option<&str> {
        self.get(TYPE_FIELD).and_then(Value::as_str)
    }

    /// The `Status` column; `None` when empty or unrecognised
    pub fn status(&self) -> Option<RecordStatus> {
        self.get(STATUS_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Whether the row has already been unlinked
    pub fn is_unlinked(&self) -> bool {
        self.status() == Some(RecordStatus::Unlinked)
    }
}

/// A row to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRow {
    pub fields: FieldMap,
}

impl NewRow {
    /// Columns for a freshly observed resource, tagged [`RecordStatus::CREATED`]
    pub fn created(mut fields: FieldMap) -> Self {
        fields.insert(
            STATUS_FIELD.to_string(),
            Value::String(RecordStatus::CREATED.as_str().to_string()),
        );
        Self { fields }
    }
}

/// A change to an existing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub id: String,
    pub fields: FieldMap,
}

impl RowUpdate {
    /// Overwrite the given columns of row `id`
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Only change the `Status` column of row `id`
    pub fn status(id: impl Into<String>, status: RecordStatus) -> Self {
        let mut fields = FieldMap::new();
        fields.insert(
            STATUS_FIELD.to_string(),
            Value::String(status.as_str().to_string()),
        );
        Self::new(id, fields)
    }
}
