//! Airtable request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocktake_core::{FieldMap, NewRow, RowUpdate, StoredRow};

/// One page of `GET /v0/{base}/{table}`
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub records: Vec<StoredRow>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub records: Vec<CreateRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRecord<'a> {
    pub fields: &'a FieldMap,
}

impl<'a> CreateRequest<'a> {
    pub fn new(rows: &'a [NewRow]) -> Self {
        Self {
            records: rows
                .iter()
                .map(|row| CreateRecord {
                    fields: &row.fields,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRequest<'a> {
    pub records: &'a [RowUpdate],
}

/// Pull a readable message out of an Airtable error body.
///
/// Airtable answers either `{"error": "NOT_FOUND"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("error") {
        Some(Value::String(kind)) => kind.clone(),
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str);
            let message = error.get("message").and_then(Value::as_str);
            match (kind, message) {
                (Some(kind), Some(message)) => format!("{}: {}", kind, message),
                (Some(text), None) | (None, Some(text)) => text.to_string(),
                (None, None) => body.trim().to_string(),
            }
        }
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_tolerates_missing_fields() {
        let page: ListResponse = serde_json::from_value(json!({
            "records": [
                {"id": "rec1", "createdTime": "2020-01-01T00:00:00.000Z", "fields": {"Name": "a"}},
                {"id": "rec2", "createdTime": "2020-01-01T00:00:00.000Z"}
            ],
            "offset": "itr/rec2"
        }))
        .unwrap();

        assert_eq!(page.records.len(), 2);
        assert!(page.records[1].fields.is_empty());
        assert_eq!(page.offset.as_deref(), Some("itr/rec2"));
    }

    #[test]
    fn test_update_request_shape() {
        let updates = vec![RowUpdate::status("rec1", stocktake_core::RecordStatus::Unlinked)];
        let body = serde_json::to_value(UpdateRequest { records: &updates }).unwrap();
        assert_eq!(
            body,
            json!({"records": [{"id": "rec1", "fields": {"Status": "unlinked"}}]})
        );
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(error_message(r#"{"error": "NOT_FOUND"}"#), "NOT_FOUND");
        assert_eq!(
            error_message(r#"{"error": {"type": "INVALID_REQUEST", "message": "bad field"}}"#),
            "INVALID_REQUEST: bad field"
        );
        assert_eq!(error_message("gateway down\n"), "gateway down");
    }
}
