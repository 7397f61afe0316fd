use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Column definition from a tabular payload. Nonzero priority means the
/// column is hidden unless wide output was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub priority: i64,
}

/// One decoded row: the opaque cell values plus the identifying metadata of
/// the embedded object.
#[derive(Debug, Clone)]
pub struct TabularRow {
    pub cells: Vec<Value>,
    pub uid: String,
    pub name: String,
    pub namespace: Option<String>,
    pub creation_timestamp: DateTime<Utc>,
    pub labels: BTreeMap<String, String>,
}

/// A decoded tabular update: column definitions (possibly empty on
/// follow-up events) and zero or more rows.
#[derive(Debug, Clone, Default)]
pub struct TabularUpdate {
    pub column_definitions: Vec<ColumnDefinition>,
    pub rows: Vec<TabularRow>,
}

const TABLE_API_VERSIONS: &[&str] = &["meta.k8s.io/v1", "meta.k8s.io/v1beta1"];

/// Decode a raw payload into a [`TabularUpdate`]. Fails with a decode error
/// when the payload is not a recognized Table kind or a metadata field is
/// missing or mistyped, which typically indicates a server/version mismatch.
pub fn decode_table(payload: &Value) -> Result<TabularUpdate> {
    let api_version = payload
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let kind = payload.get("kind").and_then(Value::as_str).unwrap_or_default();
    if kind != "Table" || !TABLE_API_VERSIONS.contains(&api_version) {
        return Err(Error::Decode(format!(
            "attempt to decode non-Table object: {}/{}",
            api_version, kind
        )));
    }

    let column_definitions = match payload.get("columnDefinitions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(defs)) => defs
            .iter()
            .map(|def| {
                let name = def
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Decode("columnDefinitions[].name: want string".into()))?
                    .to_string();
                let priority = def.get("priority").and_then(Value::as_i64).unwrap_or(0);
                Ok(ColumnDefinition { name, priority })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Decode(format!(
                "columnDefinitions: want array, got {}",
                json_type(other)
            )))
        }
    };

    let rows = match payload.get("rows") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Decode(format!(
                "rows: want array, got {}",
                json_type(other)
            )))
        }
    };

    Ok(TabularUpdate {
        column_definitions,
        rows,
    })
}

fn decode_row(row: &Value) -> Result<TabularRow> {
    let cells = row
        .get("cells")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let metadata = row
        .get("object")
        .and_then(|o| o.get("metadata"))
        .and_then(Value::as_object)
        .ok_or_else(|| Error::Decode("metadata: want object".into()))?;

    let uid = metadata
        .get("uid")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::Decode(format!(
                "metadata.uid: want string, got {}",
                json_type(metadata.get("uid").unwrap_or(&Value::Null))
            ))
        })?
        .to_string();

    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let namespace = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .map(str::to_string);

    let creation_raw = metadata
        .get("creationTimestamp")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::Decode(format!(
                "metadata.creationTimestamp: want string, got {}",
                json_type(metadata.get("creationTimestamp").unwrap_or(&Value::Null))
            ))
        })?;
    let creation_timestamp = DateTime::parse_from_rfc3339(creation_raw)
        .map_err(|err| Error::Decode(format!("metadata.creationTimestamp: {}", err)))?
        .with_timezone(&Utc);

    let labels = metadata
        .get("labels")
        .and_then(Value::as_object)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(TabularRow {
        cells,
        uid,
        name,
        namespace,
        creation_timestamp,
        labels,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_payload() -> Value {
        json!({
            "apiVersion": "meta.k8s.io/v1",
            "kind": "Table",
            "columnDefinitions": [
                {"name": "Name", "type": "string", "priority": 0},
                {"name": "Status", "type": "string", "priority": 0},
                {"name": "Node", "type": "string", "priority": 1},
            ],
            "rows": [
                {
                    "cells": ["pod-1", "Running", "node-a"],
                    "object": {
                        "kind": "PartialObjectMetadata",
                        "metadata": {
                            "uid": "uid-1",
                            "name": "pod-1",
                            "namespace": "default",
                            "creationTimestamp": "2024-05-01T12:00:00Z",
                            "labels": {"app": "web"},
                        }
                    }
                }
            ]
        })
    }

    #[test]
    fn decodes_columns_and_rows() {
        let table = decode_table(&table_payload()).unwrap();
        assert_eq!(table.column_definitions.len(), 3);
        assert_eq!(table.column_definitions[2].priority, 1);

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.uid, "uid-1");
        assert_eq!(row.name, "pod-1");
        assert_eq!(row.namespace.as_deref(), Some("default"));
        assert_eq!(row.labels.get("app").map(String::as_str), Some("web"));
        assert_eq!(row.cells.len(), 3);
    }

    #[test]
    fn accepts_v1beta1_tables() {
        let mut payload = table_payload();
        payload["apiVersion"] = json!("meta.k8s.io/v1beta1");
        assert!(decode_table(&payload).is_ok());
    }

    #[test]
    fn rejects_non_table_objects() {
        let payload = json!({"apiVersion": "v1", "kind": "Pod"});
        let err = decode_table(&payload).unwrap_err();
        assert!(err.to_string().contains("non-Table"));
    }

    #[test]
    fn missing_uid_is_a_decode_error() {
        let mut payload = table_payload();
        payload["rows"][0]["object"]["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("uid");
        let err = decode_table(&payload).unwrap_err();
        assert!(err.to_string().contains("metadata.uid"));
    }

    #[test]
    fn bad_timestamp_is_a_decode_error() {
        let mut payload = table_payload();
        payload["rows"][0]["object"]["metadata"]["creationTimestamp"] = json!("yesterday");
        let err = decode_table(&payload).unwrap_err();
        assert!(err.to_string().contains("creationTimestamp"));
    }

    #[test]
    fn follow_up_events_may_omit_column_definitions() {
        let mut payload = table_payload();
        payload.as_object_mut().unwrap().remove("columnDefinitions");
        let table = decode_table(&payload).unwrap();
        assert!(table.column_definitions.is_empty());
        assert_eq!(table.rows.len(), 1);
    }
}
