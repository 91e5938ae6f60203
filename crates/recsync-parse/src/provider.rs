//! ParseRecordStore - IRecordStore implementation for Parse Server
//!
//! Maps the record store port onto the `/classes/{class}` REST endpoints and
//! converts Parse objects into domain [`Record`]s.
//!
//! ## Design Notes
//!
//! - Records are schema-less strings in the domain. Values the store returns
//!   with other JSON types are rendered as text; Parse `Date` objects become
//!   their ISO string.
//! - `ACL` is store metadata and is not exposed as a field.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use recsync_core::domain::{ClassName, Fields, Record, RecordId};
use recsync_core::ports::IRecordStore;

use crate::client::ParseClient;
use crate::StoreError;

/// Parse fields that never become record fields
const METADATA_FIELDS: &[&str] = &["objectId", "createdAt", "updatedAt", "ACL"];

// ============================================================================
// Parse REST response types
// ============================================================================

/// Response of `GET /classes/{class}`
#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Map<String, Value>>,
}

/// Response of `POST /classes/{class}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    object_id: String,
    created_at: DateTime<Utc>,
}

/// Response of `PUT /classes/{class}/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    updated_at: DateTime<Utc>,
}

/// Renders a Parse JSON value as the string stored in a record field
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Object(map) => match (map.get("__type"), map.get("iso")) {
            (Some(Value::String(t)), Some(Value::String(iso))) if t == "Date" => iso.clone(),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

fn parse_timestamp(object: &Map<String, Value>, field: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(|e| StoreError::InvalidResponse(format!("{field} '{s}': {e}"))),
        Some(other) => Err(StoreError::InvalidResponse(format!(
            "{field} is not a string: {other}"
        ))),
    }
}

/// Converts a Parse object into a [`Record`]
///
/// # Errors
/// Returns an error if `objectId` is missing or a timestamp is malformed
pub fn object_to_record(object: Map<String, Value>) -> Result<Record, StoreError> {
    let id = match object.get("objectId") {
        Some(Value::String(id)) => RecordId::new(id.clone())
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?,
        _ => {
            return Err(StoreError::InvalidResponse(
                "object has no objectId".to_string(),
            ))
        }
    };
    let created_at = parse_timestamp(&object, "createdAt")?;
    let updated_at = parse_timestamp(&object, "updatedAt")?;

    let fields: Fields = object
        .iter()
        .filter(|(name, _)| !METADATA_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value_to_string(value)))
        .collect();

    Ok(Record::new(fields).with_identity(id, created_at, updated_at.or(created_at)))
}

// ============================================================================
// ParseRecordStore
// ============================================================================

/// Record store backed by a Parse Server
pub struct ParseRecordStore {
    client: ParseClient,
}

impl ParseRecordStore {
    /// Creates a new ParseRecordStore wrapping the given client
    ///
    /// The client should carry the session token of the logged-in operator.
    pub fn new(client: ParseClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &ParseClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRecordStore for ParseRecordStore {
    async fn query(
        &self,
        class_name: &ClassName,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>> {
        let path = format!("/classes/{}", class_name);
        debug!(class = %class_name, limit, offset, "Querying records");

        let response: QueryResponse = self
            .client
            .send_json(Method::GET, &path, |rb| {
                rb.query(&[("limit", limit), ("skip", offset)])
            })
            .await
            .with_context(|| format!("Failed to query {class_name} at offset {offset}"))?;

        response
            .results
            .into_iter()
            .map(object_to_record)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Malformed record in {class_name}"))
    }

    async fn save(&self, class_name: &ClassName, record: &Record) -> Result<Record> {
        let body = serde_json::to_value(record.fields()).context("Failed to serialize record")?;

        match record.id() {
            Some(id) => {
                let path = format!("/classes/{}/{}", class_name, id);
                debug!(class = %class_name, id = %id, "Updating record");

                let response: UpdateResponse = self
                    .client
                    .send_json(Method::PUT, &path, |rb| rb.json(&body))
                    .await
                    .with_context(|| format!("Failed to update {class_name}/{id}"))?;

                Ok(record.clone().with_identity(
                    id.clone(),
                    record.created_at(),
                    Some(response.updated_at),
                ))
            }
            None => {
                let path = format!("/classes/{}", class_name);
                debug!(class = %class_name, fields = record.fields().len(), "Creating record");

                let response: CreateResponse = self
                    .client
                    .send_json(Method::POST, &path, |rb| rb.json(&body))
                    .await
                    .with_context(|| format!("Failed to create record in {class_name}"))?;

                let id = RecordId::new(response.object_id)
                    .context("Store returned an invalid objectId")?;
                Ok(record.clone().with_identity(
                    id,
                    Some(response.created_at),
                    Some(response.created_at),
                ))
            }
        }
    }

    async fn delete(&self, class_name: &ClassName, id: &RecordId) -> Result<()> {
        let path = format!("/classes/{}/{}", class_name, id);
        debug!(class = %class_name, id = %id, "Deleting record");

        let _: Value = self
            .client
            .send_json(Method::DELETE, &path, |rb| rb)
            .await
            .with_context(|| format!("Failed to delete {class_name}/{id}"))?;

        Ok(())
    }
}
