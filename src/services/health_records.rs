use std::sync::Arc;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{HealthRecordRepository, StoreError};
use crate::errors::AppError;
use crate::models::common::non_empty;
use crate::models::health_record::{
    CreateHealthRecordRequest, HealthRecord, HealthRecordQuery, NewHealthRecord,
    PatchHealthRecordRequest, RecordChanges, RecordFilter, ReplaceHealthRecordRequest,
};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Health record not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RecordError> for AppError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(message) => AppError::validation(message),
            RecordError::NoFieldsToUpdate => AppError::BadRequest {
                reason: "no_fields_to_update",
                message: RecordError::NoFieldsToUpdate.to_string(),
            },
            RecordError::NotFound => AppError::NotFound(RecordError::NotFound.to_string()),
            RecordError::Store(e) => AppError::Store(e),
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; only the calendar
/// date is kept.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, RecordError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
        .map_err(|_| RecordError::Validation(format!("{} must be a date in YYYY-MM-DD format", field)))
}

/// Values are stored as text. Strings and numbers are accepted as-is;
/// per-kind validation happens when the value is read back.
pub fn value_to_text(value: &Value) -> Result<String, RecordError> {
    match value {
        Value::String(s) => non_empty(Some(s.as_str()))
            .ok_or_else(|| RecordError::Validation("value cannot be empty".to_string())),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RecordError::Validation("value must be a string or a number".to_string())),
    }
}

fn parse_kind(raw: &str) -> Result<String, RecordError> {
    non_empty(Some(raw)).ok_or_else(|| RecordError::Validation("type cannot be empty".to_string()))
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

pub struct HealthRecordService {
    records: Arc<dyn HealthRecordRepository>,
}

impl HealthRecordService {
    pub fn new(records: Arc<dyn HealthRecordRepository>) -> Self {
        Self { records }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateHealthRecordRequest,
    ) -> Result<HealthRecord, RecordError> {
        let (date, kind, value) = match (&request.date, &request.kind, &request.value) {
            (Some(date), Some(kind), Some(value)) if !value.is_null() => (date, kind, value),
            _ => {
                return Err(RecordError::Validation(
                    "Date, type, and value are required".to_string(),
                ))
            }
        };

        let record = NewHealthRecord {
            date: parse_date("date", date)?,
            kind: parse_kind(kind)?,
            value: value_to_text(value)?,
            note: non_empty(request.note.as_deref()),
        };
        let created = self.records.insert(owner_id, record).await?;
        tracing::info!(record_id = %created.id, kind = %created.kind, "Health record created");
        Ok(created)
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        query: &HealthRecordQuery,
    ) -> Result<Vec<HealthRecord>, RecordError> {
        let filter = RecordFilter {
            from: non_empty(query.from.as_deref())
                .map(|raw| parse_date("from", &raw))
                .transpose()?,
            to: non_empty(query.to.as_deref())
                .map(|raw| parse_date("to", &raw))
                .transpose()?,
            kind: non_empty(query.kind.as_deref()),
        };
        Ok(self.records.list(owner_id, &filter).await?)
    }

    pub async fn get_by_id(&self, owner_id: Uuid, id: &str) -> Result<HealthRecord, RecordError> {
        let id = parse_id(id).ok_or(RecordError::NotFound)?;
        self.records
            .get(owner_id, id)
            .await?
            .ok_or(RecordError::NotFound)
    }

    /// PUT semantics: absent and `null` fields are dropped, the rest
    /// overwrite. Nothing left to write is an error.
    pub async fn update_replace(
        &self,
        owner_id: Uuid,
        id: &str,
        request: ReplaceHealthRecordRequest,
    ) -> Result<HealthRecord, RecordError> {
        let id = parse_id(id).ok_or(RecordError::NotFound)?;

        let changes = RecordChanges {
            date: request.date.as_deref().map(|raw| parse_date("date", raw)).transpose()?,
            kind: request.kind.as_deref().map(parse_kind).transpose()?,
            value: match &request.value {
                Some(Value::Null) | None => None,
                Some(value) => Some(value_to_text(value)?),
            },
            note: request.note.map(|note| non_empty(Some(note.as_str()))),
        };
        if changes.is_empty() {
            return Err(RecordError::NoFieldsToUpdate);
        }

        self.records
            .update(owner_id, id, &changes)
            .await?
            .ok_or(RecordError::NotFound)
    }

    /// PATCH semantics: any subset of fields merges in, and an explicit
    /// `null` note clears the note.
    pub async fn update_patch(
        &self,
        owner_id: Uuid,
        id: &str,
        request: PatchHealthRecordRequest,
    ) -> Result<HealthRecord, RecordError> {
        let id = parse_id(id).ok_or(RecordError::NotFound)?;

        let changes = RecordChanges {
            date: match request.date {
                None => None,
                Some(None) => return Err(RecordError::Validation("date cannot be null".to_string())),
                Some(Some(raw)) => Some(parse_date("date", &raw)?),
            },
            kind: match request.kind {
                None => None,
                Some(None) => return Err(RecordError::Validation("type cannot be null".to_string())),
                Some(Some(raw)) => Some(parse_kind(&raw)?),
            },
            value: match request.value {
                None => None,
                Some(None) | Some(Some(Value::Null)) => {
                    return Err(RecordError::Validation("value cannot be null".to_string()))
                }
                Some(Some(value)) => Some(value_to_text(&value)?),
            },
            note: request.note.map(|note| non_empty(note.as_deref())),
        };

        let updated = if changes.is_empty() {
            self.records.get(owner_id, id).await?
        } else {
            self.records.update(owner_id, id, &changes).await?
        };
        updated.ok_or(RecordError::NotFound)
    }

    /// Idempotent: unknown, foreign and malformed ids are all no-ops.
    pub async fn remove(&self, owner_id: Uuid, id: &str) -> Result<(), RecordError> {
        let Some(id) = parse_id(id) else {
            return Ok(());
        };
        let removed = self.records.delete(owner_id, id).await?;
        tracing::debug!(record_id = %id, removed, "Health record delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::db::MemoryStore;

    fn service() -> HealthRecordService {
        HealthRecordService::new(Arc::new(MemoryStore::new()))
    }

    fn create_request(date: &str, kind: &str, value: Value) -> CreateHealthRecordRequest {
        CreateHealthRecordRequest {
            date: Some(date.to_string()),
            kind: Some(kind.to_string()),
            value: Some(value),
            note: None,
        }
    }

    #[test]
    fn dates_accept_plain_and_timestamp_forms() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date("date", "2024-01-01").unwrap(), day);
        assert_eq!(parse_date("date", "2024-01-01T08:30:00Z").unwrap(), day);
        assert!(parse_date("date", "01/01/2024").is_err());
    }

    #[test]
    fn numbers_and_strings_become_text() {
        assert_eq!(value_to_text(&json!(72)).unwrap(), "72");
        assert_eq!(value_to_text(&json!("120/80")).unwrap(), "120/80");
        assert!(value_to_text(&json!("  ")).is_err());
        assert!(value_to_text(&json!({"v": 1})).is_err());
    }

    #[tokio::test]
    async fn create_requires_date_type_and_value() {
        let owner = Uuid::new_v4();
        let missing = CreateHealthRecordRequest {
            date: Some("2024-01-01".to_string()),
            kind: Some("heart_rate".to_string()),
            value: None,
            note: None,
        };
        assert!(matches!(service().create(owner, missing).await, Err(RecordError::Validation(_))));
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "heart_rate", json!("72")))
            .await
            .unwrap();

        let fetched = service.get_by_id(owner, &created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn records_are_invisible_to_other_owners() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "heart_rate", json!(72)))
            .await
            .unwrap();

        let other = Uuid::new_v4();
        let result = service.get_by_id(other, &created.id.to_string()).await;
        assert!(matches!(result, Err(RecordError::NotFound)));
    }

    #[tokio::test]
    async fn replace_with_only_nulls_has_nothing_to_update() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "heart_rate", json!("72")))
            .await
            .unwrap();

        let request: ReplaceHealthRecordRequest =
            serde_json::from_value(json!({"date": null, "value": null})).unwrap();
        let result = service.update_replace(owner, &created.id.to_string(), request).await;
        assert!(matches!(result, Err(RecordError::NoFieldsToUpdate)));
    }

    #[tokio::test]
    async fn patch_merges_note_and_leaves_other_fields() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "blood_pressure", json!("120/80")))
            .await
            .unwrap();
        let id = created.id.to_string();

        let patch: PatchHealthRecordRequest = serde_json::from_value(json!({"note": "x"})).unwrap();
        let patched = service.update_patch(owner, &id, patch).await.unwrap();
        assert_eq!(patched.note.as_deref(), Some("x"));
        assert_eq!(patched.value, created.value);
        assert_eq!(patched.date, created.date);
        assert_eq!(patched.kind, created.kind);

        let clear: PatchHealthRecordRequest = serde_json::from_value(json!({"note": null})).unwrap();
        let cleared = service.update_patch(owner, &id, clear).await.unwrap();
        assert_eq!(cleared.note, None);
    }

    #[tokio::test]
    async fn patch_rejects_null_on_required_field() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "heart_rate", json!("72")))
            .await
            .unwrap();

        let patch: PatchHealthRecordRequest = serde_json::from_value(json!({"value": null})).unwrap();
        let result = service.update_patch(owner, &created.id.to_string(), patch).await;
        assert!(matches!(result, Err(RecordError::Validation(_))));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let service = service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, create_request("2024-01-01", "heart_rate", json!("72")))
            .await
            .unwrap();
        let id = created.id.to_string();

        service.remove(owner, &id).await.unwrap();
        service.remove(owner, &id).await.unwrap();
        service.remove(owner, "not-a-uuid").await.unwrap();
        assert!(matches!(service.get_by_id(owner, &id).await, Err(RecordError::NotFound)));
    }

    #[tokio::test]
    async fn list_applies_inclusive_range_and_type() {
        let service = service();
        let owner = Uuid::new_v4();
        for (date, kind) in [
            ("2024-01-01", "heart_rate"),
            ("2024-01-05", "heart_rate"),
            ("2024-01-05", "blood_oxygen"),
            ("2024-01-09", "heart_rate"),
        ] {
            service.create(owner, create_request(date, kind, json!("70"))).await.unwrap();
        }

        let query = HealthRecordQuery {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-01-05".to_string()),
            kind: Some("heart_rate".to_string()),
        };
        let records = service.list(owner, &query).await.unwrap();
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-01"]);
    }
}
