use std::fmt;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::models::common::explicit_null;

/// Kind of measurement a record holds. Unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    HeartRate,
    SleepQuality,
    BloodOxygen,
    BloodPressure,
    Other(String),
}

impl RecordKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "heart_rate" => RecordKind::HeartRate,
            "sleep_quality" => RecordKind::SleepQuality,
            "blood_oxygen" => RecordKind::BloodOxygen,
            "blood_pressure" => RecordKind::BloodPressure,
            other => RecordKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::HeartRate => "heart_rate",
            RecordKind::SleepQuality => "sleep_quality",
            RecordKind::BloodOxygen => "blood_oxygen",
            RecordKind::BloodPressure => "blood_pressure",
            RecordKind::Other(kind) => kind,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            RecordKind::HeartRate => "BPM",
            RecordKind::SleepQuality | RecordKind::BloodOxygen => "%",
            RecordKind::BloodPressure => "mmHg",
            RecordKind::Other(_) => "",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordKind::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub value: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HealthRecord {
    pub fn record_kind(&self) -> RecordKind {
        RecordKind::parse(&self.kind)
    }

    pub fn metric_value(&self) -> Result<MetricValue, ValueParseError> {
        MetricValue::parse(&self.record_kind(), &self.value)
    }
}

/// Typed view over the text stored in `HealthRecord::value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    BloodPressure { systolic: f64, diastolic: f64 },
    Text(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueParseError {
    #[error("'{raw}' is not a numeric {kind} value")]
    NotNumeric { kind: String, raw: String },
    #[error("'{0}' is not a systolic/diastolic blood pressure value")]
    NotBloodPressure(String),
}

impl MetricValue {
    pub fn parse(kind: &RecordKind, raw: &str) -> Result<Self, ValueParseError> {
        let trimmed = raw.trim();
        match kind {
            RecordKind::BloodPressure => {
                let (systolic, diastolic) = trimmed
                    .split_once('/')
                    .ok_or_else(|| ValueParseError::NotBloodPressure(raw.to_string()))?;
                let systolic = finite(systolic)
                    .ok_or_else(|| ValueParseError::NotBloodPressure(raw.to_string()))?;
                let diastolic = finite(diastolic)
                    .ok_or_else(|| ValueParseError::NotBloodPressure(raw.to_string()))?;
                Ok(MetricValue::BloodPressure { systolic, diastolic })
            }
            RecordKind::HeartRate | RecordKind::SleepQuality | RecordKind::BloodOxygen => {
                finite(trimmed.trim_end_matches('%'))
                    .map(MetricValue::Scalar)
                    .ok_or_else(|| ValueParseError::NotNumeric {
                        kind: kind.to_string(),
                        raw: raw.to_string(),
                    })
            }
            RecordKind::Other(_) => Ok(MetricValue::Text(raw.to_string())),
        }
    }
}

// "NaN" and "inf" parse as f64 but are not readings.
fn finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validated input for a new record.
#[derive(Debug, Clone)]
pub struct NewHealthRecord {
    pub date: NaiveDate,
    pub kind: String,
    pub value: String,
    pub note: Option<String>,
}

/// Column changes for an update. `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub date: Option<NaiveDate>,
    pub kind: Option<String>,
    pub value: Option<String>,
    pub note: Option<Option<String>>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.kind.is_none() && self.value.is_none() && self.note.is_none()
    }

    pub fn apply_to(&self, record: &mut HealthRecord) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(kind) = &self.kind {
            record.kind = kind.clone();
        }
        if let Some(value) = &self.value {
            record.value = value.clone();
        }
        if let Some(note) = &self.note {
            record.note = note.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &HealthRecord) -> bool {
        self.from.map_or(true, |from| record.date >= from)
            && self.to.map_or(true, |to| record.date <= to)
            && self.kind.as_deref().map_or(true, |kind| record.kind == kind)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHealthRecordRequest {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<serde_json::Value>,
    pub note: Option<String>,
}

/// PUT body: `null` and absent fields are both dropped.
#[derive(Debug, Deserialize)]
pub struct ReplaceHealthRecordRequest {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<serde_json::Value>,
    pub note: Option<String>,
}

/// PATCH body: an explicit `null` is kept so that `note` can be cleared.
#[derive(Debug, Default, Deserialize)]
pub struct PatchHealthRecordRequest {
    #[serde(default, deserialize_with = "explicit_null")]
    pub date: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "explicit_null")]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub value: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub note: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthRecordQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
