use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::health_record::MetricValue;
use crate::utils::health_calculations::MetricStatus;

/// Derived view of one known metric, built from the most recent reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub current: String,
    pub unit: String,
    pub date: NaiveDate,
    pub status: MetricStatus,
    pub recommendation: String,
    pub average: Option<MetricValue>,
    pub history: Vec<MetricValue>,
    pub readings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub value: String,
    pub date: NaiveDate,
}

/// Most-recent-per-type aggregation of an owner's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub owner_id: Uuid,
    pub heart_rate: Option<MetricSummary>,
    pub sleep_quality: Option<MetricSummary>,
    pub blood_oxygen: Option<MetricSummary>,
    pub blood_pressure: Option<MetricSummary>,
    pub other: BTreeMap<String, LatestReading>,
    pub health_score: u8,
    pub record_count: usize,
}

impl HealthSnapshot {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
