use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{HealthRecordRepository, StoreError};
use crate::models::health_record::{HealthRecord, MetricValue, RecordFilter, RecordKind};
use crate::models::snapshot::{HealthSnapshot, LatestReading, MetricSummary};
use crate::utils::health_calculations::{
    average, classify, health_score, recommendation, MetricStatus,
};

/// Readings kept per metric in the snapshot history.
const HISTORY_LEN: usize = 10;

fn summarize(kind: &RecordKind, records: &[&HealthRecord]) -> Option<MetricSummary> {
    let latest = records.first()?;

    let mut parsed = Vec::with_capacity(records.len());
    for record in records {
        match record.metric_value() {
            Ok(value) => parsed.push(value),
            Err(e) => tracing::debug!(record_id = %record.id, "Skipping unreadable value: {}", e),
        }
    }

    let status = latest
        .metric_value()
        .map(|value| classify(kind, &value))
        .unwrap_or(MetricStatus::Unknown);

    Some(MetricSummary {
        current: latest.value.clone(),
        unit: kind.unit().to_string(),
        date: latest.date,
        status,
        recommendation: recommendation(kind, status).to_string(),
        average: average(&parsed),
        history: parsed.iter().take(HISTORY_LEN).cloned().collect(),
        readings: records.len(),
    })
}

fn scalar(summary: &Option<MetricSummary>) -> Option<f64> {
    match summary.as_ref()?.average {
        Some(MetricValue::Scalar(v)) => Some(v),
        _ => None,
    }
}

fn pressure(summary: &Option<MetricSummary>) -> Option<(f64, f64)> {
    match summary.as_ref()?.average {
        Some(MetricValue::BloodPressure { systolic, diastolic }) => Some((systolic, diastolic)),
        _ => None,
    }
}

/// Builds the most-recent-per-type view. `records` must be ordered most
/// recent first, as returned by the record store.
pub fn build_snapshot(owner_id: Uuid, records: &[HealthRecord]) -> HealthSnapshot {
    let mut by_kind: BTreeMap<String, Vec<&HealthRecord>> = BTreeMap::new();
    for record in records {
        by_kind.entry(record.kind.clone()).or_default().push(record);
    }

    let summary_for = |kind: RecordKind| {
        by_kind
            .get(kind.as_str())
            .and_then(|group| summarize(&kind, group))
    };
    let heart_rate = summary_for(RecordKind::HeartRate);
    let sleep_quality = summary_for(RecordKind::SleepQuality);
    let blood_oxygen = summary_for(RecordKind::BloodOxygen);
    let blood_pressure = summary_for(RecordKind::BloodPressure);

    let other = by_kind
        .iter()
        .filter(|(kind, _)| matches!(RecordKind::parse(kind), RecordKind::Other(_)))
        .filter_map(|(kind, group)| {
            group.first().map(|latest| {
                (
                    kind.clone(),
                    LatestReading { value: latest.value.clone(), date: latest.date },
                )
            })
        })
        .collect();

    let health_score = health_score(scalar(&heart_rate), pressure(&blood_pressure), scalar(&blood_oxygen));

    HealthSnapshot {
        owner_id,
        heart_rate,
        sleep_quality,
        blood_oxygen,
        blood_pressure,
        other,
        health_score,
        record_count: records.len(),
    }
}

pub struct SnapshotService {
    records: Arc<dyn HealthRecordRepository>,
}

impl SnapshotService {
    pub fn new(records: Arc<dyn HealthRecordRepository>) -> Self {
        Self { records }
    }

    pub async fn snapshot(&self, owner_id: Uuid) -> Result<HealthSnapshot, StoreError> {
        let records = self.records.list(owner_id, &RecordFilter::default()).await?;
        Ok(build_snapshot(owner_id, &records))
    }
}
