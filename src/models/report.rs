use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::common::non_null;

/// Structured report returned by the reasoning collaborator.
///
/// `report_id`, `generated_at` and `disclaimer` are never read from the
/// collaborator's output; the builder assigns them after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    #[serde(default, skip_deserializing)]
    pub report_id: String,
    #[serde(default, skip_deserializing)]
    pub generated_at: DateTime<Utc>,
    pub patient_summary: PatientSummary,
    pub vital_signs: VitalSigns,
    pub health_metrics: HealthMetrics,
    pub risk_assessment: RiskAssessment,
    pub recommendations: Recommendations,
    pub alerts: Alerts,
    pub trends: Trends,
    #[serde(default, skip_deserializing)]
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub overall_health_status: String,
    #[serde(deserialize_with = "non_null")]
    pub overall_health_score: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub heart_rate: VitalReading,
    pub blood_pressure: BloodPressureReading,
    pub temperature: VitalReading,
    pub oxygen_saturation: VitalReading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    #[serde(deserialize_with = "non_null")]
    pub value: Value,
    pub status: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    #[serde(deserialize_with = "non_null")]
    pub systolic: Value,
    #[serde(deserialize_with = "non_null")]
    pub diastolic: Value,
    pub status: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    #[serde(deserialize_with = "non_null")]
    pub bmi: Value,
    #[serde(deserialize_with = "non_null")]
    pub sleep_patterns: Value,
    #[serde(deserialize_with = "non_null")]
    pub activity_level: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    #[serde(deserialize_with = "non_null")]
    pub cardiovascular_risk: Value,
    #[serde(deserialize_with = "non_null")]
    pub diabetes_risk: Value,
    #[serde(deserialize_with = "non_null")]
    pub overall_risk: Value,
    pub risk_factors: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub immediate: Vec<Value>,
    pub lifestyle: Vec<Value>,
    pub monitoring: Vec<Value>,
    pub follow_up: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alerts {
    pub critical: Vec<Value>,
    pub warnings: Vec<Value>,
    pub notifications: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub improving: Vec<Value>,
    pub declining: Vec<Value>,
    pub stable: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub health_data: Option<Value>,
    #[serde(default)]
    pub patient_info: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub model: String,
    pub processing_time_ms: u64,
    pub generated_by: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub success: bool,
    pub report: HealthReport,
    pub metadata: ReportMetadata,
}
