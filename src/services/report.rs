use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{HealthProfileRepository, StoreError};
use crate::errors::AppError;
use crate::models::llm::{ChatMessage, LlmError};
use crate::models::report::{GeneratedReport, HealthReport, ReportMetadata};
use crate::services::llm::LlmClient;
use crate::services::snapshot::SnapshotService;

pub const DISCLAIMER: &str = "This report is generated by AI for informational purposes only and \
    does not replace professional medical advice, diagnosis or treatment. Always consult a \
    qualified healthcare provider about any medical concern.";

const GENERATED_BY: &str = "MediMate AI Health Analyzer";

const REPORT_SYSTEM_PROMPT: &str = "You are a medical AI assistant that analyzes health data and \
    produces structured health reports. Respond with a single valid JSON object and nothing else.";

const OUTPUT_CONTRACT: &str = r#"{
  "patientSummary": {"overallHealthStatus": "string", "overallHealthScore": "number 0-100"},
  "vitalSigns": {
    "heartRate": {"value": "number", "status": "string", "analysis": "string"},
    "bloodPressure": {"systolic": "number", "diastolic": "number", "status": "string", "analysis": "string"},
    "temperature": {"value": "number", "status": "string", "analysis": "string"},
    "oxygenSaturation": {"value": "number", "status": "string", "analysis": "string"}
  },
  "healthMetrics": {"bmi": "object", "sleepPatterns": "object", "activityLevel": "object"},
  "riskAssessment": {"cardiovascularRisk": "string", "diabetesRisk": "string", "overallRisk": "string", "riskFactors": ["string"]},
  "recommendations": {"immediate": ["string"], "lifestyle": ["string"], "monitoring": ["string"], "followUp": ["string"]},
  "alerts": {"critical": ["string"], "warnings": ["string"], "notifications": ["string"]},
  "trends": {"improving": ["string"], "declining": ["string"], "stable": ["string"]}
}"#;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("AI response is not a valid report: {0}")]
    MalformedAiResponse(String),

    #[error("Report generation failed: {0}")]
    ReportGenerationFailed(#[source] LlmError),

    #[error("Failed to encode report input: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::MissingInput(_) => AppError::BadRequest {
                reason: "missing_input",
                message: e.to_string(),
            },
            ReportError::MalformedAiResponse(_) => AppError::Upstream {
                reason: "malformed_ai_response",
                message: "The AI service returned an unreadable report".to_string(),
                remote: false,
            },
            ReportError::ReportGenerationFailed(_) => AppError::Upstream {
                reason: "report_generation_failed",
                message: "The AI service could not generate a report".to_string(),
                remote: true,
            },
            ReportError::Encoding(e) => AppError::Internal(e.to_string()),
            ReportError::Store(e) => AppError::Store(e),
        }
    }
}

/// Lifecycle of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Building,
    Delivered,
    Failed,
}

impl BuildState {
    /// Idle -> Building -> {Delivered, Failed}. Terminal states never move.
    pub fn advance(self, next: BuildState) -> Option<BuildState> {
        match (self, next) {
            (BuildState::Idle, BuildState::Building)
            | (BuildState::Building, BuildState::Delivered)
            | (BuildState::Building, BuildState::Failed) => Some(next),
            _ => None,
        }
    }
}

struct Generation {
    id: Uuid,
    state: BuildState,
    started: Instant,
}

impl Generation {
    fn start() -> Self {
        let mut generation = Self { id: Uuid::new_v4(), state: BuildState::Idle, started: Instant::now() };
        generation.transition(BuildState::Building);
        generation
    }

    fn transition(&mut self, next: BuildState) {
        match self.state.advance(next) {
            Some(state) => {
                tracing::debug!(generation = %self.id, from = ?self.state, to = ?state, "Report state change");
                self.state = state;
            }
            None => tracing::warn!(generation = %self.id, from = ?self.state, to = ?next, "Ignored report transition"),
        }
    }

    fn fail(&mut self, error: ReportError) -> ReportError {
        self.transition(BuildState::Failed);
        tracing::error!(generation = %self.id, "Report generation failed: {}", error);
        error
    }
}

pub fn new_report_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("RPT-{}-{}", Utc::now().timestamp_millis(), suffix.to_uppercase())
}

pub fn build_prompt(health_data: &Value, patient_info: &Value) -> Result<String, ReportError> {
    Ok(format!(
        "Analyze the following health data and generate a comprehensive health report.\n\n\
         Patient Information:\n{}\n\n\
         Health Data:\n{}\n\n\
         Respond with a JSON object using exactly this structure:\n{}\n\n\
         Base every statement on the data provided. Do not include a report id, a timestamp \
         or a disclaimer.",
        serde_json::to_string_pretty(patient_info)?,
        serde_json::to_string_pretty(health_data)?,
        OUTPUT_CONTRACT,
    ))
}

/// Strict parse: either every contract section is present or the whole
/// response is rejected. A surrounding ```json fence is tolerated.
pub fn parse_report(raw: &str) -> Result<HealthReport, ReportError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<HealthReport>(body.trim())
        .map_err(|e| ReportError::MalformedAiResponse(e.to_string()))
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

pub struct ReportBuilder {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl ReportBuilder {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    #[tracing::instrument(name = "Generate health report", skip_all)]
    pub async fn generate(
        &self,
        health_data: Option<Value>,
        patient_info: Option<Value>,
    ) -> Result<GeneratedReport, ReportError> {
        // Both checks run before anything is sent upstream
        let health_data = present(health_data).ok_or(ReportError::MissingInput("healthData"))?;
        let patient_info = present(patient_info).ok_or(ReportError::MissingInput("patientInfo"))?;

        let mut generation = Generation::start();
        let prompt = build_prompt(&health_data, &patient_info).map_err(|e| generation.fail(e))?;
        let messages = [ChatMessage::system(REPORT_SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let raw = match tokio::time::timeout(self.timeout, self.llm.complete(&messages)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(generation.fail(ReportError::ReportGenerationFailed(e))),
            Err(_elapsed) => {
                return Err(generation.fail(ReportError::ReportGenerationFailed(LlmError::Timeout)))
            }
        };

        let mut report = parse_report(&raw).map_err(|e| generation.fail(e))?;
        report.report_id = new_report_id();
        report.generated_at = Utc::now();
        report.disclaimer = DISCLAIMER.to_string();

        generation.transition(BuildState::Delivered);
        let processing_time_ms = generation.started.elapsed().as_millis() as u64;
        tracing::info!(report_id = %report.report_id, processing_time_ms, "Health report delivered");

        Ok(GeneratedReport {
            success: true,
            report,
            metadata: ReportMetadata {
                model: self.llm.model_name().to_string(),
                processing_time_ms,
                generated_by: GENERATED_BY.to_string(),
            },
        })
    }
}

/// Report for the authenticated owner, built from their stored records
/// and profile instead of caller-supplied snapshots.
pub struct ReportService {
    builder: ReportBuilder,
    snapshots: SnapshotService,
    profiles: Arc<dyn HealthProfileRepository>,
}

impl ReportService {
    pub fn new(
        builder: ReportBuilder,
        snapshots: SnapshotService,
        profiles: Arc<dyn HealthProfileRepository>,
    ) -> Self {
        Self { builder, snapshots, profiles }
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    pub fn snapshots(&self) -> &SnapshotService {
        &self.snapshots
    }

    pub async fn generate_for_owner(&self, owner_id: Uuid) -> Result<GeneratedReport, ReportError> {
        let snapshot = self.snapshots.snapshot(owner_id).await?;
        let health_data = if snapshot.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&snapshot)?)
        };

        let patient_info = match self.profiles.get(owner_id).await? {
            Some(profile) => Some(serde_json::to_value(&profile)?),
            None => None,
        };

        self.builder.generate(health_data, patient_info).await
    }
}
