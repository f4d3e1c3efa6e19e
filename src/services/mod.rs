pub mod appointments;
pub mod assistant;
pub mod health_profile;
pub mod health_records;
pub mod llm;
pub mod report;
pub mod session;
pub mod snapshot;

pub use appointments::AppointmentService;
pub use assistant::{AssistantService, DocumentExtractor, PlainTextExtractor};
pub use health_profile::ProfileService;
pub use health_records::HealthRecordService;
pub use llm::LlmClient;
pub use report::{ReportBuilder, ReportService};
pub use session::SessionService;
pub use snapshot::SnapshotService;
