use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::dev::Server;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{http, web, App, HttpRequest, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod handlers;
pub mod middleware;
pub mod models;
mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use crate::config::jwt::JwtSettings;
use crate::config::settings::Settings;
use crate::db::{
    AppointmentRepository, HealthProfileRepository, HealthRecordRepository, MemoryStore,
    PgAppointmentRepository, PgHealthProfileRepository, PgHealthRecordRepository,
    PgUserRepository, UserRepository,
};
use crate::errors::AppError;
use crate::routes::init_routes;
use crate::services::session::SessionError;
use crate::services::{
    AppointmentService, AssistantService, HealthRecordService, LlmClient, PlainTextExtractor,
    ProfileService, ReportBuilder, ReportService, SessionService, SnapshotService,
};

/// Upper bound on a whole multipart request; the file field has its own limit.
const MULTIPART_TOTAL_LIMIT: usize = 12 * 1024 * 1024;

/// One handle per persistence seam.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub records: Arc<dyn HealthRecordRepository>,
    pub profiles: Arc<dyn HealthProfileRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            records: Arc::new(PgHealthRecordRepository::new(pool.clone())),
            profiles: Arc::new(PgHealthProfileRepository::new(pool.clone())),
            appointments: Arc::new(PgAppointmentRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            records: store.clone(),
            profiles: store.clone(),
            appointments: store,
        }
    }
}

/// Everything the request handlers reach through `web::Data`.
pub struct AppServices {
    pub jwt_settings: Arc<JwtSettings>,
    pub sessions: Arc<SessionService>,
    pub records: Arc<HealthRecordService>,
    pub profiles: Arc<ProfileService>,
    pub reports: Arc<ReportService>,
    pub assistant: Arc<AssistantService>,
    pub appointments: Arc<AppointmentService>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        llm: Arc<dyn LlmClient>,
        jwt_settings: Arc<JwtSettings>,
        settings: &Settings,
    ) -> Result<Self, SessionError> {
        let llm_timeout = Duration::from_secs(settings.llm.timeout_seconds);
        let sessions = SessionService::new(
            repos.users.clone(),
            jwt_settings.clone(),
            settings.application.password_cost,
        )?;
        let reports = ReportService::new(
            ReportBuilder::new(llm.clone(), llm_timeout),
            SnapshotService::new(repos.records.clone()),
            repos.profiles.clone(),
        );
        let assistant = AssistantService::new(
            llm,
            Arc::new(PlainTextExtractor),
            settings.llm.system_prompt.clone(),
            settings.assistant.max_document_chars,
            llm_timeout,
        );

        Ok(Self {
            jwt_settings,
            sessions: Arc::new(sessions),
            records: Arc::new(HealthRecordService::new(repos.records)),
            profiles: Arc::new(ProfileService::new(repos.profiles)),
            reports: Arc::new(reports),
            assistant: Arc::new(assistant),
            appointments: Arc::new(AppointmentService::new(repos.appointments)),
        })
    }
}

// Extractor failures answer with the same JSON body as every other 400.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid JSON body: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid query string: {}", err)).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid path: {}", err)).into()
}

fn multipart_error_handler(
    err: actix_multipart::MultipartError,
    _req: &HttpRequest,
) -> actix_web::Error {
    AppError::validation(format!("Invalid upload: {}", err)).into()
}

pub fn run(
    listener: TcpListener,
    services: AppServices,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    // web::Data is an Arc, so these share the service instances built above
    let jwt_settings = web::Data::from(services.jwt_settings);
    let sessions = web::Data::from(services.sessions);
    let records = web::Data::from(services.records);
    let profiles = web::Data::from(services.profiles);
    let reports = web::Data::from(services.reports);
    let assistant = web::Data::from(services.assistant);
    let appointments = web::Data::from(services.appointments);

    let server = HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(MULTIPART_TOTAL_LIMIT)
                    .error_handler(multipart_error_handler),
            )
            .app_data(jwt_settings.clone())
            .app_data(sessions.clone())
            .app_data(records.clone())
            .app_data(profiles.clone())
            .app_data(reports.clone())
            .app_data(assistant.clone())
            .app_data(appointments.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
