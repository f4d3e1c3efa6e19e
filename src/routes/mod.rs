use actix_web::web;

pub mod ai_assistant;
pub mod appointments;
pub mod auth;
pub mod backend_health;
pub mod health_data;
pub mod profile;
pub mod registration;
pub mod report;

use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(registration::register)
            .service(auth::login)
    );
    // Everything below requires a bearer token
    cfg.service(
        web::scope("/api/profile")
            .wrap(AuthMiddleware)
            .service(profile::get_user)
    );
    cfg.service(
        web::scope("/api/health-profile")
            .wrap(AuthMiddleware)
            .service(profile::get_health_prof)
            .service(profile::update_health_prof)
    );
    cfg.service(
        web::scope("/api/health-data")
            .wrap(AuthMiddleware)
            .service(health_data::list_records)
            .service(health_data::create_record)
            .service(health_data::get_record)
            .service(health_data::replace_record)
            .service(health_data::patch_record)
            .service(health_data::delete_record)
    );
    cfg.service(
        web::scope("/api/ai-assistant")
            .wrap(AuthMiddleware)
            .service(ai_assistant::assistant_chat)
            .service(ai_assistant::assistant_upload)
    );
    cfg.service(
        web::scope("/api/ai")
            .wrap(AuthMiddleware)
            .service(report::generate)
    );
    cfg.service(
        web::scope("/api/health-report")
            .wrap(AuthMiddleware)
            .service(report::report_data)
            .service(report::generate_for_owner)
    );
    cfg.service(
        web::scope("/api/doc-appointment")
            .wrap(AuthMiddleware)
            .service(appointments::doctors)
            .service(appointments::doctor)
            .service(appointments::my_appointments)
            .service(appointments::book)
            .service(appointments::update)
            .service(appointments::cancel)
    );
    cfg.service(
        web::scope("/api/health")
            .service(backend_health::backend_health)
    );
}
