pub mod ai_assistant_handler;
pub mod appointment_handler;
pub mod auth_handler;
pub mod backend_health_handler;
pub mod health_data;
pub mod profile;
pub mod registration_handler;
pub mod report_handler;
