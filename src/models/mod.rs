pub mod appointment;
pub mod assistant;
pub mod auth;
pub mod common;
pub mod health_record;
pub mod llm;
pub mod profile;
pub mod report;
pub mod snapshot;
pub mod user;
