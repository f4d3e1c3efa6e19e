pub mod health_profile;
pub mod profile;
