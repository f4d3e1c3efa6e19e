pub mod get_health_data;
pub mod update_health_data;
pub mod upload_health_data;
