//! Persistence seams. Every store is a trait object so services can be
//! wired against Postgres in production and the in-memory store in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::appointment::{Appointment, AppointmentChanges, Doctor, NewAppointment};
use crate::models::health_record::{HealthRecord, NewHealthRecord, RecordChanges, RecordFilter};
use crate::models::profile::{HealthProfile, ProfileUpdate};
use crate::models::user::{NewUser, User};

pub mod appointments;
pub mod health_profiles;
pub mod health_records;
pub mod memory;
pub mod users;

pub use appointments::PgAppointmentRepository;
pub use health_profiles::PgHealthProfileRepository;
pub use health_records::PgHealthRecordRepository;
pub use memory::MemoryStore;
pub use users::PgUserRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Owner-scoped health measurements. No method ever touches a row whose
/// `owner_id` differs from the one passed in.
#[async_trait]
pub trait HealthRecordRepository: Send + Sync {
    async fn insert(&self, owner_id: Uuid, record: NewHealthRecord) -> Result<HealthRecord, StoreError>;
    /// Ordered by date, most recent first.
    async fn list(&self, owner_id: Uuid, filter: &RecordFilter) -> Result<Vec<HealthRecord>, StoreError>;
    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<HealthRecord>, StoreError>;
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RecordChanges,
    ) -> Result<Option<HealthRecord>, StoreError>;
    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait HealthProfileRepository: Send + Sync {
    async fn get(&self, owner_id: Uuid) -> Result<Option<HealthProfile>, StoreError>;
    /// Atomic insert-or-coalesce. Refreshes `updated_at` on every call.
    async fn upsert(&self, owner_id: Uuid, update: &ProfileUpdate) -> Result<HealthProfile, StoreError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    /// Fails with `UniqueViolation` when an active appointment already holds
    /// the doctor's slot.
    async fn insert(&self, owner_id: Uuid, appointment: NewAppointment) -> Result<Appointment, StoreError>;
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &AppointmentChanges,
    ) -> Result<Option<Appointment>, StoreError>;
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError>;
}
