//! In-process store backing every repository trait. Used by the test suite
//! and handy for running the API without Postgres.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{
    AppointmentRepository, HealthProfileRepository, HealthRecordRepository, StoreError,
    UserRepository,
};
use crate::models::appointment::{
    Appointment, AppointmentChanges, AppointmentStatus, Doctor, NewAppointment,
};
use crate::models::health_record::{HealthRecord, NewHealthRecord, RecordChanges, RecordFilter};
use crate::models::profile::{HealthProfile, ProfileUpdate};
use crate::models::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    records: RwLock<HashMap<Uuid, HealthRecord>>,
    profiles: RwLock<HashMap<Uuid, HealthProfile>>,
    doctors: RwLock<Vec<Doctor>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctors(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: RwLock::new(doctors),
            ..Self::default()
        }
    }
}

fn holds_slot(existing: &Appointment, doctor_id: Uuid, candidate: &Appointment) -> bool {
    existing.id != candidate.id
        && existing.doctor_id == doctor_id
        && existing.appointment_date == candidate.appointment_date
        && existing.appointment_time == candidate.appointment_time
        && existing.status != AppointmentStatus::Cancelled.as_str()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("users_username_key".to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl HealthRecordRepository for MemoryStore {
    async fn insert(&self, owner_id: Uuid, record: NewHealthRecord) -> Result<HealthRecord, StoreError> {
        let created = HealthRecord {
            id: Uuid::new_v4(),
            owner_id,
            date: record.date,
            kind: record.kind,
            value: record.value,
            note: record.note,
            created_at: Utc::now(),
        };
        self.records.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self, owner_id: Uuid, filter: &RecordFilter) -> Result<Vec<HealthRecord>, StoreError> {
        let mut records: Vec<HealthRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id && filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(records)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<HealthRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RecordChanges,
    ) -> Result<Option<HealthRecord>, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&id).filter(|r| r.owner_id == owner_id) {
            Some(record) => {
                changes.apply_to(record);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let owned = records.get(&id).map_or(false, |r| r.owner_id == owner_id);
        if owned {
            records.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}

#[async_trait]
impl HealthProfileRepository for MemoryStore {
    async fn get(&self, owner_id: Uuid) -> Result<Option<HealthProfile>, StoreError> {
        Ok(self.profiles.read().await.get(&owner_id).cloned())
    }

    async fn upsert(&self, owner_id: Uuid, update: &ProfileUpdate) -> Result<HealthProfile, StoreError> {
        // Held for the whole merge, so two writers for one owner serialize
        let mut profiles = self.profiles.write().await;
        let now = Utc::now();
        let profile = profiles.entry(owner_id).or_insert_with(|| HealthProfile {
            id: Uuid::new_v4(),
            owner_id,
            height: None,
            weight: None,
            gender: None,
            age: None,
            family_history: None,
            allergen_history: None,
            created_at: now,
            updated_at: now,
        });
        update.merge_into(profile);
        profile.updated_at = now;
        Ok(profile.clone())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let mut doctors = self.doctors.read().await.clone();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(self.doctors.read().await.iter().find(|d| d.id == id).cloned())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let mut appointments: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| {
            a.appointment_date
                .cmp(&b.appointment_date)
                .then(a.appointment_time.cmp(&b.appointment_time))
        });
        Ok(appointments)
    }

    async fn insert(&self, owner_id: Uuid, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let doctor = self
            .get_doctor(appointment.doctor_id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;

        let mut appointments = self.appointments.write().await;
        let created = Appointment {
            id: Uuid::new_v4(),
            owner_id,
            doctor_id: doctor.id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: AppointmentStatus::Scheduled.to_string(),
            notes: appointment.notes,
            created_at: Utc::now(),
            doctor_name: doctor.name,
            doctor_specialty: doctor.specialty,
        };
        if appointments.values().any(|a| holds_slot(a, created.doctor_id, &created)) {
            return Err(StoreError::UniqueViolation("appointments_active_slot_idx".to_string()));
        }
        appointments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &AppointmentChanges,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut appointments = self.appointments.write().await;
        let mut updated = match appointments.get(&id).filter(|a| a.owner_id == owner_id) {
            Some(existing) => existing.clone(),
            None => return Ok(None),
        };
        if let Some(status) = changes.status {
            updated.status = status.to_string();
        }
        if let Some(notes) = &changes.notes {
            updated.notes = Some(notes.clone());
        }
        let reactivated_clash = updated.status != AppointmentStatus::Cancelled.as_str()
            && appointments.values().any(|a| holds_slot(a, updated.doctor_id, &updated));
        if reactivated_clash {
            return Err(StoreError::UniqueViolation("appointments_active_slot_idx".to_string()));
        }
        appointments.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let mut appointments = self.appointments.write().await;
        let owned = appointments.get(&id).map_or(false, |a| a.owner_id == owner_id);
        if owned {
            appointments.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
