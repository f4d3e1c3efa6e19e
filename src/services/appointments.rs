use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{AppointmentRepository, StoreError};
use crate::errors::AppError;
use crate::models::appointment::{
    Appointment, AppointmentChanges, AppointmentStatus, CreateAppointmentRequest, Doctor,
    NewAppointment, UpdateAppointmentRequest,
};
use crate::models::common::non_empty;

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("{0}")]
    Validation(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("This time slot is already booked")]
    SlotAlreadyBooked,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(_) => AppointmentError::SlotAlreadyBooked,
            other => AppointmentError::Store(other),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::Validation(message) => AppError::validation(message),
            AppointmentError::DoctorNotFound | AppointmentError::NotFound => {
                AppError::NotFound(e.to_string())
            }
            AppointmentError::SlotAlreadyBooked => AppError::Conflict {
                reason: "slot_already_booked",
                message: e.to_string(),
            },
            AppointmentError::Store(e) => AppError::Store(e),
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, AppointmentError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppointmentError::Validation("appointment_time must be HH:MM".to_string()))
}

fn parse_day(raw: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppointmentError::Validation("appointment_date must be YYYY-MM-DD".to_string()))
}

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl AppointmentService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, AppointmentError> {
        Ok(self.appointments.list_doctors().await?)
    }

    pub async fn get_doctor(&self, id: &str) -> Result<Doctor, AppointmentError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| AppointmentError::DoctorNotFound)?;
        self.appointments
            .get_doctor(id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.appointments.list_for_owner(owner_id).await?)
    }

    pub async fn book(
        &self,
        owner_id: Uuid,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (doctor_id, date, time) = match (
            request.doctor_id,
            non_empty(request.appointment_date.as_deref()),
            non_empty(request.appointment_time.as_deref()),
        ) {
            (Some(doctor_id), Some(date), Some(time)) => (doctor_id, date, time),
            _ => {
                return Err(AppointmentError::Validation(
                    "Doctor, date, and time are required".to_string(),
                ))
            }
        };

        let appointment = NewAppointment {
            doctor_id,
            appointment_date: parse_day(&date)?,
            appointment_time: parse_time(&time)?,
            notes: non_empty(request.notes.as_deref()),
        };

        if self.appointments.get_doctor(doctor_id).await?.is_none() {
            return Err(AppointmentError::DoctorNotFound);
        }

        let booked = self.appointments.insert(owner_id, appointment).await?;
        tracing::info!(appointment_id = %booked.id, doctor_id = %doctor_id, "Appointment booked");
        Ok(booked)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        id: &str,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| AppointmentError::NotFound)?;
        let status = non_empty(request.status.as_deref())
            .map(|raw| raw.parse::<AppointmentStatus>())
            .transpose()
            .map_err(AppointmentError::Validation)?;

        let changes = AppointmentChanges {
            status,
            notes: non_empty(request.notes.as_deref()),
        };
        self.appointments
            .update(owner_id, id, &changes)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn cancel(&self, owner_id: Uuid, id: &str) -> Result<(), AppointmentError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| AppointmentError::NotFound)?;
        match self.appointments.delete(owner_id, id).await? {
            0 => Err(AppointmentError::NotFound),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Sarah Johnson".to_string(),
            specialty: "Cardiology".to_string(),
            phone: None,
            email: None,
            address: None,
            rating: Some(4.8),
            experience_years: Some(15),
        }
    }

    fn booking(doctor_id: Uuid, time: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            doctor_id: Some(doctor_id),
            appointment_date: Some("2024-03-01".to_string()),
            appointment_time: Some(time.to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn double_booking_a_slot_conflicts_across_owners() {
        let doctor = doctor();
        let service = AppointmentService::new(Arc::new(MemoryStore::with_doctors(vec![doctor.clone()])));

        service.book(Uuid::new_v4(), booking(doctor.id, "10:00")).await.unwrap();
        let clash = service.book(Uuid::new_v4(), booking(doctor.id, "10:00")).await;
        assert!(matches!(clash, Err(AppointmentError::SlotAlreadyBooked)));
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_rebooked() {
        let doctor = doctor();
        let service = AppointmentService::new(Arc::new(MemoryStore::with_doctors(vec![doctor.clone()])));
        let owner = Uuid::new_v4();

        let first = service.book(owner, booking(doctor.id, "10:00")).await.unwrap();
        let cancel = UpdateAppointmentRequest { status: Some("cancelled".to_string()), notes: None };
        service.update(owner, &first.id.to_string(), cancel).await.unwrap();

        assert!(service.book(Uuid::new_v4(), booking(doctor.id, "10:00:00")).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_doctor_and_bad_status_are_rejected() {
        let service = AppointmentService::new(Arc::new(MemoryStore::new()));
        let result = service.book(Uuid::new_v4(), booking(Uuid::new_v4(), "10:00")).await;
        assert!(matches!(result, Err(AppointmentError::DoctorNotFound)));

        let bad = UpdateAppointmentRequest { status: Some("postponed".to_string()), notes: None };
        let result = service.update(Uuid::new_v4(), &Uuid::new_v4().to_string(), bad).await;
        assert!(matches!(result, Err(AppointmentError::Validation(_))));
    }

    #[tokio::test]
    async fn cancel_only_touches_own_appointments() {
        let doctor = doctor();
        let service = AppointmentService::new(Arc::new(MemoryStore::with_doctors(vec![doctor.clone()])));
        let owner = Uuid::new_v4();
        let booked = service.book(owner, booking(doctor.id, "11:30")).await.unwrap();

        let stranger = service.cancel(Uuid::new_v4(), &booked.id.to_string()).await;
        assert!(matches!(stranger, Err(AppointmentError::NotFound)));
        service.cancel(owner, &booked.id.to_string()).await.unwrap();
        assert!(service.list_for_owner(owner).await.unwrap().is_empty());
    }
}
