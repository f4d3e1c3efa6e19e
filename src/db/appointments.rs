use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{AppointmentRepository, StoreError};
use crate::models::appointment::{Appointment, AppointmentChanges, Doctor, NewAppointment};

const APPOINTMENT_SELECT: &str = r#"
    SELECT a.id, a.owner_id, a.doctor_id, a.appointment_date, a.appointment_time,
           a.status, a.notes, a.created_at,
           d.name AS doctor_name, d.specialty AS doctor_specialty
    FROM appointments a
    JOIN doctors d ON a.doctor_id = d.id
"#;

#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let sql = format!("{} WHERE a.id = $1 AND a.owner_id = $2", APPOINTMENT_SELECT);
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(appointment)
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let doctors = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT id, name, specialty, phone, email, address, rating, experience_years
            FROM doctors
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(doctors)
    }

    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT id, name, specialty, phone, email, address, rating, experience_years
            FROM doctors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doctor)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let sql = format!(
            "{} WHERE a.owner_id = $1 ORDER BY a.appointment_date, a.appointment_time",
            APPOINTMENT_SELECT
        );
        let appointments = sqlx::query_as::<_, Appointment>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(appointments)
    }

    async fn insert(&self, owner_id: Uuid, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let id = Uuid::new_v4();
        // The partial unique index on active slots turns a double booking
        // into a unique violation
        sqlx::query(
            r#"
            INSERT INTO appointments
                (id, owner_id, doctor_id, appointment_date, appointment_time, status, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, 'scheduled', $6, $7)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(appointment.doctor_id)
        .bind(appointment.appointment_date)
        .bind(appointment.appointment_time)
        .bind(&appointment.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.fetch(owner_id, id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &AppointmentChanges,
    ) -> Result<Option<Appointment>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET status = COALESCE($1, status), notes = COALESCE($2, notes)
            WHERE id = $3 AND owner_id = $4
            "#,
        )
        .bind(changes.status.map(|s| s.as_str()))
        .bind(&changes.notes)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(owner_id, id).await
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
