use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::{HealthRecordRepository, StoreError};
use crate::models::health_record::{HealthRecord, NewHealthRecord, RecordChanges, RecordFilter};

const RECORD_COLUMNS: &str = "id, owner_id, date, type, value, note, created_at";

#[derive(Clone)]
pub struct PgHealthRecordRepository {
    pool: PgPool,
}

impl PgHealthRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRecordRepository for PgHealthRecordRepository {
    async fn insert(&self, owner_id: Uuid, record: NewHealthRecord) -> Result<HealthRecord, StoreError> {
        let inserted = sqlx::query_as::<_, HealthRecord>(
            r#"
            INSERT INTO health_records (id, owner_id, date, type, value, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, date, type, value, note, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(record.date)
        .bind(&record.kind)
        .bind(&record.value)
        .bind(&record.note)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert health record: {:?}", e);
            StoreError::from(e)
        })?;
        Ok(inserted)
    }

    async fn list(&self, owner_id: Uuid, filter: &RecordFilter) -> Result<Vec<HealthRecord>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(RECORD_COLUMNS);
        query.push(" FROM health_records WHERE owner_id = ");
        query.push_bind(owner_id);
        if let Some(from) = filter.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND date <= ").push_bind(to);
        }
        if let Some(kind) = &filter.kind {
            query.push(" AND type = ").push_bind(kind.clone());
        }
        query.push(" ORDER BY date DESC, created_at DESC");

        let records = query
            .build_query_as::<HealthRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<HealthRecord>, StoreError> {
        let record = sqlx::query_as::<_, HealthRecord>(
            r#"
            SELECT id, owner_id, date, type, value, note, created_at
            FROM health_records
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RecordChanges,
    ) -> Result<Option<HealthRecord>, StoreError> {
        if changes.is_empty() {
            return self.get(owner_id, id).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE health_records SET ");
        let mut columns = query.separated(", ");
        if let Some(date) = changes.date {
            columns.push("date = ").push_bind_unseparated(date);
        }
        if let Some(kind) = &changes.kind {
            columns.push("type = ").push_bind_unseparated(kind.clone());
        }
        if let Some(value) = &changes.value {
            columns.push("value = ").push_bind_unseparated(value.clone());
        }
        if let Some(note) = &changes.note {
            columns.push("note = ").push_bind_unseparated(note.clone());
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(" AND owner_id = ").push_bind(owner_id);
        query.push(" RETURNING ").push(RECORD_COLUMNS);

        let record = query
            .build_query_as::<HealthRecord>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM health_records WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
