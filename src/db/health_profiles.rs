use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{HealthProfileRepository, StoreError};
use crate::models::profile::{HealthProfile, ProfileUpdate};

#[derive(Clone)]
pub struct PgHealthProfileRepository {
    pool: PgPool,
}

impl PgHealthProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProfileRepository for PgHealthProfileRepository {
    async fn get(&self, owner_id: Uuid) -> Result<Option<HealthProfile>, StoreError> {
        let profile = sqlx::query_as::<_, HealthProfile>(
            r#"
            SELECT id, owner_id, height, weight, gender, age,
                   family_history, allergen_history, created_at, updated_at
            FROM health_profiles
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert(&self, owner_id: Uuid, update: &ProfileUpdate) -> Result<HealthProfile, StoreError> {
        // Single statement: concurrent writers for one owner cannot lose updates
        let profile = sqlx::query_as::<_, HealthProfile>(
            r#"
            INSERT INTO health_profiles
                (id, owner_id, height, weight, gender, age, family_history, allergen_history,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ON CONFLICT (owner_id)
            DO UPDATE SET
                height           = COALESCE(EXCLUDED.height, health_profiles.height),
                weight           = COALESCE(EXCLUDED.weight, health_profiles.weight),
                gender           = COALESCE(EXCLUDED.gender, health_profiles.gender),
                age              = COALESCE(EXCLUDED.age, health_profiles.age),
                family_history   = COALESCE(EXCLUDED.family_history, health_profiles.family_history),
                allergen_history = COALESCE(EXCLUDED.allergen_history, health_profiles.allergen_history),
                updated_at       = NOW()
            RETURNING id, owner_id, height, weight, gender, age,
                      family_history, allergen_history, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&update.height)
        .bind(&update.weight)
        .bind(&update.gender)
        .bind(update.age)
        .bind(update.family_history.clone().map(Json))
        .bind(update.allergen_history.clone().map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Database error updating health profile: {:?}", e);
            StoreError::from(e)
        })?;
        Ok(profile)
    }
}
