use std::sync::Arc;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{HealthProfileRepository, StoreError};
use crate::errors::AppError;
use crate::models::common::non_empty;
use crate::models::profile::{HealthProfile, ProfileUpdate, UpdateHealthProfileRequest};

const MAX_AGE: i64 = 150;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Health profile not found")]
    NotFound,

    #[error("Age must be a whole number between 0 and 150")]
    InvalidAge,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound => AppError::NotFound(ProfileError::NotFound.to_string()),
            ProfileError::InvalidAge => AppError::BadRequest {
                reason: "invalid_age",
                message: ProfileError::InvalidAge.to_string(),
            },
            ProfileError::Store(e) => AppError::Store(e),
        }
    }
}

/// Numbers and numeric strings become an integer age; `null` and blank
/// strings mean "not supplied".
pub fn coerce_age(raw: Option<&Value>) -> Result<Option<i32>, ProfileError> {
    let age = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => parse_whole(s.trim().parse::<f64>().ok())?,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(whole) => whole,
            None => parse_whole(n.as_f64())?,
        },
        Some(_) => return Err(ProfileError::InvalidAge),
    };

    if !(0..=MAX_AGE).contains(&age) {
        return Err(ProfileError::InvalidAge);
    }
    Ok(Some(age as i32))
}

fn parse_whole(value: Option<f64>) -> Result<i64, ProfileError> {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(ProfileError::InvalidAge),
    }
}

pub struct ProfileService {
    profiles: Arc<dyn HealthProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn HealthProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn get(&self, owner_id: Uuid) -> Result<HealthProfile, ProfileError> {
        self.profiles
            .get(owner_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Insert or coalescing merge. Blank strings never erase stored values.
    pub async fn upsert(
        &self,
        owner_id: Uuid,
        request: UpdateHealthProfileRequest,
    ) -> Result<HealthProfile, ProfileError> {
        let update = ProfileUpdate {
            height: non_empty(request.height.as_deref()),
            weight: non_empty(request.weight.as_deref()),
            gender: non_empty(request.gender.as_deref()),
            age: coerce_age(request.age.as_ref())?,
            family_history: request.family_history,
            allergen_history: request.allergen_history,
        };

        let profile = self.profiles.upsert(owner_id, &update).await?;
        tracing::info!(owner_id = %owner_id, "Health profile saved");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::db::MemoryStore;

    fn request(body: Value) -> UpdateHealthProfileRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn age_coercion_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_age(Some(&json!(42))).unwrap(), Some(42));
        assert_eq!(coerce_age(Some(&json!("42"))).unwrap(), Some(42));
        assert_eq!(coerce_age(Some(&json!(42.0))).unwrap(), Some(42));
        assert_eq!(coerce_age(Some(&json!(""))).unwrap(), None);
        assert_eq!(coerce_age(Some(&Value::Null)).unwrap(), None);
        assert_eq!(coerce_age(None).unwrap(), None);
    }

    #[test]
    fn age_coercion_rejects_garbage() {
        assert!(matches!(coerce_age(Some(&json!("forty"))), Err(ProfileError::InvalidAge)));
        assert!(matches!(coerce_age(Some(&json!(41.5))), Err(ProfileError::InvalidAge)));
        assert!(matches!(coerce_age(Some(&json!(-1))), Err(ProfileError::InvalidAge)));
        assert!(matches!(coerce_age(Some(&json!(true))), Err(ProfileError::InvalidAge)));
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let service = ProfileService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(service.get(Uuid::new_v4()).await, Err(ProfileError::NotFound)));
    }

    #[tokio::test]
    async fn blank_fields_coalesce_to_stored_values() {
        let service = ProfileService::new(Arc::new(MemoryStore::new()));
        let owner = Uuid::new_v4();

        service
            .upsert(owner, request(json!({"height": "180cm", "weight": "75kg", "age": 30})))
            .await
            .unwrap();
        let first = service.get(owner).await.unwrap();

        let merged = service
            .upsert(owner, request(json!({"height": "", "weight": "80kg", "age": ""})))
            .await
            .unwrap();

        assert_eq!(merged.height.as_deref(), Some("180cm"));
        assert_eq!(merged.weight.as_deref(), Some("80kg"));
        assert_eq!(merged.age, Some(30));
        assert_eq!(merged.id, first.id);
        assert!(merged.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn histories_replace_as_a_whole() {
        let service = ProfileService::new(Arc::new(MemoryStore::new()));
        let owner = Uuid::new_v4();

        let saved = service
            .upsert(owner, request(json!({"family_history": {"diabetes": true}})))
            .await
            .unwrap();
        let history = saved.family_history.map(|h| h.0).unwrap();
        assert!(history.diabetes);
        assert!(!history.cancer);
    }
}
