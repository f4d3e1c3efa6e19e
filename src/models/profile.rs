use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyHistory {
    pub heart_disease: bool,
    pub diabetes: bool,
    pub cancer: bool,
    pub high_blood_pressure: bool,
    pub other: bool,
    pub other_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllergenHistory {
    pub pollen: bool,
    pub dust: bool,
    pub food: bool,
    pub medication: bool,
    pub other: bool,
    pub other_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HealthProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub family_history: Option<Json<FamilyHistory>>,
    pub allergen_history: Option<Json<AllergenHistory>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalised profile write. `None` means "keep what is stored".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub height: Option<String>,
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub family_history: Option<FamilyHistory>,
    pub allergen_history: Option<AllergenHistory>,
}

impl ProfileUpdate {
    /// Field-by-field coalesce onto an existing profile.
    pub fn merge_into(&self, profile: &mut HealthProfile) {
        if let Some(height) = &self.height {
            profile.height = Some(height.clone());
        }
        if let Some(weight) = &self.weight {
            profile.weight = Some(weight.clone());
        }
        if let Some(gender) = &self.gender {
            profile.gender = Some(gender.clone());
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(history) = &self.family_history {
            profile.family_history = Some(Json(history.clone()));
        }
        if let Some(history) = &self.allergen_history {
            profile.allergen_history = Some(Json(history.clone()));
        }
    }
}

/// Raw PUT body. `age` is untyped because clients send numbers, numeric
/// strings and empty strings interchangeably.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHealthProfileRequest {
    pub height: Option<String>,
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub age: Option<serde_json::Value>,
    pub family_history: Option<FamilyHistory>,
    pub allergen_history: Option<AllergenHistory>,
}
