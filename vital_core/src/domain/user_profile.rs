//! User profile entity with BMI derivation.

use super::ids::{generate_id, next_timestamp, parse_iso, to_iso};
use super::units::{HeightUnit, WeightUnit};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "profile";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

string_enum_impls!(
    Gender,
    "gender",
    [Gender::Male, Gender::Female, Gender::Other, Gender::PreferNotToSay]
);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

string_enum_impls!(
    ActivityLevel,
    "activity level",
    [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ]
);

/// BMI bands: <18.5, <25, <30, and above
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

string_enum_impls!(
    BmiCategory,
    "BMI category",
    [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ]
);

/// Body-mass index from height and weight in any supported unit, rounded
/// to one decimal. `None` unless both measurements are positive.
pub fn compute_bmi(height: f64, height_unit: HeightUnit, weight: f64, weight_unit: WeightUnit) -> Option<f64> {
    let height_m = height_unit.to_cm(height) / 100.0;
    let weight_kg = weight_unit.to_kg(weight);
    if !(height_m > 0.0 && weight_kg > 0.0) {
        return None;
    }
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 10.0).round() / 10.0)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// Attributes for a brand-new profile
#[derive(Clone, Debug)]
pub struct NewUserProfile {
    pub user_id: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub height_unit: HeightUnit,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub activity_level: ActivityLevel,
    pub health_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Fields to change in [`UserProfile::update_profile`]; `None` keeps the
/// current value. `emergency_contact: Some(None)` removes the contact.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<(f64, HeightUnit)>,
    pub weight: Option<(f64, WeightUnit)>,
    pub activity_level: Option<ActivityLevel>,
    pub health_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub emergency_contact: Option<Option<EmergencyContact>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    id: String,
    user_id: String,
    age: u32,
    gender: Gender,
    height: f64,
    height_unit: HeightUnit,
    weight: f64,
    weight_unit: WeightUnit,
    activity_level: ActivityLevel,
    health_conditions: Vec<String>,
    medications: Vec<String>,
    allergies: Vec<String>,
    emergency_contact: Option<EmergencyContact>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn create(new: NewUserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(ID_PREFIX),
            user_id: new.user_id,
            age: new.age,
            gender: new.gender,
            height: new.height,
            height_unit: new.height_unit,
            weight: new.weight,
            weight_unit: new.weight_unit,
            activity_level: new.activity_level,
            health_conditions: new.health_conditions,
            medications: new.medications,
            allergies: new.allergies,
            emergency_contact: new.emergency_contact,
            created_at: now,
            updated_at: now,
        }
    }

    /// A copy with `update` applied and `updated_at` refreshed
    ///
    /// `id`, `user_id` and `created_at` always carry over.
    pub fn update_profile(&self, update: ProfileUpdate) -> Self {
        let (height, height_unit) = update.height.unwrap_or((self.height, self.height_unit));
        let (weight, weight_unit) = update.weight.unwrap_or((self.weight, self.weight_unit));
        Self {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            age: update.age.unwrap_or(self.age),
            gender: update.gender.unwrap_or(self.gender),
            height,
            height_unit,
            weight,
            weight_unit,
            activity_level: update.activity_level.unwrap_or(self.activity_level),
            health_conditions: update
                .health_conditions
                .unwrap_or_else(|| self.health_conditions.clone()),
            medications: update.medications.unwrap_or_else(|| self.medications.clone()),
            allergies: update.allergies.unwrap_or_else(|| self.allergies.clone()),
            emergency_contact: update
                .emergency_contact
                .unwrap_or_else(|| self.emergency_contact.clone()),
            created_at: self.created_at,
            updated_at: next_timestamp(self.updated_at),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn height(&self) -> (f64, HeightUnit) {
        (self.height, self.height_unit)
    }

    pub fn weight(&self) -> (f64, WeightUnit) {
        (self.weight, self.weight_unit)
    }

    pub fn activity_level(&self) -> ActivityLevel {
        self.activity_level
    }

    pub fn health_conditions(&self) -> &[String] {
        &self.health_conditions
    }

    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    pub fn allergies(&self) -> &[String] {
        &self.allergies
    }

    pub fn emergency_contact(&self) -> Option<&EmergencyContact> {
        self.emergency_contact.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn height_in(&self, unit: HeightUnit) -> f64 {
        unit.from_cm(self.height_unit.to_cm(self.height))
    }

    pub fn weight_in(&self, unit: WeightUnit) -> f64 {
        unit.from_kg(self.weight_unit.to_kg(self.weight))
    }

    pub fn bmi(&self) -> Option<f64> {
        compute_bmi(self.height, self.height_unit, self.weight, self.weight_unit)
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }

    pub fn to_api_request(&self) -> UserProfilePayload {
        UserProfilePayload {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            age: self.age,
            gender: self.gender,
            height: self.height,
            height_unit: self.height_unit,
            weight: self.weight,
            weight_unit: self.weight_unit,
            activity_level: self.activity_level,
            health_conditions: self.health_conditions.clone(),
            medications: self.medications.clone(),
            allergies: self.allergies.clone(),
            emergency_contact: self.emergency_contact.clone(),
            created_at: to_iso(&self.created_at),
            updated_at: to_iso(&self.updated_at),
        }
    }
}

/// Wire shape of a profile (snake_case fields, ISO-8601 dates)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfilePayload {
    pub id: String,
    pub user_id: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub height_unit: HeightUnit,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserProfilePayload> for UserProfile {
    type Error = Error;

    fn try_from(payload: UserProfilePayload) -> Result<Self> {
        if payload.id.is_empty() {
            return Err(Error::InvalidValue("profile id must not be empty".into()));
        }
        Ok(UserProfile {
            created_at: parse_iso("created_at", &payload.created_at)?,
            updated_at: parse_iso("updated_at", &payload.updated_at)?,
            id: payload.id,
            user_id: payload.user_id,
            age: payload.age,
            gender: payload.gender,
            height: payload.height,
            height_unit: payload.height_unit,
            weight: payload.weight,
            weight_unit: payload.weight_unit,
            activity_level: payload.activity_level,
            health_conditions: payload.health_conditions,
            medications: payload.medications,
            allergies: payload.allergies,
            emergency_contact: payload.emergency_contact,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> UserProfile {
    UserProfile::create(NewUserProfile {
        user_id: "user_1".into(),
        age: 34,
        gender: Gender::Female,
        height: 170.0,
        height_unit: HeightUnit::Cm,
        weight: 70.0,
        weight_unit: WeightUnit::Kg,
        activity_level: ActivityLevel::Moderate,
        health_conditions: vec!["asthma".into()],
        medications: vec![],
        allergies: vec!["penicillin".into()],
        emergency_contact: Some(EmergencyContact {
            name: "Sam".into(),
            phone: "555-0100".into(),
            relationship: "sibling".into(),
        }),
    })
}
