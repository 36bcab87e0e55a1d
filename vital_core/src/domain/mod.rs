//! Immutable domain entities and their derived computations.
//!
//! Entities are created through named constructors that stamp identifiers
//! and timestamps. "Updates" return a new value; nothing is mutated in place.

/// `Display` + case-insensitive `FromStr` for enums exposing `as_str`
macro_rules! string_enum_impls {
    ($ty:ty, $what:literal, [$($variant:expr),+ $(,)?]) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                let lowered = s.trim().to_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == lowered)
                    .ok_or_else(|| crate::Error::InvalidValue(format!("unknown {}: {}", $what, s)))
            }
        }
    };
}

pub mod ids;
pub mod units;
pub mod user_profile;
pub mod health_goal;
pub mod health_log;
pub mod prediction;

pub use health_goal::{GoalStatus, GoalType, HealthGoal, HealthGoalPayload, NewHealthGoal};
pub use health_log::{HealthLog, HealthLogPayload, LogType, NewHealthLog};
pub use prediction::{HealthPrediction, PredictionRequest, RiskLevel};
pub use units::{HeightUnit, UnitSystem, WeightUnit};
pub use user_profile::{
    compute_bmi, ActivityLevel, BmiCategory, EmergencyContact, Gender, NewUserProfile, ProfileUpdate,
    UserProfile, UserProfilePayload,
};
