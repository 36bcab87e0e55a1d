//! Health prediction request/response shapes for the AI backend.

use super::health_log::{HealthLog, HealthLogPayload};
use super::user_profile::{UserProfile, UserProfilePayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

string_enum_impls!(RiskLevel, "risk level", [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High]);

#[derive(Clone, Debug, Serialize)]
pub struct PredictionRequest {
    pub user_id: String,
    pub profile: UserProfilePayload,
    pub bmi: Option<f64>,
    pub recent_logs: Vec<HealthLogPayload>,
}

impl PredictionRequest {
    pub fn new(profile: &UserProfile, recent_logs: &[HealthLog]) -> Self {
        Self {
            user_id: profile.user_id().to_string(),
            profile: profile.to_api_request(),
            bmi: profile.bmi(),
            recent_logs: recent_logs.iter().map(HealthLog::to_api_request).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthPrediction {
    pub id: String,
    pub user_id: String,
    pub risk_level: RiskLevel,
    /// Model score in [0, 1]
    pub score: f64,
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
