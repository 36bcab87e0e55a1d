//! Data-access traits the use-cases depend on.
//!
//! Production implementations talk to the remote API (see [`api`]); tests
//! substitute in-memory versions.

pub mod api;

use crate::domain::{HealthGoal, HealthLog, HealthPrediction, LogType, PredictionRequest, UserProfile};
use crate::Result;
use async_trait::async_trait;

pub use api::{
    ApiHealthGoalRepository, ApiHealthLogRepository, ApiPredictionRepository,
    ApiUserProfileRepository,
};

#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile>;
    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile>;
}

#[async_trait]
pub trait HealthGoalRepository: Send + Sync {
    async fn list_goals(&self, user_id: &str) -> Result<Vec<HealthGoal>>;
    async fn get_goal(&self, goal_id: &str) -> Result<HealthGoal>;
    async fn create_goal(&self, goal: &HealthGoal) -> Result<HealthGoal>;
    async fn update_goal(&self, goal: &HealthGoal) -> Result<HealthGoal>;
}

#[async_trait]
pub trait HealthLogRepository: Send + Sync {
    async fn list_logs(&self, user_id: &str, log_type: Option<LogType>) -> Result<Vec<HealthLog>>;
    async fn create_log(&self, log: &HealthLog) -> Result<HealthLog>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<HealthPrediction>;
}
