//! Repository implementations backed by [`ApiClient`].

use super::{HealthGoalRepository, HealthLogRepository, PredictionRepository, UserProfileRepository};
use crate::api_client::ApiClient;
use crate::domain::{
    HealthGoal, HealthGoalPayload, HealthLog, HealthLogPayload, HealthPrediction, LogType,
    PredictionRequest, UserProfile, UserProfilePayload,
};
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Convert a list of wire payloads, skipping (and logging) malformed entries
fn convert_all<P, T>(payloads: Vec<P>, what: &str) -> Vec<T>
where
    T: TryFrom<P, Error = crate::Error>,
{
    payloads
        .into_iter()
        .filter_map(|payload| match T::try_from(payload) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping malformed {} from API: {}", what, e);
                None
            }
        })
        .collect()
}

pub struct ApiUserProfileRepository {
    client: ApiClient,
}

impl ApiUserProfileRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserProfileRepository for ApiUserProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        let payload: UserProfilePayload = self
            .client
            .get(&format!("users/{}/profile", user_id))
            .await?;
        UserProfile::try_from(payload)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        let payload: UserProfilePayload = self
            .client
            .put(
                &format!("users/{}/profile", profile.user_id()),
                &profile.to_api_request(),
            )
            .await?;
        UserProfile::try_from(payload)
    }
}

pub struct ApiHealthGoalRepository {
    client: ApiClient,
}

impl ApiHealthGoalRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthGoalRepository for ApiHealthGoalRepository {
    async fn list_goals(&self, user_id: &str) -> Result<Vec<HealthGoal>> {
        let payloads: Vec<HealthGoalPayload> = self
            .client
            .get(&format!("users/{}/goals", user_id))
            .await?;
        Ok(convert_all(payloads, "goal"))
    }

    async fn get_goal(&self, goal_id: &str) -> Result<HealthGoal> {
        let payload: HealthGoalPayload = self.client.get(&format!("goals/{}", goal_id)).await?;
        HealthGoal::try_from(payload)
    }

    async fn create_goal(&self, goal: &HealthGoal) -> Result<HealthGoal> {
        let payload: HealthGoalPayload = self.client.post("goals", &goal.to_api_request()).await?;
        HealthGoal::try_from(payload)
    }

    async fn update_goal(&self, goal: &HealthGoal) -> Result<HealthGoal> {
        let payload: HealthGoalPayload = self
            .client
            .put(&format!("goals/{}", goal.id()), &goal.to_api_request())
            .await?;
        HealthGoal::try_from(payload)
    }
}

#[derive(Serialize)]
struct LogQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    log_type: Option<LogType>,
}

pub struct ApiHealthLogRepository {
    client: ApiClient,
}

impl ApiHealthLogRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthLogRepository for ApiHealthLogRepository {
    async fn list_logs(&self, user_id: &str, log_type: Option<LogType>) -> Result<Vec<HealthLog>> {
        let payloads: Vec<HealthLogPayload> = self
            .client
            .get_with_query(&format!("users/{}/logs", user_id), &LogQuery { log_type })
            .await?;
        Ok(convert_all(payloads, "log"))
    }

    async fn create_log(&self, log: &HealthLog) -> Result<HealthLog> {
        let payload: HealthLogPayload = self.client.post("logs", &log.to_api_request()).await?;
        HealthLog::try_from(payload)
    }
}

pub struct ApiPredictionRepository {
    client: ApiClient,
}

impl ApiPredictionRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PredictionRepository for ApiPredictionRepository {
    async fn predict(&self, request: &PredictionRequest) -> Result<HealthPrediction> {
        self.client.post("predictions", request).await
    }
}
