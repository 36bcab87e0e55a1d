use crate::domain::{HealthPrediction, PredictionRequest};
use crate::repository::{HealthLogRepository, PredictionRepository, UserProfileRepository};
use crate::Result;
use std::sync::Arc;

/// Logs sent along with the profile
const RECENT_LOG_LIMIT: usize = 50;

pub struct GetHealthPredictionUseCase {
    pub(crate) predictions: Arc<dyn PredictionRepository>,
    pub(crate) profiles: Arc<dyn UserProfileRepository>,
    pub(crate) logs: Arc<dyn HealthLogRepository>,
}

impl GetHealthPredictionUseCase {
    pub fn new(
        predictions: Arc<dyn PredictionRepository>,
        profiles: Arc<dyn UserProfileRepository>,
        logs: Arc<dyn HealthLogRepository>,
    ) -> Self {
        Self {
            predictions,
            profiles,
            logs,
        }
    }

    pub async fn execute(&self, user_id: &str) -> Result<HealthPrediction> {
        let profile = self.profiles.get_profile(user_id).await?;
        let mut logs = self.logs.list_logs(user_id, None).await?;
        logs.sort_by(|a, b| b.logged_at().cmp(&a.logged_at()));
        logs.truncate(RECENT_LOG_LIMIT);

        let request = PredictionRequest::new(&profile, &logs);
        tracing::info!(
            "Requesting prediction for {} with {} recent logs",
            user_id,
            request.recent_logs.len()
        );
        self.predictions.predict(&request).await
    }
}
