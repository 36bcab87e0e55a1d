//! In-memory repositories for use-case tests.

use crate::domain::{
    HealthGoal, HealthLog, HealthPrediction, LogType, PredictionRequest, RiskLevel, UserProfile,
};
use crate::repository::{
    HealthGoalRepository, HealthLogRepository, PredictionRepository, UserProfileRepository,
};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct InMemoryProfiles {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl InMemoryProfiles {
    pub(crate) fn with(profile: UserProfile) -> Self {
        let repo = Self::default();
        repo.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id().to_string(), profile);
        repo
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryProfiles {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("profile for {}", user_id)))
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id().to_string(), profile.clone());
        Ok(profile.clone())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryGoals {
    goals: Mutex<Vec<HealthGoal>>,
}

#[async_trait]
impl HealthGoalRepository for InMemoryGoals {
    async fn list_goals(&self, user_id: &str) -> Result<Vec<HealthGoal>> {
        Ok(self
            .goals
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn get_goal(&self, goal_id: &str) -> Result<HealthGoal> {
        self.goals
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id() == goal_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("goal {}", goal_id)))
    }

    async fn create_goal(&self, goal: &HealthGoal) -> Result<HealthGoal> {
        self.goals.lock().unwrap().push(goal.clone());
        Ok(goal.clone())
    }

    async fn update_goal(&self, goal: &HealthGoal) -> Result<HealthGoal> {
        let mut goals = self.goals.lock().unwrap();
        let slot = goals
            .iter_mut()
            .find(|g| g.id() == goal.id())
            .ok_or_else(|| Error::NotFound(format!("goal {}", goal.id())))?;
        *slot = goal.clone();
        Ok(goal.clone())
    }
}

/// Log store that can be told to reject one log id
#[derive(Default)]
pub(crate) struct InMemoryLogs {
    logs: Mutex<Vec<HealthLog>>,
    reject_id: Option<String>,
}

impl InMemoryLogs {
    pub(crate) fn failing_for(log_id: &str) -> Self {
        Self {
            reject_id: Some(log_id.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl HealthLogRepository for InMemoryLogs {
    async fn list_logs(&self, user_id: &str, log_type: Option<LogType>) -> Result<Vec<HealthLog>> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id() == user_id)
            .filter(|l| log_type.map_or(true, |t| l.log_type() == t))
            .cloned()
            .collect())
    }

    async fn create_log(&self, log: &HealthLog) -> Result<HealthLog> {
        if self.reject_id.as_deref() == Some(log.id()) {
            return Err(Error::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        self.logs.lock().unwrap().push(log.clone());
        Ok(log.clone())
    }
}

/// Answers every request with a fixed prediction and remembers the request
#[derive(Default)]
pub(crate) struct EchoPredictions {
    last: Mutex<Option<PredictionRequest>>,
}

impl EchoPredictions {
    pub(crate) fn last_request(&self) -> Option<PredictionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionRepository for EchoPredictions {
    async fn predict(&self, request: &PredictionRequest) -> Result<HealthPrediction> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(HealthPrediction {
            id: "pred_test".into(),
            user_id: request.user_id.clone(),
            risk_level: RiskLevel::Low,
            score: 0.1,
            summary: "ok".into(),
            recommendations: vec![],
            generated_at: Utc::now(),
        })
    }
}
