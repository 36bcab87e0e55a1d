use crate::domain::{HealthGoal, NewHealthGoal};
use crate::repository::HealthGoalRepository;
use crate::Result;
use std::sync::Arc;

pub struct CreateHealthGoalUseCase {
    pub(crate) repository: Arc<dyn HealthGoalRepository>,
}

impl CreateHealthGoalUseCase {
    pub fn new(repository: Arc<dyn HealthGoalRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, new: NewHealthGoal) -> Result<HealthGoal> {
        let goal = HealthGoal::create(new)?;
        tracing::info!("Creating {} goal {}", goal.goal_type(), goal.id());
        self.repository.create_goal(&goal).await
    }
}

pub struct GetHealthGoalsUseCase {
    pub(crate) repository: Arc<dyn HealthGoalRepository>,
}

impl GetHealthGoalsUseCase {
    pub fn new(repository: Arc<dyn HealthGoalRepository>) -> Self {
        Self { repository }
    }

    /// All goals for `user_id`, active ones first
    pub async fn execute(&self, user_id: &str) -> Result<Vec<HealthGoal>> {
        let mut goals = self.repository.list_goals(user_id).await?;
        goals.sort_by_key(|goal| goal.is_completed());
        Ok(goals)
    }
}

pub struct UpdateGoalProgressUseCase {
    pub(crate) repository: Arc<dyn HealthGoalRepository>,
}

impl UpdateGoalProgressUseCase {
    pub fn new(repository: Arc<dyn HealthGoalRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, goal_id: &str, current_value: f64) -> Result<HealthGoal> {
        let goal = self.repository.get_goal(goal_id).await?;
        let updated = goal.update_progress(current_value);
        if updated.is_completed() && !goal.is_completed() {
            tracing::info!("Goal {} completed", goal_id);
        }
        self.repository.update_goal(&updated).await
    }
}
