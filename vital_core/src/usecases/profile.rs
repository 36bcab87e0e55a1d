use crate::domain::{ProfileUpdate, UserProfile};
use crate::repository::UserProfileRepository;
use crate::Result;
use std::sync::Arc;

pub struct GetUserProfileUseCase {
    pub(crate) repository: Arc<dyn UserProfileRepository>,
}

impl GetUserProfileUseCase {
    pub fn new(repository: Arc<dyn UserProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, user_id: &str) -> Result<UserProfile> {
        self.repository.get_profile(user_id).await
    }
}

pub struct UpdateUserProfileUseCase {
    pub(crate) repository: Arc<dyn UserProfileRepository>,
}

impl UpdateUserProfileUseCase {
    pub fn new(repository: Arc<dyn UserProfileRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the profile, apply `update`, and save the new version
    pub async fn execute(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let current = self.repository.get_profile(user_id).await?;
        let updated = current.update_profile(update);
        tracing::info!("Updating profile {} for user {}", updated.id(), user_id);
        self.repository.save_profile(&updated).await
    }
}
