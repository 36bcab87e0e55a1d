//! Service identifiers and storage keys.
//!
//! Service keys name the entries of the [`Container`](crate::container::Container);
//! storage keys name the values persisted by [`SecureStorage`](crate::storage::SecureStorage).
//! Storage key strings are stable across releases.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Keys for everything the service registry wires into the container
pub mod service {
    // Infrastructure
    pub const SECURE_STORAGE: &str = "SecureStorage";
    pub const SESSION_STORE: &str = "SessionStore";
    pub const SETTINGS_STORE: &str = "SettingsStore";
    pub const THEME_STORE: &str = "ThemeStore";
    pub const OFFLINE_LOG_CACHE: &str = "OfflineLogCache";

    // Repositories
    pub const USER_PROFILE_REPOSITORY: &str = "UserProfileRepository";
    pub const HEALTH_GOAL_REPOSITORY: &str = "HealthGoalRepository";
    pub const HEALTH_LOG_REPOSITORY: &str = "HealthLogRepository";
    pub const PREDICTION_REPOSITORY: &str = "PredictionRepository";

    // Use-cases
    pub const GET_USER_PROFILE: &str = "GetUserProfileUseCase";
    pub const UPDATE_USER_PROFILE: &str = "UpdateUserProfileUseCase";
    pub const CREATE_HEALTH_GOAL: &str = "CreateHealthGoalUseCase";
    pub const GET_HEALTH_GOALS: &str = "GetHealthGoalsUseCase";
    pub const UPDATE_GOAL_PROGRESS: &str = "UpdateGoalProgressUseCase";
    pub const LOG_HEALTH_METRIC: &str = "LogHealthMetricUseCase";
    pub const GET_HEALTH_LOGS: &str = "GetHealthLogsUseCase";
    pub const SYNC_OFFLINE_LOGS: &str = "SyncOfflineLogsUseCase";
    pub const GET_HEALTH_PREDICTION: &str = "GetHealthPredictionUseCase";
}

/// Keys of values persisted in secure storage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthToken,
    RefreshToken,
    UserData,
    ThemeMode,
    AppSettings,
    HealthPreferences,
    LastSyncTime,
    OnboardingCompleted,
    CacheTimestamp,
    OfflineData,
}

impl StorageKey {
    pub const ALL: [StorageKey; 10] = [
        StorageKey::AuthToken,
        StorageKey::RefreshToken,
        StorageKey::UserData,
        StorageKey::ThemeMode,
        StorageKey::AppSettings,
        StorageKey::HealthPreferences,
        StorageKey::LastSyncTime,
        StorageKey::OnboardingCompleted,
        StorageKey::CacheTimestamp,
        StorageKey::OfflineData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthToken => "auth_token",
            StorageKey::RefreshToken => "refresh_token",
            StorageKey::UserData => "user_data",
            StorageKey::ThemeMode => "theme_mode",
            StorageKey::AppSettings => "app_settings",
            StorageKey::HealthPreferences => "health_preferences",
            StorageKey::LastSyncTime => "last_sync_time",
            StorageKey::OnboardingCompleted => "onboarding_completed",
            StorageKey::CacheTimestamp => "cache_timestamp",
            StorageKey::OfflineData => "offline_data",
        }
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StorageKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::InvalidValue(format!("unknown storage key: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_storage_keys_are_unique() {
        let names: HashSet<_> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), StorageKey::ALL.len());
    }

    #[test]
    fn test_storage_key_parse() {
        for key in StorageKey::ALL {
            assert_eq!(key.as_str().parse::<StorageKey>().unwrap(), key);
        }
        assert!("nope".parse::<StorageKey>().is_err());
    }
}
