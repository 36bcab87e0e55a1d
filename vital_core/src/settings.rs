//! Application settings persisted through secure storage.
//!
//! Settings are split into three groups (notifications, privacy, display).
//! Updates are partial: a patch names only the fields to change, and every
//! other field keeps its current value.

use crate::domain::UnitSystem;
use crate::keys::StorageKey;
use crate::storage::SecureStorage;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub goal_reminders: bool,
    pub log_reminders: bool,
    pub health_insights: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            goal_reminders: true,
            log_reminders: true,
            health_insights: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivacySettings {
    pub share_analytics: bool,
    pub share_crash_reports: bool,
    pub biometric_lock: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            share_analytics: true,
            share_crash_reports: true,
            biometric_lock: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplaySettings {
    pub unit_system: UnitSystem,
    pub language: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::Metric,
            language: "en".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub privacy: PrivacySettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationPatch {
    pub enabled: Option<bool>,
    pub goal_reminders: Option<bool>,
    pub log_reminders: Option<bool>,
    pub health_insights: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrivacyPatch {
    pub share_analytics: Option<bool>,
    pub share_crash_reports: Option<bool>,
    pub biometric_lock: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayPatch {
    pub unit_system: Option<UnitSystem>,
    pub language: Option<String>,
}

/// Partial update across groups. Merging goes one level deep: a group
/// patch changes only the fields it names inside that group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub notifications: Option<NotificationPatch>,
    pub privacy: Option<PrivacyPatch>,
    pub display: Option<DisplayPatch>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_none() && self.privacy.is_none() && self.display.is_none()
    }
}

impl NotificationSettings {
    fn merged(&self, patch: NotificationPatch) -> Self {
        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            goal_reminders: patch.goal_reminders.unwrap_or(self.goal_reminders),
            log_reminders: patch.log_reminders.unwrap_or(self.log_reminders),
            health_insights: patch.health_insights.unwrap_or(self.health_insights),
        }
    }
}

impl PrivacySettings {
    fn merged(&self, patch: PrivacyPatch) -> Self {
        Self {
            share_analytics: patch.share_analytics.unwrap_or(self.share_analytics),
            share_crash_reports: patch.share_crash_reports.unwrap_or(self.share_crash_reports),
            biometric_lock: patch.biometric_lock.unwrap_or(self.biometric_lock),
        }
    }
}

impl DisplaySettings {
    fn merged(&self, patch: DisplayPatch) -> Self {
        Self {
            unit_system: patch.unit_system.unwrap_or(self.unit_system),
            language: patch.language.unwrap_or_else(|| self.language.clone()),
        }
    }
}

impl AppSettings {
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        Self {
            notifications: match patch.notifications {
                Some(p) => self.notifications.merged(p),
                None => self.notifications.clone(),
            },
            privacy: match patch.privacy {
                Some(p) => self.privacy.merged(p),
                None => self.privacy.clone(),
            },
            display: match patch.display {
                Some(p) => self.display.merged(p),
                None => self.display.clone(),
            },
        }
    }
}

pub struct SettingsStore {
    storage: Arc<SecureStorage>,
}

impl SettingsStore {
    pub fn new(storage: Arc<SecureStorage>) -> Self {
        Self { storage }
    }

    /// Stored settings, or the defaults when nothing (readable) is stored
    pub fn get_settings(&self) -> AppSettings {
        self.storage
            .get_object::<AppSettings>(StorageKey::AppSettings)
            .unwrap_or_default()
    }

    /// Merge `patch` into the current settings and persist the full object
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        let updated = self
            .storage
            .update_object(StorageKey::AppSettings, |current: Option<AppSettings>| {
                current.unwrap_or_default().merged(patch)
            })?;
        tracing::debug!("Saved app settings");
        Ok(updated)
    }

    pub fn reset_settings(&self) -> Result<AppSettings> {
        self.storage.remove(StorageKey::AppSettings)?;
        tracing::info!("Reset app settings to defaults");
        Ok(AppSettings::default())
    }

    pub fn get_notification_settings(&self) -> NotificationSettings {
        self.get_settings().notifications
    }

    pub fn get_privacy_settings(&self) -> PrivacySettings {
        self.get_settings().privacy
    }

    pub fn get_display_settings(&self) -> DisplaySettings {
        self.get_settings().display
    }

    pub fn update_notification_settings(&self, patch: NotificationPatch) -> Result<NotificationSettings> {
        self.update_settings(SettingsPatch {
            notifications: Some(patch),
            ..Default::default()
        })
        .map(|settings| settings.notifications)
    }

    pub fn update_privacy_settings(&self, patch: PrivacyPatch) -> Result<PrivacySettings> {
        self.update_settings(SettingsPatch {
            privacy: Some(patch),
            ..Default::default()
        })
        .map(|settings| settings.privacy)
    }

    pub fn update_display_settings(&self, patch: DisplayPatch) -> Result<DisplaySettings> {
        self.update_settings(SettingsPatch {
            display: Some(patch),
            ..Default::default()
        })
        .map(|settings| settings.display)
    }
}
