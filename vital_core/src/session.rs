//! Authenticated session and app-lifecycle flags kept in secure storage.

use crate::keys::StorageKey;
use crate::storage::SecureStorage;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity provider that produced a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Email,
    Google,
    Apple,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// What any sign-in flow must hand over once it succeeds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
    pub provider: AuthProvider,
}

#[derive(Serialize, Deserialize)]
struct StoredUser {
    user: AuthUser,
    provider: AuthProvider,
}

pub struct SessionStore {
    storage: Arc<SecureStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<SecureStorage>) -> Self {
        Self { storage }
    }

    pub fn save_session(&self, session: &AuthSession) -> Result<()> {
        self.storage
            .set_string(StorageKey::AuthToken, &session.access_token)?;
        self.storage
            .set_string(StorageKey::RefreshToken, &session.refresh_token)?;
        self.storage.set_object(
            StorageKey::UserData,
            &StoredUser {
                user: session.user.clone(),
                provider: session.provider,
            },
        )?;
        tracing::info!("Saved session for user {}", session.user.id);
        Ok(())
    }

    /// The full session, if every part of it is present and readable
    pub fn session(&self) -> Option<AuthSession> {
        let access_token = self.access_token()?;
        let refresh_token = self.storage.get_string(StorageKey::RefreshToken)?;
        let stored: StoredUser = self.storage.get_object(StorageKey::UserData)?;
        Some(AuthSession {
            access_token,
            refresh_token,
            user: stored.user,
            provider: stored.provider,
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get_string(StorageKey::AuthToken)
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.storage
            .get_object::<StoredUser>(StorageKey::UserData)
            .map(|stored| stored.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn sign_out(&self) -> Result<()> {
        self.storage.remove(StorageKey::AuthToken)?;
        self.storage.remove(StorageKey::RefreshToken)?;
        self.storage.remove(StorageKey::UserData)?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn is_onboarding_completed(&self) -> bool {
        self.storage
            .get_bool(StorageKey::OnboardingCompleted)
            .unwrap_or(false)
    }

    pub fn complete_onboarding(&self) -> Result<()> {
        self.storage.set_bool(StorageKey::OnboardingCompleted, true)
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get_string(StorageKey::LastSyncTime)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable last sync time {:?}: {}", raw, e);
                None
            }
        }
    }

    pub fn record_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.storage
            .set_string(StorageKey::LastSyncTime, &at.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> AuthSession {
        AuthSession {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            user: AuthUser {
                id: "user_1".into(),
                email: "a@example.com".into(),
                display_name: None,
            },
            provider: AuthProvider::Apple,
        }
    }

    #[test]
    fn test_session_roundtrip_and_sign_out() {
        let store = SessionStore::new(Arc::new(SecureStorage::in_memory()));
        assert!(!store.is_signed_in());

        store.save_session(&sample_session()).unwrap();
        assert_eq!(store.session(), Some(sample_session()));
        assert_eq!(store.current_user().unwrap().id, "user_1");

        store.sign_out().unwrap();
        assert!(!store.is_signed_in());
        assert!(store.session().is_none());
    }

    #[test]
    fn test_corrupted_user_data_means_no_session() {
        let storage = Arc::new(SecureStorage::in_memory());
        let store = SessionStore::new(Arc::clone(&storage));
        store.save_session(&sample_session()).unwrap();
        storage.set_string(StorageKey::UserData, "not json").unwrap();

        assert!(store.session().is_none());
        assert!(store.current_user().is_none());
        assert_eq!(store.access_token().as_deref(), Some("access"));
    }

    #[test]
    fn test_onboarding_and_sync_flags() {
        let storage = Arc::new(SecureStorage::in_memory());
        let store = SessionStore::new(Arc::clone(&storage));
        assert!(!store.is_onboarding_completed());
        store.complete_onboarding().unwrap();
        assert!(store.is_onboarding_completed());

        let at = DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        store.record_sync(at).unwrap();
        assert_eq!(store.last_sync_time(), Some(at));

        storage.set_string(StorageKey::LastSyncTime, "garbage").unwrap();
        assert_eq!(store.last_sync_time(), None);
    }
}
