//! Theme state: a persisted user preference reconciled with the live
//! system appearance.
//!
//! [`reduce`] is the pure transition function. [`ThemeStore`] wraps it with
//! hydration from and persistence to secure storage, and publishes every new
//! state on a watch channel.

use crate::keys::StorageKey;
use crate::storage::SecureStorage;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Parse a stored mode string; anything unrecognised is `None`
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "system" => Some(ThemeMode::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        ThemeMode::from_stored(&s.trim().to_lowercase())
            .ok_or_else(|| crate::Error::InvalidValue(format!("unknown theme mode: {}", s)))
    }
}

/// What UI consumers read. Until `is_loading` is false, `is_dark` is not
/// meaningful.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub is_dark: bool,
    pub is_loading: bool,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            mode: ThemeMode::System,
            is_dark: false,
            is_loading: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeAction {
    /// Hydration finished with this mode
    Hydrated(ThemeMode),
    SetMode(ThemeMode),
    SystemChanged(bool),
    Toggle,
}

/// Next mode for a toggle; `System` counts as light
pub fn toggled_mode(mode: ThemeMode) -> ThemeMode {
    match mode {
        ThemeMode::Dark => ThemeMode::Light,
        ThemeMode::Light | ThemeMode::System => ThemeMode::Dark,
    }
}

fn explicit_dark(mode: ThemeMode) -> Option<bool> {
    match mode {
        ThemeMode::Light => Some(false),
        ThemeMode::Dark => Some(true),
        ThemeMode::System => None,
    }
}

pub fn reduce(state: ThemeState, action: ThemeAction) -> ThemeState {
    match action {
        ThemeAction::Hydrated(mode) => ThemeState {
            mode,
            is_dark: explicit_dark(mode).unwrap_or(state.is_dark),
            is_loading: false,
        },
        ThemeAction::SetMode(mode) => ThemeState {
            mode,
            is_dark: explicit_dark(mode).unwrap_or(state.is_dark),
            ..state
        },
        ThemeAction::SystemChanged(is_dark) => {
            if state.mode == ThemeMode::System {
                ThemeState { is_dark, ..state }
            } else {
                state
            }
        }
        ThemeAction::Toggle => {
            let mode = toggled_mode(state.mode);
            ThemeState {
                mode,
                is_dark: mode == ThemeMode::Dark,
                ..state
            }
        }
    }
}

pub struct ThemeStore {
    storage: Arc<SecureStorage>,
    state: watch::Sender<ThemeState>,
}

impl ThemeStore {
    pub fn new(storage: Arc<SecureStorage>) -> Self {
        let (state, _) = watch::channel(ThemeState::default());
        Self { storage, state }
    }

    pub fn state(&self) -> ThemeState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.subscribe()
    }

    /// Read the persisted mode and leave the loading state
    ///
    /// Missing or unrecognised values hydrate as `System`. Only the first
    /// call hydrates; later calls return the current state unchanged.
    pub fn load_theme_from_storage(&self) -> ThemeState {
        if !self.state().is_loading {
            return self.state();
        }
        let mode = match self.storage.get_string(StorageKey::ThemeMode) {
            Some(raw) => ThemeMode::from_stored(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring unknown stored theme mode {:?}", raw);
                ThemeMode::System
            }),
            None => ThemeMode::System,
        };
        tracing::debug!("Hydrated theme mode {}", mode);
        self.dispatch(ThemeAction::Hydrated(mode))
    }

    /// Select a mode and persist it
    ///
    /// The in-memory state changes even if persisting fails; the write
    /// error is still returned.
    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<ThemeState> {
        let state = self.dispatch(ThemeAction::SetMode(mode));
        self.persist(mode)?;
        Ok(state)
    }

    /// Live system appearance; only applies while the mode is `System`
    pub fn set_system_theme(&self, is_dark: bool) -> ThemeState {
        self.dispatch(ThemeAction::SystemChanged(is_dark))
    }

    /// Flip between light and dark and persist the chosen mode
    pub fn toggle_theme(&self) -> Result<ThemeState> {
        let state = self.dispatch(ThemeAction::Toggle);
        self.persist(state.mode)?;
        Ok(state)
    }

    fn dispatch(&self, action: ThemeAction) -> ThemeState {
        let mut next = ThemeState::default();
        self.state.send_if_modified(|state| {
            next = reduce(*state, action);
            let changed = next != *state;
            *state = next;
            changed
        });
        next
    }

    fn persist(&self, mode: ThemeMode) -> Result<()> {
        self.storage.set_string(StorageKey::ThemeMode, mode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<SecureStorage>, ThemeStore) {
        let storage = Arc::new(SecureStorage::in_memory());
        (Arc::clone(&storage), ThemeStore::new(storage))
    }

    #[test]
    fn test_initial_state() {
        let (_, store) = store();
        assert_eq!(
            store.state(),
            ThemeState {
                mode: ThemeMode::System,
                is_dark: false,
                is_loading: true
            }
        );
    }

    #[test]
    fn test_system_mode_lifecycle() {
        let (_, store) = store();

        let state = store.load_theme_from_storage();
        assert_eq!(state.mode, ThemeMode::System);
        assert!(!state.is_loading);

        assert!(store.set_system_theme(true).is_dark);

        let state = store.set_theme_mode(ThemeMode::Light).unwrap();
        assert!(!state.is_dark);

        // Explicit mode ignores the system signal
        assert!(!store.set_system_theme(true).is_dark);
    }

    #[test]
    fn test_hydrates_stored_mode() {
        let (storage, store) = store();
        storage.set_string(StorageKey::ThemeMode, "dark").unwrap();

        let state = store.load_theme_from_storage();
        assert_eq!(state.mode, ThemeMode::Dark);
        assert!(state.is_dark);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_unknown_stored_mode_falls_back_to_system() {
        let (storage, store) = store();
        storage.set_string(StorageKey::ThemeMode, "sepia").unwrap();

        assert_eq!(store.load_theme_from_storage().mode, ThemeMode::System);
    }

    #[test]
    fn test_hydration_happens_once() {
        let (storage, store) = store();
        store.load_theme_from_storage();
        store.set_theme_mode(ThemeMode::Dark).unwrap();
        storage.set_string(StorageKey::ThemeMode, "light").unwrap();

        let state = store.load_theme_from_storage();
        assert_eq!(state.mode, ThemeMode::Dark);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_set_mode_persists() {
        let (storage, store) = store();
        store.load_theme_from_storage();
        store.set_theme_mode(ThemeMode::Dark).unwrap();
        assert_eq!(storage.get_string(StorageKey::ThemeMode).as_deref(), Some("dark"));
    }

    #[test]
    fn test_system_mode_keeps_is_dark_until_signal() {
        let (_, store) = store();
        store.load_theme_from_storage();
        store.set_theme_mode(ThemeMode::Dark).unwrap();

        let state = store.set_theme_mode(ThemeMode::System).unwrap();
        assert!(state.is_dark);
        assert!(!store.set_system_theme(false).is_dark);
    }

    #[test]
    fn test_toggle_from_system_goes_dark() {
        let (storage, store) = store();
        store.load_theme_from_storage();

        let state = store.toggle_theme().unwrap();
        assert_eq!(state.mode, ThemeMode::Dark);
        assert!(state.is_dark);
        assert_eq!(storage.get_string(StorageKey::ThemeMode).as_deref(), Some("dark"));

        let state = store.toggle_theme().unwrap();
        assert_eq!(state.mode, ThemeMode::Light);
        assert!(!state.is_dark);
    }

    #[test]
    fn test_loading_never_returns() {
        let mut state = reduce(ThemeState::default(), ThemeAction::Hydrated(ThemeMode::Light));
        for action in [
            ThemeAction::SetMode(ThemeMode::System),
            ThemeAction::SystemChanged(true),
            ThemeAction::Toggle,
            ThemeAction::Hydrated(ThemeMode::Dark),
        ] {
            state = reduce(state, action);
            assert!(!state.is_loading);
        }
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (_, store) = store();
        let mut rx = store.subscribe();
        store.load_theme_from_storage();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_loading);

        // No-op signal in an explicit mode does not notify
        store.set_theme_mode(ThemeMode::Light).unwrap();
        rx.borrow_and_update();
        store.set_system_theme(true);
        assert!(!rx.has_changed().unwrap());
    }
}
