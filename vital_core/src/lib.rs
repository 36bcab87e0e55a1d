#![forbid(unsafe_code)]

//! Core runtime for the Vital health companion.
//!
//! This crate provides:
//! - A lazily-instantiating service container and the registry that wires it
//! - Immutable domain entities (profiles, goals, logs, predictions)
//! - Encrypted key/value storage with settings, session and theme stores
//! - Repositories over the remote API and the use-cases built on them

pub mod error;
pub mod config;
pub mod logging;
pub mod keys;
pub mod container;
pub mod storage;
pub mod domain;
pub mod session;
pub mod api_client;
pub mod repository;
pub mod usecases;
pub mod registry;
pub mod app;
pub mod settings;
pub mod theme;
pub mod offline;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::Config;
pub use container::Container;
pub use storage::SecureStorage;
pub use app::App;
pub use keys::{service, StorageKey};
pub use settings::{AppSettings, SettingsPatch, SettingsStore};
pub use theme::{ThemeMode, ThemeState, ThemeStore};
pub use export::export_logs_csv;
