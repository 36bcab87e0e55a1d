//! Process entry point for the core runtime.

use crate::config::Config;
use crate::container::Container;
use crate::keys::service;
use crate::registry::register_services;
use crate::storage::{load_or_create_key, SecureStorage};
use crate::theme::ThemeStore;
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Owns the configuration and the service container
///
/// Nothing may be resolved until [`App::initialize`] has run. Initializing
/// more than once is harmless: only the first call does any work.
pub struct App {
    config: Config,
    container: Container,
    storage_override: Option<Arc<SecureStorage>>,
    initialized: OnceCell<()>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            container: Container::new(),
            storage_override: None,
            initialized: OnceCell::new(),
        }
    }

    /// App that uses `storage` instead of opening the configured store
    pub fn with_storage(config: Config, storage: Arc<SecureStorage>) -> Self {
        Self {
            storage_override: Some(storage),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// Open storage, register every service, then hydrate the theme
    pub fn initialize(&self) -> Result<&Container> {
        self.initialized.get_or_try_init(|| {
            let storage = match &self.storage_override {
                Some(storage) => Arc::clone(storage),
                None => Arc::new(self.open_storage()?),
            };
            register_services(&self.container, &self.config, storage);

            let theme: Arc<ThemeStore> = self.container.resolve(service::THEME_STORE)?;
            let state = theme.load_theme_from_storage();
            tracing::info!("App initialized (theme {})", state.mode);
            Ok::<(), Error>(())
        })?;
        Ok(&self.container)
    }

    /// The service container, once initialized
    pub fn container(&self) -> Result<&Container> {
        if self.is_initialized() {
            Ok(&self.container)
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Shorthand for resolving from the initialized container
    pub fn resolve<T>(&self, key: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.container()?.resolve(key)
    }

    fn open_storage(&self) -> Result<SecureStorage> {
        std::fs::create_dir_all(&self.config.data.data_dir)?;
        let key = load_or_create_key(&self.config.key_path(), &self.config.storage.key_env)?;
        Ok(SecureStorage::open(self.config.storage_path(), key))
    }
}
