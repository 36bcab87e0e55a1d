//! Wires every application service into a [`Container`].
//!
//! Registration only records factories; nothing is built until first
//! resolved. Repositories are shared singletons, so every use-case that
//! depends on, say, the log repository receives the same instance.

use crate::api_client::ApiClient;
use crate::config::{ApiConfig, Config};
use crate::container::Container;
use crate::keys::service;
use crate::offline::OfflineLogCache;
use crate::repository::{
    ApiHealthGoalRepository, ApiHealthLogRepository, ApiPredictionRepository,
    ApiUserProfileRepository, HealthGoalRepository, HealthLogRepository, PredictionRepository,
    UserProfileRepository,
};
use crate::session::SessionStore;
use crate::settings::SettingsStore;
use crate::storage::SecureStorage;
use crate::theme::ThemeStore;
use crate::usecases::{
    CreateHealthGoalUseCase, GetHealthGoalsUseCase, GetHealthLogsUseCase,
    GetHealthPredictionUseCase, GetUserProfileUseCase, LogHealthMetricUseCase,
    SyncOfflineLogsUseCase, UpdateGoalProgressUseCase, UpdateUserProfileUseCase,
};
use crate::Result;
use std::sync::Arc;

/// Register storage-backed stores, repositories and use-cases
pub fn register_services(container: &Container, config: &Config, storage: Arc<SecureStorage>) {
    register_stores(container, storage);
    register_repositories(container, &config.api);
    register_use_cases(container);
    tracing::info!("Registered {} services", container.registered_keys().len());
}

fn register_stores(container: &Container, storage: Arc<SecureStorage>) {
    container.register_instance(service::SECURE_STORAGE, storage);

    container.register(service::SESSION_STORE, |c: &Container| {
        Ok(Arc::new(SessionStore::new(c.resolve(service::SECURE_STORAGE)?)))
    });
    container.register(service::SETTINGS_STORE, |c: &Container| {
        Ok(Arc::new(SettingsStore::new(c.resolve(service::SECURE_STORAGE)?)))
    });
    container.register(service::THEME_STORE, |c: &Container| {
        Ok(Arc::new(ThemeStore::new(c.resolve(service::SECURE_STORAGE)?)))
    });
    container.register(service::OFFLINE_LOG_CACHE, |c: &Container| {
        Ok(Arc::new(OfflineLogCache::new(c.resolve(service::SECURE_STORAGE)?)))
    });
}

fn api_client(container: &Container, api: &ApiConfig) -> Result<ApiClient> {
    let session = container.resolve::<SessionStore>(service::SESSION_STORE)?;
    Ok(ApiClient::from_config(api)?.with_session(session))
}

fn register_repositories(container: &Container, api: &ApiConfig) {
    let cfg = api.clone();
    container.register(
        service::USER_PROFILE_REPOSITORY,
        move |c: &Container| -> Result<Arc<dyn UserProfileRepository>> {
            Ok(Arc::new(ApiUserProfileRepository::new(api_client(c, &cfg)?)))
        },
    );

    let cfg = api.clone();
    container.register(
        service::HEALTH_GOAL_REPOSITORY,
        move |c: &Container| -> Result<Arc<dyn HealthGoalRepository>> {
            Ok(Arc::new(ApiHealthGoalRepository::new(api_client(c, &cfg)?)))
        },
    );

    let cfg = api.clone();
    container.register(
        service::HEALTH_LOG_REPOSITORY,
        move |c: &Container| -> Result<Arc<dyn HealthLogRepository>> {
            Ok(Arc::new(ApiHealthLogRepository::new(api_client(c, &cfg)?)))
        },
    );

    let cfg = api.clone();
    container.register(
        service::PREDICTION_REPOSITORY,
        move |c: &Container| -> Result<Arc<dyn PredictionRepository>> {
            Ok(Arc::new(ApiPredictionRepository::new(api_client(c, &cfg)?)))
        },
    );
}

fn register_use_cases(container: &Container) {
    container.register(service::GET_USER_PROFILE, |c: &Container| {
        Ok(Arc::new(GetUserProfileUseCase::new(
            c.resolve::<dyn UserProfileRepository>(service::USER_PROFILE_REPOSITORY)?,
        )))
    });
    container.register(service::UPDATE_USER_PROFILE, |c: &Container| {
        Ok(Arc::new(UpdateUserProfileUseCase::new(
            c.resolve::<dyn UserProfileRepository>(service::USER_PROFILE_REPOSITORY)?,
        )))
    });

    container.register(service::CREATE_HEALTH_GOAL, |c: &Container| {
        Ok(Arc::new(CreateHealthGoalUseCase::new(
            c.resolve::<dyn HealthGoalRepository>(service::HEALTH_GOAL_REPOSITORY)?,
        )))
    });
    container.register(service::GET_HEALTH_GOALS, |c: &Container| {
        Ok(Arc::new(GetHealthGoalsUseCase::new(
            c.resolve::<dyn HealthGoalRepository>(service::HEALTH_GOAL_REPOSITORY)?,
        )))
    });
    container.register(service::UPDATE_GOAL_PROGRESS, |c: &Container| {
        Ok(Arc::new(UpdateGoalProgressUseCase::new(
            c.resolve::<dyn HealthGoalRepository>(service::HEALTH_GOAL_REPOSITORY)?,
        )))
    });

    container.register(service::LOG_HEALTH_METRIC, |c: &Container| {
        Ok(Arc::new(LogHealthMetricUseCase::new(
            c.resolve::<dyn HealthLogRepository>(service::HEALTH_LOG_REPOSITORY)?,
        )))
    });
    container.register(service::GET_HEALTH_LOGS, |c: &Container| {
        Ok(Arc::new(GetHealthLogsUseCase::new(
            c.resolve::<dyn HealthLogRepository>(service::HEALTH_LOG_REPOSITORY)?,
        )))
    });
    container.register(service::SYNC_OFFLINE_LOGS, |c: &Container| {
        Ok(Arc::new(SyncOfflineLogsUseCase::new(
            c.resolve::<dyn HealthLogRepository>(service::HEALTH_LOG_REPOSITORY)?,
            c.resolve(service::OFFLINE_LOG_CACHE)?,
            c.resolve(service::SESSION_STORE)?,
        )))
    });

    container.register(service::GET_HEALTH_PREDICTION, |c: &Container| {
        Ok(Arc::new(GetHealthPredictionUseCase::new(
            c.resolve::<dyn PredictionRepository>(service::PREDICTION_REPOSITORY)?,
            c.resolve::<dyn UserProfileRepository>(service::USER_PROFILE_REPOSITORY)?,
            c.resolve::<dyn HealthLogRepository>(service::HEALTH_LOG_REPOSITORY)?,
        )))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> Container {
        let container = Container::new();
        register_services(
            &container,
            &Config::default(),
            Arc::new(SecureStorage::in_memory()),
        );
        container
    }

    #[test]
    fn test_every_service_key_registered() {
        let container = registered();
        for key in [
            service::SECURE_STORAGE,
            service::SESSION_STORE,
            service::SETTINGS_STORE,
            service::THEME_STORE,
            service::OFFLINE_LOG_CACHE,
            service::USER_PROFILE_REPOSITORY,
            service::HEALTH_GOAL_REPOSITORY,
            service::HEALTH_LOG_REPOSITORY,
            service::PREDICTION_REPOSITORY,
            service::GET_USER_PROFILE,
            service::UPDATE_USER_PROFILE,
            service::CREATE_HEALTH_GOAL,
            service::GET_HEALTH_GOALS,
            service::UPDATE_GOAL_PROGRESS,
            service::LOG_HEALTH_METRIC,
            service::GET_HEALTH_LOGS,
            service::SYNC_OFFLINE_LOGS,
            service::GET_HEALTH_PREDICTION,
        ] {
            assert!(container.is_registered(key), "{} not registered", key);
        }
        assert!(!container.is_instantiated(service::GET_HEALTH_LOGS));
    }

    #[test]
    fn test_use_cases_share_repository_instance() {
        let container = registered();
        let log_metric: Arc<LogHealthMetricUseCase> =
            container.resolve(service::LOG_HEALTH_METRIC).unwrap();
        let get_logs: Arc<GetHealthLogsUseCase> =
            container.resolve(service::GET_HEALTH_LOGS).unwrap();

        assert_eq!(
            Arc::as_ptr(&log_metric.repository) as *const (),
            Arc::as_ptr(&get_logs.repository) as *const ()
        );
        assert!(container.is_instantiated(service::HEALTH_LOG_REPOSITORY));
    }

    #[test]
    fn test_stores_share_storage() {
        let container = registered();
        let storage: Arc<SecureStorage> = container.resolve(service::SECURE_STORAGE).unwrap();
        let settings: Arc<SettingsStore> = container.resolve(service::SETTINGS_STORE).unwrap();

        settings
            .update_display_settings(crate::settings::DisplayPatch {
                language: Some("de".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(storage.contains(crate::keys::StorageKey::AppSettings));
    }

    #[test]
    fn test_repository_resolves_as_trait_object() {
        let container = registered();
        assert!(container
            .resolve::<dyn PredictionRepository>(service::PREDICTION_REPOSITORY)
            .is_ok());
        assert!(container
            .resolve::<ApiPredictionRepository>(service::PREDICTION_REPOSITORY)
            .is_err());
    }
}
