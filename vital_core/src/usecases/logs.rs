use crate::domain::{HealthLog, LogType, NewHealthLog};
use crate::offline::OfflineLogCache;
use crate::repository::HealthLogRepository;
use crate::session::SessionStore;
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

pub struct LogHealthMetricUseCase {
    pub(crate) repository: Arc<dyn HealthLogRepository>,
}

impl LogHealthMetricUseCase {
    pub fn new(repository: Arc<dyn HealthLogRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, new: NewHealthLog) -> Result<HealthLog> {
        let log = HealthLog::create(new)?;
        tracing::info!("Logging {} {} {}", log.log_type(), log.value(), log.unit());
        self.repository.create_log(&log).await
    }
}

pub struct GetHealthLogsUseCase {
    pub(crate) repository: Arc<dyn HealthLogRepository>,
}

impl GetHealthLogsUseCase {
    pub fn new(repository: Arc<dyn HealthLogRepository>) -> Self {
        Self { repository }
    }

    /// Logs for `user_id`, most recent measurement first
    pub async fn execute(&self, user_id: &str, log_type: Option<LogType>) -> Result<Vec<HealthLog>> {
        let mut logs = self.repository.list_logs(user_id, log_type).await?;
        logs.sort_by(|a, b| b.logged_at().cmp(&a.logged_at()));
        Ok(logs)
    }
}

/// Outcome of one offline sync pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: usize,
    pub remaining: usize,
}

pub struct SyncOfflineLogsUseCase {
    pub(crate) repository: Arc<dyn HealthLogRepository>,
    pub(crate) cache: Arc<OfflineLogCache>,
    pub(crate) session: Arc<SessionStore>,
}

impl SyncOfflineLogsUseCase {
    pub fn new(
        repository: Arc<dyn HealthLogRepository>,
        cache: Arc<OfflineLogCache>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            repository,
            cache,
            session,
        }
    }

    /// Upload every queued log once. Entries that fail stay queued, in order.
    pub async fn execute(&self) -> Result<SyncReport> {
        let pending = self.cache.pending();
        if pending.is_empty() {
            tracing::info!("No offline logs to sync");
            return Ok(SyncReport::default());
        }

        let mut synced = HashSet::new();
        for log in &pending {
            match self.repository.create_log(log).await {
                Ok(_) => {
                    synced.insert(log.id().to_string());
                }
                Err(e) => tracing::warn!("Failed to sync log {}: {}", log.id(), e),
            }
        }

        let uploaded = synced.len();
        let remaining = self.cache.remove_synced(&synced)?;
        if uploaded > 0 {
            self.session.record_sync(Utc::now())?;
        }
        tracing::info!("Synced {} offline logs, {} remaining", uploaded, remaining);
        Ok(SyncReport { uploaded, remaining })
    }
}
