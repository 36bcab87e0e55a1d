//! Append-only queue of health logs recorded while offline.

use crate::domain::HealthLog;
use crate::keys::StorageKey;
use crate::storage::SecureStorage;
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

pub struct OfflineLogCache {
    storage: Arc<SecureStorage>,
}

impl OfflineLogCache {
    pub fn new(storage: Arc<SecureStorage>) -> Self {
        Self { storage }
    }

    /// Queued logs, oldest first. Unreadable queues read as empty.
    pub fn pending(&self) -> Vec<HealthLog> {
        self.storage
            .get_object::<Vec<HealthLog>>(StorageKey::OfflineData)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Append `log` to the queue as stored right now, so entries queued by
    /// other processes in the meantime are kept.
    pub fn enqueue(&self, log: HealthLog) -> Result<()> {
        tracing::debug!("Queueing offline log {}", log.id());
        self.storage
            .update_object(StorageKey::OfflineData, |logs: Option<Vec<HealthLog>>| {
                let mut logs = logs.unwrap_or_default();
                logs.push(log);
                logs
            })?;
        self.touch()
    }

    /// Drop the logs whose ids are in `synced` and return how many remain.
    /// Logs queued after the sync started are left alone.
    pub fn remove_synced(&self, synced: &HashSet<String>) -> Result<usize> {
        let remaining = self
            .storage
            .update_object(StorageKey::OfflineData, |logs: Option<Vec<HealthLog>>| {
                let mut logs = logs.unwrap_or_default();
                logs.retain(|log| !synced.contains(log.id()));
                logs
            })?;
        self.touch()?;
        Ok(remaining.len())
    }

    pub fn clear(&self) -> Result<()> {
        self.storage
            .set_object(StorageKey::OfflineData, &Vec::<HealthLog>::new())?;
        self.touch()
    }

    fn touch(&self) -> Result<()> {
        self.storage
            .set_number(StorageKey::CacheTimestamp, Utc::now().timestamp_millis() as f64)
    }

    /// Milliseconds since the epoch of the last queue write
    pub fn cache_timestamp(&self) -> Option<i64> {
        self.storage
            .get_number(StorageKey::CacheTimestamp)
            .map(|millis| millis as i64)
    }
}
