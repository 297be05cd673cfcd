//! Assignment seen markers persisted in the local database.
//!
//! Markers are per device: nothing here syncs them to the backend.

use chrono::Utc;

use super::Database;
use crate::assignment::SeenStore;
use crate::error::Result;

const KEY_PREFIX: &str = "assignment_seen:";

/// [`SeenStore`] over the `kv` table. Each marker stores the time the task was
/// first marked.
pub struct SqliteSeenStore {
    db: Database,
}

impl SqliteSeenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Ids of every task marked seen on this device.
    pub fn seen_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .db
            .kv_scan_prefix(KEY_PREFIX)?
            .into_iter()
            .filter_map(|(key, _)| key.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn key(task_id: &str) -> String {
        format!("{KEY_PREFIX}{task_id}")
    }
}

impl SeenStore for SqliteSeenStore {
    fn is_seen(&self, task_id: &str) -> Result<bool> {
        Ok(self.db.kv_get(&Self::key(task_id))?.is_some())
    }

    fn mark_seen(&mut self, task_id: &str) -> Result<()> {
        self.db
            .kv_insert_if_absent(&Self::key(task_id), &Utc::now().to_rfc3339())?;
        Ok(())
    }
}
