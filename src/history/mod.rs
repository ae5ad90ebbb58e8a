//! Notification history store.
//!
//! Two backing policies share one ordering: the most recently recorded
//! notification comes first.
//! - `memory`: bounded, volatile, newest at the front of a `VecDeque`.
//! - `sqlite`: unbounded, persisted under the user cache directory and
//!   ordered by an autoincrement id.

mod memory;
mod sqlite;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::{HistoryBackendKind, HistoryConfig};
use crate::record::{Limit, NotificationRecord};

pub use memory::MemoryBackend;
pub use sqlite::{default_db_path, SqliteBackend};

/// Storage operations a history backend provides. Ordering is newest first
/// for every read and every bounded delete.
pub trait HistoryBackend {
    fn insert(&mut self, record: NotificationRecord) -> Result<()>;

    fn recent(&self, limit: Limit) -> Result<Vec<NotificationRecord>>;

    /// Remove the most recent records. Returns how many were removed.
    fn remove_recent(&mut self, limit: Limit) -> Result<usize>;

    /// Remove every record. Returns how many were removed.
    fn remove_all(&mut self) -> Result<usize>;

    fn len(&self) -> Result<usize>;

    /// Release the underlying storage handle.
    fn close(self: Box<Self>) -> Result<()>;
}

/// The notification history. All insertions go through [`History::record`],
/// which enforces self-exclusion.
pub struct History {
    backend: Box<dyn HistoryBackend>,
}

impl History {
    pub fn new(backend: Box<dyn HistoryBackend>) -> Self {
        Self { backend }
    }

    /// Open the backend selected in the config.
    pub fn open(config: &HistoryConfig) -> Result<Self> {
        match config.backend {
            HistoryBackendKind::Memory => {
                info!("Keeping up to {} notifications in memory", config.capacity);
                Ok(Self::memory(config.capacity))
            }
            HistoryBackendKind::Sqlite => {
                let path = match &config.db_path {
                    Some(path) => path.clone(),
                    None => default_db_path()?,
                };
                Self::sqlite(path)
            }
        }
    }

    /// Volatile history holding at most `capacity` records.
    pub fn memory(capacity: usize) -> Self {
        Self::new(Box::new(MemoryBackend::new(capacity)))
    }

    /// Persistent history stored at `path`.
    pub fn sqlite(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(Box::new(SqliteBackend::open(&path.into())?)))
    }

    /// Store a captured notification as the newest entry. The recorder's
    /// own notifications are dropped silently.
    pub fn record(&mut self, record: NotificationRecord) -> Result<()> {
        if record.is_own() {
            debug!("Ignoring own notification: {}", record.summary);
            return Ok(());
        }
        debug!("Recording notification from {}", record.app_name);
        self.backend.insert(record)
    }

    /// The most recent records, newest first.
    pub fn query(&self, limit: Limit) -> Result<Vec<NotificationRecord>> {
        self.backend.recent(limit)
    }

    /// Forget the most recent records. Asking for more than are stored
    /// clears the history.
    pub fn purge(&mut self, limit: Limit) -> Result<()> {
        let removed = self.backend.remove_recent(limit)?;
        info!("Forgot {removed} notification(s) ({limit})");
        Ok(())
    }

    /// Forget every record.
    pub fn clear(&mut self) -> Result<()> {
        let removed = self.backend.remove_all()?;
        info!("Forgot all {removed} notification(s)");
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        self.backend.len()
    }

    pub fn close(self) -> Result<()> {
        self.backend.close()
    }
}

/// Behaviour both backends must share, run against each of them.
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;
    use crate::record::{sample, APP_ID};

    fn named(history: &History) -> Vec<String> {
        history
            .query(Limit::All)
            .unwrap()
            .into_iter()
            .map(|r| r.summary)
            .collect()
    }

    fn fill(history: &mut History, count: usize) {
        for i in 0..count {
            history.record(sample("App", &format!("n{i}"), "")).unwrap();
        }
    }

    pub fn self_exclusion_scenario(mut history: History) {
        history.record(sample("Foo", "A", "")).unwrap();
        history.record(sample(APP_ID, "B", "")).unwrap();
        history.record(sample("Bar", "C", "")).unwrap();

        assert_eq!(named(&history), ["C", "A"]);

        history.purge(Limit::Count(1)).unwrap();
        assert_eq!(named(&history), ["A"]);
    }

    pub fn query_is_newest_first_prefix(mut history: History) {
        assert!(history.query(Limit::All).unwrap().is_empty());
        assert!(history.query(Limit::Count(10)).unwrap().is_empty());

        fill(&mut history, 5);
        let all = history.query(Limit::All).unwrap();
        assert_eq!(named(&history), ["n4", "n3", "n2", "n1", "n0"]);

        for k in 0..=5 {
            assert_eq!(history.query(Limit::Count(k)).unwrap(), all[..k]);
        }
        assert_eq!(history.query(Limit::Count(50)).unwrap(), all);
        assert_eq!(history.len().unwrap(), 5);
    }

    pub fn purge_removes_query_prefix(mut history: History) {
        fill(&mut history, 6);
        let before = history.query(Limit::All).unwrap();

        history.purge(Limit::Count(2)).unwrap();
        assert_eq!(history.query(Limit::All).unwrap(), before[2..]);

        history.purge(Limit::Count(0)).unwrap();
        assert_eq!(history.len().unwrap(), 4);

        // More than stored: full clear, and purging an empty store is fine.
        history.purge(Limit::Count(10)).unwrap();
        assert!(history.query(Limit::All).unwrap().is_empty());
        history.purge(Limit::Count(3)).unwrap();
        assert_eq!(history.len().unwrap(), 0);

        fill(&mut history, 3);
        history.purge(Limit::All).unwrap();
        assert_eq!(history.len().unwrap(), 0);
    }

    pub fn clear_empties(mut history: History) {
        history.clear().unwrap();
        assert_eq!(history.len().unwrap(), 0);

        fill(&mut history, 4);
        history.clear().unwrap();
        assert!(history.query(Limit::All).unwrap().is_empty());

        // Still usable afterwards.
        history.record(sample("Foo", "again", "")).unwrap();
        assert_eq!(named(&history), ["again"]);
    }

    pub fn empty_content_is_kept(mut history: History) {
        history.record(sample("Foo", "", "")).unwrap();
        assert_eq!(history.len().unwrap(), 1);
    }
}
