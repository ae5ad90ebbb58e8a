//! Persistent history in a SQLite database under the user cache directory.
//!
//! The table layout is fixed: one autoincrement id plus six text columns.

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::HistoryBackend;
use crate::record::{Limit, NotificationRecord, APP_ID};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time_stamp TEXT,
    app_name TEXT,
    app_icon TEXT,
    summary TEXT,
    body TEXT,
    expire_timeout TEXT
);";

/// `$XDG_CACHE_HOME/LibNotifyHistoryApplet/notifications.db`, falling back
/// to `~/.cache`.
pub fn default_db_path() -> Result<PathBuf> {
    let cache = cache_root(std::env::var_os("XDG_CACHE_HOME"))
        .context("No cache directory for the current user")?;
    Ok(cache.join(APP_ID).join("notifications.db"))
}

/// A set `XDG_CACHE_HOME` is taken as is, relative paths included.
fn cache_root(xdg_cache_home: Option<OsString>) -> Option<PathBuf> {
    match xdg_cache_home {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::cache_dir(),
    }
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`. A missing parent directory
    /// is created readable by the owner only.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                create_private_dir(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open history database {}", path.display()))?;
        let backend = Self::init(conn)?;
        info!(
            "Notification history at {} ({} stored)",
            path.display(),
            backend.len()?
        );
        Ok(backend)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create notifications table")?;
        Ok(Self { conn })
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// SQLite treats a negative LIMIT as unbounded.
fn sql_limit(limit: Limit) -> i64 {
    match limit {
        Limit::Count(n) => i64::try_from(n).unwrap_or(i64::MAX),
        Limit::All => -1,
    }
}

impl HistoryBackend for SqliteBackend {
    fn insert(&mut self, record: NotificationRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notifications (time_stamp, app_name, app_icon, summary, body, expire_timeout)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.timestamp,
                record.app_name,
                record.app_icon,
                record.summary,
                record.body,
                record.expire_timeout,
            ],
        )?;
        Ok(())
    }

    fn recent(&self, limit: Limit) -> Result<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT time_stamp, app_name, app_icon, summary, body, expire_timeout
             FROM notifications ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![sql_limit(limit)], |row| {
            let text = |idx: usize| row.get::<_, Option<String>>(idx).map(Option::unwrap_or_default);
            Ok(NotificationRecord {
                timestamp: text(0)?,
                app_name: text(1)?,
                app_icon: text(2)?,
                summary: text(3)?,
                body: text(4)?,
                expire_timeout: text(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn remove_recent(&mut self, limit: Limit) -> Result<usize> {
        let len = self.len()?;
        let n = limit.take(len);
        if n == len {
            return self.remove_all();
        }

        let removed = self.conn.execute(
            "DELETE FROM notifications WHERE id IN (
                SELECT id FROM notifications ORDER BY id DESC LIMIT ?1
             )",
            params![sql_limit(Limit::Count(n))],
        )?;
        Ok(removed)
    }

    fn remove_all(&mut self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM notifications", [])?)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!("Closing history database");
        self.conn
            .close()
            .map_err(|(_, e)| anyhow::Error::new(e).context("Failed to close history database"))
    }
}
