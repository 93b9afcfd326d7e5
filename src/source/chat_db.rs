//! SQLite-backed [`MessageSource`] over the macOS Messages store.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use super::{MessageSource, RawMessage, SourceError};

const RECENT_MESSAGES_QUERY: &str = "
    SELECT
        message.text,
        message.date,
        message.is_from_me,
        handle.id AS contact
    FROM message
    LEFT JOIN handle ON message.handle_id = handle.ROWID
    WHERE message.date > ?1
      AND message.text IS NOT NULL
      AND message.text != ''
    ORDER BY message.date ASC
";

/// Location of the Messages store for the current user.
///
/// Returns `None` when the home directory cannot be resolved.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Messages").join("chat.db"))
}

/// Read-only handle on a `chat.db` file.
#[derive(Debug)]
pub struct ChatDb {
    path: PathBuf,
    conn: Connection,
}

impl ChatDb {
    /// Open the store read-only and verify it can actually be read.
    ///
    /// A missing file is [`SourceError::NotFound`]; anything that prevents
    /// reading the schema (permissions, corruption) is
    /// [`SourceError::Unreadable`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(SourceError::NotFound { path });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = match Connection::open_with_flags(&path, flags) {
            Ok(conn) => conn,
            Err(source) => return Err(SourceError::Unreadable { path, source }),
        };

        // Opening is lazy; touching the schema surfaces permission problems.
        if let Err(source) =
            conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
        {
            return Err(SourceError::Unreadable { path, source });
        }

        tracing::debug!(path = %path.display(), "opened messages database");
        Ok(Self { path, conn })
    }

    /// Path this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MessageSource for ChatDb {
    fn fetch_since(&self, cutoff: i64) -> Result<Vec<RawMessage>, SourceError> {
        let mut stmt = self.conn.prepare(RECENT_MESSAGES_QUERY)?;
        let rows = stmt.query_map([cutoff], |row| {
            Ok(RawMessage {
                text: row.get(0)?,
                timestamp: row.get(1)?,
                is_from_self: row.get::<_, i64>(2)? != 0,
                participant_id: row.get(3)?,
            })
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }

        tracing::info!(count = messages.len(), cutoff, "fetched messages");
        Ok(messages)
    }
}
