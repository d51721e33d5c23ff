//! `SQLite` reader for the Messages `chat.db` database.
//!
//! Resolves contact handles and reads their message rows.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::domain::{AppError, Handle, MessageRecord, Result};

const MESSAGES_QUERY: &str = "
    SELECT
        message.ROWID,
        message.text,
        message.date,
        message.is_from_me,
        message.cache_has_attachments,
        message.attributedBody,
        message.service
    FROM message
    JOIN handle ON message.handle_id = handle.ROWID
    WHERE handle.id = ?1
    ORDER BY message.date DESC";

const HANDLES_QUERY: &str = "
    SELECT handle.id, handle.service, COUNT(message.ROWID) AS message_count
    FROM handle
    LEFT JOIN message ON message.handle_id = handle.ROWID
    WHERE handle.id LIKE ?1
    GROUP BY handle.ROWID
    ORDER BY message_count DESC";

/// Search patterns tried, in order, when resolving a contact.
///
/// The exact term, a substring match, then US and international phone forms
/// with `-`, `(`, `)` and spaces removed.
#[must_use]
pub fn contact_search_patterns(term: &str) -> Vec<String> {
    let digits: String = term
        .chars()
        .filter(|c| !matches!(c, '-' | '(' | ')' | ' '))
        .collect();

    vec![
        term.to_string(),
        format!("%{term}%"),
        format!("+1{digits}"),
        format!("+{digits}"),
    ]
}

/// Read-only reader for the Messages database.
pub struct MessageDb {
    conn: Connection,
}

impl MessageDb {
    /// Opens the Messages database in read-only mode.
    ///
    /// # Errors
    /// Returns error if the file is missing or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(AppError::database)?;

        tracing::debug!("Opened messages database: {}", path.display());

        Ok(Self { conn })
    }

    /// Resolves a phone number, email or name fragment to a handle id.
    ///
    /// # Errors
    /// Returns `ContactNotFound` if no pattern matches, or a database error.
    pub fn find_contact(&self, term: &str) -> Result<String> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM handle WHERE id LIKE ?1 LIMIT 1")
            .map_err(AppError::database)?;

        for pattern in contact_search_patterns(term) {
            let found: Option<String> = stmt
                .query_row([&pattern], |row| row.get(0))
                .optional()
                .map_err(AppError::database)?;

            if let Some(id) = found {
                tracing::info!(pattern = %pattern, "Resolved contact {}", id);
                return Ok(id);
            }
        }

        Err(AppError::ContactNotFound {
            search: term.to_string(),
        })
    }

    /// Lists handles matching a search term with their message counts.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn search_handles(&self, term: &str, limit: usize) -> Result<Vec<Handle>> {
        let mut stmt = self.conn.prepare(HANDLES_QUERY).map_err(AppError::database)?;
        let mut handles: Vec<Handle> = Vec::new();

        for pattern in contact_search_patterns(term) {
            let rows = stmt
                .query_map([&pattern], |row| {
                    let count: i64 = row.get(2)?;
                    Ok(Handle {
                        id: row.get(0)?,
                        service: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        message_count: usize::try_from(count).unwrap_or(0),
                    })
                })
                .map_err(AppError::database)?;

            for row in rows {
                match row {
                    Ok(handle) => {
                        let seen = handles
                            .iter()
                            .any(|h| h.id == handle.id && h.service == handle.service);
                        if !seen {
                            handles.push(handle);
                        }
                    }
                    Err(e) => tracing::warn!("Failed to read handle row: {}", e),
                }
            }
        }

        handles.sort_by(|a, b| b.message_count.cmp(&a.message_count));
        handles.truncate(limit);

        Ok(handles)
    }

    /// Fetches every message exchanged with a handle.
    ///
    /// # Errors
    /// Returns error if the query fails. Unreadable rows are skipped.
    pub fn fetch_messages(&self, handle_id: &str) -> Result<Vec<MessageRecord>> {
        let mut stmt = self.conn.prepare(MESSAGES_QUERY).map_err(AppError::database)?;

        let rows = stmt
            .query_map(params![handle_id], read_message_row)
            .map_err(AppError::database)?;

        let mut records = Vec::new();
        for row in rows {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to read message row: {}", e);
                }
            }
        }

        tracing::debug!("Fetched {} messages for {}", records.len(), handle_id);

        Ok(records)
    }
}

fn read_message_row(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    let plain_text = match row.get_ref(1)? {
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        _ => None,
    };

    // Handle both BLOB and TEXT storage of the payload
    let rich_payload = match row.get_ref(5)? {
        ValueRef::Blob(b) | ValueRef::Text(b) => Some(b.to_vec()),
        _ => None,
    };

    Ok(MessageRecord {
        rowid: row.get(0)?,
        plain_text,
        rich_payload,
        timestamp: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
        is_from_me: row.get::<_, Option<i64>>(3)?.unwrap_or_default() != 0,
        service: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        has_attachments: row.get::<_, Option<i64>>(4)?.unwrap_or_default() != 0,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Creates a minimal `chat.db` with two handles and four messages.
    pub(crate) fn create_fixture(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE handle (
                ROWID INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                service TEXT
            );
            CREATE TABLE message (
                ROWID INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT,
                handle_id INTEGER,
                date INTEGER,
                is_from_me INTEGER DEFAULT 0,
                cache_has_attachments INTEGER DEFAULT 0,
                attributedBody BLOB,
                service TEXT
            );
            INSERT INTO handle (id, service) VALUES ('+15550100', 'iMessage');
            INSERT INTO handle (id, service) VALUES ('sam@example.com', 'iMessage');",
        )
        .unwrap();

        let mut blob = b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84\x08NSString\x01\x94\x84\x01+".to_vec();
        blob.push(19);
        blob.extend_from_slice(b"Hello, how are you?\x86\x84\x02iI\x01\x13\x92");

        let rows: [(Option<&str>, i64, i64, i64, Option<Vec<u8>>); 4] = [
            (Some("Hey there"), 631_152_000_000_000_000, 0, 0, None),
            (None, 631_152_060_000_000_000, 1, 0, Some(blob)),
            (None, 631_152_120_000_000_000, 0, 1, None),
            (Some(""), 631_152_180_000_000_000, 1, 0, Some(vec![0x00, 0x84, 0x01])),
        ];
        for (text, date, from_me, attachments, body) in rows {
            conn.execute(
                "INSERT INTO message (text, handle_id, date, is_from_me, cache_has_attachments, attributedBody, service)
                 VALUES (?1, 1, ?2, ?3, ?4, ?5, 'iMessage')",
                params![text, date, from_me, attachments, body],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_contact_search_patterns() {
        assert_eq!(
            contact_search_patterns("(555) 010-0100"),
            vec![
                "(555) 010-0100".to_string(),
                "%(555) 010-0100%".to_string(),
                "+15550100100".to_string(),
                "+5550100100".to_string(),
            ]
        );
    }

    #[test]
    fn test_open_missing_database() {
        let dir = tempdir().unwrap();
        let result = MessageDb::open(&dir.path().join("chat.db"));
        assert!(matches!(result, Err(AppError::DatabaseNotFound { .. })));
    }

    #[test]
    fn test_find_contact_by_partial_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.db");
        create_fixture(&path);

        let db = MessageDb::open(&path).unwrap();
        assert_eq!(db.find_contact("+15550100").unwrap(), "+15550100");
        assert_eq!(db.find_contact("5550100").unwrap(), "+15550100");
        assert_eq!(db.find_contact("sam@").unwrap(), "sam@example.com");
        assert!(matches!(
            db.find_contact("nobody"),
            Err(AppError::ContactNotFound { .. })
        ));
    }

    #[test]
    fn test_fetch_messages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.db");
        create_fixture(&path);

        let db = MessageDb::open(&path).unwrap();
        let records = db.fetch_messages("+15550100").unwrap();
        assert_eq!(records.len(), 4);

        // Newest first, as queried.
        assert_eq!(records[3].plain_text.as_deref(), Some("Hey there"));
        assert!(records[2].is_from_me);
        assert!(records[2].rich_payload.is_some());
        assert!(records[1].has_attachments);
        assert_eq!(records[0].service, "iMessage");
    }

    #[test]
    fn test_search_handles_counts_messages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.db");
        create_fixture(&path);

        let db = MessageDb::open(&path).unwrap();
        let handles = db.search_handles("555", 10).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].id, "+15550100");
        assert_eq!(handles[0].message_count, 4);
    }
}
