//! Bookmarks and lookup history. Both cascade away with their lexeme.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};

use super::Store;
use crate::error::StoreError;
use crate::model::{Bookmark, HistoryRecord, LexemeId};

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

impl Store {
    /// Returns `true` if newly added, `false` if already bookmarked.
    pub fn add_bookmark(&self, dictionary_id: &str, lexeme_id: &str) -> Result<bool, StoreError> {
        self.write(|tx| {
            Ok(tx.execute(
                "INSERT OR IGNORE INTO bookmark (dictionary_id, lexeme_id) VALUES (?1, ?2)",
                [dictionary_id, lexeme_id],
            )? > 0)
        })
    }

    /// Returns `true` if removed, `false` if not bookmarked.
    pub fn remove_bookmark(&self, dictionary_id: &str, lexeme_id: &str) -> Result<bool, StoreError> {
        self.write(|tx| {
            Ok(tx.execute(
                "DELETE FROM bookmark WHERE dictionary_id = ?1 AND lexeme_id = ?2",
                [dictionary_id, lexeme_id],
            )? > 0)
        })
    }

    pub fn bookmark(&self, dictionary_id: &str, lexeme_id: &str) -> Result<Option<Bookmark>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT dictionary_id, lexeme_id FROM bookmark
                     WHERE dictionary_id = ?1 AND lexeme_id = ?2",
                    [dictionary_id, lexeme_id],
                    |row| {
                        Ok(Bookmark {
                            dictionary_id: row.get(0)?,
                            lexeme_id: row.get(1)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    /// Bookmarked lexeme ids, ordered by form.
    pub fn bookmarks(&self, dictionary_id: &str) -> Result<Vec<LexemeId>, StoreError> {
        self.query_ids(
            "SELECT b.lexeme_id FROM bookmark b
             JOIN lexeme l ON l.dictionary_id = b.dictionary_id AND l.id = b.lexeme_id
             WHERE b.dictionary_id = ?1
             ORDER BY l.form, l.id",
            &[dictionary_id.to_string()],
        )
    }

    pub fn record_history(
        &self,
        dictionary_id: &str,
        lexeme_id: &str,
        query: &str,
    ) -> Result<i64, StoreError> {
        self.record_history_at(dictionary_id, lexeme_id, query, now_epoch())
    }

    pub fn record_history_at(
        &self,
        dictionary_id: &str,
        lexeme_id: &str,
        query: &str,
        timestamp: i64,
    ) -> Result<i64, StoreError> {
        self.write(|tx| {
            tx.execute(
                "INSERT INTO history (dictionary_id, lexeme_id, search_query, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                params![dictionary_id, lexeme_id, query, timestamp],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Most recent first.
    pub fn history(&self, dictionary_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, dictionary_id, lexeme_id, search_query, timestamp FROM history
                 WHERE dictionary_id = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![dictionary_id, limit], |row| {
                Ok(HistoryRecord {
                    id: row.get(0)?,
                    dictionary_id: row.get(1)?,
                    lexeme_id: row.get(2)?,
                    query: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    /// Returns the number of removed records.
    pub fn clear_history(&self, dictionary_id: &str) -> Result<usize, StoreError> {
        self.write(|tx| Ok(tx.execute("DELETE FROM history WHERE dictionary_id = ?1", [dictionary_id])?))
    }
}
