//! SQLite-backed entity store.
//!
//! Holds dictionaries, categories, lexemes, properties, views, bookmarks,
//! history and the ordering table behind a single connection. The store
//! enforces foreign keys and uniqueness only; ordering and visibility rules
//! live in the resolver and assembler.

mod catalog;
mod order_table;
mod query;
mod schema;
#[cfg(test)]
mod tests;
mod user_data;

pub use catalog::InstallOutcome;
pub use user_data::now_epoch;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::error::StoreError;
use crate::model::{Category, WidgetType};
use crate::settings::settings;

/// SQL function used for case-insensitive substring search. SQLite's own
/// `lower()` only folds ASCII.
pub(crate) const FOLD_CASE_FN: &str = "fold_case";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        debug!(path = %path.display(), "opened store");
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(settings().store.busy_timeout_ms))?;
        conn.create_scalar_function(
            FOLD_CASE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` against the connection.
    fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a transaction; commits only if `f` succeeds.
    fn write<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

impl ToSql for WidgetType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WidgetType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        WidgetType::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown widget type {s}").into()))
    }
}

/// Columns read by `category_from_row`, for a `category` table aliased `c`.
pub(crate) const CATEGORY_COLUMNS: &str =
    "c.id, c.dictionary_id, c.name, c.widget_type, c.icon_name, c.sequence, c.hidden, c.sortable";

/// Read a category from `CATEGORY_COLUMNS` starting at column `at`.
pub(crate) fn category_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(at)?,
        dictionary_id: row.get(at + 1)?,
        name: row.get(at + 2)?,
        widget_type: row.get(at + 3)?,
        icon_name: row.get(at + 4)?,
        sequence: row.get(at + 5)?,
        hidden: row.get(at + 6)?,
        sortable: row.get(at + 7)?,
    })
}
