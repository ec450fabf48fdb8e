use rusqlite::Connection;

use crate::error::StoreError;

/// Bumped whenever a table definition changes.
pub(crate) const SCHEMA_VERSION: i32 = 1;

pub(super) fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS dictionary (
            id TEXT PRIMARY KEY,
            version INTEGER NOT NULL,
            name TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            authors TEXT NOT NULL DEFAULT '',
            additional_info TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS category (
            dictionary_id TEXT NOT NULL REFERENCES dictionary(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            widget_type TEXT NOT NULL,
            icon_name TEXT NOT NULL DEFAULT '',
            sequence INTEGER NOT NULL,
            hidden INTEGER NOT NULL DEFAULT 0,
            sortable INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (dictionary_id, id)
        );

        CREATE TABLE IF NOT EXISTS lexeme (
            dictionary_id TEXT NOT NULL REFERENCES dictionary(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            form TEXT NOT NULL,
            base_id TEXT,
            PRIMARY KEY (dictionary_id, id)
        );

        CREATE TABLE IF NOT EXISTS property (
            dictionary_id TEXT NOT NULL,
            id TEXT NOT NULL,
            lexeme_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (dictionary_id, id),
            FOREIGN KEY (dictionary_id, lexeme_id)
                REFERENCES lexeme(dictionary_id, id) ON DELETE CASCADE,
            FOREIGN KEY (dictionary_id, category_id)
                REFERENCES category(dictionary_id, id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS dictionary_view (
            dictionary_id TEXT NOT NULL REFERENCES dictionary(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            PRIMARY KEY (dictionary_id, id)
        );

        CREATE TABLE IF NOT EXISTS view_category (
            dictionary_id TEXT NOT NULL,
            view_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            PRIMARY KEY (dictionary_id, view_id, category_id),
            FOREIGN KEY (dictionary_id, view_id)
                REFERENCES dictionary_view(dictionary_id, id) ON DELETE CASCADE,
            FOREIGN KEY (dictionary_id, category_id)
                REFERENCES category(dictionary_id, id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS bookmark (
            dictionary_id TEXT NOT NULL,
            lexeme_id TEXT NOT NULL,
            PRIMARY KEY (dictionary_id, lexeme_id),
            FOREIGN KEY (dictionary_id, lexeme_id)
                REFERENCES lexeme(dictionary_id, id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dictionary_id TEXT NOT NULL,
            lexeme_id TEXT NOT NULL,
            search_query TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            FOREIGN KEY (dictionary_id, lexeme_id)
                REFERENCES lexeme(dictionary_id, id) ON DELETE CASCADE
        );

        -- Ordering cache: derived, rebuilt wholesale on every refresh.
        CREATE TABLE IF NOT EXISTS lexeme_order (
            position INTEGER PRIMARY KEY,
            lexeme_id TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lexeme_form ON lexeme(dictionary_id, form);
        CREATE INDEX IF NOT EXISTS idx_property_lexeme ON property(dictionary_id, lexeme_id);
        CREATE INDEX IF NOT EXISTS idx_property_category
            ON property(dictionary_id, category_id, lexeme_id);
        CREATE INDEX IF NOT EXISTS idx_view_category_category
            ON view_category(dictionary_id, category_id);
        CREATE INDEX IF NOT EXISTS idx_history_dictionary ON history(dictionary_id, timestamp);
        ",
    )?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version == 0 {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    } else if version != SCHEMA_VERSION {
        return Err(StoreError::Constraint(format!(
            "unsupported schema version {version} (expected {SCHEMA_VERSION})"
        )));
    }
    Ok(())
}
