use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, debug_span};

use super::{category_from_row, Store, CATEGORY_COLUMNS};
use crate::error::StoreError;
use crate::model::{Category, Dictionary, DictionaryBundle, DictionaryView, Lexeme, LexemeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// An older version was removed first. Bookmarks on lexemes that still
    /// exist are carried over.
    Replaced { previous_version: u32 },
}

impl Store {
    /// Insert a whole dictionary in one transaction.
    ///
    /// Rows must already be consistent (foreign keys intact, sequences
    /// assigned). Installing over an existing id requires a strictly higher
    /// version.
    pub fn install(&self, bundle: &DictionaryBundle) -> Result<InstallOutcome, StoreError> {
        let dict = &bundle.dictionary;
        let _span = debug_span!(
            "install",
            dictionary = %dict.id,
            version = dict.version,
            lexemes = bundle.lexemes.len(),
            properties = bundle.properties.len()
        )
        .entered();
        check_scoping(bundle)?;

        self.write(|tx| {
            let existing: Option<u32> = tx
                .query_row(
                    "SELECT version FROM dictionary WHERE id = ?1",
                    [&dict.id],
                    |row| row.get(0),
                )
                .optional()?;

            let mut kept_bookmarks: Vec<LexemeId> = Vec::new();
            if let Some(previous) = existing {
                if dict.version <= previous {
                    return Err(StoreError::Constraint(format!(
                        "dictionary {} already installed at version {previous}",
                        dict.id
                    )));
                }
                let mut stmt = tx.prepare("SELECT lexeme_id FROM bookmark WHERE dictionary_id = ?1")?;
                kept_bookmarks = stmt
                    .query_map([&dict.id], |row| row.get(0))?
                    .collect::<Result<_, _>>()?;
                tx.execute("DELETE FROM dictionary WHERE id = ?1", [&dict.id])?;
            }

            insert_bundle(tx, bundle)?;

            for lexeme_id in &kept_bookmarks {
                tx.execute(
                    "INSERT OR IGNORE INTO bookmark (dictionary_id, lexeme_id)
                     SELECT ?1, ?2 WHERE EXISTS
                         (SELECT 1 FROM lexeme WHERE dictionary_id = ?1 AND id = ?2)",
                    params![dict.id, lexeme_id],
                )?;
            }

            Ok(match existing {
                Some(previous_version) => {
                    debug!(previous_version, kept_bookmarks = kept_bookmarks.len(), "replaced");
                    InstallOutcome::Replaced { previous_version }
                }
                None => InstallOutcome::Installed,
            })
        })
    }

    /// Remove a dictionary and everything scoped to it.
    pub fn uninstall(&self, dictionary_id: &str) -> Result<bool, StoreError> {
        let removed = self.write(|tx| {
            Ok(tx.execute("DELETE FROM dictionary WHERE id = ?1", [dictionary_id])? > 0)
        })?;
        debug!(dictionary = dictionary_id, removed, "uninstall");
        Ok(removed)
    }

    pub fn dictionary(&self, dictionary_id: &str) -> Result<Option<Dictionary>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, version, name, summary, authors, additional_info
                     FROM dictionary WHERE id = ?1",
                    [dictionary_id],
                    dictionary_from_row,
                )
                .optional()?)
        })
    }

    /// All installed dictionaries, sorted by name.
    pub fn dictionaries(&self) -> Result<Vec<Dictionary>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, version, name, summary, authors, additional_info
                 FROM dictionary ORDER BY name, id",
            )?;
            let rows = stmt.query_map([], dictionary_from_row)?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    pub fn category(
        &self,
        dictionary_id: &str,
        category_id: &str,
    ) -> Result<Option<Category>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {CATEGORY_COLUMNS} FROM category c
                         WHERE c.dictionary_id = ?1 AND c.id = ?2"
                    ),
                    [dictionary_id, category_id],
                    |row| category_from_row(row, 0),
                )
                .optional()?)
        })
    }

    /// Categories of a dictionary in display order.
    pub fn categories(&self, dictionary_id: &str) -> Result<Vec<Category>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category c
                 WHERE c.dictionary_id = ?1 ORDER BY c.sequence, c.id"
            ))?;
            let rows = stmt.query_map([dictionary_id], |row| category_from_row(row, 0))?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    pub fn view(
        &self,
        dictionary_id: &str,
        view_id: &str,
    ) -> Result<Option<DictionaryView>, StoreError> {
        self.read(|conn| {
            let name: Option<String> = conn
                .query_row(
                    "SELECT name FROM dictionary_view WHERE dictionary_id = ?1 AND id = ?2",
                    [dictionary_id, view_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(name) = name else {
                return Ok(None);
            };
            Ok(Some(DictionaryView {
                id: view_id.to_string(),
                dictionary_id: dictionary_id.to_string(),
                name,
                category_ids: view_members(conn, dictionary_id, view_id)?,
            }))
        })
    }

    pub fn views(&self, dictionary_id: &str) -> Result<Vec<DictionaryView>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name FROM dictionary_view WHERE dictionary_id = ?1 ORDER BY name, id",
            )?;
            let heads: Vec<(String, String)> = stmt
                .query_map([dictionary_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?;
            heads
                .into_iter()
                .map(|(id, name)| {
                    let category_ids = view_members(conn, dictionary_id, &id)?;
                    Ok(DictionaryView {
                        id,
                        dictionary_id: dictionary_id.to_string(),
                        name,
                        category_ids,
                    })
                })
                .collect()
        })
    }

    pub fn lexeme(&self, dictionary_id: &str, lexeme_id: &str) -> Result<Option<Lexeme>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, dictionary_id, form, base_id FROM lexeme
                     WHERE dictionary_id = ?1 AND id = ?2",
                    [dictionary_id, lexeme_id],
                    |row| {
                        Ok(Lexeme {
                            id: row.get(0)?,
                            dictionary_id: row.get(1)?,
                            form: row.get(2)?,
                            base_id: row.get(3)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    pub fn lexeme_exists(&self, dictionary_id: &str, lexeme_id: &str) -> Result<bool, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT 1 FROM lexeme WHERE dictionary_id = ?1 AND id = ?2",
                    [dictionary_id, lexeme_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some())
        })
    }

    /// Delete one lexeme with its properties, bookmark and history.
    pub fn delete_lexeme(&self, dictionary_id: &str, lexeme_id: &str) -> Result<bool, StoreError> {
        self.write(|tx| {
            Ok(tx.execute(
                "DELETE FROM lexeme WHERE dictionary_id = ?1 AND id = ?2",
                [dictionary_id, lexeme_id],
            )? > 0)
        })
    }
}

fn dictionary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dictionary> {
    Ok(Dictionary {
        id: row.get(0)?,
        version: row.get(1)?,
        name: row.get(2)?,
        summary: row.get(3)?,
        authors: row.get(4)?,
        additional_info: row.get(5)?,
    })
}

fn view_members(
    conn: &Connection,
    dictionary_id: &str,
    view_id: &str,
) -> Result<BTreeSet<String>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT category_id FROM view_category WHERE dictionary_id = ?1 AND view_id = ?2",
    )?;
    let rows = stmt.query_map([dictionary_id, view_id], |row| row.get(0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Every row must carry the bundle's dictionary id.
fn check_scoping(bundle: &DictionaryBundle) -> Result<(), StoreError> {
    let id = bundle.dictionary.id.as_str();
    let foreign = bundle
        .categories
        .iter()
        .map(|c| c.dictionary_id.as_str())
        .chain(bundle.views.iter().map(|v| v.dictionary_id.as_str()))
        .chain(bundle.lexemes.iter().map(|l| l.dictionary_id.as_str()))
        .chain(bundle.properties.iter().map(|p| p.dictionary_id.as_str()))
        .find(|d| *d != id);
    match foreign {
        Some(other) => Err(StoreError::Constraint(format!(
            "row scoped to dictionary {other} in bundle for {id}"
        ))),
        None => Ok(()),
    }
}

fn insert_bundle(tx: &Connection, bundle: &DictionaryBundle) -> Result<(), StoreError> {
    let dict = &bundle.dictionary;
    tx.execute(
        "INSERT INTO dictionary (id, version, name, summary, authors, additional_info)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            dict.id,
            dict.version,
            dict.name,
            dict.summary,
            dict.authors,
            dict.additional_info
        ],
    )?;

    let mut stmt = tx.prepare_cached(
        "INSERT INTO category (dictionary_id, id, name, widget_type, icon_name, sequence, hidden, sortable)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for c in &bundle.categories {
        stmt.execute(params![
            c.dictionary_id,
            c.id,
            c.name,
            c.widget_type,
            c.icon_name,
            c.sequence,
            c.hidden,
            c.sortable
        ])?;
    }

    let mut stmt =
        tx.prepare_cached("INSERT INTO dictionary_view (dictionary_id, id, name) VALUES (?1, ?2, ?3)")?;
    let mut member_stmt = tx.prepare_cached(
        "INSERT INTO view_category (dictionary_id, view_id, category_id) VALUES (?1, ?2, ?3)",
    )?;
    for v in &bundle.views {
        stmt.execute(params![v.dictionary_id, v.id, v.name])?;
        for category_id in &v.category_ids {
            member_stmt.execute(params![v.dictionary_id, v.id, category_id])?;
        }
    }

    let mut stmt = tx.prepare_cached(
        "INSERT INTO lexeme (dictionary_id, id, form, base_id) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for l in &bundle.lexemes {
        stmt.execute(params![l.dictionary_id, l.id, l.form, l.base_id])?;
    }

    let mut stmt = tx.prepare_cached(
        "INSERT INTO property (dictionary_id, id, lexeme_id, category_id, value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for p in &bundle.properties {
        stmt.execute(params![p.dictionary_id, p.id, p.lexeme_id, p.category_id, p.value])?;
    }
    Ok(())
}
