use std::collections::BTreeSet;

use rusqlite::params_from_iter;

use super::{category_from_row, Store, CATEGORY_COLUMNS, FOLD_CASE_FN};
use crate::error::StoreError;
use crate::model::{CategoryId, LexemeId, PropertyWithCategory, RawProperty, SHOW_ALL_VIEW_ID};

impl Store {
    /// Lexemes whose form or any property value contains `needle`,
    /// ignoring case. Ordered by form, then id.
    pub fn find_lexemes_by_text(
        &self,
        dictionary_id: &str,
        needle: &str,
    ) -> Result<Vec<LexemeId>, StoreError> {
        let needle = needle.to_lowercase();
        self.query_ids(
            &format!(
                "SELECT l.id FROM lexeme l
                 WHERE l.dictionary_id = ?1
                   AND (instr({FOLD_CASE_FN}(l.form), ?2) > 0
                        OR EXISTS (SELECT 1 FROM property p
                                   WHERE p.dictionary_id = l.dictionary_id
                                     AND p.lexeme_id = l.id
                                     AND instr({FOLD_CASE_FN}(p.value), ?2) > 0))
                 ORDER BY l.form, l.id"
            ),
            &[dictionary_id.to_string(), needle],
        )
    }

    /// Lexemes owning a property in `category_id` whose value contains
    /// `needle`, ignoring case. Ordered by form, then id.
    pub fn find_lexemes_by_category_value(
        &self,
        dictionary_id: &str,
        category_id: &str,
        needle: &str,
    ) -> Result<Vec<LexemeId>, StoreError> {
        let needle = needle.to_lowercase();
        self.query_ids(
            &format!(
                "SELECT l.id FROM lexeme l
                 WHERE l.dictionary_id = ?1
                   AND EXISTS (SELECT 1 FROM property p
                               WHERE p.dictionary_id = l.dictionary_id
                                 AND p.lexeme_id = l.id
                                 AND p.category_id = ?2
                                 AND instr({FOLD_CASE_FN}(p.value), ?3) > 0)
                 ORDER BY l.form, l.id"
            ),
            &[dictionary_id.to_string(), category_id.to_string(), needle],
        )
    }

    /// Category ids listed by a view, hidden ones included.
    pub fn category_view_membership(
        &self,
        dictionary_id: &str,
        view_id: &str,
    ) -> Result<BTreeSet<CategoryId>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT category_id FROM view_category WHERE dictionary_id = ?1 AND view_id = ?2",
            )?;
            let rows = stmt.query_map([dictionary_id, view_id], |row| row.get(0))?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    /// Properties of one lexeme in non-hidden categories of the view, in
    /// category display order.
    pub fn properties_for_lexeme(
        &self,
        dictionary_id: &str,
        lexeme_id: &str,
        view_id: &str,
    ) -> Result<Vec<PropertyWithCategory>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT p.id, p.value, {CATEGORY_COLUMNS}
                 FROM property p
                 JOIN category c ON c.dictionary_id = p.dictionary_id AND c.id = p.category_id
                 WHERE p.dictionary_id = ?1 AND p.lexeme_id = ?2 AND c.hidden = 0
                   AND (?3 = ?4 OR EXISTS (SELECT 1 FROM view_category vc
                                           WHERE vc.dictionary_id = p.dictionary_id
                                             AND vc.view_id = ?3
                                             AND vc.category_id = p.category_id))
                 ORDER BY c.sequence, c.id, p.rowid"
            ))?;
            let rows = stmt.query_map(
                [dictionary_id, lexeme_id, view_id, SHOW_ALL_VIEW_ID],
                |row| {
                    let category = category_from_row(row, 2)?;
                    Ok(PropertyWithCategory {
                        property: RawProperty {
                            id: row.get(0)?,
                            category_id: category.id.clone(),
                            dictionary_id: dictionary_id.to_string(),
                            lexeme_id: lexeme_id.to_string(),
                            value: row.get(1)?,
                        },
                        category,
                    })
                },
            )?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    /// Run a composed id query. The first column of every row is a lexeme id.
    pub(crate) fn query_ids(&self, sql: &str, params: &[String]) -> Result<Vec<LexemeId>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get(0))?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }
}
