//! View/sort configuration -> ordered lexeme ids.
//!
//! A lexeme belongs to a view when it owns at least one property in a
//! non-hidden category of that view. The show-all view admits every lexeme.
//!
//! Ordering (all comparisons are SQLite BINARY, i.e. case-sensitive ordinal):
//! 1. sort key: the lexeme's smallest value in the sort category, or its
//!    form when it has none (missing values interleave, they are not pushed
//!    to the end). Omitted for the default sort.
//! 2. form
//! 3. smallest `sequence` among the lexeme's visible categories
//! 4. lexeme id


use std::collections::BTreeSet;

use tracing::{debug, debug_span};

use crate::error::{ConfigurationError, QueryError};
use crate::model::{CategoryId, LexemeId, ViewConfig};
use crate::store::Store;

/// Check that every id named by `config` exists and that the sort category
/// is sortable.
pub fn validate(store: &Store, config: &ViewConfig) -> Result<(), QueryError> {
    plan(store, config).map(|_| ())
}

pub fn resolve_order(store: &Store, config: &ViewConfig) -> Result<Vec<LexemeId>, QueryError> {
    let _span = debug_span!(
        "resolve_order",
        dictionary = %config.dictionary_id,
        view = %config.view_id,
        sort = ?config.sort_category()
    )
    .entered();

    let plan = plan(store, config)?;
    if !config.is_show_all() && plan.visible.is_empty() {
        debug!("view has no visible categories");
        return Ok(Vec::new());
    }

    let (sql, params) = compose(config, &plan);
    let ids = store.query_ids(&sql, &params)?;
    debug!(count = ids.len(), "resolved");
    Ok(ids)
}

struct Plan {
    visible: BTreeSet<CategoryId>,
    sort: Option<CategoryId>,
}

fn plan(store: &Store, config: &ViewConfig) -> Result<Plan, QueryError> {
    let dictionary_id = config.dictionary_id.as_str();
    if store.dictionary(dictionary_id)?.is_none() {
        return Err(ConfigurationError::UnknownDictionary(dictionary_id.to_string()).into());
    }

    let categories = store.categories(dictionary_id)?;
    let non_hidden = categories.iter().filter(|c| !c.hidden).map(|c| c.id.clone());
    let visible: BTreeSet<CategoryId> = if config.is_show_all() {
        non_hidden.collect()
    } else {
        let view = store.view(dictionary_id, &config.view_id)?.ok_or_else(|| {
            ConfigurationError::UnknownView {
                dictionary: dictionary_id.to_string(),
                view: config.view_id.clone(),
            }
        })?;
        non_hidden.filter(|id| view.category_ids.contains(id)).collect()
    };

    let sort = match config.sort_category() {
        None => None,
        Some(sort_id) => {
            let category = categories.iter().find(|c| c.id == sort_id).ok_or_else(|| {
                ConfigurationError::UnknownCategory {
                    dictionary: dictionary_id.to_string(),
                    category: sort_id.to_string(),
                }
            })?;
            if !category.sortable {
                return Err(ConfigurationError::NotSortable(sort_id.to_string()).into());
            }
            Some(category.id.clone())
        }
    };

    Ok(Plan { visible, sort })
}

/// Positional parameter list; `bind` returns the `?N` placeholder.
struct Params(Vec<String>);

impl Params {
    fn bind(&mut self, value: &str) -> String {
        self.0.push(value.to_string());
        format!("?{}", self.0.len())
    }
}

fn compose(config: &ViewConfig, plan: &Plan) -> (String, Vec<String>) {
    let mut params = Params(Vec::new());
    let dict = params.bind(&config.dictionary_id);

    let mut sql = String::from("SELECT l.id FROM lexeme l");
    let mut order: Vec<&str> = Vec::new();

    if let Some(sort_id) = &plan.sort {
        let sort = params.bind(sort_id);
        sql.push_str(&format!(
            " LEFT JOIN (SELECT lexeme_id, MIN(value) AS value FROM property
                         WHERE dictionary_id = {dict} AND category_id = {sort}
                         GROUP BY lexeme_id) s ON s.lexeme_id = l.id"
        ));
        order.push("COALESCE(s.value, l.form)");
    }
    order.push("l.form");

    if !plan.visible.is_empty() {
        let placeholders: Vec<String> = plan.visible.iter().map(|id| params.bind(id)).collect();
        let join = if config.is_show_all() { "LEFT JOIN" } else { "JOIN" };
        sql.push_str(&format!(
            " {join} (SELECT p.lexeme_id, MIN(c.sequence) AS seq FROM property p
                      JOIN category c ON c.dictionary_id = p.dictionary_id AND c.id = p.category_id
                      WHERE p.dictionary_id = {dict} AND p.category_id IN ({})
                      GROUP BY p.lexeme_id) m ON m.lexeme_id = l.id",
            placeholders.join(", ")
        ));
        order.push("m.seq");
    }
    order.push("l.id");

    sql.push_str(&format!(" WHERE l.dictionary_id = {dict} ORDER BY {}", order.join(", ")));
    (sql, params.0)
}
