//! Builds `DictionaryEntry` values from stored rows.
//!
//! Expansion is bounded two ways:
//! - `base` is expanded one hop; the base's own base is left as an id.
//! - REFERENCE targets are expanded while the remaining depth is positive
//!   and the target is not already on the assembly path. Otherwise the
//!   target becomes a shallow snapshot whose references stay `Pending`.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug_span, warn};

use crate::decode::{decode, DecodeSkip, Property, ReferenceTarget};
use crate::entry::{DictionaryEntry, PropertyGroup};
use crate::error::StoreError;
use crate::model::{Lexeme, LexemeId};
use crate::settings::settings;
use crate::store::Store;

pub struct EntryAssembler {
    store: Arc<Store>,
    max_reference_depth: usize,
}

#[derive(Clone, Copy)]
struct Scope<'a> {
    dictionary_id: &'a str,
    view_id: &'a str,
}

#[derive(Debug, Clone, Copy)]
enum Expand {
    /// Resolve references up to `depth` hops; expand the base if `base`.
    Full { depth: usize, base: bool },
    /// Decode only. References are checked for existence but not loaded.
    Shallow,
}

impl EntryAssembler {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            max_reference_depth: settings().assembly.max_reference_depth,
        }
    }

    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Assemble one entry with the properties visible in `view_id`.
    /// Returns `None` when the lexeme does not exist.
    pub fn assemble(
        &self,
        dictionary_id: &str,
        lexeme_id: &str,
        view_id: &str,
    ) -> Result<Option<DictionaryEntry>, StoreError> {
        let _span = debug_span!(
            "assemble",
            dictionary = dictionary_id,
            lexeme = lexeme_id,
            view = view_id
        )
        .entered();
        let scope = Scope {
            dictionary_id,
            view_id,
        };
        let expand = Expand::Full {
            depth: self.max_reference_depth,
            base: true,
        };
        let mut path = Vec::new();
        self.build(scope, lexeme_id, expand, &mut path)
    }

    fn build(
        &self,
        scope: Scope<'_>,
        lexeme_id: &str,
        expand: Expand,
        path: &mut Vec<LexemeId>,
    ) -> Result<Option<DictionaryEntry>, StoreError> {
        let Some(lexeme) = self.store.lexeme(scope.dictionary_id, lexeme_id)? else {
            return Ok(None);
        };
        path.push(lexeme.id.clone());
        let entry = self.build_lexeme(scope, lexeme, expand, path);
        path.pop();
        entry.map(Some)
    }

    fn build_lexeme(
        &self,
        scope: Scope<'_>,
        lexeme: Lexeme,
        expand: Expand,
        path: &mut Vec<LexemeId>,
    ) -> Result<DictionaryEntry, StoreError> {
        let rows = self
            .store
            .properties_for_lexeme(scope.dictionary_id, &lexeme.id, scope.view_id)?;

        // Rows arrive in category order, so groups are runs of one category.
        let mut groups: Vec<PropertyGroup> = Vec::new();
        for row in rows {
            let decoded = match decode(row.category.widget_type, &row.property.value) {
                Ok(property) => self.resolve_reference(scope, property, expand, path)?,
                Err(skip) => Err(skip),
            };
            let property = match decoded {
                Ok(property) => property,
                Err(skip) => {
                    warn!(
                        lexeme = %lexeme.id,
                        property = %row.property.id,
                        category = %row.category.id,
                        ?skip,
                        "property skipped"
                    );
                    continue;
                }
            };
            match groups.last_mut() {
                Some(group) if group.category.id == row.category.id => {
                    group.properties.push(property)
                }
                _ => groups.push(PropertyGroup {
                    category: row.category,
                    properties: vec![property],
                }),
            }
        }

        let base = match (expand, lexeme.base_id.as_deref()) {
            (Expand::Full { depth, base: true }, Some(base_id)) if base_id != lexeme.id => self
                .build(scope, base_id, Expand::Full { depth, base: false }, path)?
                .map(Box::new),
            _ => None,
        };
        let bookmark = self.store.bookmark(scope.dictionary_id, &lexeme.id)?;

        Ok(DictionaryEntry {
            id: lexeme.id,
            representation: lexeme.form,
            base_id: lexeme.base_id,
            base,
            properties: groups,
            bookmark,
        })
    }

    fn resolve_reference(
        &self,
        scope: Scope<'_>,
        property: Property,
        expand: Expand,
        path: &mut Vec<LexemeId>,
    ) -> Result<Result<Property, DecodeSkip>, StoreError> {
        let (name, target_id) = match property {
            Property::Reference {
                name,
                target: ReferenceTarget::Pending(target_id),
            } => (name, target_id),
            other => return Ok(Ok(other)),
        };

        let target = match expand {
            Expand::Shallow => {
                if !self.store.lexeme_exists(scope.dictionary_id, &target_id)? {
                    return Ok(Err(DecodeSkip::MissingReferenceTarget));
                }
                ReferenceTarget::Pending(target_id)
            }
            Expand::Full { depth, .. } => {
                let next = if depth > 0 && !path.contains(&target_id) {
                    Expand::Full {
                        depth: depth - 1,
                        base: true,
                    }
                } else {
                    Expand::Shallow
                };
                match self.build(scope, &target_id, next, path)? {
                    Some(entry) => ReferenceTarget::Resolved(Box::new(entry)),
                    None => return Ok(Err(DecodeSkip::MissingReferenceTarget)),
                }
            }
        };
        Ok(Ok(Property::Reference { name, target }))
    }
}
