use serde::Serialize;

use crate::decode::Property;
use crate::model::{Bookmark, Category, LexemeId};

/// A fully decoded lexeme as handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryEntry {
    pub id: LexemeId,
    /// The lexeme's form.
    pub representation: String,
    pub base_id: Option<LexemeId>,
    /// Base entry, one hop only: `base.base` is always `None`.
    pub base: Option<Box<DictionaryEntry>>,
    /// Non-empty groups in category display order.
    pub properties: Vec<PropertyGroup>,
    pub bookmark: Option<Bookmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyGroup {
    pub category: Category,
    pub properties: Vec<Property>,
}

impl DictionaryEntry {
    pub fn is_bookmarked(&self) -> bool {
        self.bookmark.is_some()
    }

    pub fn group(&self, category_id: &str) -> Option<&PropertyGroup> {
        self.properties.iter().find(|g| g.category.id == category_id)
    }
}
