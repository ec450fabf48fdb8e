//! Stored rows: dictionaries, categories, lexemes, properties, views,
//! bookmarks and history.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type DictionaryId = String;
pub type CategoryId = String;
pub type LexemeId = String;
pub type ViewId = String;

/// View id that admits every lexeme and every non-hidden category.
/// It needs no row in the view table.
pub const SHOW_ALL_VIEW_ID: &str = "all";

/// Sort key meaning "order by form".
pub const DEFAULT_SORT_CATEGORY_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub id: DictionaryId,
    pub version: u32,
    pub name: String,
    pub summary: String,
    pub authors: String,
    pub additional_info: String,
}

impl Dictionary {
    pub fn new(id: &str, version: u32, name: &str) -> Self {
        Self {
            id: id.to_string(),
            version,
            name: name.to_string(),
            summary: String::new(),
            authors: String::new(),
            additional_info: String::new(),
        }
    }
}

/// How a category's raw property values are decoded and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetType {
    Audio,
    Example,
    KeyValue,
    Morphology,
    Plain,
    Reference,
    Url,
    Wordnet,
}

impl WidgetType {
    pub const ALL: [WidgetType; 8] = [
        WidgetType::Audio,
        WidgetType::Example,
        WidgetType::KeyValue,
        WidgetType::Morphology,
        WidgetType::Plain,
        WidgetType::Reference,
        WidgetType::Url,
        WidgetType::Wordnet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetType::Audio => "AUDIO",
            WidgetType::Example => "EXAMPLE",
            WidgetType::KeyValue => "KEY_VALUE",
            WidgetType::Morphology => "MORPHOLOGY",
            WidgetType::Plain => "PLAIN",
            WidgetType::Reference => "REFERENCE",
            WidgetType::Url => "URL",
            WidgetType::Wordnet => "WORDNET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub dictionary_id: DictionaryId,
    pub name: String,
    pub widget_type: WidgetType,
    pub icon_name: String,
    /// Display order within an entry.
    pub sequence: i64,
    /// Hidden categories never make a lexeme part of a view.
    pub hidden: bool,
    pub sortable: bool,
}

impl Category {
    pub fn new(
        dictionary_id: &str,
        id: &str,
        name: &str,
        widget_type: WidgetType,
        sequence: i64,
    ) -> Self {
        Self {
            id: id.to_string(),
            dictionary_id: dictionary_id.to_string(),
            name: name.to_string(),
            widget_type,
            icon_name: String::new(),
            sequence,
            hidden: false,
            sortable: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexeme {
    pub id: LexemeId,
    pub dictionary_id: DictionaryId,
    pub form: String,
    /// Root lexeme of an inflected form. Expected to point at a lexeme
    /// without a base of its own; not enforced by the schema.
    pub base_id: Option<LexemeId>,
}

impl Lexeme {
    pub fn new(dictionary_id: &str, id: &str, form: &str) -> Self {
        Self {
            id: id.to_string(),
            dictionary_id: dictionary_id.to_string(),
            form: form.to_string(),
            base_id: None,
        }
    }

    pub fn with_base(mut self, base_id: &str) -> Self {
        self.base_id = Some(base_id.to_string());
        self
    }
}

/// A property as stored: the value is still in its encoded string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProperty {
    pub id: String,
    pub category_id: CategoryId,
    pub dictionary_id: DictionaryId,
    pub lexeme_id: LexemeId,
    pub value: String,
}

impl RawProperty {
    pub fn new(dictionary_id: &str, id: &str, lexeme_id: &str, category_id: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            category_id: category_id.to_string(),
            dictionary_id: dictionary_id.to_string(),
            lexeme_id: lexeme_id.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWithCategory {
    pub property: RawProperty,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryView {
    pub id: ViewId,
    pub dictionary_id: DictionaryId,
    pub name: String,
    pub category_ids: BTreeSet<CategoryId>,
}

impl DictionaryView {
    pub fn new(dictionary_id: &str, id: &str, name: &str, category_ids: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            dictionary_id: dictionary_id.to_string(),
            name: name.to_string(),
            category_ids: category_ids.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub dictionary_id: DictionaryId,
    pub lexeme_id: LexemeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub dictionary_id: DictionaryId,
    pub lexeme_id: LexemeId,
    pub query: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// The active (dictionary, view, sort) triple a listing is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewConfig {
    pub dictionary_id: DictionaryId,
    pub view_id: ViewId,
    pub sort_category_id: Option<CategoryId>,
}

impl ViewConfig {
    pub fn new(dictionary_id: &str, view_id: &str) -> Self {
        Self {
            dictionary_id: dictionary_id.to_string(),
            view_id: view_id.to_string(),
            sort_category_id: None,
        }
    }

    /// Show-all view, default sort.
    pub fn show_all(dictionary_id: &str) -> Self {
        Self::new(dictionary_id, SHOW_ALL_VIEW_ID)
    }

    pub fn sorted_by(mut self, category_id: &str) -> Self {
        self.sort_category_id = Some(category_id.to_string());
        self
    }

    pub fn is_show_all(&self) -> bool {
        self.view_id == SHOW_ALL_VIEW_ID
    }

    /// Category to sort by, or `None` for the form ordering.
    pub fn sort_category(&self) -> Option<&str> {
        self.sort_category_id
            .as_deref()
            .filter(|id| *id != DEFAULT_SORT_CATEGORY_ID)
    }
}

/// Everything an installer hands over for one dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryBundle {
    pub dictionary: Dictionary,
    pub categories: Vec<Category>,
    pub views: Vec<DictionaryView>,
    pub lexemes: Vec<Lexeme>,
    pub properties: Vec<RawProperty>,
}

impl DictionaryBundle {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary,
            categories: Vec::new(),
            views: Vec::new(),
            lexemes: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn view(mut self, view: DictionaryView) -> Self {
        self.views.push(view);
        self
    }

    pub fn lexeme(mut self, lexeme: Lexeme) -> Self {
        self.lexemes.push(lexeme);
        self
    }

    /// Add a property; its id is derived from the bundle's property count.
    pub fn property(mut self, lexeme_id: &str, category_id: &str, value: &str) -> Self {
        let id = format!("p{}", self.properties.len() + 1);
        let dictionary_id = self.dictionary.id.clone();
        self.properties.push(RawProperty::new(
            &dictionary_id,
            &id,
            lexeme_id,
            category_id,
            value,
        ));
        self
    }
}
