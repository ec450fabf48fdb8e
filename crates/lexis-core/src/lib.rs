//! Dictionary entry storage, ordering and decoding.
//!
//! The store holds installed dictionaries in SQLite. The resolver turns a
//! view/sort configuration into an ordered list of lexeme ids, the ordering
//! cache snapshots that list for positional paging, and the assembler decodes
//! stored properties into typed `DictionaryEntry` values.

pub mod assembler;
pub mod cache;
pub mod decode;
pub mod entry;
pub mod error;
pub mod model;
pub mod preferences;
pub mod resolver;
pub mod settings;
pub mod store;
#[cfg(test)]
pub(crate) mod testutil;

pub use assembler::EntryAssembler;
pub use cache::{CacheSnapshot, OrderingCache, RefreshOutcome};
pub use decode::{decode, DecodeSkip, Property, ReferenceTarget};
pub use entry::{DictionaryEntry, PropertyGroup};
pub use error::{ConfigurationError, QueryError, StoreError};
pub use preferences::ViewPreferences;
pub use model::{
    Bookmark, Category, CategoryId, Dictionary, DictionaryBundle, DictionaryId, DictionaryView,
    HistoryRecord, Lexeme, LexemeId, PropertyWithCategory, RawProperty, ViewConfig, ViewId,
    WidgetType, DEFAULT_SORT_CATEGORY_ID, SHOW_ALL_VIEW_ID,
};
pub use resolver::resolve_order;
pub use store::Store;
