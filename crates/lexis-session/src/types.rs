use lexis_core::{DictionaryEntry, QueryError, StoreError};

/// Lifecycle of the ordering behind a pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// No ordering yet, or the last refresh failed.
    Uninitialized,
    /// A refresh for the current generation is pending or running.
    Refreshing,
    Ready,
}

/// One page of assembled entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<DictionaryEntry>,
    /// Key of the previous page; `None` on the first page.
    pub prev_key: Option<i64>,
    /// Key of the next page; `None` once the ordering is exhausted.
    pub next_key: Option<i64>,
    /// Generation the page was read under.
    pub generation: u64,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_key.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageLoad {
    Page(Page),
    /// The configuration changed while the page was being read.
    Invalid,
}

#[derive(Debug, thiserror::Error)]
pub enum PagingError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration changed while iterating pages")]
    Superseded,

    #[error("pager state lock poisoned")]
    Poisoned,
}
