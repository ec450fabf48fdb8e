//! Key-based paging over the ordering cache.
//!
//! `Pager` owns the active view configuration. Every configuration change
//! bumps a generation counter; refreshes and page loads tagged with an older
//! generation are discarded instead of mixing two orderings. Loads issued
//! while a refresh is running wait for it to finish.

mod types;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock};

use lexis_core::{
    DictionaryEntry, EntryAssembler, LexemeId, OrderingCache, RefreshOutcome, StoreError,
    ViewConfig,
};
use tracing::{debug, debug_span, warn};

pub use types::{Page, PageLoad, PagerState, PagingError};

pub const FIRST_PAGE_KEY: i64 = 1;

pub struct Pager {
    cache: Arc<OrderingCache>,
    assembler: Arc<EntryAssembler>,
    config: RwLock<ViewConfig>,
    generation: AtomicU64,
    state: Mutex<PagerState>,
    /// Signalled whenever `state` leaves `Refreshing`.
    settled: Condvar,
    page_size: usize,
    applied_refreshes: AtomicU64,
}

impl Pager {
    /// Create an uninitialized pager; the first load refreshes the cache.
    pub fn new(
        cache: Arc<OrderingCache>,
        assembler: Arc<EntryAssembler>,
        config: ViewConfig,
        page_size: usize,
    ) -> Self {
        Self {
            cache,
            assembler,
            config: RwLock::new(config),
            generation: AtomicU64::new(0),
            state: Mutex::new(PagerState::Uninitialized),
            settled: Condvar::new(),
            page_size: page_size.max(1),
            applied_refreshes: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> Result<ViewConfig, PagingError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| PagingError::Poisoned)
    }

    pub fn state(&self) -> Result<PagerState, PagingError> {
        Ok(*self.lock_state()?)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of refreshes that were committed to the cache.
    pub fn applied_refreshes(&self) -> u64 {
        self.applied_refreshes.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Configuration changes
    // -----------------------------------------------------------------------

    /// Switch to `config` and invalidate everything in flight.
    ///
    /// Returns the new generation. The cache still holds the previous
    /// ordering until `complete_refresh` runs for this generation; loads
    /// block in the meantime.
    pub fn begin_reconfigure(&self, config: ViewConfig) -> Result<u64, PagingError> {
        let mut state = self.lock_state()?;
        {
            let mut current = self.config.write().map_err(|_| PagingError::Poisoned)?;
            *current = config;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = PagerState::Refreshing;
        debug!(generation, "reconfigure");
        Ok(generation)
    }

    /// Rebuild the cache for `generation`.
    ///
    /// Returns `Superseded` without touching the cache when a newer
    /// configuration has been requested. On failure the pager goes back to
    /// `Uninitialized` and the cache keeps its last good ordering.
    pub fn complete_refresh(&self, generation: u64) -> Result<RefreshOutcome, PagingError> {
        let _span = debug_span!("complete_refresh", generation).entered();
        if !self.is_current(generation) {
            debug!("stale before start");
            return Ok(RefreshOutcome::Superseded);
        }
        let config = self.config()?;
        let result = self
            .cache
            .refresh_if(&config, || self.is_current(generation));

        let mut state = self.lock_state()?;
        match result {
            Ok(RefreshOutcome::Applied(len)) => {
                self.applied_refreshes.fetch_add(1, Ordering::SeqCst);
                if self.is_current(generation) {
                    *state = PagerState::Ready;
                    self.settled.notify_all();
                }
                debug!(len, "ready");
                Ok(RefreshOutcome::Applied(len))
            }
            // A newer generation owns the state now.
            Ok(RefreshOutcome::Superseded) => Ok(RefreshOutcome::Superseded),
            Err(e) => {
                warn!(error = %e, "refresh failed");
                if self.is_current(generation) {
                    *state = PagerState::Uninitialized;
                    self.settled.notify_all();
                }
                Err(e.into())
            }
        }
    }

    /// Switch to `config` and rebuild the cache on the calling thread.
    pub fn reconfigure(&self, config: ViewConfig) -> Result<RefreshOutcome, PagingError> {
        let generation = self.begin_reconfigure(config)?;
        self.complete_refresh(generation)
    }

    /// Re-resolve the current configuration, e.g. after the store changed.
    pub fn refresh(&self) -> Result<RefreshOutcome, PagingError> {
        self.reconfigure(self.config()?)
    }

    // -----------------------------------------------------------------------
    // Page loads
    // -----------------------------------------------------------------------

    /// Load the page at `key` (default `FIRST_PAGE_KEY`) with the
    /// configured page size.
    pub fn load(&self, key: Option<i64>) -> Result<PageLoad, PagingError> {
        self.load_sized(key, self.page_size)
    }

    pub fn load_sized(&self, key: Option<i64>, count: usize) -> Result<PageLoad, PagingError> {
        let generation = self.settle()?;
        let config = self.config()?;
        self.fetch(generation, &config, key.unwrap_or(FIRST_PAGE_KEY).max(1), count)
    }

    /// Iterate pages from the first one until the ordering is exhausted.
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            pager: self,
            next: Some(FIRST_PAGE_KEY),
            generation: None,
        }
    }

    /// Wait until the cache holds the current configuration, refreshing it
    /// here if nobody else is. Returns the generation that is ready.
    fn settle(&self) -> Result<u64, PagingError> {
        let mut state = self.lock_state()?;
        loop {
            match *state {
                PagerState::Ready => return Ok(self.generation()),
                PagerState::Refreshing => {
                    state = self.settled.wait(state).map_err(|_| PagingError::Poisoned)?;
                }
                PagerState::Uninitialized => {
                    *state = PagerState::Refreshing;
                    let generation = self.generation();
                    drop(state);
                    self.complete_refresh(generation)?;
                    state = self.lock_state()?;
                }
            }
        }
    }

    fn fetch(
        &self,
        generation: u64,
        config: &ViewConfig,
        position: i64,
        count: usize,
    ) -> Result<PageLoad, PagingError> {
        let _span = debug_span!("load_page", generation, position, count).entered();
        let ids = self.cache.get_range(count, position)?;
        if !self.is_current(generation) {
            debug!("invalidated before assembly");
            return Ok(PageLoad::Invalid);
        }

        let items = self.assemble_all(config, &ids)?;
        if !self.is_current(generation) {
            debug!("invalidated during assembly");
            return Ok(PageLoad::Invalid);
        }

        let step = i64::try_from(count).unwrap_or(i64::MAX);
        let prev_key = (position > FIRST_PAGE_KEY)
            .then(|| position.saturating_sub(step).max(FIRST_PAGE_KEY));
        let next_key = (!ids.is_empty()).then(|| position.saturating_add(step));
        debug!(items = items.len(), skipped = ids.len() - items.len(), "loaded");
        Ok(PageLoad::Page(Page {
            items,
            prev_key,
            next_key,
            generation,
        }))
    }

    /// Lexemes deleted since the refresh are left out of the page. Store
    /// failures abort the load.
    fn assemble_all(
        &self,
        config: &ViewConfig,
        ids: &[LexemeId],
    ) -> Result<Vec<DictionaryEntry>, StoreError> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            match self
                .assembler
                .assemble(&config.dictionary_id, id, &config.view_id)
            {
                Ok(Some(entry)) => items.push(entry),
                Ok(None) => debug!(lexeme = %id, "lexeme vanished since refresh"),
                Err(e) => {
                    warn!(lexeme = %id, error = %e, "page load failed");
                    return Err(e);
                }
            }
        }
        Ok(items)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, PagerState>, PagingError> {
        self.state.lock().map_err(|_| PagingError::Poisoned)
    }
}

/// Iterator over successive pages. Yields `PagingError::Superseded` and
/// stops if the configuration changes between pages.
pub struct Pages<'a> {
    pager: &'a Pager,
    next: Option<i64>,
    generation: Option<u64>,
}

impl Iterator for Pages<'_> {
    type Item = Result<Page, PagingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next.take()?;
        let page = match self.pager.load(Some(key)) {
            Ok(PageLoad::Page(page)) => page,
            Ok(PageLoad::Invalid) => return Some(Err(PagingError::Superseded)),
            Err(e) => return Some(Err(e)),
        };
        if *self.generation.get_or_insert(page.generation) != page.generation {
            return Some(Err(PagingError::Superseded));
        }
        if page.items.is_empty() && page.is_last() {
            return None;
        }
        self.next = page.next_key;
        Some(Ok(page))
    }
}
