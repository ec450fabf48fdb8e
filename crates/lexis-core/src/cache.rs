//! Position-indexed snapshot of a resolved ordering.
//!
//! Rows live in the store's `lexeme_order` table so that a refresh is one
//! transaction: readers see the previous snapshot until it commits. One
//! refresh runs at a time; a failed refresh leaves the last good snapshot
//! in place.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, debug_span, warn};

use crate::error::{QueryError, StoreError};
use crate::model::{LexemeId, ViewConfig};
use crate::resolver::resolve_order;
use crate::store::Store;

/// Which configuration the cache currently holds, and how many rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub config: ViewConfig,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new ordering was committed with this many rows.
    Applied(usize),
    /// The configuration went stale before commit; nothing changed.
    Superseded,
}

pub struct OrderingCache {
    store: Arc<Store>,
    refresh_lock: Mutex<()>,
    snapshot: RwLock<Option<CacheSnapshot>>,
}

impl OrderingCache {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            refresh_lock: Mutex::new(()),
            snapshot: RwLock::new(None),
        }
    }

    /// Resolve `config` and replace the cached ordering with it.
    pub fn refresh(&self, config: &ViewConfig) -> Result<usize, QueryError> {
        match self.refresh_if(config, || true)? {
            RefreshOutcome::Applied(n) => Ok(n),
            // `is_current` always holds
            RefreshOutcome::Superseded => Ok(0),
        }
    }

    /// Like `refresh`, but commits only while `is_current()` holds.
    ///
    /// `is_current` is checked after resolving and again inside the write
    /// transaction, so a superseded refresh never becomes visible.
    pub fn refresh_if(
        &self,
        config: &ViewConfig,
        is_current: impl Fn() -> bool,
    ) -> Result<RefreshOutcome, QueryError> {
        let _span = debug_span!(
            "cache_refresh",
            dictionary = %config.dictionary_id,
            view = %config.view_id,
            sort = ?config.sort_category()
        )
        .entered();

        let _guard = self.refresh_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if !is_current() {
            debug!("superseded before resolve");
            return Ok(RefreshOutcome::Superseded);
        }

        let ids = resolve_order(&self.store, config).inspect_err(|e| {
            warn!(error = %e, "resolve failed, keeping previous ordering");
        })?;
        if !is_current() {
            debug!("superseded after resolve");
            return Ok(RefreshOutcome::Superseded);
        }

        let len = ids.len();
        if !self.store.replace_order_if(&ids, &is_current)? {
            debug!("superseded before commit");
            return Ok(RefreshOutcome::Superseded);
        }

        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::Poisoned)?;
        *snapshot = Some(CacheSnapshot {
            config: config.clone(),
            len,
        });
        debug!(len, "applied");
        Ok(RefreshOutcome::Applied(len))
    }

    /// Up to `count` ids starting at 1-based position `from`. Out-of-range
    /// positions yield fewer (or zero) ids, never an error.
    pub fn get_range(&self, count: usize, from: i64) -> Result<Vec<LexemeId>, StoreError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.store.order_range(count, from)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.refresh_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.store.clear_order()?;
        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::Poisoned)?;
        *snapshot = None;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.store.order_len()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn snapshot(&self) -> Option<CacheSnapshot> {
        self.snapshot.read().ok().and_then(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::error::ConfigurationError;
    use crate::testutil::{sample_store, two_word_bundle, DICT};

    #[test]
    fn two_words_by_position() {
        let store = Store::open_in_memory().unwrap();
        store.install(&two_word_bundle()).unwrap();
        let cache = OrderingCache::new(Arc::new(store));

        assert_eq!(cache.refresh(&ViewConfig::show_all(DICT)).unwrap(), 2);
        assert_eq!(cache.get_range(1, 1).unwrap(), vec!["lex_a"]);
        assert_eq!(cache.get_range(1, 2).unwrap(), vec!["lex_b"]);
        assert!(cache.get_range(1, 3).unwrap().is_empty());
        assert!(cache.get_range(5, -3).unwrap().is_empty());
        assert_eq!(cache.get_range(5, -2).unwrap(), vec!["lex_a", "lex_b"]);
    }

    #[test]
    fn refresh_replaces_whole_ordering() {
        let cache = OrderingCache::new(sample_store());
        cache.refresh(&ViewConfig::show_all(DICT)).unwrap();
        assert_eq!(cache.len().unwrap(), 7);

        let media = ViewConfig::new(DICT, "media");
        assert_eq!(cache.refresh(&media).unwrap(), 2);
        assert_eq!(cache.get_range(10, 1).unwrap(), vec!["lex_a", "lex_d"]);
        assert_eq!(
            cache.snapshot(),
            Some(CacheSnapshot {
                config: media,
                len: 2
            })
        );
    }

    #[test]
    fn failed_refresh_keeps_last_good_state() {
        let cache = OrderingCache::new(sample_store());
        let good = ViewConfig::new(DICT, "basic");
        cache.refresh(&good).unwrap();

        let err = cache
            .refresh(&ViewConfig::show_all(DICT).sorted_by("audio"))
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Configuration(ConfigurationError::NotSortable(_))
        ));
        assert_eq!(cache.len().unwrap(), 4);
        assert_eq!(cache.snapshot().unwrap().config, good);
    }

    #[test]
    fn superseded_refresh_is_not_applied() {
        let cache = OrderingCache::new(sample_store());
        cache.refresh(&ViewConfig::new(DICT, "media")).unwrap();

        // Stale from the start.
        let outcome = cache
            .refresh_if(&ViewConfig::show_all(DICT), || false)
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Superseded);

        // Goes stale between resolve and commit.
        let checks = AtomicUsize::new(0);
        let outcome = cache
            .refresh_if(&ViewConfig::show_all(DICT), || {
                checks.fetch_add(1, Ordering::SeqCst) < 2
            })
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Superseded);

        assert_eq!(cache.get_range(10, 1).unwrap(), vec!["lex_a", "lex_d"]);
        assert_eq!(cache.snapshot().unwrap().config.view_id, "media");
    }

    #[test]
    fn clear_empties_cache() {
        let cache = OrderingCache::new(sample_store());
        cache.refresh(&ViewConfig::show_all(DICT)).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
        assert!(cache.snapshot().is_none());
        assert!(cache.get_range(3, 1).unwrap().is_empty());
    }

    #[test]
    fn readers_never_see_partial_refresh() {
        let cache = Arc::new(OrderingCache::new(sample_store()));
        let all = ViewConfig::show_all(DICT);
        let media = ViewConfig::new(DICT, "media");
        cache.refresh(&all).unwrap();

        std::thread::scope(|s| {
            let writer = Arc::clone(&cache);
            s.spawn(move || {
                for i in 0..20 {
                    let config = if i % 2 == 0 { &media } else { &all };
                    writer.refresh(config).unwrap();
                }
            });
            for _ in 0..200 {
                let rows = cache.get_range(100, 1).unwrap();
                assert!(rows.len() == 7 || rows.len() == 2, "partial read: {rows:?}");
            }
        });
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn consecutive_ranges_partition_the_order(count in 1usize..9) {
            let store = sample_store();
            let config = ViewConfig::show_all(DICT).sorted_by("trans");
            let expected = resolve_order(&store, &config).unwrap();
            let cache = OrderingCache::new(store);
            cache.refresh(&config).unwrap();

            let mut seen = Vec::new();
            let mut pos = 1_i64;
            loop {
                let page = cache.get_range(count, pos).unwrap();
                if page.is_empty() {
                    break;
                }
                prop_assert!(page.len() <= count);
                pos += page.len() as i64;
                seen.extend(page);
            }
            prop_assert_eq!(seen, expected);
        }
    }
}
