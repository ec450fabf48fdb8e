
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use lexis_core::resolver::validate;
use lexis_core::settings::settings;
use lexis_core::store::InstallOutcome;
use lexis_core::{
    ConfigurationError, DictionaryBundle, DictionaryEntry, EntryAssembler, HistoryRecord,
    LexemeId, OrderingCache, Store, ViewConfig, ViewPreferences,
};
use lexis_session::{PageLoad, Pager};
use tracing::{debug, debug_span, warn};

use crate::async_worker::{RefreshResult, RefreshWorker};
use crate::error::EngineError;

pub struct LexisEngine {
    store: Arc<Store>,
    assembler: Arc<EntryAssembler>,
    cache: Arc<OrderingCache>,
    /// Created on the first `open_dictionary` and reconfigured afterwards.
    pager: RwLock<Option<Arc<Pager>>>,
    preferences: Mutex<ViewPreferences>,
    preferences_path: Option<PathBuf>,
    worker: RefreshWorker,
}

impl LexisEngine {
    /// Open the database at `db_path` and the view preferences file at
    /// `preferences_path` (missing file = no saved selections).
    pub fn open(db_path: &Path, preferences_path: &Path) -> Result<Self, EngineError> {
        let store = Arc::new(Store::open(db_path)?);
        Self::from_store(store, Some(preferences_path.to_path_buf()))
    }

    /// Wrap an existing store. Without a path, preferences live in memory.
    pub fn from_store(
        store: Arc<Store>,
        preferences_path: Option<PathBuf>,
    ) -> Result<Self, EngineError> {
        let preferences = match &preferences_path {
            Some(path) => ViewPreferences::open(path)?,
            None => ViewPreferences::new(),
        };
        Ok(Self {
            assembler: Arc::new(EntryAssembler::new(Arc::clone(&store))),
            cache: Arc::new(OrderingCache::new(Arc::clone(&store))),
            store,
            pager: RwLock::new(None),
            preferences: Mutex::new(preferences),
            preferences_path,
            worker: RefreshWorker::spawn()?,
        })
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Dictionaries and configuration
    // -----------------------------------------------------------------------

    /// Install (or upgrade) a dictionary. An upgrade of the open dictionary
    /// schedules a refresh of its ordering; a selection the new version no
    /// longer supports falls back to show-all.
    pub fn install(&self, bundle: &DictionaryBundle) -> Result<InstallOutcome, EngineError> {
        let outcome = self.store.install(bundle)?;
        if let Some(config) = self.active_config()? {
            if config.dictionary_id == bundle.dictionary.id {
                // The new version may have dropped the active view or sort.
                self.submit_config(self.usable_or_show_all(config))?;
            }
        }
        Ok(outcome)
    }

    /// Remove a dictionary and its saved selection. Closes it if open.
    pub fn uninstall(&self, dictionary_id: &str) -> Result<bool, EngineError> {
        let removed = self.store.uninstall(dictionary_id)?;
        let was_active = self
            .active_config()?
            .is_some_and(|c| c.dictionary_id == dictionary_id);
        if was_active {
            self.cache.clear()?;
            *self.pager.write().map_err(|_| EngineError::Poisoned)? = None;
        }
        let mut prefs = self.lock_preferences()?;
        if prefs.remove(dictionary_id).is_some() {
            self.save_preferences(&prefs)?;
        }
        Ok(removed)
    }

    /// Make `dictionary_id` the active dictionary with its saved view and
    /// sort. A saved selection that no longer validates falls back to
    /// show-all. The ordering is rebuilt in the background; returns the
    /// configuration being applied.
    pub fn open_dictionary(&self, dictionary_id: &str) -> Result<ViewConfig, EngineError> {
        let _span = debug_span!("open_dictionary", dictionary = dictionary_id).entered();
        if self.store.dictionary(dictionary_id)?.is_none() {
            return Err(ConfigurationError::UnknownDictionary(dictionary_id.to_string()).into());
        }
        let saved = self.lock_preferences()?.get_or_default(dictionary_id);
        let config = self.usable_or_show_all(saved);
        self.submit_config(config.clone())?;
        Ok(config)
    }

    pub fn active_config(&self) -> Result<Option<ViewConfig>, EngineError> {
        match self.current_pager()? {
            Some(pager) => Ok(Some(pager.config()?)),
            None => Ok(None),
        }
    }

    /// Switch the active dictionary's view, keeping its sort.
    pub fn set_view(&self, view_id: &str) -> Result<u64, EngineError> {
        let mut config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        config.view_id = view_id.to_string();
        self.submit_config(config)
    }

    /// Switch the active dictionary's sort category; `None` sorts by form.
    pub fn set_sort(&self, sort_category_id: Option<&str>) -> Result<u64, EngineError> {
        let mut config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        config.sort_category_id = sort_category_id.map(str::to_string);
        self.submit_config(config)
    }

    /// Validate `config`, remember it for its dictionary and schedule a
    /// background refresh. Returns the pager generation of the request.
    pub fn submit_config(&self, config: ViewConfig) -> Result<u64, EngineError> {
        validate(&self.store, &config)?;
        {
            let mut prefs = self.lock_preferences()?;
            prefs.set(config.clone());
            self.save_preferences(&prefs)?;
        }
        self.apply(config)
    }

    /// Next finished background refresh, if any.
    pub fn try_recv_refresh(&self) -> Option<RefreshResult> {
        self.worker.try_recv()
    }

    /// `config` if it still validates against the store, else show-all
    /// for the same dictionary.
    fn usable_or_show_all(&self, config: ViewConfig) -> ViewConfig {
        match validate(&self.store, &config) {
            Ok(()) => config,
            Err(e) => {
                warn!(
                    dictionary = %config.dictionary_id,
                    view = %config.view_id,
                    error = %e,
                    "selection no longer valid, using show-all"
                );
                ViewConfig::show_all(&config.dictionary_id)
            }
        }
    }

    fn apply(&self, config: ViewConfig) -> Result<u64, EngineError> {
        let mut slot = self.pager.write().map_err(|_| EngineError::Poisoned)?;
        let pager = match slot.as_ref() {
            Some(pager) => Arc::clone(pager),
            None => {
                let pager = Arc::new(Pager::new(
                    Arc::clone(&self.cache),
                    Arc::clone(&self.assembler),
                    config.clone(),
                    settings().paging.page_size,
                ));
                *slot = Some(Arc::clone(&pager));
                pager
            }
        };
        drop(slot);

        let generation = pager.begin_reconfigure(config)?;
        self.worker.submit(pager, generation);
        debug!(generation, "refresh submitted");
        Ok(generation)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Page of the active listing. Waits for a pending refresh.
    pub fn load_page(&self, key: Option<i64>) -> Result<PageLoad, EngineError> {
        Ok(self.active_pager()?.load(key)?)
    }

    pub fn pager(&self) -> Result<Arc<Pager>, EngineError> {
        self.active_pager()
    }

    /// Assemble one entry in the active view and record the lookup in
    /// history under `query`.
    pub fn entry(
        &self,
        lexeme_id: &str,
        query: &str,
    ) -> Result<Option<DictionaryEntry>, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        let entry = self
            .assembler
            .assemble(&config.dictionary_id, lexeme_id, &config.view_id)?;
        if entry.is_some() {
            self.store
                .record_history(&config.dictionary_id, lexeme_id, query)?;
        }
        Ok(entry)
    }

    /// Entries whose form or any property contains `text`, ignoring case.
    pub fn search(&self, text: &str) -> Result<Vec<DictionaryEntry>, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        let ids = self.store.find_lexemes_by_text(&config.dictionary_id, text)?;
        self.assemble_capped(&config, ids)
    }

    /// Entries with a property in `category_id` containing `text`.
    pub fn search_in_category(
        &self,
        category_id: &str,
        text: &str,
    ) -> Result<Vec<DictionaryEntry>, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        let ids = self
            .store
            .find_lexemes_by_category_value(&config.dictionary_id, category_id, text)?;
        self.assemble_capped(&config, ids)
    }

    fn assemble_capped(
        &self,
        config: &ViewConfig,
        ids: Vec<LexemeId>,
    ) -> Result<Vec<DictionaryEntry>, EngineError> {
        let max = settings().search.max_results;
        let mut entries = Vec::with_capacity(ids.len().min(max));
        for id in ids.iter().take(max) {
            if let Some(entry) =
                self.assembler
                    .assemble(&config.dictionary_id, id, &config.view_id)?
            {
                entries.push(entry);
            }
        }
        debug!(found = ids.len(), returned = entries.len(), "search");
        Ok(entries)
    }

    /// Flip the bookmark on a lexeme of the active dictionary. Returns
    /// whether it is bookmarked afterwards.
    pub fn toggle_bookmark(&self, lexeme_id: &str) -> Result<bool, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        let dictionary_id = config.dictionary_id.as_str();
        if self.store.remove_bookmark(dictionary_id, lexeme_id)? {
            return Ok(false);
        }
        self.store.add_bookmark(dictionary_id, lexeme_id)?;
        Ok(true)
    }

    pub fn bookmarks(&self) -> Result<Vec<DictionaryEntry>, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        let ids = self.store.bookmarks(&config.dictionary_id)?;
        let mut entries = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(entry) =
                self.assembler
                    .assemble(&config.dictionary_id, id, &config.view_id)?
            {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<HistoryRecord>, EngineError> {
        let config = self.active_config()?.ok_or(EngineError::NoActiveDictionary)?;
        Ok(self.store.history(&config.dictionary_id, limit)?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn current_pager(&self) -> Result<Option<Arc<Pager>>, EngineError> {
        let slot = self.pager.read().map_err(|_| EngineError::Poisoned)?;
        Ok(slot.as_ref().map(Arc::clone))
    }

    fn active_pager(&self) -> Result<Arc<Pager>, EngineError> {
        self.current_pager()?.ok_or(EngineError::NoActiveDictionary)
    }

    fn lock_preferences(&self) -> Result<MutexGuard<'_, ViewPreferences>, EngineError> {
        self.preferences.lock().map_err(|_| EngineError::Poisoned)
    }

    fn save_preferences(&self, prefs: &ViewPreferences) -> Result<(), EngineError> {
        if let Some(path) = &self.preferences_path {
            prefs.save(path)?;
        }
        Ok(())
    }
}
