//! Per-dictionary view and sort selection.
//!
//! Stored as `LXVP` + version byte + bincode list of `ViewConfig`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::model::{DictionaryId, ViewConfig};

const MAGIC: &[u8; 4] = b"LXVP";
const VERSION: u8 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewPreferences {
    configs: HashMap<DictionaryId, ViewConfig>,
}

impl ViewPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dictionary_id: &str) -> Option<&ViewConfig> {
        self.configs.get(dictionary_id)
    }

    /// Saved selection, or show-all with the default sort.
    pub fn get_or_default(&self, dictionary_id: &str) -> ViewConfig {
        self.get(dictionary_id)
            .cloned()
            .unwrap_or_else(|| ViewConfig::show_all(dictionary_id))
    }

    /// Store `config` under its own dictionary id.
    pub fn set(&mut self, config: ViewConfig) {
        self.configs.insert(config.dictionary_id.clone(), config);
    }

    pub fn remove(&mut self, dictionary_id: &str) -> Option<ViewConfig> {
        self.configs.remove(dictionary_id)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, io::Error> {
        let mut records: Vec<&ViewConfig> = self.configs.values().collect();
        records.sort_by(|a, b| a.dictionary_id.cmp(&b.dictionary_id));

        let body = bincode::serialize(&records).map_err(io::Error::other)?;
        let mut buf = Vec::with_capacity(5 + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, io::Error> {
        if bytes.len() < 5 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "too short"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bad magic"));
        }
        if bytes[4] != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unsupported version",
            ));
        }
        let records: Vec<ViewConfig> = bincode::deserialize(&bytes[5..])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut prefs = Self::new();
        for config in records {
            prefs.set(config);
        }
        Ok(prefs)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Open from file; a missing file means no saved selections.
    pub fn open(path: &Path) -> Result<Self, io::Error> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e),
        }
    }
}
