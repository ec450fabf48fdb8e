//! Loading dictionary bundles from JSON files for installation.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use lexis_engine::lexis_core::DictionaryBundle;

#[derive(Debug, thiserror::Error)]
pub enum BundleSourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent bundle: {0}")]
    Inconsistent(String),
}

pub fn read_bundle(path: &Path) -> Result<DictionaryBundle, BundleSourceError> {
    let text = fs::read_to_string(path)?;
    parse_bundle(&text)
}

/// Parse a bundle and check that every row belongs to its dictionary and
/// only points at rows the bundle itself carries.
pub fn parse_bundle(json: &str) -> Result<DictionaryBundle, BundleSourceError> {
    let bundle: DictionaryBundle = serde_json::from_str(json)?;
    check(&bundle)?;
    Ok(bundle)
}

fn check(bundle: &DictionaryBundle) -> Result<(), BundleSourceError> {
    let dict = bundle.dictionary.id.as_str();
    let foreign = |kind: &str, id: &str, owner: &str| {
        Err(BundleSourceError::Inconsistent(format!(
            "{kind} {id} belongs to {owner}, not {dict}"
        )))
    };

    let mut categories = HashSet::new();
    for c in &bundle.categories {
        if c.dictionary_id != dict {
            return foreign("category", &c.id, &c.dictionary_id);
        }
        categories.insert(c.id.as_str());
    }
    for v in &bundle.views {
        if v.dictionary_id != dict {
            return foreign("view", &v.id, &v.dictionary_id);
        }
        if let Some(missing) = v.category_ids.iter().find(|c| !categories.contains(c.as_str())) {
            return Err(BundleSourceError::Inconsistent(format!(
                "view {} lists unknown category {missing}",
                v.id
            )));
        }
    }
    let mut lexemes = HashSet::new();
    for l in &bundle.lexemes {
        if l.dictionary_id != dict {
            return foreign("lexeme", &l.id, &l.dictionary_id);
        }
        lexemes.insert(l.id.as_str());
    }
    for p in &bundle.properties {
        if p.dictionary_id != dict {
            return foreign("property", &p.id, &p.dictionary_id);
        }
        if !lexemes.contains(p.lexeme_id.as_str()) || !categories.contains(p.category_id.as_str()) {
            return Err(BundleSourceError::Inconsistent(format!(
                "property {} points at {}/{}",
                p.id, p.lexeme_id, p.category_id
            )));
        }
    }
    Ok(())
}
