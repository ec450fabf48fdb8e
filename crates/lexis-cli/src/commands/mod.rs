pub mod browse_ops;
pub mod config_ops;
pub mod dict_ops;
pub mod user_data_ops;

use std::path::{Path, PathBuf};
use std::process;

use lexis_engine::LexisEngine;

pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    Path::new(&home).join(".local/share/lexis")
}

/// Open the database at `db` (default `<data dir>/lexis.db`) with view
/// preferences at `prefs` (default `views.lxvp` next to the database).
pub fn open_engine(db: Option<&str>, prefs: Option<&str>) -> LexisEngine {
    let db = db.map_or_else(|| default_data_dir().join("lexis.db"), PathBuf::from);
    let prefs = prefs.map_or_else(
        || db.with_file_name("views.lxvp"),
        PathBuf::from,
    );
    if let Some(dir) = db.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error creating {}: {e}", dir.display());
            process::exit(1);
        }
    }
    LexisEngine::open(&db, &prefs).unwrap_or_else(|e| {
        eprintln!("Failed to open database at {}: {e}", db.display());
        process::exit(1);
    })
}
