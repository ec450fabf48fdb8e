use std::fs;
use std::path::Path;
use std::process;

use lexis_engine::lexis_core::settings;
use lexis_engine::trace_init::{self, TraceGuard};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a custom settings file before anything reads the settings.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(settings::init_custom(content), "Error in {file}: {}");
}

/// Start writing traces to `dir`. The guard flushes them when `main` returns.
pub fn start_tracing(dir: &Path, filter: Option<&str>) -> TraceGuard {
    die!(
        trace_init::init_tracing(dir, filter),
        "Error starting traces in {}: {}",
        dir.display()
    )
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: paging.page_size={}, assembly.max_reference_depth={}, search.max_results={}, store.busy_timeout_ms={}",
        s.paging.page_size,
        s.assembly.max_reference_depth,
        s.search.max_results,
        s.store.busy_timeout_ms
    );
}
