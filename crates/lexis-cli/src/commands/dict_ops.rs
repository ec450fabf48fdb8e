use std::path::Path;
use std::process;

use lexis_engine::lexis_core::store::InstallOutcome;
use lexis_engine::LexisEngine;

use crate::bundle_source;
use crate::render::{column_width, pad};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn install(engine: &LexisEngine, bundle_file: &str) {
    let bundle = die!(
        bundle_source::read_bundle(Path::new(bundle_file)),
        "Error reading bundle {bundle_file}: {}"
    );
    let dict = &bundle.dictionary;
    let outcome = die!(engine.install(&bundle), "Error installing {}: {}", dict.id);
    match outcome {
        InstallOutcome::Installed => println!("Installed: {} v{}", dict.id, dict.version),
        InstallOutcome::Replaced { previous_version } => {
            println!("Upgraded: {} v{previous_version} → v{}", dict.id, dict.version)
        }
    }
    eprintln!(
        "{} categories, {} views, {} lexemes, {} properties",
        bundle.categories.len(),
        bundle.views.len(),
        bundle.lexemes.len(),
        bundle.properties.len()
    );
}

pub fn uninstall(engine: &LexisEngine, dictionary_id: &str) {
    if die!(engine.uninstall(dictionary_id), "Error uninstalling {dictionary_id}: {}") {
        println!("Removed: {dictionary_id}");
    } else {
        println!("Not installed: {dictionary_id}");
    }
}

pub fn dictionaries(engine: &LexisEngine) {
    let dicts = die!(engine.store().dictionaries(), "Error listing dictionaries: {}");
    if dicts.is_empty() {
        println!("(none)");
        return;
    }
    let width = column_width(dicts.iter().map(|d| d.id.as_str()));
    for d in &dicts {
        println!("{}  v{:<4} {}", pad(&d.id, width), d.version, d.name);
    }
}

pub fn categories(engine: &LexisEngine, dictionary_id: &str) {
    let cats = die!(
        engine.store().categories(dictionary_id),
        "Error listing categories: {}"
    );
    let id_width = column_width(cats.iter().map(|c| c.id.as_str()));
    let name_width = column_width(cats.iter().map(|c| c.name.as_str()));
    for c in &cats {
        let mut flags = Vec::new();
        if c.sortable {
            flags.push("sortable");
        }
        if c.hidden {
            flags.push("hidden");
        }
        println!(
            "{:>3}  {}  {}  {:<10} {}",
            c.sequence,
            pad(&c.id, id_width),
            pad(&c.name, name_width),
            c.widget_type.as_str(),
            flags.join(",")
        );
    }
    println!("---");
    println!("{} categories", cats.len());
}

pub fn views(engine: &LexisEngine, dictionary_id: &str) {
    let views = die!(engine.store().views(dictionary_id), "Error listing views: {}");
    let width = column_width(views.iter().map(|v| v.id.as_str()));
    for v in &views {
        let cats: Vec<&str> = v.category_ids.iter().map(String::as_str).collect();
        println!("{}  {}  [{}]", pad(&v.id, width), v.name, cats.join(", "));
    }
    if views.is_empty() {
        println!("(no views besides the show-all view)");
    }
}
