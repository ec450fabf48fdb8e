use std::process;

use serde::Serialize;

use lexis_engine::lexis_core::{resolve_order, DictionaryEntry, ViewConfig};
use lexis_engine::lexis_session::PageLoad;
use lexis_engine::LexisEngine;

use crate::render::{format_entry, format_page};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, Serialize)]
struct PageJson<'a> {
    generation: u64,
    prev_key: Option<i64>,
    next_key: Option<i64>,
    items: &'a [DictionaryEntry],
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        die!(serde_json::to_string_pretty(value), "JSON serialization failed: {}")
    );
}

/// Open `dictionary_id` with its saved selection, overriding view and sort
/// where given. Overrides are remembered for the next run.
pub fn activate(
    engine: &LexisEngine,
    dictionary_id: &str,
    view: Option<&str>,
    sort: Option<&str>,
) -> ViewConfig {
    let mut config = die!(
        engine.open_dictionary(dictionary_id),
        "Error opening {dictionary_id}: {}"
    );
    if view.is_none() && sort.is_none() {
        return config;
    }
    if let Some(view) = view {
        config.view_id = view.to_string();
    }
    if let Some(sort) = sort {
        config.sort_category_id = Some(sort.to_string());
    }
    die!(engine.submit_config(config.clone()), "Error: {}");
    config
}

/// Print the resolved order without touching the ordering cache.
pub fn order(engine: &LexisEngine, dictionary_id: &str, view: &str, sort: Option<&str>) {
    let mut config = ViewConfig::new(dictionary_id, view);
    config.sort_category_id = sort.map(str::to_string);
    let ids = die!(resolve_order(engine.store(), &config), "Error: {}");
    for (i, id) in ids.iter().enumerate() {
        println!("{}\t{id}", i + 1);
    }
    eprintln!("{} lexemes", ids.len());
}

pub fn page(
    engine: &LexisEngine,
    dictionary_id: &str,
    view: Option<&str>,
    sort: Option<&str>,
    key: Option<i64>,
    size: Option<usize>,
    json: bool,
) {
    activate(engine, dictionary_id, view, sort);
    let load = match size {
        Some(size) => {
            let pager = die!(engine.pager(), "Error: {}");
            die!(pager.load_sized(key, size), "Error loading page: {}")
        }
        None => die!(engine.load_page(key), "Error loading page: {}"),
    };
    let page = match load {
        PageLoad::Page(page) => page,
        PageLoad::Invalid => {
            eprintln!("Error: configuration changed while loading");
            process::exit(1);
        }
    };
    if json {
        print_json(&PageJson {
            generation: page.generation,
            prev_key: page.prev_key,
            next_key: page.next_key,
            items: &page.items,
        });
    } else {
        print!("{}", format_page(&page));
    }
}

pub fn entry(engine: &LexisEngine, dictionary_id: &str, lexeme_id: &str, view: Option<&str>, json: bool) {
    activate(engine, dictionary_id, view, None);
    let Some(entry) = die!(engine.entry(lexeme_id, lexeme_id), "Error: {}") else {
        eprintln!("Not found: {lexeme_id}");
        process::exit(1);
    };
    if json {
        print_json(&entry);
    } else {
        print!("{}", format_entry(&entry));
    }
}

pub fn search(
    engine: &LexisEngine,
    dictionary_id: &str,
    text: &str,
    category: Option<&str>,
    json: bool,
) {
    activate(engine, dictionary_id, None, None);
    let entries = match category {
        Some(category) => die!(engine.search_in_category(category, text), "Error: {}"),
        None => die!(engine.search(text), "Error: {}"),
    };
    if json {
        print_json(entries.as_slice());
        return;
    }
    for e in &entries {
        print!("{}", format_entry(e));
    }
    println!("---");
    println!("{} results", entries.len());
}
