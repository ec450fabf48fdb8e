use std::process;

use lexis_engine::LexisEngine;

use crate::commands::browse_ops;
use crate::render::{column_width, pad};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn bookmark_add(engine: &LexisEngine, dictionary_id: &str, lexeme_id: &str) {
    if die!(
        engine.store().add_bookmark(dictionary_id, lexeme_id),
        "Error adding bookmark: {}"
    ) {
        println!("Bookmarked: {lexeme_id}");
    } else {
        println!("Already bookmarked: {lexeme_id}");
    }
}

pub fn bookmark_remove(engine: &LexisEngine, dictionary_id: &str, lexeme_id: &str) {
    if die!(
        engine.store().remove_bookmark(dictionary_id, lexeme_id),
        "Error removing bookmark: {}"
    ) {
        println!("Removed: {lexeme_id}");
    } else {
        println!("Not bookmarked: {lexeme_id}");
    }
}

pub fn bookmark_list(engine: &LexisEngine, dictionary_id: &str) {
    browse_ops::activate(engine, dictionary_id, None, None);
    let entries = die!(engine.bookmarks(), "Error listing bookmarks: {}");
    if entries.is_empty() {
        println!("(empty)");
        return;
    }
    let width = column_width(entries.iter().map(|e| e.representation.as_str()));
    for e in &entries {
        println!("{}  {}", pad(&e.representation, width), e.id);
    }
    println!("---");
    println!("{} bookmarks", entries.len());
}

pub fn history(engine: &LexisEngine, dictionary_id: &str, limit: usize, clear: bool) {
    let store = engine.store();
    if clear {
        let n = die!(store.clear_history(dictionary_id), "Error clearing history: {}");
        println!("Cleared {n} records");
        return;
    }
    let records = die!(store.history(dictionary_id, limit), "Error reading history: {}");
    if records.is_empty() {
        println!("(empty)");
        return;
    }
    let width = column_width(records.iter().map(|r| r.query.as_str()));
    for r in &records {
        println!("{}  {}  {}", r.timestamp, pad(&r.query, width), r.lexeme_id);
    }
}
