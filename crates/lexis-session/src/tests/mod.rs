
use std::sync::Arc;

use lexis_core::{
    Category, Dictionary, DictionaryBundle, DictionaryView, EntryAssembler, Lexeme,
    OrderingCache, Store, ViewConfig, WidgetType,
};

use super::*;

pub(super) const DICT: &str = "dic_a";

/// Ten words over three categories. `rare` is only set on a few lexemes so
/// views differ in size; `hidden` never makes a lexeme visible.
pub(super) fn make_test_bundle() -> DictionaryBundle {
    let words = [
        ("lex_01", "Lemma", Some("noun"), "l"),
        ("lex_02", "Zebra", Some("noun"), "z"),
        ("lex_03", "apple", None, "a"),
        ("lex_04", "Bear", Some("noun"), "b"),
        ("lex_05", "cider", Some("noun"), "c"),
        ("lex_06", "Dune", None, "d"),
        ("lex_07", "eagle", Some("noun"), "e"),
        ("lex_08", "Fig", Some("noun"), "f"),
        ("lex_09", "gull", None, "g"),
        ("lex_10", "Heron", Some("noun"), "h"),
    ];
    let mut bundle = DictionaryBundle::new(Dictionary::new(DICT, 1, "Birds and fruit"))
        .category(Category::new(DICT, "pos", "Word class", WidgetType::Plain, 1).sortable())
        .category(Category::new(DICT, "trans", "Translation", WidgetType::KeyValue, 2).sortable())
        .category(Category::new(DICT, "rare", "Rare", WidgetType::Plain, 3))
        .category(Category::new(DICT, "hidden", "Hidden", WidgetType::Plain, 4).hidden())
        .view(DictionaryView::new(DICT, "rare", "Rare only", &["rare", "hidden"]))
        .view(DictionaryView::new(DICT, "grammar", "Grammar", &["pos"]));
    for (id, form, pos, trans) in words {
        bundle = bundle.lexeme(Lexeme::new(DICT, id, form));
        if let Some(pos) = pos {
            bundle = bundle.property(id, "pos", pos);
        }
        bundle = bundle.property(id, "trans", trans).property(id, "hidden", "x");
    }
    bundle
        .property("lex_03", "rare", "yes")
        .property("lex_06", "rare", "yes")
}

pub(super) fn make_test_store() -> Arc<Store> {
    let store = Store::open_in_memory().unwrap();
    store.install(&make_test_bundle()).unwrap();
    Arc::new(store)
}

pub(super) fn make_pager(store: Arc<Store>, config: ViewConfig, page_size: usize) -> Pager {
    let cache = Arc::new(OrderingCache::new(Arc::clone(&store)));
    let assembler = Arc::new(EntryAssembler::new(store));
    Pager::new(cache, assembler, config, page_size)
}

pub(super) fn expect_page(load: PageLoad) -> Page {
    match load {
        PageLoad::Page(page) => page,
        PageLoad::Invalid => panic!("page unexpectedly invalidated"),
    }
}

pub(super) fn ids(page: &Page) -> Vec<&str> {
    page.items.iter().map(|e| e.id.as_str()).collect()
}
