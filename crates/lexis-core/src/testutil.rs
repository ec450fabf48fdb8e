use std::sync::Arc;

use crate::model::{Category, Dictionary, DictionaryBundle, DictionaryView, Lexeme, WidgetType};
use crate::store::Store;

pub(crate) const DICT: &str = "dic_a";

/// Shared test dictionary.
///
/// Forms are chosen so that ordinal ordering differs from case-folded
/// ordering ("Zebra" < "apple"), two lexemes share the form "Lemma", and
/// lex_a/lex_b reference each other.
pub(crate) fn sample_bundle() -> DictionaryBundle {
    DictionaryBundle::new(Dictionary::new(DICT, 1, "Sample"))
        .category(Category::new(DICT, "pos", "Word class", WidgetType::Plain, 1).sortable())
        .category(Category::new(DICT, "trans", "Translation", WidgetType::KeyValue, 2).sortable())
        .category(Category::new(DICT, "audio", "Audio", WidgetType::Audio, 3))
        .category(Category::new(DICT, "morph", "Morphology", WidgetType::Morphology, 4))
        .category(Category::new(DICT, "ref", "See also", WidgetType::Reference, 5))
        .category(Category::new(DICT, "note", "Editor note", WidgetType::Plain, 6).hidden())
        .category(Category::new(DICT, "url", "Links", WidgetType::Url, 7))
        .category(Category::new(DICT, "example", "Examples", WidgetType::Example, 8))
        .category(Category::new(DICT, "wordnet", "WordNet", WidgetType::Wordnet, 9))
        .view(DictionaryView::new(DICT, "basic", "Basic", &["pos", "trans"]))
        .view(DictionaryView::new(DICT, "media", "Media", &["audio", "note"]))
        .view(DictionaryView::new(DICT, "refs", "References", &["ref"]))
        .lexeme(Lexeme::new(DICT, "lex_a", "Lemma"))
        .lexeme(Lexeme::new(DICT, "lex_b", "Zebra"))
        .lexeme(Lexeme::new(DICT, "lex_c", "apple"))
        .lexeme(Lexeme::new(DICT, "lex_d", "Lemma"))
        .lexeme(Lexeme::new(DICT, "lex_e", "Lemmas").with_base("lex_a"))
        .lexeme(Lexeme::new(DICT, "lex_f", "Orphan"))
        .lexeme(Lexeme::new(DICT, "lex_g", "Quiet"))
        .property("lex_a", "pos", "noun")
        .property("lex_a", "trans", "lemma-t")
        .property("lex_a", "audio", "lemma;;;lemma.ogg")
        .property("lex_a", "morph", "lemmas|lemmata")
        .property("lex_a", "ref", "see;;;lex_b")
        .property("lex_b", "pos", "noun")
        .property("lex_b", "trans", "zebra-t")
        .property("lex_b", "ref", "see;;;lex_a")
        .property("lex_b", "note", "hidden note")
        .property("lex_c", "trans", "apfel")
        .property("lex_c", "url", "wiki;;;https://example.org/apple")
        .property("lex_c", "example", "ex;;;An apple a day")
        .property("lex_d", "audio", "bad-audio")
        .property("lex_d", "wordnet", "wn;;;12345")
        .property("lex_e", "pos", "plural")
        .property("lex_e", "morph", "x")
        .property("lex_g", "note", "quiet note")
}

pub(crate) fn sample_store() -> Arc<Store> {
    let store = Store::open_in_memory().unwrap();
    store.install(&sample_bundle()).unwrap();
    Arc::new(store)
}

/// `{lex_a: "Lemma", lex_b: "Zebra"}` with two visible categories.
pub(crate) fn two_word_bundle() -> DictionaryBundle {
    DictionaryBundle::new(Dictionary::new(DICT, 1, "Two words"))
        .category(Category::new(DICT, "pos", "Word class", WidgetType::Plain, 1))
        .category(Category::new(DICT, "trans", "Translation", WidgetType::KeyValue, 2))
        .lexeme(Lexeme::new(DICT, "lex_a", "Lemma"))
        .lexeme(Lexeme::new(DICT, "lex_b", "Zebra"))
        .property("lex_a", "pos", "noun")
        .property("lex_b", "trans", "zebra")
}
