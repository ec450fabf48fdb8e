use super::*;
use crate::model::{Dictionary, DictionaryBundle, Lexeme, SHOW_ALL_VIEW_ID};
use crate::testutil::{sample_bundle, sample_store, DICT};

#[test]
fn install_and_read_back() {
    let store = sample_store();
    let dict = store.dictionary(DICT).unwrap().unwrap();
    assert_eq!(dict.name, "Sample");
    assert_eq!(dict.version, 1);

    let categories = store.categories(DICT).unwrap();
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0].id, "pos");
    assert!(categories[0].sortable);
    assert!(categories.iter().find(|c| c.id == "note").unwrap().hidden);

    let view = store.view(DICT, "basic").unwrap().unwrap();
    assert_eq!(view.category_ids.len(), 2);
    assert!(view.category_ids.contains("trans"));
    assert_eq!(store.views(DICT).unwrap().len(), 3);

    let lexeme = store.lexeme(DICT, "lex_e").unwrap().unwrap();
    assert_eq!(lexeme.form, "Lemmas");
    assert_eq!(lexeme.base_id.as_deref(), Some("lex_a"));
    assert!(store.lexeme(DICT, "missing").unwrap().is_none());
}

#[test]
fn install_same_version_is_constraint_violation() {
    let store = sample_store();
    let err = store.install(&sample_bundle()).unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
}

#[test]
fn install_higher_version_replaces_and_keeps_bookmarks() {
    let store = sample_store();
    store.add_bookmark(DICT, "lex_a").unwrap();
    store.add_bookmark(DICT, "lex_b").unwrap();

    let mut update = sample_bundle();
    update.dictionary.version = 2;
    update.lexemes.retain(|l| l.id != "lex_b");
    update.properties.retain(|p| p.lexeme_id != "lex_b");

    let outcome = store.install(&update).unwrap();
    assert_eq!(outcome, InstallOutcome::Replaced { previous_version: 1 });
    assert_eq!(store.dictionary(DICT).unwrap().unwrap().version, 2);
    assert_eq!(store.bookmarks(DICT).unwrap(), vec!["lex_a".to_string()]);
}

#[test]
fn install_rejects_foreign_rows() {
    let store = Store::open_in_memory().unwrap();
    let bundle = DictionaryBundle::new(Dictionary::new("dic_x", 1, "X"))
        .lexeme(Lexeme::new("dic_y", "lex_a", "a"));
    assert!(matches!(
        store.install(&bundle),
        Err(StoreError::Constraint(_))
    ));
    assert!(store.dictionaries().unwrap().is_empty());
}

#[test]
fn install_rolls_back_on_missing_foreign_key() {
    let store = Store::open_in_memory().unwrap();
    let bundle = DictionaryBundle::new(Dictionary::new("dic_x", 1, "X"))
        .lexeme(Lexeme::new("dic_x", "lex_a", "a"))
        .property("lex_a", "no_such_category", "v");
    assert!(matches!(
        store.install(&bundle),
        Err(StoreError::Constraint(_))
    ));
    assert!(store.dictionary("dic_x").unwrap().is_none());
}

#[test]
fn uninstall_cascades() {
    let store = sample_store();
    store.add_bookmark(DICT, "lex_a").unwrap();
    store.record_history(DICT, "lex_a", "lem").unwrap();

    assert!(store.uninstall(DICT).unwrap());
    assert!(store.dictionary(DICT).unwrap().is_none());
    assert!(store.categories(DICT).unwrap().is_empty());
    assert!(store.lexeme(DICT, "lex_a").unwrap().is_none());
    assert!(store.bookmarks(DICT).unwrap().is_empty());
    assert!(store.history(DICT, 10).unwrap().is_empty());
    assert!(!store.uninstall(DICT).unwrap());
}

#[test]
fn find_by_text_matches_form_and_value_ignoring_case() {
    let store = sample_store();
    // "apple" form, "An apple a day" example value
    assert_eq!(store.find_lexemes_by_text(DICT, "APPLE").unwrap(), vec!["lex_c"]);
    // "lemma-t" translation and "Lemma"/"Lemmas" forms
    assert_eq!(
        store.find_lexemes_by_text(DICT, "lemma").unwrap(),
        vec!["lex_a", "lex_d", "lex_e"]
    );
    assert!(store.find_lexemes_by_text(DICT, "nothing").unwrap().is_empty());
}

#[test]
fn find_by_text_is_unicode_case_insensitive() {
    let store = Store::open_in_memory().unwrap();
    let bundle = DictionaryBundle::new(Dictionary::new("dic_u", 1, "U"))
        .lexeme(Lexeme::new("dic_u", "lex_1", "Ärger"));
    store.install(&bundle).unwrap();
    assert_eq!(store.find_lexemes_by_text("dic_u", "äRG").unwrap(), vec!["lex_1"]);
}

#[test]
fn find_by_category_value() {
    let store = sample_store();
    assert_eq!(
        store.find_lexemes_by_category_value(DICT, "pos", "NOUN").unwrap(),
        vec!["lex_a", "lex_b"]
    );
    assert!(store
        .find_lexemes_by_category_value(DICT, "trans", "noun")
        .unwrap()
        .is_empty());
}

#[test]
fn view_membership_includes_hidden_categories() {
    let store = sample_store();
    let members = store.category_view_membership(DICT, "media").unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.contains("note"));
    assert!(store.category_view_membership(DICT, "nope").unwrap().is_empty());
}

#[test]
fn properties_filtered_by_view_and_hidden() {
    let store = sample_store();
    let props = store.properties_for_lexeme(DICT, "lex_b", "basic").unwrap();
    let cats: Vec<&str> = props.iter().map(|p| p.category.id.as_str()).collect();
    assert_eq!(cats, vec!["pos", "trans"]);

    // show-all: every non-hidden category, in sequence order
    let props = store.properties_for_lexeme(DICT, "lex_b", SHOW_ALL_VIEW_ID).unwrap();
    let cats: Vec<&str> = props.iter().map(|p| p.category.id.as_str()).collect();
    assert_eq!(cats, vec!["pos", "trans", "ref"]);

    // the hidden note is the only media property of lex_b
    assert!(store.properties_for_lexeme(DICT, "lex_b", "media").unwrap().is_empty());
}

#[test]
fn bookmark_add_remove() {
    let store = sample_store();
    assert!(store.add_bookmark(DICT, "lex_b").unwrap());
    assert!(!store.add_bookmark(DICT, "lex_b").unwrap());
    assert!(store.add_bookmark(DICT, "lex_a").unwrap());
    assert_eq!(store.bookmarks(DICT).unwrap(), vec!["lex_a", "lex_b"]);
    assert!(store.bookmark(DICT, "lex_b").unwrap().is_some());

    assert!(store.remove_bookmark(DICT, "lex_b").unwrap());
    assert!(!store.remove_bookmark(DICT, "lex_b").unwrap());
    assert!(store.bookmark(DICT, "lex_b").unwrap().is_none());
}

#[test]
fn bookmark_unknown_lexeme_is_rejected() {
    let store = sample_store();
    assert!(matches!(
        store.add_bookmark(DICT, "missing"),
        Err(StoreError::Constraint(_))
    ));
}

#[test]
fn delete_lexeme_cascades_to_bookmark() {
    let store = sample_store();
    store.add_bookmark(DICT, "lex_a").unwrap();
    assert!(store.delete_lexeme(DICT, "lex_a").unwrap());
    assert!(!store.lexeme_exists(DICT, "lex_a").unwrap());
    assert!(store.bookmarks(DICT).unwrap().is_empty());
    assert!(store.properties_for_lexeme(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap().is_empty());
}

#[test]
fn history_newest_first() {
    let store = sample_store();
    store.record_history_at(DICT, "lex_a", "lem", 100).unwrap();
    store.record_history_at(DICT, "lex_b", "zeb", 300).unwrap();
    store.record_history_at(DICT, "lex_c", "app", 200).unwrap();

    let history = store.history(DICT, 2).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].lexeme_id, "lex_b");
    assert_eq!(history[0].query, "zeb");
    assert_eq!(history[1].lexeme_id, "lex_c");

    assert_eq!(store.clear_history(DICT).unwrap(), 3);
    assert!(store.history(DICT, 10).unwrap().is_empty());
}

#[test]
fn order_table_replace_and_range() {
    let store = sample_store();
    let ids: Vec<String> = ["lex_c", "lex_a", "lex_b"].iter().map(|s| s.to_string()).collect();
    assert!(store.replace_order_if(&ids, || true).unwrap());
    assert_eq!(store.order_len().unwrap(), 3);
    assert_eq!(store.order_range(2, 1).unwrap(), vec!["lex_c", "lex_a"]);
    assert_eq!(store.order_range(2, 3).unwrap(), vec!["lex_b"]);
    assert!(store.order_range(2, 4).unwrap().is_empty());
    assert!(store.order_range(0, 1).unwrap().is_empty());
}

#[test]
fn order_table_replace_rolls_back_when_superseded() {
    let store = sample_store();
    let first = vec!["lex_a".to_string()];
    assert!(store.replace_order_if(&first, || true).unwrap());

    let second = vec!["lex_b".to_string(), "lex_c".to_string()];
    assert!(!store.replace_order_if(&second, || false).unwrap());
    assert_eq!(store.order_range(10, 1).unwrap(), vec!["lex_a"]);

    store.clear_order().unwrap();
    assert_eq!(store.order_len().unwrap(), 0);
}

#[test]
fn file_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexis.db");
    {
        let store = Store::open(&path).unwrap();
        store.install(&sample_bundle()).unwrap();
        store.add_bookmark(DICT, "lex_c").unwrap();
    }
    let store = Store::open(&path).unwrap();
    assert_eq!(store.dictionaries().unwrap().len(), 1);
    assert_eq!(store.bookmarks(DICT).unwrap(), vec!["lex_c"]);
}
