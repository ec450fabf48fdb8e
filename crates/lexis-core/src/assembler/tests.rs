use super::*;
use crate::model::{
    Category, Dictionary, DictionaryBundle, Lexeme, RawProperty, WidgetType, SHOW_ALL_VIEW_ID,
};
use crate::testutil::{sample_bundle, sample_store, DICT};

fn assembler() -> EntryAssembler {
    EntryAssembler::new(sample_store()).with_max_reference_depth(3)
}

fn group_ids(entry: &DictionaryEntry) -> Vec<&str> {
    entry.properties.iter().map(|g| g.category.id.as_str()).collect()
}

fn reference_target<'a>(entry: &'a DictionaryEntry, category: &str) -> &'a ReferenceTarget {
    match &entry.group(category).unwrap().properties[0] {
        Property::Reference { target, .. } => target,
        other => panic!("expected reference, got {other:?}"),
    }
}

#[test]
fn missing_lexeme_is_none() {
    assert!(assembler().assemble(DICT, "nope", SHOW_ALL_VIEW_ID).unwrap().is_none());
}

#[test]
fn groups_follow_category_sequence_and_decode() {
    let entry = assembler().assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert_eq!(entry.representation, "Lemma");
    assert_eq!(group_ids(&entry), vec!["pos", "trans", "audio", "morph", "ref"]);
    assert_eq!(
        entry.group("pos").unwrap().properties,
        vec![Property::Plain("noun".into())]
    );
    assert_eq!(
        entry.group("trans").unwrap().properties,
        vec![Property::Simple("lemma-t".into())]
    );
    assert_eq!(
        entry.group("audio").unwrap().properties,
        vec![Property::Audio {
            name: "lemma".into(),
            resource: "lemma.ogg".into()
        }]
    );
    assert_eq!(
        entry.group("morph").unwrap().properties,
        vec![Property::Morphology(vec!["lemmas".into(), "lemmata".into()])]
    );
}

#[test]
fn composite_widgets_decode() {
    let entry = assembler().assemble(DICT, "lex_c", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert_eq!(group_ids(&entry), vec!["trans", "url", "example"]);
    assert_eq!(
        entry.group("url").unwrap().properties,
        vec![Property::Url {
            name: "wiki".into(),
            url: "https://example.org/apple".into()
        }]
    );
    assert_eq!(
        entry.group("example").unwrap().properties,
        vec![Property::Example {
            name: "ex".into(),
            content: "An apple a day".into()
        }]
    );
}

#[test]
fn view_filters_groups_and_hidden_never_shown() {
    let a = assembler();
    let entry = a.assemble(DICT, "lex_a", "basic").unwrap().unwrap();
    assert_eq!(group_ids(&entry), vec!["pos", "trans"]);

    let b = a.assemble(DICT, "lex_b", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert!(b.group("note").is_none());

    // only a hidden property: the entry exists but has no groups
    let g = a.assemble(DICT, "lex_g", "media").unwrap().unwrap();
    assert!(g.properties.is_empty());
}

#[test]
fn malformed_property_is_dropped_not_fatal() {
    let entry = assembler().assemble(DICT, "lex_d", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert_eq!(group_ids(&entry), vec!["wordnet"]);
    assert_eq!(
        entry.group("wordnet").unwrap().properties,
        vec![Property::Wordnet {
            name: "wn".into(),
            reference: "12345".into()
        }]
    );
}

#[test]
fn reference_resolves_target_entry() {
    let entry = assembler().assemble(DICT, "lex_b", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    let ReferenceTarget::Resolved(target) = reference_target(&entry, "ref") else {
        panic!("reference not resolved");
    };
    assert_eq!(target.id, "lex_a");
    assert_eq!(target.representation, "Lemma");
    assert_eq!(group_ids(target), vec!["pos", "trans", "audio", "morph", "ref"]);
}

#[test]
fn reference_cycle_degrades_to_shallow_snapshot() {
    let entry = assembler().assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    let ReferenceTarget::Resolved(b) = reference_target(&entry, "ref") else {
        panic!("lex_b not resolved");
    };
    assert_eq!(b.id, "lex_b");

    // lex_b points back at lex_a, which is on the path
    let ReferenceTarget::Resolved(a_again) = reference_target(b, "ref") else {
        panic!("back reference not snapshotted");
    };
    assert_eq!(a_again.id, "lex_a");
    assert_eq!(group_ids(a_again), group_ids(&entry));
    assert_eq!(
        reference_target(a_again, "ref"),
        &ReferenceTarget::Pending("lex_b".into())
    );
}

#[test]
fn zero_depth_snapshots_every_reference() {
    let a = EntryAssembler::new(sample_store()).with_max_reference_depth(0);
    let entry = a.assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    let ReferenceTarget::Resolved(b) = reference_target(&entry, "ref") else {
        panic!("lex_b not resolved");
    };
    assert_eq!(reference_target(b, "ref"), &ReferenceTarget::Pending("lex_a".into()));
}

#[test]
fn deleted_reference_target_drops_property() {
    let store = sample_store();
    let a = EntryAssembler::new(Arc::clone(&store));
    store.delete_lexeme(DICT, "lex_b").unwrap();
    let entry = a.assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert_eq!(group_ids(&entry), vec!["pos", "trans", "audio", "morph"]);
}

#[test]
fn shallow_snapshot_drops_dangling_references() {
    let store = sample_store();
    let a = EntryAssembler::new(Arc::clone(&store)).with_max_reference_depth(0);
    // lex_c now references a lexeme that does not exist
    let mut bundle = sample_bundle();
    bundle.dictionary.version = 2;
    bundle
        .properties
        .push(RawProperty::new(DICT, "p_extra", "lex_c", "ref", "see;;;ghost"));
    bundle
        .properties
        .push(RawProperty::new(DICT, "p_extra2", "lex_b", "ref", "also;;;lex_c"));
    store.install(&bundle).unwrap();

    let entry = a.assemble(DICT, "lex_b", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    let refs = &entry.group("ref").unwrap().properties;
    assert_eq!(refs.len(), 2);
    let Property::Reference {
        target: ReferenceTarget::Resolved(c),
        ..
    } = &refs[1]
    else {
        panic!("lex_c not snapshotted");
    };
    assert_eq!(c.id, "lex_c");
    // the snapshot's only reference points nowhere and is dropped
    assert!(c.group("ref").is_none());
}

#[test]
fn base_is_one_hop() {
    let a = assembler();
    let entry = a.assemble(DICT, "lex_e", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert_eq!(entry.base_id.as_deref(), Some("lex_a"));
    let base = entry.base.as_ref().unwrap();
    assert_eq!(base.id, "lex_a");
    assert!(base.base.is_none());
    assert_eq!(group_ids(base), vec!["pos", "trans", "audio", "morph", "ref"]);

    // base is filtered by the same view
    let entry = a.assemble(DICT, "lex_e", "basic").unwrap().unwrap();
    assert_eq!(group_ids(&entry), vec!["pos"]);
    assert_eq!(group_ids(entry.base.as_ref().unwrap()), vec!["pos", "trans"]);
}

#[test]
fn base_chain_and_self_base_are_not_followed() {
    let d = "dic_b";
    let bundle = DictionaryBundle::new(Dictionary::new(d, 1, "Bases"))
        .category(Category::new(d, "pos", "Word class", WidgetType::Plain, 1))
        .lexeme(Lexeme::new(d, "root", "root"))
        .lexeme(Lexeme::new(d, "mid", "mid").with_base("root"))
        .lexeme(Lexeme::new(d, "leaf", "leaf").with_base("mid"))
        .lexeme(Lexeme::new(d, "selfish", "selfish").with_base("selfish"))
        .lexeme(Lexeme::new(d, "dangling", "dangling").with_base("ghost"));
    let store = Store::open_in_memory().unwrap();
    store.install(&bundle).unwrap();
    let a = EntryAssembler::new(Arc::new(store));

    let leaf = a.assemble(d, "leaf", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    let mid = leaf.base.as_ref().unwrap();
    assert_eq!(mid.id, "mid");
    assert_eq!(mid.base_id.as_deref(), Some("root"));
    assert!(mid.base.is_none());

    let selfish = a.assemble(d, "selfish", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert!(selfish.base.is_none());

    let dangling = a.assemble(d, "dangling", SHOW_ALL_VIEW_ID).unwrap().unwrap();
    assert!(dangling.base.is_none());
    assert_eq!(dangling.base_id.as_deref(), Some("ghost"));
}

#[test]
fn bookmark_is_observed_on_next_read() {
    let store = sample_store();
    let a = EntryAssembler::new(Arc::clone(&store));
    assert!(!a.assemble(DICT, "lex_c", SHOW_ALL_VIEW_ID).unwrap().unwrap().is_bookmarked());
    store.add_bookmark(DICT, "lex_c").unwrap();
    assert!(a.assemble(DICT, "lex_c", SHOW_ALL_VIEW_ID).unwrap().unwrap().is_bookmarked());
}

#[test]
fn reassembly_is_equal() {
    let a = assembler();
    let first = a.assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap();
    let second = a.assemble(DICT, "lex_a", SHOW_ALL_VIEW_ID).unwrap();
    assert_eq!(first, second);
}
