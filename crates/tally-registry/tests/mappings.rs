//! Item-map store round trips and administrative operations.

use std::collections::BTreeMap;

use tally_registry::ItemMapStore;

fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn unconfigured_pair_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());
    assert_eq!(store.item_map("form-a", "phq9").unwrap(), None);
}

#[test]
fn saved_map_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());

    let map = map_of(&[("entry.1", "phq9_item1"), ("entry.2", "phq9_item2")]);
    store.save_item_map("form-a", "phq9", map.clone()).unwrap();

    assert_eq!(store.item_map("form-a", "phq9").unwrap(), Some(map));
}

#[test]
fn saving_again_overwrites_the_map() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());

    store
        .save_item_map("form-a", "phq9", map_of(&[("entry.1", "phq9_item1")]))
        .unwrap();
    let replacement = map_of(&[("entry.9", "phq9_item9")]);
    store
        .save_item_map("form-a", "phq9", replacement.clone())
        .unwrap();

    assert_eq!(store.item_map("form-a", "phq9").unwrap(), Some(replacement));
}

#[test]
fn platform_prefixed_form_ids_are_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());

    let map = map_of(&[("f1", "gad7_item1")]);
    store
        .save_item_map("googleforms::intake_v1", "gad7", map.clone())
        .unwrap();

    assert_eq!(
        store.item_map("googleforms::intake_v1", "gad7").unwrap(),
        Some(map)
    );
    assert!(dir.path().join("googleforms__intake_v1").is_dir());
}

#[test]
fn mapped_measures_lists_configured_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());

    store
        .save_item_map("form-a", "phq9", map_of(&[("e1", "phq9_item1")]))
        .unwrap();
    store
        .save_item_map("form-a", "gad7", map_of(&[("e1", "gad7_item1")]))
        .unwrap();

    assert_eq!(
        store.mapped_measures("form-a").unwrap(),
        vec!["gad7".to_string(), "phq9".to_string()]
    );
    assert!(store.mapped_measures("form-b").unwrap().is_empty());
}

#[test]
fn delete_removes_the_map() {
    let dir = tempfile::tempdir().unwrap();
    let store = ItemMapStore::new(dir.path());

    store
        .save_item_map("form-a", "phq9", map_of(&[("e1", "phq9_item1")]))
        .unwrap();
    assert!(store.delete_item_map("form-a", "phq9").unwrap());
    assert!(!store.delete_item_map("form-a", "phq9").unwrap());
    assert_eq!(store.item_map("form-a", "phq9").unwrap(), None);
}
