//! Consistency behavior of the settings store, driven through its public API.

use std::collections::BTreeSet;

use settings_guard::handler::ValueHandler;
use settings_guard::registry::{DEFAULT_NAME, KEY_NAME, KEY_PATH, KEY_SHORTCUT};
use settings_guard::{ConfigEvent, RawValue};

mod common;

fn text(s: &str) -> RawValue {
    RawValue::String(s.to_string())
}

#[test]
fn test_unwritten_keys_serve_defaults() {
    let (_dir, store) = common::temp_store();
    let mut rx = store.subscribe();

    assert_eq!(store.value(KEY_NAME), Some(text(DEFAULT_NAME)));
    assert_eq!(store.value(KEY_PATH), ValueHandler::existing_directory().fallback());
    assert_eq!(store.value(KEY_SHORTCUT), Some(text("Ctrl+s")));

    // Reading a never-written key trips the error flag once.
    assert!(store.has_error());
    assert_eq!(common::drain_transitions(&mut rx), vec![ConfigEvent::Error]);

    // Absent keys pass the full check, so a recheck clears it.
    store.check_and_handle_error();
    assert!(!store.has_error());
}

#[test]
fn test_fallback_directory_is_well_known() {
    let (_dir, store) = common::temp_store();
    let candidates = [dirs::picture_dir(), dirs::home_dir(), Some(std::env::temp_dir())];

    let path = store.path();
    assert!(candidates.iter().flatten().any(|c| *c == path));
}

#[test]
fn test_set_then_read_round_trips() {
    let (dir, store) = common::temp_store();

    store.set_value(KEY_NAME, "My App").unwrap();
    store.set_value(KEY_PATH, dir.path().to_str().unwrap()).unwrap();
    store.set_value(KEY_SHORTCUT, "Alt+F2").unwrap();

    assert_eq!(store.value(KEY_NAME), Some(text("My App")));
    assert_eq!(store.path(), dir.path());
    assert_eq!(store.value(KEY_SHORTCUT), Some(text("Alt+F2")));
    assert!(!store.has_error());
}

#[test]
fn test_return_is_stored_as_enter() {
    let (_dir, store) = common::temp_store();

    store.set_value(KEY_SHORTCUT, "Return").unwrap();
    let content = std::fs::read_to_string(store.file_path()).unwrap();
    assert!(content.contains("\"Enter\""));

    assert_eq!(store.value(KEY_SHORTCUT), Some(text("Return")));
}

// The last character of a shortcut is lower-cased on read.
#[test]
fn test_shortcut_last_character_is_lowercased() {
    let (_dir, store) = common::temp_store();

    store.set_value(KEY_SHORTCUT, "Ctrl+Shift+X").unwrap();
    assert_eq!(store.short_cut(), "Ctrl+Shift+x");
}

#[test]
fn test_external_invalid_write_emits_single_error() {
    let (_dir, store) = common::temp_store();
    let mut rx = store.subscribe();
    assert!(!store.has_error());

    common::write_external(&store.file_path(), "shortCut = \"Ctrl+Bogus\"\n");

    for _ in 0..3 {
        assert_eq!(store.value(KEY_SHORTCUT), Some(text("Ctrl+s")));
    }
    assert!(store.has_error());
    assert_eq!(common::drain_transitions(&mut rx), vec![ConfigEvent::Error]);
}

#[test]
fn test_fixing_the_file_emits_single_resolution() {
    let (_dir, store) = common::temp_store();
    let mut rx = store.subscribe();

    common::write_external(&store.file_path(), "shortCut = \"Ctrl+Bogus\"\n");
    store.on_file_changed(&store.file_path());
    assert!(store.has_error());

    common::write_external(&store.file_path(), "shortCut = \"Ctrl+Q\"\n");
    store.on_file_changed(&store.file_path());
    store.on_file_changed(&store.file_path());

    assert!(!store.has_error());
    assert_eq!(store.short_cut(), "Ctrl+q");
    assert_eq!(
        common::drain_transitions(&mut rx),
        vec![ConfigEvent::Error, ConfigEvent::ErrorResolved]
    );
}

#[test]
fn test_set_value_is_noop_while_in_error() {
    let (_dir, store) = common::temp_store();
    common::write_external(&store.file_path(), "name = \"hand edited\"\nbogusKey = \"1\"\n");
    assert!(store.has_error());

    store.set_value(KEY_NAME, "changed").unwrap();
    store.set_name("changed too").unwrap();

    let content = std::fs::read_to_string(store.file_path()).unwrap();
    assert!(content.contains("hand edited"));
    assert!(!content.contains("changed"));
}

#[test]
fn test_bogus_key_is_reported_and_flags_error() {
    let (_dir, store) = common::temp_store();
    common::write_external(&store.file_path(), "bogusKey = \"1\"\n");

    assert_eq!(
        store.unrecognized_settings().unwrap(),
        BTreeSet::from(["bogusKey".to_string()])
    );
    assert!(!store.check_unrecognized_settings());
    assert!(store.check_valid());

    store.check_and_handle_error();
    assert!(store.has_error());
}

#[test]
fn test_clear_settings_resets_everything() {
    let (_dir, store) = common::temp_store();
    store.set_value(KEY_NAME, "custom").unwrap();
    store.set_value(KEY_SHORTCUT, "F5").unwrap();

    store.clear_settings().unwrap();

    assert!(store.keys_from_group("General").is_empty());
    for key in store.recognized_keys() {
        let handler = store.registry().get(&key).unwrap();
        assert_eq!(store.value(&key), handler.fallback());
    }
}

#[test]
fn test_deleted_file_resets_error_and_is_recreated() {
    let (_dir, store) = common::temp_store();
    let path = store.file_path();
    let mut rx = store.subscribe();

    common::write_external(&path, "bogusKey = 1\n");
    store.on_file_changed(&path);
    assert!(store.has_error());

    std::fs::remove_file(&path).unwrap();
    store.on_file_changed(&path);
    assert!(!store.has_error());
    assert_eq!(
        common::drain_transitions(&mut rx),
        vec![ConfigEvent::Error, ConfigEvent::ErrorResolved]
    );

    store.set_value(KEY_NAME, "again").unwrap();
    assert!(path.exists());
    assert_eq!(store.name(), "again");
}

#[test]
fn test_self_inflicted_change_is_not_rechecked() {
    let (_dir, store) = common::temp_store();
    let path = store.file_path();
    let mut rx = store.subscribe();
    assert!(!store.has_error());

    store.set_value(KEY_NAME, "mine").unwrap();
    // Sneak a bad key in before the notification for our own write arrives.
    common::write_external(&path, "name = \"mine\"\nbogusKey = 1\n");
    store.on_file_changed(&path);
    assert!(!store.has_error());

    store.on_file_changed(&path);
    assert!(store.has_error());
    assert_eq!(common::drain_transitions(&mut rx), vec![ConfigEvent::Error]);
}

#[test]
fn test_reset_value_and_remove() {
    let (_dir, store) = common::temp_store();
    store.set_name("temporary").unwrap();

    store.reset_value(KEY_NAME).unwrap();
    assert_eq!(store.name(), DEFAULT_NAME);

    store.remove(KEY_NAME).unwrap();
    assert!(store.keys_from_group("General").is_empty());
    assert_eq!(store.name(), DEFAULT_NAME);
}

#[test]
fn test_grouped_keys_are_ignored_by_checks() {
    let (_dir, store) = common::temp_store();
    common::write_external(
        &store.file_path(),
        "name = \"n\"\n\n[Recent]\nfirst = \"a\"\nsecond = 2\n",
    );

    assert!(store.check_errors());
    assert_eq!(
        store.keys_from_group("Recent"),
        BTreeSet::from(["first".to_string(), "second".to_string()])
    );
    assert_eq!(store.keys_from_group("General"), BTreeSet::from(["name".to_string()]));
}

#[test]
fn test_general_section_is_validated() {
    let (_dir, store) = common::temp_store();
    assert!(!store.has_error());

    common::write_external(
        &store.file_path(),
        "[General]\npath = \"/definitely/not/here\"\nname = \"user edit\"\n",
    );
    store.on_file_changed(&store.file_path());

    assert!(store.has_error());
    assert_eq!(
        store.invalid_settings().unwrap(),
        BTreeSet::from(["path".to_string()])
    );

    common::write_external(&store.file_path(), "[General]\nname = \"user edit\"\n");
    store.on_file_changed(&store.file_path());
    assert!(!store.has_error());
    assert_eq!(store.name(), "user edit");
}

#[test]
fn test_unrecognized_key_in_general_section() {
    let (_dir, store) = common::temp_store();
    common::write_external(&store.file_path(), "[General]\nbogusKey = \"1\"\n");

    assert_eq!(
        store.unrecognized_settings().unwrap(),
        BTreeSet::from(["bogusKey".to_string()])
    );
    assert!(store.has_error());

    store.remove("General/bogusKey").unwrap();
    store.check_and_handle_error();
    assert!(!store.has_error());
}
