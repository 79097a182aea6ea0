use super::*;
use std::time::Duration;

use crate::shortcuts::{Binding, Combo, TriggerOn};

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(!config.silent);
    assert_eq!(config.sequence_delay_ms, None);
    assert!(config.scopes.is_empty());
    assert_eq!(
        config.get_sequence_delay(),
        Duration::from_millis(DEFAULT_SEQUENCE_DELAY_MS)
    );
}

#[test]
fn test_parse_single_and_multiple_keys() {
    let json = r#"{
        "scopes": [{
            "name": "editor",
            "shortcuts": [
                { "keys": ["ctrl", "s"], "action": "save" },
                { "keys": [["ctrl", "k"], ["meta", "k"]], "action": "palette" }
            ]
        }]
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    let shortcuts = &config.scopes[0].shortcuts;

    assert_eq!(shortcuts[0].keys.to_binding(), Binding::from(["ctrl", "s"]));
    assert_eq!(
        shortcuts[1].keys.to_binding(),
        Binding::Multiple(vec![Combo::from(["ctrl", "k"]), Combo::from(["meta", "k"])])
    );
    assert_eq!(config.shortcut_count(), 2);
}

#[test]
fn test_shortcut_options_from_config() {
    let json = r#"{
        "keys": ["g", "d"],
        "action": "goto",
        "sequential": true,
        "sequenceDelayMs": 250,
        "triggerOn": "keyup",
        "preventDefault": true,
        "data": { "id": "goto-def" }
    }"#;
    let shortcut: ShortcutConfig = serde_json::from_str(json).unwrap();
    let options = shortcut.to_options();

    assert!(options.sequential);
    assert!(!options.hold);
    assert_eq!(options.sequence_delay, Some(Duration::from_millis(250)));
    assert_eq!(options.trigger_on, TriggerOn::KeyUp);
    assert!(options.prevent_default);
    assert_eq!(options.id(), Some("goto-def"));
    assert_eq!(options.data.get("action").map(String::as_str), Some("goto"));
    assert_eq!(options.scope, None);
}

#[test]
fn test_config_serialization_skips_unset_fields() {
    let config = Config {
        silent: true,
        sequence_delay_ms: None,
        scopes: vec![],
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("sequenceDelayMs"));

    let deserialized: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, config);
}

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("missing.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.json");
    std::fs::write(
        &path,
        r#"{ "silent": true, "sequenceDelayMs": 500, "scopes": [{ "name": "modal", "disabled": true }] }"#,
    )
    .unwrap();

    let config = load_config(&path);
    assert!(config.silent);
    assert_eq!(config.get_sequence_delay(), Duration::from_millis(500));
    assert_eq!(config.scopes[0].name, "modal");
    assert!(config.scopes[0].disabled);
    assert!(config.scopes[0].shortcuts.is_empty());
}

#[test]
fn test_malformed_config_falls_back_but_try_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert_eq!(load_config(&path), Config::default());
    match try_load_config(&path) {
        Err(crate::error::ShortcutError::Config { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_zero_sequence_delay_uses_default() {
    let config = Config {
        sequence_delay_ms: Some(0),
        ..Config::default()
    };
    assert_eq!(
        config.get_sequence_delay(),
        Duration::from_millis(DEFAULT_SEQUENCE_DELAY_MS)
    );
}
