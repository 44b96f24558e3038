mod common;

use common::attrs;
use partialput_sync::SyncState;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn new_state_has_no_snapshot() {
    let state = SyncState::new();
    assert!(!state.has_synced());
    assert!(state.synced().is_none());
}

#[test]
fn unsaved_without_snapshot_is_everything() {
    let state = SyncState::new();
    let current = attrs(json!({"a": 1, "b": [1, 2]}));
    assert_eq!(state.unsaved(&current), current);
}

#[test]
fn unsaved_uses_deep_equality() {
    let mut state = SyncState::new();
    state.mark_synced(attrs(json!({"tags": ["x", "y"], "meta": {"n": 1}})));

    let same = attrs(json!({"tags": ["x", "y"], "meta": {"n": 1}}));
    assert!(state.unsaved(&same).is_empty());

    let nested_change = attrs(json!({"tags": ["x", "y"], "meta": {"n": 2}}));
    assert_eq!(state.unsaved(&nested_change), attrs(json!({"meta": {"n": 2}})));
}

#[test]
fn replace_returns_previous_snapshot() {
    let mut state = SyncState::new();
    assert_eq!(state.replace(Some(attrs(json!({"a": 1})))), None);
    assert_eq!(
        state.replace(None),
        Some(attrs(json!({"a": 1})))
    );
    assert!(!state.has_synced());
}

#[test]
fn merge_overlays_changes() {
    let mut state = SyncState::new();
    state.merge(attrs(json!({"a": 1})));
    assert_eq!(state.synced(), Some(&attrs(json!({"a": 1}))));

    state.merge(attrs(json!({"a": 2, "b": 3})));
    assert_eq!(state.synced(), Some(&attrs(json!({"a": 2, "b": 3}))));
}

#[test]
fn state_serializes_snapshot() {
    let mut state = SyncState::new();
    state.mark_synced(attrs(json!({"id": 1})));

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json, json!({"synced": {"id": 1}}));

    let back: SyncState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
}
