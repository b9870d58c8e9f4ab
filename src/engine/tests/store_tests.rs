// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Remap table store tests

use crate::core::keys::*;
use crate::core::types::{RemapTarget, Shortcut};
use crate::engine::{RemapTableStore, RemapTables, StoreError};

const VK_A: VirtualKey = 0x41;
const VK_B: VirtualKey = 0x42;
const VK_C: VirtualKey = 0x43;
const VK_L: VirtualKey = 0x4C;
const VK_V: VirtualKey = 0x56;

fn ctrl(key: VirtualKey) -> Shortcut {
    Shortcut::from_keys(&[VK_CONTROL, key])
}

#[test]
fn test_duplicate_single_key_is_rejected() {
    let store = RemapTableStore::new();
    store.add_single_key_remap(VK_A, VK_B).unwrap();

    let result = store.add_single_key_remap(VK_A, VK_C);
    assert_eq!(result, Err(StoreError::DuplicateKey("A".to_string())));
    assert_eq!(store.snapshot().single_key.get(&VK_A), Some(&VK_B));
}

#[test]
fn test_null_source_is_rejected() {
    let store = RemapTableStore::new();
    assert_eq!(store.add_single_key_remap(VK_NULL, VK_A), Err(StoreError::NullKey));
    assert_eq!(store.add_toggle_to_mod_key(VK_NULL), Err(StoreError::NullKey));
}

#[test]
fn test_duplicate_toggle_key_is_rejected() {
    let store = RemapTableStore::new();
    store.add_toggle_to_mod_key(VK_CAPITAL).unwrap();
    assert!(matches!(
        store.add_toggle_to_mod_key(VK_CAPITAL),
        Err(StoreError::DuplicateToggleKey(_))
    ));
}

#[test]
fn test_invalid_shortcuts_are_rejected() {
    let store = RemapTableStore::new();

    // No modifier
    let bare = Shortcut::from_keys(&[VK_A]);
    assert!(matches!(
        store.add_os_level_shortcut(bare, RemapTarget::Key(VK_B)),
        Err(StoreError::InvalidShortcut(_))
    ));

    // A shortcut target cannot be disabled
    assert!(matches!(
        store.add_os_level_shortcut(ctrl(VK_A), RemapTarget::DISABLED),
        Err(StoreError::InvalidTarget(_))
    ));

    assert!(store.snapshot().is_empty());
}

#[test]
fn test_reserved_shortcuts_are_rejected() {
    let store = RemapTableStore::new();
    let win_l = Shortcut::from_keys(&[VK_WIN_BOTH, VK_L]);
    let ctrl_alt_del = Shortcut::from_keys(&[VK_CONTROL, VK_MENU, VK_DELETE]);

    assert!(matches!(
        store.add_os_level_shortcut(win_l, RemapTarget::Key(VK_A)),
        Err(StoreError::ReservedShortcut(_))
    ));
    assert!(matches!(
        store.add_os_level_shortcut(ctrl(VK_A), RemapTarget::Combo(ctrl_alt_del)),
        Err(StoreError::ReservedShortcut(_))
    ));
}

#[test]
fn test_duplicate_shortcut_per_app() {
    let store = RemapTableStore::new();
    store
        .add_app_specific_shortcut("notepad.exe", ctrl(VK_C), RemapTarget::Key(VK_V))
        .unwrap();

    // Same source for another application is fine
    store
        .add_app_specific_shortcut("code.exe", ctrl(VK_C), RemapTarget::Key(VK_V))
        .unwrap();

    assert!(matches!(
        store.add_app_specific_shortcut("NOTEPAD.EXE", ctrl(VK_C), RemapTarget::Key(VK_A)),
        Err(StoreError::DuplicateShortcut(_))
    ));
    assert_eq!(
        store.add_app_specific_shortcut("  ", ctrl(VK_C), RemapTarget::Key(VK_A)),
        Err(StoreError::EmptyAppName)
    );
}

#[test]
fn test_clear_operations_empty_each_table() {
    let store = RemapTableStore::new();
    store.add_single_key_remap(VK_A, VK_B).unwrap();
    store.add_toggle_to_mod_key(VK_CAPITAL).unwrap();
    store.add_os_level_shortcut(ctrl(VK_C), RemapTarget::Key(VK_V)).unwrap();
    store
        .add_app_specific_shortcut("notepad.exe", ctrl(VK_C), RemapTarget::Key(VK_V))
        .unwrap();
    assert_eq!(store.snapshot().len(), 4);

    store.clear_single_key_remaps();
    store.clear_toggle_keys();
    assert_eq!(store.snapshot().len(), 2);

    store.clear_os_level_shortcuts();
    store.clear_app_specific_shortcuts();
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_replace_all_swaps_every_table() {
    let store = RemapTableStore::new();
    store.add_single_key_remap(VK_A, VK_B).unwrap();

    let mut tables = RemapTables::new();
    tables.add_single_key_remap(VK_C, VK_V).unwrap();
    tables.add_toggle_to_mod_key(VK_NUMLOCK).unwrap();
    tables
        .add_os_level_shortcut(ctrl(VK_C), RemapTarget::Combo(ctrl(VK_V)))
        .unwrap();
    tables
        .add_app_specific_shortcut("Notepad.exe", ctrl(VK_A), RemapTarget::Key(VK_ESCAPE))
        .unwrap();

    store.replace_all(tables.clone());

    let snapshot = store.snapshot();
    assert_eq!(snapshot, tables);
    assert!(!snapshot.single_key.contains_key(&VK_A));
    assert!(snapshot.app_shortcuts.contains_key("notepad.exe"));
    assert_eq!(store.toggle_state(VK_NUMLOCK), Some(false));
}

#[test]
fn test_staged_tables_apply_same_checks() {
    let mut tables = RemapTables::new();
    tables.add_single_key_remap(VK_A, VK_B).unwrap();

    assert!(tables.add_single_key_remap(VK_A, VK_C).is_err());
    assert!(tables
        .add_os_level_shortcut(Shortcut::from_keys(&[VK_A]), RemapTarget::Key(VK_B))
        .is_err());
    assert_eq!(tables.len(), 1);
}

#[test]
fn test_staged_and_live_tables_refuse_the_same_rows() {
    let store = RemapTableStore::new();
    let mut tables = RemapTables::new();

    let win_l = Shortcut::from_keys(&[VK_LWIN, VK_L]);
    let bare = Shortcut::from_keys(&[VK_A]);
    let shortcut_rows = [
        ("", ctrl(VK_A), RemapTarget::Key(VK_B)),
        ("", ctrl(VK_A), RemapTarget::Key(VK_C)),
        ("", bare, RemapTarget::Key(VK_B)),
        ("", ctrl(VK_B), RemapTarget::Combo(win_l)),
        ("", ctrl(VK_C), RemapTarget::DISABLED),
        ("Notepad.exe", ctrl(VK_V), RemapTarget::Key(VK_B)),
        ("  notepad.exe ", ctrl(VK_V), RemapTarget::Key(VK_C)),
        ("   ", ctrl(VK_V), RemapTarget::Key(VK_C)),
        ("code.exe", win_l, RemapTarget::Key(VK_B)),
    ];

    for (app, source, target) in shortcut_rows {
        let (live, staged) = if app.is_empty() {
            (
                store.add_os_level_shortcut(source, target),
                tables.add_os_level_shortcut(source, target),
            )
        } else {
            (
                store.add_app_specific_shortcut(app, source, target),
                tables.add_app_specific_shortcut(app, source, target),
            )
        };
        assert_eq!(live, staged, "app '{}' source {}", app, source);
    }

    for (source, target) in [(VK_A, VK_B), (VK_A, VK_C), (VK_NULL, VK_B)] {
        assert_eq!(
            store.add_single_key_remap(source, target),
            tables.add_single_key_remap(source, target)
        );
    }
    for key in [VK_CAPITAL, VK_CAPITAL, VK_NULL] {
        assert_eq!(
            store.add_toggle_to_mod_key(key),
            tables.add_toggle_to_mod_key(key)
        );
    }

    assert_eq!(store.snapshot(), tables);
}
