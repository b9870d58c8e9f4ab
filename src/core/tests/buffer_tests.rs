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

use std::collections::BTreeMap;

use crate::core::buffer::{
    check_if_remappings_are_valid, combine_remappings, pre_process_remap_table,
    split_generic_remap,
};
use crate::core::keys::*;
use crate::core::{
    Column, DropDownAction, KeySelection, RemapBuffer, RemapBufferRow, RemapTarget, Shortcut,
    ShortcutEdit, ValidationError,
};

const VK_A: VirtualKey = 0x41;
const VK_B: VirtualKey = 0x42;
const VK_C: VirtualKey = 0x43;
const VK_V: VirtualKey = 0x56;

fn combo(keys: &[VirtualKey]) -> RemapTarget {
    RemapTarget::Combo(Shortcut::from_keys(keys))
}

fn key_row(source: VirtualKey, target: VirtualKey) -> RemapBufferRow {
    RemapBufferRow::new(RemapTarget::Key(source), RemapTarget::Key(target))
}

#[test]
fn test_apply_key_selection_writes_accepted_key() {
    let mut buffer: RemapBuffer = [RemapBufferRow::empty_key_row()].into_iter().collect();

    let result = buffer.apply_key_selection(0, Column::Source, Some(VK_B), &selectable_keys());
    assert_eq!(result, Ok(()));
    assert_eq!(buffer.rows()[0], key_row(VK_B, VK_NULL));
}

#[test]
fn test_apply_key_selection_keeps_shortcut_target() {
    let mut buffer: RemapBuffer =
        [RemapBufferRow::new(RemapTarget::DISABLED, combo(&[VK_CONTROL, VK_A]))]
            .into_iter()
            .collect();

    buffer
        .apply_key_selection(0, Column::Source, Some(VK_B), &selectable_keys())
        .unwrap();
    assert_eq!(buffer.rows()[0].source, RemapTarget::Key(VK_B));
    assert_eq!(buffer.rows()[0].target, combo(&[VK_CONTROL, VK_A]));
}

#[test]
fn test_apply_key_selection_clears_cell_on_error() {
    let mut buffer: RemapBuffer = [key_row(VK_A, VK_B), key_row(VK_C, VK_V)]
        .into_iter()
        .collect();

    let result = buffer.apply_key_selection(1, Column::Source, Some(VK_A), &selectable_keys());
    assert_eq!(result, Err(ValidationError::SameKeyPreviouslyMapped));
    assert_eq!(buffer.rows()[1], key_row(VK_NULL, VK_V));
    assert_eq!(buffer.rows()[0], key_row(VK_A, VK_B));
}

#[test]
fn test_apply_key_selection_none_clears_cell() {
    let mut buffer: RemapBuffer = [key_row(VK_A, VK_B)].into_iter().collect();

    assert_eq!(
        buffer.apply_key_selection(0, Column::Target, None, &selectable_keys()),
        Ok(())
    );
    assert_eq!(buffer.rows()[0], key_row(VK_A, VK_NULL));
}

#[test]
fn test_apply_shortcut_selection_builds_shortcut() {
    let mut buffer: RemapBuffer = [RemapBufferRow::empty_shortcut_row()].into_iter().collect();
    let keys = selectable_keys();

    let slots = [KeySelection::Key(VK_CONTROL)];
    let edit = ShortcutEdit {
        row: 0,
        col: Column::Source,
        slot: 0,
        selection: slots[0],
        slots: &slots,
        target_app: "Notepad.exe",
        is_hybrid: false,
    };
    assert_eq!(
        buffer.apply_shortcut_selection(&edit, &keys, true),
        Ok(DropDownAction::AddDropDown)
    );

    let slots = [KeySelection::Key(VK_CONTROL), KeySelection::Key(VK_A)];
    let edit = ShortcutEdit {
        slot: 1,
        selection: slots[1],
        slots: &slots,
        ..edit
    };
    assert_eq!(
        buffer.apply_shortcut_selection(&edit, &keys, true),
        Ok(DropDownAction::NoAction)
    );

    let row = &buffer.rows()[0];
    assert_eq!(row.source, combo(&[VK_CONTROL, VK_A]));
    assert_eq!(row.target_app, "Notepad.exe");
}

#[test]
fn test_apply_shortcut_selection_hybrid_single_key() {
    let mut buffer: RemapBuffer = [RemapBufferRow::new(
        combo(&[VK_CONTROL, VK_C]),
        RemapTarget::Combo(Shortcut::new()),
    )]
    .into_iter()
    .collect();

    let slots = [KeySelection::Key(VK_ESCAPE)];
    let edit = ShortcutEdit {
        row: 0,
        col: Column::Target,
        slot: 0,
        selection: slots[0],
        slots: &slots,
        target_app: "",
        is_hybrid: true,
    };
    buffer
        .apply_shortcut_selection(&edit, &selectable_keys(), false)
        .unwrap();
    assert_eq!(buffer.rows()[0].target, RemapTarget::Key(VK_ESCAPE));
}

#[test]
fn test_refused_shortcut_edit_leaves_row_unchanged() {
    let mut buffer: RemapBuffer = [
        RemapBufferRow::new(combo(&[VK_CONTROL, VK_C]), combo(&[VK_CONTROL, VK_V])),
        RemapBufferRow::new(combo(&[VK_CONTROL, VK_B]), combo(&[VK_MENU, VK_V])),
    ]
    .into_iter()
    .collect();
    let before = buffer.clone();

    let slots = [KeySelection::Key(VK_CONTROL), KeySelection::Key(VK_C)];
    let edit = ShortcutEdit {
        row: 1,
        col: Column::Source,
        slot: 1,
        selection: slots[1],
        slots: &slots,
        target_app: "",
        is_hybrid: false,
    };
    assert_eq!(
        buffer.apply_shortcut_selection(&edit, &selectable_keys(), false),
        Err(ValidationError::SameShortcutPreviouslyMapped)
    );
    assert_eq!(buffer, before);
}

#[test]
fn test_complete_buffer_is_valid() {
    let buffer: RemapBuffer = [
        key_row(VK_CAPITAL, VK_LCONTROL),
        key_row(VK_INSERT, VK_NULL),
        RemapBufferRow::new(combo(&[VK_WIN_BOTH, VK_C]), combo(&[VK_CONTROL, VK_C])),
        RemapBufferRow::new(combo(&[VK_CONTROL, 0x51]), RemapTarget::Key(VK_ESCAPE)),
    ]
    .into_iter()
    .collect();

    // A null target is an unfinished row, not a disabled key
    assert_eq!(
        buffer.check_if_remappings_are_valid(),
        Err(ValidationError::RemapUnsuccessful)
    );

    let rows: Vec<_> = buffer
        .rows()
        .iter()
        .filter(|row| row.source != RemapTarget::Key(VK_INSERT))
        .cloned()
        .collect();
    assert_eq!(check_if_remappings_are_valid(&rows), Ok(()));
}

#[test]
fn test_incomplete_rows_fail_commit() {
    for row in [
        key_row(VK_A, VK_NULL),
        key_row(VK_NULL, VK_A),
        RemapBufferRow::new(combo(&[VK_CONTROL]), combo(&[VK_CONTROL, VK_V])),
        RemapBufferRow::new(combo(&[VK_CONTROL, VK_C]), combo(&[VK_V])),
    ] {
        assert_eq!(
            check_if_remappings_are_valid(&[row.clone()]),
            Err(ValidationError::RemapUnsuccessful),
            "{:?}",
            row
        );
    }
}

#[test]
fn test_empty_rows_are_skipped_on_commit() {
    let rows = [
        RemapBufferRow::empty_key_row(),
        RemapBufferRow::empty_shortcut_row(),
        key_row(VK_A, VK_B),
    ];
    assert_eq!(check_if_remappings_are_valid(&rows), Ok(()));
}

#[test]
fn test_duplicate_sources_fail_commit_per_app() {
    let ctrl_a = combo(&[VK_CONTROL, VK_A]);
    let alt_v = combo(&[VK_MENU, VK_V]);

    let rows = [
        RemapBufferRow::new(ctrl_a, alt_v),
        RemapBufferRow::for_app(ctrl_a, alt_v, "notepad.exe"),
    ];
    assert_eq!(check_if_remappings_are_valid(&rows), Ok(()));

    let rows = [
        RemapBufferRow::for_app(ctrl_a, alt_v, "notepad.exe"),
        RemapBufferRow::for_app(ctrl_a, RemapTarget::Key(VK_ESCAPE), "Notepad.exe"),
    ];
    assert_eq!(
        check_if_remappings_are_valid(&rows),
        Err(ValidationError::RemapUnsuccessful)
    );
}

#[test]
fn test_orphaned_keys() {
    let buffer: RemapBuffer = [
        key_row(VK_A, VK_B),
        key_row(VK_B, VK_A),
        key_row(VK_CAPITAL, VK_LCONTROL),
        RemapBufferRow::new(RemapTarget::Key(VK_C), combo(&[VK_CONTROL, VK_V])),
        key_row(VK_V, VK_NULL),
    ]
    .into_iter()
    .collect();

    // A and B still exist through each other; V's row is incomplete
    assert_eq!(buffer.orphaned_keys(), vec![VK_CAPITAL, VK_C]);
}

#[test]
fn test_combine_remappings_needs_same_target() {
    let mut table = BTreeMap::from([(VK_LCONTROL, VK_A), (VK_RCONTROL, VK_A)]);
    combine_remappings(&mut table, VK_LCONTROL, VK_RCONTROL, VK_CONTROL);
    assert_eq!(table, BTreeMap::from([(VK_CONTROL, VK_A)]));

    let mut table = BTreeMap::from([(VK_LSHIFT, VK_A), (VK_RSHIFT, VK_B)]);
    combine_remappings(&mut table, VK_LSHIFT, VK_RSHIFT, VK_SHIFT);
    assert_eq!(table.len(), 2);

    let mut table = BTreeMap::from([(VK_LMENU, VK_A)]);
    combine_remappings(&mut table, VK_LMENU, VK_RMENU, VK_MENU);
    assert_eq!(table, BTreeMap::from([(VK_LMENU, VK_A)]));
}

#[test]
fn test_pre_process_remap_table_folds_every_family() {
    let mut table = BTreeMap::from([
        (VK_LWIN, VK_A),
        (VK_RWIN, VK_A),
        (VK_LSHIFT, VK_B),
        (VK_RSHIFT, VK_B),
        (VK_LMENU, VK_C),
        (VK_CAPITAL, VK_ESCAPE),
    ]);
    pre_process_remap_table(&mut table);

    assert_eq!(
        table,
        BTreeMap::from([
            (VK_WIN_BOTH, VK_A),
            (VK_SHIFT, VK_B),
            (VK_LMENU, VK_C),
            (VK_CAPITAL, VK_ESCAPE),
        ])
    );
}

#[test]
fn test_split_generic_remap() {
    assert_eq!(split_generic_remap(VK_CONTROL), vec![VK_LCONTROL, VK_RCONTROL]);
    assert_eq!(split_generic_remap(VK_WIN_BOTH), vec![VK_LWIN, VK_RWIN]);
    assert_eq!(split_generic_remap(VK_LSHIFT), vec![VK_LSHIFT]);
    assert_eq!(split_generic_remap(VK_A), vec![VK_A]);
}

#[test]
fn test_buffer_row_access() {
    let mut buffer = RemapBuffer::new();
    assert!(buffer.is_empty());

    buffer.push(key_row(VK_A, VK_B));
    buffer.push(RemapBufferRow::empty_key_row());
    assert_eq!(buffer.len(), 2);
    assert!(buffer.row(1).is_some_and(RemapBufferRow::is_empty));

    assert_eq!(buffer.remove(0), Some(key_row(VK_A, VK_B)));
    assert_eq!(buffer.remove(5), None);
    assert_eq!(buffer.len(), 1);
}
