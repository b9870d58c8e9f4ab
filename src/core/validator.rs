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

//! src/core/validator.rs
//!
//! Validation engine for the remap editor
//!
//! The editor builds a table of rows, each with a "from" and a "to" column.
//! Every time the user picks a key in one of a column's dropdowns, the editor
//! asks this module whether the selection is acceptable and, for shortcut
//! columns, whether a dropdown should be added or removed.
//!
//! Both entry points are pure: they read a snapshot of the table and return
//! a verdict. Writing the accepted key back is done by `RemapBuffer`.

use thiserror::Error;

use crate::core::buffer::{Column, RemapBuffer};
use crate::core::conflict::{do_keys_overlap, do_shortcuts_overlap};
use crate::core::keys::{is_modifier_key, ModifierFamily, VirtualKey, VK_NULL};
use crate::core::types::{normalize_app_name, RemapTarget, Shortcut, MAX_SHORTCUT_SIZE};

/// Reasons an edit is refused, with the message shown to the user
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("Cannot remap a key more than once")]
    SameKeyPreviouslyMapped,

    #[error("Cannot remap a key to itself")]
    MapToSameKey,

    #[error("Cannot remap this key as it conflicts with another remapped key")]
    ConflictingModifierKey,

    #[error("Cannot remap a shortcut more than once")]
    SameShortcutPreviouslyMapped,

    #[error("Cannot remap a shortcut to itself")]
    MapToSameShortcut,

    #[error("Cannot remap this shortcut as it conflicts with another remapped shortcut")]
    ConflictingModifierShortcut,

    #[error("Cannot remap from/to Win L")]
    WinL,

    #[error("Cannot remap from/to Ctrl Alt Del")]
    CtrlAltDel,

    #[error("Some remappings were not applied")]
    RemapUnsuccessful,

    #[error("Shortcut must start with a modifier key")]
    ShortcutStartWithModifier,

    #[error("Shortcut cannot contain a repeated modifier")]
    ShortcutCannotHaveRepeatedModifier,

    #[error("Shortcut must have at least 2 keys")]
    ShortcutAtLeastTwoKeys,

    #[error("Shortcut must contain an action key")]
    ShortcutOneActionKey,

    #[error("Shortcut cannot have more than one action key")]
    ShortcutNotMoreThanOneActionKey,

    #[error("Shortcuts can only have up to 2 modifier keys")]
    ShortcutMaxSizeOneActionKey,
}

/// What the editor should do with the column's dropdowns after an edit
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DropDownAction {
    #[default]
    NoAction,
    /// Append an empty dropdown after the edited one
    AddDropDown,
    /// Remove the edited dropdown
    DeleteDropDown,
    /// Remove every empty dropdown after the edited one
    ClearUnusedDropDowns,
}

/// State of one dropdown
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeySelection {
    /// Nothing chosen yet
    #[default]
    Empty,
    /// The explicit "None" entry, asking for the slot to be removed
    Cleared,
    Key(VirtualKey),
}

impl KeySelection {
    /// Maps a raw dropdown value: `VK_NULL` is the "None" entry.
    pub fn from_key(key: VirtualKey) -> Self {
        if key == VK_NULL {
            KeySelection::Cleared
        } else {
            KeySelection::Key(key)
        }
    }

    pub fn key(self) -> Option<VirtualKey> {
        match self {
            KeySelection::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_key(self) -> bool {
        matches!(self, KeySelection::Key(_))
    }
}

/// One dropdown edit inside a shortcut column
#[derive(Clone, Copy, Debug)]
pub struct ShortcutEdit<'a> {
    pub row: usize,
    pub col: Column,
    /// Index of the dropdown that changed
    pub slot: usize,
    /// The new value of that dropdown
    pub selection: KeySelection,
    /// Every dropdown of the column, the new value included
    pub slots: &'a [KeySelection],
    pub target_app: &'a str,
    /// The column accepts a lone key as well as a shortcut
    pub is_hybrid: bool,
}

impl ShortcutEdit<'_> {
    /// Keys selected in the column, in dropdown order
    pub fn selected_keys(&self) -> Vec<VirtualKey> {
        self.slots.iter().filter_map(|slot| slot.key()).collect()
    }

    /// The cell value the column would hold after the edit.
    ///
    /// A hybrid column holding a single key is a key, anything else is a
    /// shortcut.
    pub fn resulting_cell(&self) -> RemapTarget {
        let keys = self.selected_keys();
        match keys.as_slice() {
            [key] if self.is_hybrid => RemapTarget::Key(*key),
            _ => RemapTarget::Combo(Shortcut::from_keys(&keys)),
        }
    }
}

/// Validates a key picked for a single-key cell.
///
/// `None`, or a key missing from `available_keys`, clears the cell and is
/// always accepted.
pub fn validate_key_buffer_element(
    row: usize,
    col: Column,
    selection: Option<VirtualKey>,
    available_keys: &[VirtualKey],
    buffer: &RemapBuffer,
) -> Result<(), ValidationError> {
    let Some(key) = selection.filter(|key| available_keys.contains(key)) else {
        return Ok(());
    };
    let Some(current) = buffer.row(row) else {
        return Ok(());
    };

    if let RemapTarget::Key(other) = current.cell(col.other()) {
        if *other == key {
            return Err(ValidationError::MapToSameKey);
        }
    }

    // Only sources can collide with other rows
    if col == Column::Source {
        for (index, other_row) in buffer.rows().iter().enumerate() {
            if index == row {
                continue;
            }
            if let RemapTarget::Key(other) = other_row.source {
                if other != VK_NULL {
                    do_keys_overlap(other, key)?;
                }
            }
        }
    }

    Ok(())
}

/// Validates one dropdown edit in a shortcut column.
///
/// On error the dropdown action is always `NoAction`, so only the error is
/// returned. With `allow_app_scoping`, rows bound to a different application
/// never conflict with the edited row.
pub fn validate_shortcut_buffer_element(
    edit: &ShortcutEdit<'_>,
    available_keys: &[VirtualKey],
    buffer: &RemapBuffer,
    allow_app_scoping: bool,
) -> Result<DropDownAction, ValidationError> {
    let selection = match edit.selection {
        KeySelection::Key(key) if !available_keys.contains(&key) => KeySelection::Empty,
        other => other,
    };
    if selection == KeySelection::Empty {
        return Ok(DropDownAction::NoAction);
    }

    let action = check_slot(edit, selection)?;
    check_resulting_cell(edit, buffer, allow_app_scoping)?;
    Ok(action)
}

/// Dropdown-level rules: shape of the shortcut being built
fn check_slot(
    edit: &ShortcutEdit<'_>,
    selection: KeySelection,
) -> Result<DropDownAction, ValidationError> {
    let count = edit.slots.len();
    let is_last = edit.slot + 1 >= count;
    let selected_modifier = selection.key().filter(|key| is_modifier_key(*key));

    if count == 1 && selected_modifier.is_none() && !edit.is_hybrid {
        return Err(ValidationError::ShortcutStartWithModifier);
    }

    let later_empty = edit
        .slots
        .iter()
        .skip(edit.slot + 1)
        .all(|slot| !slot.is_key());

    if is_last {
        return match selection {
            KeySelection::Key(key) if selected_modifier.is_some() => {
                if count >= MAX_SHORTCUT_SIZE {
                    Err(ValidationError::ShortcutMaxSizeOneActionKey)
                } else if repeats_family(edit, key) {
                    Err(ValidationError::ShortcutCannotHaveRepeatedModifier)
                } else {
                    Ok(DropDownAction::AddDropDown)
                }
            }
            KeySelection::Key(_) => Ok(DropDownAction::NoAction),
            _ if edit.is_hybrid && count == 2 => Ok(DropDownAction::DeleteDropDown),
            _ => Err(ValidationError::ShortcutOneActionKey),
        };
    }

    match selection {
        KeySelection::Key(key) if selected_modifier.is_some() => {
            if repeats_family(edit, key) {
                Err(ValidationError::ShortcutCannotHaveRepeatedModifier)
            } else {
                Ok(DropDownAction::NoAction)
            }
        }
        KeySelection::Key(_) if edit.slot != 0 || edit.is_hybrid => {
            if later_empty {
                Ok(DropDownAction::ClearUnusedDropDowns)
            } else {
                Err(ValidationError::ShortcutNotMoreThanOneActionKey)
            }
        }
        KeySelection::Key(_) => Err(ValidationError::ShortcutStartWithModifier),
        _ => {
            let earlier_filled =
                edit.slot > 0 && edit.slots[..edit.slot].iter().all(|slot| slot.is_key());
            if later_empty && earlier_filled {
                Ok(DropDownAction::ClearUnusedDropDowns)
            } else if count > 2 || edit.is_hybrid {
                Ok(DropDownAction::DeleteDropDown)
            } else if edit.slot == 0 {
                Err(ValidationError::ShortcutAtLeastTwoKeys)
            } else {
                Err(ValidationError::ShortcutOneActionKey)
            }
        }
    }
}

/// Whether another dropdown of the column already holds `key`'s family.
fn repeats_family(edit: &ShortcutEdit<'_>, key: VirtualKey) -> bool {
    let Some(family) = ModifierFamily::of(key) else {
        return false;
    };
    edit.slots
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != edit.slot)
        .filter_map(|(_, slot)| slot.key())
        .any(|other| ModifierFamily::of(other) == Some(family))
}

/// Row- and table-level rules on the value the column would hold
fn check_resulting_cell(
    edit: &ShortcutEdit<'_>,
    buffer: &RemapBuffer,
    allow_app_scoping: bool,
) -> Result<(), ValidationError> {
    let cell = edit.resulting_cell();

    if let RemapTarget::Combo(shortcut) = &cell {
        if shortcut.is_win_l() {
            return Err(ValidationError::WinL);
        }
        if shortcut.is_ctrl_alt_del() {
            return Err(ValidationError::CtrlAltDel);
        }
    }

    let Some(current) = buffer.row(edit.row) else {
        return Ok(());
    };

    match (&cell, current.cell(edit.col.other())) {
        (RemapTarget::Key(key), RemapTarget::Key(other)) if key == other => {
            return Err(ValidationError::MapToSameKey);
        }
        (RemapTarget::Combo(shortcut), RemapTarget::Combo(other))
            if shortcut.is_valid() && shortcut == other =>
        {
            return Err(ValidationError::MapToSameShortcut);
        }
        _ => {}
    }

    if edit.col != Column::Source {
        return Ok(());
    }

    let app = normalize_app_name(edit.target_app);
    for (index, other_row) in buffer.rows().iter().enumerate() {
        if index == edit.row {
            continue;
        }
        if allow_app_scoping && normalize_app_name(&other_row.target_app) != app {
            continue;
        }
        match (&cell, &other_row.source) {
            (RemapTarget::Key(key), RemapTarget::Key(other)) if *other != VK_NULL => {
                do_keys_overlap(*other, *key)?;
            }
            (RemapTarget::Combo(shortcut), RemapTarget::Combo(other)) => {
                do_shortcuts_overlap(other, shortcut)?;
            }
            _ => {}
        }
    }

    Ok(())
}
