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

//! src/core/buffer.rs
//!
//! The editor's in-progress remap table
//!
//! A `RemapBuffer` holds rows exactly as the user left them, including
//! half-filled ones. Edits go through `apply_key_selection` and
//! `apply_shortcut_selection`, which run the validator and only write what
//! it accepts. `check_if_remappings_are_valid` is the last gate before the
//! buffer is turned into live tables.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::core::keys::{ModifierFamily, VirtualKey, VK_NULL};
use crate::core::types::{normalize_app_name, RemapTarget, Shortcut};
use crate::core::validator::{
    validate_key_buffer_element, validate_shortcut_buffer_element, DropDownAction,
    ShortcutEdit, ValidationError,
};

/// Column of a row
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Column {
    /// The "from" column
    Source,
    /// The "to" column
    Target,
}

impl Column {
    pub fn other(self) -> Self {
        match self {
            Column::Source => Column::Target,
            Column::Target => Column::Source,
        }
    }
}

/// One editor row: a source, what it maps to, and an optional application
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemapBufferRow {
    pub source: RemapTarget,
    pub target: RemapTarget,
    /// Empty for rows that apply everywhere
    pub target_app: String,
}

impl RemapBufferRow {
    pub fn new(source: RemapTarget, target: RemapTarget) -> Self {
        Self {
            source,
            target,
            target_app: String::new(),
        }
    }

    /// Row applying only while `app` is in the foreground
    pub fn for_app(source: RemapTarget, target: RemapTarget, app: &str) -> Self {
        Self {
            source,
            target,
            target_app: app.to_string(),
        }
    }

    /// Empty key-to-key row
    pub fn empty_key_row() -> Self {
        Self::default()
    }

    /// Empty shortcut-to-shortcut row
    pub fn empty_shortcut_row() -> Self {
        Self::new(
            RemapTarget::Combo(Shortcut::new()),
            RemapTarget::Combo(Shortcut::new()),
        )
    }

    pub fn cell(&self, col: Column) -> &RemapTarget {
        match col {
            Column::Source => &self.source,
            Column::Target => &self.target,
        }
    }

    pub fn cell_mut(&mut self, col: Column) -> &mut RemapTarget {
        match col {
            Column::Source => &mut self.source,
            Column::Target => &mut self.target,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_null() && self.target.is_null()
    }

    /// Both columns hold something that can be committed
    pub fn is_complete(&self) -> bool {
        is_complete_cell(&self.source) && is_complete_cell(&self.target)
    }
}

fn is_complete_cell(cell: &RemapTarget) -> bool {
    match cell {
        RemapTarget::Key(key) => *key != VK_NULL,
        RemapTarget::Combo(shortcut) => shortcut.is_valid(),
    }
}

/// Rows being edited
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemapBuffer {
    rows: Vec<RemapBufferRow>,
}

impl RemapBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: RemapBufferRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[RemapBufferRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RemapBufferRow> {
        self.rows.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<RemapBufferRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validates a single-key cell edit and writes the result.
    ///
    /// On success the cell takes the selected key (or the null key when
    /// nothing valid was selected); on error it is reset to the null key.
    pub fn apply_key_selection(
        &mut self,
        row: usize,
        col: Column,
        selection: Option<VirtualKey>,
        available_keys: &[VirtualKey],
    ) -> Result<(), ValidationError> {
        let result = validate_key_buffer_element(row, col, selection, available_keys, self);

        if let Some(cell) = self.rows.get_mut(row).map(|r| r.cell_mut(col)) {
            *cell = match (&result, selection) {
                (Ok(()), Some(key)) if available_keys.contains(&key) => RemapTarget::Key(key),
                _ => RemapTarget::Key(VK_NULL),
            };
        }
        result
    }

    /// Validates a shortcut dropdown edit and, if accepted, stores the
    /// column's new key or shortcut. A refused edit leaves the row as it was.
    pub fn apply_shortcut_selection(
        &mut self,
        edit: &ShortcutEdit<'_>,
        available_keys: &[VirtualKey],
        allow_app_scoping: bool,
    ) -> Result<DropDownAction, ValidationError> {
        let action =
            validate_shortcut_buffer_element(edit, available_keys, self, allow_app_scoping)?;

        if let Some(row) = self.rows.get_mut(edit.row) {
            *row.cell_mut(edit.col) = edit.resulting_cell();
            if edit.col == Column::Source {
                row.target_app = edit.target_app.to_string();
            }
        }
        Ok(action)
    }

    pub fn check_if_remappings_are_valid(&self) -> Result<(), ValidationError> {
        check_if_remappings_are_valid(&self.rows)
    }

    pub fn orphaned_keys(&self) -> Vec<VirtualKey> {
        orphaned_keys(&self.rows)
    }
}

impl FromIterator<RemapBufferRow> for RemapBuffer {
    fn from_iter<I: IntoIterator<Item = RemapBufferRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Final check before committing rows.
///
/// Fails with `RemapUnsuccessful` when a row is half-filled or two rows
/// share a source within the same application. Fully empty rows are skipped.
pub fn check_if_remappings_are_valid(rows: &[RemapBufferRow]) -> Result<(), ValidationError> {
    let mut seen: HashMap<String, HashSet<RemapTarget>> = HashMap::new();

    for row in rows.iter().filter(|row| !row.is_empty()) {
        if !row.is_complete() {
            return Err(ValidationError::RemapUnsuccessful);
        }
        let sources = seen.entry(normalize_app_name(&row.target_app)).or_default();
        if !sources.insert(row.source) {
            return Err(ValidationError::RemapUnsuccessful);
        }
    }
    Ok(())
}

/// Keys remapped away by a complete row that no key-target row produces.
///
/// After committing, these keys can no longer be typed.
pub fn orphaned_keys(rows: &[RemapBufferRow]) -> Vec<VirtualKey> {
    let mut remapped = BTreeSet::new();
    let mut produced = HashSet::new();

    for row in rows.iter().filter(|row| row.is_complete()) {
        if let RemapTarget::Key(source) = row.source {
            remapped.insert(source);
            if let RemapTarget::Key(target) = row.target {
                produced.insert(target);
            }
        }
    }

    remapped
        .into_iter()
        .filter(|key| !produced.contains(key))
        .collect()
}

/// Replaces `left` and `right` with a single `combined` row when both map to
/// the same target.
pub fn combine_remappings<T: PartialEq>(
    table: &mut BTreeMap<VirtualKey, T>,
    left: VirtualKey,
    right: VirtualKey,
    combined: VirtualKey,
) {
    let same_target = matches!(
        (table.get(&left), table.get(&right)),
        (Some(a), Some(b)) if a == b
    );
    if !same_target || table.contains_key(&combined) {
        return;
    }
    table.remove(&right);
    if let Some(target) = table.remove(&left) {
        table.insert(combined, target);
    }
}

/// Folds every left/right modifier pair with the same target into its
/// generic key, for display.
pub fn pre_process_remap_table<T: PartialEq>(table: &mut BTreeMap<VirtualKey, T>) {
    for family in ModifierFamily::ALL {
        combine_remappings(
            table,
            family.left_key(),
            family.right_key(),
            family.generic_key(),
        );
    }
}

/// Expands a generic modifier source into its two sided keys.
///
/// The live single-key table matches physical keys, which always carry a
/// side. Any other source is returned as is.
pub fn split_generic_remap(source: VirtualKey) -> Vec<VirtualKey> {
    match ModifierFamily::of(source) {
        Some(family) if source == family.generic_key() => {
            vec![family.left_key(), family.right_key()]
        }
        _ => vec![source],
    }
}
