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

//! src/core/conflict.rs
//!
//! Overlap rules between remap sources
//!
//! Two sources overlap when the same physical input could trigger both:
//! - equal keys or equal shortcuts
//! - a generic modifier (`Ctrl`) and a sided one (`LCtrl`) of the same family
//! - shortcuts with the same action key and families where at least one
//!   side is generic (`Ctrl+C` vs `LCtrl+C`)
//!
//! `LCtrl` and `RCtrl` never overlap: they are distinct physical keys.

use std::collections::HashMap;

use crate::core::keys::{ModifierFamily, ModifierSide, VirtualKey};
use crate::core::types::{normalize_app_name, RemapTarget, Shortcut};
use crate::core::validator::ValidationError;

/// Checks two single-key sources.
pub fn do_keys_overlap(first: VirtualKey, second: VirtualKey) -> Result<(), ValidationError> {
    if first == second {
        return Err(ValidationError::SameKeyPreviouslyMapped);
    }

    match (ModifierFamily::of(first), ModifierFamily::of(second)) {
        (Some(family), Some(other))
            if family == other
                && (first == family.generic_key() || second == family.generic_key()) =>
        {
            Err(ValidationError::ConflictingModifierKey)
        }
        _ => Ok(()),
    }
}

/// Checks two shortcut sources. Incomplete shortcuts never overlap.
pub fn do_shortcuts_overlap(first: &Shortcut, second: &Shortcut) -> Result<(), ValidationError> {
    if !first.is_valid() || !second.is_valid() {
        return Ok(());
    }
    if first == second {
        return Err(ValidationError::SameShortcutPreviouslyMapped);
    }
    if first.action_key() != second.action_key() {
        return Ok(());
    }

    let mut any_generic = false;
    for family in ModifierFamily::ALL {
        match (first.modifier_side(family), second.modifier_side(family)) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                any_generic |= a == ModifierSide::Either || b == ModifierSide::Either;
            }
            // One holds a family the other does not: different inputs
            _ => return Ok(()),
        }
    }

    if any_generic {
        Err(ValidationError::ConflictingModifierShortcut)
    } else {
        Ok(())
    }
}

/// Checks two sources of any kind. A key never overlaps a shortcut.
pub fn do_sources_overlap(first: &RemapTarget, second: &RemapTarget) -> Result<(), ValidationError> {
    match (first, second) {
        (RemapTarget::Key(a), RemapTarget::Key(b)) if !first.is_null() && !second.is_null() => {
            do_keys_overlap(*a, *b)
        }
        (RemapTarget::Combo(a), RemapTarget::Combo(b)) => do_shortcuts_overlap(a, b),
        _ => Ok(()),
    }
}

/// Two rows whose sources overlap
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// Application scope shared by both rows, empty for global rows
    pub app: String,
    /// Row indices, earlier row first
    pub first_row: usize,
    pub second_row: usize,
    pub error: ValidationError,
}

/// Collects sources per application scope and reports overlapping pairs.
///
/// Rows of different applications are independent, so each scope is
/// checked on its own.
#[derive(Debug, Default)]
pub struct ConflictDetector {
    scopes: HashMap<String, Vec<(usize, RemapTarget)>>,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the source of row `row`. Empty sources are ignored.
    pub fn add_source(&mut self, row: usize, app: &str, source: RemapTarget) {
        if source.is_null() {
            return;
        }
        self.scopes
            .entry(normalize_app_name(app))
            .or_default()
            .push((row, source));
    }

    /// Every overlapping pair, ordered by row.
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for (app, sources) in &self.scopes {
            for (i, (first_row, first)) in sources.iter().enumerate() {
                for (second_row, second) in &sources[i + 1..] {
                    if let Err(error) = do_sources_overlap(first, second) {
                        conflicts.push(Conflict {
                            app: app.clone(),
                            first_row: *first_row.min(second_row),
                            second_row: *first_row.max(second_row),
                            error,
                        });
                    }
                }
            }
        }

        conflicts.sort_by_key(|conflict| (conflict.first_row, conflict.second_row));
        conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.find_conflicts().is_empty()
    }

    /// Total number of sources tracked
    pub fn total_sources(&self) -> usize {
        self.scopes.values().map(|sources| sources.len()).sum()
    }
}
