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

//! src/engine/store.rs
//!
//! Live remap tables consulted by the hook handlers
//!
//! Every collection sits behind its own `parking_lot::Mutex`. Handlers lock
//! exactly one collection, copy out or mutate what they need, and release it
//! before injecting input. Committing new settings swaps each collection
//! wholesale, so matching never observes a half-built table.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;

use crate::core::keys::{key_name, VirtualKey, VK_NULL};
use crate::core::types::{normalize_app_name, RemapEntry, RemapTarget, Shortcut};

/// Shortcut table iterated in `Shortcut` order
pub type ShortcutTable = BTreeMap<Shortcut, RemapEntry>;

/// Reasons a row is refused by the store
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("The null key cannot be remapped")]
    NullKey,

    #[error("Key {0} is already remapped")]
    DuplicateKey(String),

    #[error("Key {0} is already registered as a toggle key")]
    DuplicateToggleKey(String),

    #[error("Shortcut {0} is already remapped")]
    DuplicateShortcut(String),

    #[error("Invalid shortcut '{0}': it needs one action key and at least one modifier")]
    InvalidShortcut(String),

    #[error("Invalid remap target '{0}'")]
    InvalidTarget(String),

    #[error("{0} is reserved by the system and cannot be remapped")]
    ReservedShortcut(String),

    #[error("Application name cannot be empty")]
    EmptyAppName,
}

// Row rules shared by the staged tables and the live store. `is_taken` says
// whether the destination table already holds the source.

fn check_single_key_row(source: VirtualKey, is_taken: bool) -> Result<(), StoreError> {
    if source == VK_NULL {
        return Err(StoreError::NullKey);
    }
    if is_taken {
        return Err(StoreError::DuplicateKey(key_name(source)));
    }
    Ok(())
}

fn check_toggle_key_row(key: VirtualKey, is_taken: bool) -> Result<(), StoreError> {
    if key == VK_NULL {
        return Err(StoreError::NullKey);
    }
    if is_taken {
        return Err(StoreError::DuplicateToggleKey(key_name(key)));
    }
    Ok(())
}

fn check_shortcut_row(
    source: &Shortcut,
    target: &RemapTarget,
    is_taken: bool,
) -> Result<(), StoreError> {
    if !source.is_valid() {
        return Err(StoreError::InvalidShortcut(source.to_string()));
    }
    if source.is_win_l() || source.is_ctrl_alt_del() {
        return Err(StoreError::ReservedShortcut(source.to_string()));
    }
    match target {
        RemapTarget::Key(VK_NULL) => return Err(StoreError::InvalidTarget(target.to_string())),
        RemapTarget::Key(_) => {}
        RemapTarget::Combo(shortcut) if !shortcut.is_valid() => {
            return Err(StoreError::InvalidTarget(shortcut.to_string()));
        }
        RemapTarget::Combo(shortcut) if shortcut.is_win_l() || shortcut.is_ctrl_alt_del() => {
            return Err(StoreError::ReservedShortcut(shortcut.to_string()));
        }
        RemapTarget::Combo(_) => {}
    }
    if is_taken {
        return Err(StoreError::DuplicateShortcut(source.to_string()));
    }
    Ok(())
}

/// Normalized application name, refused when blank
fn checked_app_name(app: &str) -> Result<String, StoreError> {
    let app = normalize_app_name(app);
    if app.is_empty() {
        return Err(StoreError::EmptyAppName);
    }
    Ok(app)
}

/// A complete set of tables, staged before being committed with
/// `RemapTableStore::replace_all`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemapTables {
    pub single_key: BTreeMap<VirtualKey, VirtualKey>,
    pub toggle_keys: BTreeSet<VirtualKey>,
    pub os_shortcuts: BTreeMap<Shortcut, RemapTarget>,
    pub app_shortcuts: BTreeMap<String, BTreeMap<Shortcut, RemapTarget>>,
}

impl RemapTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single_key_remap(
        &mut self,
        source: VirtualKey,
        target: VirtualKey,
    ) -> Result<(), StoreError> {
        check_single_key_row(source, self.single_key.contains_key(&source))?;
        self.single_key.insert(source, target);
        Ok(())
    }

    pub fn add_toggle_to_mod_key(&mut self, key: VirtualKey) -> Result<(), StoreError> {
        check_toggle_key_row(key, self.toggle_keys.contains(&key))?;
        self.toggle_keys.insert(key);
        Ok(())
    }

    pub fn add_os_level_shortcut(
        &mut self,
        source: Shortcut,
        target: RemapTarget,
    ) -> Result<(), StoreError> {
        check_shortcut_row(&source, &target, self.os_shortcuts.contains_key(&source))?;
        self.os_shortcuts.insert(source, target);
        Ok(())
    }

    pub fn add_app_specific_shortcut(
        &mut self,
        app: &str,
        source: Shortcut,
        target: RemapTarget,
    ) -> Result<(), StoreError> {
        let app = checked_app_name(app)?;
        let is_taken = self
            .app_shortcuts
            .get(&app)
            .is_some_and(|table| table.contains_key(&source));
        check_shortcut_row(&source, &target, is_taken)?;

        self.app_shortcuts.entry(app).or_default().insert(source, target);
        Ok(())
    }

    /// Total number of rows across all tables
    pub fn len(&self) -> usize {
        self.single_key.len()
            + self.toggle_keys.len()
            + self.os_shortcuts.len()
            + self.app_shortcuts.values().map(|t| t.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn live_table(rows: &BTreeMap<Shortcut, RemapTarget>) -> ShortcutTable {
    rows.iter()
        .map(|(source, target)| (*source, RemapEntry::new(*target)))
        .collect()
}

/// Process-wide remap tables read by the hook handlers
#[derive(Debug, Default)]
pub struct RemapTableStore {
    pub(crate) single_key: Mutex<HashMap<VirtualKey, VirtualKey>>,
    pub(crate) toggle_keys: Mutex<HashMap<VirtualKey, bool>>,
    pub(crate) os_shortcuts: Mutex<ShortcutTable>,
    pub(crate) app_shortcuts: Mutex<HashMap<String, ShortcutTable>>,
    pub(crate) activated_app: Mutex<String>,
}

impl RemapTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source → target`. A `VK_NULL` target disables the source key.
    pub fn add_single_key_remap(
        &self,
        source: VirtualKey,
        target: VirtualKey,
    ) -> Result<(), StoreError> {
        let mut table = self.single_key.lock();
        check_single_key_row(source, table.contains_key(&source))?;
        table.insert(source, target);
        Ok(())
    }

    /// Registers `key` to behave as a modifier instead of a toggle.
    pub fn add_toggle_to_mod_key(&self, key: VirtualKey) -> Result<(), StoreError> {
        let mut table = self.toggle_keys.lock();
        check_toggle_key_row(key, table.contains_key(&key))?;
        table.insert(key, false);
        Ok(())
    }

    pub fn add_os_level_shortcut(
        &self,
        source: Shortcut,
        target: RemapTarget,
    ) -> Result<(), StoreError> {
        let mut table = self.os_shortcuts.lock();
        check_shortcut_row(&source, &target, table.contains_key(&source))?;
        table.insert(source, RemapEntry::new(target));
        Ok(())
    }

    /// Adds a shortcut remap active only while `app` is in the foreground.
    pub fn add_app_specific_shortcut(
        &self,
        app: &str,
        source: Shortcut,
        target: RemapTarget,
    ) -> Result<(), StoreError> {
        let app = checked_app_name(app)?;
        let mut apps = self.app_shortcuts.lock();
        let is_taken = apps
            .get(&app)
            .is_some_and(|table| table.contains_key(&source));
        check_shortcut_row(&source, &target, is_taken)?;

        apps.entry(app)
            .or_default()
            .insert(source, RemapEntry::new(target));
        Ok(())
    }

    pub fn clear_single_key_remaps(&self) {
        self.single_key.lock().clear();
    }

    pub fn clear_toggle_keys(&self) {
        self.toggle_keys.lock().clear();
    }

    pub fn clear_os_level_shortcuts(&self) {
        self.os_shortcuts.lock().clear();
    }

    pub fn clear_app_specific_shortcuts(&self) {
        self.app_shortcuts.lock().clear();
        self.activated_app.lock().clear();
    }

    /// Replaces every table with `tables`.
    ///
    /// Each collection is swapped under its own lock, one at a time, and all
    /// invocation state starts fresh.
    pub fn replace_all(&self, tables: RemapTables) {
        let single_key: HashMap<_, _> = tables.single_key.into_iter().collect();
        let toggle_keys: HashMap<_, _> = tables
            .toggle_keys
            .into_iter()
            .map(|key| (key, false))
            .collect();
        let os_shortcuts = live_table(&tables.os_shortcuts);
        let app_shortcuts: HashMap<_, _> = tables
            .app_shortcuts
            .iter()
            .map(|(app, rows)| (app.clone(), live_table(rows)))
            .collect();

        debug!(
            single_keys = single_key.len(),
            toggle_keys = toggle_keys.len(),
            os_shortcuts = os_shortcuts.len(),
            apps = app_shortcuts.len(),
            "replacing remap tables"
        );

        *self.single_key.lock() = single_key;
        *self.toggle_keys.lock() = toggle_keys;
        *self.os_shortcuts.lock() = os_shortcuts;
        *self.app_shortcuts.lock() = app_shortcuts;
        self.activated_app.lock().clear();
    }

    /// Copies the committed rows out, without live state.
    pub fn snapshot(&self) -> RemapTables {
        let single_key = self
            .single_key
            .lock()
            .iter()
            .map(|(source, target)| (*source, *target))
            .collect();
        let toggle_keys = self.toggle_keys.lock().keys().copied().collect();
        let os_shortcuts = self
            .os_shortcuts
            .lock()
            .iter()
            .map(|(source, entry)| (*source, entry.target))
            .collect();
        let app_shortcuts = self
            .app_shortcuts
            .lock()
            .iter()
            .map(|(app, table)| {
                let rows = table
                    .iter()
                    .map(|(source, entry)| (*source, entry.target))
                    .collect();
                (app.clone(), rows)
            })
            .collect();

        RemapTables {
            single_key,
            toggle_keys,
            os_shortcuts,
            app_shortcuts,
        }
    }

    /// Application whose table currently holds an invoked shortcut, or empty.
    pub fn activated_app(&self) -> String {
        self.activated_app.lock().clone()
    }

    pub(crate) fn set_activated_app(&self, app: &str) {
        let mut activated = self.activated_app.lock();
        activated.clear();
        activated.push_str(app);
    }

    /// Whether the toggle key is logically down, `None` if not registered.
    pub fn toggle_state(&self, key: VirtualKey) -> Option<bool> {
        self.toggle_keys.lock().get(&key).copied()
    }

    /// OS-level sources currently in the invoked state
    pub fn invoked_os_shortcuts(&self) -> Vec<Shortcut> {
        invoked_sources(&self.os_shortcuts.lock())
    }

    /// Invoked sources in the table for `app`
    pub fn invoked_app_shortcuts(&self, app: &str) -> Vec<Shortcut> {
        self.app_shortcuts
            .lock()
            .get(&normalize_app_name(app))
            .map(invoked_sources)
            .unwrap_or_default()
    }
}

fn invoked_sources(table: &ShortcutTable) -> Vec<Shortcut> {
    table
        .iter()
        .filter(|(_, entry)| entry.is_invoked)
        .map(|(source, _)| *source)
        .collect()
}
