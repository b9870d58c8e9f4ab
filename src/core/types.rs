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

//! src/core/types.rs
//!
//! Core type definitions shared by the live engine and the validator
//!
//! - `Shortcut`: up to two modifiers plus one action key, one slot per family
//! - `RemapTarget`: what a source key or shortcut is rewritten into
//! - `WinSide`: which physical Win key triggered a generic-Win shortcut
//! - `HeldSides`: which physical key held each generic Ctrl/Alt/Shift slot
//! - `RemapEntry`: a shortcut table row together with its live invocation state
//!
//! A shortcut stores one optional `ModifierSide` per family instead of a key
//! list, so "at most one key per family" holds by construction and two
//! shortcuts built from the same keys in any order compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::keys::{
    key_name, ModifierFamily, ModifierSide, VirtualKey, VK_DELETE, VK_LWIN, VK_NULL, VK_RWIN,
    VK_WIN_BOTH,
};

/// A shortcut holds at most one action key plus two modifiers.
pub const MAX_SHORTCUT_SIZE: usize = 3;

const VK_L: VirtualKey = 0x4C;

/// Errors raised when building a shortcut from an explicit key list
#[derive(Debug, Error, PartialEq)]
pub enum ShortcutError {
    #[error("A shortcut cannot contain the null key")]
    NullKey,

    #[error("Modifier {0} appears more than once")]
    RepeatedModifier(ModifierFamily),

    #[error("A shortcut can only have one action key")]
    MultipleActionKeys,

    #[error("A shortcut can have at most {MAX_SHORTCUT_SIZE} keys, got {0}")]
    TooManyKeys(usize),
}

/// Which physical Win key was held when a generic-Win shortcut was invoked
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum WinSide {
    #[default]
    None,
    Left,
    Right,
}

/// Physical side that held each generic Ctrl, Alt and Shift slot of an
/// invoked shortcut
///
/// Win is tracked by `WinSide`. A family with no recorded side resolves to
/// its generic code.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HeldSides {
    ctrl: Option<ModifierSide>,
    alt: Option<ModifierSide>,
    shift: Option<ModifierSide>,
}

impl HeldSides {
    pub fn side(&self, family: ModifierFamily) -> Option<ModifierSide> {
        match family {
            ModifierFamily::Win => None,
            ModifierFamily::Ctrl => self.ctrl,
            ModifierFamily::Alt => self.alt,
            ModifierFamily::Shift => self.shift,
        }
    }

    /// Records `side` for `family`. Win is ignored.
    pub fn set(&mut self, family: ModifierFamily, side: ModifierSide) {
        match family {
            ModifierFamily::Win => {}
            ModifierFamily::Ctrl => self.ctrl = Some(side),
            ModifierFamily::Alt => self.alt = Some(side),
            ModifierFamily::Shift => self.shift = Some(side),
        }
    }
}

/// Normalises an application name for lookup (case-insensitive match).
pub fn normalize_app_name(app: &str) -> String {
    app.trim().to_lowercase()
}

/// An unordered key combination with at most one key per modifier family
///
/// Ordering is derived field by field (Win, Ctrl, Alt, Shift, action key),
/// which gives shortcut tables a deterministic iteration order.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Shortcut {
    win: Option<ModifierSide>,
    ctrl: Option<ModifierSide>,
    alt: Option<ModifierSide>,
    shift: Option<ModifierSide>,
    action_key: Option<VirtualKey>,
}

impl Shortcut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a shortcut from keys in any order.
    ///
    /// Later keys of the same family overwrite earlier ones and null keys are
    /// skipped. Use `try_from_keys` when the list must be rejected instead.
    pub fn from_keys(keys: &[VirtualKey]) -> Self {
        let mut shortcut = Self::new();
        for &key in keys {
            shortcut.set_key(key);
        }
        shortcut
    }

    /// Builds a shortcut, rejecting null keys, repeated families, a second
    /// action key, or more than `MAX_SHORTCUT_SIZE` keys.
    pub fn try_from_keys(keys: &[VirtualKey]) -> Result<Self, ShortcutError> {
        if keys.len() > MAX_SHORTCUT_SIZE {
            return Err(ShortcutError::TooManyKeys(keys.len()));
        }

        let mut shortcut = Self::new();
        for &key in keys {
            if key == VK_NULL {
                return Err(ShortcutError::NullKey);
            }
            match ModifierFamily::of(key) {
                Some(family) if shortcut.modifier_side(family).is_some() => {
                    return Err(ShortcutError::RepeatedModifier(family));
                }
                None if shortcut.action_key.is_some() => {
                    return Err(ShortcutError::MultipleActionKeys);
                }
                _ => {
                    shortcut.set_key(key);
                }
            }
        }
        Ok(shortcut)
    }

    /// Sets the slot `key` belongs to. Returns false for the null key.
    pub fn set_key(&mut self, key: VirtualKey) -> bool {
        if key == VK_NULL {
            return false;
        }
        match (ModifierFamily::of(key), ModifierSide::of(key)) {
            (Some(family), Some(side)) => *self.slot_mut(family) = Some(side),
            _ => self.action_key = Some(key),
        }
        true
    }

    /// Clears the slot `key` belongs to.
    pub fn reset_key(&mut self, key: VirtualKey) {
        match ModifierFamily::of(key) {
            Some(family) => *self.slot_mut(family) = None,
            None => {
                if self.action_key == Some(key) {
                    self.action_key = None;
                }
            }
        }
    }

    fn slot_mut(&mut self, family: ModifierFamily) -> &mut Option<ModifierSide> {
        match family {
            ModifierFamily::Win => &mut self.win,
            ModifierFamily::Ctrl => &mut self.ctrl,
            ModifierFamily::Alt => &mut self.alt,
            ModifierFamily::Shift => &mut self.shift,
        }
    }

    pub fn modifier_side(&self, family: ModifierFamily) -> Option<ModifierSide> {
        match family {
            ModifierFamily::Win => self.win,
            ModifierFamily::Ctrl => self.ctrl,
            ModifierFamily::Alt => self.alt,
            ModifierFamily::Shift => self.shift,
        }
    }

    /// Key code emitted for `family`, if the shortcut has that family.
    ///
    /// A generic Win slot resolves to the side recorded at invocation time
    /// and falls back to the left Win key.
    pub fn modifier_key(&self, family: ModifierFamily, win_side: WinSide) -> Option<VirtualKey> {
        let side = self.modifier_side(family)?;
        Some(match (family, side) {
            (ModifierFamily::Win, ModifierSide::Either) => match win_side {
                WinSide::Right => VK_RWIN,
                WinSide::Left | WinSide::None => VK_LWIN,
            },
            _ => family.key_for(side),
        })
    }

    pub fn win_key(&self, win_side: WinSide) -> Option<VirtualKey> {
        self.modifier_key(ModifierFamily::Win, win_side)
    }

    pub fn ctrl_key(&self) -> Option<VirtualKey> {
        self.modifier_key(ModifierFamily::Ctrl, WinSide::None)
    }

    pub fn alt_key(&self) -> Option<VirtualKey> {
        self.modifier_key(ModifierFamily::Alt, WinSide::None)
    }

    pub fn shift_key(&self) -> Option<VirtualKey> {
        self.modifier_key(ModifierFamily::Shift, WinSide::None)
    }

    pub fn action_key(&self) -> Option<VirtualKey> {
        self.action_key
    }

    pub fn modifier_count(&self) -> usize {
        ModifierFamily::ALL
            .iter()
            .filter(|family| self.modifier_side(**family).is_some())
            .count()
    }

    /// Number of keys in the shortcut
    pub fn size(&self) -> usize {
        self.modifier_count() + usize::from(self.action_key.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A committable shortcut has an action key and at least one modifier.
    pub fn is_valid(&self) -> bool {
        self.action_key.is_some() && self.modifier_count() > 0
    }

    /// Families present in both shortcuts with exactly the same side.
    pub fn common_modifiers_count(&self, other: &Shortcut) -> usize {
        ModifierFamily::ALL
            .iter()
            .filter(|family| {
                let side = self.modifier_side(**family);
                side.is_some() && side == other.modifier_side(**family)
            })
            .count()
    }

    /// Whether `key` is a physical key this shortcut's `family` slot accepts.
    pub fn has_family_key(&self, family: ModifierFamily, key: VirtualKey) -> bool {
        match self.modifier_side(family) {
            None => false,
            Some(ModifierSide::Either) => ModifierFamily::of(key) == Some(family),
            Some(side) => key == family.key_for(side),
        }
    }

    /// Whether `key` is any modifier key of this shortcut.
    pub fn has_modifier_key(&self, key: VirtualKey) -> bool {
        ModifierFamily::ALL
            .iter()
            .any(|family| self.has_family_key(*family, key))
    }

    /// Whether `key` belongs to the shortcut at all.
    pub fn contains_key(&self, key: VirtualKey) -> bool {
        self.action_key == Some(key) || self.has_modifier_key(key)
    }

    /// Keys in emission order (Win, Ctrl, Alt, Shift, action), generic
    /// modifiers as their generic codes.
    pub fn keys(&self) -> Vec<VirtualKey> {
        ModifierFamily::ALL
            .iter()
            .filter_map(|family| self.modifier_side(*family).map(|side| family.key_for(side)))
            .chain(self.action_key)
            .collect()
    }

    /// Win+L locks the workstation below the hook and can never be remapped.
    /// Either Win key counts.
    pub fn is_win_l(&self) -> bool {
        self.win.is_some()
            && self.ctrl.is_none()
            && self.alt.is_none()
            && self.shift.is_none()
            && self.action_key == Some(VK_L)
    }

    /// Ctrl+Alt+Del is reserved by the OS.
    pub fn is_ctrl_alt_del(&self) -> bool {
        self.win.is_none()
            && self.ctrl.is_some()
            && self.alt.is_some()
            && self.shift.is_none()
            && self.action_key == Some(VK_DELETE)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.keys().into_iter().map(key_name).collect::<Vec<_>>();
        write!(f, "{}", names.join("+"))
    }
}

/// What a source key or shortcut is rewritten into
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum RemapTarget {
    /// A single key; `VK_NULL` disables the source
    Key(VirtualKey),
    /// A key combination
    Combo(Shortcut),
}

impl RemapTarget {
    /// The disabled target
    pub const DISABLED: RemapTarget = RemapTarget::Key(VK_NULL);

    /// Empty editor cell: the null key or an empty shortcut
    pub fn is_null(&self) -> bool {
        match self {
            RemapTarget::Key(key) => *key == VK_NULL,
            RemapTarget::Combo(shortcut) => shortcut.is_empty(),
        }
    }

    pub fn key(&self) -> Option<VirtualKey> {
        match self {
            RemapTarget::Key(key) if *key != VK_NULL => Some(*key),
            _ => None,
        }
    }

    pub fn shortcut(&self) -> Option<&Shortcut> {
        match self {
            RemapTarget::Combo(shortcut) => Some(shortcut),
            RemapTarget::Key(_) => None,
        }
    }

    /// The target as a shortcut; a single key becomes an action-only shortcut.
    pub fn as_shortcut(&self) -> Shortcut {
        match self {
            RemapTarget::Key(key) => {
                // The symbolic Win code is pressed as the left Win key
                let key = if *key == VK_WIN_BOTH { VK_LWIN } else { *key };
                let mut shortcut = Shortcut::new();
                if key != VK_NULL {
                    shortcut.action_key = Some(key);
                }
                shortcut
            }
            RemapTarget::Combo(shortcut) => *shortcut,
        }
    }
}

impl Default for RemapTarget {
    fn default() -> Self {
        RemapTarget::DISABLED
    }
}

impl From<Shortcut> for RemapTarget {
    fn from(shortcut: Shortcut) -> Self {
        RemapTarget::Combo(shortcut)
    }
}

impl fmt::Display for RemapTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemapTarget::Key(VK_NULL) => write!(f, "disable"),
            RemapTarget::Key(key) => write!(f, "{}", key_name(*key)),
            RemapTarget::Combo(shortcut) => write!(f, "{}", shortcut),
        }
    }
}

/// One shortcut table row plus its live state
///
/// `is_invoked` is set while the target is logically held because the
/// physical source is (or just was) held; the recorded sides reset with it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RemapEntry {
    pub target: RemapTarget,
    pub is_invoked: bool,
    pub invoked_win_side: WinSide,
    pub invoked_sides: HeldSides,
}

impl RemapEntry {
    pub fn new(target: RemapTarget) -> Self {
        Self {
            target,
            is_invoked: false,
            invoked_win_side: WinSide::None,
            invoked_sides: HeldSides::default(),
        }
    }

    pub fn reset(&mut self) {
        self.is_invoked = false;
        self.invoked_win_side = WinSide::None;
        self.invoked_sides = HeldSides::default();
    }
}
