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

//! src/engine/shortcut.rs
//!
//! Shortcut matching state machine shared by the OS-level and the
//! application-specific handlers
//!
//! Each table entry is either idle or invoked. An entry becomes invoked when
//! its action key goes down while exactly its modifiers are held, and stays
//! invoked while the user keeps the source modifiers down. At most one entry
//! of a table is invoked at a time: once one is, every other entry is skipped.
//!
//! This module only decides. It runs under the table lock and returns the
//! synthetic keys to send; the caller injects them after unlocking.

use tracing::warn;

use crate::core::keys::{
    is_mouse_button, ModifierFamily, ModifierSide, VirtualKey, DUMMY_KEY, MAX_KEY_CODE, VK_LWIN,
    VK_RWIN,
};
use crate::core::types::{HeldSides, Shortcut, WinSide};
use crate::engine::input::{InputInterface, KeyEvent, KeyInput};
use crate::engine::store::ShortcutTable;

/// Result of running one table against one event
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    PassThrough,
    /// Suppress the physical event and inject these keys (possibly none)
    Suppress(Vec<KeyInput>),
}

/// Whether every modifier of `shortcut` is currently held.
pub fn check_modifiers_keyboard_state(shortcut: &Shortcut, input: &dyn InputInterface) -> bool {
    ModifierFamily::ALL
        .iter()
        .all(|&family| match shortcut.modifier_side(family) {
            None => true,
            Some(ModifierSide::Either) if family == ModifierFamily::Win => {
                input.key_state(VK_LWIN) || input.key_state(VK_RWIN)
            }
            Some(side) => input.key_state(family.key_for(side)),
        })
}

/// Whether nothing is held apart from `shortcut`'s own keys.
///
/// Generic modifier codes report "either side held", so they are allowed
/// whenever the family is part of the shortcut.
pub fn is_keyboard_state_clear_except_shortcut(
    shortcut: &Shortcut,
    input: &dyn InputInterface,
) -> bool {
    for key in 1..=MAX_KEY_CODE {
        if is_mouse_button(key) || Some(key) == shortcut.action_key() || !input.key_state(key) {
            continue;
        }

        let allowed = match ModifierFamily::of(key) {
            Some(family) => match (shortcut.modifier_side(family), ModifierSide::of(key)) {
                (None, _) => false,
                (Some(ModifierSide::Either), _) | (Some(_), Some(ModifierSide::Either)) => true,
                (Some(side), key_side) => Some(side) == key_side,
            },
            None => false,
        };

        if !allowed {
            return false;
        }
    }
    true
}

/// Source and target of one invoked entry, with the held sides resolved
struct Remap {
    source: Shortcut,
    target: Shortcut,
    win_side: WinSide,
    held: HeldSides,
    marker: usize,
}

impl Remap {
    /// Code sent for `shortcut`'s `family` slot. A generic slot uses the
    /// physical side that invoked the source, if one was recorded.
    fn resolve(&self, shortcut: &Shortcut, family: ModifierFamily) -> Option<VirtualKey> {
        match (shortcut.modifier_side(family)?, self.held.side(family)) {
            (ModifierSide::Either, Some(side)) => Some(family.key_for(side)),
            _ => shortcut.modifier_key(family, self.win_side),
        }
    }

    fn source_key(&self, family: ModifierFamily) -> Option<VirtualKey> {
        self.resolve(&self.source, family)
    }

    fn target_key(&self, family: ModifierFamily) -> Option<VirtualKey> {
        self.resolve(&self.target, family)
    }

    /// A family is untouched by the remap when both sides emit the same code.
    fn differs(&self, family: ModifierFamily) -> bool {
        self.source_key(family) != self.target_key(family)
    }

    /// Target modifiers the source does not already hold, Win → Shift
    fn added_target_keys(&self) -> impl DoubleEndedIterator<Item = VirtualKey> + '_ {
        ModifierFamily::ALL
            .into_iter()
            .filter(move |family| self.differs(*family))
            .filter_map(move |family| self.target_key(family))
    }

    /// Source modifiers the target does not share, Win → Shift
    fn dropped_source_keys(&self) -> impl DoubleEndedIterator<Item = VirtualKey> + '_ {
        ModifierFamily::ALL
            .into_iter()
            .filter(move |family| self.differs(*family))
            .filter_map(move |family| self.source_key(family))
    }

    fn down(&self, key: VirtualKey) -> KeyInput {
        KeyInput::down(key, self.marker)
    }

    fn up(&self, key: VirtualKey) -> KeyInput {
        KeyInput::up(key, self.marker)
    }

    /// Keys sent when the source is first pressed.
    ///
    /// If every source modifier is shared with the target, only the extra
    /// target keys go down. Otherwise a dummy key-up breaks any pending OS
    /// combo, the unshared source modifiers are released (Shift → Win) and the
    /// target keys are pressed.
    fn press(&self) -> Vec<KeyInput> {
        let action = self.target.action_key();
        let is_subset =
            self.source.common_modifiers_count(&self.target) == self.source.modifier_count();

        let added = self.added_target_keys().count();
        let dropped = if is_subset {
            0
        } else {
            1 + self.dropped_source_keys().count()
        };
        let mut keys = Vec::with_capacity(dropped + added + usize::from(action.is_some()));

        if !is_subset {
            keys.push(self.up(DUMMY_KEY));
            keys.extend(self.dropped_source_keys().rev().map(|key| self.up(key)));
        }
        keys.extend(self.added_target_keys().map(|key| self.down(key)));
        keys.extend(action.map(|key| self.down(key)));
        keys
    }

    /// Keys sent when one of the source modifiers is released.
    ///
    /// Releases the target (its action key only if still down), then presses
    /// the unshared source modifiers that are still physically held.
    fn release_on_modifier_up(&self, released: VirtualKey, action_held: bool) -> Vec<KeyInput> {
        let action = self.target.action_key().filter(|_| action_held);

        let released_targets = ModifierFamily::ALL
            .into_iter()
            .filter(|family| {
                self.differs(*family) || self.target.has_family_key(*family, released)
            })
            .filter_map(|family| self.target_key(family));
        let restored_sources = ModifierFamily::ALL
            .into_iter()
            .filter(|family| {
                self.differs(*family) && !self.source.has_family_key(*family, released)
            })
            .filter_map(|family| self.source_key(family));

        let capacity = usize::from(action.is_some())
            + released_targets.clone().count()
            + restored_sources.clone().count();
        let mut keys = Vec::with_capacity(capacity);

        keys.extend(action.map(|key| self.up(key)));
        keys.extend(released_targets.rev().map(|key| self.up(key)));
        keys.extend(restored_sources.map(|key| self.down(key)));
        keys
    }

    /// Keys sent when an unrelated key goes down while invoked.
    ///
    /// Restores the physical source modifiers, forwards the new key and ends
    /// with a dummy key-up, since the new key may itself be a modifier.
    fn revert_on_other_key(&self, pressed: VirtualKey) -> Vec<KeyInput> {
        let action = self.target.action_key();
        let capacity = usize::from(action.is_some())
            + self.added_target_keys().count()
            + self.dropped_source_keys().count()
            + 2;
        let mut keys = Vec::with_capacity(capacity);

        keys.extend(action.map(|key| self.up(key)));
        keys.extend(self.added_target_keys().rev().map(|key| self.up(key)));
        keys.extend(self.dropped_source_keys().map(|key| self.down(key)));
        keys.push(self.down(pressed));
        keys.push(self.up(DUMMY_KEY));
        keys
    }
}

/// Physical side held for each generic Ctrl, Alt and Shift slot of `source`
fn held_sides(source: &Shortcut, input: &dyn InputInterface) -> HeldSides {
    let mut held = HeldSides::default();
    for family in ModifierFamily::ALL {
        if source.modifier_side(family) != Some(ModifierSide::Either) {
            continue;
        }
        if input.key_state(family.left_key()) {
            held.set(family, ModifierSide::Left);
        } else if input.key_state(family.right_key()) {
            held.set(family, ModifierSide::Right);
        }
    }
    held
}

fn held_win_side(input: &dyn InputInterface) -> WinSide {
    if input.key_state(VK_RWIN) {
        WinSide::Right
    } else if input.key_state(VK_LWIN) {
        WinSide::Left
    } else {
        WinSide::None
    }
}

/// Runs the state machine for `event` against `table`.
///
/// `marker` is stamped on every synthetic key.
pub(crate) fn process_shortcut_table(
    event: &KeyEvent,
    table: &mut ShortcutTable,
    input: &dyn InputInterface,
    marker: usize,
) -> Outcome {
    let any_invoked = table.values().any(|entry| entry.is_invoked);

    for (source, entry) in table.iter_mut() {
        if any_invoked && !entry.is_invoked {
            continue;
        }

        let target = entry.target.as_shortcut();

        if !entry.is_invoked {
            if !event.is_down()
                || source.action_key() != Some(event.key)
                || !check_modifiers_keyboard_state(source, input)
                || !is_keyboard_state_clear_except_shortcut(source, input)
            {
                continue;
            }

            entry.invoked_win_side = held_win_side(input);
            entry.invoked_sides = held_sides(source, input);
            entry.is_invoked = true;
            let remap = Remap {
                source: *source,
                target,
                win_side: entry.invoked_win_side,
                held: entry.invoked_sides,
                marker,
            };
            return Outcome::Suppress(remap.press());
        }

        let remap = Remap {
            source: *source,
            target,
            win_side: entry.invoked_win_side,
            held: entry.invoked_sides,
            marker,
        };

        // A source modifier went up: hand the keyboard back to the physical state
        if event.is_up() && source.has_modifier_key(event.key) {
            let action_held = target
                .action_key()
                .is_some_and(|key| input.key_state(key));
            let keys = remap.release_on_modifier_up(event.key, action_held);
            entry.reset();
            return Outcome::Suppress(keys);
        }

        // The target modifiers are still logically down because of the remap
        if check_modifiers_keyboard_state(&target, input) {
            if source.action_key() == Some(event.key) {
                let keys = target
                    .action_key()
                    .map(|key| {
                        if event.is_down() {
                            remap.down(key)
                        } else {
                            remap.up(key)
                        }
                    })
                    .into_iter()
                    .collect();
                return Outcome::Suppress(keys);
            }

            if event.is_down() && source.has_modifier_key(event.key) {
                return Outcome::Suppress(Vec::new());
            }

            if event.is_down() {
                let keys = remap.revert_on_other_key(event.key);
                entry.reset();
                return Outcome::Suppress(keys);
            }
        }

        warn!(
            source = %source,
            key = event.key,
            transition = ?event.transition,
            "invoked shortcut no longer matches the keyboard state, resetting"
        );
        entry.reset();
    }

    Outcome::PassThrough
}
