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

//! Keyboard state predicates used to match a shortcut against live input

use crate::core::keys::*;
use crate::core::types::Shortcut;
use crate::engine::shortcut::{
    check_modifiers_keyboard_state, is_keyboard_state_clear_except_shortcut,
};
use crate::engine::SimulatedKeyboard;

const VK_C: VirtualKey = 0x43;

#[test]
fn test_keyboard_state_checks() {
    let keyboard = SimulatedKeyboard::new();
    let shortcut = Shortcut::from_keys(&[VK_CONTROL, VK_C]);

    assert!(!check_modifiers_keyboard_state(&shortcut, &keyboard));

    keyboard.press(VK_RCONTROL);
    assert!(check_modifiers_keyboard_state(&shortcut, &keyboard));
    assert!(is_keyboard_state_clear_except_shortcut(&shortcut, &keyboard));

    keyboard.press(VK_C);
    assert!(is_keyboard_state_clear_except_shortcut(&shortcut, &keyboard));

    keyboard.press(VK_LSHIFT);
    assert!(!is_keyboard_state_clear_except_shortcut(&shortcut, &keyboard));

    let sided = Shortcut::from_keys(&[VK_LCONTROL, VK_C]);
    keyboard.release(VK_LSHIFT);
    assert!(!check_modifiers_keyboard_state(&sided, &keyboard));
    assert!(!is_keyboard_state_clear_except_shortcut(&sided, &keyboard));
}

#[test]
fn test_generic_win_matches_either_side() {
    let keyboard = SimulatedKeyboard::new();
    let shortcut = Shortcut::from_keys(&[VK_WIN_BOTH, VK_C]);

    keyboard.press(VK_RWIN);
    assert!(check_modifiers_keyboard_state(&shortcut, &keyboard));
    assert!(is_keyboard_state_clear_except_shortcut(&shortcut, &keyboard));

    keyboard.release(VK_RWIN);
    keyboard.press(VK_LWIN);
    assert!(check_modifiers_keyboard_state(&shortcut, &keyboard));

    let right_only = Shortcut::from_keys(&[VK_RWIN, VK_C]);
    assert!(!check_modifiers_keyboard_state(&right_only, &keyboard));
    assert!(!is_keyboard_state_clear_except_shortcut(&right_only, &keyboard));
}
