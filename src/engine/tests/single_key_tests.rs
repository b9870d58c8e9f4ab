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

//! Single-key remap and toggle-to-modifier tests

use super::engine_with_keyboard;
use crate::core::keys::*;
use crate::core::types::{RemapTarget, Shortcut};
use crate::engine::{
    HookResult, InputInterface, KeyEvent, KeyInput, EngineContext, INJECTED_FLAG,
    SINGLE_KEY_FLAG,
};

const VK_A: VirtualKey = 0x41;
const VK_B: VirtualKey = 0x42;
const VK_C: VirtualKey = 0x43;
const VK_V: VirtualKey = 0x56;

#[test]
fn test_single_key_remap_rewrites_both_directions() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_CAPITAL, VK_LCONTROL).unwrap();

    keyboard.press(VK_CAPITAL);
    assert!(keyboard.is_held(VK_LCONTROL));
    assert!(!keyboard.is_held(VK_CAPITAL));

    keyboard.release(VK_CAPITAL);
    assert!(keyboard.held_keys().is_empty());

    assert_eq!(
        keyboard.injected_events(),
        vec![
            KeyInput::down(VK_LCONTROL, SINGLE_KEY_FLAG),
            KeyInput::up(VK_LCONTROL, SINGLE_KEY_FLAG),
        ]
    );
}

#[test]
fn test_disabled_key_is_swallowed() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_A, VK_NULL).unwrap();

    keyboard.press(VK_A);
    assert!(!keyboard.is_held(VK_A));
    keyboard.release(VK_A);

    assert!(keyboard.injected_events().is_empty());
    assert!(keyboard.delivered_events().is_empty());
}

#[test]
fn test_remap_to_either_win_sends_left_win() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_APPS, VK_WIN_BOTH).unwrap();

    keyboard.press(VK_APPS);
    assert!(keyboard.is_held(VK_LWIN));
    assert_eq!(
        keyboard.injected_events(),
        vec![KeyInput::down(VK_LWIN, SINGLE_KEY_FLAG)]
    );
}

#[test]
fn test_injected_events_are_not_remapped_again() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_A, VK_B).unwrap();
    engine.store().add_single_key_remap(VK_B, VK_C).unwrap();

    // A → B must not continue on to C
    keyboard.press(VK_A);
    assert!(keyboard.is_held(VK_B));
    assert!(!keyboard.is_held(VK_C));

    // Anything carrying the common marker bit is left alone
    keyboard.send_input(&[KeyInput::down(VK_B, INJECTED_FLAG)]);
    assert!(!keyboard.is_held(VK_C));
}

#[test]
fn test_unmapped_keys_pass_through() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_A, VK_B).unwrap();

    keyboard.press(VK_C);
    assert!(keyboard.is_held(VK_C));
    assert!(keyboard.injected_events().is_empty());
}

#[test]
fn test_single_key_output_feeds_shortcut_remap() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_single_key_remap(VK_CAPITAL, VK_LCONTROL).unwrap();
    engine
        .store()
        .add_os_level_shortcut(
            Shortcut::from_keys(&[VK_CONTROL, VK_C]),
            RemapTarget::Combo(Shortcut::from_keys(&[VK_CONTROL, VK_V])),
        )
        .unwrap();

    keyboard.press(VK_CAPITAL);
    keyboard.press(VK_C);

    assert!(keyboard.is_held(VK_LCONTROL));
    assert!(keyboard.is_held(VK_V));
    assert!(!keyboard.is_held(VK_C));
}

#[test]
fn test_toggle_key_acts_as_modifier() {
    let (engine, keyboard) = engine_with_keyboard();
    engine.store().add_toggle_to_mod_key(VK_NUMLOCK).unwrap();

    // First press flips the state and replays a full press
    keyboard.press(VK_NUMLOCK);
    assert_eq!(engine.store().toggle_state(VK_NUMLOCK), Some(true));
    assert_eq!(keyboard.injected_events().len(), 2);

    // Auto-repeat while held is swallowed without emission
    keyboard.press(VK_NUMLOCK);
    keyboard.press(VK_NUMLOCK);
    assert_eq!(keyboard.injected_events().len(), 2);

    // Release replays the pair again and resets the state
    keyboard.release(VK_NUMLOCK);
    assert_eq!(engine.store().toggle_state(VK_NUMLOCK), Some(false));
    assert_eq!(
        keyboard.injected_events(),
        vec![
            KeyInput::down(VK_NUMLOCK, SINGLE_KEY_FLAG),
            KeyInput::up(VK_NUMLOCK, SINGLE_KEY_FLAG),
            KeyInput::down(VK_NUMLOCK, SINGLE_KEY_FLAG),
            KeyInput::up(VK_NUMLOCK, SINGLE_KEY_FLAG),
        ]
    );
    assert!(keyboard.held_keys().is_empty());
}

#[test]
fn test_unregistered_key_has_no_toggle_state() {
    let (engine, _keyboard) = engine_with_keyboard();
    assert_eq!(engine.store().toggle_state(VK_CAPITAL), None);
}

/// Input that accepts nothing, to exercise injection shortfall
struct RejectingInput;

impl InputInterface for RejectingInput {
    fn inject(&self, _inputs: &[KeyInput]) -> usize {
        0
    }

    fn key_state(&self, _key: VirtualKey) -> bool {
        false
    }

    fn current_application_name(&self, _keep_path: bool) -> String {
        String::new()
    }
}

#[test]
fn test_injection_shortfall_is_not_fatal() {
    let engine = EngineContext::new();
    engine.store().add_single_key_remap(VK_A, VK_B).unwrap();

    let result = engine.on_key_event(&KeyEvent::down(VK_A), &RejectingInput);
    assert_eq!(result, HookResult::Suppress);

    let result = engine.on_key_event(&KeyEvent::down(VK_C), &RejectingInput);
    assert_eq!(result, HookResult::PassThrough);
}
