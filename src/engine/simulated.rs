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

//! src/engine/simulated.rs
//!
//! In-memory keyboard implementing `InputInterface`
//!
//! `SimulatedKeyboard` behaves like the platform as far as the engine can
//! tell: every event, physical or injected, is first offered to the installed
//! hook (re-entrantly for injected input) and only updates the key state when
//! the hook lets it through. It records what the engine injected and what
//! the focused application finally received.
//!
//! Generic Ctrl/Alt/Shift/Win codes are delivered as their left-side keys,
//! the way the platform translates synthesized generic modifiers.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

use crate::core::keys::{
    ModifierFamily, ModifierSide, VirtualKey, VK_CONTROL, VK_LCONTROL, VK_LMENU, VK_LSHIFT,
    VK_LWIN, VK_MENU, VK_RCONTROL, VK_RMENU, VK_RSHIFT, VK_RWIN, VK_SHIFT, VK_WIN_BOTH,
};
use crate::engine::input::{
    HookResult, InputInterface, KeyEvent, KeyInput, KeyTransition,
};
use crate::engine::EngineContext;

/// Hook procedure installed on a simulated keyboard
pub type HookFn = dyn Fn(&SimulatedKeyboard, &KeyEvent) -> HookResult + Send + Sync;

const KEY_COUNT: usize = 256;

pub struct SimulatedKeyboard {
    key_states: Mutex<[bool; KEY_COUNT]>,
    foreground_app: Mutex<String>,
    hook: RwLock<Option<Arc<HookFn>>>,
    injected: Mutex<Vec<KeyInput>>,
    delivered: Mutex<Vec<KeyEvent>>,
}

impl fmt::Debug for SimulatedKeyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedKeyboard")
            .field("held_keys", &self.held_keys())
            .field("foreground_app", &*self.foreground_app.lock())
            .field("has_hook", &self.hook.read().is_some())
            .finish()
    }
}

impl Default for SimulatedKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform translation of generic modifier codes
fn physical_key(key: VirtualKey) -> VirtualKey {
    match (ModifierFamily::of(key), ModifierSide::of(key)) {
        (Some(family), Some(ModifierSide::Either)) => family.left_key(),
        _ => key,
    }
}

impl SimulatedKeyboard {
    /// Keyboard with every key up and no hook installed
    pub fn new() -> Self {
        Self {
            key_states: Mutex::new([false; KEY_COUNT]),
            foreground_app: Mutex::new(String::new()),
            hook: RwLock::new(None),
            injected: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Keyboard whose hook is `engine.on_key_event`
    pub fn with_engine(engine: Arc<EngineContext>) -> Self {
        let keyboard = Self::new();
        keyboard.set_hook(move |input, event| engine.on_key_event(event, input));
        keyboard
    }

    pub fn set_hook<F>(&self, hook: F)
    where
        F: Fn(&SimulatedKeyboard, &KeyEvent) -> HookResult + Send + Sync + 'static,
    {
        *self.hook.write() = Some(Arc::new(hook));
    }

    pub fn clear_hook(&self) {
        *self.hook.write() = None;
    }

    pub fn set_foreground_app(&self, app: &str) {
        *self.foreground_app.lock() = app.to_string();
    }

    /// Sends physical key events through the hook, in order.
    pub fn send_input(&self, inputs: &[KeyInput]) -> usize {
        inputs.iter().filter(|input| self.dispatch(input)).count()
    }

    pub fn press(&self, key: VirtualKey) {
        self.send_input(&[KeyInput::down(key, 0)]);
    }

    pub fn release(&self, key: VirtualKey) {
        self.send_input(&[KeyInput::up(key, 0)]);
    }

    /// Presses `keys` in order.
    pub fn press_all(&self, keys: &[VirtualKey]) {
        for key in keys {
            self.press(*key);
        }
    }

    /// Releases `keys` in order.
    pub fn release_all(&self, keys: &[VirtualKey]) {
        for key in keys {
            self.release(*key);
        }
    }

    /// Whether the application side sees `key` held.
    pub fn is_held(&self, key: VirtualKey) -> bool {
        self.key_state(key)
    }

    /// Every key currently down, in code order
    pub fn held_keys(&self) -> Vec<VirtualKey> {
        self.key_states
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, down)| **down)
            .map(|(key, _)| key as VirtualKey)
            .collect()
    }

    /// Events the engine injected, in injection order
    pub fn injected_events(&self) -> Vec<KeyInput> {
        self.injected.lock().clone()
    }

    /// Events that reached the application, physical and synthetic
    pub fn delivered_events(&self) -> Vec<KeyEvent> {
        self.delivered.lock().clone()
    }

    pub fn clear_logs(&self) {
        self.injected.lock().clear();
        self.delivered.lock().clear();
    }

    /// Releases every key and forgets recorded events.
    pub fn reset(&self) {
        *self.key_states.lock() = [false; KEY_COUNT];
        self.clear_logs();
    }

    /// Runs one event through the hook and applies it unless suppressed.
    fn dispatch(&self, input: &KeyInput) -> bool {
        let key = physical_key(input.key);
        let Ok(index) = usize::try_from(key) else {
            return false;
        };
        if index >= KEY_COUNT {
            return false;
        }

        let transition = match (input.key_up, self.key_state(VK_MENU)) {
            (false, false) => KeyTransition::Down,
            (false, true) => KeyTransition::SysDown,
            (true, false) => KeyTransition::Up,
            (true, true) => KeyTransition::SysUp,
        };
        let event = KeyEvent {
            key,
            transition,
            extra_info: input.extra_info,
        };

        // Clone the hook out so it can re-enter `inject` without the lock
        let hook = self.hook.read().clone();
        let result = match hook {
            Some(hook) => hook(self, &event),
            None => HookResult::PassThrough,
        };

        if result == HookResult::PassThrough {
            self.key_states.lock()[index] = !input.key_up;
            self.delivered.lock().push(event);
        }
        true
    }
}

impl InputInterface for SimulatedKeyboard {
    fn inject(&self, inputs: &[KeyInput]) -> usize {
        self.injected.lock().extend_from_slice(inputs);
        self.send_input(inputs)
    }

    fn key_state(&self, key: VirtualKey) -> bool {
        let states = self.key_states.lock();
        let down = |key: VirtualKey| states[key as usize];
        match key {
            VK_CONTROL => down(VK_CONTROL) || down(VK_LCONTROL) || down(VK_RCONTROL),
            VK_MENU => down(VK_MENU) || down(VK_LMENU) || down(VK_RMENU),
            VK_SHIFT => down(VK_SHIFT) || down(VK_LSHIFT) || down(VK_RSHIFT),
            VK_WIN_BOTH => down(VK_LWIN) || down(VK_RWIN),
            _ => usize::try_from(key)
                .ok()
                .and_then(|index| states.get(index).copied())
                .unwrap_or(false),
        }
    }

    fn current_application_name(&self, _keep_path: bool) -> String {
        self.foreground_app.lock().clone()
    }
}
