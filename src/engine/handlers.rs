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

//! src/engine/handlers.rs
//!
//! The four hook handlers, in dispatch order:
//! 1. Single-key remap
//! 2. Toggle-to-modifier keys
//! 3. OS-level shortcut remap
//! 4. Application-specific shortcut remap
//!
//! Every handler reads the table it needs under that table's lock, drops
//! the guard, and only then injects. Injection can re-enter the hook on the
//! same thread, so a guard held across it would deadlock.

use tracing::{trace, warn};

use crate::core::keys::{VK_LWIN, VK_NULL, VK_WIN_BOTH};
use crate::core::types::normalize_app_name;
use crate::engine::input::{HookResult, InjectionMarkers, InputInterface, KeyEvent, KeyInput};
use crate::engine::shortcut::{process_shortcut_table, Outcome};
use crate::engine::store::RemapTableStore;

/// Injects `inputs`, reporting a short count without retrying.
fn send(input: &dyn InputInterface, inputs: &[KeyInput]) {
    if inputs.is_empty() {
        return;
    }
    let sent = input.inject(inputs);
    if sent < inputs.len() {
        warn!(requested = inputs.len(), sent, "synthetic input was only partially injected");
    }
}

fn finish(outcome: Outcome, input: &dyn InputInterface) -> HookResult {
    match outcome {
        Outcome::PassThrough => HookResult::PassThrough,
        Outcome::Suppress(keys) => {
            send(input, &keys);
            HookResult::Suppress
        }
    }
}

/// Rewrites a remapped key into its target, or swallows a disabled key.
pub fn handle_single_key_remap_event(
    event: &KeyEvent,
    store: &RemapTableStore,
    markers: &InjectionMarkers,
    input: &dyn InputInterface,
) -> HookResult {
    if markers.is_injected(event.extra_info) {
        return HookResult::PassThrough;
    }

    let target = {
        let table = store.single_key.lock();
        match table.get(&event.key) {
            Some(target) => *target,
            None => return HookResult::PassThrough,
        }
    };

    if target == VK_NULL {
        trace!(key = event.key, "disabled key suppressed");
        return HookResult::Suppress;
    }

    let target = if target == VK_WIN_BOTH { VK_LWIN } else { target };
    let synthetic = if event.is_up() {
        KeyInput::up(target, markers.single_key)
    } else {
        KeyInput::down(target, markers.single_key)
    };

    send(input, &[synthetic]);
    HookResult::Suppress
}

/// Makes a toggle key (Caps Lock, Num Lock...) act like a held modifier.
///
/// The key's own down/up pair is replayed on press and on release, so the
/// toggle flips twice per physical press. Auto-repeat downs are swallowed.
pub fn handle_single_key_toggle_to_mod_event(
    event: &KeyEvent,
    store: &RemapTableStore,
    markers: &InjectionMarkers,
    input: &dyn InputInterface,
) -> HookResult {
    if markers.is_injected(event.extra_info) {
        return HookResult::PassThrough;
    }

    {
        let mut table = store.toggle_keys.lock();
        let Some(is_down) = table.get_mut(&event.key) else {
            return HookResult::PassThrough;
        };
        if event.is_down() {
            if *is_down {
                return HookResult::Suppress;
            }
            *is_down = true;
        }
    }

    send(
        input,
        &[
            KeyInput::down(event.key, markers.single_key),
            KeyInput::up(event.key, markers.single_key),
        ],
    );

    if event.is_up() {
        if let Some(is_down) = store.toggle_keys.lock().get_mut(&event.key) {
            *is_down = false;
        }
    }

    HookResult::Suppress
}

pub fn handle_os_level_shortcut_remap_event(
    event: &KeyEvent,
    store: &RemapTableStore,
    markers: &InjectionMarkers,
    input: &dyn InputInterface,
) -> HookResult {
    if markers.is_shortcut_injection(event.extra_info) {
        return HookResult::PassThrough;
    }

    let outcome = {
        let mut table = store.os_shortcuts.lock();
        process_shortcut_table(event, &mut table, input, markers.shortcut)
    };
    finish(outcome, input)
}

/// Runs the foreground application's shortcut table.
///
/// While one of an application's shortcuts is invoked, events keep going to
/// that application's table even if the foreground changes, so its target
/// keys are always released.
pub fn handle_app_specific_shortcut_remap_event(
    event: &KeyEvent,
    store: &RemapTableStore,
    markers: &InjectionMarkers,
    input: &dyn InputInterface,
) -> HookResult {
    if markers.is_shortcut_injection(event.extra_info) {
        return HookResult::PassThrough;
    }

    let activated = store.activated_app();
    let app = if activated.is_empty() {
        normalize_app_name(&input.current_application_name(false))
    } else {
        activated
    };
    if app.is_empty() {
        return HookResult::PassThrough;
    }

    let (outcome, still_invoked) = {
        let mut apps = store.app_shortcuts.lock();
        let Some(table) = apps.get_mut(&app) else {
            return HookResult::PassThrough;
        };
        let outcome = process_shortcut_table(event, table, input, markers.shortcut);
        (outcome, table.values().any(|entry| entry.is_invoked))
    };

    if still_invoked {
        store.set_activated_app(&app);
    } else {
        store.set_activated_app("");
    }

    finish(outcome, input)
}
