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

//! src/engine/mod.rs
//!
//! Live remap engine
//!
//! `EngineContext` owns the remap tables and the injection markers. The
//! platform hook calls `on_key_event` once per key transition; the handlers
//! run in a fixed order and the first one that suppresses the event wins.
//!
//! ```
//! use keyboard_remapper::core::keys::{VK_CAPITAL, VK_LCONTROL};
//! use keyboard_remapper::engine::{EngineContext, SimulatedKeyboard};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(EngineContext::new());
//! engine.store().add_single_key_remap(VK_CAPITAL, VK_LCONTROL)?;
//!
//! let keyboard = SimulatedKeyboard::with_engine(engine);
//! keyboard.press(VK_CAPITAL);
//! assert!(keyboard.is_held(VK_LCONTROL));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod handlers;
pub mod input;
pub mod shortcut;
pub mod simulated;
pub mod store;

pub use input::{
    HookResult, InjectionMarkers, InputInterface, KeyEvent, KeyInput, KeyTransition,
    INJECTED_FLAG, SHORTCUT_FLAG, SINGLE_KEY_FLAG,
};
pub use simulated::SimulatedKeyboard;
pub use store::{RemapTableStore, RemapTables, StoreError};

use tracing::trace;

type Handler =
    fn(&KeyEvent, &RemapTableStore, &InjectionMarkers, &dyn InputInterface) -> HookResult;

const HANDLERS: [Handler; 4] = [
    handlers::handle_single_key_remap_event,
    handlers::handle_single_key_toggle_to_mod_event,
    handlers::handle_os_level_shortcut_remap_event,
    handlers::handle_app_specific_shortcut_remap_event,
];

/// One remap engine instance
#[derive(Debug, Default)]
pub struct EngineContext {
    store: RemapTableStore,
    markers: InjectionMarkers,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine stamping its synthetic input with custom markers
    pub fn with_markers(markers: InjectionMarkers) -> Self {
        Self {
            store: RemapTableStore::new(),
            markers,
        }
    }

    pub fn store(&self) -> &RemapTableStore {
        &self.store
    }

    pub fn markers(&self) -> &InjectionMarkers {
        &self.markers
    }

    /// Hook entry point: decides whether to swallow `event`.
    ///
    /// Never fails. Anything the handlers do not recognise passes through.
    pub fn on_key_event(&self, event: &KeyEvent, input: &dyn InputInterface) -> HookResult {
        trace!(
            key = event.key,
            transition = ?event.transition,
            extra_info = event.extra_info,
            "key event"
        );

        for handler in HANDLERS {
            if handler(event, &self.store, &self.markers, input) == HookResult::Suppress {
                return HookResult::Suppress;
            }
        }
        HookResult::PassThrough
    }
}

#[cfg(test)]
mod tests;
