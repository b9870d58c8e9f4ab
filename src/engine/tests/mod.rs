//! Engine module tests
//!
//! Contains test suites for the live remap engine:
//! - Single-key remaps and toggle-to-modifier keys
//! - OS-level shortcut remaps (exact injected sequences, round trips)
//! - Application-specific shortcut remaps
//! - Keyboard state predicates behind shortcut matching
//! - Remap table store mutations

use std::sync::Arc;

use crate::engine::{EngineContext, SimulatedKeyboard};

/// Engine plus a simulated keyboard whose hook is that engine
pub(super) fn engine_with_keyboard() -> (Arc<EngineContext>, SimulatedKeyboard) {
    let engine = Arc::new(EngineContext::new());
    let keyboard = SimulatedKeyboard::with_engine(Arc::clone(&engine));
    (engine, keyboard)
}

#[cfg(test)]
mod shortcut_tests;
#[cfg(test)]
mod single_key_tests;
#[cfg(test)]
mod store_tests;
