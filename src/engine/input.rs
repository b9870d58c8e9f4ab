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

//! src/engine/input.rs
//!
//! The boundary between the remap engine and the platform
//!
//! The engine never talks to the OS directly. Hook delivery arrives as a
//! `KeyEvent`, and everything the engine needs back from the platform goes
//! through `InputInterface`: synthetic input, live key state, and the name of
//! the foreground application.

use crate::core::keys::VirtualKey;
use crate::core::parser::KeyStroke;

/// Marker bit shared by every event this engine injects
pub const INJECTED_FLAG: usize = 0x1;

/// Marker stamped on events produced by single-key handlers
pub const SINGLE_KEY_FLAG: usize = 0x11;

/// Marker stamped on events produced by shortcut handlers
pub const SHORTCUT_FLAG: usize = 0x101;

/// Injection markers owned by one engine instance
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InjectionMarkers {
    /// Bit present in every marker; single-key handlers skip any event carrying it
    pub common: usize,
    pub single_key: usize,
    /// Shortcut handlers skip only events tagged exactly with this value
    pub shortcut: usize,
}

impl Default for InjectionMarkers {
    fn default() -> Self {
        Self {
            common: INJECTED_FLAG,
            single_key: SINGLE_KEY_FLAG,
            shortcut: SHORTCUT_FLAG,
        }
    }
}

impl InjectionMarkers {
    pub fn is_injected(&self, extra_info: usize) -> bool {
        extra_info & self.common != 0
    }

    pub fn is_shortcut_injection(&self, extra_info: usize) -> bool {
        extra_info == self.shortcut
    }
}

/// Kind of key transition delivered by the hook
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyTransition {
    Down,
    Up,
    /// Key down while Alt is held
    SysDown,
    /// Key up while Alt is held
    SysUp,
}

impl KeyTransition {
    pub fn is_down(self) -> bool {
        matches!(self, KeyTransition::Down | KeyTransition::SysDown)
    }

    pub fn is_up(self) -> bool {
        !self.is_down()
    }
}

/// One physical (or re-entrant synthetic) key transition
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: VirtualKey,
    pub transition: KeyTransition,
    pub extra_info: usize,
}

impl KeyEvent {
    pub fn new(key: VirtualKey, transition: KeyTransition) -> Self {
        Self {
            key,
            transition,
            extra_info: 0,
        }
    }

    pub fn down(key: VirtualKey) -> Self {
        Self::new(key, KeyTransition::Down)
    }

    pub fn up(key: VirtualKey) -> Self {
        Self::new(key, KeyTransition::Up)
    }

    pub fn is_down(&self) -> bool {
        self.transition.is_down()
    }

    pub fn is_up(&self) -> bool {
        self.transition.is_up()
    }
}

/// One synthetic key event handed to `InputInterface::inject`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyInput {
    pub key: VirtualKey,
    pub key_up: bool,
    pub extra_info: usize,
}

impl KeyInput {
    pub fn down(key: VirtualKey, extra_info: usize) -> Self {
        Self {
            key,
            key_up: false,
            extra_info,
        }
    }

    pub fn up(key: VirtualKey, extra_info: usize) -> Self {
        Self {
            key,
            key_up: true,
            extra_info,
        }
    }
}

/// Scripted strokes are sent unmarked, like physical input
impl From<KeyStroke> for KeyInput {
    fn from(stroke: KeyStroke) -> Self {
        Self {
            key: stroke.key,
            key_up: stroke.key_up,
            extra_info: 0,
        }
    }
}

/// Suppression decision returned to the hook
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HookResult {
    /// Swallow the physical event
    Suppress,
    /// Let the event reach the focused application unchanged
    PassThrough,
}

/// Platform services the engine depends on
///
/// `inject` may re-enter the hook synchronously on the calling thread, so
/// callers must not hold any table lock across it.
pub trait InputInterface {
    /// Injects `inputs` in order and returns how many were accepted.
    fn inject(&self, inputs: &[KeyInput]) -> usize;

    /// Whether `key` is currently held. Generic modifier codes report
    /// whether either side is held.
    fn key_state(&self, key: VirtualKey) -> bool;

    /// Foreground process name, empty when it cannot be resolved.
    fn current_application_name(&self, keep_path: bool) -> String;
}
