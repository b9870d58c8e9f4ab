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

//! Keyboard Remapper
//!
//! A live keyboard remap engine with an edit-time validation engine for
//! key and shortcut remap tables.
//!
//! # Features
//!
//! - **Single-key remaps:** Rewrite one key into another, or disable it
//! - **Toggle-to-modifier:** Turn a lock key into a momentary modifier
//! - **Shortcut remaps:** OS-level and per-application, to a shortcut or a key
//! - **Edit-time validation:** Per-cell checks with the editor's message set
//! - **Profiles:** Plain text remap files with backups on every rewrite
//!
//! # Architecture
//!
//! - **`core`:** Key model, shortcut type, profile parser, validation engine
//! - **`engine`:** Remap tables and the hook-side event handlers
//! - **`config`:** Profile loading, whole-table validation, commits, backups
//! - **`logging`:** Tracing setup for the binary
//!
//! # Examples
//!
//! ## Validating an editor cell
//!
//! ```
//! use keyboard_remapper::core::keys::{selectable_keys, VK_CAPITAL, VK_LCONTROL};
//! use keyboard_remapper::core::{
//!     validate_key_buffer_element, Column, RemapBuffer, RemapBufferRow, RemapTarget,
//!     ValidationError,
//! };
//!
//! let buffer: RemapBuffer = vec![RemapBufferRow::new(
//!     RemapTarget::Key(VK_CAPITAL),
//!     RemapTarget::Key(VK_LCONTROL),
//! )]
//! .into_iter()
//! .collect();
//!
//! // Picking the row's own source as its target
//! let result = validate_key_buffer_element(
//!     0,
//!     Column::Target,
//!     Some(VK_CAPITAL),
//!     &selectable_keys(),
//!     &buffer,
//! );
//! assert_eq!(result, Err(ValidationError::MapToSameKey));
//! ```
//!
//! ## Running a profile through the engine
//!
//! ```
//! use keyboard_remapper::config::RemapProfile;
//! use keyboard_remapper::core::keys::{VK_CAPITAL, VK_ESCAPE};
//! use keyboard_remapper::engine::{EngineContext, SimulatedKeyboard};
//! use std::sync::Arc;
//!
//! let profile = RemapProfile::parse("key = CapsLock, Esc")?;
//! let engine = Arc::new(EngineContext::new());
//! profile.commit(engine.store())?;
//!
//! let keyboard = SimulatedKeyboard::with_engine(engine);
//! keyboard.press(VK_CAPITAL);
//! assert!(keyboard.is_held(VK_ESCAPE));
//! # Ok::<(), keyboard_remapper::config::ConfigError>(())
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod logging;

// Re-export commonly used types for convenience
pub use core::{RemapTarget, Shortcut, ValidationError};
pub use engine::EngineContext;
