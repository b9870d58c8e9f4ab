// Copyright 2025 bakri (tidynest@proton.me)
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

//! src/core/mod.rs
//!
//! Core remapping model
//!
//! This module contains the data structures and rules shared by the editor
//! and the live engine:
//! - Key codes, modifier families and key names
//! - Shortcuts and remap targets
//! - The editor buffer and its validation engine
//! - Overlap detection between remap sources
//! - The remap profile parser
//!
//! Nothing here touches the keyboard or the file system, so every rule can
//! be unit tested on plain values.

pub mod buffer;
pub mod conflict;
pub mod keys;
pub mod parser;
pub mod types;
pub mod validator;

pub use buffer::{Column, RemapBuffer, RemapBufferRow};
pub use conflict::{Conflict, ConflictDetector};
pub use types::*;
pub use validator::{
    validate_key_buffer_element, validate_shortcut_buffer_element, DropDownAction, KeySelection,
    ShortcutEdit, ValidationError,
};

#[cfg(test)]
mod tests;
