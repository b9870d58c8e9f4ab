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

//! src/config/error.rs
//!
//! Errors raised while loading, checking and committing remap profiles

use std::path::PathBuf;
use thiserror::Error;

use crate::core::parser::ParseError;
use crate::engine::StoreError;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Profile file does not exist.
    #[error("Profile not found: {0}")]
    NotFound(PathBuf),
    /// Profile text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A row was refused while staging the tables.
    #[error("Line {line}: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: StoreError,
    },
    /// Whole-table validation reported errors; nothing was committed.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
