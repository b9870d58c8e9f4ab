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

//! src/config/transaction.rs
//!
//! Profile writes with automatic backups
//!
//! A transaction snapshots the current profile into a timestamped backup
//! before anything is written, then replaces the file atomically.

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::ConfigError;

/// Directory created next to a profile to hold its backups
pub const BACKUP_DIR_NAME: &str = "backups";

/// Atomic profile write with automatic backup.
///
/// # Lifecycle
///
/// 1. `begin()` - Copies the current profile to a timestamped backup
/// 2. `commit()` - Writes the new content atomically, or
/// 3. `rollback()` - Restores the profile as it was at `begin()`
///
/// # Example
///
/// ```no_run
/// use keyboard_remapper::config::ProfileTransaction;
/// use std::path::Path;
///
/// let tx = ProfileTransaction::begin(Path::new("remaps.conf"))?;
/// tx.commit("key = CapsLock, Esc\n")?;
/// # Ok::<(), keyboard_remapper::config::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ProfileTransaction {
    path: PathBuf,
    /// `None` when the profile did not exist yet
    backup_path: Option<PathBuf>,
}

impl ProfileTransaction {
    /// Begins a transaction, backing up the profile first if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be created or the
    /// backup cannot be written. Nothing is modified in that case.
    pub fn begin(path: &Path) -> Result<Self, ConfigError> {
        let backup_path = if path.exists() {
            Some(create_timestamped_backup(path)?)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            backup_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Atomically replaces the profile with `new_content`.
    ///
    /// The write goes to a temporary file that is renamed over the profile,
    /// so readers see either the old or the new content. The backup stays
    /// in place.
    pub fn commit(&self, new_content: &str) -> Result<(), ConfigError> {
        write_atomically(&self.path, new_content)?;
        info!(path = %self.path.display(), "profile written");
        Ok(())
    }

    /// Restores the profile as it was when the transaction began.
    ///
    /// A profile that did not exist at `begin()` is removed again.
    pub fn rollback(&self) -> Result<(), ConfigError> {
        match &self.backup_path {
            Some(backup_path) => {
                let backup_content = fs::read_to_string(backup_path)?;
                write_atomically(&self.path, &backup_content)?;
            }
            None if self.path.exists() => fs::remove_file(&self.path)?,
            None => {}
        }
        info!(path = %self.path.display(), "profile rolled back");
        Ok(())
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e))
    })?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit().map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e))
    })
}

/// Copies `path` to `backups/<name>.<YYYY-MM-DD_HHMMSS>` next to it, adding
/// `.1`, `.2`, ... when that name is already taken.
fn create_timestamped_backup(path: &Path) -> Result<PathBuf, ConfigError> {
    let content = fs::read_to_string(path)?;

    let backup_dir = path
        .parent()
        .map(|parent| parent.join(BACKUP_DIR_NAME))
        .ok_or_else(|| ConfigError::BackupFailed("profile has no parent directory".to_string()))?;
    fs::create_dir_all(&backup_dir)
        .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_dir.display(), e)))?;

    let original_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ConfigError::BackupFailed("profile name is not valid UTF-8".to_string()))?;

    let stem = format!("{}.{}", original_name, Local::now().format("%Y-%m-%d_%H%M%S"));

    // Backups taken within the same second get a numeric suffix
    let mut attempt: u32 = 0;
    loop {
        let backup_path = match attempt {
            0 => backup_dir.join(&stem),
            n => backup_dir.join(format!("{}.{}", stem, n)),
        };

        match OpenOptions::new().write(true).create_new(true).open(&backup_path) {
            Ok(mut file) => {
                file.write_all(content.as_bytes())?;
                debug!(backup = %backup_path.display(), "profile backed up");
                return Ok(backup_path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
