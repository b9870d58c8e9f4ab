//! src/config/mod.rs
//!
//! Remap profiles on disk
//!
//! A profile is a plain text file of `key`, `toggle` and `shortcut` lines.
//! This module loads it, validates the whole table set, commits it into a
//! live `RemapTableStore` and writes it back in canonical form with a backup.
//!
//! # Example
//!
//! ```no_run
//! use keyboard_remapper::config::load_profile;
//! use keyboard_remapper::engine::RemapTableStore;
//!
//! let profile = load_profile("~/.config/keyboard-remapper/remaps.conf")?;
//! let store = RemapTableStore::new();
//! let report = profile.commit(&store)?;
//! for warning in report.warnings() {
//!     eprintln!("line {}: {}", warning.line, warning.message);
//! }
//! # Ok::<(), keyboard_remapper::config::ConfigError>(())
//! ```

pub mod error;
pub mod transaction;
pub mod validator;

pub use error::ConfigError;
pub use transaction::ProfileTransaction;
pub use validator::{validate_profile, ValidationIssue, ValidationLevel, ValidationReport};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::buffer::split_generic_remap;
use crate::core::parser::{parse_profile, ProfileEntry, ProfileLine};
use crate::core::{RemapBuffer, RemapBufferRow, RemapTarget};
use crate::engine::{RemapTableStore, RemapTables, StoreError};

/// A parsed profile
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemapProfile {
    /// Where the profile was loaded from, if anywhere
    path: Option<PathBuf>,
    lines: Vec<ProfileLine>,
}

impl RemapProfile {
    /// Parses profile text that did not come from a file.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_lines(parse_profile(content)?))
    }

    pub fn from_lines(lines: Vec<ProfileLine>) -> Self {
        Self { path: None, lines }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lines(&self) -> &[ProfileLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Stages every line into a fresh set of tables.
    ///
    /// Stops at the first row the tables refuse. Shortcut overlaps between
    /// a generic modifier and one of its sides are only caught by `validate`.
    pub fn to_tables(&self) -> Result<RemapTables, ConfigError> {
        let mut tables = RemapTables::new();
        for line in &self.lines {
            add_to_tables(&mut tables, &line.entry).map_err(|source| ConfigError::Rejected {
                line: line.line,
                source,
            })?;
        }
        Ok(tables)
    }

    /// The profile as editor rows. Toggle lines have no editor row.
    pub fn to_buffer(&self) -> RemapBuffer {
        profile_buffer(&self.lines)
    }

    pub fn validate(&self) -> ValidationReport {
        validate_profile(&self.lines)
    }

    /// Validates the profile and, if it has no errors, swaps it into `store`.
    ///
    /// The store is left untouched when validation fails. Warnings do not
    /// block the commit and are returned to the caller.
    pub fn commit(&self, store: &RemapTableStore) -> Result<ValidationReport, ConfigError> {
        let report = self.validate();
        if let Some(first) = report.errors().next() {
            return Err(ConfigError::ValidationFailed(format!(
                "{} error(s), first on line {}: {}",
                report.errors().count(),
                first.line,
                first.message
            )));
        }

        let tables = self.to_tables()?;
        let rows = tables.len();
        store.replace_all(tables);
        info!(rows, warnings = report.warnings().count(), "profile committed");
        Ok(report)
    }

    /// Canonical text of the profile, one entry per line.
    ///
    /// Comments and blank lines are not preserved.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}\n", line.entry))
            .collect()
    }

    /// Writes the canonical text to `path`, backing up any existing file.
    ///
    /// Returns the backup path, or `None` if `path` did not exist yet.
    pub fn save(&self, path: &Path) -> Result<Option<PathBuf>, ConfigError> {
        let tx = ProfileTransaction::begin(path)?;
        if let Err(e) = tx.commit(&self.render()) {
            tx.rollback()?;
            return Err(e);
        }
        Ok(tx.backup_path().map(Path::to_path_buf))
    }
}

/// Loads and parses a profile. A leading `~` is expanded.
pub fn load_profile(path: &str) -> Result<RemapProfile, ConfigError> {
    let path = expand_path(path);
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    let content = fs::read_to_string(&path)?;
    let lines = parse_profile(&content)?;
    debug!(path = %path.display(), lines = lines.len(), "profile loaded");

    Ok(RemapProfile {
        path: Some(path),
        lines,
    })
}

/// Expands `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Adds one profile entry to `tables`.
///
/// A generic modifier source is stored under both sided keys.
pub(crate) fn add_to_tables(
    tables: &mut RemapTables,
    entry: &ProfileEntry,
) -> Result<(), StoreError> {
    match entry {
        ProfileEntry::SingleKey { source, target } => {
            for key in split_generic_remap(*source) {
                tables.add_single_key_remap(key, *target)?;
            }
            Ok(())
        }
        ProfileEntry::Toggle(key) => tables.add_toggle_to_mod_key(*key),
        ProfileEntry::Shortcut {
            source,
            target,
            app: None,
        } => tables.add_os_level_shortcut(*source, *target),
        ProfileEntry::Shortcut {
            source,
            target,
            app: Some(app),
        } => tables.add_app_specific_shortcut(app, *source, *target),
    }
}

pub(crate) fn profile_buffer(lines: &[ProfileLine]) -> RemapBuffer {
    lines
        .iter()
        .filter_map(|line| match &line.entry {
            ProfileEntry::SingleKey { source, target } => Some(RemapBufferRow::new(
                RemapTarget::Key(*source),
                RemapTarget::Key(*target),
            )),
            ProfileEntry::Toggle(_) => None,
            ProfileEntry::Shortcut {
                source,
                target,
                app,
            } => Some(RemapBufferRow::for_app(
                RemapTarget::Combo(*source),
                *target,
                app.as_deref().unwrap_or_default(),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests;
