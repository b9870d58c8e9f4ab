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

//! src/config/validator.rs
//!
//! Whole-profile validation
//!
//! Runs every table-level rule over a parsed profile and collects the
//! findings into one report:
//! - **Errors** block a commit: overlapping sources, rows mapped to
//!   themselves, and rows the store would refuse (invalid or reserved
//!   shortcuts, disabled shortcut targets, duplicate toggles)
//! - **Warnings** are informational: keys left unreachable by the remaps
//!   and application rows hidden behind an OS-level row
//!
//! # Example
//!
//! ```
//! use keyboard_remapper::config::RemapProfile;
//!
//! let profile = RemapProfile::parse("key = A, B\nkey = A, C")?;
//! let report = profile.validate();
//! assert!(report.has_errors());
//! # Ok::<(), keyboard_remapper::config::ConfigError>(())
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::config::{add_to_tables, profile_buffer};
use crate::core::keys::key_name;
use crate::core::parser::{ProfileEntry, ProfileLine};
use crate::core::{ConflictDetector, RemapTarget, Shortcut, ValidationError};
use crate::engine::RemapTables;

/// Validation severity level
///
/// - **Error**: Blocks commit
/// - **Warning**: Allows commit but is reported to the user
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationLevel {
    Error,
    Warning,
}

/// A single finding, tied to the profile line it concerns
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationIssue {
    /// 1-based profile line
    pub line: usize,
    pub validation_level: ValidationLevel,
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

/// Every issue found in a profile, in line order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the report contains any Error-level issues
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues_at(ValidationLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues_at(ValidationLevel::Warning)
    }

    fn issues_at(&self, level: ValidationLevel) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.validation_level == level)
    }

    pub fn add_error(&mut self, line: usize, message: String) {
        self.issues.push(ValidationIssue {
            line,
            validation_level: ValidationLevel::Error,
            message,
            suggestion: None,
        });
    }

    pub fn add_warning(&mut self, line: usize, message: String, suggestion: Option<String>) {
        self.issues.push(ValidationIssue {
            line,
            validation_level: ValidationLevel::Warning,
            message,
            suggestion,
        });
    }

    fn sort(&mut self) {
        self.issues.sort_by_key(|issue| issue.line);
    }
}

/// Validates a parsed profile.
pub fn validate_profile(lines: &[ProfileLine]) -> ValidationReport {
    let mut report = ValidationReport::new();

    let rejected = check_overlaps(lines, &mut report);

    let mut tables = RemapTables::new();
    for (index, line) in lines.iter().enumerate() {
        if rejected.contains(&index) {
            continue;
        }
        if let Some(error) = mapped_to_itself(&line.entry) {
            report.add_error(line.line, error.to_string());
            continue;
        }
        if let Err(error) = add_to_tables(&mut tables, &line.entry) {
            report.add_error(line.line, error.to_string());
        }
    }

    warn_orphaned_keys(lines, &mut report);
    warn_shadowed_app_rows(lines, &mut report);

    report.sort();
    report
}

/// Reports every row whose source overlaps an earlier row in the same
/// scope, and returns the indices of those rows.
fn check_overlaps(lines: &[ProfileLine], report: &mut ValidationReport) -> BTreeSet<usize> {
    let mut detector = ConflictDetector::new();
    for (index, line) in lines.iter().enumerate() {
        match &line.entry {
            ProfileEntry::SingleKey { source, .. } => {
                detector.add_source(index, "", RemapTarget::Key(*source));
            }
            ProfileEntry::Shortcut { source, app, .. } => {
                detector.add_source(
                    index,
                    app.as_deref().unwrap_or_default(),
                    RemapTarget::Combo(*source),
                );
            }
            ProfileEntry::Toggle(_) => {}
        }
    }

    let mut rejected = BTreeSet::new();
    for conflict in detector.find_conflicts() {
        // One report per row, against the first row it overlaps
        if !rejected.insert(conflict.second_row) {
            continue;
        }
        report.add_error(
            lines[conflict.second_row].line,
            format!(
                "{} (overlaps line {})",
                conflict.error, lines[conflict.first_row].line
            ),
        );
    }
    rejected
}

fn mapped_to_itself(entry: &ProfileEntry) -> Option<ValidationError> {
    match entry {
        ProfileEntry::SingleKey { source, target } if source == target => {
            Some(ValidationError::MapToSameKey)
        }
        ProfileEntry::Shortcut {
            source,
            target: RemapTarget::Combo(target),
            ..
        } if source == target => Some(ValidationError::MapToSameShortcut),
        _ => None,
    }
}

fn warn_orphaned_keys(lines: &[ProfileLine], report: &mut ValidationReport) {
    for key in profile_buffer(lines).orphaned_keys() {
        let line = lines
            .iter()
            .find(|line| matches!(line.entry, ProfileEntry::SingleKey { source, .. } if source == key))
            .map_or(0, |line| line.line);
        let name = key_name(key);
        report.add_warning(
            line,
            format!("{} is remapped and no longer produced by any key", name),
            Some(format!("Map another key to {} if you still need it", name)),
        );
    }
}

/// Application rows never fire when an OS-level row has the same source,
/// because OS-level shortcuts are matched first.
fn warn_shadowed_app_rows(lines: &[ProfileLine], report: &mut ValidationReport) {
    let os_rows: HashMap<Shortcut, usize> = lines
        .iter()
        .filter_map(|line| match &line.entry {
            ProfileEntry::Shortcut {
                source, app: None, ..
            } => Some((*source, line.line)),
            _ => None,
        })
        .collect();

    for line in lines {
        if let ProfileEntry::Shortcut {
            source,
            app: Some(app),
            ..
        } = &line.entry
        {
            if let Some(os_line) = os_rows.get(source) {
                report.add_warning(
                    line.line,
                    format!(
                        "{} for {} is hidden by the OS-level remap on line {}",
                        source, app, os_line
                    ),
                    Some("Remove one of the two rows".to_string()),
                );
            }
        }
    }
}
