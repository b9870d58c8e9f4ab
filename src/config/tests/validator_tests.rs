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

use crate::config::{RemapProfile, ValidationLevel, ValidationReport};
use crate::core::ValidationError;

/// Helper: validates profile text
fn validate(content: &str) -> ValidationReport {
    RemapProfile::parse(content).unwrap().validate()
}

#[test]
fn test_clean_profile() {
    let report = validate("key = A, B\nkey = B, A\ntoggle = NumLock");
    assert!(!report.has_errors());
    assert_eq!(report.warnings().count(), 0);
}

#[test]
fn test_duplicate_key_reported_once_on_second_line() {
    let report = validate("key = A, B\nkey = C, D\nkey = A, E");

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
    assert_eq!(
        errors[0].message,
        format!("{} (overlaps line 1)", ValidationError::SameKeyPreviouslyMapped)
    );
}

#[test]
fn test_generic_and_sided_modifier_conflict() {
    let report = validate("key = Ctrl, Esc\nkey = LCtrl, Tab");

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1, "Store duplicate is not reported twice");
    assert_eq!(errors[0].line, 2);
    assert!(errors[0]
        .message
        .starts_with(&ValidationError::ConflictingModifierKey.to_string()));
}

#[test]
fn test_triple_duplicate_reports_each_extra_row() {
    let report = validate("key = A, B\nkey = A, C\nkey = A, D");

    let lines: Vec<usize> = report.errors().map(|issue| issue.line).collect();
    assert_eq!(lines, vec![2, 3]);
}

#[test]
fn test_shortcut_overlap_scoped_by_app() {
    let report = validate(
        "shortcut = Ctrl+C, Ctrl+V, notepad.exe\n\
         shortcut = LCtrl+C, Alt+V, NOTEPAD.EXE\n\
         shortcut = LCtrl+C, Alt+V, code.exe",
    );

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
    assert!(errors[0]
        .message
        .contains(&ValidationError::ConflictingModifierShortcut.to_string()));
}

#[test]
fn test_key_mapped_to_itself() {
    let report = validate("key = F1, F1");
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, ValidationError::MapToSameKey.to_string());
}

#[test]
fn test_shortcut_mapped_to_itself() {
    let report = validate("shortcut = Ctrl+A, Ctrl+A");
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, ValidationError::MapToSameShortcut.to_string());
}

#[test]
fn test_reserved_shortcuts_rejected() {
    let report = validate("shortcut = Win+L, Esc\nshortcut = Ctrl+Q, Ctrl+Alt+Delete");

    let lines: Vec<usize> = report.errors().map(|issue| issue.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(report.errors().all(|issue| issue.message.contains("reserved")));
}

#[test]
fn test_disabled_shortcut_target_rejected() {
    let report = validate("shortcut = Ctrl+Q, disable");
    assert!(report.has_errors());
    assert_eq!(report.errors().next().unwrap().line, 1);
}

#[test]
fn test_duplicate_toggle_rejected() {
    let report = validate("toggle = NumLock\ntoggle = NumLock");

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
}

#[test]
fn test_orphaned_key_warning() {
    let report = validate("# header\nkey = CapsLock, LCtrl");

    assert!(!report.has_errors());
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line, 2);
    assert_eq!(warnings[0].validation_level, ValidationLevel::Warning);
    assert!(warnings[0].message.starts_with("CapsLock"));
    assert!(warnings[0].suggestion.is_some());
}

#[test]
fn test_disabled_key_is_not_orphan_warning() {
    let report = validate("key = Insert, disable");
    assert!(report.issues.is_empty());
}

#[test]
fn test_shadowed_app_row_warning() {
    let report = validate(
        "shortcut = Ctrl+C, Ctrl+V, notepad.exe\n\
         shortcut = Ctrl+C, Ctrl+X",
    );

    assert!(!report.has_errors());
    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line, 1);
    assert!(warnings[0].message.contains("line 2"));
}

#[test]
fn test_issues_sorted_by_line() {
    let report = validate(
        "key = CapsLock, Esc\n\
         key = F2, F2\n\
         shortcut = Ctrl+C, Ctrl+V, notepad.exe\n\
         shortcut = Ctrl+C, Ctrl+X",
    );

    let lines: Vec<usize> = report.issues.iter().map(|issue| issue.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert!(report.has_errors());
    assert_eq!(report.warnings().count(), 2);
}

#[test]
fn test_report_builders() {
    let mut report = ValidationReport::new();
    assert!(!report.has_errors());

    report.add_warning(4, "heads up".to_string(), None);
    assert!(!report.has_errors());
    assert_eq!(report.warnings().count(), 1);

    report.add_error(2, "broken".to_string());
    assert!(report.has_errors());
    assert_eq!(report.errors().next().unwrap().line, 2);
}
