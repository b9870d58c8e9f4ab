//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Shortcut and remap target types
//! - Profile parsing
//! - Editor validation (single-key cells and shortcut dropdowns)
//! - Source overlap detection
//! - Buffer edits and commit checks

#[cfg(test)]
mod buffer_tests;
