//! Config module tests
//!
//! - Profile loading, staging, committing and saving
//! - Backup and atomic write transactions
//! - Whole-profile validation

#[cfg(test)]
mod validator_tests;
