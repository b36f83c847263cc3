//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::dispatch::SubmitPolicy;
use crate::core::state::App;

/// Creates a test App with the default (reject) policy.
pub fn test_app() -> App {
    test_app_with_policy(SubmitPolicy::default())
}

pub fn test_app_with_policy(policy: SubmitPolicy) -> App {
    App::new("http://test.invalid".to_string(), policy)
}
