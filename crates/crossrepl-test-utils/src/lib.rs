//! Shared test utilities for crossrepl
//!
//! Helpers for the credential-gated AWS integration tests.

pub mod aws;

pub use aws::{get_test_region, test_base_name, test_profile, test_run_id};
