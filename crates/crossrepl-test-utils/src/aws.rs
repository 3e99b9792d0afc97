//! AWS test utilities
//!
//! Provides region detection, profile lookup and unique names for AWS
//! integration tests.

use chrono::Utc;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-2
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-2".to_string())
}

/// Profile for one side of an integration test, from
/// `CROSSREPL_TEST_<SIDE>_PROFILE` (e.g. `CROSSREPL_TEST_SRC_PROFILE`).
pub fn test_profile(side: &str) -> Option<String> {
    std::env::var(format!("CROSSREPL_TEST_{}_PROFILE", side.to_ascii_uppercase())).ok()
}

/// Generate a unique run ID for test resources.
///
/// Format: `{timestamp_secs}-{counter}`, short enough to fit in a bucket base name.
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{ts}-{counter}")
}

/// Generate a bucket base name for test resources.
///
/// Format: `crt-{prefix}-{run_id}`
///
/// # Example
///
/// ```
/// use crossrepl_test_utils::aws::test_base_name;
///
/// let base = test_base_name("src");
/// assert!(base.starts_with("crt-src-"));
/// ```
pub fn test_base_name(prefix: &str) -> String {
    format!("crt-{prefix}-{}", test_run_id())
}
