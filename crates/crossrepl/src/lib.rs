//! crossrepl - cross-account S3 replication setup and teardown
//!
//! Provisions a source and destination bucket in two accounts, wired together
//! with versioning, lifecycle rules, a destination bucket policy and an IAM
//! replication role. Every bucket is written to an append-only journal before
//! it is created, and the journal drives cleanup.

pub mod aws;
pub mod config;
pub mod error;
pub mod journal;
pub mod lifecycle;
pub mod orchestrator;
pub mod policy;
pub mod provisioner;
pub mod record;
pub mod session;
pub mod teardown;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use journal::{FileJournal, Journal};
pub use record::BucketRecord;
pub use session::{Mode, Outcome};
