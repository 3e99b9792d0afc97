//! Crate error types

use crate::aws::AwsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by provisioning, teardown and the state journal
#[derive(Debug, Error)]
pub enum Error {
    /// A provider API call failed
    #[error(transparent)]
    Remote(#[from] AwsError),

    /// The journal file could not be opened, written or read
    #[error("journal I/O error on {}: {source}", path.display())]
    JournalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A journal line is not a valid record
    #[error("corrupt journal entry at {}:{line}: {source}", path.display())]
    JournalCorrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The SDK refused to build a request (missing required member)
    #[error("invalid request: {0}")]
    Build(#[from] aws_sdk_s3::error::BuildError),

    /// A write-once field was assigned a second, different value
    #[error("{field} of {name} is already set to {current}")]
    AlreadyAssigned {
        name: String,
        field: &'static str,
        current: String,
    },

    /// A step ran before the identifiers it depends on were assigned
    #[error("cannot {step} for {name}: {missing} is not assigned yet")]
    NotReady {
        step: &'static str,
        name: String,
        missing: &'static str,
    },

    /// A journal from a previous run is still present
    #[error(
        "journal {} from a previous run exists; re-run with --cleanup to remove its resources",
        .0.display()
    )]
    JournalExists(PathBuf),

    /// The credentials for a profile belong to a different account
    #[error("profile '{profile}' resolves to account {actual}, expected {expected}")]
    AccountMismatch {
        profile: String,
        expected: String,
        actual: String,
    },

    /// Operator-supplied configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Teardown left resources behind; the journal is kept for another attempt
    #[error("cleanup failed for {failed} bucket(s); journal kept at {}", path.display())]
    CleanupIncomplete { failed: usize, path: PathBuf },
}

impl Error {
    /// The provider error behind this failure, if any
    pub fn as_remote(&self) -> Option<&AwsError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }

    /// A `NoSuchBucket` provider error
    pub fn is_missing_bucket(&self) -> bool {
        self.as_remote().is_some_and(AwsError::is_missing_bucket)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
