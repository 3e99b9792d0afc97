//! Journal-driven teardown
//!
//! Replays the journal and, for every recorded bucket, removes all object
//! versions and delete markers before deleting the bucket itself. Only the
//! bucket name, profile and region are read from each record; everything
//! else is rediscovered through listing.
//!
//! A bucket that no longer exists counts as cleaned up, so teardown can be
//! re-run after a partial failure. Any other error is recorded against that
//! bucket and teardown moves on to the next record.

use crate::aws::{CloudConnector, StorageOperations};
use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::policy;
use crate::record::BucketRecord;
use tracing::{info, instrument, warn};

/// Result of cleaning up a single bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupResult {
    /// Bucket was emptied and deleted
    Deleted,
    /// Bucket did not exist (not found)
    AlreadyDeleted,
}

/// A bucket whose cleanup failed
#[derive(Debug)]
pub struct BucketFailure {
    pub bucket: String,
    pub profile: String,
    pub error: Error,
}

/// IAM names recorded for a bucket that teardown does not remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedIam {
    pub profile: String,
    pub role_name: String,
    pub policy_name: String,
}

/// Report of a teardown run
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub deleted: Vec<String>,
    pub already_absent: Vec<String>,
    pub failed: Vec<BucketFailure>,
    /// Object versions and delete markers removed across all buckets
    pub versions_removed: usize,
    pub retained_iam: Vec<RetainedIam>,
}

impl TeardownReport {
    /// Every journaled bucket is gone
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Removes the buckets listed in a journal
pub struct Teardown<'a, C> {
    connector: &'a C,
}

impl<'a, C: CloudConnector> Teardown<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self { connector }
    }

    /// Clean up every bucket in the journal.
    ///
    /// An unreadable or corrupt journal aborts before any remote call.
    /// Per-bucket failures are collected in the report instead.
    #[instrument(skip_all)]
    pub async fn run<J: Journal>(&self, journal: &J) -> Result<TeardownReport> {
        let records = journal.records()?.collect::<Result<Vec<_>>>()?;
        info!(records = records.len(), "Replaying journal");

        let mut report = TeardownReport::default();

        for record in &records {
            match self.clean_bucket(record, &mut report.versions_removed).await {
                Ok(CleanupResult::Deleted) => {
                    info!(bucket = %record.name(), "Deleted bucket");
                    report.deleted.push(record.name().to_string());
                }
                Ok(CleanupResult::AlreadyDeleted) => {
                    info!(bucket = %record.name(), "Bucket already absent");
                    report.already_absent.push(record.name().to_string());
                }
                Err(error) => {
                    warn!(
                        bucket = %record.name(),
                        profile = %record.profile(),
                        error = %error,
                        "Bucket cleanup failed"
                    );
                    report.failed.push(BucketFailure {
                        bucket: record.name().to_string(),
                        profile: record.profile().to_string(),
                        error,
                    });
                }
            }

            if !policy::is_empty_document(record.iam().policy()) {
                report.retained_iam.push(RetainedIam {
                    profile: record.profile().to_string(),
                    role_name: record.iam().role_name().to_string(),
                    policy_name: record.iam().policy_name().to_string(),
                });
            }
        }

        for iam in &report.retained_iam {
            warn!(
                profile = %iam.profile,
                role_name = %iam.role_name,
                policy_name = %iam.policy_name,
                "IAM role and policy are not removed by cleanup; delete them manually"
            );
        }

        info!(
            deleted = report.deleted.len(),
            already_absent = report.already_absent.len(),
            failed = report.failed.len(),
            versions_removed = report.versions_removed,
            "Teardown finished"
        );
        Ok(report)
    }

    async fn clean_bucket(
        &self,
        record: &BucketRecord,
        removed: &mut usize,
    ) -> Result<CleanupResult> {
        let storage = self
            .connector
            .storage(record.profile(), record.region())
            .await?;

        let result = match empty_bucket(&storage, record.name(), removed).await {
            Ok(()) => storage.delete_bucket(record.name()).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(CleanupResult::Deleted),
            Err(e) if e.is_missing_bucket() => Ok(CleanupResult::AlreadyDeleted),
            Err(e) => Err(e),
        }
    }
}

/// Delete every object version and delete marker, page by page.
async fn empty_bucket<S: StorageOperations>(
    storage: &S,
    bucket: &str,
    removed: &mut usize,
) -> Result<()> {
    let mut marker = None;
    loop {
        let page = storage.list_object_versions(bucket, marker).await?;
        for entry in page.entries() {
            storage
                .delete_object_version(bucket, &entry.key, &entry.version_id)
                .await?;
            *removed += 1;
        }
        match page.next {
            Some(next) => marker = Some(next),
            None => return Ok(()),
        }
    }
}
