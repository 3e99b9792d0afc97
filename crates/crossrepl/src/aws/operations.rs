//! Provider operations used by provisioning and teardown
//!
//! These traits abstract the S3 and IAM clients so that orchestration
//! and teardown logic can be exercised without hitting real AWS.

use crate::error::Result;
use crate::lifecycle::LifecycleRule;
use std::future::Future;

/// Replication rule from one bucket to a bucket in another account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationRule {
    pub id: String,
    pub priority: i32,
    /// Role S3 assumes to replicate
    pub role_arn: String,
    pub destination_bucket_arn: String,
    pub destination_account: String,
    pub storage_class: String,
}

/// One object version or delete marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersionRef {
    pub key: String,
    pub version_id: String,
}

/// Where the next page of a version listing starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

/// One page of a version listing
#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub versions: Vec<ObjectVersionRef>,
    pub delete_markers: Vec<ObjectVersionRef>,
    /// Set when the listing is truncated
    pub next: Option<VersionMarker>,
}

impl VersionPage {
    pub fn entries(&self) -> impl Iterator<Item = &ObjectVersionRef> {
        self.versions.iter().chain(self.delete_markers.iter())
    }
}

/// Trait for S3 bucket operations.
pub trait StorageOperations: Send + Sync {
    /// Create a private bucket in `region`, returning its ARN
    fn create_bucket(&self, bucket: &str, region: &str)
    -> impl Future<Output = Result<String>> + Send;

    /// Turn on object versioning
    fn enable_versioning(&self, bucket: &str) -> impl Future<Output = Result<()>> + Send;

    /// Replace the bucket's lifecycle configuration with `rules`
    fn put_lifecycle_rules(
        &self,
        bucket: &str,
        rules: &[LifecycleRule],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Apply a bucket policy without removing the owner's own access
    fn put_bucket_policy(&self, bucket: &str, policy: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Replace the bucket's replication configuration with a single rule
    fn put_replication(
        &self,
        bucket: &str,
        rule: &ReplicationRule,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List one page of object versions and delete markers
    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> impl Future<Output = Result<VersionPage>> + Send;

    /// Permanently delete one object version or delete marker
    fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete an empty bucket
    fn delete_bucket(&self, bucket: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Trait for IAM operations.
pub trait IdentityOperations: Send + Sync {
    /// Create a managed policy, returning its ARN
    fn create_policy(&self, name: &str, document: &str)
    -> impl Future<Output = Result<String>> + Send;

    /// Create a role with the given trust document, returning its ARN
    fn create_role(
        &self,
        name: &str,
        trust_document: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Attach a managed policy to a role
    fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Resolves provider clients for a credential profile and region.
pub trait CloudConnector: Send + Sync {
    type Storage: StorageOperations;
    type Identity: IdentityOperations;

    fn storage(&self, profile: &str, region: &str)
    -> impl Future<Output = Result<Self::Storage>> + Send;

    fn identity(
        &self,
        profile: &str,
        region: &str,
    ) -> impl Future<Output = Result<Self::Identity>> + Send;

    /// Account ID the profile's credentials belong to
    fn caller_account(&self, profile: &str, region: &str)
    -> impl Future<Output = Result<String>> + Send;
}
