//! Per-bucket provisioning steps
//!
//! A `Provisioner` owns one `BucketRecord` and issues the remote calls that
//! bring its bucket to the desired state. Each step must succeed before the
//! caller moves to the next one; errors propagate unchanged and nothing is
//! rolled back here. Cleanup is driven from the journal by `Teardown`.

use crate::aws::{IdentityOperations, ReplicationRule, StorageOperations};
use crate::error::{Error, Result};
use crate::policy::{self, REPLICATION_TRUST_POLICY};
use crate::record::{BucketRecord, short_suffix};
use tracing::{debug, info};

/// Priority of the single replication rule
pub const REPLICATION_RULE_PRIORITY: i32 = 123;

/// Storage class replicas are written with
pub const REPLICA_STORAGE_CLASS: &str = "STANDARD";

const REPLICATION_RULE_PREFIX: &str = "ReplicationConfiguration";

/// Drives one bucket record through its provisioning steps
pub struct Provisioner<'a, S> {
    record: BucketRecord,
    storage: &'a S,
}

impl<'a, S: StorageOperations> Provisioner<'a, S> {
    pub fn new(record: BucketRecord, storage: &'a S) -> Self {
        Self { record, storage }
    }

    pub fn record(&self) -> &BucketRecord {
        &self.record
    }

    pub fn into_record(self) -> BucketRecord {
        self.record
    }

    /// Create the bucket privately in the record's region and record its ARN.
    pub async fn create_bucket(&mut self) -> Result<()> {
        let arn = self
            .storage
            .create_bucket(self.record.name(), self.record.region())
            .await?;
        self.record.set_arn(&arn)?;
        info!(bucket = %self.record.name(), arn = %arn, "Bucket created");
        Ok(())
    }

    pub async fn enable_versioning(&mut self) -> Result<()> {
        self.storage.enable_versioning(self.record.name()).await?;
        info!(bucket = %self.record.name(), "Versioning enabled");
        Ok(())
    }

    /// Apply the record's lifecycle rules verbatim.
    pub async fn enable_lifecycle_policy(&mut self) -> Result<()> {
        self.storage
            .put_lifecycle_rules(self.record.name(), self.record.lifecycle_rules())
            .await?;
        info!(
            bucket = %self.record.name(),
            rules = self.record.lifecycle_rules().len(),
            "Lifecycle policy applied"
        );
        Ok(())
    }

    /// Apply the bucket policy, leaving the owner's own access in place.
    ///
    /// An empty policy document means there is nothing to apply.
    pub async fn apply_security(&mut self) -> Result<()> {
        if policy::is_empty_document(self.record.bucket_policy()) {
            debug!(bucket = %self.record.name(), "No bucket policy to apply");
            return Ok(());
        }
        let document = self.record.bucket_policy().to_string();
        self.storage
            .put_bucket_policy(self.record.name(), &document)
            .await?;
        info!(bucket = %self.record.name(), "Bucket policy applied");
        Ok(())
    }

    /// Create the replication policy and role, then attach one to the other.
    pub async fn create_iam_role<I: IdentityOperations>(&mut self, identity: &I) -> Result<()> {
        let policy_name = self.record.iam().policy_name().to_string();
        let document = self.record.iam().policy().to_string();
        let policy_arn = identity.create_policy(&policy_name, &document).await?;
        self.record.set_policy_arn(&policy_arn)?;

        let role_name = self.record.iam().role_name().to_string();
        let role_arn = identity
            .create_role(&role_name, REPLICATION_TRUST_POLICY)
            .await?;
        self.record.set_role_arn(&role_arn)?;

        identity.attach_role_policy(&role_name, &policy_arn).await?;

        info!(
            bucket = %self.record.name(),
            role_name = %role_name,
            role_arn = %role_arn,
            policy_arn = %policy_arn,
            "Replication role created"
        );
        Ok(())
    }

    /// Replicate every object into `destination_arn`, owned by `destination_account`.
    ///
    /// Requires the role ARN from `create_iam_role` and the destination
    /// bucket's ARN; nothing is sent if either is missing.
    pub async fn enable_replication(
        &mut self,
        destination_arn: &str,
        destination_account: &str,
    ) -> Result<()> {
        if self.record.iam().role_arn().is_empty() {
            return Err(self.not_ready("role arn"));
        }
        if destination_arn.is_empty() {
            return Err(self.not_ready("destination bucket arn"));
        }

        let rule = ReplicationRule {
            id: format!("{REPLICATION_RULE_PREFIX}-{}", short_suffix()),
            priority: REPLICATION_RULE_PRIORITY,
            role_arn: self.record.iam().role_arn().to_string(),
            destination_bucket_arn: destination_arn.to_string(),
            destination_account: destination_account.to_string(),
            storage_class: REPLICA_STORAGE_CLASS.to_string(),
        };
        self.storage
            .put_replication(self.record.name(), &rule)
            .await?;

        info!(
            bucket = %self.record.name(),
            destination = %destination_arn,
            rule_id = %rule.id,
            "Replication enabled"
        );
        Ok(())
    }

    fn not_ready(&self, missing: &'static str) -> Error {
        Error::NotReady {
            step: "enable replication",
            name: self.record.name().to_string(),
            missing,
        }
    }
}
