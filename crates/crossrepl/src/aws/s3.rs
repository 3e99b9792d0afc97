//! S3 bucket configuration and cleanup

use super::context::AwsContext;
use super::error::sdk_error;
use super::operations::{
    ObjectVersionRef, ReplicationRule, StorageOperations, VersionMarker, VersionPage,
};
use crate::error::Result;
use crate::lifecycle::{LifecycleRule, RuleStatus};
use crate::policy::bucket_arn;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::BuildError;
use aws_sdk_s3::types as s3;
use tracing::{debug, info};

/// Region whose buckets must be created without a location constraint
const DEFAULT_S3_REGION: &str = "us-east-1";

/// S3 client bound to one profile
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create an S3 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }

    pub async fn create_bucket(&self, bucket: &str, region: &str) -> Result<String> {
        info!(bucket = %bucket, region = %region, "Creating S3 bucket");

        let mut request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .acl(s3::BucketCannedAcl::Private);

        if region != DEFAULT_S3_REGION {
            let create_config = s3::CreateBucketConfiguration::builder()
                .location_constraint(s3::BucketLocationConstraint::from(region))
                .build();
            request = request.create_bucket_configuration(create_config);
        }

        let response = request
            .send()
            .await
            .map_err(|e| sdk_error("CreateBucket", e))?;
        debug!(bucket = %bucket, response = ?response, "CreateBucket response");

        Ok(bucket_arn(bucket))
    }

    pub async fn enable_versioning(&self, bucket: &str) -> Result<()> {
        info!(bucket = %bucket, "Enabling versioning");

        let response = self
            .client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                s3::VersioningConfiguration::builder()
                    .status(s3::BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| sdk_error("PutBucketVersioning", e))?;
        debug!(bucket = %bucket, response = ?response, "PutBucketVersioning response");

        Ok(())
    }

    pub async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()> {
        info!(bucket = %bucket, rules = rules.len(), "Applying lifecycle policy");

        let rules = rules
            .iter()
            .map(to_sdk_lifecycle_rule)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let configuration = s3::BucketLifecycleConfiguration::builder()
            .set_rules(Some(rules))
            .build()?;

        let response = self
            .client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|e| sdk_error("PutBucketLifecycleConfiguration", e))?;
        debug!(bucket = %bucket, response = ?response, "PutBucketLifecycleConfiguration response");

        Ok(())
    }

    pub async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        info!(bucket = %bucket, "Applying bucket policy");

        let response = self
            .client
            .put_bucket_policy()
            .bucket(bucket)
            .confirm_remove_self_bucket_access(false)
            .policy(policy)
            .send()
            .await
            .map_err(|e| sdk_error("PutBucketPolicy", e))?;
        debug!(bucket = %bucket, response = ?response, "PutBucketPolicy response");

        Ok(())
    }

    pub async fn put_replication(&self, bucket: &str, rule: &ReplicationRule) -> Result<()> {
        info!(
            bucket = %bucket,
            destination = %rule.destination_bucket_arn,
            rule_id = %rule.id,
            "Enabling replication"
        );

        let configuration = s3::ReplicationConfiguration::builder()
            .role(&rule.role_arn)
            .rules(to_sdk_replication_rule(rule)?)
            .build()?;

        let response = self
            .client
            .put_bucket_replication()
            .bucket(bucket)
            .replication_configuration(configuration)
            .send()
            .await
            .map_err(|e| sdk_error("PutBucketReplication", e))?;
        debug!(bucket = %bucket, response = ?response, "PutBucketReplication response");

        Ok(())
    }

    pub async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<VersionPage> {
        let mut request = self.client.list_object_versions().bucket(bucket);
        if let Some(marker) = marker {
            request = request
                .key_marker(marker.key_marker)
                .set_version_id_marker(marker.version_id_marker);
        }

        let response = request
            .send()
            .await
            .map_err(|e| sdk_error("ListObjectVersions", e))?;

        let versions = response
            .versions()
            .iter()
            .filter_map(|v| version_ref(v.key(), v.version_id()))
            .collect();
        let delete_markers = response
            .delete_markers()
            .iter()
            .filter_map(|m| version_ref(m.key(), m.version_id()))
            .collect();

        let next = if response.is_truncated() == Some(true) {
            response.next_key_marker().map(|key| VersionMarker {
                key_marker: key.to_string(),
                version_id_marker: response.next_version_id_marker().map(|s| s.to_string()),
            })
        } else {
            None
        };

        Ok(VersionPage {
            versions,
            delete_markers,
            next,
        })
    }

    pub async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<()> {
        debug!(bucket = %bucket, key = %key, version_id = %version_id, "Deleting object version");

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .version_id(version_id)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteObject", e))?;

        Ok(())
    }

    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        info!(bucket = %bucket, "Deleting bucket");

        let response = self
            .client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteBucket", e))?;
        debug!(bucket = %bucket, response = ?response, "DeleteBucket response");

        Ok(())
    }
}

/// Versions created before versioning was enabled have the literal id "null".
fn version_ref(key: Option<&str>, version_id: Option<&str>) -> Option<ObjectVersionRef> {
    Some(ObjectVersionRef {
        key: key?.to_string(),
        version_id: version_id.unwrap_or("null").to_string(),
    })
}

fn to_sdk_lifecycle_rule(rule: &LifecycleRule) -> std::result::Result<s3::LifecycleRule, BuildError> {
    let status = match rule.status {
        RuleStatus::Enabled => s3::ExpirationStatus::Enabled,
        RuleStatus::Disabled => s3::ExpirationStatus::Disabled,
    };

    let mut builder = s3::LifecycleRule::builder()
        .id(&rule.id)
        .filter(
            s3::LifecycleRuleFilter::builder()
                .prefix(&rule.filter.prefix)
                .build(),
        )
        .status(status);

    if let Some(expiration) = &rule.expiration {
        builder = builder.expiration(
            s3::LifecycleExpiration::builder()
                .set_expired_object_delete_marker(expiration.expired_object_delete_marker)
                .set_days(expiration.days)
                .build(),
        );
    }
    if let Some(noncurrent) = &rule.noncurrent_version_expiration {
        builder = builder.noncurrent_version_expiration(
            s3::NoncurrentVersionExpiration::builder()
                .noncurrent_days(noncurrent.noncurrent_days)
                .build(),
        );
    }
    for transition in &rule.transitions {
        builder = builder.transitions(
            s3::Transition::builder()
                .days(transition.days)
                .storage_class(s3::TransitionStorageClass::from(
                    transition.storage_class.as_str(),
                ))
                .build(),
        );
    }
    for transition in &rule.noncurrent_version_transitions {
        builder = builder.noncurrent_version_transitions(
            s3::NoncurrentVersionTransition::builder()
                .noncurrent_days(transition.noncurrent_days)
                .storage_class(s3::TransitionStorageClass::from(
                    transition.storage_class.as_str(),
                ))
                .build(),
        );
    }
    if let Some(abort) = &rule.abort_incomplete_multipart_upload {
        builder = builder.abort_incomplete_multipart_upload(
            s3::AbortIncompleteMultipartUpload::builder()
                .days_after_initiation(abort.days_after_initiation)
                .build(),
        );
    }

    builder.build()
}

/// Delete markers are not replicated and replicas are owned by the destination account.
fn to_sdk_replication_rule(
    rule: &ReplicationRule,
) -> std::result::Result<s3::ReplicationRule, BuildError> {
    let destination = s3::Destination::builder()
        .bucket(&rule.destination_bucket_arn)
        .account(&rule.destination_account)
        .storage_class(s3::StorageClass::from(rule.storage_class.as_str()))
        .access_control_translation(
            s3::AccessControlTranslation::builder()
                .owner(s3::OwnerOverride::Destination)
                .build()?,
        )
        .build()?;

    s3::ReplicationRule::builder()
        .id(&rule.id)
        .priority(rule.priority)
        .filter(s3::ReplicationRuleFilter::builder().prefix("").build())
        .status(s3::ReplicationRuleStatus::Enabled)
        .destination(destination)
        .delete_marker_replication(
            s3::DeleteMarkerReplication::builder()
                .status(s3::DeleteMarkerReplicationStatus::Disabled)
                .build(),
        )
        .build()
}

impl StorageOperations for S3Client {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<String> {
        S3Client::create_bucket(self, bucket, region).await
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<()> {
        S3Client::enable_versioning(self, bucket).await
    }

    async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()> {
        S3Client::put_lifecycle_rules(self, bucket, rules).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        S3Client::put_bucket_policy(self, bucket, policy).await
    }

    async fn put_replication(&self, bucket: &str, rule: &ReplicationRule) -> Result<()> {
        S3Client::put_replication(self, bucket, rule).await
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<VersionPage> {
        S3Client::list_object_versions(self, bucket, marker).await
    }

    async fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str) -> Result<()> {
        S3Client::delete_object_version(self, bucket, key, version_id).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        S3Client::delete_bucket(self, bucket).await
    }
}
