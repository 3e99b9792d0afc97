//! In-memory cloud for exercising provisioning and teardown
//!
//! Buckets, roles and policies live in a shared map. Every remote call is
//! appended to a call log before it is evaluated, so tests can assert on
//! ordering and on the absence of calls.

use crate::aws::error::classify_aws_error;
use crate::aws::{
    CloudConnector, IdentityOperations, ObjectVersionRef, ReplicationRule, StorageOperations,
    VersionMarker, VersionPage,
};
use crate::error::Result;
use crate::lifecycle::LifecycleRule;
use crate::policy::bucket_arn;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// Entries returned per `list_object_versions` page
pub const PAGE_SIZE: usize = 100;

/// Account returned for profiles without an explicit mapping
pub const DEFAULT_ACCOUNT: &str = "111122223333";

/// One remote call, as issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateBucket { bucket: String, region: String },
    PutBucketVersioning { bucket: String },
    PutLifecycle { bucket: String },
    PutBucketPolicy { bucket: String, policy: String },
    PutReplication { bucket: String, destination: String },
    ListObjectVersions { bucket: String },
    DeleteObject { bucket: String, key: String, version_id: String },
    DeleteBucket { bucket: String },
    CreatePolicy { name: String },
    CreateRole { name: String },
    AttachRolePolicy { role_name: String, policy_arn: String },
    GetCallerIdentity { profile: String },
}

impl Call {
    fn operation(&self) -> &'static str {
        match self {
            Call::CreateBucket { .. } => "CreateBucket",
            Call::PutBucketVersioning { .. } => "PutBucketVersioning",
            Call::PutLifecycle { .. } => "PutBucketLifecycleConfiguration",
            Call::PutBucketPolicy { .. } => "PutBucketPolicy",
            Call::PutReplication { .. } => "PutBucketReplication",
            Call::ListObjectVersions { .. } => "ListObjectVersions",
            Call::DeleteObject { .. } => "DeleteObject",
            Call::DeleteBucket { .. } => "DeleteBucket",
            Call::CreatePolicy { .. } => "CreatePolicy",
            Call::CreateRole { .. } => "CreateRole",
            Call::AttachRolePolicy { .. } => "AttachRolePolicy",
            Call::GetCallerIdentity { .. } => "GetCallerIdentity",
        }
    }

    fn bucket(&self) -> Option<&str> {
        match self {
            Call::CreateBucket { bucket, .. }
            | Call::PutBucketVersioning { bucket }
            | Call::PutLifecycle { bucket }
            | Call::PutBucketPolicy { bucket, .. }
            | Call::PutReplication { bucket, .. }
            | Call::ListObjectVersions { bucket }
            | Call::DeleteObject { bucket, .. }
            | Call::DeleteBucket { bucket } => Some(bucket.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBucket {
    pub region: String,
    pub versioning: bool,
    pub lifecycle_rules: Vec<LifecycleRule>,
    pub policy: Option<String>,
    pub replication: Option<ReplicationRule>,
    /// (key, version id) -> is delete marker
    pub entries: BTreeMap<(String, String), bool>,
}

struct Failure {
    operation: &'static str,
    bucket: Option<String>,
    code: String,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, FakeBucket>,
    policies: BTreeMap<String, String>,
    roles: BTreeMap<String, String>,
    attachments: Vec<(String, String)>,
    accounts: HashMap<String, String>,
    /// Profiles storage clients were resolved for, in order
    connections: Vec<String>,
    failures: Vec<Failure>,
    calls: Vec<Call>,
}

/// Shared in-memory provider state
#[derive(Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<State>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn storage_for(&self, profile: &str) -> FakeStorage {
        self.lock().connections.push(profile.to_string());
        FakeStorage {
            cloud: self.clone(),
        }
    }

    pub fn identity_for(&self, profile: &str) -> FakeIdentity {
        FakeIdentity {
            cloud: self.clone(),
            profile: profile.to_string(),
        }
    }

    /// Map a profile to the account its credentials resolve to
    pub fn set_account(&self, profile: &str, account: &str) {
        self.lock()
            .accounts
            .insert(profile.to_string(), account.to_string());
    }

    /// Make every call to `operation` fail with `code`
    pub fn fail(&self, operation: &'static str, code: &str) {
        self.lock().failures.push(Failure {
            operation,
            bucket: None,
            code: code.to_string(),
        });
    }

    /// Make calls to `operation` on `bucket` fail with `code`
    pub fn fail_on_bucket(&self, operation: &'static str, bucket: &str, code: &str) {
        self.lock().failures.push(Failure {
            operation,
            bucket: Some(bucket.to_string()),
            code: code.to_string(),
        });
    }

    /// Create a bucket directly, without logging a call
    pub fn add_bucket(&self, name: &str, region: &str) {
        self.lock().buckets.insert(
            name.to_string(),
            FakeBucket {
                region: region.to_string(),
                versioning: true,
                ..Default::default()
            },
        );
    }

    /// Add `count` object versions to an existing bucket
    pub fn seed_versions(&self, bucket: &str, count: usize) {
        self.seed(bucket, count, "object", false);
    }

    /// Add `count` delete markers to an existing bucket
    pub fn seed_delete_markers(&self, bucket: &str, count: usize) {
        self.seed(bucket, count, "deleted", true);
    }

    fn seed(&self, bucket: &str, count: usize, prefix: &str, delete_marker: bool) {
        let mut state = self.lock();
        let bucket = state.buckets.get_mut(bucket).unwrap();
        for i in 0..count {
            bucket
                .entries
                .insert((format!("{prefix}-{i:04}"), format!("v{i}")), delete_marker);
        }
    }

    pub fn connections(&self) -> Vec<String> {
        self.lock().connections.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn bucket_exists(&self, name: &str) -> bool {
        self.lock().buckets.contains_key(name)
    }

    pub fn bucket(&self, name: &str) -> Option<FakeBucket> {
        self.lock().buckets.get(name).cloned()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.lock().buckets.keys().cloned().collect()
    }


    pub fn replication_rule(&self, bucket: &str) -> Option<ReplicationRule> {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.replication.clone())
    }

    pub fn role_names(&self) -> Vec<String> {
        self.lock().roles.keys().cloned().collect()
    }

    pub fn policy_names(&self) -> Vec<String> {
        self.lock().policies.keys().cloned().collect()
    }

    /// (role name, policy arn) pairs
    pub fn attachments(&self) -> Vec<(String, String)> {
        self.lock().attachments.clone()
    }

    fn account(&self, profile: &str) -> String {
        self.lock()
            .accounts
            .get(profile)
            .cloned()
            .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string())
    }

    /// Log the call, then apply any injected failure
    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.lock();
        let failure = state.failures.iter().find(|f| {
            f.operation == call.operation()
                && f.bucket
                    .as_deref()
                    .is_none_or(|b| Some(b) == call.bucket())
        });
        let result: Result<()> = match failure {
            Some(f) => Err(classify_aws_error(
                call.operation(),
                Some(f.code.as_str()),
                Some("injected failure"),
            )
            .into()),
            None => Ok(()),
        };
        state.calls.push(call);
        result
    }

    fn with_bucket<T>(
        &self,
        operation: &'static str,
        bucket: &str,
        f: impl FnOnce(&mut FakeBucket) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.lock();
        match state.buckets.get_mut(bucket) {
            Some(b) => f(b),
            None => Err(no_such_bucket(operation)),
        }
    }
}

fn no_such_bucket(operation: &'static str) -> crate::error::Error {
    classify_aws_error(
        operation,
        Some("NoSuchBucket"),
        Some("The specified bucket does not exist"),
    )
    .into()
}

/// Storage client for the shared fake state
pub struct FakeStorage {
    cloud: FakeCloud,
}

impl StorageOperations for FakeStorage {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<String> {
        self.cloud.record(Call::CreateBucket {
            bucket: bucket.to_string(),
            region: region.to_string(),
        })?;
        let mut state = self.cloud.lock();
        if state.buckets.contains_key(bucket) {
            return Err(classify_aws_error(
                "CreateBucket",
                Some("BucketAlreadyOwnedByYou"),
                None,
            )
            .into());
        }
        state.buckets.insert(
            bucket.to_string(),
            FakeBucket {
                region: region.to_string(),
                ..Default::default()
            },
        );
        Ok(bucket_arn(bucket))
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<()> {
        self.cloud.record(Call::PutBucketVersioning {
            bucket: bucket.to_string(),
        })?;
        self.cloud
            .with_bucket("PutBucketVersioning", bucket, |b| {
                b.versioning = true;
                Ok(())
            })
    }

    async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()> {
        self.cloud.record(Call::PutLifecycle {
            bucket: bucket.to_string(),
        })?;
        self.cloud
            .with_bucket("PutBucketLifecycleConfiguration", bucket, |b| {
                b.lifecycle_rules = rules.to_vec();
                Ok(())
            })
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.cloud.record(Call::PutBucketPolicy {
            bucket: bucket.to_string(),
            policy: policy.to_string(),
        })?;
        self.cloud.with_bucket("PutBucketPolicy", bucket, |b| {
            b.policy = Some(policy.to_string());
            Ok(())
        })
    }

    async fn put_replication(&self, bucket: &str, rule: &ReplicationRule) -> Result<()> {
        self.cloud.record(Call::PutReplication {
            bucket: bucket.to_string(),
            destination: rule.destination_bucket_arn.clone(),
        })?;
        self.cloud.with_bucket("PutBucketReplication", bucket, |b| {
            b.replication = Some(rule.clone());
            Ok(())
        })
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<VersionPage> {
        self.cloud.record(Call::ListObjectVersions {
            bucket: bucket.to_string(),
        })?;
        self.cloud.with_bucket("ListObjectVersions", bucket, |b| {
            let after = marker.map(|m| (m.key_marker, m.version_id_marker.unwrap_or_default()));
            let mut remaining = b
                .entries
                .iter()
                .filter(|(k, _)| after.as_ref().is_none_or(|a| *k > a));

            let mut page = VersionPage::default();
            let mut last = None;
            for ((key, version_id), delete_marker) in remaining.by_ref().take(PAGE_SIZE) {
                let entry = ObjectVersionRef {
                    key: key.clone(),
                    version_id: version_id.clone(),
                };
                if *delete_marker {
                    page.delete_markers.push(entry);
                } else {
                    page.versions.push(entry);
                }
                last = Some((key.clone(), version_id.clone()));
            }
            if remaining.next().is_some() {
                page.next = last.map(|(key_marker, version_id)| VersionMarker {
                    key_marker,
                    version_id_marker: Some(version_id),
                });
            }
            Ok(page)
        })
    }

    async fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str) -> Result<()> {
        self.cloud.record(Call::DeleteObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            version_id: version_id.to_string(),
        })?;
        self.cloud.with_bucket("DeleteObject", bucket, |b| {
            b.entries.remove(&(key.to_string(), version_id.to_string()));
            Ok(())
        })
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.cloud.record(Call::DeleteBucket {
            bucket: bucket.to_string(),
        })?;
        let mut state = self.cloud.lock();
        match state.buckets.get(bucket) {
            None => Err(no_such_bucket("DeleteBucket")),
            Some(b) if !b.entries.is_empty() => Err(classify_aws_error(
                "DeleteBucket",
                Some("BucketNotEmpty"),
                Some("The bucket you tried to delete is not empty"),
            )
            .into()),
            Some(_) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        }
    }
}

/// Identity client bound to one profile
pub struct FakeIdentity {
    cloud: FakeCloud,
    profile: String,
}

impl IdentityOperations for FakeIdentity {
    async fn create_policy(&self, name: &str, _document: &str) -> Result<String> {
        self.cloud.record(Call::CreatePolicy {
            name: name.to_string(),
        })?;
        let arn = format!(
            "arn:aws:iam::{}:policy/service-role/{name}",
            self.cloud.account(&self.profile)
        );
        self.cloud
            .lock()
            .policies
            .insert(name.to_string(), arn.clone());
        Ok(arn)
    }

    async fn create_role(&self, name: &str, _trust_document: &str) -> Result<String> {
        self.cloud.record(Call::CreateRole {
            name: name.to_string(),
        })?;
        let arn = format!(
            "arn:aws:iam::{}:role/service-role/{name}",
            self.cloud.account(&self.profile)
        );
        self.cloud.lock().roles.insert(name.to_string(), arn.clone());
        Ok(arn)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.cloud.record(Call::AttachRolePolicy {
            role_name: role_name.to_string(),
            policy_arn: policy_arn.to_string(),
        })?;
        self.cloud
            .lock()
            .attachments
            .push((role_name.to_string(), policy_arn.to_string()));
        Ok(())
    }
}

impl CloudConnector for FakeCloud {
    type Storage = FakeStorage;
    type Identity = FakeIdentity;

    async fn storage(&self, profile: &str, _region: &str) -> Result<FakeStorage> {
        Ok(self.storage_for(profile))
    }

    async fn identity(&self, profile: &str, _region: &str) -> Result<FakeIdentity> {
        Ok(self.identity_for(profile))
    }

    async fn caller_account(&self, profile: &str, _region: &str) -> Result<String> {
        self.record(Call::GetCallerIdentity {
            profile: profile.to_string(),
        })?;
        Ok(self.account(profile))
    }
}
