//! Bucket records: the desired and actual configuration of one bucket
//!
//! A record is built once per run, before any remote call, and written to the
//! journal in that state. Names are generated at construction and never change;
//! ARNs start empty and are filled in once as the matching resources are created.

use crate::error::{Error, Result};
use crate::lifecycle::LifecycleRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const ROLE_NAME_PREFIX: &str = "S3CrossAccountReplicationIamRole";
const POLICY_NAME_PREFIX: &str = "S3CrossAccountReplicationIamPolicy";

/// Short random suffix for IAM names (8 hex characters)
pub fn short_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}

/// Globally unique bucket name: `<base>-<32 hex>`
pub fn generate_bucket_name(base: &str) -> String {
    format!("{base}-{}", Uuid::new_v4().simple())
}

/// Inputs for a new record
#[derive(Debug, Clone)]
pub struct BucketSpec {
    /// Fully generated bucket name
    pub name: String,
    pub region: String,
    pub profile: String,
    pub lifecycle_rules: Vec<LifecycleRule>,
    /// IAM policy document for the replication role (empty on the destination)
    pub iam_policy: Value,
    /// Bucket policy document (empty means none)
    pub bucket_policy: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketIdentity {
    name: String,
    #[serde(default)]
    arn: String,
}

impl BucketIdentity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }
}

/// IAM role and policy linked to a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamLinkage {
    role_name: String,
    #[serde(default)]
    role_arn: String,
    #[serde(default)]
    policy_arn: String,
    #[serde(default)]
    policy: Value,
    policy_name: String,
}

impl IamLinkage {
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    pub fn policy_arn(&self) -> &str {
        &self.policy_arn
    }

    pub fn policy(&self) -> &Value {
        &self.policy
    }

    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }
}

/// One bucket's full configuration, as journaled and as provisioned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRecord {
    bucket: BucketIdentity,
    region: String,
    profile: String,
    #[serde(default)]
    lifecycle_rules: Vec<LifecycleRule>,
    iam: IamLinkage,
    #[serde(default)]
    bucket_policy: Value,
}

impl BucketRecord {
    /// Build a record, generating the role and policy names.
    pub fn new(spec: BucketSpec) -> Self {
        Self {
            bucket: BucketIdentity {
                name: spec.name,
                arn: String::new(),
            },
            region: spec.region,
            profile: spec.profile,
            lifecycle_rules: spec.lifecycle_rules,
            iam: IamLinkage {
                role_name: format!("{ROLE_NAME_PREFIX}-{}", short_suffix()),
                role_arn: String::new(),
                policy_arn: String::new(),
                policy: spec.iam_policy,
                policy_name: format!("{POLICY_NAME_PREFIX}-{}", short_suffix()),
            },
            bucket_policy: spec.bucket_policy,
        }
    }

    pub fn name(&self) -> &str {
        self.bucket.name()
    }

    pub fn arn(&self) -> &str {
        self.bucket.arn()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn lifecycle_rules(&self) -> &[LifecycleRule] {
        &self.lifecycle_rules
    }

    pub fn iam(&self) -> &IamLinkage {
        &self.iam
    }

    pub fn bucket_policy(&self) -> &Value {
        &self.bucket_policy
    }

    pub fn set_arn(&mut self, arn: &str) -> Result<()> {
        assign_once(&mut self.bucket.arn, arn, &self.bucket.name, "bucket arn")
    }

    pub fn set_role_arn(&mut self, arn: &str) -> Result<()> {
        assign_once(&mut self.iam.role_arn, arn, &self.bucket.name, "role arn")
    }

    pub fn set_policy_arn(&mut self, arn: &str) -> Result<()> {
        assign_once(&mut self.iam.policy_arn, arn, &self.bucket.name, "policy arn")
    }
}

/// Empty slots take the value; a set slot only accepts the same value again.
fn assign_once(slot: &mut String, value: &str, name: &str, field: &'static str) -> Result<()> {
    if slot.is_empty() {
        *slot = value.to_string();
        Ok(())
    } else if slot == value {
        Ok(())
    } else {
        Err(Error::AlreadyAssigned {
            name: name.to_string(),
            field,
            current: slot.clone(),
        })
    }
}
