//! Bucket lifecycle rules
//!
//! Rules are kept in the provider's JSON shape so they survive the journal
//! round-trip unchanged. Provisioning passes them through as-is; only the S3
//! client looks inside them.

use serde::{Deserialize, Serialize};

/// Storage class used for archival transitions
pub const ARCHIVE_STORAGE_CLASS: &str = "GLACIER";

/// Days before an incomplete multipart upload is aborted
const ABORT_MULTIPART_AFTER_DAYS: i32 = 7;

/// One lifecycle rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRule {
    #[serde(rename = "ID")]
    pub id: String,
    pub filter: RuleFilter,
    pub status: RuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Expiration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration: Option<NoncurrentVersionExpiration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleFilter {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Expiration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_object_delete_marker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoncurrentVersionExpiration {
    pub noncurrent_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transition {
    pub days: i32,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoncurrentVersionTransition {
    pub noncurrent_days: i32,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AbortIncompleteMultipartUpload {
    pub days_after_initiation: i32,
}

/// Source bucket rules: drop noncurrent versions after a day and clean up
/// expired delete markers.
pub fn source_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "version-expiration-policy".to_string(),
        filter: RuleFilter::default(),
        status: RuleStatus::Enabled,
        expiration: Some(Expiration {
            expired_object_delete_marker: Some(true),
            days: None,
        }),
        noncurrent_version_expiration: Some(NoncurrentVersionExpiration { noncurrent_days: 1 }),
        transitions: Vec::new(),
        noncurrent_version_transitions: Vec::new(),
        abort_incomplete_multipart_upload: Some(AbortIncompleteMultipartUpload {
            days_after_initiation: ABORT_MULTIPART_AFTER_DAYS,
        }),
    }]
}

/// Destination bucket rules: archive current and noncurrent versions after 31 days.
pub fn destination_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "archival-rule".to_string(),
        filter: RuleFilter::default(),
        status: RuleStatus::Enabled,
        expiration: None,
        noncurrent_version_expiration: None,
        transitions: vec![Transition {
            days: 31,
            storage_class: ARCHIVE_STORAGE_CLASS.to_string(),
        }],
        noncurrent_version_transitions: vec![NoncurrentVersionTransition {
            noncurrent_days: 31,
            storage_class: ARCHIVE_STORAGE_CLASS.to_string(),
        }],
        abort_incomplete_multipart_upload: Some(AbortIncompleteMultipartUpload {
            days_after_initiation: ABORT_MULTIPART_AFTER_DAYS,
        }),
    }]
}
