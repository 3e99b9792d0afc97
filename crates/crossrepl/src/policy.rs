//! IAM and bucket policy documents for cross-account replication

use crate::aws::AccountId;
use serde_json::{Value, json};

/// The trust policy allowing S3 to assume the replication role
pub const REPLICATION_TRUST_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Effect": "Allow",
            "Principal": {
                "Service": "s3.amazonaws.com"
            },
            "Action": "sts:AssumeRole"
        }
    ]
}"#;

/// ARN of an S3 bucket
pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

/// Policy attached to the replication role in the source account.
///
/// Grants read access to the source bucket and replication writes into
/// the destination bucket's objects.
pub fn source_replication_policy(source_bucket: &str, destination_bucket: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Action": ["s3:Get*", "s3:ListBucket"],
                "Effect": "Allow",
                "Resource": [
                    bucket_arn(source_bucket),
                    format!("{}/*", bucket_arn(source_bucket))
                ]
            },
            {
                "Action": [
                    "s3:ReplicateObject",
                    "s3:ReplicateDelete",
                    "s3:ReplicateTags",
                    "s3:GetObjectVersionTagging",
                    "s3:ObjectOwnerOverrideToBucketOwner"
                ],
                "Effect": "Allow",
                "Resource": format!("{}/*", bucket_arn(destination_bucket))
            }
        ]
    })
}

/// Bucket policy on the destination letting the source account replicate into it
pub fn destination_bucket_policy(source_account: &AccountId, destination_bucket: &str) -> Value {
    json!({
        "Version": "2008-10-17",
        "Id": "S3-Console-Replication-Policy",
        "Statement": [
            {
                "Sid": "S3ReplicationPolicy",
                "Effect": "Allow",
                "Principal": {
                    "AWS": format!("arn:aws:iam::{source_account}:root")
                },
                "Action": [
                    "s3:GetBucketVersioning",
                    "s3:PutBucketVersioning",
                    "s3:ReplicateObject",
                    "s3:ReplicateDelete",
                    "s3:ObjectOwnerOverrideToBucketOwner"
                ],
                "Resource": [
                    bucket_arn(destination_bucket),
                    format!("{}/*", bucket_arn(destination_bucket))
                ]
            }
        ]
    })
}

/// A policy document with no content
pub fn empty_document() -> Value {
    json!({})
}

/// Null and `{}` both mean "no explicit policy"
pub fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
