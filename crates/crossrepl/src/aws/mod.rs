//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - S3: Bucket creation, configuration, replication and emptying
//! - IAM: Replication role and managed policy
//! - STS: Account ID lookup
//!
//! The `operations` traits are the seam the rest of the crate programs
//! against; `AwsConnector` resolves them to real clients per profile.

pub mod account;
pub mod context;
pub mod error;
pub mod iam;
pub mod operations;
pub mod s3;

// Core clients
pub use account::{AccountId, get_current_account_id};
pub use context::AwsContext;
pub use iam::IamClient;
pub use s3::S3Client;

// Error handling
pub use error::{AwsError, classify_aws_error};

pub use operations::{
    CloudConnector, IdentityOperations, ObjectVersionRef, ReplicationRule, StorageOperations,
    VersionMarker, VersionPage,
};

use crate::error::Result;

/// Connects to AWS using named profiles from the shared config files
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConnector;

impl CloudConnector for AwsConnector {
    type Storage = S3Client;
    type Identity = IamClient;

    async fn storage(&self, profile: &str, region: &str) -> Result<S3Client> {
        let ctx = AwsContext::with_profile(region, Some(profile)).await;
        Ok(S3Client::from_context(&ctx))
    }

    async fn identity(&self, profile: &str, region: &str) -> Result<IamClient> {
        let ctx = AwsContext::with_profile(region, Some(profile)).await;
        Ok(IamClient::from_context(&ctx))
    }

    async fn caller_account(&self, profile: &str, region: &str) -> Result<String> {
        let ctx = AwsContext::with_profile(region, Some(profile)).await;
        let account = get_current_account_id(ctx.sdk_config()).await?;
        Ok(account.to_string())
    }
}
