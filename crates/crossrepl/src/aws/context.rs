//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once per
//! profile and region and creating service clients from it.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Loaded SDK configuration for one credential profile in one region.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::with_profile("ca-central-1", Some("source")).await;
///
/// let s3 = S3Client::from_context(&aws);
/// let iam = IamClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    profile: Option<String>,
}

impl AwsContext {
    /// Load AWS configuration for the region using the default credential chain.
    pub async fn new(region: &str) -> Self {
        Self::with_profile(region, None).await
    }

    /// Load AWS configuration for the region, selecting a named profile from
    /// the shared config/credentials files when one is given.
    ///
    /// SDK retries are disabled: every request is sent exactly once.
    pub async fn with_profile(region: &str, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
            profile: profile.map(str::to_string),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the profile name, if one was selected.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Create an S3 client from this context.
    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(self.sdk_config())
    }

    /// Create an IAM client from this context.
    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
