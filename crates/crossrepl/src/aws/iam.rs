//! IAM role and managed policy creation for the replication role

use super::context::AwsContext;
use super::error::{missing_field, sdk_error};
use super::operations::IdentityOperations;
use crate::error::Result;
use aws_sdk_iam::Client;
use tracing::{debug, info};

/// Path under which the replication role and policy are created
const SERVICE_ROLE_PATH: &str = "/service-role/";

const ROLE_DESCRIPTION: &str = "S3 Cross-Account Replication IAM Role";
const POLICY_DESCRIPTION: &str = "S3 Cross-Account Replication IAM Policy";

/// IAM client for managing the replication role and its policy
pub struct IamClient {
    client: Client,
}

impl IamClient {
    /// Create an IAM client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }

    /// Create a customer-managed policy, returning its ARN
    pub async fn create_policy(&self, name: &str, document: &str) -> Result<String> {
        info!(policy_name = %name, "Creating IAM policy");

        let response = self
            .client
            .create_policy()
            .policy_name(name)
            .path(SERVICE_ROLE_PATH)
            .policy_document(document)
            .description(POLICY_DESCRIPTION)
            .send()
            .await
            .map_err(|e| sdk_error("CreatePolicy", e))?;

        let arn = response
            .policy()
            .and_then(|p| p.arn())
            .ok_or_else(|| missing_field("CreatePolicy", "Policy.Arn"))?;

        debug!(policy_name = %name, policy_arn = %arn, "IAM policy created");
        Ok(arn.to_string())
    }

    /// Create a role S3 can assume, returning its ARN
    pub async fn create_role(&self, name: &str, trust_document: &str) -> Result<String> {
        info!(role_name = %name, "Creating IAM role");

        let response = self
            .client
            .create_role()
            .role_name(name)
            .path(SERVICE_ROLE_PATH)
            .assume_role_policy_document(trust_document)
            .description(ROLE_DESCRIPTION)
            .send()
            .await
            .map_err(|e| sdk_error("CreateRole", e))?;

        let arn = response
            .role()
            .map(|r| r.arn())
            .ok_or_else(|| missing_field("CreateRole", "Role.Arn"))?;

        debug!(role_name = %name, role_arn = %arn, "IAM role created");
        Ok(arn.to_string())
    }

    pub async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        info!(role_name = %role_name, policy_arn = %policy_arn, "Attaching policy to role");

        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| sdk_error("AttachRolePolicy", e))?;

        Ok(())
    }
}

impl IdentityOperations for IamClient {
    async fn create_policy(&self, name: &str, document: &str) -> Result<String> {
        IamClient::create_policy(self, name, document).await
    }

    async fn create_role(&self, name: &str, trust_document: &str) -> Result<String> {
        IamClient::create_role(self, name, trust_document).await
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::attach_role_policy(self, role_name, policy_arn).await
    }
}
