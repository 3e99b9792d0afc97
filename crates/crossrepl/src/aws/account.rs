//! AWS account identity

use super::error::{missing_field, sdk_error};
use crate::error::{Error, Result};
use std::str::FromStr;
use tracing::debug;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AccountId(s.to_string()))
        } else {
            Err(Error::InvalidConfig(format!(
                "account id must be 12 digits, got '{s}'"
            )))
        }
    }
}

/// Fetch the account ID behind the loaded credentials via STS GetCallerIdentity
///
/// This operation requires no special permissions - it always succeeds if
/// credentials are valid.
pub async fn get_current_account_id(config: &aws_config::SdkConfig) -> Result<AccountId> {
    let sts = aws_sdk_sts::Client::new(config);
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| sdk_error("GetCallerIdentity", e))?;

    let account = identity
        .account()
        .ok_or_else(|| missing_field("GetCallerIdentity", "Account"))?;

    debug!(account_id = %account, "Resolved caller account");

    Ok(AccountId(account.to_string()))
}
