//! Configuration types for a replication setup run

use crate::aws::AccountId;
use crate::error::{Error, Result};

/// Default region for the source bucket
pub const DEFAULT_SOURCE_REGION: &str = "ca-central-1";

/// Default region for the destination bucket
pub const DEFAULT_DESTINATION_REGION: &str = "us-east-2";

/// Longest accepted base name; the generated suffix adds 33 characters
/// and S3 bucket names top out at 63.
pub const MAX_BASE_NAME_LEN: usize = 30;

const MIN_BASE_NAME_LEN: usize = 3;

/// One side (source or destination) of the replication pair
#[derive(Debug, Clone)]
pub struct SideConfig {
    /// Bucket base name; a random suffix is appended when the record is built
    pub base_name: String,
    /// Credential profile from the shared AWS config files
    pub profile: String,
    pub region: String,
    /// Account the profile's credentials must belong to
    pub account_id: AccountId,
}

impl SideConfig {
    fn validate(&self, side: &str) -> Result<()> {
        validate_base_name(&self.base_name)
            .map_err(|reason| Error::InvalidConfig(format!("{side} bucket name: {reason}")))?;
        if self.profile.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("{side} profile is empty")));
        }
        if self.region.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("{side} region is empty")));
        }
        Ok(())
    }
}

/// Configuration for a provisioning run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SideConfig,
    pub destination: SideConfig,
}

impl RunConfig {
    /// Check everything that can be checked without calling the provider.
    pub fn validate(&self) -> Result<()> {
        self.source.validate("source")?;
        self.destination.validate("destination")?;
        Ok(())
    }
}

fn validate_base_name(name: &str) -> std::result::Result<(), String> {
    let len = name.len();
    if !(MIN_BASE_NAME_LEN..=MAX_BASE_NAME_LEN).contains(&len) {
        return Err(format!(
            "'{name}' must be {MIN_BASE_NAME_LEN} to {MAX_BASE_NAME_LEN} characters"
        ));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(format!("'{name}' contains invalid character '{c}'"));
    }
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !name.starts_with(alnum) || !name.ends_with(alnum) {
        return Err(format!("'{name}' must start and end with a letter or digit"));
    }
    Ok(())
}
