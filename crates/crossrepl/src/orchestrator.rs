//! Cross-account replication setup
//!
//! Builds the source and destination records, journals both before any
//! resource is created, then drives the two provisioners in the one order
//! that works: both buckets first, then the destination bucket policy,
//! then the source replication role, then replication itself (which names
//! the destination ARN and the role ARN).

use crate::aws::{AccountId, CloudConnector};
use crate::config::{RunConfig, SideConfig};
use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::lifecycle;
use crate::policy;
use crate::provisioner::Provisioner;
use crate::record::{BucketRecord, BucketSpec, generate_bucket_name};
use tracing::{info, instrument};

/// The two records of a replication pair
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationPair {
    pub source: BucketRecord,
    pub destination: BucketRecord,
}

/// Build both records with freshly generated names.
pub fn plan(config: &RunConfig) -> ReplicationPair {
    let source_name = generate_bucket_name(&config.source.base_name);
    let destination_name = generate_bucket_name(&config.destination.base_name);

    let source = BucketRecord::new(BucketSpec {
        name: source_name.clone(),
        region: config.source.region.clone(),
        profile: config.source.profile.clone(),
        lifecycle_rules: lifecycle::source_rules(),
        iam_policy: policy::source_replication_policy(&source_name, &destination_name),
        bucket_policy: policy::empty_document(),
    });
    let destination = BucketRecord::new(BucketSpec {
        name: destination_name.clone(),
        region: config.destination.region.clone(),
        profile: config.destination.profile.clone(),
        lifecycle_rules: lifecycle::destination_rules(),
        iam_policy: policy::empty_document(),
        bucket_policy: policy::destination_bucket_policy(
            &config.source.account_id,
            &destination_name,
        ),
    });

    ReplicationPair {
        source,
        destination,
    }
}

/// Provisions a replication pair
pub struct Orchestrator<'a, C, J> {
    connector: &'a C,
    journal: &'a J,
    config: &'a RunConfig,
}

impl<'a, C: CloudConnector, J: Journal> Orchestrator<'a, C, J> {
    pub fn new(connector: &'a C, journal: &'a J, config: &'a RunConfig) -> Self {
        Self {
            connector,
            journal,
            config,
        }
    }

    /// Provision both buckets and wire up replication.
    ///
    /// Any failing step aborts the run; whatever was created up to that
    /// point is listed in the journal for cleanup.
    #[instrument(skip_all, fields(
        source = %self.config.source.base_name,
        destination = %self.config.destination.base_name
    ))]
    pub async fn run(&self) -> Result<ReplicationPair> {
        self.config.validate()?;
        self.verify_account(&self.config.source).await?;
        self.verify_account(&self.config.destination).await?;

        let pair = plan(self.config);
        self.journal.append(&pair.source)?;
        self.journal.append(&pair.destination)?;
        info!(
            source_bucket = %pair.source.name(),
            destination_bucket = %pair.destination.name(),
            "Journaled bucket records"
        );

        let source_side = &self.config.source;
        let destination_side = &self.config.destination;
        let source_storage = self
            .connector
            .storage(&source_side.profile, &source_side.region)
            .await?;
        let destination_storage = self
            .connector
            .storage(&destination_side.profile, &destination_side.region)
            .await?;

        let mut source = Provisioner::new(pair.source, &source_storage);
        let mut destination = Provisioner::new(pair.destination, &destination_storage);

        source.create_bucket().await?;
        source.enable_versioning().await?;
        source.enable_lifecycle_policy().await?;

        destination.create_bucket().await?;
        destination.enable_versioning().await?;
        destination.enable_lifecycle_policy().await?;

        destination.apply_security().await?;

        let identity = self
            .connector
            .identity(&source_side.profile, &source_side.region)
            .await?;
        source.create_iam_role(&identity).await?;

        source
            .enable_replication(
                destination.record().arn(),
                destination_side.account_id.as_str(),
            )
            .await?;

        info!(
            source_bucket = %source.record().name(),
            destination_bucket = %destination.record().name(),
            "Replication configured"
        );

        Ok(ReplicationPair {
            source: source.into_record(),
            destination: destination.into_record(),
        })
    }

    /// The side's profile must resolve to the configured account.
    async fn verify_account(&self, side: &SideConfig) -> Result<()> {
        let actual = self
            .connector
            .caller_account(&side.profile, &side.region)
            .await?;
        let actual: AccountId = actual.parse()?;
        if actual != side.account_id {
            return Err(Error::AccountMismatch {
                profile: side.profile.clone(),
                expected: side.account_id.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}
