//! Provision-or-cleanup decision for one invocation
//!
//! | journal | `--cleanup` | action                                  |
//! |---------|-------------|-----------------------------------------|
//! | absent  | no          | provision                               |
//! | absent  | yes         | nothing to clean up                     |
//! | present | no          | refuse with `JournalExists`             |
//! | present | yes         | teardown, then discard the journal      |
//!
//! A single invocation never provisions and tears down.

use crate::aws::CloudConnector;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::orchestrator::{Orchestrator, ReplicationPair};
use crate::teardown::{Teardown, TeardownReport};
use tracing::info;

/// What the operator asked for
#[derive(Debug, Clone)]
pub enum Mode {
    Provision(RunConfig),
    Cleanup,
}

/// What an invocation did
#[derive(Debug)]
pub enum Outcome {
    Provisioned(ReplicationPair),
    CleanedUp(TeardownReport),
    NothingToClean,
}

/// Run one invocation against `journal`.
pub async fn run<C: CloudConnector, J: Journal>(
    connector: &C,
    journal: &J,
    mode: Mode,
) -> Result<Outcome> {
    match (journal.exists(), mode) {
        (false, Mode::Provision(config)) => {
            let pair = Orchestrator::new(connector, journal, &config).run().await?;
            Ok(Outcome::Provisioned(pair))
        }
        (false, Mode::Cleanup) => {
            info!(journal = %journal.path().display(), "No journal found, nothing to clean up");
            Ok(Outcome::NothingToClean)
        }
        (true, Mode::Provision(_)) => Err(Error::JournalExists(journal.path().to_path_buf())),
        (true, Mode::Cleanup) => {
            let report = Teardown::new(connector).run(journal).await?;
            if !report.is_complete() {
                return Err(Error::CleanupIncomplete {
                    failed: report.failed.len(),
                    path: journal.path().to_path_buf(),
                });
            }
            journal.discard()?;
            info!(journal = %journal.path().display(), "Cleanup complete, journal removed");
            Ok(Outcome::CleanedUp(report))
        }
    }
}
