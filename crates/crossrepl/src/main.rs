//! crossrepl: provision or tear down a cross-account S3 replication pair

use anyhow::{Result, anyhow};
use clap::Parser;
use crossrepl::aws::{AccountId, AwsConnector};
use crossrepl::config::{
    DEFAULT_DESTINATION_REGION, DEFAULT_SOURCE_REGION, RunConfig, SideConfig,
};
use crossrepl::journal::DEFAULT_JOURNAL_PATH;
use crossrepl::{FileJournal, Journal, Mode, Outcome, session};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// SDK crates whose request-level logging is held at `warn`
const QUIET_TARGETS: &[&str] = &[
    "aws_config",
    "aws_smithy_runtime",
    "aws_sdk_s3",
    "aws_sdk_iam",
    "aws_sdk_sts",
];

#[derive(Parser, Debug)]
#[command(name = "crossrepl")]
#[command(about = "Cross-account S3 replication setup and cleanup")]
#[command(version)]
struct Args {
    /// Source bucket base name
    #[arg(long, required_unless_present = "cleanup")]
    source: Option<String>,

    /// Destination bucket base name
    #[arg(long, required_unless_present = "cleanup")]
    dest: Option<String>,

    /// AWS profile for the source account
    #[arg(long, alias = "src_profile", required_unless_present = "cleanup")]
    src_profile: Option<String>,

    /// AWS profile for the destination account
    #[arg(long, alias = "dest_profile", required_unless_present = "cleanup")]
    dest_profile: Option<String>,

    /// Source bucket region
    #[arg(long, alias = "src_region", default_value = DEFAULT_SOURCE_REGION)]
    src_region: String,

    /// Destination bucket region
    #[arg(long, alias = "dest_region", default_value = DEFAULT_DESTINATION_REGION)]
    dest_region: String,

    /// Source account ID (12 digits)
    #[arg(long, alias = "src_accountid", required_unless_present = "cleanup")]
    src_accountid: Option<AccountId>,

    /// Destination account ID (12 digits)
    #[arg(long, alias = "dest_accountid", required_unless_present = "cleanup")]
    dest_accountid: Option<AccountId>,

    /// Delete every bucket listed in the journal, then the journal itself
    #[arg(long)]
    cleanup: bool,

    /// Journal file recording what was provisioned
    #[arg(long, env = "CROSSREPL_JOURNAL", default_value = DEFAULT_JOURNAL_PATH)]
    journal: PathBuf,
}

impl Args {
    fn mode(self) -> Result<Mode> {
        if self.cleanup {
            return Ok(Mode::Cleanup);
        }
        Ok(Mode::Provision(RunConfig {
            source: SideConfig {
                base_name: required(self.source, "--source")?,
                profile: required(self.src_profile, "--src-profile")?,
                region: self.src_region,
                account_id: required(self.src_accountid, "--src-accountid")?,
            },
            destination: SideConfig {
                base_name: required(self.dest, "--dest")?,
                profile: required(self.dest_profile, "--dest-profile")?,
                region: self.dest_region,
                account_id: required(self.dest_accountid, "--dest-accountid")?,
            },
        }))
    }
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("{flag} is required unless --cleanup is given"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

/// `RUST_LOG` if it parses, `info` otherwise, with the SDK crates quietened.
fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let mut filter = rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    for target in QUIET_TARGETS {
        filter = filter.add_directive(format!("{target}=warn").parse()?);
    }
    Ok(filter)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref())?)
        .init();

    let journal = FileJournal::new(&args.journal);
    let mode = args.mode()?;

    match session::run(&AwsConnector, &journal, mode).await? {
        Outcome::Provisioned(pair) => {
            info!(
                source_bucket = %pair.source.name(),
                source_arn = %pair.source.arn(),
                destination_bucket = %pair.destination.name(),
                destination_arn = %pair.destination.arn(),
                role_arn = %pair.source.iam().role_arn(),
                journal = %journal.path().display(),
                "Cross-account replication is set up"
            );
        }
        Outcome::CleanedUp(report) => {
            info!(
                deleted = report.deleted.len(),
                already_absent = report.already_absent.len(),
                versions_removed = report.versions_removed,
                "Cleanup finished"
            );
        }
        Outcome::NothingToClean => {}
    }

    Ok(())
}
