//! End-to-end provisioning and cleanup against two real AWS accounts
//!
//! Requires `CROSSREPL_TEST_SRC_PROFILE` and `CROSSREPL_TEST_DEST_PROFILE`:
//! ```
//! CROSSREPL_TEST_SRC_PROFILE=a CROSSREPL_TEST_DEST_PROFILE=b \
//!     cargo test --test aws_e2e_integration -- --ignored
//! ```

use crossrepl::aws::{AwsConnector, AwsContext, get_current_account_id};
use crossrepl::config::{DEFAULT_DESTINATION_REGION, DEFAULT_SOURCE_REGION, RunConfig, SideConfig};
use crossrepl::{FileJournal, Journal, Mode, Outcome, session};
use crossrepl_test_utils::{test_base_name, test_profile};

async fn side(base: &str, profile: String, region: &str) -> SideConfig {
    let aws = AwsContext::with_profile(region, Some(&profile)).await;
    let account_id = get_current_account_id(aws.sdk_config())
        .await
        .expect("Profile credentials should resolve");
    SideConfig {
        base_name: test_base_name(base),
        profile,
        region: region.to_string(),
        account_id,
    }
}

#[tokio::test]
#[ignore]
async fn test_provision_then_cleanup() {
    let (Some(src_profile), Some(dest_profile)) = (test_profile("src"), test_profile("dest"))
    else {
        eprintln!("CROSSREPL_TEST_SRC_PROFILE / CROSSREPL_TEST_DEST_PROFILE not set, skipping");
        return;
    };

    let config = RunConfig {
        source: side("src", src_profile, DEFAULT_SOURCE_REGION).await,
        destination: side("dst", dest_profile, DEFAULT_DESTINATION_REGION).await,
    };
    let dir = tempfile::tempdir().unwrap();
    let journal = FileJournal::new(dir.path().join("setup_state.json"));

    let outcome = session::run(&AwsConnector, &journal, Mode::Provision(config))
        .await
        .expect("Provisioning should succeed");
    assert!(matches!(outcome, Outcome::Provisioned(_)));
    assert!(journal.exists());

    let outcome = session::run(&AwsConnector, &journal, Mode::Cleanup)
        .await
        .expect("Cleanup should succeed");
    let Outcome::CleanedUp(report) = outcome else {
        panic!("expected cleanup");
    };
    assert_eq!(report.deleted.len(), 2);
    assert!(!journal.exists());
}
