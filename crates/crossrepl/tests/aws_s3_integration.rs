//! S3 integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_s3_integration -- --ignored
//! ```

use crossrepl::aws::{AwsContext, S3Client};
use crossrepl::lifecycle;
use crossrepl::record::generate_bucket_name;
use crossrepl_test_utils::{get_test_region, test_base_name};

/// Create, configure, list and delete a bucket
#[tokio::test]
#[ignore]
async fn test_bucket_configuration_lifecycle() {
    let region = get_test_region();
    let aws = AwsContext::new(&region).await;
    let client = S3Client::from_context(&aws);
    let bucket = generate_bucket_name(&test_base_name("s3"));

    let arn = client
        .create_bucket(&bucket, &region)
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");
    assert_eq!(arn, format!("arn:aws:s3:::{bucket}"));

    client
        .enable_versioning(&bucket)
        .await
        .expect("Should enable versioning");
    client
        .put_lifecycle_rules(&bucket, &lifecycle::destination_rules())
        .await
        .expect("Should apply lifecycle rules");

    let page = client
        .list_object_versions(&bucket, None)
        .await
        .expect("Should list versions");
    assert_eq!(page.entries().count(), 0);
    assert!(page.next.is_none());

    client
        .delete_bucket(&bucket)
        .await
        .expect("Should delete bucket");
}

/// Deleting a bucket that does not exist is classified as a missing bucket
#[tokio::test]
#[ignore]
async fn test_delete_missing_bucket() {
    let region = get_test_region();
    let aws = AwsContext::new(&region).await;
    let client = S3Client::from_context(&aws);
    let bucket = generate_bucket_name(&test_base_name("gone"));

    let err = client
        .delete_bucket(&bucket)
        .await
        .expect_err("Bucket should not exist");
    assert!(err.is_missing_bucket(), "unexpected error: {err}");
}
