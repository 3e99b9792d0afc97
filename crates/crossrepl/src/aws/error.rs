//! AWS error classification
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// A failed provider call, tagged with the operation and the provider's error code
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("{operation}: resource not found ({code}): {message}")]
    NotFound {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// Resource already exists
    #[error("{operation}: resource already exists ({code}): {message}")]
    AlreadyExists {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// Generic AWS SDK error with code and message
    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists { .. })
    }

    /// The bucket named in the call does not exist
    pub fn is_missing_bucket(&self) -> bool {
        self.code() == Some(NO_SUCH_BUCKET)
    }

    /// Provider error code, if the provider returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. } | AwsError::AlreadyExists { code, .. } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
        }
    }

    /// Name of the provider operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            AwsError::NotFound { operation, .. }
            | AwsError::AlreadyExists { operation, .. }
            | AwsError::Sdk { operation, .. } => operation,
        }
    }
}

const NO_SUCH_BUCKET: &str = "NoSuchBucket";

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[NO_SUCH_BUCKET, "NoSuchKey", "NoSuchEntity"];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "EntityAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "BucketAlreadyExists",
];

/// Classify an AWS error by its code.
pub fn classify_aws_error(
    operation: &'static str,
    code: Option<&str>,
    message: Option<&str>,
) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            operation,
            code: c.to_string(),
            message,
        },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists {
            operation,
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            operation,
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an SDK error returned by `operation`.
///
/// Service errors carry a code and message in their metadata. Transport and
/// construction failures have neither, so the full error context is used as
/// the message.
pub fn sdk_error<E>(operation: &'static str, err: E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let context = DisplayErrorContext(&err).to_string();
    classify_aws_error(operation, err.code(), Some(err.message().unwrap_or(&context)))
}

/// A response that succeeded but lacked a field the caller needs
pub(crate) fn missing_field(operation: &'static str, field: &str) -> AwsError {
    AwsError::Sdk {
        operation,
        code: None,
        message: format!("response did not include {field}"),
    }
}
