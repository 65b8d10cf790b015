//! Error types for s3kit-core
//!
//! Provides a unified error type shared by every calling form. Service errors
//! returned by S3 are classified into the same variants so that callers can
//! match on meaning rather than on raw error codes.

use thiserror::Error;

/// Result type alias for s3kit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes that are already self-explanatory to a user
const FRIENDLY_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "NoSuchBucket",
    "InvalidAccessKeyId",
    "InvalidBucketName",
    "KeyTooLong",
    "NoSuchKey",
    "RequestTimeout",
];

/// Error types for s3kit operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed s3:// URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Bucket name violates the S3 naming rules
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// Request rejected before it was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL parsing error
    #[error("Invalid endpoint: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Authentication or permission failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// Conflict or failed precondition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The bucket lives behind another endpoint
    #[error("Permanent redirect: bucket must be addressed through {}", .endpoint.as_deref().unwrap_or("another endpoint"))]
    Redirect {
        /// Endpoint suggested by the service, if any
        endpoint: Option<String>,
    },

    /// Service error that fits no other category
    #[error("S3 error {code} (HTTP {status}): {message}")]
    Service {
        /// S3 error code, e.g. "InvalidRange"
        code: String,
        /// Message returned by the service
        message: String,
        /// HTTP status code, 0 when unknown
        status: u16,
    },

    /// Feature not supported by backend
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The operation was dropped before it produced an outcome
    #[error("Operation cancelled")]
    Cancelled,

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Classify an error returned by the S3 service
    ///
    /// `code` is the S3 error code (may be empty for HEAD requests, which
    /// carry no body), `status` the HTTP status (0 when unknown).
    pub fn from_service(code: &str, message: &str, status: u16) -> Self {
        let detail = if message.is_empty() {
            code.to_string()
        } else if code.is_empty() {
            message.to_string()
        } else {
            format!("{code}: {message}")
        };

        match code {
            "NoSuchKey" | "NoSuchBucket" | "NoSuchUpload" | "NoSuchVersion" | "NotFound"
            | "NoSuchTagSet" | "NoSuchTagSetError" | "NoSuchBucketPolicy"
            | "NoSuchLifecycleConfiguration" | "NoSuchCORSConfiguration"
            | "ServerSideEncryptionConfigurationNotFoundError"
            | "ReplicationConfigurationNotFoundError" => return Error::NotFound(detail),
            "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken"
            | "InvalidToken" | "AllAccessDisabled" => return Error::Auth(detail),
            "BucketAlreadyExists" | "BucketAlreadyOwnedByYou" | "BucketNotEmpty"
            | "PreconditionFailed" | "OperationAborted" | "InvalidObjectState"
            | "RestoreAlreadyInProgress" => {
                return Error::Conflict(detail);
            }
            "PermanentRedirect" | "TemporaryRedirect" => {
                return Error::Redirect { endpoint: None };
            }
            "SlowDown" | "RequestTimeout" | "InternalError" | "ServiceUnavailable"
            | "RequestTimeTooSkewed" => return Error::Network(detail),
            "NotImplemented" | "XNotImplemented" => return Error::UnsupportedFeature(detail),
            _ => {}
        }

        match status {
            301 | 307 => Error::Redirect { endpoint: None },
            403 => Error::Auth(detail),
            404 => Error::NotFound(detail),
            409 | 412 => Error::Conflict(detail),
            501 => Error::UnsupportedFeature(detail),
            500..=599 => Error::Network(detail),
            _ => Error::Service {
                code: code.to_string(),
                message: message.to_string(),
                status,
            },
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Service { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Whether this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidUrl(_)
            | Error::InvalidBucketName(_)
            | Error::InvalidArgument(_)
            | Error::Config(_) => 2, // UsageError
            Error::Network(_) | Error::Redirect { .. } => 3, // NetworkError
            Error::Auth(_) => 4,                               // AuthError
            Error::NotFound(_) => 5,                           // NotFound
            Error::Conflict(_) => 6,                           // Conflict
            Error::UnsupportedFeature(_) => 7,                 // UnsupportedFeature
            Error::Cancelled => 130,                           // Interrupted
            _ => 1,                                            // GeneralError
        }
    }
}

/// Reduce a raw service message to a short, user-facing error code
///
/// Known codes are returned as-is; a bare "forbidden" gets a hint about
/// credentials. Anything else is returned unchanged.
pub fn friendly_error_code(msg: &str) -> String {
    let lower = msg.to_ascii_lowercase();
    for code in FRIENDLY_ERROR_CODES {
        if lower.contains(&code.to_ascii_lowercase()) {
            return (*code).to_string();
        }
    }

    if lower.contains("forbidden") {
        return "403 Forbidden. Please check your AWS credentials and permission to the file."
            .to_string();
    }

    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidUrl("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::UnsupportedFeature("test".into()).exit_code(), 7);
        assert_eq!(Error::Cancelled.exit_code(), 130);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_from_service_by_code() {
        assert!(matches!(
            Error::from_service("NoSuchKey", "The specified key does not exist.", 404),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from_service("AccessDenied", "Access Denied", 403),
            Error::Auth(_)
        ));
        assert!(matches!(
            Error::from_service("BucketNotEmpty", "", 409),
            Error::Conflict(_)
        ));
        assert!(matches!(
            Error::from_service("PermanentRedirect", "", 301),
            Error::Redirect { .. }
        ));
        assert!(matches!(
            Error::from_service("NotImplemented", "", 501),
            Error::UnsupportedFeature(_)
        ));
        assert!(matches!(
            Error::from_service(
                "RestoreAlreadyInProgress",
                "Object restore is already in progress",
                409
            ),
            Error::Conflict(_)
        ));
        assert!(matches!(
            Error::from_service("NoSuchTagSet", "The TagSet does not exist", 404),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_from_service_by_status() {
        // HEAD responses carry no error code
        assert!(matches!(Error::from_service("", "", 404), Error::NotFound(_)));
        assert!(matches!(Error::from_service("", "", 403), Error::Auth(_)));
        assert!(matches!(Error::from_service("", "", 503), Error::Network(_)));

        let err = Error::from_service("InvalidRange", "bad range", 416);
        match err {
            Error::Service { code, status, .. } => {
                assert_eq!(code, "InvalidRange");
                assert_eq!(status, 416);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Network("reset".into()).is_retryable());
        assert!(Error::from_service("SlowDown", "", 503).is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
        assert!(
            Error::Service {
                code: "TooManyRequests".into(),
                message: String::new(),
                status: 429,
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_friendly_error_code() {
        assert_eq!(
            friendly_error_code("Error while listing Objects, exception: NoSuchBucket, msg: x"),
            "NoSuchBucket"
        );
        assert_eq!(friendly_error_code("accessdenied"), "AccessDenied");
        assert!(friendly_error_code("HTTP 403 Forbidden").starts_with("403 Forbidden."));
        assert_eq!(friendly_error_code("something else"), "something else");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBucketName("a".into());
        assert_eq!(err.to_string(), "Invalid bucket name: a");

        let err = Error::Redirect {
            endpoint: Some("s3.eu-west-1.amazonaws.com".into()),
        };
        assert!(err.to_string().contains("s3.eu-west-1.amazonaws.com"));
    }
}
