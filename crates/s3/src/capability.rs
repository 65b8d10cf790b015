//! Capability detection for S3 backends
//!
//! S3-compatible servers implement different subsets of the API. Each
//! probe issues a read-only request against a bucket; a feature counts as
//! missing only when the backend answers that it is not implemented.
//! Errors such as "no configuration" or "access denied" still prove the
//! operation exists.

use s3kit_core::model::BucketRequest;
use s3kit_core::{Capabilities, Error, Feature, Result, S3Api};

/// Outcome of a probe, reduced to "the backend knows this operation"
fn supported<T>(outcome: Result<T>) -> bool {
    !matches!(outcome, Err(Error::UnsupportedFeature(_)))
}

/// Detect capabilities of an S3 backend
///
/// Object lock, Select and notifications need probes with side effects and
/// are left unset; callers can bypass the check with `--force`.
pub async fn detect_capabilities<A>(api: &A, bucket: &str) -> Result<Capabilities>
where
    A: S3Api + ?Sized,
{
    let request = BucketRequest::new(bucket);
    request.validate()?;

    let caps = Capabilities {
        versioning: api.get_bucket_versioning(request.clone()).await.is_ok(),
        tagging: supported(api.get_bucket_tagging(request.clone()).await),
        lifecycle: supported(
            api.get_bucket_lifecycle_configuration(request.clone())
                .await,
        ),
        encryption: supported(api.get_bucket_encryption(request.clone()).await),
        replication: supported(api.get_bucket_replication(request).await),
        ..Default::default()
    };

    tracing::debug!(bucket, ?caps, "detected backend capabilities");
    Ok(caps)
}

/// Check a feature by its command-line name, returning `UnsupportedFeature`
/// when the backend lacks it
pub fn require_capability(caps: &Capabilities, feature: &str) -> Result<()> {
    let feature = match feature {
        "versioning" | "version" => Feature::Versioning,
        "object_lock" | "retention" => Feature::ObjectLock,
        "tagging" | "tag" => Feature::Tagging,
        "select" | "sql" => Feature::Select,
        "notifications" | "watch" => Feature::Notifications,
        "lifecycle" | "ilm" => Feature::Lifecycle,
        "encryption" | "encrypt" => Feature::Encryption,
        "replication" | "replicate" => Feature::Replication,
        other => {
            return Err(Error::UnsupportedFeature(format!(
                "unknown feature '{other}'"
            )));
        }
    };
    caps.require(feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3kit_core::MockS3Api;
    use s3kit_core::model::*;

    #[tokio::test]
    async fn test_detect_capabilities() {
        let mut api = MockS3Api::new();
        api.expect_get_bucket_versioning()
            .returning(|_| Ok(GetBucketVersioningOutput::default()));
        api.expect_get_bucket_tagging()
            .returning(|_| Err(Error::NotFound("NoSuchTagSet".into())));
        api.expect_get_bucket_lifecycle_configuration()
            .returning(|_| Err(Error::UnsupportedFeature("NotImplemented".into())));
        api.expect_get_bucket_encryption()
            .returning(|_| Err(Error::Auth("AccessDenied".into())));
        api.expect_get_bucket_replication()
            .returning(|_| Ok(ReplicationConfiguration::default()));

        let caps = detect_capabilities(&api, "bucket").await.unwrap();
        assert!(caps.versioning);
        assert!(caps.tagging);
        assert!(!caps.lifecycle);
        assert!(caps.encryption);
        assert!(caps.replication);
        assert!(!caps.select);
    }

    #[tokio::test]
    async fn test_detect_rejects_bad_bucket() {
        let api = MockS3Api::new();
        let err = detect_capabilities(&api, "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidBucketName(_)));
    }

    #[test]
    fn test_require_capability_versioning() {
        let caps = Capabilities {
            versioning: true,
            ..Default::default()
        };
        assert!(require_capability(&caps, "versioning").is_ok());
        assert!(require_capability(&Capabilities::default(), "versioning").is_err());
    }

    #[test]
    fn test_require_capability_unknown() {
        let err = require_capability(&Capabilities::aws(), "unknown_feature").unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }
}
