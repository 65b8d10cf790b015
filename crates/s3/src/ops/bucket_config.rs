//! Bucket configuration: policy, versioning, lifecycle, encryption,
//! replication and CORS

use aws_sdk_s3::types::{
    AbortIncompleteMultipartUpload, BucketLifecycleConfiguration, BucketVersioningStatus,
    CorsConfiguration as SdkCorsConfiguration, CorsRule as SdkCorsRule, DeleteMarkerReplication,
    DeleteMarkerReplicationStatus, Destination, ExpirationStatus, LifecycleExpiration,
    LifecycleRule as SdkLifecycleRule, LifecycleRuleFilter, MfaDelete, MfaDeleteStatus,
    NoncurrentVersionExpiration, ReplicationConfiguration as SdkReplicationConfiguration,
    ReplicationRule as SdkReplicationRule, ReplicationRuleFilter, ReplicationRuleStatus,
    ServerSideEncryption as SdkAlgorithm, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule,
    StorageClass as SdkStorageClass, Transition as SdkTransition, TransitionStorageClass,
    VersioningConfiguration,
};

use s3kit_core::model::*;
use s3kit_core::{Error, Result};

use crate::client::S3Client;
use crate::convert;
use crate::error::{build_error, sdk_error};

/// Issue a bucket-only request whose response carries nothing of interest
macro_rules! bucket_call {
    ($client:expr, $op:ident, $bucket:expr) => {{
        let bucket: &str = $bucket;
        $client
            .inner
            .$op()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| sdk_error(e, bucket))
            .map(|_| ())
    }};
}

// Policy

pub(crate) async fn get_bucket_policy(
    client: &S3Client,
    request: GetBucketPolicyRequest,
) -> Result<GetBucketPolicyOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_policy()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(GetBucketPolicyOutput {
        policy: response.policy().unwrap_or_default().to_string(),
    })
}

pub(crate) async fn put_bucket_policy(
    client: &S3Client,
    request: PutBucketPolicyRequest,
) -> Result<()> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, bytes = request.policy.len(), "put bucket policy");

    client
        .inner
        .put_bucket_policy()
        .bucket(&request.bucket)
        .policy(request.policy)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_policy(
    client: &S3Client,
    request: DeleteBucketPolicyRequest,
) -> Result<()> {
    request.validate()?;
    bucket_call!(client, delete_bucket_policy, &request.bucket)
}

// Versioning

pub(crate) async fn get_bucket_versioning(
    client: &S3Client,
    request: GetBucketVersioningRequest,
) -> Result<GetBucketVersioningOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_versioning()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let status = match response.status() {
        Some(BucketVersioningStatus::Enabled) => VersioningStatus::Enabled,
        Some(BucketVersioningStatus::Suspended) => VersioningStatus::Suspended,
        _ => VersioningStatus::Unversioned,
    };

    Ok(GetBucketVersioningOutput {
        status,
        mfa_delete: response
            .mfa_delete()
            .map(|m| *m == MfaDeleteStatus::Enabled),
    })
}

pub(crate) async fn put_bucket_versioning(
    client: &S3Client,
    request: PutBucketVersioningRequest,
) -> Result<()> {
    request.validate()?;
    tracing::debug!(
        bucket = %request.bucket,
        status = request.status.as_str(),
        "put bucket versioning"
    );

    let configuration = VersioningConfiguration::builder()
        .status(BucketVersioningStatus::from(request.status.as_str()))
        .set_mfa_delete(request.mfa_delete.map(|enabled| {
            if enabled {
                MfaDelete::Enabled
            } else {
                MfaDelete::Disabled
            }
        }))
        .build();

    client
        .inner
        .put_bucket_versioning()
        .bucket(&request.bucket)
        .versioning_configuration(configuration)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

// Lifecycle

fn lifecycle_rule_from_sdk(rule: &SdkLifecycleRule) -> LifecycleRule {
    #[allow(deprecated)]
    let legacy_prefix = rule.prefix();
    let prefix = rule
        .filter()
        .and_then(|f| f.prefix())
        .or(legacy_prefix)
        .unwrap_or_default()
        .to_string();

    LifecycleRule {
        id: rule.id().map(str::to_string),
        prefix,
        enabled: *rule.status() == ExpirationStatus::Enabled,
        expiration_days: rule.expiration().and_then(|e| e.days()),
        noncurrent_version_expiration_days: rule
            .noncurrent_version_expiration()
            .and_then(|n| n.noncurrent_days()),
        abort_incomplete_multipart_upload_days: rule
            .abort_incomplete_multipart_upload()
            .and_then(|a| a.days_after_initiation()),
        transitions: rule
            .transitions()
            .iter()
            .filter_map(|t| {
                Some(Transition {
                    days: t.days()?,
                    storage_class: StorageClass::from(t.storage_class()?.as_str()),
                })
            })
            .collect(),
    }
}

fn lifecycle_rule_to_sdk(rule: &LifecycleRule) -> Result<SdkLifecycleRule> {
    let status = if rule.enabled {
        ExpirationStatus::Enabled
    } else {
        ExpirationStatus::Disabled
    };

    SdkLifecycleRule::builder()
        .set_id(rule.id.clone())
        .filter(LifecycleRuleFilter::builder().prefix(&rule.prefix).build())
        .status(status)
        .set_expiration(
            rule.expiration_days
                .map(|days| LifecycleExpiration::builder().days(days).build()),
        )
        .set_noncurrent_version_expiration(rule.noncurrent_version_expiration_days.map(|days| {
            NoncurrentVersionExpiration::builder()
                .noncurrent_days(days)
                .build()
        }))
        .set_abort_incomplete_multipart_upload(rule.abort_incomplete_multipart_upload_days.map(
            |days| {
                AbortIncompleteMultipartUpload::builder()
                    .days_after_initiation(days)
                    .build()
            },
        ))
        .set_transitions(Some(
            rule.transitions
                .iter()
                .map(|t| {
                    SdkTransition::builder()
                        .days(t.days)
                        .storage_class(TransitionStorageClass::from(t.storage_class.as_str()))
                        .build()
                })
                .collect(),
        ))
        .build()
        .map_err(build_error)
}

pub(crate) async fn get_bucket_lifecycle_configuration(
    client: &S3Client,
    request: GetBucketLifecycleConfigurationRequest,
) -> Result<GetBucketLifecycleConfigurationOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_lifecycle_configuration()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(LifecycleConfiguration {
        rules: response.rules().iter().map(lifecycle_rule_from_sdk).collect(),
    })
}

pub(crate) async fn put_bucket_lifecycle_configuration(
    client: &S3Client,
    request: PutBucketLifecycleConfigurationRequest,
) -> Result<()> {
    request.validate()?;
    tracing::debug!(
        bucket = %request.bucket,
        rules = request.configuration.rules.len(),
        "put bucket lifecycle"
    );

    let rules = request
        .configuration
        .rules
        .iter()
        .map(lifecycle_rule_to_sdk)
        .collect::<Result<Vec<_>>>()?;
    let configuration = BucketLifecycleConfiguration::builder()
        .set_rules(Some(rules))
        .build()
        .map_err(build_error)?;

    client
        .inner
        .put_bucket_lifecycle_configuration()
        .bucket(&request.bucket)
        .lifecycle_configuration(configuration)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_lifecycle(
    client: &S3Client,
    request: DeleteBucketLifecycleRequest,
) -> Result<()> {
    request.validate()?;
    bucket_call!(client, delete_bucket_lifecycle, &request.bucket)
}

// Encryption

pub(crate) async fn get_bucket_encryption(
    client: &S3Client,
    request: GetBucketEncryptionRequest,
) -> Result<GetBucketEncryptionOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_encryption()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let rule = response
        .server_side_encryption_configuration()
        .and_then(|c| {
            c.rules()
                .iter()
                .find(|r| r.apply_server_side_encryption_by_default().is_some())
        })
        .ok_or_else(|| {
            Error::NotFound(format!("{}: no default encryption rule", request.bucket))
        })?;

    let mut encryption = BucketEncryption {
        bucket_key_enabled: rule.bucket_key_enabled().unwrap_or(false),
        ..Default::default()
    };
    if let Some(default) = rule.apply_server_side_encryption_by_default() {
        encryption.algorithm = match default.sse_algorithm() {
            SdkAlgorithm::Aes256 => SseAlgorithm::Aes256,
            _ => SseAlgorithm::AwsKms,
        };
        encryption.kms_master_key_id = default.kms_master_key_id().map(str::to_string);
    }
    Ok(encryption)
}

pub(crate) async fn put_bucket_encryption(
    client: &S3Client,
    request: PutBucketEncryptionRequest,
) -> Result<()> {
    request.validate()?;
    let encryption = &request.encryption;
    tracing::debug!(
        bucket = %request.bucket,
        algorithm = encryption.algorithm.as_str(),
        "put bucket encryption"
    );

    let default = ServerSideEncryptionByDefault::builder()
        .sse_algorithm(SdkAlgorithm::from(encryption.algorithm.as_str()))
        .set_kms_master_key_id(encryption.kms_master_key_id.clone())
        .build()
        .map_err(build_error)?;
    let mut rule =
        ServerSideEncryptionRule::builder().apply_server_side_encryption_by_default(default);
    if encryption.algorithm == SseAlgorithm::AwsKms {
        rule = rule.bucket_key_enabled(encryption.bucket_key_enabled);
    }
    let configuration = ServerSideEncryptionConfiguration::builder()
        .rules(rule.build())
        .build()
        .map_err(build_error)?;

    client
        .inner
        .put_bucket_encryption()
        .bucket(&request.bucket)
        .server_side_encryption_configuration(configuration)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_encryption(
    client: &S3Client,
    request: DeleteBucketEncryptionRequest,
) -> Result<()> {
    request.validate()?;
    bucket_call!(client, delete_bucket_encryption, &request.bucket)
}

// Replication

fn replication_rule_from_sdk(rule: &SdkReplicationRule) -> ReplicationRule {
    #[allow(deprecated)]
    let legacy_prefix = rule.prefix();
    let prefix = rule
        .filter()
        .and_then(|f| f.prefix())
        .or(legacy_prefix)
        .unwrap_or_default()
        .to_string();
    let destination = rule.destination();

    ReplicationRule {
        id: rule.id().map(str::to_string),
        priority: rule.priority(),
        prefix,
        enabled: *rule.status() == ReplicationRuleStatus::Enabled,
        destination_bucket: destination.map(|d| d.bucket().to_string()).unwrap_or_default(),
        storage_class: convert::storage_class(
            destination
                .and_then(|d| d.storage_class())
                .map(|c| c.as_str()),
        ),
        replicate_delete_markers: rule
            .delete_marker_replication()
            .and_then(|d| d.status())
            .is_some_and(|s| *s == DeleteMarkerReplicationStatus::Enabled),
    }
}

fn replication_rule_to_sdk(rule: &ReplicationRule) -> Result<SdkReplicationRule> {
    let destination = Destination::builder()
        .bucket(rule.destination_arn())
        .set_storage_class(
            rule.storage_class
                .as_ref()
                .map(|c| SdkStorageClass::from(c.as_str())),
        )
        .build()
        .map_err(build_error)?;

    let delete_markers = if rule.replicate_delete_markers {
        DeleteMarkerReplicationStatus::Enabled
    } else {
        DeleteMarkerReplicationStatus::Disabled
    };
    let status = if rule.enabled {
        ReplicationRuleStatus::Enabled
    } else {
        ReplicationRuleStatus::Disabled
    };

    SdkReplicationRule::builder()
        .set_id(rule.id.clone())
        .set_priority(rule.priority)
        .filter(ReplicationRuleFilter::builder().prefix(&rule.prefix).build())
        .status(status)
        .destination(destination)
        .delete_marker_replication(
            DeleteMarkerReplication::builder()
                .status(delete_markers)
                .build(),
        )
        .build()
        .map_err(build_error)
}

pub(crate) async fn get_bucket_replication(
    client: &S3Client,
    request: GetBucketReplicationRequest,
) -> Result<GetBucketReplicationOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_replication()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let configuration = response.replication_configuration().ok_or_else(|| {
        Error::NotFound(format!("{}: no replication configuration", request.bucket))
    })?;

    Ok(ReplicationConfiguration {
        role: configuration.role().to_string(),
        rules: configuration
            .rules()
            .iter()
            .map(replication_rule_from_sdk)
            .collect(),
    })
}

pub(crate) async fn put_bucket_replication(
    client: &S3Client,
    request: PutBucketReplicationRequest,
) -> Result<()> {
    request.validate()?;
    tracing::debug!(
        bucket = %request.bucket,
        rules = request.configuration.rules.len(),
        "put bucket replication"
    );

    let rules = request
        .configuration
        .rules
        .iter()
        .map(replication_rule_to_sdk)
        .collect::<Result<Vec<_>>>()?;
    let configuration = SdkReplicationConfiguration::builder()
        .role(&request.configuration.role)
        .set_rules(Some(rules))
        .build()
        .map_err(build_error)?;

    client
        .inner
        .put_bucket_replication()
        .bucket(&request.bucket)
        .replication_configuration(configuration)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_replication(
    client: &S3Client,
    request: DeleteBucketReplicationRequest,
) -> Result<()> {
    request.validate()?;
    bucket_call!(client, delete_bucket_replication, &request.bucket)
}

// CORS

fn cors_rule_to_sdk(rule: &CorsRule) -> Result<SdkCorsRule> {
    SdkCorsRule::builder()
        .set_id(rule.id.clone())
        .set_allowed_methods(Some(rule.allowed_methods.clone()))
        .set_allowed_origins(Some(rule.allowed_origins.clone()))
        .set_allowed_headers(Some(rule.allowed_headers.clone()).filter(|h| !h.is_empty()))
        .set_expose_headers(Some(rule.expose_headers.clone()).filter(|h| !h.is_empty()))
        .set_max_age_seconds(rule.max_age_seconds)
        .build()
        .map_err(build_error)
}

pub(crate) async fn get_bucket_cors(
    client: &S3Client,
    request: GetBucketCorsRequest,
) -> Result<GetBucketCorsOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_cors()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let rules = response
        .cors_rules()
        .iter()
        .map(|r| CorsRule {
            id: r.id().map(str::to_string),
            allowed_methods: r.allowed_methods().to_vec(),
            allowed_origins: r.allowed_origins().to_vec(),
            allowed_headers: r.allowed_headers().to_vec(),
            expose_headers: r.expose_headers().to_vec(),
            max_age_seconds: r.max_age_seconds(),
        })
        .collect();

    Ok(CorsConfiguration { rules })
}

pub(crate) async fn put_bucket_cors(client: &S3Client, request: PutBucketCorsRequest) -> Result<()> {
    request.validate()?;
    tracing::debug!(
        bucket = %request.bucket,
        rules = request.configuration.rules.len(),
        "put bucket cors"
    );

    let rules = request
        .configuration
        .rules
        .iter()
        .map(cors_rule_to_sdk)
        .collect::<Result<Vec<_>>>()?;
    let configuration = SdkCorsConfiguration::builder()
        .set_cors_rules(Some(rules))
        .build()
        .map_err(build_error)?;

    client
        .inner
        .put_bucket_cors()
        .bucket(&request.bucket)
        .cors_configuration(configuration)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_cors(
    client: &S3Client,
    request: DeleteBucketCorsRequest,
) -> Result<()> {
    request.validate()?;
    bucket_call!(client, delete_bucket_cors, &request.bucket)
}
