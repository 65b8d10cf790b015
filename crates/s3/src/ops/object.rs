//! Object operations

use aws_sdk_s3::types::{
    Delete, DeleteMarkerEntry, DeletedObject as SdkDeletedObject, Error as SdkDeleteError,
    GlacierJobParameters, Object as SdkObject, ObjectCannedAcl,
    ObjectIdentifier as SdkObjectIdentifier, ObjectVersion as SdkObjectVersion, RestoreRequest,
    StorageClass as SdkStorageClass, Tier,
};

use s3kit_core::model::*;
use s3kit_core::Result;

use crate::client::S3Client;
use crate::convert::{self, apply_customer_key, apply_encryption, object_metadata};
use crate::error::{build_error, sdk_error, service_code, stream_error};

/// Error code returned when a restore of the same object is running
const RESTORE_IN_PROGRESS: &str = "RestoreAlreadyInProgress";

fn resource(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

fn restore_in_progress(code: Option<&str>) -> bool {
    code == Some(RESTORE_IN_PROGRESS)
}

fn delete_outcome(deleted: &[SdkDeletedObject], errors: &[SdkDeleteError]) -> DeleteObjectsOutput {
    DeleteObjectsOutput {
        deleted: deleted
            .iter()
            .map(|d| DeletedObject {
                key: d.key().unwrap_or_default().to_string(),
                version_id: d.version_id().map(str::to_string),
                delete_marker: d.delete_marker().unwrap_or(false),
            })
            .collect(),
        errors: errors
            .iter()
            .map(|e| DeleteObjectError {
                key: e.key().unwrap_or_default().to_string(),
                version_id: e.version_id().map(str::to_string),
                code: e.code().unwrap_or_default().to_string(),
                message: e.message().unwrap_or_default().to_string(),
            })
            .collect(),
    }
}

fn object_summary(o: &SdkObject) -> ObjectSummary {
    ObjectSummary {
        key: o.key().unwrap_or_default().to_string(),
        size: o.size().unwrap_or(0),
        last_modified: convert::opt_timestamp(o.last_modified()),
        etag: convert::etag(o.e_tag()),
        storage_class: convert::storage_class(o.storage_class().map(|c| c.as_str())),
        owner: convert::owner(o.owner()),
    }
}

/// Unversioned buckets report no version id; S3 calls that version "null"
fn object_version(v: &SdkObjectVersion) -> ObjectVersion {
    ObjectVersion {
        key: v.key().unwrap_or_default().to_string(),
        version_id: v.version_id().unwrap_or("null").to_string(),
        is_latest: v.is_latest().unwrap_or(false),
        size: v.size().unwrap_or(0),
        last_modified: convert::opt_timestamp(v.last_modified()),
        etag: convert::etag(v.e_tag()),
        storage_class: convert::storage_class(v.storage_class().map(|c| c.as_str())),
    }
}

fn delete_marker(m: &DeleteMarkerEntry) -> DeleteMarker {
    DeleteMarker {
        key: m.key().unwrap_or_default().to_string(),
        version_id: m.version_id().unwrap_or("null").to_string(),
        is_latest: m.is_latest().unwrap_or(false),
        last_modified: convert::opt_timestamp(m.last_modified()),
    }
}

pub(crate) async fn get_object(
    client: &S3Client,
    request: GetObjectRequest,
) -> Result<GetObjectOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, range = ?request.range, "get object");

    let builder = client
        .inner
        .get_object()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id.clone())
        .set_range(request.range.as_ref().map(ByteRange::header_value))
        .set_if_match(request.if_match.clone())
        .set_if_none_match(request.if_none_match.clone());
    let builder = apply_customer_key!(builder, request.customer_key.as_ref());

    let response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    let mut metadata = object_metadata!(&response);
    metadata.content_range = response.content_range().map(str::to_string);

    let body = response
        .body
        .collect()
        .await
        .map_err(stream_error)?
        .into_bytes()
        .to_vec();

    Ok(GetObjectOutput { body, metadata })
}

pub(crate) async fn put_object(
    client: &S3Client,
    request: PutObjectRequest,
) -> Result<PutObjectOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, body = ?request.body, "put object");

    let (body, content_length) = convert::byte_stream(request.body).await?;

    let mut builder = client
        .inner
        .put_object()
        .bucket(&request.bucket)
        .key(&request.key)
        .body(body)
        .set_content_length(content_length)
        .set_content_type(request.content_type)
        .set_content_encoding(request.content_encoding)
        .set_content_disposition(request.content_disposition)
        .set_cache_control(request.cache_control)
        .set_metadata(convert::request_metadata(&request.metadata));

    if let Some(acl) = request.acl {
        builder = builder.acl(ObjectCannedAcl::from(acl.as_str()));
    }
    if let Some(class) = &request.storage_class {
        builder = builder.storage_class(SdkStorageClass::from(class.as_str()));
    }
    if !request.tags.is_empty() {
        builder = builder.tagging(encode_tags(&request.tags));
    }
    let builder = apply_encryption!(builder, request.encryption.as_ref());

    let outcome = if client.config.sign_payloads {
        builder.send().await
    } else {
        builder.customize().disable_payload_signing().send().await
    };
    let response = outcome.map_err(|e| sdk_error(e, &resource))?;

    Ok(PutObjectOutput {
        etag: convert::etag(response.e_tag()),
        version_id: response.version_id().map(str::to_string),
        server_side_encryption: response
            .server_side_encryption()
            .map(|s| s.as_str().to_string()),
    })
}

pub(crate) async fn head_object(
    client: &S3Client,
    request: HeadObjectRequest,
) -> Result<HeadObjectOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);

    let builder = client
        .inner
        .head_object()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id.clone());
    let builder = apply_customer_key!(builder, request.customer_key.as_ref());

    let response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(object_metadata!(&response))
}

pub(crate) async fn delete_object(
    client: &S3Client,
    request: DeleteObjectRequest,
) -> Result<DeleteObjectOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, version = ?request.version_id, "delete object");

    let response = client
        .inner
        .delete_object()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(DeleteObjectOutput {
        delete_marker: response.delete_marker().unwrap_or(false),
        version_id: response.version_id().map(str::to_string),
    })
}

pub(crate) async fn delete_objects(
    client: &S3Client,
    request: DeleteObjectsRequest,
) -> Result<DeleteObjectsOutput> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, count = request.objects.len(), "delete objects");

    let objects = request
        .objects
        .iter()
        .map(|o| {
            SdkObjectIdentifier::builder()
                .key(&o.key)
                .set_version_id(o.version_id.clone())
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()?;

    let delete = Delete::builder()
        .set_objects(Some(objects))
        .quiet(request.quiet)
        .build()
        .map_err(build_error)?;

    let response = client
        .inner
        .delete_objects()
        .bucket(&request.bucket)
        .delete(delete)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let outcome = delete_outcome(response.deleted(), response.errors());
    if !outcome.errors.is_empty() {
        tracing::warn!(
            bucket = %request.bucket,
            failed = outcome.errors.len(),
            "some deletions failed"
        );
    }

    Ok(outcome)
}

pub(crate) async fn copy_object(
    client: &S3Client,
    request: CopyObjectRequest,
) -> Result<CopyObjectOutput> {
    request.validate()?;
    let source = convert::copy_source(
        &request.source_bucket,
        &request.source_key,
        request.source_version_id.as_deref(),
    );
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(source = %source, target = %resource, "copy object");

    let mut builder = client
        .inner
        .copy_object()
        .copy_source(&source)
        .bucket(&request.bucket)
        .key(&request.key)
        .metadata_directive(aws_sdk_s3::types::MetadataDirective::from(
            request.metadata_directive.as_str(),
        ))
        .set_content_type(request.content_type.clone());

    if request.metadata_directive == MetadataDirective::Replace {
        builder = builder.set_metadata(convert::request_metadata(&request.metadata));
    }
    if let Some(acl) = request.acl {
        builder = builder.acl(ObjectCannedAcl::from(acl.as_str()));
    }
    if let Some(class) = &request.storage_class {
        builder = builder.storage_class(SdkStorageClass::from(class.as_str()));
    }
    if let Some(key) = &request.source_customer_key {
        builder = builder
            .copy_source_sse_customer_algorithm(key.algorithm.as_str())
            .copy_source_sse_customer_key(key.key.as_str())
            .copy_source_sse_customer_key_md5(key.key_md5.as_str());
    }
    let builder = apply_encryption!(builder, request.encryption.as_ref());

    let response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &source))?;

    let result = response.copy_object_result();
    Ok(CopyObjectOutput {
        etag: convert::etag(result.and_then(|r| r.e_tag())),
        last_modified: convert::opt_timestamp(result.and_then(|r| r.last_modified())),
        version_id: response.version_id().map(str::to_string),
    })
}

pub(crate) async fn list_objects_v2(
    client: &S3Client,
    request: ListObjectsV2Request,
) -> Result<ListObjectsV2Output> {
    request.validate()?;

    let response = client
        .inner
        .list_objects_v2()
        .bucket(&request.bucket)
        .set_prefix(request.prefix)
        .set_delimiter(request.delimiter)
        .set_max_keys(request.max_keys)
        .set_continuation_token(request.continuation_token)
        .set_start_after(request.start_after)
        .fetch_owner(request.fetch_owner)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    let contents = response
        .contents()
        .iter()
        .map(object_summary)
        .collect::<Vec<_>>();

    Ok(ListObjectsV2Output {
        key_count: response.key_count().unwrap_or(contents.len() as i32),
        contents,
        common_prefixes: convert::prefixes(response.common_prefixes()),
        is_truncated: response.is_truncated().unwrap_or(false),
        next_continuation_token: response.next_continuation_token().map(str::to_string),
    })
}

pub(crate) async fn list_object_versions(
    client: &S3Client,
    request: ListObjectVersionsRequest,
) -> Result<ListObjectVersionsOutput> {
    request.validate()?;

    let response = client
        .inner
        .list_object_versions()
        .bucket(&request.bucket)
        .set_prefix(request.prefix)
        .set_delimiter(request.delimiter)
        .set_key_marker(request.key_marker)
        .set_version_id_marker(request.version_id_marker)
        .set_max_keys(request.max_keys)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(ListObjectVersionsOutput {
        versions: response.versions().iter().map(object_version).collect(),
        delete_markers: response.delete_markers().iter().map(delete_marker).collect(),
        common_prefixes: convert::prefixes(response.common_prefixes()),
        is_truncated: response.is_truncated().unwrap_or(false),
        next_key_marker: response.next_key_marker().map(str::to_string),
        next_version_id_marker: response.next_version_id_marker().map(str::to_string),
    })
}

pub(crate) async fn restore_object(
    client: &S3Client,
    request: RestoreObjectRequest,
) -> Result<RestoreObjectOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(
        object = %resource,
        days = request.days,
        tier = request.tier.as_str(),
        "restore object"
    );

    let job = GlacierJobParameters::builder()
        .tier(Tier::from(request.tier.as_str()))
        .build()
        .map_err(build_error)?;
    let restore = RestoreRequest::builder()
        .days(request.days)
        .glacier_job_parameters(job)
        .build();

    let outcome = client
        .inner
        .restore_object()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id)
        .restore_request(restore)
        .send()
        .await;

    match outcome {
        Ok(response) => Ok(RestoreObjectOutput {
            already_in_progress: false,
            restore_output_path: response.restore_output_path().map(str::to_string),
        }),
        Err(e) if restore_in_progress(service_code(&e)) => Ok(RestoreObjectOutput {
            already_in_progress: true,
            restore_output_path: None,
        }),
        Err(e) => Err(sdk_error(e, &resource)),
    }
}
