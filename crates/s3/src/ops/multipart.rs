//! Multipart upload operations

use aws_sdk_s3::types::{
    CompletedMultipartUpload, CompletedPart as SdkCompletedPart,
    MultipartUpload as SdkMultipartUpload, ObjectCannedAcl, Part as SdkPart,
    StorageClass as SdkStorageClass,
};

use s3kit_core::model::*;
use s3kit_core::{Error, Result};

use crate::client::S3Client;
use crate::convert::{self, apply_customer_key, apply_encryption};
use crate::error::sdk_error;

fn resource(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

fn completed_upload(parts: Vec<CompletedPart>) -> CompletedMultipartUpload {
    let parts = parts
        .into_iter()
        .map(|p| {
            SdkCompletedPart::builder()
                .part_number(p.part_number)
                .e_tag(p.etag)
                .build()
        })
        .collect();
    CompletedMultipartUpload::builder()
        .set_parts(Some(parts))
        .build()
}

fn part_from_sdk(p: &SdkPart) -> Part {
    Part {
        part_number: p.part_number().unwrap_or(0),
        etag: p.e_tag().map(normalize_etag).unwrap_or_default(),
        size: p.size().unwrap_or(0),
        last_modified: convert::opt_timestamp(p.last_modified()),
    }
}

fn upload_from_sdk(u: &SdkMultipartUpload) -> MultipartUpload {
    MultipartUpload {
        key: u.key().unwrap_or_default().to_string(),
        upload_id: u.upload_id().unwrap_or_default().to_string(),
        initiated: convert::opt_timestamp(u.initiated()),
        storage_class: convert::storage_class(u.storage_class().map(|c| c.as_str())),
    }
}

/// The marker travels as a string; anything unparsable ends paging
fn part_marker(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|m| m.parse().ok())
}

pub(crate) async fn create_multipart_upload(
    client: &S3Client,
    request: CreateMultipartUploadRequest,
) -> Result<CreateMultipartUploadOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, "create multipart upload");

    let mut builder = client
        .inner
        .create_multipart_upload()
        .bucket(&request.bucket)
        .key(&request.key)
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

    let response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    let upload_id = response
        .upload_id()
        .ok_or_else(|| Error::General(format!("no upload id returned for {resource}")))?
        .to_string();

    Ok(CreateMultipartUploadOutput {
        bucket: request.bucket,
        key: request.key,
        upload_id,
    })
}

pub(crate) async fn upload_part(
    client: &S3Client,
    request: UploadPartRequest,
) -> Result<UploadPartOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, part = request.part_number, "upload part");

    let (body, content_length) = convert::byte_stream(request.body).await?;

    let builder = client
        .inner
        .upload_part()
        .bucket(&request.bucket)
        .key(&request.key)
        .upload_id(&request.upload_id)
        .part_number(request.part_number)
        .body(body)
        .set_content_length(content_length);
    let builder = apply_customer_key!(builder, request.customer_key.as_ref());

    let outcome = if client.config.sign_payloads {
        builder.send().await
    } else {
        builder.customize().disable_payload_signing().send().await
    };
    let response = outcome.map_err(|e| sdk_error(e, &resource))?;

    let etag = convert::etag(response.e_tag()).ok_or_else(|| {
        Error::General(format!("no etag returned for part {}", request.part_number))
    })?;

    Ok(UploadPartOutput {
        part_number: request.part_number,
        etag,
    })
}

pub(crate) async fn upload_part_copy(
    client: &S3Client,
    request: UploadPartCopyRequest,
) -> Result<UploadPartCopyOutput> {
    request.validate()?;
    let source = convert::copy_source(
        &request.source_bucket,
        &request.source_key,
        request.source_version_id.as_deref(),
    );
    tracing::debug!(source = %source, part = request.part_number, "upload part copy");

    let response = client
        .inner
        .upload_part_copy()
        .bucket(&request.bucket)
        .key(&request.key)
        .upload_id(&request.upload_id)
        .part_number(request.part_number)
        .copy_source(&source)
        .set_copy_source_range(request.source_range.as_ref().map(ByteRange::header_value))
        .send()
        .await
        .map_err(|e| sdk_error(e, &source))?;

    let result = response.copy_part_result();
    let etag = convert::etag(result.and_then(|r| r.e_tag())).ok_or_else(|| {
        Error::General(format!("no etag returned for part {}", request.part_number))
    })?;

    Ok(UploadPartCopyOutput {
        part_number: request.part_number,
        etag,
        last_modified: convert::opt_timestamp(result.and_then(|r| r.last_modified())),
    })
}

pub(crate) async fn complete_multipart_upload(
    client: &S3Client,
    request: CompleteMultipartUploadRequest,
) -> Result<CompleteMultipartUploadOutput> {
    let parts = request.sorted_parts()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, parts = parts.len(), "complete multipart upload");

    let response = client
        .inner
        .complete_multipart_upload()
        .bucket(&request.bucket)
        .key(&request.key)
        .upload_id(&request.upload_id)
        .multipart_upload(completed_upload(parts))
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(CompleteMultipartUploadOutput {
        location: response.location().map(str::to_string),
        etag: convert::etag(response.e_tag()),
        version_id: response.version_id().map(str::to_string),
    })
}

pub(crate) async fn abort_multipart_upload(
    client: &S3Client,
    request: AbortMultipartUploadRequest,
) -> Result<()> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);
    tracing::debug!(object = %resource, upload_id = %request.upload_id, "abort multipart upload");

    client
        .inner
        .abort_multipart_upload()
        .bucket(&request.bucket)
        .key(&request.key)
        .upload_id(&request.upload_id)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;
    Ok(())
}

pub(crate) async fn list_parts(
    client: &S3Client,
    request: ListPartsRequest,
) -> Result<ListPartsOutput> {
    request.validate()?;
    let resource = resource(&request.bucket, &request.key);

    let response = client
        .inner
        .list_parts()
        .bucket(&request.bucket)
        .key(&request.key)
        .upload_id(&request.upload_id)
        .set_max_parts(request.max_parts)
        .set_part_number_marker(request.part_number_marker.map(|m| m.to_string()))
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(ListPartsOutput {
        parts: response.parts().iter().map(part_from_sdk).collect(),
        is_truncated: response.is_truncated().unwrap_or(false),
        next_part_number_marker: part_marker(response.next_part_number_marker()),
    })
}

pub(crate) async fn list_multipart_uploads(
    client: &S3Client,
    request: ListMultipartUploadsRequest,
) -> Result<ListMultipartUploadsOutput> {
    request.validate()?;

    let response = client
        .inner
        .list_multipart_uploads()
        .bucket(&request.bucket)
        .set_prefix(request.prefix)
        .set_delimiter(request.delimiter)
        .set_key_marker(request.key_marker)
        .set_upload_id_marker(request.upload_id_marker)
        .set_max_uploads(request.max_uploads)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(ListMultipartUploadsOutput {
        uploads: response.uploads().iter().map(upload_from_sdk).collect(),
        common_prefixes: convert::prefixes(response.common_prefixes()),
        is_truncated: response.is_truncated().unwrap_or(false),
        next_key_marker: response.next_key_marker().map(str::to_string),
        next_upload_id_marker: response.next_upload_id_marker().map(str::to_string),
    })
}
