//! Bucket and object tagging

use aws_sdk_s3::types::{Tag as SdkTag, Tagging};

use s3kit_core::model::*;
use s3kit_core::Result;

use crate::client::S3Client;
use crate::error::{build_error, sdk_error, service_code};

fn tags_from_sdk(tags: &[SdkTag]) -> Vec<Tag> {
    tags.iter()
        .map(|t| Tag::new(t.key(), t.value()))
        .collect()
}

fn tagging_to_sdk(tags: &[Tag]) -> Result<Tagging> {
    let tag_set = tags
        .iter()
        .map(|t| {
            SdkTag::builder()
                .key(&t.key)
                .value(&t.value)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()?;

    Tagging::builder()
        .set_tag_set(Some(tag_set))
        .build()
        .map_err(build_error)
}

/// Service codes meaning a bucket has no tag set at all
fn missing_tag_set(code: Option<&str>) -> bool {
    matches!(code, Some("NoSuchTagSet" | "NoSuchTagSetError"))
}

/// A bucket with no tag set reports an error; treat it as having no tags
pub(crate) async fn get_bucket_tagging(
    client: &S3Client,
    request: GetBucketTaggingRequest,
) -> Result<GetBucketTaggingOutput> {
    request.validate()?;

    let outcome = client
        .inner
        .get_bucket_tagging()
        .bucket(&request.bucket)
        .send()
        .await;

    match outcome {
        Ok(response) => Ok(GetBucketTaggingOutput {
            tags: tags_from_sdk(response.tag_set()),
        }),
        Err(e) if missing_tag_set(service_code(&e)) => Ok(GetBucketTaggingOutput::default()),
        Err(e) => Err(sdk_error(e, &request.bucket)),
    }
}

pub(crate) async fn put_bucket_tagging(
    client: &S3Client,
    request: PutBucketTaggingRequest,
) -> Result<()> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, count = request.tags.len(), "put bucket tagging");

    client
        .inner
        .put_bucket_tagging()
        .bucket(&request.bucket)
        .tagging(tagging_to_sdk(&request.tags)?)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn delete_bucket_tagging(
    client: &S3Client,
    request: DeleteBucketTaggingRequest,
) -> Result<()> {
    request.validate()?;

    client
        .inner
        .delete_bucket_tagging()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn get_object_tagging(
    client: &S3Client,
    request: GetObjectTaggingRequest,
) -> Result<GetObjectTaggingOutput> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);

    let response = client
        .inner
        .get_object_tagging()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(GetObjectTaggingOutput {
        tags: tags_from_sdk(response.tag_set()),
        version_id: response.version_id().map(str::to_string),
    })
}

pub(crate) async fn put_object_tagging(
    client: &S3Client,
    request: PutObjectTaggingRequest,
) -> Result<PutObjectTaggingOutput> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);
    tracing::debug!(object = %resource, count = request.tags.len(), "put object tagging");

    let response = client
        .inner
        .put_object_tagging()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id.clone())
        .tagging(tagging_to_sdk(&request.tags)?)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(PutObjectTaggingOutput {
        version_id: response.version_id().map(str::to_string),
    })
}

pub(crate) async fn delete_object_tagging(
    client: &S3Client,
    request: DeleteObjectTaggingRequest,
) -> Result<DeleteObjectTaggingOutput> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);

    let response = client
        .inner
        .delete_object_tagging()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(DeleteObjectTaggingOutput {
        version_id: response.version_id().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3kit_core::Error;

    #[test]
    fn test_tagging_conversion() {
        let tags = vec![Tag::new("env", "prod"), Tag::new("team", "storage")];
        let sdk = tagging_to_sdk(&tags).unwrap();
        assert_eq!(tags_from_sdk(sdk.tag_set()), tags);
    }

    #[test]
    fn test_missing_tag_set_codes() {
        assert!(missing_tag_set(Some("NoSuchTagSet")));
        assert!(missing_tag_set(Some("NoSuchTagSetError")));
        assert!(!missing_tag_set(Some("NoSuchBucket")));
        assert!(!missing_tag_set(None));
    }

    #[test]
    fn test_missing_tag_set_survives_error_classification() {
        use aws_sdk_s3::error::ErrorMetadata;
        use aws_sdk_s3::operation::get_bucket_tagging::GetBucketTaggingError;

        let failure = |code: &str| {
            let meta = ErrorMetadata::builder()
                .code(code)
                .message("The TagSet does not exist")
                .build();
            crate::error::service_failure(GetBucketTaggingError::generic(meta), 404)
        };

        let err = failure("NoSuchTagSet");
        assert!(missing_tag_set(service_code(&err)));

        let err = failure("NoSuchBucket");
        assert!(!missing_tag_set(service_code(&err)));
        assert!(matches!(sdk_error(err, "bucket"), Error::NotFound(_)));
    }

    #[test]
    fn test_empty_tag_set_is_allowed() {
        let sdk = tagging_to_sdk(&[]).unwrap();
        assert!(sdk.tag_set().is_empty());
    }
}
