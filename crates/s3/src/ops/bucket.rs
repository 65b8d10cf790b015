//! Bucket operations

use aws_sdk_s3::types::{
    Bucket as SdkBucket, BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration,
};

use s3kit_core::Result;
use s3kit_core::model::*;

use crate::client::S3Client;
use crate::convert;
use crate::error::sdk_error;

fn bucket_from_sdk(bucket: &SdkBucket) -> Bucket {
    Bucket {
        name: bucket.name().unwrap_or_default().to_string(),
        creation_date: convert::opt_timestamp(bucket.creation_date()),
    }
}

/// Location constraint sent on create; `None` keeps the default region
fn bucket_configuration(request: &CreateBucketRequest) -> Option<CreateBucketConfiguration> {
    request.effective_location().map(|region| {
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build()
    })
}

pub(crate) async fn list_buckets(
    client: &S3Client,
    _request: ListBucketsRequest,
) -> Result<ListBucketsOutput> {
    let response = client
        .inner
        .list_buckets()
        .send()
        .await
        .map_err(|e| sdk_error(e, "buckets"))?;

    Ok(ListBucketsOutput {
        buckets: response.buckets().iter().map(bucket_from_sdk).collect(),
        owner: convert::owner(response.owner()),
    })
}

pub(crate) async fn create_bucket(
    client: &S3Client,
    request: CreateBucketRequest,
) -> Result<CreateBucketOutput> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, "create bucket");

    let mut builder = client
        .inner
        .create_bucket()
        .bucket(&request.bucket)
        .set_create_bucket_configuration(bucket_configuration(&request));

    if let Some(acl) = request.acl {
        builder = builder.acl(BucketCannedAcl::from(acl.as_str()));
    }
    if request.object_lock_enabled {
        builder = builder.object_lock_enabled_for_bucket(true);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(CreateBucketOutput {
        location: response.location().map(str::to_string),
    })
}

pub(crate) async fn delete_bucket(client: &S3Client, request: DeleteBucketRequest) -> Result<()> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, "delete bucket");

    client
        .inner
        .delete_bucket()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn head_bucket(
    client: &S3Client,
    request: HeadBucketRequest,
) -> Result<HeadBucketOutput> {
    request.validate()?;

    let response = client
        .inner
        .head_bucket()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(HeadBucketOutput {
        region: response.bucket_region().map(str::to_string),
    })
}

pub(crate) async fn get_bucket_location(
    client: &S3Client,
    request: GetBucketLocationRequest,
) -> Result<GetBucketLocationOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_location()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(GetBucketLocationOutput::from_constraint(
        response.location_constraint().map(|c| c.as_str()),
    ))
}
