//! S3Api trait definition
//!
//! One async method per S3 operation. This is the future-based calling form;
//! the blocking and callback forms in [`crate::blocking`] and
//! [`crate::callback`] are layered on top of it.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::*;

/// Trait for S3 operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
/// Requests are taken by value so that the returned futures are `'static`
/// friendly and can be moved onto an executor.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait S3Api: Send + Sync {
    // Buckets

    async fn list_buckets(&self, request: ListBucketsRequest) -> Result<ListBucketsOutput>;

    async fn create_bucket(&self, request: CreateBucketRequest) -> Result<CreateBucketOutput>;

    /// The bucket must be empty
    async fn delete_bucket(&self, request: DeleteBucketRequest) -> Result<()>;

    /// Succeeds when the bucket exists and is accessible
    async fn head_bucket(&self, request: HeadBucketRequest) -> Result<HeadBucketOutput>;

    async fn get_bucket_location(
        &self,
        request: GetBucketLocationRequest,
    ) -> Result<GetBucketLocationOutput>;

    // Objects

    /// Download an object (or a range of it) into memory
    async fn get_object(&self, request: GetObjectRequest) -> Result<GetObjectOutput>;

    async fn put_object(&self, request: PutObjectRequest) -> Result<PutObjectOutput>;

    async fn head_object(&self, request: HeadObjectRequest) -> Result<HeadObjectOutput>;

    /// Deleting a missing key succeeds
    async fn delete_object(&self, request: DeleteObjectRequest) -> Result<DeleteObjectOutput>;

    /// Batch delete; per-key failures are reported in the output, not as an error
    async fn delete_objects(&self, request: DeleteObjectsRequest) -> Result<DeleteObjectsOutput>;

    /// Server-side copy of objects up to 5 GiB
    async fn copy_object(&self, request: CopyObjectRequest) -> Result<CopyObjectOutput>;

    async fn list_objects_v2(&self, request: ListObjectsV2Request) -> Result<ListObjectsV2Output>;

    async fn list_object_versions(
        &self,
        request: ListObjectVersionsRequest,
    ) -> Result<ListObjectVersionsOutput>;

    /// Start restoring an archived object
    async fn restore_object(&self, request: RestoreObjectRequest) -> Result<RestoreObjectOutput>;

    // Multipart uploads

    async fn create_multipart_upload(
        &self,
        request: CreateMultipartUploadRequest,
    ) -> Result<CreateMultipartUploadOutput>;

    async fn upload_part(&self, request: UploadPartRequest) -> Result<UploadPartOutput>;

    async fn upload_part_copy(&self, request: UploadPartCopyRequest)
    -> Result<UploadPartCopyOutput>;

    async fn complete_multipart_upload(
        &self,
        request: CompleteMultipartUploadRequest,
    ) -> Result<CompleteMultipartUploadOutput>;

    async fn abort_multipart_upload(&self, request: AbortMultipartUploadRequest) -> Result<()>;

    async fn list_parts(&self, request: ListPartsRequest) -> Result<ListPartsOutput>;

    async fn list_multipart_uploads(
        &self,
        request: ListMultipartUploadsRequest,
    ) -> Result<ListMultipartUploadsOutput>;

    // Access control

    async fn get_bucket_acl(&self, request: GetBucketAclRequest) -> Result<GetBucketAclOutput>;

    async fn put_bucket_acl(&self, request: PutBucketAclRequest) -> Result<()>;

    async fn get_object_acl(&self, request: GetObjectAclRequest) -> Result<GetObjectAclOutput>;

    async fn put_object_acl(&self, request: PutObjectAclRequest) -> Result<()>;

    async fn get_bucket_policy(
        &self,
        request: GetBucketPolicyRequest,
    ) -> Result<GetBucketPolicyOutput>;

    async fn put_bucket_policy(&self, request: PutBucketPolicyRequest) -> Result<()>;

    async fn delete_bucket_policy(&self, request: DeleteBucketPolicyRequest) -> Result<()>;

    // Bucket configuration

    async fn get_bucket_versioning(
        &self,
        request: GetBucketVersioningRequest,
    ) -> Result<GetBucketVersioningOutput>;

    async fn put_bucket_versioning(&self, request: PutBucketVersioningRequest) -> Result<()>;

    async fn get_bucket_tagging(
        &self,
        request: GetBucketTaggingRequest,
    ) -> Result<GetBucketTaggingOutput>;

    async fn put_bucket_tagging(&self, request: PutBucketTaggingRequest) -> Result<()>;

    async fn delete_bucket_tagging(&self, request: DeleteBucketTaggingRequest) -> Result<()>;

    async fn get_object_tagging(
        &self,
        request: GetObjectTaggingRequest,
    ) -> Result<GetObjectTaggingOutput>;

    async fn put_object_tagging(
        &self,
        request: PutObjectTaggingRequest,
    ) -> Result<PutObjectTaggingOutput>;

    async fn delete_object_tagging(
        &self,
        request: DeleteObjectTaggingRequest,
    ) -> Result<DeleteObjectTaggingOutput>;

    async fn get_bucket_lifecycle_configuration(
        &self,
        request: GetBucketLifecycleConfigurationRequest,
    ) -> Result<GetBucketLifecycleConfigurationOutput>;

    async fn put_bucket_lifecycle_configuration(
        &self,
        request: PutBucketLifecycleConfigurationRequest,
    ) -> Result<()>;

    async fn delete_bucket_lifecycle(&self, request: DeleteBucketLifecycleRequest) -> Result<()>;

    async fn get_bucket_encryption(
        &self,
        request: GetBucketEncryptionRequest,
    ) -> Result<GetBucketEncryptionOutput>;

    async fn put_bucket_encryption(&self, request: PutBucketEncryptionRequest) -> Result<()>;

    async fn delete_bucket_encryption(&self, request: DeleteBucketEncryptionRequest)
    -> Result<()>;

    async fn get_bucket_replication(
        &self,
        request: GetBucketReplicationRequest,
    ) -> Result<GetBucketReplicationOutput>;

    async fn put_bucket_replication(&self, request: PutBucketReplicationRequest) -> Result<()>;

    async fn delete_bucket_replication(
        &self,
        request: DeleteBucketReplicationRequest,
    ) -> Result<()>;

    async fn get_bucket_cors(&self, request: GetBucketCorsRequest) -> Result<GetBucketCorsOutput>;

    async fn put_bucket_cors(&self, request: PutBucketCorsRequest) -> Result<()>;

    async fn delete_bucket_cors(&self, request: DeleteBucketCorsRequest) -> Result<()>;

    // Query and URLs

    /// Run an S3 Select query and collect the full result
    async fn select_object_content(
        &self,
        request: SelectObjectContentRequest,
    ) -> Result<SelectObjectContentOutput>;

    /// Build a presigned URL; no request is sent
    async fn presign(&self, request: PresignRequest) -> Result<PresignedUrl>;
}
