//! aws-sdk-s3 backed operations
//!
//! Each submodule holds the free functions for one family of operations;
//! this module binds them to the [`S3Api`] trait.

mod acl;
mod bucket;
mod bucket_config;
mod multipart;
mod object;
mod tagging;

use async_trait::async_trait;

use s3kit_core::model::*;
use s3kit_core::{Result, S3Api};

use crate::client::S3Client;

#[async_trait]
impl S3Api for S3Client {
    async fn list_buckets(&self, request: ListBucketsRequest) -> Result<ListBucketsOutput> {
        bucket::list_buckets(self, request).await
    }

    async fn create_bucket(&self, request: CreateBucketRequest) -> Result<CreateBucketOutput> {
        bucket::create_bucket(self, request).await
    }

    async fn delete_bucket(&self, request: DeleteBucketRequest) -> Result<()> {
        bucket::delete_bucket(self, request).await
    }

    async fn head_bucket(&self, request: HeadBucketRequest) -> Result<HeadBucketOutput> {
        bucket::head_bucket(self, request).await
    }

    async fn get_bucket_location(
        &self,
        request: GetBucketLocationRequest,
    ) -> Result<GetBucketLocationOutput> {
        bucket::get_bucket_location(self, request).await
    }

    async fn get_object(&self, request: GetObjectRequest) -> Result<GetObjectOutput> {
        object::get_object(self, request).await
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<PutObjectOutput> {
        object::put_object(self, request).await
    }

    async fn head_object(&self, request: HeadObjectRequest) -> Result<HeadObjectOutput> {
        object::head_object(self, request).await
    }

    async fn delete_object(&self, request: DeleteObjectRequest) -> Result<DeleteObjectOutput> {
        object::delete_object(self, request).await
    }

    async fn delete_objects(&self, request: DeleteObjectsRequest) -> Result<DeleteObjectsOutput> {
        object::delete_objects(self, request).await
    }

    async fn copy_object(&self, request: CopyObjectRequest) -> Result<CopyObjectOutput> {
        object::copy_object(self, request).await
    }

    async fn list_objects_v2(&self, request: ListObjectsV2Request) -> Result<ListObjectsV2Output> {
        object::list_objects_v2(self, request).await
    }

    async fn list_object_versions(
        &self,
        request: ListObjectVersionsRequest,
    ) -> Result<ListObjectVersionsOutput> {
        object::list_object_versions(self, request).await
    }

    async fn restore_object(&self, request: RestoreObjectRequest) -> Result<RestoreObjectOutput> {
        object::restore_object(self, request).await
    }

    async fn create_multipart_upload(
        &self,
        request: CreateMultipartUploadRequest,
    ) -> Result<CreateMultipartUploadOutput> {
        multipart::create_multipart_upload(self, request).await
    }

    async fn upload_part(&self, request: UploadPartRequest) -> Result<UploadPartOutput> {
        multipart::upload_part(self, request).await
    }

    async fn upload_part_copy(
        &self,
        request: UploadPartCopyRequest,
    ) -> Result<UploadPartCopyOutput> {
        multipart::upload_part_copy(self, request).await
    }

    async fn complete_multipart_upload(
        &self,
        request: CompleteMultipartUploadRequest,
    ) -> Result<CompleteMultipartUploadOutput> {
        multipart::complete_multipart_upload(self, request).await
    }

    async fn abort_multipart_upload(&self, request: AbortMultipartUploadRequest) -> Result<()> {
        multipart::abort_multipart_upload(self, request).await
    }

    async fn list_parts(&self, request: ListPartsRequest) -> Result<ListPartsOutput> {
        multipart::list_parts(self, request).await
    }

    async fn list_multipart_uploads(
        &self,
        request: ListMultipartUploadsRequest,
    ) -> Result<ListMultipartUploadsOutput> {
        multipart::list_multipart_uploads(self, request).await
    }

    async fn get_bucket_acl(&self, request: GetBucketAclRequest) -> Result<GetBucketAclOutput> {
        acl::get_bucket_acl(self, request).await
    }

    async fn put_bucket_acl(&self, request: PutBucketAclRequest) -> Result<()> {
        acl::put_bucket_acl(self, request).await
    }

    async fn get_object_acl(&self, request: GetObjectAclRequest) -> Result<GetObjectAclOutput> {
        acl::get_object_acl(self, request).await
    }

    async fn put_object_acl(&self, request: PutObjectAclRequest) -> Result<()> {
        acl::put_object_acl(self, request).await
    }

    async fn get_bucket_policy(
        &self,
        request: GetBucketPolicyRequest,
    ) -> Result<GetBucketPolicyOutput> {
        bucket_config::get_bucket_policy(self, request).await
    }

    async fn put_bucket_policy(&self, request: PutBucketPolicyRequest) -> Result<()> {
        bucket_config::put_bucket_policy(self, request).await
    }

    async fn delete_bucket_policy(&self, request: DeleteBucketPolicyRequest) -> Result<()> {
        bucket_config::delete_bucket_policy(self, request).await
    }

    async fn get_bucket_versioning(
        &self,
        request: GetBucketVersioningRequest,
    ) -> Result<GetBucketVersioningOutput> {
        bucket_config::get_bucket_versioning(self, request).await
    }

    async fn put_bucket_versioning(&self, request: PutBucketVersioningRequest) -> Result<()> {
        bucket_config::put_bucket_versioning(self, request).await
    }

    async fn get_bucket_tagging(
        &self,
        request: GetBucketTaggingRequest,
    ) -> Result<GetBucketTaggingOutput> {
        tagging::get_bucket_tagging(self, request).await
    }

    async fn put_bucket_tagging(&self, request: PutBucketTaggingRequest) -> Result<()> {
        tagging::put_bucket_tagging(self, request).await
    }

    async fn delete_bucket_tagging(&self, request: DeleteBucketTaggingRequest) -> Result<()> {
        tagging::delete_bucket_tagging(self, request).await
    }

    async fn get_object_tagging(
        &self,
        request: GetObjectTaggingRequest,
    ) -> Result<GetObjectTaggingOutput> {
        tagging::get_object_tagging(self, request).await
    }

    async fn put_object_tagging(
        &self,
        request: PutObjectTaggingRequest,
    ) -> Result<PutObjectTaggingOutput> {
        tagging::put_object_tagging(self, request).await
    }

    async fn delete_object_tagging(
        &self,
        request: DeleteObjectTaggingRequest,
    ) -> Result<DeleteObjectTaggingOutput> {
        tagging::delete_object_tagging(self, request).await
    }

    async fn get_bucket_lifecycle_configuration(
        &self,
        request: GetBucketLifecycleConfigurationRequest,
    ) -> Result<GetBucketLifecycleConfigurationOutput> {
        bucket_config::get_bucket_lifecycle_configuration(self, request).await
    }

    async fn put_bucket_lifecycle_configuration(
        &self,
        request: PutBucketLifecycleConfigurationRequest,
    ) -> Result<()> {
        bucket_config::put_bucket_lifecycle_configuration(self, request).await
    }

    async fn delete_bucket_lifecycle(&self, request: DeleteBucketLifecycleRequest) -> Result<()> {
        bucket_config::delete_bucket_lifecycle(self, request).await
    }

    async fn get_bucket_encryption(
        &self,
        request: GetBucketEncryptionRequest,
    ) -> Result<GetBucketEncryptionOutput> {
        bucket_config::get_bucket_encryption(self, request).await
    }

    async fn put_bucket_encryption(&self, request: PutBucketEncryptionRequest) -> Result<()> {
        bucket_config::put_bucket_encryption(self, request).await
    }

    async fn delete_bucket_encryption(&self, request: DeleteBucketEncryptionRequest) -> Result<()> {
        bucket_config::delete_bucket_encryption(self, request).await
    }

    async fn get_bucket_replication(
        &self,
        request: GetBucketReplicationRequest,
    ) -> Result<GetBucketReplicationOutput> {
        bucket_config::get_bucket_replication(self, request).await
    }

    async fn put_bucket_replication(&self, request: PutBucketReplicationRequest) -> Result<()> {
        bucket_config::put_bucket_replication(self, request).await
    }

    async fn delete_bucket_replication(
        &self,
        request: DeleteBucketReplicationRequest,
    ) -> Result<()> {
        bucket_config::delete_bucket_replication(self, request).await
    }

    async fn get_bucket_cors(&self, request: GetBucketCorsRequest) -> Result<GetBucketCorsOutput> {
        bucket_config::get_bucket_cors(self, request).await
    }

    async fn put_bucket_cors(&self, request: PutBucketCorsRequest) -> Result<()> {
        bucket_config::put_bucket_cors(self, request).await
    }

    async fn delete_bucket_cors(&self, request: DeleteBucketCorsRequest) -> Result<()> {
        bucket_config::delete_bucket_cors(self, request).await
    }

    async fn select_object_content(
        &self,
        request: SelectObjectContentRequest,
    ) -> Result<SelectObjectContentOutput> {
        crate::select::select_object_content(self, request).await
    }

    async fn presign(&self, request: PresignRequest) -> Result<PresignedUrl> {
        crate::presign::presign(self, request).await
    }
}
