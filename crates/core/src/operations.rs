//! The operation table
//!
//! `for_each_operation!(m)` invokes `m!` once with every operation as
//! `name, name_callable, name_async => Request, Output;`. The blocking and
//! callback calling forms expand it, so all forms cover the same set.

macro_rules! for_each_operation {
    ($callback:ident) => {
        $callback! {
            list_buckets, list_buckets_callable, list_buckets_async
                => ListBucketsRequest, ListBucketsOutput;
            create_bucket, create_bucket_callable, create_bucket_async
                => CreateBucketRequest, CreateBucketOutput;
            delete_bucket, delete_bucket_callable, delete_bucket_async
                => DeleteBucketRequest, ();
            head_bucket, head_bucket_callable, head_bucket_async
                => HeadBucketRequest, HeadBucketOutput;
            get_bucket_location, get_bucket_location_callable, get_bucket_location_async
                => GetBucketLocationRequest, GetBucketLocationOutput;

            get_object, get_object_callable, get_object_async
                => GetObjectRequest, GetObjectOutput;
            put_object, put_object_callable, put_object_async
                => PutObjectRequest, PutObjectOutput;
            head_object, head_object_callable, head_object_async
                => HeadObjectRequest, HeadObjectOutput;
            delete_object, delete_object_callable, delete_object_async
                => DeleteObjectRequest, DeleteObjectOutput;
            delete_objects, delete_objects_callable, delete_objects_async
                => DeleteObjectsRequest, DeleteObjectsOutput;
            copy_object, copy_object_callable, copy_object_async
                => CopyObjectRequest, CopyObjectOutput;
            list_objects_v2, list_objects_v2_callable, list_objects_v2_async
                => ListObjectsV2Request, ListObjectsV2Output;
            list_object_versions, list_object_versions_callable, list_object_versions_async
                => ListObjectVersionsRequest, ListObjectVersionsOutput;
            restore_object, restore_object_callable, restore_object_async
                => RestoreObjectRequest, RestoreObjectOutput;

            create_multipart_upload, create_multipart_upload_callable, create_multipart_upload_async
                => CreateMultipartUploadRequest, CreateMultipartUploadOutput;
            upload_part, upload_part_callable, upload_part_async
                => UploadPartRequest, UploadPartOutput;
            upload_part_copy, upload_part_copy_callable, upload_part_copy_async
                => UploadPartCopyRequest, UploadPartCopyOutput;
            complete_multipart_upload, complete_multipart_upload_callable, complete_multipart_upload_async
                => CompleteMultipartUploadRequest, CompleteMultipartUploadOutput;
            abort_multipart_upload, abort_multipart_upload_callable, abort_multipart_upload_async
                => AbortMultipartUploadRequest, ();
            list_parts, list_parts_callable, list_parts_async
                => ListPartsRequest, ListPartsOutput;
            list_multipart_uploads, list_multipart_uploads_callable, list_multipart_uploads_async
                => ListMultipartUploadsRequest, ListMultipartUploadsOutput;

            get_bucket_acl, get_bucket_acl_callable, get_bucket_acl_async
                => GetBucketAclRequest, GetBucketAclOutput;
            put_bucket_acl, put_bucket_acl_callable, put_bucket_acl_async
                => PutBucketAclRequest, ();
            get_object_acl, get_object_acl_callable, get_object_acl_async
                => GetObjectAclRequest, GetObjectAclOutput;
            put_object_acl, put_object_acl_callable, put_object_acl_async
                => PutObjectAclRequest, ();
            get_bucket_policy, get_bucket_policy_callable, get_bucket_policy_async
                => GetBucketPolicyRequest, GetBucketPolicyOutput;
            put_bucket_policy, put_bucket_policy_callable, put_bucket_policy_async
                => PutBucketPolicyRequest, ();
            delete_bucket_policy, delete_bucket_policy_callable, delete_bucket_policy_async
                => DeleteBucketPolicyRequest, ();

            get_bucket_versioning, get_bucket_versioning_callable, get_bucket_versioning_async
                => GetBucketVersioningRequest, GetBucketVersioningOutput;
            put_bucket_versioning, put_bucket_versioning_callable, put_bucket_versioning_async
                => PutBucketVersioningRequest, ();
            get_bucket_tagging, get_bucket_tagging_callable, get_bucket_tagging_async
                => GetBucketTaggingRequest, GetBucketTaggingOutput;
            put_bucket_tagging, put_bucket_tagging_callable, put_bucket_tagging_async
                => PutBucketTaggingRequest, ();
            delete_bucket_tagging, delete_bucket_tagging_callable, delete_bucket_tagging_async
                => DeleteBucketTaggingRequest, ();
            get_object_tagging, get_object_tagging_callable, get_object_tagging_async
                => GetObjectTaggingRequest, GetObjectTaggingOutput;
            put_object_tagging, put_object_tagging_callable, put_object_tagging_async
                => PutObjectTaggingRequest, PutObjectTaggingOutput;
            delete_object_tagging, delete_object_tagging_callable, delete_object_tagging_async
                => DeleteObjectTaggingRequest, DeleteObjectTaggingOutput;
            get_bucket_lifecycle_configuration, get_bucket_lifecycle_configuration_callable,
                get_bucket_lifecycle_configuration_async
                => GetBucketLifecycleConfigurationRequest, GetBucketLifecycleConfigurationOutput;
            put_bucket_lifecycle_configuration, put_bucket_lifecycle_configuration_callable,
                put_bucket_lifecycle_configuration_async
                => PutBucketLifecycleConfigurationRequest, ();
            delete_bucket_lifecycle, delete_bucket_lifecycle_callable, delete_bucket_lifecycle_async
                => DeleteBucketLifecycleRequest, ();
            get_bucket_encryption, get_bucket_encryption_callable, get_bucket_encryption_async
                => GetBucketEncryptionRequest, GetBucketEncryptionOutput;
            put_bucket_encryption, put_bucket_encryption_callable, put_bucket_encryption_async
                => PutBucketEncryptionRequest, ();
            delete_bucket_encryption, delete_bucket_encryption_callable, delete_bucket_encryption_async
                => DeleteBucketEncryptionRequest, ();
            get_bucket_replication, get_bucket_replication_callable, get_bucket_replication_async
                => GetBucketReplicationRequest, GetBucketReplicationOutput;
            put_bucket_replication, put_bucket_replication_callable, put_bucket_replication_async
                => PutBucketReplicationRequest, ();
            delete_bucket_replication, delete_bucket_replication_callable, delete_bucket_replication_async
                => DeleteBucketReplicationRequest, ();
            get_bucket_cors, get_bucket_cors_callable, get_bucket_cors_async
                => GetBucketCorsRequest, GetBucketCorsOutput;
            put_bucket_cors, put_bucket_cors_callable, put_bucket_cors_async
                => PutBucketCorsRequest, ();
            delete_bucket_cors, delete_bucket_cors_callable, delete_bucket_cors_async
                => DeleteBucketCorsRequest, ();

            select_object_content, select_object_content_callable, select_object_content_async
                => SelectObjectContentRequest, SelectObjectContentOutput;
            presign, presign_callable, presign_async
                => PresignRequest, PresignedUrl;
        }
    };
}

pub(crate) use for_each_operation;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    macro_rules! operation_names {
        ($($op:ident, $callable:ident, $async_op:ident => $req:ty, $out:ty;)*) => {
            &[$((stringify!($op), stringify!($callable), stringify!($async_op))),*]
        };
    }

    const NAMES: &[(&str, &str, &str)] = for_each_operation!(operation_names);

    #[test]
    fn test_operation_table_is_consistent() {
        assert_eq!(NAMES.len(), 50);

        let mut seen = HashSet::new();
        for (op, callable, async_op) in NAMES {
            assert!(seen.insert(*op), "{op} listed twice");
            assert_eq!(*callable, format!("{op}_callable"));
            assert_eq!(*async_op, format!("{op}_async"));
        }
    }
}
