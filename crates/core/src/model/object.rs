//! Object operations

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::tagging::{MAX_OBJECT_TAGS, validate_tags};
use super::{
    ByteRange, CannedAcl, CustomerKey, ObjectBody, ObjectRequest, Owner, ServerSideEncryption,
    StorageClass, Tag, UserMetadata, ensure, validate_key,
};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

/// Maximum number of keys in a single DeleteObjects request
pub const MAX_DELETE_KEYS: usize = 1000;

/// Maximum page size for list operations
pub const MAX_LIST_KEYS: i32 = 1000;

fn validate_max_keys(max_keys: Option<i32>) -> Result<()> {
    match max_keys {
        Some(n) => ensure((1..=MAX_LIST_KEYS).contains(&n), || {
            format!("max keys must be between 1 and {MAX_LIST_KEYS}, got {n}")
        }),
        None => Ok(()),
    }
}

/// Metadata describing a stored object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_length: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_range: Option<String>,
    /// ETag with surrounding quotes removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    /// Archive restore status (`x-amz-restore`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<String>,
    #[serde(default)]
    pub delete_marker: bool,
    #[serde(default, skip_serializing_if = "UserMetadata::is_empty")]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub range: Option<ByteRange>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub customer_key: Option<CustomerKey>,
}

impl GetObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        if let Some(range) = &self.range {
            range.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetObjectOutput {
    #[serde(skip)]
    pub body: Vec<u8>,
    pub metadata: ObjectMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: ObjectBody,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    pub metadata: UserMetadata,
    pub acl: Option<CannedAcl>,
    pub storage_class: Option<StorageClass>,
    pub encryption: Option<ServerSideEncryption>,
    pub tags: Vec<Tag>,
}

impl PutObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, body: impl Into<ObjectBody>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_tags(&self.tags, MAX_OBJECT_TAGS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutObjectOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub customer_key: Option<CustomerKey>,
}

impl HeadObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)
    }
}

pub type HeadObjectOutput = ObjectMetadata;

pub type DeleteObjectRequest = ObjectRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObjectOutput {
    /// Whether the delete created (or removed) a delete marker
    #[serde(default)]
    pub delete_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Object (and optional version) named in a batch delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectIdentifier {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl ObjectIdentifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectsRequest {
    pub bucket: String,
    pub objects: Vec<ObjectIdentifier>,
    /// Only report failures
    pub quiet: bool,
}

impl DeleteObjectsRequest {
    pub fn from_keys<I, S>(bucket: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bucket: bucket.into(),
            objects: keys.into_iter().map(ObjectIdentifier::new).collect(),
            quiet: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure(!self.objects.is_empty(), || "no objects to delete".into())?;
        ensure(self.objects.len() <= MAX_DELETE_KEYS, || {
            format!(
                "{} objects in one delete, the limit is {MAX_DELETE_KEYS}",
                self.objects.len()
            )
        })?;
        self.objects.iter().try_for_each(|o| validate_key(&o.key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedObject {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default)]
    pub delete_marker: bool,
}

/// Per-key failure inside a successful DeleteObjects call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObjectError {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObjectsOutput {
    pub deleted: Vec<DeletedObject>,
    pub errors: Vec<DeleteObjectError>,
}

/// How CopyObject treats the source's metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataDirective {
    #[default]
    Copy,
    Replace,
}

impl MetadataDirective {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataDirective::Copy => "COPY",
            MetadataDirective::Replace => "REPLACE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyObjectRequest {
    pub source_bucket: String,
    pub source_key: String,
    pub source_version_id: Option<String>,
    pub bucket: String,
    pub key: String,
    pub metadata_directive: MetadataDirective,
    /// Replacement metadata, used with [`MetadataDirective::Replace`]
    pub metadata: UserMetadata,
    pub content_type: Option<String>,
    pub acl: Option<CannedAcl>,
    pub storage_class: Option<StorageClass>,
    pub encryption: Option<ServerSideEncryption>,
    /// Key the source object was encrypted with (SSE-C)
    pub source_customer_key: Option<CustomerKey>,
}

impl CopyObjectRequest {
    pub fn new(
        source_bucket: impl Into<String>,
        source_key: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            source_bucket: source_bucket.into(),
            source_key: source_key.into(),
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.source_bucket)?;
        validate_key(&self.source_key)?;
        validate_key(&self.key)?;

        // S3 rejects an in-place copy that changes nothing
        let in_place = self.source_bucket == self.bucket
            && self.source_key == self.key
            && self.source_version_id.is_none();
        let changes_something = self.metadata_directive == MetadataDirective::Replace
            || self.storage_class.is_some()
            || self.encryption.is_some();
        ensure(!in_place || changes_something, || {
            format!(
                "copying {}/{} onto itself requires replacing metadata, storage class or encryption",
                self.bucket, self.key
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyObjectOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsV2Request {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub max_keys: Option<i32>,
    pub continuation_token: Option<String>,
    pub start_after: Option<String>,
    pub fetch_owner: bool,
}

impl ListObjectsV2Request {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_keys(self.max_keys)
    }
}

/// One entry of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObjectsV2Output {
    pub contents: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_continuation_token: Option<String>,
    pub key_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectVersionsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
    pub max_keys: Option<i32>,
}

impl ListObjectVersionsRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_keys(self.max_keys)?;
        ensure(
            self.version_id_marker.is_none() || self.key_marker.is_some(),
            || "a version id marker requires a key marker".into(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMarker {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObjectVersionsOutput {
    pub versions: Vec<ObjectVersion>,
    pub delete_markers: Vec<DeleteMarker>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_key_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version_id_marker: Option<String>,
}

/// Retrieval speed for restoring an archived object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreTier {
    #[default]
    Standard,
    Bulk,
    Expedited,
}

impl RestoreTier {
    pub fn as_str(self) -> &'static str {
        match self {
            RestoreTier::Standard => "Standard",
            RestoreTier::Bulk => "Bulk",
            RestoreTier::Expedited => "Expedited",
        }
    }
}

impl std::str::FromStr for RestoreTier {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(RestoreTier::Standard),
            "bulk" => Ok(RestoreTier::Bulk),
            "expedited" => Ok(RestoreTier::Expedited),
            other => Err(crate::error::Error::InvalidArgument(format!(
                "unknown restore tier '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    /// Days the restored copy stays available
    pub days: i32,
    pub tier: RestoreTier,
}

impl RestoreObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, days: i32) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            days,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        ensure(self.days >= 1, || {
            format!("restore days must be at least 1, got {}", self.days)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreObjectOutput {
    /// Whether a restore of this object was already in progress
    #[serde(default)]
    pub already_in_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_output_path: Option<String>,
}

/// Strip the quotes S3 puts around ETags
pub fn normalize_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_objects_limits() {
        assert!(DeleteObjectsRequest::from_keys("bucket", Vec::<String>::new())
            .validate()
            .is_err());

        let keys: Vec<String> = (0..MAX_DELETE_KEYS).map(|i| format!("k{i}")).collect();
        assert!(DeleteObjectsRequest::from_keys("bucket", keys.clone()).validate().is_ok());

        let mut too_many = keys;
        too_many.push("one-more".into());
        assert!(DeleteObjectsRequest::from_keys("bucket", too_many).validate().is_err());
    }

    #[test]
    fn test_copy_onto_itself() {
        let mut req = CopyObjectRequest::new("bucket", "a.txt", "bucket", "a.txt");
        assert!(req.validate().is_err());

        req.metadata_directive = MetadataDirective::Replace;
        assert!(req.validate().is_ok());

        let req = CopyObjectRequest::new("bucket", "a.txt", "bucket", "b.txt");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_list_max_keys() {
        let mut req = ListObjectsV2Request::new("bucket");
        assert!(req.validate().is_ok());
        req.max_keys = Some(0);
        assert!(req.validate().is_err());
        req.max_keys = Some(1000);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_version_marker_requires_key_marker() {
        let mut req = ListObjectVersionsRequest::new("bucket");
        req.version_id_marker = Some("v1".into());
        assert!(req.validate().is_err());
        req.key_marker = Some("a".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_put_object_tag_limit() {
        let mut req = PutObjectRequest::new("bucket", "key", "data");
        req.tags = (0..=MAX_OBJECT_TAGS).map(|i| Tag::new(format!("k{i}"), "v")).collect();
        assert!(req.validate().is_err());
        req.tags.pop();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_restore_days() {
        assert!(RestoreObjectRequest::new("b", "k", 0).validate().is_err());
        assert!(RestoreObjectRequest::new("b", "k", 7).validate().is_ok());
        assert_eq!("BULK".parse::<RestoreTier>().unwrap(), RestoreTier::Bulk);
    }

    #[test]
    fn test_normalize_etag() {
        assert_eq!(normalize_etag("\"abc\""), "abc");
        assert_eq!(normalize_etag("abc"), "abc");
    }

    #[test]
    fn test_metadata_serializes_compactly() {
        let meta = ObjectMetadata {
            content_length: 3,
            etag: Some("abc".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["content_length"], 3);
        assert!(json.get("content_type").is_none());
        assert!(json.get("user_metadata").is_none());
    }
}
