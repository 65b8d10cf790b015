//! Multipart upload operations

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::tagging::{MAX_OBJECT_TAGS, validate_tags};
use super::{
    ByteRange, CannedAcl, CustomerKey, ObjectBody, ServerSideEncryption, StorageClass, Tag,
    UserMetadata, ensure, validate_key,
};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

pub const MIN_PART_NUMBER: i32 = 1;
pub const MAX_PART_NUMBER: i32 = 10_000;

/// Smallest part size S3 accepts for every part but the last
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Largest part size S3 accepts
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

pub fn validate_part_number(part_number: i32) -> Result<()> {
    ensure(
        (MIN_PART_NUMBER..=MAX_PART_NUMBER).contains(&part_number),
        || format!("part number must be between {MIN_PART_NUMBER} and {MAX_PART_NUMBER}, got {part_number}"),
    )
}

fn validate_upload_id(upload_id: &str) -> Result<()> {
    ensure(!upload_id.is_empty(), || "upload id cannot be empty".into())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
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

impl CreateMultipartUploadRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_tags(&self.tags, MAX_OBJECT_TAGS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMultipartUploadOutput {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPartRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number: i32,
    pub body: ObjectBody,
    /// Must match the key given when the upload was created (SSE-C)
    pub customer_key: Option<CustomerKey>,
}

impl UploadPartRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_upload_id(&self.upload_id)?;
        validate_part_number(self.part_number)?;
        if let Some(len) = self.body.known_len() {
            ensure(len <= MAX_PART_SIZE, || {
                format!("part {} is {len} bytes, the limit is {MAX_PART_SIZE}", self.part_number)
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPartOutput {
    pub part_number: i32,
    pub etag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPartCopyRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number: i32,
    pub source_bucket: String,
    pub source_key: String,
    pub source_version_id: Option<String>,
    /// Whole source object when `None`; only [`ByteRange::Range`] is accepted
    pub source_range: Option<ByteRange>,
}

impl UploadPartCopyRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_upload_id(&self.upload_id)?;
        validate_part_number(self.part_number)?;
        validate_bucket_name(&self.source_bucket)?;
        validate_key(&self.source_key)?;
        if let Some(range) = &self.source_range {
            range.validate()?;
            ensure(matches!(range, ByteRange::Range { .. }), || {
                "copy source ranges must give both start and end".into()
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPartCopyOutput {
    pub part_number: i32,
    pub etag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

/// A finished part, as reported to CompleteMultipartUpload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    pub part_number: i32,
    pub etag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub parts: Vec<CompletedPart>,
}

impl CompleteMultipartUploadRequest {
    pub fn validate(&self) -> Result<()> {
        self.sorted_parts().map(|_| ())
    }

    /// Parts in ascending part-number order, as S3 requires
    pub fn sorted_parts(&self) -> Result<Vec<CompletedPart>> {
        validate_key(&self.key)?;
        validate_upload_id(&self.upload_id)?;
        ensure(!self.parts.is_empty(), || "cannot complete an upload with no parts".into())?;

        let mut seen = HashSet::new();
        for part in &self.parts {
            validate_part_number(part.part_number)?;
            ensure(seen.insert(part.part_number), || {
                format!("part {} listed twice", part.part_number)
            })?;
            ensure(!part.etag.is_empty(), || {
                format!("part {} has no etag", part.part_number)
            })?;
        }

        let mut parts = self.parts.clone();
        parts.sort_by_key(|p| p.part_number);
        Ok(parts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteMultipartUploadOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbortMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

impl AbortMultipartUploadRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_upload_id(&self.upload_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPartsRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub max_parts: Option<i32>,
    pub part_number_marker: Option<i32>,
}

impl ListPartsRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_upload_id(&self.upload_id)?;
        if let Some(max) = self.max_parts {
            ensure((1..=1000).contains(&max), || {
                format!("max parts must be between 1 and 1000, got {max}")
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub part_number: i32,
    pub etag: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPartsOutput {
    pub parts: Vec<Part>,
    pub is_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_part_number_marker: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMultipartUploadsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub key_marker: Option<String>,
    pub upload_id_marker: Option<String>,
    pub max_uploads: Option<i32>,
}

impl ListMultipartUploadsRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        if let Some(max) = self.max_uploads {
            ensure((1..=1000).contains(&max), || {
                format!("max uploads must be between 1 and 1000, got {max}")
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartUpload {
    pub key: String,
    pub upload_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMultipartUploadsOutput {
    pub uploads: Vec<MultipartUpload>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_key_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_upload_id_marker: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(parts: Vec<(i32, &str)>) -> CompleteMultipartUploadRequest {
        CompleteMultipartUploadRequest {
            bucket: "bucket".into(),
            key: "big.bin".into(),
            upload_id: "upload-1".into(),
            parts: parts
                .into_iter()
                .map(|(n, e)| CompletedPart {
                    part_number: n,
                    etag: e.into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_part_number_bounds() {
        assert!(validate_part_number(0).is_err());
        assert!(validate_part_number(1).is_ok());
        assert!(validate_part_number(10_000).is_ok());
        assert!(validate_part_number(10_001).is_err());
    }

    #[test]
    fn test_sorted_parts() {
        let req = complete(vec![(3, "c"), (1, "a"), (2, "b")]);
        let numbers: Vec<i32> = req.sorted_parts().unwrap().iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_complete_rejects_bad_parts() {
        assert!(complete(vec![]).validate().is_err());
        assert!(complete(vec![(1, "a"), (1, "b")]).validate().is_err());
        assert!(complete(vec![(1, "")]).validate().is_err());
        assert!(complete(vec![(0, "a")]).validate().is_err());
    }

    #[test]
    fn test_upload_part_copy_range() {
        let mut req = UploadPartCopyRequest {
            bucket: "dst".into(),
            key: "k".into(),
            upload_id: "u".into(),
            part_number: 1,
            source_bucket: "src".into(),
            source_key: "s".into(),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        req.source_range = Some(ByteRange::Suffix { length: 10 });
        assert!(req.validate().is_err());
        req.source_range = Some(ByteRange::Range { start: 0, end: 9 });
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_upload_part_requires_upload_id() {
        let req = UploadPartRequest {
            bucket: "bucket".into(),
            key: "k".into(),
            part_number: 1,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
