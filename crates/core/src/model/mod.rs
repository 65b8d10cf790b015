//! Request and output types for every S3 operation
//!
//! Each operation has one request type and one output type. Operations that
//! only address a bucket (or a single object) share [`BucketRequest`] (or
//! [`ObjectRequest`]) through per-operation type aliases, so every operation
//! still has a name of its own. Types here are independent of any S3 SDK.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::s3url::validate_bucket_name;

pub mod acl;
pub mod bucket;
pub mod cors;
pub mod encryption;
pub mod lifecycle;
pub mod multipart;
pub mod object;
pub mod policy;
pub mod presign;
pub mod replication;
pub mod select;
pub mod tagging;
pub mod versioning;

pub use acl::*;
pub use bucket::*;
pub use cors::*;
pub use encryption::*;
pub use lifecycle::*;
pub use multipart::*;
pub use object::*;
pub use policy::*;
pub use presign::*;
pub use replication::*;
pub use select::*;
pub use tagging::*;
pub use versioning::*;

/// Maximum object key length in bytes
pub const MAX_KEY_LENGTH: usize = 1024;

/// User-defined object metadata (`x-amz-meta-*`)
pub type UserMetadata = BTreeMap<String, String>;

/// Fail with `InvalidArgument` unless `condition` holds
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidArgument(message()))
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    ensure(!key.is_empty(), || "object key cannot be empty".into())?;
    ensure(key.len() <= MAX_KEY_LENGTH, || {
        format!("object key is {} bytes, the limit is {MAX_KEY_LENGTH}", key.len())
    })
}

/// Request addressing a bucket only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketRequest {
    pub bucket: String,
}

impl BucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)
    }
}

/// Request addressing a single object (optionally a specific version)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl ObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }

    pub fn version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)
    }
}

/// A key/value tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Owner of a bucket or object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Canned access control list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    AwsExecRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
    LogDeliveryWrite,
}

impl CannedAcl {
    pub fn as_str(self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::AwsExecRead => "aws-exec-read",
            CannedAcl::BucketOwnerRead => "bucket-owner-read",
            CannedAcl::BucketOwnerFullControl => "bucket-owner-full-control",
            CannedAcl::LogDeliveryWrite => "log-delivery-write",
        }
    }

    /// Whether the ACL may be applied to a bucket
    ///
    /// `aws-exec-read` and the bucket-owner variants are object-only.
    pub fn applies_to_bucket(self) -> bool {
        !matches!(
            self,
            CannedAcl::AwsExecRead | CannedAcl::BucketOwnerRead | CannedAcl::BucketOwnerFullControl
        )
    }
}

impl std::str::FromStr for CannedAcl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "private" => CannedAcl::Private,
            "public-read" => CannedAcl::PublicRead,
            "public-read-write" => CannedAcl::PublicReadWrite,
            "authenticated-read" => CannedAcl::AuthenticatedRead,
            "aws-exec-read" => CannedAcl::AwsExecRead,
            "bucket-owner-read" => CannedAcl::BucketOwnerRead,
            "bucket-owner-full-control" => CannedAcl::BucketOwnerFullControl,
            "log-delivery-write" => CannedAcl::LogDeliveryWrite,
            other => {
                return Err(Error::InvalidArgument(format!("unknown canned ACL '{other}'")));
            }
        })
    }
}

/// Storage class of an object
///
/// Unknown classes reported by a backend are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageClass {
    Standard,
    ReducedRedundancy,
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    Glacier,
    GlacierIr,
    DeepArchive,
    Other(String),
}

impl StorageClass {
    pub fn as_str(&self) -> &str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::ReducedRedundancy => "REDUCED_REDUNDANCY",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::GlacierIr => "GLACIER_IR",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
            StorageClass::Other(s) => s,
        }
    }
}

impl From<&str> for StorageClass {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => StorageClass::Standard,
            "REDUCED_REDUNDANCY" => StorageClass::ReducedRedundancy,
            "STANDARD_IA" => StorageClass::StandardIa,
            "ONEZONE_IA" => StorageClass::OnezoneIa,
            "INTELLIGENT_TIERING" => StorageClass::IntelligentTiering,
            "GLACIER" => StorageClass::Glacier,
            "GLACIER_IR" => StorageClass::GlacierIr,
            "DEEP_ARCHIVE" => StorageClass::DeepArchive,
            _ => StorageClass::Other(s.to_string()),
        }
    }
}

impl From<String> for StorageClass {
    fn from(s: String) -> Self {
        StorageClass::from(s.as_str())
    }
}

impl From<StorageClass> for String {
    fn from(class: StorageClass) -> Self {
        class.as_str().to_string()
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer-provided encryption key (SSE-C)
#[derive(Clone, PartialEq, Eq)]
pub struct CustomerKey {
    /// Encryption algorithm, always "AES256" today
    pub algorithm: String,
    /// Base64 of the raw 256-bit key
    pub key: String,
    /// Base64 of the MD5 digest of the raw key
    pub key_md5: String,
}

impl CustomerKey {
    /// Build an AES256 key from its 32 raw bytes
    pub fn aes256(raw_key: &[u8]) -> Result<Self> {
        ensure(raw_key.len() == 32, || {
            format!("SSE-C keys are 32 bytes, got {}", raw_key.len())
        })?;
        Ok(Self {
            algorithm: "AES256".to_string(),
            key: BASE64_STANDARD.encode(raw_key),
            key_md5: BASE64_STANDARD.encode(Md5::digest(raw_key)),
        })
    }

    /// Build an AES256 key from its base64 encoding
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidArgument(format!("SSE-C key is not valid base64: {e}")))?;
        Self::aes256(&raw)
    }
}

impl std::fmt::Debug for CustomerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"** redacted **")
            .field("key_md5", &self.key_md5)
            .finish()
    }
}

/// Server-side encryption requested for a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerSideEncryption {
    /// SSE-S3: keys managed by S3 (AES256)
    S3,
    /// SSE-KMS: keys managed by KMS; `None` uses the account default key
    Kms { key_id: Option<String> },
    /// SSE-C: key supplied with every request
    Customer(CustomerKey),
}

impl ServerSideEncryption {
    pub fn customer_key(&self) -> Option<&CustomerKey> {
        match self {
            ServerSideEncryption::Customer(key) => Some(key),
            _ => None,
        }
    }
}

/// Byte range of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteRange {
    /// Inclusive range `start..=end`
    Range { start: u64, end: u64 },
    /// From `start` to the end of the object
    From { start: u64 },
    /// The last `length` bytes
    Suffix { length: u64 },
}

impl ByteRange {
    /// HTTP `Range` header value
    pub fn header_value(&self) -> String {
        match self {
            ByteRange::Range { start, end } => format!("bytes={start}-{end}"),
            ByteRange::From { start } => format!("bytes={start}-"),
            ByteRange::Suffix { length } => format!("bytes=-{length}"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ByteRange::Range { start, end } => {
                ensure(end >= start, || format!("range end {end} is before start {start}"))
            }
            ByteRange::Suffix { length } => {
                ensure(*length > 0, || "suffix range length must be positive".into())
            }
            ByteRange::From { .. } => Ok(()),
        }
    }
}

/// Payload of an upload
#[derive(Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// In-memory bytes
    Bytes(Vec<u8>),
    /// A whole file, streamed from disk
    File(PathBuf),
    /// `length` bytes of a file starting at `offset`, streamed from disk
    FileRange {
        path: PathBuf,
        offset: u64,
        length: u64,
    },
}

impl ObjectBody {
    /// Length when known without touching the filesystem
    pub fn known_len(&self) -> Option<u64> {
        match self {
            ObjectBody::Bytes(bytes) => Some(bytes.len() as u64),
            ObjectBody::FileRange { length, .. } => Some(*length),
            ObjectBody::File(_) => None,
        }
    }
}

impl Default for ObjectBody {
    fn default() -> Self {
        ObjectBody::Bytes(Vec::new())
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(bytes: Vec<u8>) -> Self {
        ObjectBody::Bytes(bytes)
    }
}

impl From<&str> for ObjectBody {
    fn from(text: &str) -> Self {
        ObjectBody::Bytes(text.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ObjectBody::File(path) => f.debug_tuple("File").field(path).finish(),
            ObjectBody::FileRange {
                path,
                offset,
                length,
            } => f
                .debug_struct("FileRange")
                .field("path", path)
                .field("offset", offset)
                .field("length", length)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_key_encodings() {
        let key = CustomerKey::aes256(&[0u8; 32]).unwrap();
        assert_eq!(key.algorithm, "AES256");
        assert_eq!(key.key, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=");
        // MD5 of 32 zero bytes
        assert_eq!(key.key_md5, "cLyPS3KoaSFGi/joRB3OUQ==");

        let round = CustomerKey::from_base64(&key.key).unwrap();
        assert_eq!(round, key);

        assert!(CustomerKey::aes256(&[0u8; 16]).is_err());
        assert!(CustomerKey::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_customer_key_debug_redacts() {
        let key = CustomerKey::aes256(&[7u8; 32]).unwrap();
        assert!(!format!("{key:?}").contains(&key.key));
    }

    #[test]
    fn test_byte_range_header() {
        assert_eq!(
            ByteRange::Range { start: 0, end: 99 }.header_value(),
            "bytes=0-99"
        );
        assert_eq!(ByteRange::From { start: 10 }.header_value(), "bytes=10-");
        assert_eq!(ByteRange::Suffix { length: 5 }.header_value(), "bytes=-5");
        assert!(ByteRange::Range { start: 5, end: 4 }.validate().is_err());
        assert!(ByteRange::Suffix { length: 0 }.validate().is_err());
    }

    #[test]
    fn test_storage_class_roundtrip_unknown() {
        assert_eq!(StorageClass::from("standard_ia"), StorageClass::StandardIa);
        let other = StorageClass::from("COLD");
        assert_eq!(other, StorageClass::Other("COLD".into()));
        assert_eq!(other.as_str(), "COLD");
        assert_eq!(
            serde_json::to_string(&StorageClass::GlacierIr).unwrap(),
            "\"GLACIER_IR\""
        );
    }

    #[test]
    fn test_canned_acl() {
        let acl: CannedAcl = "bucket-owner-full-control".parse().unwrap();
        assert_eq!(acl, CannedAcl::BucketOwnerFullControl);
        assert!(!acl.applies_to_bucket());
        assert!(CannedAcl::PublicRead.applies_to_bucket());
        assert!("world-writable".parse::<CannedAcl>().is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_object_body_debug_hides_bytes() {
        let body = ObjectBody::from("secret payload");
        assert_eq!(format!("{body:?}"), "Bytes(14 bytes)");
        assert_eq!(body.known_len(), Some(14));
    }
}
