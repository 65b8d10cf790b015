//! Default bucket encryption

use serde::{Deserialize, Serialize};

use super::{BucketRequest, ensure};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SseAlgorithm {
    #[default]
    #[serde(rename = "AES256")]
    Aes256,
    #[serde(rename = "aws:kms")]
    AwsKms,
}

impl SseAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            SseAlgorithm::Aes256 => "AES256",
            SseAlgorithm::AwsKms => "aws:kms",
        }
    }
}

/// Encryption applied to objects written without explicit encryption
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEncryption {
    pub algorithm: SseAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
    #[serde(default)]
    pub bucket_key_enabled: bool,
}

impl BucketEncryption {
    pub fn validate(&self) -> Result<()> {
        ensure(
            self.algorithm == SseAlgorithm::AwsKms || self.kms_master_key_id.is_none(),
            || "a KMS key id requires the aws:kms algorithm".into(),
        )?;
        ensure(
            self.algorithm == SseAlgorithm::AwsKms || !self.bucket_key_enabled,
            || "bucket keys only apply to aws:kms encryption".into(),
        )
    }
}

pub type GetBucketEncryptionRequest = BucketRequest;
pub type GetBucketEncryptionOutput = BucketEncryption;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketEncryptionRequest {
    pub bucket: String,
    pub encryption: BucketEncryption,
}

impl PutBucketEncryptionRequest {
    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        self.encryption.validate()
    }
}

pub type DeleteBucketEncryptionRequest = BucketRequest;
