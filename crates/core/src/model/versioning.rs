//! Bucket versioning

use serde::{Deserialize, Serialize};

use super::{BucketRequest, ensure};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersioningStatus {
    /// Versioning was never enabled on the bucket
    #[default]
    Unversioned,
    Enabled,
    Suspended,
}

impl VersioningStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VersioningStatus::Unversioned => "Unversioned",
            VersioningStatus::Enabled => "Enabled",
            VersioningStatus::Suspended => "Suspended",
        }
    }
}

pub type GetBucketVersioningRequest = BucketRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketVersioningOutput {
    pub status: VersioningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_delete: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketVersioningRequest {
    pub bucket: String,
    pub status: VersioningStatus,
    pub mfa_delete: Option<bool>,
}

impl PutBucketVersioningRequest {
    pub fn validate(&self) -> Result<()> {
        ensure(self.status != VersioningStatus::Unversioned, || {
            "versioning can only be set to Enabled or Suspended".into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_unversion() {
        let mut req = PutBucketVersioningRequest {
            bucket: "bucket".into(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        req.status = VersioningStatus::Suspended;
        assert!(req.validate().is_ok());
    }
}
