//! Bucket lifecycle operations

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{BucketRequest, CannedAcl, Owner, ensure};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

/// ListBuckets takes no parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListBucketsRequest;

/// A bucket owned by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketsOutput {
    pub buckets: Vec<Bucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketRequest {
    pub bucket: String,
    /// Region constraint; `None` (or "us-east-1") creates in the default region
    pub location_constraint: Option<String>,
    pub acl: Option<CannedAcl>,
    pub object_lock_enabled: bool,
}

impl CreateBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        if let Some(acl) = self.acl {
            ensure(acl.applies_to_bucket(), || {
                format!("canned ACL '{}' cannot be applied to a bucket", acl.as_str())
            })?;
        }
        Ok(())
    }

    /// Location constraint to send, if any
    ///
    /// us-east-1 rejects an explicit constraint naming itself.
    pub fn effective_location(&self) -> Option<&str> {
        self.location_constraint
            .as_deref()
            .filter(|region| !region.is_empty() && *region != "us-east-1")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

pub type DeleteBucketRequest = BucketRequest;
pub type HeadBucketRequest = BucketRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadBucketOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

pub type GetBucketLocationRequest = BucketRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketLocationOutput {
    /// Region of the bucket; an empty constraint is reported as "us-east-1"
    pub region: String,
}

impl GetBucketLocationOutput {
    pub fn from_constraint(constraint: Option<&str>) -> Self {
        let region = match constraint {
            None | Some("") => "us-east-1",
            // Legacy alias for eu-west-1
            Some("EU") => "eu-west-1",
            Some(region) => region,
        };
        Self {
            region: region.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_bucket_validation() {
        assert!(CreateBucketRequest::new("my-bucket").validate().is_ok());
        assert!(CreateBucketRequest::new("-bucket").validate().is_err());

        let mut req = CreateBucketRequest::new("my-bucket");
        req.acl = Some(CannedAcl::BucketOwnerRead);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_effective_location() {
        let mut req = CreateBucketRequest::new("b1b");
        assert_eq!(req.effective_location(), None);
        req.location_constraint = Some("us-east-1".into());
        assert_eq!(req.effective_location(), None);
        req.location_constraint = Some("eu-central-1".into());
        assert_eq!(req.effective_location(), Some("eu-central-1"));
    }

    #[test]
    fn test_location_from_constraint() {
        assert_eq!(GetBucketLocationOutput::from_constraint(None).region, "us-east-1");
        assert_eq!(GetBucketLocationOutput::from_constraint(Some("")).region, "us-east-1");
        assert_eq!(GetBucketLocationOutput::from_constraint(Some("EU")).region, "eu-west-1");
        assert_eq!(
            GetBucketLocationOutput::from_constraint(Some("ap-south-1")).region,
            "ap-south-1"
        );
    }
}
