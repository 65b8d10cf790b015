//! Bucket policies

use serde::{Deserialize, Serialize};

use super::{BucketRequest, ensure};
use crate::error::{Error, Result};

/// Maximum size of a bucket policy document
pub const MAX_POLICY_SIZE: usize = 20 * 1024;

pub type GetBucketPolicyRequest = BucketRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketPolicyOutput {
    /// Policy document, as JSON text
    pub policy: String,
}

impl GetBucketPolicyOutput {
    /// Re-indent the policy document for display
    pub fn pretty(&self) -> Result<String> {
        let value: serde_json::Value = serde_json::from_str(&self.policy)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketPolicyRequest {
    pub bucket: String,
    pub policy: String,
}

impl PutBucketPolicyRequest {
    pub fn validate(&self) -> Result<()> {
        ensure(self.policy.len() <= MAX_POLICY_SIZE, || {
            format!("policy is {} bytes, the limit is {MAX_POLICY_SIZE}", self.policy.len())
        })?;

        let value: serde_json::Value = serde_json::from_str(&self.policy)
            .map_err(|e| Error::InvalidArgument(format!("policy is not valid JSON: {e}")))?;
        let statements = value
            .as_object()
            .and_then(|doc| doc.get("Statement"))
            .ok_or_else(|| Error::InvalidArgument("policy has no Statement".into()))?;
        ensure(statements.is_array() || statements.is_object(), || {
            "policy Statement must be an object or a list".into()
        })
    }
}

pub type DeleteBucketPolicyRequest = BucketRequest;
