//! Presigned URLs

use std::collections::BTreeMap;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ServerSideEncryption, ensure, validate_key};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

/// Longest validity SigV4 allows for a presigned URL
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresignMethod {
    #[default]
    Get,
    Put,
    Delete,
    Head,
}

impl PresignMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PresignMethod::Get => "GET",
            PresignMethod::Put => "PUT",
            PresignMethod::Delete => "DELETE",
            PresignMethod::Head => "HEAD",
        }
    }
}

impl std::str::FromStr for PresignMethod {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(PresignMethod::Get),
            "PUT" => Ok(PresignMethod::Put),
            "DELETE" => Ok(PresignMethod::Delete),
            "HEAD" => Ok(PresignMethod::Head),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "cannot presign method '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    pub method: PresignMethod,
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub expires_in: Duration,
    /// Content type the uploader must send (PUT only)
    pub content_type: Option<String>,
    pub encryption: Option<ServerSideEncryption>,
}

impl PresignRequest {
    pub fn new(
        method: PresignMethod,
        bucket: impl Into<String>,
        key: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        Self {
            method,
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
            expires_in,
            content_type: None,
            encryption: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        validate_key(&self.key)?;
        ensure(self.expires_in >= Duration::from_secs(1), || {
            "presigned URLs must be valid for at least one second".into()
        })?;
        ensure(self.expires_in <= MAX_PRESIGN_EXPIRY, || {
            format!(
                "presigned URLs expire after at most {} seconds, got {}",
                MAX_PRESIGN_EXPIRY.as_secs(),
                self.expires_in.as_secs()
            )
        })?;
        ensure(
            self.content_type.is_none() || self.method == PresignMethod::Put,
            || "a content type only applies to presigned PUT".into(),
        )?;
        match &self.encryption {
            None => Ok(()),
            Some(ServerSideEncryption::Customer(_)) => ensure(
                self.method != PresignMethod::Delete,
                || "SSE-C does not apply to DELETE".into(),
            ),
            Some(_) => ensure(self.method == PresignMethod::Put, || {
                "SSE-S3 and SSE-KMS only apply to presigned PUT".into()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUrl {
    pub url: String,
    pub method: String,
    /// Headers the caller must send along with the request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomerKey;

    fn get(secs: u64) -> PresignRequest {
        PresignRequest::new(PresignMethod::Get, "bucket", "key", Duration::from_secs(secs))
    }

    #[test]
    fn test_expiry_bounds() {
        assert!(get(0).validate().is_err());
        assert!(get(1).validate().is_ok());
        assert!(get(MAX_PRESIGN_EXPIRY.as_secs()).validate().is_ok());
        assert!(get(MAX_PRESIGN_EXPIRY.as_secs() + 1).validate().is_err());
    }

    #[test]
    fn test_put_only_options() {
        let mut req = get(60);
        req.content_type = Some("text/plain".into());
        assert!(req.validate().is_err());
        req.method = PresignMethod::Put;
        assert!(req.validate().is_ok());

        let mut req = get(60);
        req.encryption = Some(ServerSideEncryption::S3);
        assert!(req.validate().is_err());
        req.encryption = Some(ServerSideEncryption::Customer(
            CustomerKey::aes256(&[1u8; 32]).unwrap(),
        ));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("put".parse::<PresignMethod>().unwrap(), PresignMethod::Put);
        assert!("PATCH".parse::<PresignMethod>().is_err());
    }
}
