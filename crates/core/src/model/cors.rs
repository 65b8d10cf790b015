//! Bucket CORS configuration

use serde::{Deserialize, Serialize};

use super::{BucketRequest, ensure};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

pub const MAX_CORS_RULES: usize = 100;

const ALLOWED_METHODS: &[&str] = &["GET", "PUT", "POST", "DELETE", "HEAD"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<i32>,
}

impl CorsRule {
    pub fn validate(&self) -> Result<()> {
        ensure(!self.allowed_methods.is_empty(), || "CORS rule has no allowed methods".into())?;
        ensure(!self.allowed_origins.is_empty(), || "CORS rule has no allowed origins".into())?;
        for method in &self.allowed_methods {
            ensure(ALLOWED_METHODS.contains(&method.as_str()), || {
                format!("'{method}' is not a CORS method S3 supports")
            })?;
        }
        for origin in &self.allowed_origins {
            ensure(origin.matches('*').count() <= 1, || {
                format!("origin '{origin}' has more than one wildcard")
            })?;
        }
        if let Some(age) = self.max_age_seconds {
            ensure(age >= 0, || format!("max age {age} is negative"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfiguration {
    pub rules: Vec<CorsRule>,
}

impl CorsConfiguration {
    pub fn validate(&self) -> Result<()> {
        ensure(!self.rules.is_empty(), || "CORS configuration has no rules".into())?;
        ensure(self.rules.len() <= MAX_CORS_RULES, || {
            format!("{} CORS rules given, the limit is {MAX_CORS_RULES}", self.rules.len())
        })?;
        self.rules.iter().try_for_each(CorsRule::validate)
    }
}

pub type GetBucketCorsRequest = BucketRequest;
pub type GetBucketCorsOutput = CorsConfiguration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketCorsRequest {
    pub bucket: String,
    pub configuration: CorsConfiguration,
}

impl PutBucketCorsRequest {
    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        self.configuration.validate()
    }
}

pub type DeleteBucketCorsRequest = BucketRequest;
