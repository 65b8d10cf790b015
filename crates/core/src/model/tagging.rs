//! Bucket and object tagging

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{BucketRequest, ObjectRequest, Tag, ensure, validate_key};
use crate::error::Result;

pub const MAX_BUCKET_TAGS: usize = 50;
pub const MAX_OBJECT_TAGS: usize = 10;
pub const MAX_TAG_KEY_LENGTH: usize = 128;
pub const MAX_TAG_VALUE_LENGTH: usize = 256;

/// Check a tag set against the count and length limits
pub fn validate_tags(tags: &[Tag], max: usize) -> Result<()> {
    ensure(tags.len() <= max, || {
        format!("{} tags given, the limit is {max}", tags.len())
    })?;

    let mut seen = HashSet::new();
    for tag in tags {
        ensure(!tag.key.is_empty(), || "tag keys cannot be empty".into())?;
        ensure(tag.key.chars().count() <= MAX_TAG_KEY_LENGTH, || {
            format!("tag key '{}' exceeds {MAX_TAG_KEY_LENGTH} characters", tag.key)
        })?;
        ensure(tag.value.chars().count() <= MAX_TAG_VALUE_LENGTH, || {
            format!("value of tag '{}' exceeds {MAX_TAG_VALUE_LENGTH} characters", tag.key)
        })?;
        ensure(!tag.key.starts_with("aws:"), || {
            format!("tag key '{}' uses the reserved 'aws:' prefix", tag.key)
        })?;
        ensure(seen.insert(tag.key.as_str()), || {
            format!("tag key '{}' is repeated", tag.key)
        })?;
    }
    Ok(())
}

/// Encode tags as the `x-amz-tagging` query string
pub fn encode_tags(tags: &[Tag]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for tag in tags {
        serializer.append_pair(&tag.key, &tag.value);
    }
    serializer.finish()
}

/// Parse `key=value` pairs, as given on a command line
pub fn parse_tag(pair: &str) -> Result<Tag> {
    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
    ensure(!key.is_empty(), || format!("invalid tag '{pair}', expected key=value"))?;
    Ok(Tag::new(key, value))
}

pub type GetBucketTaggingRequest = BucketRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBucketTaggingOutput {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketTaggingRequest {
    pub bucket: String,
    pub tags: Vec<Tag>,
}

impl PutBucketTaggingRequest {
    pub fn validate(&self) -> Result<()> {
        validate_tags(&self.tags, MAX_BUCKET_TAGS)
    }
}

pub type DeleteBucketTaggingRequest = BucketRequest;

pub type GetObjectTaggingRequest = ObjectRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetObjectTaggingOutput {
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectTaggingRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub tags: Vec<Tag>,
}

impl PutObjectTaggingRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        validate_tags(&self.tags, MAX_OBJECT_TAGS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutObjectTaggingOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

pub type DeleteObjectTaggingRequest = ObjectRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObjectTaggingOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tags() {
        let ok = vec![Tag::new("env", "prod"), Tag::new("team", "")];
        assert!(validate_tags(&ok, MAX_OBJECT_TAGS).is_ok());

        let dup = vec![Tag::new("env", "a"), Tag::new("env", "b")];
        assert!(validate_tags(&dup, MAX_OBJECT_TAGS).is_err());

        let reserved = vec![Tag::new("aws:createdBy", "x")];
        assert!(validate_tags(&reserved, MAX_OBJECT_TAGS).is_err());

        let long_key = vec![Tag::new("k".repeat(MAX_TAG_KEY_LENGTH + 1), "v")];
        assert!(validate_tags(&long_key, MAX_OBJECT_TAGS).is_err());

        let long_value = vec![Tag::new("k", "v".repeat(MAX_TAG_VALUE_LENGTH + 1))];
        assert!(validate_tags(&long_value, MAX_OBJECT_TAGS).is_err());
    }

    #[test]
    fn test_bucket_allows_more_tags_than_objects() {
        let tags: Vec<Tag> = (0..20).map(|i| Tag::new(format!("k{i}"), "v")).collect();
        let req = PutBucketTaggingRequest {
            bucket: "bucket".into(),
            tags: tags.clone(),
        };
        assert!(req.validate().is_ok());

        let req = PutObjectTaggingRequest {
            bucket: "bucket".into(),
            key: "key".into(),
            version_id: None,
            tags,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_encode_tags() {
        let tags = vec![Tag::new("env", "prod"), Tag::new("owner", "a b&c")];
        assert_eq!(encode_tags(&tags), "env=prod&owner=a+b%26c");
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("env=prod").unwrap(), Tag::new("env", "prod"));
        assert_eq!(parse_tag("flag").unwrap(), Tag::new("flag", ""));
        assert_eq!(parse_tag("a=b=c").unwrap(), Tag::new("a", "b=c"));
        assert!(parse_tag("=x").is_err());
    }
}
