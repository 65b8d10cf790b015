//! Bucket replication configuration

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{BucketRequest, StorageClass, ensure};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

pub const MAX_REPLICATION_RULES: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Destination bucket name or ARN
    pub destination_bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
    #[serde(default)]
    pub replicate_delete_markers: bool,
}

fn enabled_default() -> bool {
    true
}

impl ReplicationRule {
    /// Destination as an ARN, as S3 expects it
    pub fn destination_arn(&self) -> String {
        if self.destination_bucket.starts_with("arn:") {
            self.destination_bucket.clone()
        } else {
            format!("arn:aws:s3:::{}", self.destination_bucket)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.destination_bucket.strip_prefix("arn:") {
            Some(rest) => {
                let bucket = rest.rsplit(':').next().unwrap_or_default();
                validate_bucket_name(bucket)
            }
            None => validate_bucket_name(&self.destination_bucket),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationConfiguration {
    /// IAM role S3 assumes to replicate objects
    pub role: String,
    pub rules: Vec<ReplicationRule>,
}

impl ReplicationConfiguration {
    pub fn validate(&self) -> Result<()> {
        ensure(!self.role.is_empty(), || "replication needs an IAM role".into())?;
        ensure(!self.rules.is_empty(), || "replication configuration has no rules".into())?;
        ensure(self.rules.len() <= MAX_REPLICATION_RULES, || {
            format!(
                "{} replication rules given, the limit is {MAX_REPLICATION_RULES}",
                self.rules.len()
            )
        })?;

        let mut priorities = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if let Some(priority) = rule.priority {
                ensure(priorities.insert(priority), || {
                    format!("replication priority {priority} is used twice")
                })?;
            }
        }
        Ok(())
    }
}

pub type GetBucketReplicationRequest = BucketRequest;
pub type GetBucketReplicationOutput = ReplicationConfiguration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketReplicationRequest {
    pub bucket: String,
    pub configuration: ReplicationConfiguration,
}

impl PutBucketReplicationRequest {
    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        self.configuration.validate()
    }
}

pub type DeleteBucketReplicationRequest = BucketRequest;

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(dest: &str, priority: Option<i32>) -> ReplicationRule {
        ReplicationRule {
            destination_bucket: dest.into(),
            priority,
            enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_destination_arn() {
        assert_eq!(rule("backup", None).destination_arn(), "arn:aws:s3:::backup");
        assert_eq!(
            rule("arn:aws-cn:s3:::backup", None).destination_arn(),
            "arn:aws-cn:s3:::backup"
        );
    }

    #[test]
    fn test_configuration_validation() {
        let config = ReplicationConfiguration {
            role: "arn:aws:iam::123456789012:role/replication".into(),
            rules: vec![rule("backup", Some(1)), rule("arn:aws:s3:::archive", Some(2))],
        };
        assert!(config.validate().is_ok());

        let mut dup = config.clone();
        dup.rules[1].priority = Some(1);
        assert!(dup.validate().is_err());

        let mut no_role = config.clone();
        no_role.role.clear();
        assert!(no_role.validate().is_err());

        let mut bad_dest = config;
        bad_dest.rules[0].destination_bucket = "x".into();
        assert!(bad_dest.validate().is_err());
    }
}
