//! Bucket lifecycle configuration

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{BucketRequest, StorageClass, ensure};
use crate::error::Result;
use crate::s3url::validate_bucket_name;

pub const MAX_LIFECYCLE_RULES: usize = 1000;
pub const MAX_RULE_ID_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub days: i32,
    pub storage_class: StorageClass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Key prefix the rule applies to; empty for the whole bucket
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_incomplete_multipart_upload_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
}

fn enabled_default() -> bool {
    true
}

impl LifecycleRule {
    pub fn validate(&self) -> Result<()> {
        let name = self.id.as_deref().unwrap_or(&self.prefix);
        if let Some(id) = &self.id {
            ensure(id.len() <= MAX_RULE_ID_LENGTH, || {
                format!("rule id exceeds {MAX_RULE_ID_LENGTH} characters")
            })?;
        }

        ensure(
            self.expiration_days.is_some()
                || self.noncurrent_version_expiration_days.is_some()
                || self.abort_incomplete_multipart_upload_days.is_some()
                || !self.transitions.is_empty(),
            || format!("lifecycle rule '{name}' has no action"),
        )?;

        let day_counts = self
            .expiration_days
            .iter()
            .chain(&self.noncurrent_version_expiration_days)
            .chain(&self.abort_incomplete_multipart_upload_days)
            .chain(self.transitions.iter().map(|t| &t.days));
        for days in day_counts {
            ensure(*days > 0, || {
                format!("lifecycle rule '{name}' has a non-positive day count {days}")
            })?;
        }

        if let Some(expire) = self.expiration_days {
            for t in &self.transitions {
                ensure(t.days < expire, || {
                    format!(
                        "lifecycle rule '{name}' transitions to {} after it expires",
                        t.storage_class
                    )
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfiguration {
    pub rules: Vec<LifecycleRule>,
}

impl LifecycleConfiguration {
    pub fn validate(&self) -> Result<()> {
        ensure(!self.rules.is_empty(), || "lifecycle configuration has no rules".into())?;
        ensure(self.rules.len() <= MAX_LIFECYCLE_RULES, || {
            format!(
                "{} lifecycle rules given, the limit is {MAX_LIFECYCLE_RULES}",
                self.rules.len()
            )
        })?;

        let mut ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if let Some(id) = &rule.id {
                ensure(ids.insert(id.as_str()), || format!("rule id '{id}' is repeated"))?;
            }
        }
        Ok(())
    }
}

pub type GetBucketLifecycleConfigurationRequest = BucketRequest;
pub type GetBucketLifecycleConfigurationOutput = LifecycleConfiguration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketLifecycleConfigurationRequest {
    pub bucket: String,
    pub configuration: LifecycleConfiguration,
}

impl PutBucketLifecycleConfigurationRequest {
    pub fn validate(&self) -> Result<()> {
        validate_bucket_name(&self.bucket)?;
        self.configuration.validate()
    }
}

pub type DeleteBucketLifecycleRequest = BucketRequest;

#[cfg(test)]
mod tests {
    use super::*;

    fn expire_after(days: i32) -> LifecycleRule {
        LifecycleRule {
            id: Some(format!("expire-{days}")),
            prefix: "logs/".into(),
            enabled: true,
            expiration_days: Some(days),
            ..Default::default()
        }
    }

    #[test]
    fn test_rule_needs_action() {
        let rule = LifecycleRule {
            id: Some("noop".into()),
            ..Default::default()
        };
        assert!(rule.validate().is_err());
        assert!(expire_after(30).validate().is_ok());
        assert!(expire_after(0).validate().is_err());
    }

    #[test]
    fn test_transition_before_expiry() {
        let mut rule = expire_after(30);
        rule.transitions.push(Transition {
            days: 60,
            storage_class: StorageClass::Glacier,
        });
        assert!(rule.validate().is_err());

        rule.transitions[0].days = 10;
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_configuration_limits() {
        assert!(LifecycleConfiguration::default().validate().is_err());

        let config = LifecycleConfiguration {
            rules: vec![expire_after(1), expire_after(1)],
        };
        assert!(config.validate().is_err());

        let config = LifecycleConfiguration {
            rules: (1..=MAX_LIFECYCLE_RULES as i32 + 1).map(expire_after).collect(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_from_json() {
        let config: LifecycleConfiguration = serde_json::from_str(
            r#"{"rules": [{"prefix": "tmp/", "expiration_days": 7}]}"#,
        )
        .unwrap();
        assert!(config.rules[0].enabled);
        assert!(config.validate().is_ok());
    }
}
