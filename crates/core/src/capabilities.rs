//! Backend capability information
//!
//! S3-compatible servers implement different subsets of the API. Features
//! are probed per bucket (see `s3kit_client::capability`) and checked here
//! before a command relies on them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Optional S3 features a backend may lack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Versioning,
    ObjectLock,
    Tagging,
    Select,
    Notifications,
    Lifecycle,
    Encryption,
    Replication,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Versioning => "versioning",
            Feature::ObjectLock => "object lock",
            Feature::Tagging => "tagging",
            Feature::Select => "S3 Select",
            Feature::Notifications => "event notifications",
            Feature::Lifecycle => "lifecycle configuration",
            Feature::Encryption => "default encryption",
            Feature::Replication => "replication",
        }
    }
}

/// Features known to work against a backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub versioning: bool,
    pub object_lock: bool,
    pub tagging: bool,
    pub select: bool,
    pub notifications: bool,
    pub lifecycle: bool,
    pub encryption: bool,
    pub replication: bool,
}

impl Capabilities {
    /// Everything AWS S3 itself supports
    pub fn aws() -> Self {
        Self {
            versioning: true,
            object_lock: true,
            tagging: true,
            select: true,
            notifications: true,
            lifecycle: true,
            encryption: true,
            replication: true,
        }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Versioning => self.versioning,
            Feature::ObjectLock => self.object_lock,
            Feature::Tagging => self.tagging,
            Feature::Select => self.select,
            Feature::Notifications => self.notifications,
            Feature::Lifecycle => self.lifecycle,
            Feature::Encryption => self.encryption,
            Feature::Replication => self.replication,
        }
    }

    /// Fail with `UnsupportedFeature` unless `feature` is available
    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Error::UnsupportedFeature(format!(
                "the backend does not support {}",
                feature.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supports_nothing() {
        let caps = Capabilities::default();
        assert!(!caps.supports(Feature::Versioning));
        let err = caps.require(Feature::Select).unwrap_err();
        assert_eq!(err.exit_code(), 7);
        assert!(err.to_string().contains("S3 Select"));
    }

    #[test]
    fn test_require_supported() {
        let caps = Capabilities {
            tagging: true,
            ..Default::default()
        };
        assert!(caps.require(Feature::Tagging).is_ok());
        assert!(caps.require(Feature::Replication).is_err());
        assert!(Capabilities::aws().require(Feature::Replication).is_ok());
    }
}
