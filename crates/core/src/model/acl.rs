//! Access control lists

use serde::{Deserialize, Serialize};

use super::{BucketRequest, CannedAcl, ObjectRequest, Owner, ensure, validate_key};
use crate::error::Result;

/// Predefined grantee groups
pub const ALL_USERS_GROUP: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
pub const AUTHENTICATED_USERS_GROUP: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";
pub const LOG_DELIVERY_GROUP: &str = "http://acs.amazonaws.com/groups/s3/LogDelivery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    FullControl,
    Read,
    Write,
    ReadAcp,
    WriteAcp,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::FullControl => "FULL_CONTROL",
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::ReadAcp => "READ_ACP",
            Permission::WriteAcp => "WRITE_ACP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "FULL_CONTROL" => Permission::FullControl,
            "READ" => Permission::Read,
            "WRITE" => Permission::Write,
            "READ_ACP" => Permission::ReadAcp,
            "WRITE_ACP" => Permission::WriteAcp,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grantee {
    CanonicalUser {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
    Group {
        uri: String,
    },
    Email {
        address: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub grantee: Grantee,
    pub permission: Permission,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlPolicy {
    pub owner: Owner,
    pub grants: Vec<Grant>,
}

impl AccessControlPolicy {
    /// Whether anyone on the internet is granted access
    pub fn is_public(&self) -> bool {
        self.grants.iter().any(|g| {
            matches!(&g.grantee, Grantee::Group { uri } if uri == ALL_USERS_GROUP)
        })
    }

    pub fn validate(&self) -> Result<()> {
        ensure(self.owner.id.is_some(), || "an access control policy needs an owner id".into())?;
        ensure(self.grants.len() <= 100, || {
            format!("{} grants given, the limit is 100", self.grants.len())
        })
    }
}

/// ACL to apply: a canned one or an explicit policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclSpec {
    Canned(CannedAcl),
    Policy(AccessControlPolicy),
}

pub type GetBucketAclRequest = BucketRequest;
pub type GetBucketAclOutput = AccessControlPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBucketAclRequest {
    pub bucket: String,
    pub acl: AclSpec,
}

impl PutBucketAclRequest {
    pub fn validate(&self) -> Result<()> {
        match &self.acl {
            AclSpec::Canned(acl) => ensure(acl.applies_to_bucket(), || {
                format!("canned ACL '{}' cannot be applied to a bucket", acl.as_str())
            }),
            AclSpec::Policy(policy) => policy.validate(),
        }
    }
}

pub type GetObjectAclRequest = ObjectRequest;
pub type GetObjectAclOutput = AccessControlPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectAclRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub acl: AclSpec,
}

impl PutObjectAclRequest {
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        match &self.acl {
            AclSpec::Canned(_) => Ok(()),
            AclSpec::Policy(policy) => policy.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Owner {
        Owner {
            id: Some("owner-id".into()),
            display_name: None,
        }
    }

    #[test]
    fn test_is_public() {
        let mut policy = AccessControlPolicy {
            owner: owner(),
            grants: vec![Grant {
                grantee: Grantee::CanonicalUser {
                    id: "owner-id".into(),
                    display_name: None,
                },
                permission: Permission::FullControl,
            }],
        };
        assert!(!policy.is_public());

        policy.grants.push(Grant {
            grantee: Grantee::Group {
                uri: ALL_USERS_GROUP.into(),
            },
            permission: Permission::Read,
        });
        assert!(policy.is_public());
    }

    #[test]
    fn test_put_bucket_acl_rejects_object_only_canned() {
        let req = PutBucketAclRequest {
            bucket: "bucket".into(),
            acl: AclSpec::Canned(CannedAcl::BucketOwnerFullControl),
        };
        assert!(req.validate().is_err());

        let req = PutBucketAclRequest {
            bucket: "bucket".into(),
            acl: AclSpec::Policy(AccessControlPolicy::default()),
        };
        assert!(req.validate().is_err());

        let req = PutBucketAclRequest {
            bucket: "bucket".into(),
            acl: AclSpec::Policy(AccessControlPolicy {
                owner: owner(),
                grants: vec![],
            }),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_permission_names() {
        for p in [
            Permission::FullControl,
            Permission::Read,
            Permission::Write,
            Permission::ReadAcp,
            Permission::WriteAcp,
        ] {
            assert_eq!(Permission::parse(p.as_str()), Some(p));
        }
        assert_eq!(
            serde_json::to_string(&Permission::ReadAcp).unwrap(),
            "\"READ_ACP\""
        );
    }
}
