//! Access control list operations

use aws_sdk_s3::types::{
    AccessControlPolicy as SdkPolicy, BucketCannedAcl, Grant as SdkGrant, Grantee as SdkGrantee,
    ObjectCannedAcl, Owner as SdkOwner, Permission as SdkPermission, Type,
};

use s3kit_core::Result;
use s3kit_core::model::*;

use crate::client::S3Client;
use crate::convert;
use crate::error::{build_error, sdk_error};

/// Model a grant list returned by the service
///
/// Grants with a grantee or permission this crate does not know are skipped.
fn grants_from_sdk(grants: &[SdkGrant]) -> Vec<Grant> {
    grants
        .iter()
        .filter_map(|g| {
            let grantee = g.grantee()?;
            let grantee = match grantee.r#type() {
                Type::CanonicalUser => Grantee::CanonicalUser {
                    id: grantee.id()?.to_string(),
                    display_name: grantee.display_name().map(str::to_string),
                },
                Type::Group => Grantee::Group {
                    uri: grantee.uri()?.to_string(),
                },
                Type::AmazonCustomerByEmail => Grantee::Email {
                    address: grantee.email_address()?.to_string(),
                },
                other => {
                    tracing::debug!(grantee_type = other.as_str(), "skipping grant");
                    return None;
                }
            };
            let permission = Permission::parse(g.permission()?.as_str())?;
            Some(Grant {
                grantee,
                permission,
            })
        })
        .collect()
}

fn policy_from_sdk(owner: Option<&SdkOwner>, grants: &[SdkGrant]) -> AccessControlPolicy {
    AccessControlPolicy {
        owner: convert::owner(owner).unwrap_or_default(),
        grants: grants_from_sdk(grants),
    }
}

fn policy_to_sdk(policy: &AccessControlPolicy) -> Result<SdkPolicy> {
    let grants = policy
        .grants
        .iter()
        .map(|grant| {
            let grantee = match &grant.grantee {
                Grantee::CanonicalUser { id, display_name } => SdkGrantee::builder()
                    .r#type(Type::CanonicalUser)
                    .id(id)
                    .set_display_name(display_name.clone()),
                Grantee::Group { uri } => SdkGrantee::builder().r#type(Type::Group).uri(uri),
                Grantee::Email { address } => SdkGrantee::builder()
                    .r#type(Type::AmazonCustomerByEmail)
                    .email_address(address),
            }
            .build()
            .map_err(build_error)?;

            Ok(SdkGrant::builder()
                .grantee(grantee)
                .permission(SdkPermission::from(grant.permission.as_str()))
                .build())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SdkPolicy::builder()
        .owner(
            SdkOwner::builder()
                .set_id(policy.owner.id.clone())
                .set_display_name(policy.owner.display_name.clone())
                .build(),
        )
        .set_grants(Some(grants))
        .build())
}

pub(crate) async fn get_bucket_acl(
    client: &S3Client,
    request: GetBucketAclRequest,
) -> Result<GetBucketAclOutput> {
    request.validate()?;

    let response = client
        .inner
        .get_bucket_acl()
        .bucket(&request.bucket)
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;

    Ok(policy_from_sdk(response.owner(), response.grants()))
}

pub(crate) async fn put_bucket_acl(client: &S3Client, request: PutBucketAclRequest) -> Result<()> {
    request.validate()?;
    tracing::debug!(bucket = %request.bucket, "put bucket acl");

    let builder = client.inner.put_bucket_acl().bucket(&request.bucket);
    let builder = match &request.acl {
        AclSpec::Canned(acl) => builder.acl(BucketCannedAcl::from(acl.as_str())),
        AclSpec::Policy(policy) => builder.access_control_policy(policy_to_sdk(policy)?),
    };

    builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &request.bucket))?;
    Ok(())
}

pub(crate) async fn get_object_acl(
    client: &S3Client,
    request: GetObjectAclRequest,
) -> Result<GetObjectAclOutput> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);

    let response = client
        .inner
        .get_object_acl()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id)
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    Ok(policy_from_sdk(response.owner(), response.grants()))
}

pub(crate) async fn put_object_acl(client: &S3Client, request: PutObjectAclRequest) -> Result<()> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);
    tracing::debug!(object = %resource, "put object acl");

    let builder = client
        .inner
        .put_object_acl()
        .bucket(&request.bucket)
        .key(&request.key)
        .set_version_id(request.version_id.clone());
    let builder = match &request.acl {
        AclSpec::Canned(acl) => builder.acl(ObjectCannedAcl::from(acl.as_str())),
        AclSpec::Policy(policy) => builder.access_control_policy(policy_to_sdk(policy)?),
    };

    builder.send().await.map_err(|e| sdk_error(e, &resource))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_conversion_keeps_grants() {
        let policy = AccessControlPolicy {
            owner: Owner {
                id: Some("owner-id".into()),
                display_name: Some("owner".into()),
            },
            grants: vec![
                Grant {
                    grantee: Grantee::CanonicalUser {
                        id: "owner-id".into(),
                        display_name: None,
                    },
                    permission: Permission::FullControl,
                },
                Grant {
                    grantee: Grantee::Group {
                        uri: ALL_USERS_GROUP.into(),
                    },
                    permission: Permission::Read,
                },
            ],
        };

        let sdk = policy_to_sdk(&policy).unwrap();
        let back = policy_from_sdk(sdk.owner(), sdk.grants());
        assert_eq!(back, policy);
        assert!(back.is_public());
    }

    #[test]
    fn test_unknown_permissions_are_skipped() {
        let grantee = SdkGrantee::builder()
            .r#type(Type::Group)
            .uri(ALL_USERS_GROUP)
            .build()
            .unwrap();
        let grants = vec![
            SdkGrant::builder()
                .grantee(grantee.clone())
                .permission(SdkPermission::from("SOMETHING_NEW"))
                .build(),
            SdkGrant::builder().grantee(grantee).build(),
        ];
        assert!(grants_from_sdk(&grants).is_empty());
    }
}
