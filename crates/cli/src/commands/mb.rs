//! mb command - Make bucket

use clap::Args;
use serde::Serialize;

use s3kit_core::model::{
    CannedAcl, CreateBucketRequest, PutBucketVersioningRequest, VersioningStatus,
};
use s3kit_core::{Error, S3Api as _};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Target bucket (s3://bucket)
    pub target: String,

    /// Ignore error if bucket already exists
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,

    /// Region for the bucket (overrides the profile's region)
    #[arg(long)]
    pub region: Option<String>,

    /// Canned ACL (e.g., private, public-read)
    #[arg(long)]
    pub acl: Option<String>,

    /// Enable object locking on the bucket
    #[arg(long)]
    pub with_lock: bool,

    /// Enable versioning on the bucket
    #[arg(long)]
    pub with_versioning: bool,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

fn build_request(args: &MbArgs, bucket: &str, profile_region: &str) -> Result<CreateBucketRequest, Error> {
    let mut request = CreateBucketRequest::new(bucket);
    request.location_constraint = Some(args.region.clone().unwrap_or_else(|| profile_region.to_string()));
    request.acl = args.acl.as_deref().map(str::parse::<CannedAcl>).transpose()?;
    request.object_lock_enabled = args.with_lock;
    request.validate()?;
    Ok(request)
}

pub async fn execute(args: MbArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let url = match parse_remote(&args.target) {
        Ok(url) if url.key.is_empty() => url,
        Ok(url) => {
            formatter.error(&format!("{url} names an object; expected s3://bucket"));
            return ExitCode::UsageError;
        }
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };
    let client = match ctx.client_for(&url).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    let request = match build_request(&args, &url.bucket, &client.config().region) {
        Ok(request) => request,
        Err(e) => return fail(&formatter, "Invalid arguments", &e),
    };

    let (status, location) = match client.create_bucket(request).await {
        Ok(output) => ("created", output.location),
        Err(Error::Conflict(_)) if args.ignore_existing => ("exists", None),
        Err(e) => return fail(&formatter, &format!("Failed to create bucket {url}"), &e),
    };

    if args.with_versioning {
        let request = PutBucketVersioningRequest {
            bucket: url.bucket.clone(),
            status: VersioningStatus::Enabled,
            mfa_delete: None,
        };
        if let Err(e) = client.put_bucket_versioning(request).await {
            return fail(&formatter, "Bucket created but enabling versioning failed", &e);
        }
    }

    if formatter.is_json() {
        formatter.json(&MbOutput {
            status,
            bucket: url.bucket.clone(),
            location,
        });
    } else if status == "exists" {
        formatter.success(&format!("Bucket {url} already exists"));
    } else {
        formatter.success(&format!("Bucket {url} created"));
    }
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MbArgs {
        MbArgs {
            target: "s3://bucket".to_string(),
            ignore_existing: false,
            region: None,
            acl: None,
            with_lock: false,
            with_versioning: false,
        }
    }

    #[test]
    fn test_build_request_region() {
        let request = build_request(&args(), "bucket", "eu-west-1").unwrap();
        assert_eq!(request.effective_location(), Some("eu-west-1"));

        let mut a = args();
        a.region = Some("us-east-1".to_string());
        let request = build_request(&a, "bucket", "eu-west-1").unwrap();
        assert_eq!(request.effective_location(), None);
    }

    #[test]
    fn test_build_request_rejects_object_acl() {
        let mut a = args();
        a.acl = Some("bucket-owner-read".to_string());
        assert!(build_request(&a, "bucket", "us-east-1").is_err());

        a.acl = Some("public-read".to_string());
        a.with_lock = true;
        let request = build_request(&a, "bucket", "us-east-1").unwrap();
        assert_eq!(request.acl, Some(CannedAcl::PublicRead));
        assert!(request.object_lock_enabled);
    }
}
