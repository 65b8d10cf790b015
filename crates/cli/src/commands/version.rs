//! version command - Manage bucket versioning

use clap::Subcommand;
use serde::Serialize;

use s3kit_core::model::{BucketRequest, PutBucketVersioningRequest, VersioningStatus};
use s3kit_core::{Result, S3Api as _, S3Url};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// Show the versioning status of a bucket
    Info(BucketArg),

    /// Enable versioning
    Enable(BucketArg),

    /// Suspend versioning
    Suspend(BucketArg),
}

#[derive(clap::Args, Debug)]
pub struct BucketArg {
    /// Bucket (s3://bucket)
    pub bucket: String,
}

#[derive(Debug, Serialize)]
struct VersionOutput {
    bucket: String,
    status: VersioningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    mfa_delete: Option<bool>,
}

impl VersionCommands {
    fn bucket(&self) -> &str {
        match self {
            VersionCommands::Info(arg)
            | VersionCommands::Enable(arg)
            | VersionCommands::Suspend(arg) => &arg.bucket,
        }
    }

    /// Status to set, `None` for a read
    fn target_status(&self) -> Option<VersioningStatus> {
        match self {
            VersionCommands::Info(_) => None,
            VersionCommands::Enable(_) => Some(VersioningStatus::Enabled),
            VersionCommands::Suspend(_) => Some(VersioningStatus::Suspended),
        }
    }
}

async fn run(url: &S3Url, status: Option<VersioningStatus>, ctx: &Context) -> Result<VersionOutput> {
    let client = ctx.client_for(url).await?;

    if let Some(status) = status {
        let request = PutBucketVersioningRequest {
            bucket: url.bucket.clone(),
            status,
            mfa_delete: None,
        };
        request.validate()?;
        client.put_bucket_versioning(request).await?;
    }

    let output = client
        .get_bucket_versioning(BucketRequest::new(&url.bucket))
        .await?;
    Ok(VersionOutput {
        bucket: url.bucket.clone(),
        status: output.status,
        mfa_delete: output.mfa_delete,
    })
}

pub async fn execute(cmd: VersionCommands, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let url = match parse_remote(cmd.bucket()) {
        Ok(url) if url.key.is_empty() => url,
        Ok(url) => {
            formatter.error(&format!("{url} names an object; expected s3://bucket"));
            return ExitCode::UsageError;
        }
        Err(e) => return fail(&formatter, "Invalid bucket", &e),
    };

    match run(&url, cmd.target_status(), ctx).await {
        Ok(output) => {
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                formatter.println(&format!("{url}: versioning {}", output.status.as_str()));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Versioning on {url} failed"), &e),
    }
}
