//! rb command - Remove bucket

use clap::Args;
use serde::Serialize;

use s3kit_client::fileio;
use s3kit_core::model::BucketRequest;
use s3kit_core::{Error, S3Api as _};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Target bucket (s3://bucket)
    pub target: String,

    /// Delete all objects first so a non-empty bucket can be removed
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    bucket: String,
    objects_deleted: usize,
}

pub async fn execute(args: RbArgs, ctx: &Context) -> ExitCode {
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

    let mut objects_deleted = 0;
    if args.force {
        match fileio::delete_prefix(&client, &url).await {
            Ok(count) => objects_deleted = count,
            Err(e) => return fail(&formatter, &format!("Failed to empty bucket {url}"), &e),
        }
    }

    match client.delete_bucket(BucketRequest::new(&url.bucket)).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RbOutput {
                    status: "removed",
                    bucket: url.bucket.clone(),
                    objects_deleted,
                });
            } else {
                formatter.success(&format!("Bucket {url} removed"));
            }
            ExitCode::Success
        }
        Err(e @ Error::Conflict(_)) if !args.force => {
            formatter.error(&format!("{e}"));
            formatter.error("Use --force to delete its objects first");
            ExitCode::Conflict
        }
        Err(e) => fail(&formatter, &format!("Failed to remove bucket {url}"), &e),
    }
}
