//! rm command - Remove objects

use clap::Args;
use serde::Serialize;

use s3kit_client::fileio;
use s3kit_core::model::DeleteObjectRequest;
use s3kit_core::{Error, Result, S3Api as _, S3Url, sanitize_url};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Objects to remove (s3://bucket/key, or s3://bucket/prefix with -r)
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Remove every object under the prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Allow a recursive removal of a whole bucket
    #[arg(short, long)]
    pub force: bool,

    /// Remove a specific object version
    #[arg(long, conflicts_with = "recursive")]
    pub version_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    path: String,
    deleted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,
}

/// The prefix a recursive removal covers: the key as a directory
fn recursive_target(url: &S3Url) -> S3Url {
    S3Url {
        key: url.dir_prefix(),
        ..url.clone()
    }
}

async fn remove_one(url: &S3Url, args: &RmArgs, ctx: &Context) -> Result<RmOutput> {
    let client = ctx.client_for(url).await?;

    if args.recursive {
        if url.key.is_empty() && !args.force {
            return Err(Error::InvalidArgument(format!(
                "refusing to empty {url} without --force"
            )));
        }
        let deleted = fileio::delete_prefix(&client, &recursive_target(url)).await?;
        return Ok(RmOutput {
            status: "success",
            path: url.to_string(),
            deleted,
            version_id: None,
        });
    }

    if url.key.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{url} is a bucket; use rb to remove buckets or -r to remove its objects"
        )));
    }
    let mut request = DeleteObjectRequest::new(&url.bucket, &url.key);
    request.version_id = args.version_id.clone();
    let output = client.delete_object(request).await?;
    Ok(RmOutput {
        status: "success",
        path: url.to_string(),
        deleted: 1,
        version_id: output.version_id,
    })
}

pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let mut exit = ExitCode::Success;

    for path in &args.paths {
        let result = match parse_remote(path) {
            Ok(url) => remove_one(&url, &args, ctx).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(output) => {
                if formatter.is_json() {
                    formatter.json(&output);
                } else if args.recursive {
                    formatter.success(&format!(
                        "Removed {} object(s) under {}",
                        output.deleted, output.path
                    ));
                } else {
                    formatter.success(&format!("Removed {}", output.path));
                }
            }
            Err(e) => {
                let context = format!("Failed to remove {}", sanitize_url(path));
                exit = fail(&formatter, &context, &e);
            }
        }
    }
    exit
}
