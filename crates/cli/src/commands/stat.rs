//! stat command - Show bucket or object metadata

use clap::Args;
use serde::Serialize;

use s3kit_client::fileio::{self, PathKind};
use s3kit_client::S3Client;
use s3kit_core::model::{BucketRequest, CustomerKey, HeadObjectRequest, ObjectMetadata};
use s3kit_core::{Error, Result, S3Api as _, S3Url};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show bucket or object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// s3://bucket or s3://bucket/key
    pub path: String,

    /// Specific version ID to inspect
    #[arg(long)]
    pub version_id: Option<String>,

    /// SSE-C key the object was written with (base64)
    #[arg(long)]
    pub sse_c_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct BucketStat {
    bucket: String,
    region: String,
    versioning: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StatOutput {
    Bucket(BucketStat),
    Directory { url: String },
    Object {
        url: String,
        #[serde(flatten)]
        metadata: ObjectMetadata,
    },
}

pub async fn execute(args: StatArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let url = match parse_remote(&args.path) {
        Ok(url) => url,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let client = match ctx.client_for(&url).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    let result = if url.key.is_empty() {
        stat_bucket(&client, &url.bucket).await.map(StatOutput::Bucket)
    } else {
        stat_object(&client, &url, &args).await
    };

    match result {
        Ok(output) => {
            print_stat(&formatter, &output);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Failed to stat {url}"), &e),
    }
}

async fn stat_bucket(client: &S3Client, bucket: &str) -> Result<BucketStat> {
    client.head_bucket(BucketRequest::new(bucket)).await?;
    let location = client.get_bucket_location(BucketRequest::new(bucket)).await?;
    // Some backends reject the versioning call outright
    let versioning = match client.get_bucket_versioning(BucketRequest::new(bucket)).await {
        Ok(output) => output.status.as_str(),
        Err(Error::UnsupportedFeature(_)) => "Unsupported",
        Err(e) => return Err(e),
    };
    Ok(BucketStat {
        bucket: bucket.to_string(),
        region: location.region,
        versioning,
    })
}

async fn stat_object(client: &S3Client, url: &S3Url, args: &StatArgs) -> Result<StatOutput> {
    let mut request = HeadObjectRequest::new(&url.bucket, &url.key);
    request.version_id = args.version_id.clone();
    request.customer_key = args
        .sse_c_key
        .as_deref()
        .map(CustomerKey::from_base64)
        .transpose()?;

    match client.head_object(request).await {
        Ok(metadata) => Ok(StatOutput::Object {
            url: url.to_string(),
            metadata,
        }),
        Err(Error::NotFound(message)) => match fileio::path_kind(client, url).await? {
            PathKind::Directory => Ok(StatOutput::Directory {
                url: url.to_string(),
            }),
            _ => Err(Error::NotFound(message)),
        },
        Err(e) => Err(e),
    }
}

/// Label/value pairs for human output
fn stat_lines(output: &StatOutput) -> Vec<(&'static str, String)> {
    match output {
        StatOutput::Bucket(stat) => vec![
            ("Bucket", stat.bucket.clone()),
            ("Region", stat.region.clone()),
            ("Versioning", stat.versioning.to_string()),
        ],
        StatOutput::Directory { url } => vec![("Name", format!("{url}/")), ("Type", "directory".into())],
        StatOutput::Object { url, metadata } => {
            let mut lines = vec![
                ("Name", url.clone()),
                (
                    "Size",
                    format!(
                        "{} ({} bytes)",
                        humansize::format_size(metadata.content_length.max(0) as u64, humansize::BINARY),
                        metadata.content_length
                    ),
                ),
            ];
            let optional = [
                ("Date", metadata.last_modified.map(|t| t.strftime("%Y-%m-%d %H:%M:%S UTC").to_string())),
                ("ETag", metadata.etag.clone()),
                ("Type", metadata.content_type.clone()),
                ("Class", metadata.storage_class.as_ref().map(ToString::to_string)),
                ("VersionID", metadata.version_id.clone()),
                ("Encryption", metadata.server_side_encryption.clone()),
                ("Restore", metadata.restore.clone()),
            ];
            lines.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
            lines.extend(
                metadata
                    .user_metadata
                    .iter()
                    .map(|(k, v)| ("Metadata", format!("{k}={v}"))),
            );
            lines
        }
    }
}

fn print_stat(formatter: &Formatter, output: &StatOutput) {
    if formatter.is_json() {
        formatter.json(output);
        return;
    }
    for (label, value) in stat_lines(output) {
        formatter.println(&format!("{label:<11}: {value}"));
    }
}
