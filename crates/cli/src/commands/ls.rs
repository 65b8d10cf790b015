//! ls command - List buckets and objects
//!
//! Lists buckets when given no path, or objects under a bucket or prefix.

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;

use s3kit_client::S3Client;
use s3kit_core::model::{ListBucketsRequest, ListObjectsV2Request, ObjectSummary};
use s3kit_core::{Result, S3Api as _, S3Url};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List buckets or objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// s3://bucket[/prefix]; lists buckets when omitted
    pub path: Option<String>,

    /// List recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Summarize output (show totals)
    #[arg(long)]
    pub summarize: bool,
}

/// One line of a listing
#[derive(Debug, Clone, Serialize)]
struct Entry {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<i64>,
    is_dir: bool,
}

impl From<ObjectSummary> for Entry {
    fn from(object: ObjectSummary) -> Self {
        Self {
            key: object.key,
            last_modified: object.last_modified,
            size_bytes: Some(object.size),
            is_dir: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(entries: &[Entry]) -> Self {
        let total_size: i64 = entries.iter().filter_map(|e| e.size_bytes).sum();
        Self {
            total_objects: entries.iter().filter(|e| !e.is_dir).count(),
            total_size_bytes: total_size,
            total_size_human: humansize::format_size(total_size.max(0) as u64, humansize::BINARY),
        }
    }
}

pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let Some(path) = args.path.as_deref() else {
        let client = match ctx.client().await {
            Ok(client) => client,
            Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
        };
        return match list_buckets(&client).await {
            Ok(entries) => {
                print_entries(&formatter, entries, args.summarize);
                ExitCode::Success
            }
            Err(e) => fail(&formatter, "Failed to list buckets", &e),
        };
    };

    let url = match parse_remote(path) {
        Ok(url) => url,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let client = match ctx.client_for(&url).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    match list_objects(&client, &url, args.recursive).await {
        Ok(entries) => {
            print_entries(&formatter, entries, args.summarize);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Failed to list {url}"), &e),
    }
}

async fn list_buckets(client: &S3Client) -> Result<Vec<Entry>> {
    let output = client.list_buckets(ListBucketsRequest).await?;
    Ok(output
        .buckets
        .into_iter()
        .map(|bucket| Entry {
            key: format!("{}/", bucket.name),
            last_modified: bucket.creation_date,
            size_bytes: None,
            is_dir: true,
        })
        .collect())
}

/// Listing prefix for a URL: a trailing slash lists inside the "directory",
/// otherwise the key is matched as a plain prefix
fn listing_prefix(url: &S3Url) -> Option<String> {
    if url.key.is_empty() {
        None
    } else if url.is_dir {
        Some(url.dir_prefix())
    } else {
        Some(url.key.clone())
    }
}

async fn list_objects(client: &S3Client, url: &S3Url, recursive: bool) -> Result<Vec<Entry>> {
    let mut request = ListObjectsV2Request::new(&url.bucket);
    request.prefix = listing_prefix(url);
    request.delimiter = (!recursive).then(|| "/".to_string());

    let mut entries = Vec::new();
    loop {
        let page = client.list_objects_v2(request.clone()).await?;
        entries.extend(page.common_prefixes.into_iter().map(|prefix| Entry {
            key: prefix,
            last_modified: None,
            size_bytes: None,
            is_dir: true,
        }));
        entries.extend(page.contents.into_iter().map(Entry::from));

        match page.next_continuation_token {
            Some(token) if page.is_truncated => request.continuation_token = Some(token),
            _ => break,
        }
    }
    tracing::debug!(url = %url, count = entries.len(), "listed objects");
    Ok(entries)
}

/// Human-readable listing lines
fn format_entries(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let date = entry
                .last_modified
                .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| " ".repeat(19));
            let size = match entry.size_bytes {
                Some(size) if !entry.is_dir => {
                    humansize::format_size(size.max(0) as u64, humansize::BINARY)
                }
                _ => "DIR".to_string(),
            };
            format!("[{date}] {size:>10} {}", entry.key)
        })
        .collect()
}

fn print_entries(formatter: &Formatter, entries: Vec<Entry>, summarize: bool) {
    let summary = summarize.then(|| Summary::of(&entries));

    if formatter.is_json() {
        formatter.json(&LsOutput {
            items: entries,
            summary,
        });
        return;
    }

    for line in format_entries(&entries) {
        formatter.println(&line);
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(key: &str, size: i64) -> Entry {
        Entry {
            key: key.to_string(),
            last_modified: Some("2024-03-01T12:30:00Z".parse().unwrap()),
            size_bytes: Some(size),
            is_dir: false,
        }
    }

    fn dir(key: &str) -> Entry {
        Entry {
            key: key.to_string(),
            last_modified: None,
            size_bytes: None,
            is_dir: true,
        }
    }

    #[test]
    fn test_listing_prefix() {
        let url = |s: &str| S3Url::parse(s).unwrap();
        assert_eq!(listing_prefix(&url("s3://bucket")), None);
        assert_eq!(listing_prefix(&url("s3://bucket/logs/")).as_deref(), Some("logs/"));
        assert_eq!(listing_prefix(&url("s3://bucket/logs")).as_deref(), Some("logs"));
    }

    #[test]
    fn test_format_entries() {
        let lines = format_entries(&[dir("photos/"), object("notes.txt", 2048), object("empty", 0)]);
        insta::assert_debug_snapshot!(lines, @r#"
        [
            "[                   ]        DIR photos/",
            "[2024-03-01 12:30:00]      2 KiB notes.txt",
            "[2024-03-01 12:30:00]        0 B empty",
        ]
        "#);
    }

    #[test]
    fn test_summary_counts_objects_only() {
        let summary = Summary::of(&[dir("a/"), object("b", 1024), object("c", 1024)]);
        assert_eq!(summary.total_objects, 2);
        assert_eq!(summary.total_size_bytes, 2048);
        assert_eq!(summary.total_size_human, "2 KiB");
    }
}
