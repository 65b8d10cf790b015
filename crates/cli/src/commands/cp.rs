//! cp command - Copy files and objects
//!
//! Copies between the local filesystem and S3, or between S3 locations.
//! Large uploads are sent as resumable multipart uploads.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use s3kit_client::S3Client;
use s3kit_client::transfer::{self, MultipartConfig, UploadOptions};
use s3kit_core::model::{
    CannedAcl, CopyObjectRequest, CustomerKey, ListObjectsV2Request, MetadataDirective,
    ServerSideEncryption, StorageClass, UserMetadata,
};
use s3kit_core::{ConfigManager, Error, Location, Result, S3Api as _, S3Url, parse_location};

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

const MIB: u64 = 1024 * 1024;

/// Copy files and objects
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source: local path, glob pattern, or s3://bucket/key
    pub source: String,

    /// Destination: local path or s3://bucket/key
    pub target: String,

    /// Copy directories and prefixes recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Continue with the remaining files after an error
    #[arg(long)]
    pub continue_on_error: bool,

    /// Only show what would be copied
    #[arg(long)]
    pub dry_run: bool,

    /// Storage class for uploaded objects
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Content type for uploaded files (guessed from the extension otherwise)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Canned ACL for uploaded objects
    #[arg(long)]
    pub acl: Option<String>,

    /// User metadata as KEY=VALUE (repeatable)
    #[arg(long = "metadata", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Server-side encryption: s3 or kms
    #[arg(long)]
    pub sse: Option<String>,

    /// KMS key id used with --sse kms
    #[arg(long, requires = "sse")]
    pub sse_kms_key_id: Option<String>,

    /// Customer-provided encryption key (base64, 32 bytes)
    #[arg(long, conflicts_with = "sse")]
    pub sse_c_key: Option<String>,

    /// Multipart part size in MiB
    #[arg(long, default_value_t = 64)]
    pub part_size: u64,

    /// Number of parts uploaded in parallel
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Do not record or resume interrupted multipart uploads
    #[arg(long)]
    pub no_resume: bool,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parts: Option<usize>,
}

impl CpOutput {
    fn new(source: String, target: String, size: u64) -> Self {
        Self {
            status: "success",
            source,
            target,
            size_bytes: size,
            size_human: humansize::format_size(size, humansize::BINARY),
            parts: None,
        }
    }
}

/// Totals across a multi-file copy
#[derive(Debug, Default)]
struct Tally {
    succeeded: usize,
    failed: usize,
    last_error: Option<ExitCode>,
}

impl Tally {
    fn record(&mut self, result: Result<()>, formatter: &Formatter, what: &str) -> bool {
        match result {
            Ok(()) => {
                self.succeeded += 1;
                true
            }
            Err(e) => {
                self.failed += 1;
                self.last_error = Some(fail(formatter, &format!("Failed to copy {what}"), &e));
                false
            }
        }
    }

    fn finish(self, formatter: &Formatter, verb: &str) -> ExitCode {
        if self.failed > 0 {
            formatter.warning(&format!(
                "Completed with errors: {} succeeded, {} failed",
                self.succeeded, self.failed
            ));
            return self.last_error.unwrap_or(ExitCode::GeneralError);
        }
        formatter.success(&format!("{verb} {} file(s)", self.succeeded));
        ExitCode::Success
    }
}

/// Parse `s3` / `kms` / an SSE-C key into an encryption setting
fn parse_encryption(args: &CpArgs) -> Result<Option<ServerSideEncryption>> {
    if let Some(key) = &args.sse_c_key {
        return CustomerKey::from_base64(key).map(|k| Some(ServerSideEncryption::Customer(k)));
    }
    match args.sse.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(None),
        Some("s3") | Some("aes256") => Ok(Some(ServerSideEncryption::S3)),
        Some("kms") | Some("aws:kms") => Ok(Some(ServerSideEncryption::Kms {
            key_id: args.sse_kms_key_id.clone(),
        })),
        Some(other) => Err(Error::InvalidArgument(format!(
            "--sse must be 's3' or 'kms', got '{other}'"
        ))),
    }
}

fn parse_metadata(pairs: &[String]) -> Result<UserMetadata> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| Error::InvalidArgument(format!("metadata must be KEY=VALUE, got '{pair}'")))
        })
        .collect()
}

fn upload_options(args: &CpArgs) -> Result<UploadOptions> {
    Ok(UploadOptions {
        content_type: args.content_type.clone(),
        metadata: parse_metadata(&args.metadata)?,
        acl: args.acl.as_deref().map(str::parse::<CannedAcl>).transpose()?,
        storage_class: args.storage_class.as_deref().map(StorageClass::from),
        encryption: parse_encryption(args)?,
    })
}

fn multipart_config(args: &CpArgs) -> Result<MultipartConfig> {
    let mut config = MultipartConfig::new()
        .part_size(args.part_size.saturating_mul(MIB))
        .concurrency(args.concurrency);
    if !args.no_resume {
        let manager = ConfigManager::new()?;
        if let Some(dir) = manager.config_path().parent() {
            config = config.state_dir(dir.join("uploads"));
        }
    }
    Ok(config)
}

fn has_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Files under a directory as (path, `/`-separated relative path)
fn walk_dir(dir: &Path, base: &Path) -> std::io::Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(walk_dir(&path, base)?);
        } else if path.is_file() {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            files.push((path.clone(), relative.to_string_lossy().replace('\\', "/")));
        }
    }
    files.sort();
    Ok(files)
}

/// Local files selected by a source argument, each with the name it gets
/// under a destination prefix
fn collect_local_sources(source: &str, recursive: bool) -> Result<Vec<(PathBuf, String)>> {
    if has_glob(source) {
        let paths = glob::glob(source)
            .map_err(|e| Error::InvalidArgument(format!("invalid pattern '{source}': {e}")))?;
        let mut files = Vec::new();
        for path in paths {
            let path = path.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() {
                let name = file_name(&path)?;
                files.push((path, name));
            }
        }
        if files.is_empty() {
            return Err(Error::NotFound(format!("no files match '{source}'")));
        }
        return Ok(files);
    }

    let path = PathBuf::from(source);
    if path.is_dir() {
        if !recursive {
            return Err(Error::InvalidArgument(format!(
                "{source} is a directory; use -r/--recursive to copy directories"
            )));
        }
        Ok(walk_dir(&path, &path)?)
    } else if path.is_file() {
        let name = file_name(&path)?;
        Ok(vec![(path, name)])
    } else {
        Err(Error::NotFound(format!("source not found: {source}")))
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidArgument(format!("{} has no file name", path.display())))
}

/// Destination key for an upload; `as_dir` forces prefix semantics
fn upload_key(dst: &S3Url, name: &str, as_dir: bool) -> String {
    if as_dir || dst.is_dir || dst.key.is_empty() {
        format!("{}{name}", dst.dir_prefix())
    } else {
        dst.key.clone()
    }
}

pub async fn execute(args: CpArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let target = match parse_location(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target path", &e),
    };

    // Glob patterns are expanded here rather than parsed as paths
    let source = if has_glob(&args.source) && !args.source.starts_with("s3://") {
        Location::Local(PathBuf::from(&args.source))
    } else {
        match parse_location(&args.source) {
            Ok(source) => source,
            Err(e) => return fail(&formatter, "Invalid source path", &e),
        }
    };

    match (source, target) {
        (Location::Local(_), Location::Remote(dst)) => upload(&args, &dst, ctx).await,
        (Location::Remote(src), Location::Local(dst)) => download(&args, &src, &dst, ctx).await,
        (Location::Remote(src), Location::Remote(dst)) => copy_remote(&args, &src, &dst, ctx).await,
        (Location::Local(_), Location::Local(_)) => {
            formatter.error("Cannot copy between two local paths. Use the system cp command.");
            ExitCode::UsageError
        }
    }
}

async fn upload(args: &CpArgs, dst: &S3Url, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let prepared = collect_local_sources(&args.source, args.recursive).and_then(|files| {
        Ok((files, upload_options(args)?, multipart_config(args)?))
    });
    let (files, options, config) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return fail(&formatter, "Cannot upload", &e),
    };
    let client = match ctx.client_for(dst).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    let as_dir = files.len() > 1 || Path::new(&args.source).is_dir();
    let mut tally = Tally::default();

    for (path, name) in files {
        let mut options = options.clone();
        if options.content_type.is_none() {
            options.content_type = mime_guess::from_path(&path)
                .first()
                .map(|m| m.essence_str().to_string());
        }
        let key = upload_key(dst, &name, as_dir);
        let result = upload_one(&client, &path, dst, &key, &options, &config, &formatter, args.dry_run).await;
        if !tally.record(result, &formatter, &path.display().to_string()) && !args.continue_on_error {
            break;
        }
    }

    tally.finish(&formatter, "Uploaded")
}

#[allow(clippy::too_many_arguments)]
async fn upload_one(
    client: &S3Client,
    path: &Path,
    dst: &S3Url,
    key: &str,
    options: &UploadOptions,
    config: &MultipartConfig,
    formatter: &Formatter,
    dry_run: bool,
) -> Result<()> {
    let target = dst.with_key(key);
    let source = path.display().to_string();

    if dry_run {
        formatter.println(&format!("Would copy: {source} -> {target}"));
        return Ok(());
    }

    let size = std::fs::metadata(path)?.len();
    let bar = ProgressBar::new(formatter.config(), size, &file_name(path)?);
    let outcome = transfer::upload_file(client, path, &dst.bucket, key, options, config, |n| {
        bar.inc(n)
    })
    .await;
    bar.finish_and_clear();
    let outcome = outcome?;

    if formatter.is_json() {
        let mut output = CpOutput::new(source, target.to_string(), outcome.size);
        output.parts = (outcome.parts > 0).then_some(outcome.parts);
        formatter.json(&output);
    } else {
        formatter.println(&format!(
            "{source} -> {target} ({})",
            humansize::format_size(outcome.size, humansize::BINARY)
        ));
    }
    Ok(())
}

/// Keys under a URL treated as a prefix, each with its path relative to it
async fn list_tree(client: &S3Client, url: &S3Url) -> Result<Vec<(String, String)>> {
    let prefix = url.dir_prefix();
    let mut request = ListObjectsV2Request::new(&url.bucket);
    request.prefix = Some(prefix.clone()).filter(|p| !p.is_empty());

    let mut keys = Vec::new();
    loop {
        let page = client.list_objects_v2(request.clone()).await?;
        keys.extend(page.contents.into_iter().filter_map(|o| {
            let relative = o.key.strip_prefix(&prefix)?.to_string();
            // Zero-byte "directory" markers
            (!relative.is_empty() && !relative.ends_with('/')).then_some((o.key, relative))
        }));
        match page.next_continuation_token {
            Some(token) if page.is_truncated => request.continuation_token = Some(token),
            _ => break,
        }
    }
    Ok(keys)
}

/// Local file for a single-object download
fn download_path(dst: &Path, key: &str) -> PathBuf {
    let treat_as_dir = dst.is_dir() || dst.to_string_lossy().ends_with(['/', '\\']);
    if treat_as_dir {
        dst.join(key.rsplit('/').next().unwrap_or(key))
    } else {
        dst.to_path_buf()
    }
}

async fn download(args: &CpArgs, src: &S3Url, dst: &Path, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let client = match ctx.client_for(src).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    let items = if args.recursive || src.is_dir || src.key.is_empty() {
        match list_tree(&client, src).await {
            Ok(keys) => keys
                .into_iter()
                .map(|(key, relative)| (key, dst.join(relative)))
                .collect(),
            Err(e) => return fail(&formatter, &format!("Failed to list {src}"), &e),
        }
    } else {
        vec![(src.key.clone(), download_path(dst, &src.key))]
    };

    let mut tally = Tally::default();
    for (key, path) in items {
        let source = src.with_key(&key);
        let result = async {
            if args.dry_run {
                formatter.println(&format!("Would copy: {source} -> {}", path.display()));
                return Ok(());
            }
            let size = transfer::download_file(&client, &src.bucket, &key, &path).await?;
            if formatter.is_json() {
                formatter.json(&CpOutput::new(source.to_string(), path.display().to_string(), size));
            } else {
                formatter.println(&format!(
                    "{source} -> {} ({})",
                    path.display(),
                    humansize::format_size(size, humansize::BINARY)
                ));
            }
            Ok(())
        }
        .await;
        if !tally.record(result, &formatter, &source.to_string()) && !args.continue_on_error {
            break;
        }
    }

    tally.finish(&formatter, "Downloaded")
}

async fn copy_remote(args: &CpArgs, src: &S3Url, dst: &S3Url, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let prepared = async {
        let options = upload_options(args)?;
        let source_client = ctx.client_for(src).await?;
        let client = ctx.client_for(dst).await?;
        Ok::<_, Error>((options, source_client, client))
    };
    let (options, source_client, client) = match prepared.await {
        Ok(prepared) => prepared,
        Err(e) => return fail(&formatter, "Cannot copy", &e),
    };

    let recursive = args.recursive || src.is_dir || src.key.is_empty();
    let items = if recursive {
        match list_tree(&source_client, src).await {
            Ok(keys) => keys
                .into_iter()
                .map(|(key, relative)| (key, format!("{}{relative}", dst.dir_prefix())))
                .collect(),
            Err(e) => return fail(&formatter, &format!("Failed to list {src}"), &e),
        }
    } else {
        let name = src.key.rsplit('/').next().unwrap_or(&src.key);
        vec![(src.key.clone(), upload_key(dst, name, false))]
    };

    let mut tally = Tally::default();
    for (key, dst_key) in items {
        let source = src.with_key(&key);
        let target = dst.with_key(&dst_key);
        let result = async {
            if args.dry_run {
                formatter.println(&format!("Would copy: {source} -> {target}"));
                return Ok(());
            }
            let mut request = CopyObjectRequest::new(&src.bucket, &key, &dst.bucket, &dst_key);
            request.acl = options.acl;
            request.storage_class = options.storage_class.clone();
            request.encryption = options.encryption.clone();
            request.content_type = options.content_type.clone();
            if !options.metadata.is_empty() {
                request.metadata_directive = MetadataDirective::Replace;
                request.metadata = options.metadata.clone();
            }
            client.copy_object(request).await?;
            if formatter.is_json() {
                formatter.json(&serde_json::json!({
                    "status": "success",
                    "source": source.to_string(),
                    "target": target.to_string(),
                }));
            } else {
                formatter.println(&format!("{source} -> {target}"));
            }
            Ok(())
        }
        .await;
        if !tally.record(result, &formatter, &source.to_string()) && !args.continue_on_error {
            break;
        }
    }

    tally.finish(&formatter, "Copied")
}
