//! File transfers
//!
//! Uploads above a size threshold go through a multipart upload with
//! bounded concurrency. When a state directory is configured the upload
//! state is written after every part so an interrupted transfer can be
//! resumed by a later run.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};

use s3kit_core::model::{
    AbortMultipartUploadRequest, CannedAcl, CompleteMultipartUploadRequest, CompletedPart,
    CreateMultipartUploadRequest, GetObjectRequest, ListPartsRequest, MAX_PART_NUMBER,
    MAX_PART_SIZE, MIN_PART_SIZE, ObjectBody, Part, PutObjectRequest, ServerSideEncryption,
    StorageClass, UploadPartRequest, UserMetadata,
};
use s3kit_core::{Error, Result, S3Api};

/// Default part size: 64 MiB
pub const DEFAULT_PART_SIZE: u64 = 64 * 1024 * 1024;

/// Files at or above this size use multipart uploads by default
pub const DEFAULT_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Maximum number of parts in one upload
pub const MAX_PARTS: u64 = MAX_PART_NUMBER as u64;

/// Multipart upload configuration
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Part size in bytes
    pub part_size: u64,

    /// Number of parts uploaded concurrently
    pub concurrency: usize,

    /// Smallest file size sent as a multipart upload
    pub threshold: u64,

    /// Directory for resume state files
    pub state_dir: Option<PathBuf>,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            concurrency: 4,
            threshold: DEFAULT_THRESHOLD,
            state_dir: None,
        }
    }
}

impl MultipartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part_size(mut self, size: u64) -> Self {
        self.part_size = size.clamp(MIN_PART_SIZE, MAX_PART_SIZE);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn threshold(mut self, size: u64) -> Self {
        self.threshold = size;
        self
    }

    pub fn state_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(path.into());
        self
    }

    /// Part size for a file, grown when needed to stay within the part limit
    pub fn calculate_part_size(&self, file_size: u64) -> u64 {
        if file_size <= MIN_PART_SIZE {
            return MIN_PART_SIZE;
        }

        let part_size = self.part_size.clamp(MIN_PART_SIZE, MAX_PART_SIZE);
        if file_size.div_ceil(part_size) <= MAX_PARTS {
            part_size
        } else {
            file_size
                .div_ceil(MAX_PARTS)
                .clamp(MIN_PART_SIZE, MAX_PART_SIZE)
        }
    }
}

/// Object attributes applied to an upload
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub metadata: UserMetadata,
    pub acl: Option<CannedAcl>,
    pub storage_class: Option<StorageClass>,
    pub encryption: Option<ServerSideEncryption>,
}

/// Result of a finished upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub size: u64,
    /// Zero for single-request uploads
    pub parts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// State of a multipart upload (for resume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadState {
    pub upload_id: String,

    /// `bucket/key` being written
    pub target: String,

    /// Local source file
    pub source: Option<String>,

    pub total_size: u64,

    pub part_size: u64,

    pub completed_parts: Vec<CompletedPart>,

    pub last_updated: jiff::Timestamp,
}

impl UploadState {
    pub fn new(
        upload_id: impl Into<String>,
        target: impl Into<String>,
        total_size: u64,
        part_size: u64,
    ) -> Self {
        Self {
            upload_id: upload_id.into(),
            target: target.into(),
            source: None,
            total_size,
            part_size,
            completed_parts: Vec::new(),
            last_updated: jiff::Timestamp::now(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn add_completed_part(&mut self, part_number: i32, etag: String) {
        self.completed_parts.push(CompletedPart { part_number, etag });
        self.last_updated = jiff::Timestamp::now();
    }

    pub fn is_completed(&self, part_number: i32) -> bool {
        self.completed_parts
            .iter()
            .any(|p| p.part_number == part_number)
    }

    /// Part numbers not yet uploaded, in ascending order
    pub fn missing_parts(&self) -> Vec<i32> {
        let count = calculate_parts(self.total_size, self.part_size) as i32;
        (1..=count).filter(|n| !self.is_completed(*n)).collect()
    }

    pub fn completed_bytes(&self) -> u64 {
        self.completed_parts
            .iter()
            .map(|p| {
                let (start, end) = part_byte_range(p.part_number, self.part_size, self.total_size);
                end - start
            })
            .sum()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_size == 0 {
            return 100.0;
        }
        (self.completed_bytes() as f64 / self.total_size as f64 * 100.0).min(100.0)
    }

    pub fn state_file_path(state_dir: &Path, upload_id: &str) -> PathBuf {
        let safe_id: String = upload_id
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        state_dir.join(format!("upload_{safe_id}.json"))
    }

    pub fn save(&self, state_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(state_dir)?;
        let path = Self::state_file_path(state_dir, &self.upload_id);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(state_dir: &Path, upload_id: &str) -> Result<Self> {
        let path = Self::state_file_path(state_dir, upload_id);
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn delete(state_dir: &Path, upload_id: &str) -> Result<()> {
        let path = Self::state_file_path(state_dir, upload_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Pending uploads for a target; unreadable state files are skipped
    pub fn find_pending(state_dir: &Path, target: &str) -> Result<Vec<Self>> {
        let mut pending = Vec::new();
        if !state_dir.exists() {
            return Ok(pending);
        }

        for entry in std::fs::read_dir(state_dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<Self>(&content) {
                Ok(state) if state.target == target => pending.push(state),
                Ok(_) => {}
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "ignoring state file"),
            }
        }

        Ok(pending)
    }
}

/// Number of parts for a file
pub fn calculate_parts(file_size: u64, part_size: u64) -> usize {
    file_size.div_ceil(part_size.max(1)) as usize
}

/// Byte range `[start, end)` of a part
pub fn part_byte_range(part_number: i32, part_size: u64, total_size: u64) -> (u64, u64) {
    let start = (part_number as u64 - 1) * part_size;
    let end = (start + part_size).min(total_size);
    (start, end)
}

/// Upload a local file, reporting transferred bytes to `progress`
pub async fn upload_file<A, P>(
    api: &A,
    path: &Path,
    bucket: &str,
    key: &str,
    options: &UploadOptions,
    config: &MultipartConfig,
    progress: P,
) -> Result<UploadOutcome>
where
    A: S3Api + ?Sized,
    P: Fn(u64),
{
    let size = tokio::fs::metadata(path).await?.len();

    if size < config.threshold {
        let mut request = PutObjectRequest::new(bucket, key, ObjectBody::File(path.to_path_buf()));
        request.content_type = options.content_type.clone();
        request.metadata = options.metadata.clone();
        request.acl = options.acl;
        request.storage_class = options.storage_class.clone();
        request.encryption = options.encryption.clone();

        let output = api.put_object(request).await?;
        progress(size);
        return Ok(UploadOutcome {
            size,
            parts: 0,
            etag: output.etag,
            version_id: output.version_id,
        });
    }

    let part_size = config.calculate_part_size(size);
    let target = format!("{bucket}/{key}");
    let source = path.display().to_string();

    let mut state = match resumable_state(api, config, bucket, key, &target, &source, size, part_size).await? {
        Some(state) => {
            tracing::info!(
                upload_id = %state.upload_id,
                completed = state.completed_parts.len(),
                "resuming multipart upload"
            );
            progress(state.completed_bytes());
            state
        }
        None => {
            let mut request = CreateMultipartUploadRequest::new(bucket, key);
            request.content_type = options.content_type.clone();
            request.metadata = options.metadata.clone();
            request.acl = options.acl;
            request.storage_class = options.storage_class.clone();
            request.encryption = options.encryption.clone();

            let created = api.create_multipart_upload(request).await?;
            tracing::debug!(upload_id = %created.upload_id, part_size, "started multipart upload");
            UploadState::new(created.upload_id, &target, size, part_size).with_source(&source)
        }
    };

    match upload_parts(api, path, bucket, key, options, config, &mut state, &progress).await {
        Ok(()) => {}
        Err(e) => {
            if config.state_dir.is_none() {
                abort(api, bucket, key, &state.upload_id).await;
            } else {
                tracing::warn!(upload_id = %state.upload_id, "upload interrupted, state kept for resume");
            }
            return Err(e);
        }
    }

    let parts = state.completed_parts.len();
    let request = CompleteMultipartUploadRequest {
        bucket: bucket.to_string(),
        key: key.to_string(),
        upload_id: state.upload_id.clone(),
        parts: state.completed_parts.clone(),
    };
    let output = api.complete_multipart_upload(request).await?;

    if let Some(dir) = &config.state_dir {
        UploadState::delete(dir, &state.upload_id)?;
    }

    Ok(UploadOutcome {
        size,
        parts,
        etag: output.etag,
        version_id: output.version_id,
    })
}

/// A saved upload for the same file that the service still knows about
#[allow(clippy::too_many_arguments)]
async fn resumable_state<A>(
    api: &A,
    config: &MultipartConfig,
    bucket: &str,
    key: &str,
    target: &str,
    source: &str,
    size: u64,
    part_size: u64,
) -> Result<Option<UploadState>>
where
    A: S3Api + ?Sized,
{
    let Some(dir) = &config.state_dir else {
        return Ok(None);
    };

    let candidate = UploadState::find_pending(dir, target)?.into_iter().find(|s| {
        s.total_size == size && s.part_size == part_size && s.source.as_deref() == Some(source)
    });
    let Some(state) = candidate else {
        return Ok(None);
    };

    let mut state = state;
    match list_uploaded_parts(api, bucket, key, &state.upload_id).await {
        Ok(parts) => {
            state.completed_parts = usable_parts(parts, part_size, size);
            state.save(dir)?;
            Ok(Some(state))
        }
        Err(Error::NotFound(_)) => {
            tracing::debug!(upload_id = %state.upload_id, "saved upload no longer exists");
            UploadState::delete(dir, &state.upload_id)?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Every part the service holds for an upload, following the part marker
async fn list_uploaded_parts<A>(
    api: &A,
    bucket: &str,
    key: &str,
    upload_id: &str,
) -> Result<Vec<Part>>
where
    A: S3Api + ?Sized,
{
    let mut parts = Vec::new();
    let mut marker = None;
    loop {
        let request = ListPartsRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            upload_id: upload_id.to_string(),
            part_number_marker: marker,
            ..Default::default()
        };
        let page = api.list_parts(request).await?;
        parts.extend(page.parts);
        match page.next_part_number_marker {
            Some(next) if page.is_truncated && marker != Some(next) => marker = Some(next),
            _ => return Ok(parts),
        }
    }
}

/// Uploaded parts that fit the current layout; anything else is sent again
fn usable_parts(parts: Vec<Part>, part_size: u64, total_size: u64) -> Vec<CompletedPart> {
    let count = calculate_parts(total_size, part_size) as i32;
    parts
        .into_iter()
        .filter(|p| (1..=count).contains(&p.part_number))
        .filter(|p| {
            let (start, end) = part_byte_range(p.part_number, part_size, total_size);
            u64::try_from(p.size).is_ok_and(|size| size == end - start)
        })
        .map(|p| CompletedPart {
            part_number: p.part_number,
            etag: p.etag,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn upload_parts<A, P>(
    api: &A,
    path: &Path,
    bucket: &str,
    key: &str,
    options: &UploadOptions,
    config: &MultipartConfig,
    state: &mut UploadState,
    progress: &P,
) -> Result<()>
where
    A: S3Api + ?Sized,
    P: Fn(u64),
{
    let customer_key = options
        .encryption
        .as_ref()
        .and_then(|e| e.customer_key())
        .cloned();
    let upload_id = state.upload_id.clone();
    let (part_size, total_size) = (state.part_size, state.total_size);

    let mut uploads = stream::iter(state.missing_parts())
        .map(|part_number| {
            let (start, end) = part_byte_range(part_number, part_size, total_size);
            let request = UploadPartRequest {
                bucket: bucket.to_string(),
                key: key.to_string(),
                upload_id: upload_id.clone(),
                part_number,
                body: ObjectBody::FileRange {
                    path: path.to_path_buf(),
                    offset: start,
                    length: end - start,
                },
                customer_key: customer_key.clone(),
            };
            async move { (end - start, api.upload_part(request).await) }
        })
        .buffer_unordered(config.concurrency.max(1));

    while let Some((bytes, outcome)) = uploads.next().await {
        let part = outcome?;
        state.add_completed_part(part.part_number, part.etag);
        if let Some(dir) = &config.state_dir {
            state.save(dir)?;
        }
        progress(bytes);
    }
    Ok(())
}

async fn abort<A>(api: &A, bucket: &str, key: &str, upload_id: &str)
where
    A: S3Api + ?Sized,
{
    let request = AbortMultipartUploadRequest {
        bucket: bucket.to_string(),
        key: key.to_string(),
        upload_id: upload_id.to_string(),
    };
    if let Err(e) = api.abort_multipart_upload(request).await {
        tracing::warn!(upload_id, error = %e, "failed to abort multipart upload");
    }
}

/// Download an object to a local file, returning the number of bytes written
pub async fn download_file<A>(api: &A, bucket: &str, key: &str, path: &Path) -> Result<u64>
where
    A: S3Api + ?Sized,
{
    let output = api.get_object(GetObjectRequest::new(bucket, key)).await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &output.body).await?;
    tracing::debug!(bucket, key, path = %path.display(), bytes = output.body.len(), "downloaded");
    Ok(output.body.len() as u64)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use s3kit_core::MockS3Api;
    use s3kit_core::model::*;

    fn temp_file(size: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'x'; size]).unwrap();
        file.flush().unwrap();
        file
    }

    fn part_etag(request: &UploadPartRequest) -> Result<UploadPartOutput> {
        Ok(UploadPartOutput {
            part_number: request.part_number,
            etag: format!("etag-{}", request.part_number),
        })
    }

    fn multipart_config() -> MultipartConfig {
        MultipartConfig::new()
            .part_size(MIN_PART_SIZE)
            .threshold(1024)
            .concurrency(1)
    }

    #[test]
    fn test_default_config() {
        let config = MultipartConfig::default();
        assert_eq!(config.part_size, DEFAULT_PART_SIZE);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_part_size_clamping() {
        assert_eq!(MultipartConfig::new().part_size(1024).part_size, MIN_PART_SIZE);
        assert_eq!(
            MultipartConfig::new().part_size(10 * 1024 * 1024 * 1024).part_size,
            MAX_PART_SIZE
        );
        assert_eq!(MultipartConfig::new().concurrency(0).concurrency, 1);
    }

    #[test]
    fn test_calculate_part_size_large_file() {
        let config = MultipartConfig::default();
        assert_eq!(config.calculate_part_size(1024 * 1024), MIN_PART_SIZE);

        let huge_file = DEFAULT_PART_SIZE * 20_000;
        let size = config.calculate_part_size(huge_file);
        assert!(calculate_parts(huge_file, size) as u64 <= MAX_PARTS);
    }

    #[test]
    fn test_part_byte_range() {
        assert_eq!(part_byte_range(1, 100, 250), (0, 100));
        assert_eq!(part_byte_range(2, 100, 250), (100, 200));
        assert_eq!(part_byte_range(3, 100, 250), (200, 250));
    }

    #[test]
    fn test_upload_state_progress() {
        let mut state = UploadState::new("upload-123", "bucket/key", 250, 100);
        assert_eq!(state.missing_parts(), vec![1, 2, 3]);

        state.add_completed_part(3, "etag3".into());
        assert_eq!(state.missing_parts(), vec![1, 2]);
        assert_eq!(state.completed_bytes(), 50);
        assert_eq!(state.progress_percent(), 20.0);
    }

    #[test]
    fn test_state_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = UploadState::new("up/1", "bucket/key", 250, 100).with_source("/tmp/a");
        state.add_completed_part(1, "etag1".into());
        state.save(dir.path()).unwrap();
        UploadState::new("up-2", "bucket/other", 10, 10)
            .save(dir.path())
            .unwrap();
        std::fs::write(dir.path().join("garbage.json"), "{").unwrap();

        let pending = UploadState::find_pending(dir.path(), "bucket/key").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].upload_id, "up/1");
        assert_eq!(pending[0].completed_parts.len(), 1);

        let loaded = UploadState::load(dir.path(), "up/1").unwrap();
        assert_eq!(loaded.source.as_deref(), Some("/tmp/a"));

        UploadState::delete(dir.path(), "up/1").unwrap();
        assert!(UploadState::find_pending(dir.path(), "bucket/key").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_small_file_uses_put_object() {
        let file = temp_file(100);
        let mut api = MockS3Api::new();
        api.expect_put_object()
            .withf(|r| r.key == "small.txt" && matches!(r.body, ObjectBody::File(_)))
            .times(1)
            .returning(|_| {
                Ok(PutObjectOutput {
                    etag: Some("abc".into()),
                    ..Default::default()
                })
            });

        let seen = AtomicU64::new(0);
        let outcome = upload_file(
            &api,
            file.path(),
            "bucket",
            "small.txt",
            &UploadOptions::default(),
            &MultipartConfig::default(),
            |n| {
                seen.fetch_add(n, Ordering::SeqCst);
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.parts, 0);
        assert_eq!(outcome.etag.as_deref(), Some("abc"));
        assert_eq!(seen.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_multipart_upload_completes_sorted_parts() {
        let size = MIN_PART_SIZE as usize + 10;
        let file = temp_file(size);
        let mut api = MockS3Api::new();
        api.expect_create_multipart_upload().times(1).returning(|r| {
            Ok(CreateMultipartUploadOutput {
                bucket: r.bucket,
                key: r.key,
                upload_id: "upload-1".into(),
            })
        });
        api.expect_upload_part()
            .times(2)
            .returning(|r| part_etag(&r));
        api.expect_complete_multipart_upload()
            .withf(|r| {
                r.upload_id == "upload-1"
                    && r.parts.iter().map(|p| p.part_number).collect::<Vec<_>>() == vec![1, 2]
            })
            .times(1)
            .returning(|_| {
                Ok(CompleteMultipartUploadOutput {
                    etag: Some("final-2".into()),
                    ..Default::default()
                })
            });

        let seen = AtomicU64::new(0);
        let outcome = upload_file(
            &api,
            file.path(),
            "bucket",
            "big.bin",
            &UploadOptions::default(),
            &multipart_config(),
            |n| {
                seen.fetch_add(n, Ordering::SeqCst);
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.parts, 2);
        assert_eq!(outcome.size, size as u64);
        assert_eq!(seen.load(Ordering::SeqCst), size as u64);
    }

    #[tokio::test]
    async fn test_failed_upload_is_aborted_without_state_dir() {
        let file = temp_file(MIN_PART_SIZE as usize + 10);
        let mut api = MockS3Api::new();
        api.expect_create_multipart_upload().returning(|r| {
            Ok(CreateMultipartUploadOutput {
                bucket: r.bucket,
                key: r.key,
                upload_id: "upload-1".into(),
            })
        });
        api.expect_upload_part().returning(|r| {
            if r.part_number == 2 {
                Err(Error::Network("connection reset".into()))
            } else {
                part_etag(&r)
            }
        });
        api.expect_abort_multipart_upload()
            .withf(|r| r.upload_id == "upload-1")
            .times(1)
            .returning(|_| Ok(()));
        api.expect_complete_multipart_upload().never();

        let err = upload_file(
            &api,
            file.path(),
            "bucket",
            "big.bin",
            &UploadOptions::default(),
            &multipart_config(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_interrupted_upload_resumes_missing_parts() {
        let file = temp_file(2 * MIN_PART_SIZE as usize + 10);
        let state_dir = tempfile::tempdir().unwrap();
        let config = multipart_config().state_dir(state_dir.path());

        // First run: part 2 fails, the state with part 1 is kept.
        let mut api = MockS3Api::new();
        api.expect_create_multipart_upload().times(1).returning(|r| {
            Ok(CreateMultipartUploadOutput {
                bucket: r.bucket,
                key: r.key,
                upload_id: "upload-1".into(),
            })
        });
        api.expect_upload_part().returning(|r| {
            if r.part_number == 2 {
                Err(Error::Network("connection reset".into()))
            } else {
                part_etag(&r)
            }
        });
        api.expect_abort_multipart_upload().never();

        let options = UploadOptions::default();
        upload_file(&api, file.path(), "bucket", "big.bin", &options, &config, |_| {})
            .await
            .unwrap_err();

        let pending = UploadState::find_pending(state_dir.path(), "bucket/big.bin").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].missing_parts(), vec![2, 3]);

        // Second run: the service reports part 2 as well, one page at a
        // time, so only part 3 is sent and the listed ETags are used.
        let mut api = MockS3Api::new();
        api.expect_create_multipart_upload().never();
        api.expect_list_parts()
            .withf(|r| r.upload_id == "upload-1")
            .times(2)
            .returning(|r| {
                let part_number = r.part_number_marker.unwrap_or(0) + 1;
                Ok(ListPartsOutput {
                    parts: vec![Part {
                        part_number,
                        etag: format!("listed-{part_number}"),
                        size: MIN_PART_SIZE as i64,
                        last_modified: None,
                    }],
                    is_truncated: part_number == 1,
                    next_part_number_marker: Some(part_number),
                })
            });
        api.expect_upload_part()
            .withf(|r| r.part_number == 3 && r.upload_id == "upload-1")
            .times(1)
            .returning(|r| part_etag(&r));
        api.expect_complete_multipart_upload()
            .withf(|r| {
                let etags: Vec<&str> = r.parts.iter().map(|p| p.etag.as_str()).collect();
                etags.len() == 3 && etags[..2] == ["listed-1", "listed-2"]
            })
            .times(1)
            .returning(|_| Ok(CompleteMultipartUploadOutput::default()));

        let outcome = upload_file(&api, file.path(), "bucket", "big.bin", &options, &config, |_| {})
            .await
            .unwrap();
        assert_eq!(outcome.parts, 3);
        assert!(
            UploadState::find_pending(state_dir.path(), "bucket/big.bin")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_usable_parts_drop_foreign_layouts() {
        let part = |part_number, size| Part {
            part_number,
            etag: format!("e{part_number}"),
            size,
            last_modified: None,
        };
        let total = 2 * MIN_PART_SIZE + 10;
        let parts = vec![
            part(1, MIN_PART_SIZE as i64),
            part(2, 1024),
            part(3, 10),
            part(4, 10),
            part(0, 10),
        ];
        let usable = usable_parts(parts, MIN_PART_SIZE, total);
        let numbers: Vec<i32> = usable.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(usable[0].etag, "e1");
    }

    #[test]
    fn test_zero_part_size_is_clamped() {
        let config = MultipartConfig {
            part_size: 0,
            ..MultipartConfig::new()
        };
        assert_eq!(config.calculate_part_size(100 * MIN_PART_SIZE), MIN_PART_SIZE);
        assert_eq!(calculate_parts(10, 0), 10);

        let state = UploadState::new("id", "bucket/key", 3, 0);
        assert_eq!(state.missing_parts(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.txt");
        let mut api = MockS3Api::new();
        api.expect_get_object()
            .withf(|r| r.bucket == "bucket" && r.key == "in.txt")
            .returning(|_| {
                Ok(GetObjectOutput {
                    body: b"hello".to_vec(),
                    ..Default::default()
                })
            });

        let written = download_file(&api, "bucket", "in.txt", &target).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    }
}
