//! URL-level file operations
//!
//! Helpers that treat an `s3://` URL like a path: list a "directory", tell
//! objects from prefixes, delete single objects or whole prefixes. The free
//! functions work against any [`S3Api`]; [`S3Fs`] builds clients from the
//! credentials and endpoint carried by each URL.

use std::future::Future;

use jiff::Timestamp;

use s3kit_core::model::{
    DeleteObjectRequest, DeleteObjectsRequest, ListObjectsV2Request, MAX_DELETE_KEYS,
};
use s3kit_core::profile::AddressingStyle;
use s3kit_core::s3url::{default_endpoints, region_from_endpoint};
use s3kit_core::{ClientConfig, Credentials, Error, Result, S3Api, S3Url};

use crate::client::S3Client;

/// Listing of one level under a URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub objects: Vec<S3Url>,
    /// Parallel to `objects`
    pub objects_last_modified: Vec<Option<Timestamp>>,
    pub directories: Vec<S3Url>,
}

impl DirectoryListing {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.directories.is_empty()
    }
}

/// What a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Missing,
    Directory,
    Object,
}

async fn list_with_prefix<A>(api: &A, url: &S3Url, prefix: String) -> Result<DirectoryListing>
where
    A: S3Api + ?Sized,
{
    let mut listing = DirectoryListing::default();
    let mut request = ListObjectsV2Request::new(&url.bucket);
    request.prefix = Some(prefix).filter(|p| !p.is_empty());
    request.delimiter = Some("/".into());

    loop {
        let page = api.list_objects_v2(request.clone()).await?;

        for object in page.contents {
            listing.objects.push(url.with_key(object.key));
            listing.objects_last_modified.push(object.last_modified);
        }
        for prefix in page.common_prefixes {
            let dir = url.with_key(prefix.trim_end_matches('/'));
            listing.directories.push(S3Url { is_dir: true, ..dir });
        }

        match page.next_continuation_token {
            Some(token) if page.is_truncated => request.continuation_token = Some(token),
            _ => break,
        }
    }

    Ok(listing)
}

/// Objects and directories whose names start with the URL's key
pub async fn list_objects<A>(api: &A, url: &S3Url) -> Result<DirectoryListing>
where
    A: S3Api + ?Sized,
{
    tracing::debug!(url = %url, "list objects");
    list_with_prefix(api, url, url.key.clone()).await
}

async fn classify<A>(api: &A, url: &S3Url) -> Result<(PathKind, DirectoryListing)>
where
    A: S3Api + ?Sized,
{
    let listing = match list_objects(api, url).await {
        Ok(listing) => listing,
        Err(Error::NotFound(_)) => return Ok((PathKind::Missing, DirectoryListing::default())),
        Err(e) => return Err(e),
    };

    let kind = if url.key.is_empty() || listing.directories.iter().any(|d| d.key == url.key) {
        PathKind::Directory
    } else if listing.objects.iter().any(|o| o.key == url.key) {
        PathKind::Object
    } else {
        PathKind::Missing
    };
    Ok((kind, listing))
}

/// Whether the URL names a directory, an object, or nothing
pub async fn path_kind<A>(api: &A, url: &S3Url) -> Result<PathKind>
where
    A: S3Api + ?Sized,
{
    classify(api, url).await.map(|(kind, _)| kind)
}

/// Contents of a directory, or the object itself when the URL names one
pub async fn list_directory<A>(api: &A, url: &S3Url) -> Result<DirectoryListing>
where
    A: S3Api + ?Sized,
{
    let (kind, listing) = classify(api, url).await?;
    match kind {
        PathKind::Missing => Ok(DirectoryListing::default()),
        PathKind::Directory => list_with_prefix(api, url, url.dir_prefix()).await,
        PathKind::Object => {
            let last_modified = listing
                .objects
                .iter()
                .zip(listing.objects_last_modified)
                .find(|(o, _)| o.key == url.key)
                .and_then(|(_, t)| t);
            Ok(DirectoryListing {
                objects: vec![url.clone()],
                objects_last_modified: vec![last_modified],
                directories: Vec::new(),
            })
        }
    }
}

pub async fn delete_object<A>(api: &A, url: &S3Url) -> Result<()>
where
    A: S3Api + ?Sized,
{
    tracing::debug!(url = %url, "delete object");
    api.delete_object(DeleteObjectRequest::new(&url.bucket, &url.key))
        .await
        .map(|_| ())
}

/// Delete every object whose key starts with the URL's key
///
/// Returns the number of deleted objects.
pub async fn delete_prefix<A>(api: &A, url: &S3Url) -> Result<usize>
where
    A: S3Api + ?Sized,
{
    let mut keys = Vec::new();
    let mut request = ListObjectsV2Request::new(&url.bucket);
    request.prefix = Some(url.key.clone()).filter(|p| !p.is_empty());

    loop {
        let page = api.list_objects_v2(request.clone()).await?;
        keys.extend(page.contents.into_iter().map(|o| o.key));
        match page.next_continuation_token {
            Some(token) if page.is_truncated => request.continuation_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(url = %url, count = keys.len(), "delete prefix");

    let mut deleted = 0;
    let mut failed = Vec::new();
    for batch in keys.chunks(MAX_DELETE_KEYS) {
        let mut request = DeleteObjectsRequest::from_keys(&url.bucket, batch.iter().cloned());
        request.quiet = true;
        let output = api.delete_objects(request).await?;
        deleted += batch.len().saturating_sub(output.errors.len());
        failed.extend(output.errors.into_iter().map(|e| format!("{} ({})", e.key, e.code)));
    }

    if failed.is_empty() {
        Ok(deleted)
    } else {
        Err(Error::General(format!(
            "failed to delete {} objects: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}

/// Last-modified time of the object the URL names, if it names exactly one
pub async fn last_modified<A>(api: &A, url: &S3Url) -> Result<Option<Timestamp>>
where
    A: S3Api + ?Sized,
{
    let listing = list_objects(api, url).await?;
    match listing.objects_last_modified.as_slice() {
        [single] => Ok(*single),
        _ => Ok(None),
    }
}

/// Run `op` against each endpoint in turn until one does not redirect
///
/// A redirect naming the bucket's endpoint moves that endpoint to the front
/// of the queue.
async fn try_endpoints<T, F, Fut>(endpoints: Vec<String>, mut op: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut queue = std::collections::VecDeque::from(endpoints);
    let mut tried = Vec::new();
    let mut last = Error::Config("no S3 endpoints configured".into());

    while let Some(endpoint) = queue.pop_front() {
        if tried.contains(&endpoint) {
            continue;
        }
        tried.push(endpoint.clone());

        match op(endpoint.clone()).await {
            Err(Error::Redirect { endpoint: hint }) => {
                tracing::debug!(endpoint, ?hint, "redirected, trying next endpoint");
                if let Some(hint) = &hint {
                    queue.push_front(hint.clone());
                }
                last = Error::Redirect { endpoint: hint };
            }
            other => return other,
        }
    }

    Err(last)
}

/// File operations on URLs that carry their own credentials and endpoint
#[derive(Debug, Clone, Default)]
pub struct S3Fs {
    base: ClientConfig,
    credentials: Option<Credentials>,
}

impl S3Fs {
    /// `base` supplies timeouts and retries; region and endpoint are set per URL
    pub fn new(base: ClientConfig) -> Self {
        Self {
            base,
            credentials: None,
        }
    }

    /// Credentials used for URLs that embed none
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn endpoints(url: &S3Url) -> Vec<String> {
        match &url.endpoint {
            Some(endpoint) => vec![endpoint.clone()],
            None => default_endpoints(),
        }
    }

    fn config_for(&self, url: &S3Url, endpoint: &str) -> ClientConfig {
        let mut config = self.base.clone();
        config.region = region_from_endpoint(endpoint);
        config.endpoint = Some(endpoint.to_string());
        if url.endpoint.is_none() && config.addressing_style == AddressingStyle::Auto {
            config.addressing_style = AddressingStyle::Virtual;
        }
        config
    }

    async fn run<T, F, Fut>(&self, url: &S3Url, op: F) -> Result<T>
    where
        F: Fn(S3Client) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credentials = url.credentials.clone().or_else(|| self.credentials.clone());
        try_endpoints(Self::endpoints(url), |endpoint| {
            let config = self.config_for(url, &endpoint);
            let credentials = credentials.clone();
            let op = &op;
            async move { op(S3Client::new(credentials, config).await?).await }
        })
        .await
    }

    pub async fn list_objects(&self, url: &S3Url) -> Result<DirectoryListing> {
        self.run(url, |client| async move { list_objects(&client, url).await })
            .await
    }

    pub async fn path_kind(&self, url: &S3Url) -> Result<PathKind> {
        self.run(url, |client| async move { path_kind(&client, url).await })
            .await
    }

    pub async fn list_directory(&self, url: &S3Url) -> Result<DirectoryListing> {
        self.run(url, |client| async move { list_directory(&client, url).await })
            .await
    }

    pub async fn delete_object(&self, url: &S3Url) -> Result<()> {
        self.run(url, |client| async move { delete_object(&client, url).await })
            .await
    }

    pub async fn delete_prefix(&self, url: &S3Url) -> Result<usize> {
        self.run(url, |client| async move { delete_prefix(&client, url).await })
            .await
    }

    pub async fn last_modified(&self, url: &S3Url) -> Result<Option<Timestamp>> {
        self.run(url, |client| async move { last_modified(&client, url).await })
            .await
    }
}
