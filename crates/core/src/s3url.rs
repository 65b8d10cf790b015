//! `s3://` URL parsing and endpoint helpers
//!
//! URLs have the form `s3://[access_key_id:secret_key:][endpoint/]bucket[/key]`.
//! Credentials embedded in a URL are never printed: `Display` and
//! [`sanitize_url`] strip them.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::profile::Credentials;

/// URL scheme prefix
pub const S3_SCHEME: &str = "s3://";

/// Environment variable overriding the endpoint candidates
pub const ENDPOINT_ENV: &str = "S3KIT_S3_ENDPOINT";

/// Region used when an endpoint does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Regional endpoints tried in order when a URL names none
const REGIONAL_ENDPOINTS: &[&str] = &[
    "s3.amazonaws.com",
    "s3.us-east-2.amazonaws.com",
    "s3.us-west-1.amazonaws.com",
    "s3.us-west-2.amazonaws.com",
    "s3.ca-central-1.amazonaws.com",
    "s3.eu-west-1.amazonaws.com",
    "s3.eu-west-2.amazonaws.com",
    "s3.eu-west-3.amazonaws.com",
    "s3.eu-central-1.amazonaws.com",
    "s3.eu-north-1.amazonaws.com",
    "s3.ap-south-1.amazonaws.com",
    "s3.ap-northeast-1.amazonaws.com",
    "s3.ap-northeast-2.amazonaws.com",
    "s3.ap-southeast-1.amazonaws.com",
    "s3.ap-southeast-2.amazonaws.com",
    "s3.sa-east-1.amazonaws.com",
];

/// A parsed `s3://` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    /// Credentials embedded in the URL
    pub credentials: Option<Credentials>,
    /// Endpoint host named by the URL
    pub endpoint: Option<String>,
    /// Bucket name
    pub bucket: String,
    /// Object key (empty for the bucket root)
    pub key: String,
    /// Whether the URL ended with a slash (directory semantics)
    pub is_dir: bool,
}

impl S3Url {
    /// Create a URL for a bucket and key, without credentials or endpoint
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let is_dir = key.is_empty() || key.ends_with('/');
        Self {
            credentials: None,
            endpoint: None,
            bucket: bucket.into(),
            key: key.trim_end_matches('/').to_string(),
            is_dir,
        }
    }

    /// Parse an `s3://` URL
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| Error::InvalidUrl(format!("URL must start with {S3_SCHEME}")))?;

        let (credentials, rest) = split_credentials(rest)?;
        let is_dir = rest.ends_with('/');

        let mut segments = rest.split('/').filter(|s| !s.is_empty()).peekable();

        let first = segments
            .next()
            .ok_or_else(|| Error::InvalidUrl("URL names no bucket".into()))?;

        let (endpoint, bucket) = if looks_like_endpoint(first) {
            let bucket = segments
                .next()
                .ok_or_else(|| Error::InvalidUrl("URL names no bucket".into()))?;
            (Some(first.to_string()), bucket)
        } else {
            (None, first)
        };

        validate_bucket_name(bucket)?;

        let key = segments.collect::<Vec<_>>().join("/");
        let is_dir = is_dir || key.is_empty();

        Ok(Self {
            credentials,
            endpoint,
            bucket: bucket.to_string(),
            key,
            is_dir,
        })
    }

    /// Render the URL including embedded credentials
    ///
    /// Only use this to hand the URL to another trusted component; never log it.
    pub fn to_string_with_credentials(&self) -> String {
        match &self.credentials {
            Some(creds) => format!(
                "{S3_SCHEME}{}:{}:{}",
                creds.access_key_id,
                creds.secret_access_key,
                &self.to_string()[S3_SCHEME.len()..]
            ),
            None => self.to_string(),
        }
    }

    /// Same URL with another key
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            is_dir: key.is_empty() || key.ends_with('/'),
            key: key.trim_end_matches('/').to_string(),
            ..self.clone()
        }
    }

    /// Get the parent URL (one level up), `None` at the bucket root
    pub fn parent(&self) -> Option<Self> {
        if self.key.is_empty() {
            return None;
        }
        let key = match self.key.rfind('/') {
            Some(pos) => format!("{}/", &self.key[..pos]),
            None => String::new(),
        };
        Some(self.with_key(key))
    }

    /// Join a child path component
    pub fn join(&self, child: &str) -> Self {
        let child = child.trim_start_matches('/');
        let key = if self.key.is_empty() {
            child.to_string()
        } else {
            format!("{}/{child}", self.key)
        };
        self.with_key(key)
    }

    /// Key as a listing prefix: the key followed by `/`, or empty at the root
    pub fn dir_prefix(&self) -> String {
        if self.key.is_empty() {
            String::new()
        } else {
            format!("{}/", self.key)
        }
    }
}

impl std::fmt::Display for S3Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(S3_SCHEME)?;
        if let Some(endpoint) = &self.endpoint {
            write!(f, "{endpoint}/")?;
        }
        f.write_str(&self.bucket)?;
        if !self.key.is_empty() {
            write!(f, "/{}", self.key)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for S3Url {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split `access:secret:` off the front of a URL body
///
/// Only the first path segment decides: no colon means no credentials, two
/// or more mean `access:secret:` ends at the second one. A single colon
/// followed by a port number is a `host:port` endpoint; any other single
/// colon starts a secret that contains a slash and runs to the next colon.
fn split_credentials(rest: &str) -> Result<(Option<Credentials>, &str)> {
    let segment_end = rest.find('/').unwrap_or(rest.len());
    let segment = &rest[..segment_end];
    let Some(first_colon) = segment.find(':') else {
        return Ok((None, rest));
    };

    let after_access = &rest[first_colon + 1..];
    let second_colon = match segment[first_colon + 1..].find(':') {
        Some(pos) => pos,
        None if is_port(&segment[first_colon + 1..]) => return Ok((None, rest)),
        None => after_access.find(':').ok_or_else(|| {
            Error::InvalidUrl("expected access_key_id:secret_key: or host:port".into())
        })?,
    };

    let access_key_id = &rest[..first_colon];
    let secret = &after_access[..second_colon];
    if access_key_id.is_empty() || secret.is_empty() {
        return Err(Error::InvalidUrl(
            "credentials in URL must be access_key_id:secret_key:".into(),
        ));
    }

    Ok((
        Some(Credentials::new(access_key_id, secret)),
        &after_access[second_colon + 1..],
    ))
}

fn is_port(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && s.parse::<u16>().is_ok()
}

fn looks_like_endpoint(segment: &str) -> bool {
    segment.ends_with(".com")
        || segment.ends_with(".com.cn")
        || segment.rsplit_once(':').is_some_and(|(host, port)| {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        })
        || segment == "localhost"
        || segment.parse::<IpAddr>().is_ok()
}

/// Check a bucket name against the S3 naming rules
///
/// Rules: 3 to 63 characters; dot-separated labels; each label starts and
/// ends with a letter or digit and otherwise holds letters, digits, `-` or
/// `_`; not formatted as an IPv4 address. Upper case and underscores are
/// tolerated because legacy buckets use them.
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidBucketName(format!("{name}: {reason}")));

    if name.len() < 3 || name.len() > 63 {
        return invalid("must be between 3 and 63 characters long");
    }

    for label in name.split('.') {
        let bytes = label.as_bytes();
        let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
            return invalid("labels must not be empty");
        };
        if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return invalid("labels must start and end with a letter or digit");
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        {
            return invalid("only letters, digits, '-', '_' and '.' are allowed");
        }
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be formatted as an IP address");
    }

    Ok(())
}

/// Strip credentials from anything that looks like an `s3://` URL
///
/// Parseable URLs are re-rendered without credentials. For unparseable ones
/// everything up to the last `:` before the first `/` is dropped so that a
/// key containing a stray colon still cannot leak.
pub fn sanitize_url(url: &str) -> String {
    if let Ok(parsed) = S3Url::parse(url) {
        return parsed.to_string();
    }

    let Some(rest) = url.strip_prefix(S3_SCHEME) else {
        return url.to_string();
    };

    let mut rest = rest;
    for _ in 0..2 {
        if let Some(pos) = rest.find(':') {
            rest = &rest[pos + 1..];
        }
    }

    let bucket_end = rest.find('/').unwrap_or(rest.len());
    if let Some(last_colon) = rest[..bucket_end].rfind(':') {
        rest = &rest[last_colon + 1..];
    }

    format!("{S3_SCHEME}{rest}")
}

/// Derive the signing region from an endpoint host
pub fn region_from_endpoint(endpoint: &str) -> String {
    let host = endpoint
        .split("://")
        .last()
        .unwrap_or(endpoint)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();

    if !host.ends_with(".amazonaws.com") && !host.ends_with(".amazonaws.com.cn") {
        return DEFAULT_REGION.to_string();
    }

    let labels: Vec<&str> = host.split('.').collect();
    for (i, label) in labels.iter().enumerate() {
        if let Some(region) = label.strip_prefix("s3-") {
            if region == "external-1" {
                return DEFAULT_REGION.to_string();
            }
            return region.to_string();
        }
        if *label == "s3" {
            let mut next = labels.get(i + 1).copied();
            if next == Some("dualstack") {
                next = labels.get(i + 2).copied();
            }
            return match next {
                Some("amazonaws") | None => DEFAULT_REGION.to_string(),
                Some(region) => region.to_string(),
            };
        }
    }

    DEFAULT_REGION.to_string()
}

/// Endpoints tried in order for URLs that name none
///
/// `S3KIT_S3_ENDPOINT` (comma separated) replaces the built-in list.
pub fn default_endpoints() -> Vec<String> {
    if let Ok(value) = std::env::var(ENDPOINT_ENV) {
        let endpoints: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !endpoints.is_empty() {
            return endpoints;
        }
    }
    REGIONAL_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

/// Path that can be either local or remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local filesystem path
    Local(PathBuf),
    /// Remote S3 URL
    Remote(S3Url),
}

impl Location {
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }

    pub fn as_remote(&self) -> Option<&S3Url> {
        match self {
            Location::Remote(url) => Some(url),
            Location::Local(_) => None,
        }
    }
}

/// Parse a command-line path: `s3://` URLs are remote, everything else local
pub fn parse_location(path: &str) -> Result<Location> {
    if path.is_empty() {
        return Err(Error::InvalidUrl("Path cannot be empty".into()));
    }
    if path.starts_with(S3_SCHEME) {
        S3Url::parse(path).map(Location::Remote)
    } else {
        Ok(Location::Local(PathBuf::from(path)))
    }
}
