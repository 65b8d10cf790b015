//! Conversions between s3kit model types and aws-sdk-s3 types

use std::collections::{BTreeMap, HashMap};

use aws_sdk_s3::primitives::{ByteStream, DateTime, Length};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use s3kit_core::model::{ObjectBody, Owner, StorageClass, UserMetadata, normalize_etag};
use s3kit_core::{Error, Result};

/// Characters escaped in `x-amz-copy-source`; `/` separates bucket and key
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

pub(crate) fn timestamp(dt: &DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

pub(crate) fn opt_timestamp(dt: Option<&DateTime>) -> Option<jiff::Timestamp> {
    dt.and_then(timestamp)
}

pub(crate) fn etag(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_etag)
}

pub(crate) fn storage_class(raw: Option<&str>) -> Option<StorageClass> {
    raw.filter(|s| !s.is_empty()).map(StorageClass::from)
}

pub(crate) fn owner(raw: Option<&aws_sdk_s3::types::Owner>) -> Option<Owner> {
    raw.map(|o| Owner {
        id: o.id().map(str::to_string),
        display_name: o.display_name().map(str::to_string),
    })
}

pub(crate) fn user_metadata(raw: Option<&HashMap<String, String>>) -> UserMetadata {
    raw.map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// User metadata for a request, `None` when empty
pub(crate) fn request_metadata(metadata: &UserMetadata) -> Option<HashMap<String, String>> {
    (!metadata.is_empty()).then(|| {
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    })
}

pub(crate) fn prefixes(raw: &[aws_sdk_s3::types::CommonPrefix]) -> Vec<String> {
    raw.iter()
        .filter_map(|p| p.prefix().map(str::to_string))
        .collect()
}

/// Value of `x-amz-copy-source`
pub(crate) fn copy_source(bucket: &str, key: &str, version_id: Option<&str>) -> String {
    let path = format!("{bucket}/{key}");
    let encoded = utf8_percent_encode(&path, COPY_SOURCE).to_string();
    match version_id {
        Some(version) => format!("{encoded}?versionId={version}"),
        None => encoded,
    }
}

/// Turn an upload body into a stream, with its length when known
pub(crate) async fn byte_stream(body: ObjectBody) -> Result<(ByteStream, Option<i64>)> {
    match body {
        ObjectBody::Bytes(bytes) => {
            let len = bytes.len() as i64;
            Ok((ByteStream::from(bytes), Some(len)))
        }
        ObjectBody::File(path) => {
            let len = tokio::fs::metadata(&path).await?.len() as i64;
            let stream = ByteStream::from_path(&path).await.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            })?;
            Ok((stream, Some(len)))
        }
        ObjectBody::FileRange {
            path,
            offset,
            length,
        } => {
            let stream = ByteStream::read_from()
                .path(&path)
                .offset(offset)
                .length(Length::Exact(length))
                .build()
                .await
                .map_err(|e| {
                    Error::Io(std::io::Error::other(format!(
                        "cannot read {}: {e}",
                        path.display()
                    )))
                })?;
            Ok((stream, Some(length as i64)))
        }
    }
}

/// Sorted copy of a header map, for presigned header output
pub(crate) fn header_map<'a>(
    headers: impl Iterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, String> {
    headers
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Apply write-side server-side encryption to any request builder
///
/// The builder must expose the `server_side_encryption`, `ssekms_key_id`
/// and `sse_customer_*` setters.
macro_rules! apply_encryption {
    ($builder:expr, $encryption:expr) => {{
        let builder = $builder;
        match $encryption {
            None => builder,
            Some(s3kit_core::model::ServerSideEncryption::S3) => builder
                .server_side_encryption(aws_sdk_s3::types::ServerSideEncryption::Aes256),
            Some(s3kit_core::model::ServerSideEncryption::Kms { key_id }) => builder
                .server_side_encryption(aws_sdk_s3::types::ServerSideEncryption::AwsKms)
                .set_ssekms_key_id(key_id.clone()),
            Some(s3kit_core::model::ServerSideEncryption::Customer(key)) => {
                $crate::convert::apply_customer_key!(builder, Some(key))
            }
        }
    }};
}

/// Apply an SSE-C key to any request builder with `sse_customer_*` setters
macro_rules! apply_customer_key {
    ($builder:expr, $key:expr) => {{
        let builder = $builder;
        match $key {
            Some(key) => builder
                .sse_customer_algorithm(key.algorithm.as_str())
                .sse_customer_key(key.key.as_str())
                .sse_customer_key_md5(key.key_md5.as_str()),
            None => builder,
        }
    }};
}

pub(crate) use {apply_customer_key, apply_encryption};

/// Build [`ObjectMetadata`](s3kit_core::model::ObjectMetadata) from a
/// GetObject or HeadObject response, which share their header accessors
macro_rules! object_metadata {
    ($response:expr) => {{
        let response = $response;
        s3kit_core::model::ObjectMetadata {
            content_length: response.content_length().unwrap_or(0),
            content_type: response.content_type().map(str::to_string),
            content_encoding: response.content_encoding().map(str::to_string),
            content_disposition: response.content_disposition().map(str::to_string),
            cache_control: response.cache_control().map(str::to_string),
            content_range: None,
            etag: $crate::convert::etag(response.e_tag()),
            last_modified: $crate::convert::opt_timestamp(response.last_modified()),
            storage_class: $crate::convert::storage_class(
                response.storage_class().map(|c| c.as_str()),
            ),
            version_id: response.version_id().map(str::to_string),
            server_side_encryption: response
                .server_side_encryption()
                .map(|s| s.as_str().to_string()),
            kms_key_id: response.ssekms_key_id().map(str::to_string),
            restore: response.restore().map(str::to_string),
            delete_marker: response.delete_marker().unwrap_or(false),
            user_metadata: $crate::convert::user_metadata(response.metadata()),
        }
    }};
}

pub(crate) use object_metadata;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_encoding() {
        assert_eq!(copy_source("bucket", "dir/file.txt", None), "bucket/dir/file.txt");
        assert_eq!(
            copy_source("bucket", "a b+c.txt", Some("v1")),
            "bucket/a%20b%2Bc.txt?versionId=v1"
        );
    }

    #[test]
    fn test_timestamp_keeps_subsecond_precision() {
        let dt = DateTime::from_secs_and_nanos(1_700_000_000, 500_000_000);
        let ts = timestamp(&dt).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_nanosecond(), 500_000_000);
    }

    #[test]
    fn test_storage_class_ignores_empty() {
        assert_eq!(storage_class(Some("")), None);
        assert_eq!(storage_class(Some("GLACIER")), Some(StorageClass::Glacier));
    }

    #[test]
    fn test_request_metadata() {
        assert!(request_metadata(&UserMetadata::new()).is_none());
        let mut metadata = UserMetadata::new();
        metadata.insert("owner".into(), "ops".into());
        assert_eq!(request_metadata(&metadata).unwrap()["owner"], "ops");
    }

    #[tokio::test]
    async fn test_byte_stream_lengths() {
        let (_, len) = byte_stream(ObjectBody::from("hello")).await.unwrap();
        assert_eq!(len, Some(5));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"0123456789").unwrap();
        let (_, len) = byte_stream(ObjectBody::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(len, Some(10));

        let (stream, len) = byte_stream(ObjectBody::FileRange {
            path: file.path().to_path_buf(),
            offset: 2,
            length: 3,
        })
        .await
        .unwrap();
        assert_eq!(len, Some(3));
        let bytes = stream.collect().await.unwrap().into_bytes();
        assert_eq!(&bytes[..], b"234");
    }
}
