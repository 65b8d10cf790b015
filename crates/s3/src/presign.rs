//! Presigned URLs
//!
//! Signing happens locally; no request is sent.

use aws_sdk_s3::presigning::{PresignedRequest, PresigningConfig};

use s3kit_core::model::{PresignMethod, PresignRequest, PresignedUrl};
use s3kit_core::{Error, Result};

use crate::client::S3Client;
use crate::convert::{self, apply_customer_key, apply_encryption};
use crate::error::sdk_error;

fn into_url(presigned: PresignedRequest, expires_at: jiff::Timestamp) -> PresignedUrl {
    PresignedUrl {
        url: presigned.uri().to_string(),
        method: presigned.method().to_string(),
        headers: convert::header_map(presigned.headers()),
        expires_at,
    }
}

pub(crate) async fn presign(client: &S3Client, request: PresignRequest) -> Result<PresignedUrl> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);
    tracing::debug!(
        object = %resource,
        method = request.method.as_str(),
        expires_in = request.expires_in.as_secs(),
        "presign"
    );

    let config = PresigningConfig::expires_in(request.expires_in)
        .map_err(|e| Error::InvalidArgument(format!("invalid presign expiry: {e}")))?;
    let expires_at = jiff::Timestamp::now()
        .checked_add(request.expires_in)
        .map_err(|e| Error::InvalidArgument(format!("invalid presign expiry: {e}")))?;

    let customer_key = request
        .encryption
        .as_ref()
        .and_then(|e| e.customer_key());

    let presigned = match request.method {
        PresignMethod::Get => {
            let builder = client
                .inner
                .get_object()
                .bucket(&request.bucket)
                .key(&request.key)
                .set_version_id(request.version_id.clone());
            apply_customer_key!(builder, customer_key)
                .presigned(config)
                .await
                .map_err(|e| sdk_error(e, &resource))?
        }
        PresignMethod::Head => {
            let builder = client
                .inner
                .head_object()
                .bucket(&request.bucket)
                .key(&request.key)
                .set_version_id(request.version_id.clone());
            apply_customer_key!(builder, customer_key)
                .presigned(config)
                .await
                .map_err(|e| sdk_error(e, &resource))?
        }
        PresignMethod::Put => {
            let builder = client
                .inner
                .put_object()
                .bucket(&request.bucket)
                .key(&request.key)
                .set_content_type(request.content_type.clone());
            apply_encryption!(builder, request.encryption.as_ref())
                .presigned(config)
                .await
                .map_err(|e| sdk_error(e, &resource))?
        }
        PresignMethod::Delete => client
            .inner
            .delete_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .set_version_id(request.version_id.clone())
            .presigned(config)
            .await
            .map_err(|e| sdk_error(e, &resource))?,
    };

    Ok(into_url(presigned, expires_at))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use s3kit_core::model::{CustomerKey, ServerSideEncryption};
    use s3kit_core::{ClientConfig, Credentials};

    async fn client() -> S3Client {
        let config = ClientConfig::for_endpoint("http://localhost:9000").unwrap();
        S3Client::new(Some(Credentials::new("AKIDEXAMPLE", "secret")), config)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_presign_get() {
        let client = client().await;
        let request = PresignRequest::new(
            PresignMethod::Get,
            "bucket",
            "dir/file.txt",
            Duration::from_secs(3600),
        );
        let url = presign(&client, request).await.unwrap();

        assert_eq!(url.method, "GET");
        assert!(url.url.starts_with("http://localhost:9000/bucket/dir/file.txt?"));
        assert!(url.url.contains("X-Amz-Expires=3600"));
        assert!(url.url.contains("X-Amz-Signature="));
        assert!(url.expires_at > jiff::Timestamp::now());
    }

    #[tokio::test]
    async fn test_presign_put_with_customer_key_lists_headers() {
        let client = client().await;
        let mut request =
            PresignRequest::new(PresignMethod::Put, "bucket", "secret.bin", Duration::from_secs(60));
        request.encryption = Some(ServerSideEncryption::Customer(
            CustomerKey::aes256(&[7u8; 32]).unwrap(),
        ));
        let url = presign(&client, request).await.unwrap();

        assert_eq!(url.method, "PUT");
        assert!(
            url.headers
                .contains_key("x-amz-server-side-encryption-customer-algorithm")
        );
    }

    #[tokio::test]
    async fn test_presign_rejects_long_expiry() {
        let client = client().await;
        let request = PresignRequest::new(
            PresignMethod::Get,
            "bucket",
            "key",
            Duration::from_secs(8 * 24 * 3600),
        );
        let err = presign(&client, request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
