//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the S3Api trait from s3kit-core.

use std::time::Duration;

use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::{AppName, BehaviorVersion, Region};
use aws_smithy_types::timeout::TimeoutConfig;

use s3kit_core::{AsyncClient, BlockingClient, ClientConfig, Credentials, Error, Profile, Result};

/// Credential provider name reported by the SDK for static keys
const STATIC_PROVIDER_NAME: &str = "s3kit-static-credentials";

/// S3 client wrapper
///
/// Cheap to share behind an `Arc`; every operation takes `&self`.
#[derive(Debug, Clone)]
pub struct S3Client {
    pub(crate) inner: aws_sdk_s3::Client,
    pub(crate) config: ClientConfig,
}

impl S3Client {
    /// Create a client
    ///
    /// Without explicit credentials the SDK's default provider chain is used
    /// (environment, shared config files, instance metadata).
    pub async fn new(credentials: Option<Credentials>, config: ClientConfig) -> Result<Self> {
        if config.region.is_empty() {
            return Err(Error::Config("client region cannot be empty".into()));
        }

        let timeouts = TimeoutConfig::builder()
            .connect_timeout(config.connect_timeout())
            .operation_attempt_timeout(config.request_timeout())
            .build();

        let retries = SdkRetryConfig::standard()
            .with_max_attempts(config.retry.max_attempts)
            .with_initial_backoff(Duration::from_millis(config.retry.initial_backoff_ms))
            .with_max_backoff(Duration::from_millis(config.retry.max_backoff_ms));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(timeouts)
            .retry_config(retries)
            .use_dual_stack(config.use_dual_stack);

        if let Some(creds) = credentials {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                creds.session_token,
                None,
                STATIC_PROVIDER_NAME,
            ));
        }

        if let Some(endpoint) = config.endpoint_url() {
            loader = loader.endpoint_url(endpoint);
        }

        if let Some(user_agent) = &config.user_agent {
            let app_name = AppName::new(user_agent.clone())
                .map_err(|e| Error::Config(format!("invalid user agent '{user_agent}': {e}")))?;
            loader = loader.app_name(app_name);
        }

        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style())
            .build();

        tracing::debug!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            path_style = config.force_path_style(),
            "created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            config,
        })
    }

    /// Create a client from a stored profile
    pub async fn from_profile(profile: &Profile) -> Result<Self> {
        Self::new(profile.credentials.clone(), profile.client.clone()).await
    }

    /// Wrap this client in the blocking calling form, on its own runtime
    ///
    /// Must not be called from inside an async context.
    pub fn blocking(
        credentials: Option<Credentials>,
        config: ClientConfig,
    ) -> Result<BlockingClient<Self>> {
        BlockingClient::build(|| Self::new(credentials, config))
    }

    /// Wrap this client in the callback calling form, on the current tokio runtime
    pub fn into_async(self) -> Result<AsyncClient<Self>> {
        AsyncClient::with_tokio(self)
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_with_static_credentials() {
        let config = ClientConfig::for_endpoint("http://localhost:9000").unwrap();
        let creds = Credentials::new("access", "secret");
        let client = S3Client::new(Some(creds), config).await.unwrap();
        assert!(client.config().force_path_style());
        assert_eq!(client.config().region, "us-east-1");
    }

    #[tokio::test]
    async fn test_new_rejects_empty_region() {
        let config = ClientConfig {
            region: String::new(),
            ..Default::default()
        };
        let err = S3Client::new(None, config).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_user_agent() {
        let config = ClientConfig {
            user_agent: Some("has spaces".into()),
            ..Default::default()
        };
        assert!(S3Client::new(None, config).await.is_err());
    }

    #[tokio::test]
    async fn test_into_async_uses_current_runtime() {
        let config = ClientConfig::for_endpoint("localhost:9000").unwrap();
        let client = S3Client::new(Some(Credentials::new("a", "b")), config)
            .await
            .unwrap();
        let async_client = client.into_async().unwrap();
        assert_eq!(
            async_client.client().config().endpoint_url().as_deref(),
            Some("https://localhost:9000")
        );
    }
}
