//! Connection profiles
//!
//! A profile is a named set of credentials plus the client configuration
//! used to reach an S3-compatible endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};

/// Retry configuration for a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff duration in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    20_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// URL scheme used to reach the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// How buckets are addressed in request URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingStyle {
    /// Path style for custom endpoints, virtual-hosted style for AWS
    #[default]
    Auto,
    /// `https://endpoint/bucket/key`
    Path,
    /// `https://bucket.endpoint/key`
    Virtual,
}

impl std::str::FromStr for AddressingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(AddressingStyle::Auto),
            "path" => Ok(AddressingStyle::Path),
            "virtual" | "dns" => Ok(AddressingStyle::Virtual),
            other => Err(Error::InvalidArgument(format!(
                "addressing style must be 'auto', 'path' or 'virtual', got '{other}'"
            ))),
        }
    }
}

/// Client configuration shared by every operation of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// AWS region used for signing
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint host (and optional port) overriding the regional AWS endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Scheme used with `endpoint`
    #[serde(default)]
    pub scheme: Scheme,

    /// Bucket addressing style
    #[serde(default)]
    pub addressing_style: AddressingStyle,

    /// Use dual-stack (IPv4 + IPv6) AWS endpoints
    #[serde(default)]
    pub use_dual_stack: bool,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Retry behaviour
    #[serde(default)]
    pub retry: RetryConfig,

    /// Sign request payloads instead of sending them unsigned
    #[serde(default = "default_true")]
    pub sign_payloads: bool,

    /// Appended to the SDK user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    20_000
}

fn default_request_timeout() -> u64 {
    5 * 60_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            scheme: Scheme::default(),
            addressing_style: AddressingStyle::default(),
            use_dual_stack: false,
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            retry: RetryConfig::default(),
            sign_payloads: true,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for a custom endpoint
    ///
    /// Accepts either a bare host (`localhost:9000`) or a full URL
    /// (`http://localhost:9000`); a scheme in the URL wins over the default.
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        let mut config = Self::default();
        config.set_endpoint(endpoint)?;
        Ok(config)
    }

    /// Set the endpoint, splitting off a scheme when one is given
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        if endpoint.contains("://") {
            let parsed = url::Url::parse(endpoint)?;
            self.scheme = match parsed.scheme() {
                "http" => Scheme::Http,
                "https" => Scheme::Https,
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "unsupported endpoint scheme '{other}'"
                    )));
                }
            };
            let host = parsed
                .host_str()
                .ok_or_else(|| Error::InvalidArgument(format!("endpoint has no host: {endpoint}")))?;
            self.endpoint = Some(match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            });
        } else {
            let host = endpoint.trim_end_matches('/');
            if host.is_empty() {
                return Err(Error::InvalidArgument("endpoint cannot be empty".into()));
            }
            self.endpoint = Some(host.to_string());
        }
        Ok(())
    }

    /// The endpoint URL handed to the SDK, if an endpoint override is set
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint
            .as_ref()
            .map(|host| format!("{}://{}", self.scheme.as_str(), host))
    }

    /// Whether requests should use path-style addressing
    pub fn force_path_style(&self) -> bool {
        match self.addressing_style {
            AddressingStyle::Path => true,
            AddressingStyle::Virtual => false,
            AddressingStyle::Auto => self.endpoint.is_some(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Static credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key ID
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,

    /// Session token for temporary credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Read credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
    ///
    /// Returns `None` unless both variables are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return None;
        }
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// A named connection profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Static credentials; the SDK default chain is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Client configuration
    #[serde(default)]
    pub client: ClientConfig,
}

impl Profile {
    /// Create a profile for an endpoint with static credentials
    pub fn new(
        name: impl Into<String>,
        endpoint: &str,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            credentials: Some(Credentials::new(access_key_id, secret_access_key)),
            client: ClientConfig::for_endpoint(endpoint)?,
        })
    }
}

/// Manager for profile operations
#[derive(Debug)]
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::Config(format!("profile not found: {name}")))
    }

    /// Add or replace a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut config = self.config_manager.load()?;

        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::Config(format!("profile not found: {name}")));
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}
