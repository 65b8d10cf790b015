//! s3kit-core: Core library for the s3kit S3 client
//!
//! This crate provides the SDK-independent parts of s3kit:
//! - Request and output types for every S3 operation
//! - The [`S3Api`] operation trait (future-based form)
//! - The blocking and callback calling forms built on top of it
//! - Configuration and profile management
//! - `s3://` URL parsing
//!
//! The S3 wire protocol lives in `s3kit-client`; this crate can be tested
//! against the mockall-generated `MockS3Api` (feature `mock`).

pub mod api;
pub mod blocking;
pub mod callback;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod model;
mod operations;
pub mod profile;
pub mod s3url;

#[cfg(any(test, feature = "mock"))]
pub use api::MockS3Api;
pub use api::S3Api;
pub use blocking::BlockingClient;
pub use callback::{AsyncClient, CallerContext, Executor, OperationHandle, TokioExecutor};
pub use capabilities::{Capabilities, Feature};
pub use config::{Config, ConfigManager};
pub use error::{Error, Result, friendly_error_code};
pub use profile::{ClientConfig, Credentials, Profile, ProfileManager};
pub use s3url::{Location, S3Url, parse_location, sanitize_url};
