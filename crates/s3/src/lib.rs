//! s3kit-client: aws-sdk-s3 adapter for s3kit
//!
//! This crate implements the [`S3Api`](s3kit_core::S3Api) operation trait
//! on top of the `aws-sdk-s3` crate. It is the only crate that directly
//! depends on the AWS SDK. Higher-level helpers (capability probing, file
//! transfers, URL-level file operations) are generic over `S3Api` and can
//! be tested against a mock.

pub mod capability;
pub mod client;
mod convert;
mod error;
pub mod fileio;
mod ops;
mod presign;
mod select;
pub mod transfer;

pub use client::S3Client;
pub use fileio::{DirectoryListing, PathKind, S3Fs};
pub use transfer::{MultipartConfig, UploadOptions, UploadOutcome, UploadState};
