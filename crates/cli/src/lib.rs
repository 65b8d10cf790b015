//! s3kit CLI library
//!
//! Command definitions, output formatting and exit codes, exported so the
//! binary and the integration tests share them.

pub mod commands;
pub mod exit_code;
pub mod output;
