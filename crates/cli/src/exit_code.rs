//! Process exit codes
//!
//! Scripts depend on these values; the numbers mirror
//! `s3kit_core::Error::exit_code` and must not change.

use std::fmt;

use s3kit_core::Error;

/// Exit status of the s3kit binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad arguments, malformed `s3://` URL, broken config
    UsageError = 2,
    /// Timeouts, throttling, 5xx, redirects we could not follow
    NetworkError = 3,
    AuthError = 4,
    /// Missing bucket, key, upload or configuration
    NotFound = 5,
    /// Bucket exists or is not empty, failed precondition
    Conflict = 6,
    UnsupportedFeature = 7,
    Interrupted = 130,
}

impl ExitCode {
    const ALL: [ExitCode; 9] = [
        Self::Success,
        Self::GeneralError,
        Self::UsageError,
        Self::NetworkError,
        Self::AuthError,
        Self::NotFound,
        Self::Conflict,
        Self::UnsupportedFeature,
        Self::Interrupted,
    ];

    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a library error; unknown numbers fall back to 1
    pub fn from_error(error: &Error) -> Self {
        let code = error.exit_code();
        Self::ALL
            .into_iter()
            .find(|c| c.as_i32() == code)
            .unwrap_or(Self::GeneralError)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GeneralError => "error",
            Self::UsageError => "usage error",
            Self::NetworkError => "network error",
            Self::AuthError => "access denied",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::UnsupportedFeature => "unsupported by backend",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (exit {})", self.label(), self.as_i32())
    }
}
