//! presign command - Generate a presigned URL

use std::time::Duration;

use clap::Args;

use s3kit_core::model::{PresignMethod, PresignRequest};
use s3kit_core::{Error, Result, S3Api as _};

use super::{Context, fail, parse_object};
use crate::exit_code::ExitCode;

/// Generate a presigned URL
#[derive(Args, Debug)]
pub struct PresignArgs {
    /// Object URL (s3://bucket/key)
    pub path: String,

    /// HTTP method the URL allows: GET, PUT, DELETE or HEAD
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Validity, e.g. 900, 15m, 12h, 7d (at most 7d)
    #[arg(short, long, default_value = "1h")]
    pub expires: String,

    /// Content type the uploader must send (PUT only)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Object version (GET/HEAD/DELETE)
    #[arg(long)]
    pub version_id: Option<String>,
}

/// Parse seconds with an optional s/m/h/d suffix
fn parse_expiry(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || Error::InvalidArgument(format!("invalid expiry '{s}'; use e.g. 900, 15m, 12h, 7d"));
    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c.to_ascii_lowercase()),
        Some(_) => (s, 's'),
        None => return Err(invalid()),
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(invalid()),
    };
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

fn build_request(args: &PresignArgs, bucket: &str, key: &str) -> Result<PresignRequest> {
    let method: PresignMethod = args.method.parse()?;
    let mut request = PresignRequest::new(method, bucket, key, parse_expiry(&args.expires)?);
    request.content_type = args.content_type.clone();
    request.version_id = args.version_id.clone();
    request.validate()?;
    Ok(request)
}

pub async fn execute(args: PresignArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let url = match parse_object(&args.path) {
        Ok(url) => url,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let request = match build_request(&args, &url.bucket, &url.key) {
        Ok(request) => request,
        Err(e) => return fail(&formatter, "Invalid arguments", &e),
    };
    let client = match ctx.client_for(&url).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    match client.presign(request).await {
        Ok(presigned) => {
            if formatter.is_json() {
                formatter.json(&presigned);
            } else {
                formatter.println(&presigned.url);
                for (name, value) in &presigned.headers {
                    formatter.println(&formatter.dim(&format!("  {name}: {value}")));
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Failed to presign {url}"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("900").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_expiry("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_expiry("12H").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_expiry("7d").unwrap(), Duration::from_secs(604_800));
        for bad in ["", "d", "10w", "-5", "1.5h"] {
            assert!(parse_expiry(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_build_request_limits() {
        let args = |method: &str, expires: &str| PresignArgs {
            path: "s3://bucket/key".into(),
            method: method.into(),
            expires: expires.into(),
            content_type: None,
            version_id: None,
        };
        let request = build_request(&args("put", "1h"), "bucket", "key").unwrap();
        assert_eq!(request.method, PresignMethod::Put);
        assert!(build_request(&args("get", "8d"), "bucket", "key").is_err());
        assert!(build_request(&args("patch", "1h"), "bucket", "key").is_err());
    }
}
