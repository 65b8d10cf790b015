//! cat command - Display object contents
//!
//! Writes the object (or a byte range of it) to stdout unmodified.

use std::io::{self, Write};

use clap::Args;

use s3kit_core::model::{ByteRange, CustomerKey, GetObjectRequest};
use s3kit_core::{Error, Result, S3Api as _};

use super::{Context, fail, parse_object};
use crate::exit_code::ExitCode;

/// Display object contents
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object URL (s3://bucket/key)
    pub path: String,

    /// Specific version ID to retrieve
    #[arg(long)]
    pub version_id: Option<String>,

    /// Byte range: START-END, START- or -SUFFIX_LENGTH
    #[arg(long)]
    pub range: Option<String>,

    /// SSE-C key the object was written with (base64)
    #[arg(long)]
    pub sse_c_key: Option<String>,
}

/// Parse `START-END`, `START-` or `-LENGTH`
fn parse_range(s: &str) -> Result<ByteRange> {
    let invalid = || Error::InvalidArgument(format!("invalid byte range '{s}'"));
    let (start, end) = s.split_once('-').ok_or_else(invalid)?;
    let number = |n: &str| n.trim().parse::<u64>().map_err(|_| invalid());

    let range = match (start.trim().is_empty(), end.trim().is_empty()) {
        (true, false) => ByteRange::Suffix { length: number(end)? },
        (false, true) => ByteRange::From { start: number(start)? },
        (false, false) => ByteRange::Range {
            start: number(start)?,
            end: number(end)?,
        },
        (true, true) => return Err(invalid()),
    };
    range.validate()?;
    Ok(range)
}

fn build_request(args: &CatArgs, bucket: &str, key: &str) -> Result<GetObjectRequest> {
    let mut request = GetObjectRequest::new(bucket, key);
    request.version_id = args.version_id.clone();
    request.range = args.range.as_deref().map(parse_range).transpose()?;
    request.customer_key = args
        .sse_c_key
        .as_deref()
        .map(CustomerKey::from_base64)
        .transpose()?;
    Ok(request)
}

pub async fn execute(args: CatArgs, ctx: &Context) -> ExitCode {
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

    match client.get_object(request).await {
        Ok(output) => {
            // Bypass the formatter so binary data is preserved
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&output.body).and_then(|()| stdout.flush()) {
                return fail(&formatter, "Failed to write to stdout", &Error::Io(e));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Failed to read {url}"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_range("0-99").unwrap(),
            ByteRange::Range { start: 0, end: 99 }
        );
        assert_eq!(parse_range("100-").unwrap(), ByteRange::From { start: 100 });
        assert_eq!(parse_range("-20").unwrap(), ByteRange::Suffix { length: 20 });
    }

    #[test]
    fn test_parse_range_invalid() {
        for bad in ["", "-", "abc", "5-1", "1-x", "-0"] {
            assert!(parse_range(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_build_request() {
        let args = CatArgs {
            path: "s3://bucket/key".to_string(),
            version_id: Some("v1".to_string()),
            range: Some("10-".to_string()),
            sse_c_key: None,
        };
        let request = build_request(&args, "bucket", "key").unwrap();
        assert_eq!(request.version_id.as_deref(), Some("v1"));
        assert_eq!(request.range, Some(ByteRange::From { start: 10 }));
        assert!(request.customer_key.is_none());
    }
}
