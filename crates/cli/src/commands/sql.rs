//! sql command - Run an S3 Select query over an object

use std::io::{self, Write};

use clap::{Args, ValueEnum};

use s3kit_core::model::{
    CompressionType, CsvInput, CustomerKey, FileHeaderInfo, InputFormat, JsonType,
    OutputSerialization, SelectObjectContentRequest,
};
use s3kit_core::{Error, Result, S3Api as _};

use super::{Context, fail, parse_object};
use crate::exit_code::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    Csv,
    Json,
    Jsonl,
    Parquet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderKind {
    Use,
    Ignore,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionKind {
    Auto,
    None,
    Gzip,
    Bzip2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    Csv,
    Json,
}

/// Run an S3 Select query over an object
#[derive(Args, Debug)]
pub struct SqlArgs {
    /// Object URL (s3://bucket/key)
    pub path: String,

    /// SQL expression, e.g. "select * from s3object s where s.age > 30"
    #[arg(short, long)]
    pub query: String,

    /// Input format
    #[arg(long, value_enum, default_value = "csv")]
    pub input: InputKind,

    /// How the first CSV line is treated
    #[arg(long, value_enum, default_value = "use")]
    pub csv_header: HeaderKind,

    /// CSV field delimiter
    #[arg(long, default_value = ",")]
    pub csv_delimiter: String,

    /// Whole-object compression; auto guesses from the key
    #[arg(long, value_enum, default_value = "auto")]
    pub compression: CompressionKind,

    /// Output format of the records
    #[arg(long, value_enum, default_value = "csv")]
    pub output: OutputKind,

    /// SSE-C key the object was written with (base64)
    #[arg(long)]
    pub sse_c_key: Option<String>,
}

fn build_request(args: &SqlArgs, bucket: &str, key: &str) -> Result<SelectObjectContentRequest> {
    let mut request = SelectObjectContentRequest::new(bucket, key, &args.query);

    request.input.format = match args.input {
        InputKind::Csv => InputFormat::Csv(CsvInput {
            file_header_info: match args.csv_header {
                HeaderKind::Use => FileHeaderInfo::Use,
                HeaderKind::Ignore => FileHeaderInfo::Ignore,
                HeaderKind::None => FileHeaderInfo::None,
            },
            field_delimiter: args.csv_delimiter.clone(),
            ..Default::default()
        }),
        InputKind::Json => InputFormat::Json(JsonType::Document),
        InputKind::Jsonl => InputFormat::Json(JsonType::Lines),
        InputKind::Parquet => InputFormat::Parquet,
    };
    request.input.compression = match args.compression {
        CompressionKind::Auto if args.input == InputKind::Parquet => CompressionType::None,
        CompressionKind::Auto => CompressionType::from_key(key),
        CompressionKind::None => CompressionType::None,
        CompressionKind::Gzip => CompressionType::Gzip,
        CompressionKind::Bzip2 => CompressionType::Bzip2,
    };
    request.output = match args.output {
        OutputKind::Csv => OutputSerialization::csv(),
        OutputKind::Json => OutputSerialization::json(),
    };
    request.customer_key = args
        .sse_c_key
        .as_deref()
        .map(CustomerKey::from_base64)
        .transpose()?;

    request.validate()?;
    Ok(request)
}

pub async fn execute(args: SqlArgs, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();

    let url = match parse_object(&args.path) {
        Ok(url) => url,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let request = match build_request(&args, &url.bucket, &url.key) {
        Ok(request) => request,
        Err(e) => return fail(&formatter, "Invalid query", &e),
    };
    let client = match ctx.client_for(&url).await {
        Ok(client) => client,
        Err(e) => return fail(&formatter, "Failed to create S3 client", &e),
    };

    match client.select_object_content(request).await {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&output.records).and_then(|()| stdout.flush()) {
                return fail(&formatter, "Failed to write to stdout", &Error::Io(e));
            }
            if let Some(stats) = output.stats {
                tracing::debug!(
                    scanned = stats.bytes_scanned,
                    processed = stats.bytes_processed,
                    returned = stats.bytes_returned,
                    "select finished"
                );
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Query on {url} failed"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SqlArgs,
    }

    fn args(extra: &[&str]) -> SqlArgs {
        let mut argv = vec!["sql", "s3://bucket/data.csv.gz", "-q", "select * from s3object"];
        argv.extend_from_slice(extra);
        Wrapper::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_csv_defaults() {
        let request = build_request(&args(&[]), "bucket", "data.csv.gz").unwrap();
        assert_eq!(request.input.compression, CompressionType::Gzip);
        match &request.input.format {
            InputFormat::Csv(csv) => assert_eq!(csv.file_header_info, FileHeaderInfo::Use),
            other => panic!("unexpected input format {other:?}"),
        }
        assert_eq!(request.output, OutputSerialization::csv());
    }

    #[test]
    fn test_json_lines_to_json() {
        let request = build_request(
            &args(&["--input", "jsonl", "--output", "json", "--compression", "none"]),
            "bucket",
            "data.json",
        )
        .unwrap();
        assert_eq!(request.input.format, InputFormat::Json(JsonType::Lines));
        assert_eq!(request.input.compression, CompressionType::None);
        assert_eq!(request.output, OutputSerialization::json());
    }

    #[test]
    fn test_parquet_rejects_compression() {
        let ok = build_request(&args(&["--input", "parquet"]), "bucket", "data.parquet.gz");
        assert!(ok.is_ok());
        let err = build_request(
            &args(&["--input", "parquet", "--compression", "gzip"]),
            "bucket",
            "data.parquet",
        );
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }
}
