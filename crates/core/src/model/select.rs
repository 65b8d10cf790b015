//! S3 Select: SQL over a single object

use serde::{Deserialize, Serialize};

use super::{CustomerKey, ensure, validate_key};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
    Bzip2,
}

impl CompressionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionType::None => "NONE",
            CompressionType::Gzip => "GZIP",
            CompressionType::Bzip2 => "BZIP2",
        }
    }

    /// Guess compression from an object key
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(".gz") {
            CompressionType::Gzip
        } else if key.ends_with(".bz2") {
            CompressionType::Bzip2
        } else {
            CompressionType::None
        }
    }
}

/// How the first CSV line is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileHeaderInfo {
    /// First line names the columns, usable in the query
    Use,
    /// First line is skipped
    Ignore,
    #[default]
    None,
}

impl FileHeaderInfo {
    pub fn as_str(self) -> &'static str {
        match self {
            FileHeaderInfo::Use => "USE",
            FileHeaderInfo::Ignore => "IGNORE",
            FileHeaderInfo::None => "NONE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonType {
    Document,
    #[default]
    Lines,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Document => "DOCUMENT",
            JsonType::Lines => "LINES",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvInput {
    pub file_header_info: FileHeaderInfo,
    pub field_delimiter: String,
    pub record_delimiter: String,
    pub quote_character: String,
    pub comments: Option<String>,
}

impl Default for CsvInput {
    fn default() -> Self {
        Self {
            file_header_info: FileHeaderInfo::default(),
            field_delimiter: ",".to_string(),
            record_delimiter: "\n".to_string(),
            quote_character: "\"".to_string(),
            comments: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    Csv(CsvInput),
    Json(JsonType),
    Parquet,
}

impl Default for InputFormat {
    fn default() -> Self {
        InputFormat::Csv(CsvInput::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSerialization {
    pub format: InputFormat,
    pub compression: CompressionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSerialization {
    Csv {
        field_delimiter: String,
        record_delimiter: String,
    },
    Json {
        record_delimiter: String,
    },
}

impl OutputSerialization {
    pub fn csv() -> Self {
        OutputSerialization::Csv {
            field_delimiter: ",".to_string(),
            record_delimiter: "\n".to_string(),
        }
    }

    pub fn json() -> Self {
        OutputSerialization::Json {
            record_delimiter: "\n".to_string(),
        }
    }
}

impl Default for OutputSerialization {
    fn default() -> Self {
        Self::csv()
    }
}

/// Byte range of the object to scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectObjectContentRequest {
    pub bucket: String,
    pub key: String,
    pub expression: String,
    pub input: InputSerialization,
    pub output: OutputSerialization,
    pub scan_range: Option<ScanRange>,
    pub customer_key: Option<CustomerKey>,
}

impl SelectObjectContentRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, expression: impl Into<String>) -> Self {
        let key = key.into();
        let input = InputSerialization {
            compression: CompressionType::from_key(&key),
            ..Default::default()
        };
        Self {
            bucket: bucket.into(),
            key,
            expression: expression.into(),
            input,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)?;
        ensure(!self.expression.trim().is_empty(), || "SQL expression is empty".into())?;
        ensure(
            !(self.input.format == InputFormat::Parquet
                && self.input.compression != CompressionType::None),
            || "Parquet input does not support whole-object compression".into(),
        )?;

        if let Some(range) = &self.scan_range {
            ensure(range.start.is_some() || range.end.is_some(), || {
                "scan range needs a start or an end".into()
            })?;
            if let (Some(start), Some(end)) = (range.start, range.end) {
                ensure(start <= end, || format!("scan range end {end} is before start {start}"))?;
            }
            ensure(self.input.compression == CompressionType::None, || {
                "scan ranges require uncompressed input".into()
            })?;
            ensure(
                matches!(self.input.format, InputFormat::Csv(_) | InputFormat::Json(JsonType::Lines)),
                || "scan ranges apply to CSV and JSON Lines input only".into(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStats {
    pub bytes_scanned: i64,
    pub bytes_processed: i64,
    pub bytes_returned: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectObjectContentOutput {
    /// Concatenated record payloads, in the requested output format
    #[serde(skip)]
    pub records: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SelectStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_from_key() {
        let req = SelectObjectContentRequest::new("b", "data/2024.csv.gz", "select * from s3object");
        assert_eq!(req.input.compression, CompressionType::Gzip);
        assert_eq!(CompressionType::from_key("a.json"), CompressionType::None);
    }

    #[test]
    fn test_validate_expression_and_parquet() {
        let mut req = SelectObjectContentRequest::new("b", "x.parquet", "  ");
        assert!(req.validate().is_err());

        req.expression = "select * from s3object".into();
        req.input.format = InputFormat::Parquet;
        assert!(req.validate().is_ok());

        req.input.compression = CompressionType::Gzip;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_scan_range_rules() {
        let mut req = SelectObjectContentRequest::new("b", "x.csv", "select * from s3object");
        req.scan_range = Some(ScanRange {
            start: Some(0),
            end: Some(1024),
        });
        assert!(req.validate().is_ok());

        req.input.format = InputFormat::Json(JsonType::Document);
        assert!(req.validate().is_err());

        req.input.format = InputFormat::default();
        req.scan_range = Some(ScanRange {
            start: Some(10),
            end: Some(5),
        });
        assert!(req.validate().is_err());
    }
}
