//! S3 Select: run a SQL expression over one object
//!
//! The response is an event stream. Record payloads are concatenated in
//! arrival order; the stream must close with an End event, otherwise the
//! result is incomplete and reported as a network error.

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types as sdk;
use aws_sdk_s3::types::SelectObjectContentEventStream as Event;

use s3kit_core::model::{
    InputFormat, InputSerialization, OutputSerialization, SelectObjectContentOutput,
    SelectObjectContentRequest, SelectStats,
};
use s3kit_core::{Error, Result};

use crate::client::S3Client;
use crate::convert::apply_customer_key;
use crate::error::sdk_error;

fn input_to_sdk(input: &InputSerialization) -> sdk::InputSerialization {
    let builder = sdk::InputSerialization::builder()
        .compression_type(sdk::CompressionType::from(input.compression.as_str()));

    match &input.format {
        InputFormat::Csv(csv) => builder.csv(
            sdk::CsvInput::builder()
                .file_header_info(sdk::FileHeaderInfo::from(csv.file_header_info.as_str()))
                .field_delimiter(&csv.field_delimiter)
                .record_delimiter(&csv.record_delimiter)
                .quote_character(&csv.quote_character)
                .set_comments(csv.comments.clone())
                .build(),
        ),
        InputFormat::Json(json_type) => builder.json(
            sdk::JsonInput::builder()
                .r#type(sdk::JsonType::from(json_type.as_str()))
                .build(),
        ),
        InputFormat::Parquet => builder.parquet(sdk::ParquetInput::builder().build()),
    }
    .build()
}

fn output_to_sdk(output: &OutputSerialization) -> sdk::OutputSerialization {
    let builder = sdk::OutputSerialization::builder();
    match output {
        OutputSerialization::Csv {
            field_delimiter,
            record_delimiter,
        } => builder.csv(
            sdk::CsvOutput::builder()
                .field_delimiter(field_delimiter)
                .record_delimiter(record_delimiter)
                .build(),
        ),
        OutputSerialization::Json { record_delimiter } => builder.json(
            sdk::JsonOutput::builder()
                .record_delimiter(record_delimiter)
                .build(),
        ),
    }
    .build()
}

/// Accumulates the events of one Select response
#[derive(Debug, Default)]
struct SelectCollector {
    records: Vec<u8>,
    stats: Option<SelectStats>,
    ended: bool,
}

impl SelectCollector {
    fn push(&mut self, event: Event) {
        match event {
            Event::Records(records) => {
                if let Some(payload) = records.payload() {
                    self.records.extend_from_slice(payload.as_ref());
                }
            }
            Event::Stats(stats) => {
                if let Some(details) = stats.details() {
                    self.stats = Some(SelectStats {
                        bytes_scanned: details.bytes_scanned().unwrap_or(0),
                        bytes_processed: details.bytes_processed().unwrap_or(0),
                        bytes_returned: details.bytes_returned().unwrap_or(0),
                    });
                }
            }
            Event::End(_) => self.ended = true,
            // Progress and keep-alive events carry nothing we report
            _ => {}
        }
    }

    fn finish(self, resource: &str) -> Result<SelectObjectContentOutput> {
        if !self.ended {
            return Err(Error::Network(format!(
                "select on {resource} ended before the service finished sending results"
            )));
        }
        Ok(SelectObjectContentOutput {
            records: self.records,
            stats: self.stats,
        })
    }
}

pub(crate) async fn select_object_content(
    client: &S3Client,
    request: SelectObjectContentRequest,
) -> Result<SelectObjectContentOutput> {
    request.validate()?;
    let resource = format!("{}/{}", request.bucket, request.key);
    tracing::debug!(object = %resource, expression = %request.expression, "select object content");

    let scan_range = request.scan_range.map(|range| {
        sdk::ScanRange::builder()
            .set_start(range.start)
            .set_end(range.end)
            .build()
    });

    let builder = client
        .inner
        .select_object_content()
        .bucket(&request.bucket)
        .key(&request.key)
        .expression(&request.expression)
        .expression_type(sdk::ExpressionType::Sql)
        .input_serialization(input_to_sdk(&request.input))
        .output_serialization(output_to_sdk(&request.output))
        .set_scan_range(scan_range);
    let builder = apply_customer_key!(builder, request.customer_key.as_ref());

    let mut response = builder
        .send()
        .await
        .map_err(|e| sdk_error(e, &resource))?;

    let mut collector = SelectCollector::default();
    loop {
        match response.payload.recv().await {
            Ok(Some(event)) => collector.push(event),
            Ok(None) => break,
            Err(e) => {
                return Err(Error::Network(format!(
                    "select on {resource} failed: {}",
                    DisplayErrorContext(&e)
                )));
            }
        }
    }

    let output = collector.finish(&resource)?;
    tracing::debug!(object = %resource, bytes = output.records.len(), "select finished");
    Ok(output)
}
