//! Mapping of aws-sdk-s3 errors onto the s3kit error type

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use s3kit_core::Error;

/// Header carrying the bucket's region on redirect responses
const BUCKET_REGION_HEADER: &str = "x-amz-bucket-region";

/// Convert an SDK error into an s3kit error
///
/// `resource` names what the request addressed (e.g. `bucket/key`) and is
/// used as the message when the service sends none (HEAD responses have no
/// body).
pub(crate) fn sdk_error<E>(err: SdkError<E, HttpResponse>, resource: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match &err {
        SdkError::ServiceError(context) => {
            let raw = context.raw();
            let status = raw.status().as_u16();
            let code = context.err().code().unwrap_or_default();
            let message = context.err().message().unwrap_or(resource);
            let region = raw.headers().get(BUCKET_REGION_HEADER);

            tracing::debug!(code, status, resource, "service error");
            service_error(code, message, status, region)
        }
        SdkError::TimeoutError(_) => Error::Network(format!("request for {resource} timed out")),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            Error::Network(DisplayErrorContext(&err).to_string())
        }
        SdkError::ConstructionFailure(_) => {
            Error::InvalidArgument(DisplayErrorContext(&err).to_string())
        }
        _ => Error::General(DisplayErrorContext(&err).to_string()),
    }
}

/// Classify a service response; a redirect picks up the bucket's regional endpoint
pub(crate) fn service_error(
    code: &str,
    message: &str,
    status: u16,
    bucket_region: Option<&str>,
) -> Error {
    let mut error = Error::from_service(code, message, status);
    if let Error::Redirect { endpoint } = &mut error {
        *endpoint = bucket_region
            .filter(|region| !region.is_empty())
            .map(|region| format!("s3.{region}.amazonaws.com"));
    }
    error
}

/// Error code sent by the service, if the request got that far
pub(crate) fn service_code<E>(err: &SdkError<E, HttpResponse>) -> Option<&str>
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::ServiceError(context) => context.err().code(),
        _ => None,
    }
}

/// A model builder rejected a missing required field
pub(crate) fn build_error(err: BuildError) -> Error {
    Error::InvalidArgument(err.to_string())
}

/// Failure while streaming a body to or from the service
pub(crate) fn stream_error(err: impl std::fmt::Display) -> Error {
    Error::Network(format!("body stream failed: {err}"))
}

/// Wrap an operation error the way the SDK reports a service response
#[cfg(test)]
pub(crate) fn service_failure<E>(err: E, status: u16) -> SdkError<E, HttpResponse> {
    use aws_smithy_types::body::SdkBody;

    let status = status.try_into().expect("valid status code");
    SdkError::service_error(err, HttpResponse::new(status, SdkBody::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::head_bucket::HeadBucketError;

    #[test]
    fn test_redirect_uses_bucket_region() {
        match service_error("PermanentRedirect", "wrong endpoint", 301, Some("eu-west-1")) {
            Error::Redirect { endpoint } => {
                assert_eq!(endpoint.as_deref(), Some("s3.eu-west-1.amazonaws.com"));
            }
            other => panic!("expected redirect, got {other:?}"),
        }

        match service_error("", "", 301, None) {
            Error::Redirect { endpoint } => assert_eq!(endpoint, None),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_region_header_ignored_for_other_errors() {
        let error = service_error("NoSuchKey", "missing", 404, Some("eu-west-1"));
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn test_service_failure_keeps_code() {
        let err = HeadBucketError::generic(
            aws_sdk_s3::error::ErrorMetadata::builder()
                .code("AccessDenied")
                .message("denied")
                .build(),
        );
        let err = service_failure(err, 403);
        assert_eq!(service_code(&err), Some("AccessDenied"));
        match sdk_error(err, "bucket") {
            Error::Auth(detail) => assert_eq!(detail, "AccessDenied: denied"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_is_network_error() {
        let err: SdkError<HeadBucketError, HttpResponse> = SdkError::timeout_error("deadline");
        assert_eq!(service_code(&err), None);
        match sdk_error(err, "bucket") {
            Error::Network(msg) => assert_eq!(msg, "request for bucket timed out"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn test_construction_failure_is_invalid_argument() {
        let err: SdkError<HeadBucketError, HttpResponse> =
            SdkError::construction_failure("missing bucket");
        assert!(matches!(sdk_error(err, "bucket"), Error::InvalidArgument(_)));
    }

    #[test]
    fn test_stream_error_is_network() {
        assert!(matches!(stream_error("reset"), Error::Network(_)));
    }
}
