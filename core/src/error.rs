use std::path::PathBuf;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CosError {
    /// Local file or remote bucket does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad numeric parameter or missing required setting
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credentials were rejected by the service
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request never got a usable response
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = CosError> = std::result::Result<T, E>;

const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "RequestTimeTooSkewed",
];

const NOT_FOUND_ERROR_CODES: &[&str] = &["NoSuchBucket"];

impl CosError {
    /// Process exit code for this error. Missing files and buckets exit with 2,
    /// everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound(_) => 2,
            _ => 1,
        }
    }

    /// Classifies a service-side rejection by its error code.
    pub fn from_service_code(code: Option<&str>, message: Option<&str>) -> Self {
        let message = message.unwrap_or("no error message").to_string();
        match code {
            Some(code) if AUTH_ERROR_CODES.contains(&code) => {
                Self::Auth(format!("{code}: {message}"))
            }
            Some(code) if NOT_FOUND_ERROR_CODES.contains(&code) => {
                Self::NotFound(format!("{code}: {message}"))
            }
            Some(code) => Self::Service {
                code: code.to_string(),
                message,
            },
            None => Self::Service {
                code: "Unknown".to_string(),
                message,
            },
        }
    }
}

impl<E, R> From<SdkError<E, R>> for CosError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    fn from(error: SdkError<E, R>) -> Self {
        match &error {
            SdkError::ServiceError(context) => {
                let err = context.err();
                Self::from_service_code(err.code(), err.message())
            }
            SdkError::ConstructionFailure(_) => {
                Self::InvalidConfig(DisplayErrorContext(&error).to_string())
            }
            _ => Self::Connectivity(DisplayErrorContext(&error).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::{error::ErrorMetadata, operation::list_objects_v2::ListObjectsV2Error};
    use aws_smithy_runtime_api::{
        client::{orchestrator::HttpResponse, result::ConnectorError},
        http::StatusCode,
    };
    use aws_smithy_types::body::SdkBody;

    use super::*;

    #[test]
    fn credential_codes_are_auth_errors() {
        for code in ["AccessDenied", "InvalidAccessKeyId", "SignatureDoesNotMatch"] {
            let err = CosError::from_service_code(Some(code), Some("denied"));
            assert!(matches!(err, CosError::Auth(_)), "{code} -> {err:?}");
        }
    }

    #[test]
    fn missing_bucket_is_not_found() {
        let err = CosError::from_service_code(Some("NoSuchBucket"), None);
        assert!(matches!(err, CosError::NotFound(ref msg) if msg.contains("NoSuchBucket")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn other_codes_keep_code_and_message() {
        let err = CosError::from_service_code(Some("SlowDown"), Some("reduce request rate"));
        match err {
            CosError::Service { code, message } => {
                assert_eq!(code, "SlowDown");
                assert_eq!(message, "reduce request rate");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    type ListError = SdkError<ListObjectsV2Error, HttpResponse>;

    fn service_error(code: &str, status: u16) -> ListError {
        let err = ListObjectsV2Error::generic(
            ErrorMetadata::builder()
                .code(code)
                .message("rejected")
                .build(),
        );
        let raw = HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::empty());
        SdkError::service_error(err, raw)
    }

    #[test]
    fn sdk_dispatch_failure_is_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = ListError::dispatch_failure(ConnectorError::io(Box::new(io)));
        assert!(matches!(CosError::from(error), CosError::Connectivity(_)));
    }

    #[test]
    fn sdk_timeout_is_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let error = ListError::timeout_error(io);
        assert!(matches!(CosError::from(error), CosError::Connectivity(_)));
    }

    #[test]
    fn sdk_construction_failure_is_invalid_config() {
        let error = ListError::construction_failure("bucket name is not valid");
        assert!(matches!(CosError::from(error), CosError::InvalidConfig(_)));
    }

    #[test]
    fn sdk_service_errors_are_classified_by_code() {
        assert!(matches!(
            CosError::from(service_error("InvalidAccessKeyId", 403)),
            CosError::Auth(_)
        ));
        assert!(matches!(
            CosError::from(service_error("NoSuchBucket", 404)),
            CosError::NotFound(_)
        ));
        assert!(matches!(
            CosError::from(service_error("InternalError", 500)),
            CosError::Service { ref code, .. } if code == "InternalError"
        ));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(CosError::InvalidConfig("x".into()).exit_code(), 1);
        assert_eq!(CosError::Auth("x".into()).exit_code(), 1);
        assert_eq!(CosError::Connectivity("x".into()).exit_code(), 1);
    }
}
