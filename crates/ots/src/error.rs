// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Error record returned by the service in the body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub request_id: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ots service error {} (HTTP {}): {} [request id {}]",
            self.code, self.status, self.message, self.request_id
        )
    }
}

impl std::error::Error for ServiceError {}

/// OTS client error type.
///
/// Everything except [`Error::Service`] is raised locally and is never the
/// result of the service rejecting a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ots: API {0} is not supported")]
    UnsupportedOperation(String),
    #[error("ots: unsupported column value type: {0}")]
    UnsupportedValueType(String),
    #[error("ots: invalid input: {0}")]
    InvalidInput(String),
    #[error("ots: wire decode failed: {0}")]
    WireDecode(String),
    #[error("ots: malformed response: {0}")]
    MalformedResponse(String),
    #[error("ots: MD5 mismatch in response")]
    ChecksumMismatch,
    #[error(
        "ots: the difference between date in response and system time is {skew_seconds}s, more than 15 minutes"
    )]
    ClockSkewExceeded { skew_seconds: i64 },
    #[error("ots: invalid authorization in response: {0}")]
    InvalidAuthorization(String),
    #[error("ots: HTTP status {status}: error body could not be decoded: {detail}")]
    UndecodableErrorBody { status: u16, detail: String },
    #[error("ots transport: {0}")]
    Transport(String),
    #[error("{0}")]
    Service(ServiceError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Error::WireDecode(err.to_string())
    }
}

/// Checks whether an error is a service error with the specified code.
pub fn is_service_error(err: &Error, code: &str) -> bool {
    matches!(err, Error::Service(ServiceError { code: c, .. }) if c == code)
}

impl Error {
    pub fn wire_decode(msg: impl Into<String>) -> Self {
        Error::WireDecode(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedResponse(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn service(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Error::Service(ServiceError {
            status,
            code: code.into(),
            message: message.into(),
            request_id: request_id.into(),
        })
    }

    /// True for errors raised locally rather than reported by the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Service(_))
    }

    pub fn is_service_error(&self, code: &str) -> bool {
        is_service_error(self, code)
    }

    /// HTTP status of the response behind the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service(err) => Some(err.status),
            Error::UndecodableErrorBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_are_matched_by_code() {
        let err = Error::service(404, "OTSObjectNotExist", "table missing", "req-1");
        assert!(is_service_error(&err, "OTSObjectNotExist"));
        assert!(!err.is_service_error("OTSAuthFailed"));
        assert!(!err.is_client_error());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn local_errors_carry_no_status() {
        let err = Error::ChecksumMismatch;
        assert!(err.is_client_error());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "ots: MD5 mismatch in response");
    }

    #[test]
    fn undecodable_error_bodies_are_local_but_keep_the_status() {
        let err = Error::UndecodableErrorBody {
            status: 502,
            detail: "buffer underflow".to_string(),
        };
        assert!(err.is_client_error());
        assert!(!err.is_service_error(""));
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            err.to_string(),
            "ots: HTTP status 502: error body could not be decoded: buffer underflow"
        );
    }
}
