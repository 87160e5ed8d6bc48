use serde_json::Value;
use std::fmt;
use thiserror::Error as ThisError;

/// RPC error codes.
///
/// The numeric values are borrowed from the JSON-RPC/XML-RPC conventions and
/// are stable identifiers: they travel across the wire and drive the retry
/// classifier, so a value must never be reassigned to a different meaning.
///
/// Code prefix families:
/// - `-310xx`: service bus level (probing, proxying)
/// - `-320xx`: server level
/// - `-325xx`: application level
/// - `-326xx`: invalid request
/// - `-327xx`: request parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Application probing failed.
    ProbeFailed,
    /// Generic error, used when no explicit code was given.
    Generic,
    /// Endpoint is temporarily disabled.
    EndpointDisabled,
    /// Error while parsing the request envelope.
    Parse,
    /// Structurally invalid request.
    InvalidRequest,
    /// Method is not registered.
    MethodNotFound,
    /// Method parameters could not be bound.
    InvalidParams,
    /// Unexpected server-side fault.
    Internal,
    /// Authorization rejection.
    AccessDenied,
    /// Any other code received off the wire, including 0 (unspecified).
    Other(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::ProbeFailed => -31001,
            ErrorCode::Generic => -32000,
            ErrorCode::EndpointDisabled => -32501,
            ErrorCode::Parse => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::Internal => -32603,
            ErrorCode::AccessDenied => -32604,
            ErrorCode::Other(code) => *code,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            -31001 => ErrorCode::ProbeFailed,
            -32000 => ErrorCode::Generic,
            -32501 => ErrorCode::EndpointDisabled,
            -32700 => ErrorCode::Parse,
            -32600 => ErrorCode::InvalidRequest,
            -32601 => ErrorCode::MethodNotFound,
            -32602 => ErrorCode::InvalidParams,
            -32603 => ErrorCode::Internal,
            -32604 => ErrorCode::AccessDenied,
            other => ErrorCode::Other(other),
        }
    }

    /// Whether a server-confirmed error carrying this code is worth retrying.
    ///
    /// Internal, generic and endpoint-disabled represent transient server
    /// conditions. Code 0 means the peer did not classify the failure at all,
    /// so it is retried just in case. Everything else is a permanent
    /// application-level rejection.
    pub fn should_retry(&self) -> bool {
        match self {
            ErrorCode::EndpointDisabled | ErrorCode::Internal | ErrorCode::Generic => true,
            ErrorCode::Other(0) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An error the server explicitly produced and communicated across the wire.
///
/// Compared by code for retry decisions; immutable once built.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub message: String,
    pub code: ErrorCode,
    pub data: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            message: message.into(),
            code,
            data,
        }
    }

    pub fn parse(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::Parse, message, data)
    }

    pub fn invalid_request(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, data)
    }

    pub fn method_not_found(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::MethodNotFound, message, data)
    }

    pub fn invalid_params(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidParams, message, data)
    }

    pub fn internal(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::Internal, message, data)
    }

    pub fn endpoint_disabled(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::EndpointDisabled, message, data)
    }

    pub fn access_denied(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(ErrorCode::AccessDenied, message, data)
    }
}

// Displays just the message, matching what the wire layer serializes into
// the envelope's `message` member.
impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorResponse {}

/// Unified error type returned by handlers, routers and wire clients.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A confirmed response from a remote endpoint.
    #[error("{0}")]
    Response(#[from] ErrorResponse),

    /// A response which could not be decoded as a valid envelope, considered
    /// a communication failure. Carries the raw payload for diagnostics.
    #[error("{message}")]
    Decoding { message: String, raw: Vec<u8> },

    /// HTTP response status code was not 2xx.
    #[error("{message}")]
    Http { message: String, status: u16 },

    /// Signals a non-existing service; the HTTP layer maps this to a 404
    /// response instead of an error envelope.
    #[error("{0}")]
    ServiceNotFound(String),

    /// Failure while composing or performing the underlying exchange.
    #[error("{0}")]
    Transport(String),

    /// Any other, unclassified failure. Serialized with the generic code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn decoding(message: impl Into<String>, raw: Vec<u8>) -> Self {
        Error::Decoding {
            message: message.into(),
            raw,
        }
    }

    pub fn http(message: impl Into<String>, status: u16) -> Self {
        Error::Http {
            message: message.into(),
            status,
        }
    }

    pub fn service_not_found(message: impl Into<String>) -> Self {
        Error::ServiceNotFound(message.into())
    }

    /// The error response, if this error is one.
    pub fn as_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Response(resp) => Some(resp),
            _ => None,
        }
    }
}

/// Tells whether the given error represents a condition worth retrying.
///
/// Errors which are not server-confirmed responses are retried as a
/// fail-safe: they represent communication failures or unexpected faults
/// whose cause is unknown. Confirmed responses delegate to the code
/// classification.
pub fn should_retry(err: &Error) -> bool {
    match err {
        Error::Response(resp) => resp.code.should_retry(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Parse.code(), -32700);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::AccessDenied.code(), -32604);
        assert_eq!(ErrorCode::Other(-31999).code(), -31999);
    }

    #[test]
    fn test_code_round_trip() {
        for code in [
            ErrorCode::ProbeFailed,
            ErrorCode::Generic,
            ErrorCode::EndpointDisabled,
            ErrorCode::Parse,
            ErrorCode::InvalidRequest,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::Internal,
            ErrorCode::AccessDenied,
        ] {
            assert_eq!(ErrorCode::from_code(code.code()), code);
        }
        assert_eq!(ErrorCode::from_code(0), ErrorCode::Other(0));
    }

    #[test]
    fn test_should_retry_transient_codes() {
        for code in [
            ErrorCode::Other(0),
            ErrorCode::EndpointDisabled,
            ErrorCode::Internal,
            ErrorCode::Generic,
        ] {
            let err = Error::Response(ErrorResponse::new(code, "boom", None));
            assert!(should_retry(&err), "code {code} should be retried");
        }
    }

    #[test]
    fn test_should_not_retry_rejections() {
        for code in [
            ErrorCode::Parse,
            ErrorCode::InvalidRequest,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::AccessDenied,
            ErrorCode::ProbeFailed,
        ] {
            let err = Error::Response(ErrorResponse::new(code, "nope", None));
            assert!(!should_retry(&err), "code {code} should not be retried");
        }
    }

    #[test]
    fn test_should_retry_unclassified_failures() {
        assert!(should_retry(&Error::Other(anyhow!("unexpected"))));
        assert!(should_retry(&Error::decoding("bad payload", vec![])));
        assert!(should_retry(&Error::http("bad gateway", 502)));
    }

    #[test]
    fn test_error_response_display() {
        let err = ErrorResponse::invalid_params("A should be an integer", None);
        assert_eq!(err.to_string(), "A should be an integer");
    }
}
