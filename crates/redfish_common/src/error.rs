//! Error types for single-resource operations.
//!
//! Aggregate (per-collection) failures live in [`crate::aggregate`].

use std::fmt;

use serde_json::error::Category;
use thiserror::Error;

/// What went wrong while decoding a JSON document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Not well-formed JSON
    Syntax,
    /// Well-formed JSON that does not fit the resource shape
    Data,
    /// Document ended before a complete value was read
    Eof,
    /// Failure reading the underlying bytes
    Io,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodeErrorKind::Syntax => "syntax",
            DecodeErrorKind::Data => "schema",
            DecodeErrorKind::Eof => "truncated",
            DecodeErrorKind::Io => "io",
        };
        f.write_str(s)
    }
}

/// A single document could not be turned into a resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode {what} ({kind}): {message}")]
pub struct DecodeError {
    /// Resource kind being decoded
    pub what: &'static str,
    pub kind: DecodeErrorKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl DecodeError {
    pub fn from_json(what: &'static str, err: serde_json::Error) -> Self {
        let kind = match err.classify() {
            Category::Syntax => DecodeErrorKind::Syntax,
            Category::Data => DecodeErrorKind::Data,
            Category::Eof => DecodeErrorKind::Eof,
            Category::Io => DecodeErrorKind::Io,
        };

        Self {
            what,
            kind,
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Network or HTTP-level failure for one GET
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to {uri} failed: {reason}")]
    Request { uri: String, reason: String },

    #[error("request to {uri} timed out after {secs} seconds")]
    Timeout { uri: String, secs: u64 },

    #[error("HTTP {status} from {uri}")]
    Status { uri: String, status: u16 },

    #[error("failed to read response body from {uri}: {reason}")]
    Body { uri: String, reason: String },
}

impl TransportError {
    /// URI of the request that failed
    pub fn uri(&self) -> &str {
        match self {
            TransportError::Request { uri, .. }
            | TransportError::Timeout { uri, .. }
            | TransportError::Status { uri, .. }
            | TransportError::Body { uri, .. } => uri,
        }
    }

    /// HTTP status code, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why fetching one member link failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The collection document itself could not be obtained.
///
/// Fatal to the whole resolve call: there is nothing to aggregate yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch collection {uri}: {source}")]
pub struct CollectionFetchError {
    pub uri: String,
    #[source]
    pub source: MemberError,
}

impl CollectionFetchError {
    pub fn new(uri: impl Into<String>, source: impl Into<MemberError>) -> Self {
        Self {
            uri: uri.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_classifies_syntax() {
        let err = serde_json::from_slice::<serde_json::Value>(b"{not json").unwrap_err();
        let decode = DecodeError::from_json("Sensor", err);
        assert_eq!(decode.kind, DecodeErrorKind::Syntax);
        assert_eq!(decode.line, 1);
        assert!(decode.to_string().contains("Sensor"));
    }

    #[test]
    fn test_decode_error_classifies_eof() {
        let err = serde_json::from_slice::<serde_json::Value>(b"{\"Id\": ").unwrap_err();
        let decode = DecodeError::from_json("Sensor", err);
        assert_eq!(decode.kind, DecodeErrorKind::Eof);
    }

    #[test]
    fn test_transport_error_accessors() {
        let err = TransportError::Status {
            uri: "/redfish/v1/Sensors/2".to_string(),
            status: 500,
        };
        assert_eq!(err.uri(), "/redfish/v1/Sensors/2");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500 from /redfish/v1/Sensors/2");
    }

    #[test]
    fn test_collection_fetch_error_message() {
        let err = CollectionFetchError::new(
            "/redfish/v1/Sensors",
            TransportError::Status {
                uri: "/redfish/v1/Sensors".to_string(),
                status: 503,
            },
        );
        assert_eq!(
            err.to_string(),
            "failed to fetch collection /redfish/v1/Sensors: HTTP 503 from /redfish/v1/Sensors"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
