//! Error taxonomy for engine requests and response decoding.

use crate::variant::WireType;

/// Engine-reported error class, as carried in a failed response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionInterrupted,
    Invalid,
    Failed,
    Cancelled,
    Unknown,
}

impl ErrorKind {
    /// Classify the engine's numeric error code. Codes outside the
    /// documented set map to [`ErrorKind::Unknown`].
    pub fn from_code(code: i64) -> ErrorKind {
        match code {
            1 => ErrorKind::ConnectionInterrupted,
            2 => ErrorKind::Invalid,
            3 => ErrorKind::Failed,
            4 => ErrorKind::Cancelled,
            _ => ErrorKind::Unknown,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ErrorKind::ConnectionInterrupted => 1,
            ErrorKind::Invalid => 2,
            ErrorKind::Failed => 3,
            ErrorKind::Cancelled => 4,
            ErrorKind::Unknown => 0,
        }
    }

    /// Classify a textual kind tag such as `"connection_interrupted"`.
    pub fn from_tag(tag: &str) -> ErrorKind {
        match tag {
            "connection_interrupted" | "connectionInterrupted" => ErrorKind::ConnectionInterrupted,
            "invalid" | "request_invalid" => ErrorKind::Invalid,
            "failed" | "request_failed" => ErrorKind::Failed,
            "cancelled" | "request_cancelled" => ErrorKind::Cancelled,
            _ => ErrorKind::Unknown,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::ConnectionInterrupted => "connection_interrupted",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Failed => "failed",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// A request the engine refused or could not complete.
///
/// Built once from an error envelope and handed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    ConnectionInterrupted(Option<String>),
    Invalid(Option<String>),
    Failed(Option<String>),
    Cancelled(Option<String>),
    Unknown(Option<String>),
}

impl RequestError {
    pub fn new(kind: ErrorKind, description: Option<String>) -> RequestError {
        match kind {
            ErrorKind::ConnectionInterrupted => RequestError::ConnectionInterrupted(description),
            ErrorKind::Invalid => RequestError::Invalid(description),
            ErrorKind::Failed => RequestError::Failed(description),
            ErrorKind::Cancelled => RequestError::Cancelled(description),
            ErrorKind::Unknown => RequestError::Unknown(description),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::ConnectionInterrupted(_) => ErrorKind::ConnectionInterrupted,
            RequestError::Invalid(_) => ErrorKind::Invalid,
            RequestError::Failed(_) => ErrorKind::Failed,
            RequestError::Cancelled(_) => ErrorKind::Cancelled,
            RequestError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            RequestError::ConnectionInterrupted(d)
            | RequestError::Invalid(d)
            | RequestError::Failed(d)
            | RequestError::Cancelled(d)
            | RequestError::Unknown(d) => d.as_deref(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.kind() {
            ErrorKind::ConnectionInterrupted => "connection to the analysis service interrupted",
            ErrorKind::Invalid => "invalid request",
            ErrorKind::Failed => "request failed",
            ErrorKind::Cancelled => "request cancelled",
            ErrorKind::Unknown => "unknown engine error",
        };
        match self.description() {
            Some(d) => write!(f, "{}: {}", label, d),
            None => f.write_str(label),
        }
    }
}

impl std::error::Error for RequestError {}

/// The response contained a value the decoder has no mapping for.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    UnsupportedType(WireType),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnsupportedType(t) => {
                write!(f, "unsupported response value type: {}", t)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
