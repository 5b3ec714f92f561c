//! The closed [`ErrorCode`] set carried by `error` command results.

use serde::Deserialize;
use serde::Serialize;

/// Closed set of error codes a [`CommandResult::Error`](crate::result::ErrorPayload)
/// may carry. Grouped per the taxonomy in the error-handling design: parse/
/// validation, lookup, authorization, transient, compaction, fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    MissingArgument,
    ArgumentTypeError,
    ProviderNotFound,
    CredentialNotFound,
    AuthenticationFailed,
    PermissionDenied,
    OperationNotAllowed,
    FileNotFound,
    PathNotAllowed,
    ResourceNotFound,
    CommandNotFound,
    CommandDisabled,
    CommandAborted,
    InternalError,
    Timeout,
    NetworkError,
    UnknownError,
}

impl ErrorCode {
    /// Whether an error of this kind is meaningful to retry (used by the
    /// Fallback Chain's transient-failure classification).
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCode::Timeout | ErrorCode::NetworkError)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
