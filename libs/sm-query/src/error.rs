//! Error types for query composition and response decoding

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while composing a query or decoding an index response.
///
/// Visibility is never enforced by raising an error: an unauthorized document
/// is simply not matched by the composed filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requester's project roles were not resolved before composition.
    #[error("Project roles have not been resolved for this request")]
    RolesUnavailable,

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),
}
