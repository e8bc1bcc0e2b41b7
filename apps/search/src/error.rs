//! Error types for the search service

use sm_query::QueryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad caller input: page above the ceiling, unknown grouping key,
    /// unresolved role map.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised only by the role resolver when its backend refuses a lookup.
    /// Query composition never produces it.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Index unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidArgument(msg) => Error::InvalidArgument(msg),
            QueryError::RolesUnavailable => Error::InvalidArgument(err.to_string()),
            QueryError::MalformedResponse(msg) => Error::MalformedResponse(msg),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            Error::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Whether a retry by the caller could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_roles_are_a_caller_error() {
        let err: Error = QueryError::RolesUnavailable.into();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn malformed_aggregation_stays_malformed() {
        let err: Error = QueryError::MalformedResponse("missing buckets".into()).into();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg == "missing buckets"));
    }
}
