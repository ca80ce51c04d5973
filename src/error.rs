//! Paginator error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaginatorError {
    /// Raised before any store call when the sorted set key is unset or empty.
    #[error("A valid sorted set key must be specified")]
    InvalidKey,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store command timed out after {0:?}")]
    Timeout(Duration),

    /// The record lookup itself failed. A record that simply does not exist
    /// is not an error; the member is dropped instead.
    #[error("Resolver error: {0}")]
    Resolver(String),
}

impl PaginatorError {
    pub fn resolver(err: impl std::fmt::Display) -> Self {
        Self::Resolver(err.to_string())
    }
}

pub type PaginatorResult<T> = Result<T, PaginatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_message() {
        assert_eq!(
            PaginatorError::InvalidKey.to_string(),
            "A valid sorted set key must be specified"
        );
    }

    #[test]
    fn test_resolver_error_wraps_display() {
        let err = PaginatorError::resolver("connection refused");
        assert!(matches!(err, PaginatorError::Resolver(ref msg) if msg == "connection refused"));
    }
}
