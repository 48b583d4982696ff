//! Error types for the resource-pattern matching engine

use thiserror::Error;

/// Matcher compilation errors
///
/// All failure-prone logic runs at compile time; match operations on a
/// compiled matcher are infallible.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatcherError {
    /// Malformed value in the matcher options map
    #[error("invalid matcher option {key}='{value}': {reason}")]
    InvalidOption {
        /// Option key as configured on the resource definition
        key: String,
        /// Rejected value
        value: String,
        /// What a well-formed value looks like
        reason: String,
    },
}

/// Result type for matcher operations
pub type Result<T> = std::result::Result<T, MatcherError>;
