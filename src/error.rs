//! This module defines all error types used throughout the application.

use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Data source errors
    #[error("Data source error: {0}")]
    DataSource(String),

    /// HTTP transport errors talking to a node
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status without a JSON-RPC error object
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// JSON-RPC error object returned by a node
    #[error("RPC error calling {method}: {code} {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// Parser errors
    #[error("Parser error: {0}")]
    Parser(String),

    /// A record was appended to a name that is already marked terminal
    #[error("Consistency error: '{name}' already has a terminal action")]
    Consistency { name: String },

    /// A block was supplied out of height order
    #[error("Out of order block: expected height {expected}, got {got}")]
    OutOfOrderBlock { expected: u64, got: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a data source error
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Self::Parser(msg.into())
    }

    /// Create a consistency error for a name
    pub fn consistency(name: impl Into<String>) -> Self {
        Self::Consistency { name: name.into() }
    }

    /// Whether retrying the same request could succeed
    ///
    /// Transport failures and 5xx responses are retryable. Client errors and
    /// JSON-RPC error objects are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if error is a store consistency conflict
    pub fn is_consistency(&self) -> bool {
        matches!(self, Error::Consistency { .. })
    }
}

// Implement From traits for common external error types

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parser(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::custom("test error");
        assert_eq!(err.to_string(), "test error");

        let err = Error::data_source("connection failed");
        assert_eq!(err.to_string(), "Data source error: connection failed");
    }

    #[test]
    fn test_consistency_error_names_the_space() {
        let err = Error::consistency("bob");
        assert!(err.is_consistency());
        assert_eq!(
            err.to_string(),
            "Consistency error: 'bob' already has a terminal action"
        );

        assert!(!Error::custom("other").is_consistency());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::Http("connection refused".to_string()).is_retryable());
        assert!(
            Error::HttpStatus {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !Error::HttpStatus {
                status: 401,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !Error::Rpc {
                method: "getblockhash".to_string(),
                code: -8,
                message: "Block height out of range".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_ensure_macro() {
        fn check(height: u64) -> Result<()> {
            crate::ensure!(height > 10, "height {} too low", height);
            Ok(())
        }

        assert!(check(11).is_ok());
        assert_eq!(check(3).unwrap_err().to_string(), "height 3 too low");
    }
}
