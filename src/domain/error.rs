//! Domain-level error types for message-history-exporter.
//!
//! Content extraction never fails; these errors cover the database,
//! configuration and file output around it.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Messages database not found at expected location.
    #[error("Messages database not found at: {path}")]
    DatabaseNotFound { path: PathBuf },

    /// Failed to open or query the database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No handle matched the search term.
    #[error("Contact not found: {search}")]
    ContactNotFound { search: String },

    /// The contact exists but has no messages.
    #[error("No messages found for contact: {contact_id}")]
    NoMessages { contact_id: String },

    /// Invalid or unexpected input data.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_not_found_message() {
        let err = AppError::ContactNotFound {
            search: "+15550100".into(),
        };
        assert_eq!(err.to_string(), "Contact not found: +15550100");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = AppError::io(
            "Failed to write",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
