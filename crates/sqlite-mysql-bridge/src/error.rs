//! Error types for the bridge library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The chosen file is not a SQLite database.
    #[error("Not a valid SQLite database: {}", .0.display())]
    InvalidSqliteFile(PathBuf),

    /// SQLite connection or query error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    Mysql(#[from] sqlx::Error),

    /// Connection failure with context about where it occurred.
    #[error("Connection failed: {message}\n  Context: {context}")]
    Connect { message: String, context: String },

    /// The connection attempt exceeded its timeout.
    #[error("Connection attempt timed out after {0} seconds")]
    ConnectTimeout(u64),

    /// A task of the same kind is already in flight.
    #[error("A {0} task is already running")]
    TaskInFlight(&'static str),

    /// No table was selected for transfer. Warning class: the converter
    /// is never constructed.
    #[error("Please select at least one table.")]
    EmptySelection,

    /// The converter reported a failure.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// A background task reported a failure. The message already carries
    /// its own context.
    #[error("{0}")]
    TaskFailed(String),

    /// Invariant violation inside the library.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Create a Connect error with context about where it occurred.
    pub fn connect(message: impl ToString, context: impl Into<String>) -> Self {
        BridgeError::Connect {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Transfer error, substituting a fallback for empty messages
    /// so a failure always carries a diagnostic.
    pub fn transfer(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            BridgeError::Transfer("transfer failed".to_string())
        } else {
            BridgeError::Transfer(message)
        }
    }

    /// Whether this error belongs to the warning dialog class rather than
    /// the error class (user input problems, not failures).
    pub fn is_warning(&self) -> bool {
        matches!(self, BridgeError::EmptySelection)
    }

    /// Process exit code for the CLI: warnings exit 2, errors exit 1.
    pub fn exit_code(&self) -> u8 {
        if self.is_warning() {
            2
        } else {
            1
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_is_warning() {
        assert!(BridgeError::EmptySelection.is_warning());
        assert_eq!(BridgeError::EmptySelection.exit_code(), 2);
    }

    #[test]
    fn test_other_errors_are_not_warnings() {
        let err = BridgeError::Config("missing host".into());
        assert!(!err.is_warning());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_transfer_message_never_empty() {
        let err = BridgeError::transfer("");
        assert_eq!(err.to_string(), "Transfer failed: transfer failed");
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = BridgeError::Io(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error"));
        assert!(detailed.contains("denied"));
    }
}
