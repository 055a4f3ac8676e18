//! Error types for skylog.
//!
//! This module defines all error types used throughout the skylog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for skylog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("no {kind} found matching '{name}'")]
    RecordNotFound {
        /// Kind of record, e.g. "aircraft" or "pilot".
        kind: &'static str,
        /// The lookup key that failed.
        name: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Export Errors ===
    /// The configured primary pilot does not exist.
    #[error("primary pilot (id {id}) not found; create a pilot first")]
    PrimaryPilotMissing {
        /// The configured pilot id.
        id: i64,
    },

    /// A record failed validation during export.
    #[error("flight on {date} failed validation: {message}")]
    InvalidRecord {
        /// Date of the offending flight.
        date: chrono::NaiveDate,
        /// Description of the validation failure.
        message: String,
    },

    // === Publish Errors ===
    /// A version-control command failed.
    #[error("git {action} failed: {message}")]
    Vcs {
        /// The git action that failed, e.g. "commit" or "push".
        action: &'static str,
        /// Diagnostic output from git.
        message: String,
    },

    // === Import Errors ===
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The airport data file was not found.
    #[error("airport data file not found: {path}")]
    AirportFileMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for skylog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a record-not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::RecordNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a version-control error for a failed git action.
    #[must_use]
    pub fn vcs(action: &'static str, message: impl Into<String>) -> Self {
        Self::Vcs {
            action,
            message: message.into(),
        }
    }

    /// Check if this error is a failed push (the commit is still local).
    #[must_use]
    pub fn is_push_failure(&self) -> bool {
        matches!(self, Self::Vcs { action: "push", .. })
    }
}
