//! Error types for crowtalk.
//!
//! This module defines all error types used throughout the crowtalk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for crowtalk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Catalog Errors ===
    /// Two items share an id within one catalog build.
    ///
    /// Source collaborators must guarantee uniqueness before calling the
    /// builder; this is a data error fatal to the build call.
    #[error("duplicate catalog item id '{id}'")]
    DuplicateItem {
        /// The offending item id.
        id: String,
    },

    /// A catalog item references a category id the registry does not know.
    ///
    /// The builder never skips-and-continues; a silently dropped item would
    /// misrepresent catalog completeness to the caller.
    #[error("unknown category id '{id}'")]
    UnknownCategory {
        /// The unresolved category id.
        id: String,
    },

    /// A category argument passed to the suggestion engine does not resolve
    /// in the registry. Callers must resolve categories through the registry
    /// first, so this is a programming error.
    #[error("invalid category '{id}': not present in the registry")]
    InvalidCategory {
        /// The unresolved category id.
        id: String,
    },

    /// A malformed coordinate pair was supplied at a collaborator boundary,
    /// such as a configured home position out of range. Item-side bad
    /// coordinates inside a catalog build are demoted to "no location"
    /// instead of raising this.
    #[error("invalid location: lat={lat}, lon={lon}")]
    InvalidLocation {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },

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

    /// A category definition file failed validation.
    #[error("invalid category definitions: {message}")]
    RegistryValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to read a curated sound manifest.
    #[error("failed to load curated manifest at {path}: {message}")]
    ManifestLoad {
        /// Path to the manifest file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
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
}

/// A specialized Result type for crowtalk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new duplicate-item error.
    #[must_use]
    pub fn duplicate_item(id: impl Into<String>) -> Self {
        Self::DuplicateItem { id: id.into() }
    }

    /// Create a new unknown-category error.
    #[must_use]
    pub fn unknown_category(id: impl Into<String>) -> Self {
        Self::UnknownCategory { id: id.into() }
    }

    /// Create a new invalid-category error.
    #[must_use]
    pub fn invalid_category(id: impl Into<String>) -> Self {
        Self::InvalidCategory { id: id.into() }
    }

    /// Create a new registry validation error.
    #[must_use]
    pub fn registry_validation(message: impl Into<String>) -> Self {
        Self::RegistryValidation {
            message: message.into(),
        }
    }

    /// Check if this error indicates an unresolved category reference.
    #[must_use]
    pub fn is_category_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory { .. } | Self::InvalidCategory { .. }
        )
    }

    /// Check if this error indicates a duplicate catalog item id.
    #[must_use]
    pub fn is_duplicate_item(&self) -> bool {
        matches!(self, Self::DuplicateItem { .. })
    }
}
