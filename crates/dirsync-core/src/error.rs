//! Synchronization error types
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur during a synchronization cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    // Transport errors (usually transient)
    /// Fetching the source snapshot failed.
    #[error("source fetch failed: {message}")]
    SourceFetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Looking up a record in the target system failed.
    #[error("target lookup failed for '{identifier}': {message}")]
    TargetLookup {
        identifier: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Committing staged attribute changes to the target failed.
    #[error("commit failed for '{identifier}': {message}")]
    Commit {
        identifier: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Encoding errors (permanent, contained per attribute)
    /// An attribute value could not be encoded for the target system.
    #[error("invalid value for attribute '{attribute}': {value}")]
    FormatError { attribute: String, value: String },

    // Configuration errors (permanent)
    /// The field-mapping table is invalid.
    #[error("invalid mapping: {message}")]
    InvalidMapping { message: String },

    /// A record is missing data required for the operation.
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },

    /// Repository or worker configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl SyncError {
    /// Check if this error is transient and a later cycle may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::SourceFetch { .. } | SyncError::TargetLookup { .. } | SyncError::Commit { .. }
        )
    }

    /// Check if this error is permanent and requires intervention.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a source fetch error.
    pub fn source_fetch(message: impl Into<String>) -> Self {
        SyncError::SourceFetch {
            message: message.into(),
            source: None,
        }
    }

    /// Create a source fetch error with source.
    pub fn source_fetch_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SyncError::SourceFetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a target lookup error.
    pub fn target_lookup(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::TargetLookup {
            identifier: identifier.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a target lookup error with source.
    pub fn target_lookup_with_source(
        identifier: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SyncError::TargetLookup {
            identifier: identifier.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a commit error.
    pub fn commit(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Commit {
            identifier: identifier.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a commit error with source.
    pub fn commit_with_source(
        identifier: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SyncError::Commit {
            identifier: identifier.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a format error naming the offending value.
    pub fn format(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        SyncError::FormatError {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        SyncError::InvalidMapping {
            message: message.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        SyncError::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        SyncError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
