//! Application-wide error types.

use std::time::Duration;

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseSqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The eligible subject list could not be loaded.
    #[error("Repository error: {0}")]
    Repository(String),

    /// The live status of a channel could not be determined.
    #[error("Probe error: {0}")]
    Probe(String),

    /// A status or broadcast write/read failed.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Duplicate key: {entity_type} with key {key} already exists")]
    DuplicateKey { entity_type: String, key: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate_key(entity_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity_type: entity_type.into(),
            key: key.into(),
        }
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = Error::duplicate_key("Broadcast", "church-1/V1");
        assert!(err.is_duplicate_key());
        assert_eq!(
            err.to_string(),
            "Duplicate key: Broadcast with key church-1/V1 already exists"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            operation: "probe",
            after: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "probe timed out after 3s");
        assert!(!err.is_duplicate_key());
    }
}
