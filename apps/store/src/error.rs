//! Error types for the MedicationRequest store

use serde_json::{json, Value as JsonValue};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey { collection: String, key: String },

    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Delete refused by the storage layer. Carries the driver message.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Invalid search: {0}")]
    InvalidSearch(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<medreq_models::Error> for Error {
    fn from(err: medreq_models::Error) -> Self {
        match err {
            medreq_models::Error::SerializationError(e) => Error::Serialization(e),
            other => Error::InvalidResource(other.to_string()),
        }
    }
}

impl Error {
    /// Driver-level failure (network, constraint, closed pool, ...)
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Database(_)
                | Error::Migration(_)
                | Error::Storage(_)
                | Error::DuplicateKey { .. }
        )
    }

    /// HTTP status the boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Conflict { .. } | Error::DuplicateKey { .. } => 409,
            Error::NotSupported(_) => 501,
            Error::InvalidResource(_) | Error::InvalidSearch(_) => 400,
            Error::Serialization(_) => 422,
            Error::Database(_)
            | Error::Migration(_)
            | Error::Storage(_)
            | Error::Config(_)
            | Error::Other(_) => 500,
        }
    }

    /// Render as a FHIR OperationOutcome
    ///
    /// Internal failures are not echoed back; callers get a generic message
    /// and the detail stays in the logs.
    pub fn operation_outcome(&self) -> JsonValue {
        let status = self.status_code();
        let diagnostics = if status >= 500 && !matches!(self, Error::NotSupported(_)) {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        json!({
            "resourceType": "OperationOutcome",
            "issue": [{
                "severity": "error",
                "code": status_to_fhir_code(status),
                "diagnostics": diagnostics
            }]
        })
    }
}

fn status_to_fhir_code(status: u16) -> &'static str {
    match status {
        400 => "invalid",
        404 => "not-found",
        409 => "conflict",
        422 => "processing",
        501 => "not-supported",
        _ => "exception",
    }
}
