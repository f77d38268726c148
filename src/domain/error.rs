use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    /// The storage backend rejected a request. `code` is the backend's own
    /// machine-readable code (or the HTTP status when it sent none).
    #[error("Persistence error: {message}")]
    PersistenceError {
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    pub fn persistence(message: impl Into<String>, code: Option<String>) -> Self {
        AppError::PersistenceError {
            message: message.into(),
            code,
            details: None,
            hint: None,
        }
    }

    /// Backend code for persistence failures, `None` for everything else.
    pub fn code(&self) -> Option<&str> {
        match self {
            AppError::PersistenceError { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
