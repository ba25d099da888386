//! Error types for DDL generation and catalog operations

use thiserror::Error;

/// Errors that can occur while generating or executing DDL
#[derive(Debug, Error)]
pub enum DdlError {
    /// The description holds something no dialect can express faithfully
    /// (partitioned view, transactional table, unmapped serde configuration).
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// The requested dialect cannot express the table's provider.
    #[error("Dialect mismatch: {0}")]
    DialectMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DdlError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(msg.into())
    }

    pub fn dialect_mismatch(msg: impl Into<String>) -> Self {
        Self::DialectMismatch(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error came from the generator refusing a description
    pub fn is_generation_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedConstruct(_) | Self::DialectMismatch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DdlError>;
