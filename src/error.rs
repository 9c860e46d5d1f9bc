//! Unified error handling for the medibook crate
//!
//! All fallible operations return [`Error`], which carries a structural
//! [`ErrorKind`] classification. The API layer maps kinds to HTTP statuses;
//! nothing in the crate discriminates errors by inspecting messages or type
//! names.

use thiserror::Error;

pub use crate::store::StoreError;

/// Classification of errors for response mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed required input, bad enum value
    Validation,
    /// Referenced doctor, appointment, slot or user is absent
    NotFound,
    /// The requested slot is already held
    Conflict,
    /// Malformed identifier in a path or reference
    Cast,
    /// Missing or invalid credentials
    Auth,
    /// Unexpected store or internal failure
    Internal,
}

/// Unified error type for the medibook crate
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Entity lookup failed
    #[error("{0}")]
    NotFound(String),

    /// Slot reservation lost to a concurrent booking, or slot already held
    #[error("{0}")]
    Conflict(String),

    /// Identifier could not be parsed
    #[error("{0}")]
    InvalidId(String),

    /// Authentication or authorization failure
    #[error("{0}")]
    Auth(String),

    /// Store-level errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an invalid-identifier error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Structural classification, used by the API layer for status mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidId(_) => ErrorKind::Cast,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::DuplicateKey { .. } => ErrorKind::Conflict,
                StoreError::TransactionAborted(_) => ErrorKind::Internal,
            },
            Self::Json(_) | Self::Config(_) | Self::Other { .. } => ErrorKind::Internal,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
