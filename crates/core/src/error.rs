//! Unified error types for the lead engine.
//!
//! Error codes:
//! - VALID_001-003: Validation errors
//! - DB_001-002: Datastore errors
//! - RATE_001: Rate limit errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid JSON / invalid field format
    InvalidFormat,
    /// VALID_002: Submission carries no fields at all
    EmptySubmission,
    /// VALID_003: Form payload exceeds size limit
    PayloadTooLarge,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::EmptySubmission => "VALID_002",
            Self::PayloadTooLarge => "VALID_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Datastore error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// DB_001: Failed to persist the lead (fatal to the operation)
    InsertFailed,
    /// DB_002: Lookup query failed (recoverable at the pipeline layer)
    QueryFailed,
}

impl DbErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsertFailed => "DB_001",
            Self::QueryFailed => "DB_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Rate limit error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitErrorCode {
    /// RATE_001: Rate limit exceeded
    Exceeded,
}

impl RateLimitErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Exceeded => "RATE_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        429
    }
}

/// Unified error type for the lead engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Datastore error with code.
    #[error("[{code}] {message}")]
    Database {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Rate limit error with code.
    #[error("[{code}] {message}")]
    RateLimit {
        code: &'static str,
        message: String,
        http_status: u16,
        retry_after: Option<u64>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a datastore error.
    pub fn database(code: DbErrorCode, msg: impl Into<String>) -> Self {
        Self::Database {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(
        code: RateLimitErrorCode,
        msg: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
            retry_after,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Database { http_status, .. } => *http_status,
            Self::RateLimit { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
            Self::MissingField(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::ValidationWithCode { code, .. } => Some(code),
            Self::Database { code, .. } => Some(code),
            Self::RateLimit { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this error is a recoverable lookup failure.
    ///
    /// The ingestion pipeline degrades to defaults for these instead of
    /// failing the whole submission.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::Database { code, .. } if *code == DbErrorCode::QueryFailed.code())
    }
}
