//! Common error types for Stockfeed

use thiserror::Error;

/// Common error type used across Stockfeed crates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed or out-of-range input; never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key absent from a registry partition
    #[error("Not found in {store}: {key}")]
    NotFound { store: String, key: String },

    /// Key already present in a registry partition
    #[error("Duplicate key in {store}: {key}")]
    DuplicateKey { store: String, key: String },

    /// Store failure that may succeed on a later attempt
    #[error("Transient store error: {0}")]
    TransientStore(String),

    /// Arithmetic precondition failed in a calculator
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wrong value passed into a typed aggregate
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(store: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            store: store.into(),
            key: key.to_string(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(store: impl Into<String>, key: impl ToString) -> Self {
        Self::DuplicateKey {
            store: store.into(),
            key: key.to_string(),
        }
    }

    /// Create a transient store error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientStore(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Whether a failure of this kind may clear on a later attempt.
    ///
    /// A duplicate key never does; the ingestion pipeline still retries every
    /// persist failure and only logs this as context.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }

    /// Short category name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::TransientStore(_) => "transient_store",
            Self::InvalidInput(_) => "invalid_input",
            Self::TypeMismatch(_) => "type_mismatch",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::not_found("securities", "STK9");
        assert_eq!(err.to_string(), "Not found in securities: STK9");

        let err = Error::duplicate_key("trades", "t-1");
        assert_eq!(err.to_string(), "Duplicate key in trades: t-1");
    }

    #[test]
    fn test_retryable() {
        assert!(Error::transient("busy").is_retryable());
        assert!(!Error::duplicate_key("trades", "t-1").is_retryable());
        assert!(!Error::validation("bad side").is_retryable());
        assert!(!Error::invalid_input("zero price").is_retryable());
    }

    #[test]
    fn test_from_json_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "serialization");
    }
}
