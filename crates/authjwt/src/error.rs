//! Error types for JWT configuration.

use crate::field::Field;
use thiserror::Error;

/// A configuration value was rejected.
///
/// Validation stops at the first rejected value, so a single error names a
/// single field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The value's shape does not match what the field accepts.
    #[error("The '{field}' must be {expected}")]
    TypeMismatch {
        field: Field,
        expected: &'static str,
    },

    /// The value has an accepted shape but breaks a rule of the field.
    #[error("The '{field}' {reason}")]
    SemanticConstraint { field: Field, reason: &'static str },
}

impl ConfigError {
    pub(crate) fn type_mismatch(field: Field) -> Self {
        Self::TypeMismatch {
            field,
            expected: field.expected(),
        }
    }

    pub(crate) fn constraint(field: Field, reason: &'static str) -> Self {
        Self::SemanticConstraint { field, reason }
    }

    /// Field whose value was rejected.
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            Self::TypeMismatch { field, .. } | Self::SemanticConstraint { field, .. } => *field,
        }
    }
}

/// Result type alias using `ConfigError`
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A validated configuration cannot produce the keys or algorithms a token
/// operation needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The algorithm name is not one `jsonwebtoken` supports.
    #[error("The '{field}' names an unsupported algorithm '{name}'")]
    UnsupportedAlgorithm { field: Field, name: String },

    /// `decode_algorithms` is an empty list.
    #[error("The '{field}' lists no algorithms")]
    NoAlgorithms { field: Field },

    /// Decoding algorithms belong to different families and cannot share a
    /// key.
    #[error("The '{field}' mixes algorithm families")]
    MixedAlgorithmFamilies { field: Field },

    /// The key required by the algorithm family is not configured.
    #[error("The '{field}' is required for algorithm {algorithm}")]
    MissingKey { field: Field, algorithm: String },

    /// The configured key could not be parsed.
    #[error("The '{field}' could not be parsed: {reason}")]
    InvalidKey { field: Field, reason: String },
}

/// Errors extracting a token from an authorization header.
///
/// Messages are generic; the configured header name and type are the only
/// details exposed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The header is absent.
    #[error("Missing {header_name} header")]
    Missing { header_name: String },

    /// The header value is not `<header_type> <token>`.
    #[error("Bad {header_name} header. Expected value '{header_type} <JWT>'")]
    Malformed {
        header_name: String,
        header_type: String,
    },

    /// The header value exceeds the maximum accepted size.
    #[error("The {header_name} header is too large")]
    TooLarge { header_name: String },
}
