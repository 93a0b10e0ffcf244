//! JWT configuration validation and normalization.
//!
//! Raw options (from the environment, a settings file, or built in code) are
//! collected into a [`RawConfig`] and validated once into an immutable
//! [`AuthJwtConfig`], which token encode/decode routines then read.
//!
//! ```rust
//! use authjwt::{AuthJwtConfig, ConfigError, Field, RawConfig};
//!
//! let err = AuthJwtConfig::validate(&RawConfig::new().set("blacklist_enabled", "maybe"))
//!     .unwrap_err();
//! assert!(matches!(err, ConfigError::SemanticConstraint { field: Field::BlacklistEnabled, .. }));
//! ```

#![warn(clippy::pedantic)]

/// Module for the field-level rule table
pub mod field;

/// Module for raw, loosely typed configuration input
pub mod value;

/// Module for loading raw configuration from environment variables
pub mod loader;

/// Module for the validated configuration
pub mod config;

/// Module for configuration error types
pub mod error;

/// Module for `jsonwebtoken` algorithm, key and validation adapters
pub mod jwt;

/// Module for authorization header token extraction
pub mod header;

pub use config::{Audience, AuthJwtConfig, TokenExpiry, TokenKind};
pub use error::{ConfigError, HeaderError, KeyError};
pub use field::Field;
pub use value::{RawConfig, RawValue, SeqKind, Shape};
