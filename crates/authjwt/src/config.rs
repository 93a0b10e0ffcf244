//! Validated JWT configuration.
//!
//! [`AuthJwtConfig::validate`] turns a [`RawConfig`] into an immutable
//! configuration with every default filled in. Validation runs in two phases,
//! each walking the fields in declaration order:
//!
//! 1. Whole-object phase: shape of every supplied value, trimming and
//!    emptiness of scalar strings, and field rules (`blacklist_enabled`
//!    literals, expiry `true`).
//! 2. Per-item phase: every element of `decode_algorithms`,
//!    `decode_audience` and `blacklist_token_checks`.
//!
//! The first violated rule is returned and nothing else is built.
//!
//! # Example
//!
//! ```rust
//! use authjwt::{AuthJwtConfig, RawConfig, TokenExpiry};
//!
//! let raw = RawConfig::new()
//!     .set("secret_key", "abc123")
//!     .set("access_token_expires", false);
//!
//! let config = AuthJwtConfig::validate(&raw).unwrap();
//! assert_eq!(config.algorithm(), "HS256");
//! assert_eq!(config.access_token_expires(), TokenExpiry::Never);
//! ```

use crate::error::{ConfigError, Result};
use crate::field::Field;
use crate::value::{RawConfig, RawValue};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Default signing algorithm.
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Default name of the header carrying the token.
pub const DEFAULT_HEADER_NAME: &str = "Authorization";

/// Default scheme preceding the token in the header.
pub const DEFAULT_HEADER_TYPE: &str = "Bearer";

/// Default access token lifetime in seconds (15 minutes).
pub const DEFAULT_ACCESS_TOKEN_EXPIRES_SECONDS: i64 = 15 * 60;

/// Default refresh token lifetime in seconds (30 days).
pub const DEFAULT_REFRESH_TOKEN_EXPIRES_SECONDS: i64 = 30 * 24 * 60 * 60;

const EMPTY: &str = "must not be empty";
const OUT_OF_RANGE: &str = "is out of range";
const BLACKLIST_LITERAL: &str = "must be either 'true' or 'false'";
const EXPIRY_TRUE: &str = "only accepts the value false";
const TOKEN_KIND: &str = "must be either 'access' or 'refresh'";
const STRING_ITEMS: &str = "a sequence of strings";

// =============================================================================
// Normalized value types
// =============================================================================

/// Kind of token a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// Parse the literal name of a token kind. Matching is exact.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TokenKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifetime of an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExpiry {
    /// Tokens carry no `exp` claim.
    Never,
    /// Tokens expire this long after they are issued.
    After(chrono::Duration),
}

impl TokenExpiry {
    /// Lifetime, or `None` for tokens that never expire.
    #[must_use]
    pub fn duration(self) -> Option<chrono::Duration> {
        match self {
            TokenExpiry::Never => None,
            TokenExpiry::After(duration) => Some(duration),
        }
    }

    #[must_use]
    pub fn is_never(self) -> bool {
        matches!(self, TokenExpiry::Never)
    }

    /// `exp` claim (Unix epoch seconds) for a token issued at `issued_at`.
    ///
    /// Returns `None` for tokens that never expire. Timestamps past the end
    /// of chrono's range saturate.
    #[must_use]
    pub fn expires_at(self, issued_at: DateTime<Utc>) -> Option<i64> {
        let duration = self.duration()?;
        let expires = match issued_at.checked_add_signed(duration) {
            Some(at) => at.timestamp(),
            None if duration < chrono::Duration::zero() => i64::MIN,
            None => i64::MAX,
        };
        Some(expires)
    }
}

/// Expected `aud` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    /// All accepted audience values.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Audience::Single(aud) => vec![aud.as_str()],
            Audience::Many(auds) => auds.iter().map(String::as_str).collect(),
        }
    }
}

fn default_access_token_expires() -> TokenExpiry {
    TokenExpiry::After(chrono::Duration::seconds(
        DEFAULT_ACCESS_TOKEN_EXPIRES_SECONDS,
    ))
}

fn default_refresh_token_expires() -> TokenExpiry {
    TokenExpiry::After(chrono::Duration::seconds(
        DEFAULT_REFRESH_TOKEN_EXPIRES_SECONDS,
    ))
}

fn default_blacklist_token_checks() -> BTreeSet<TokenKind> {
    TokenKind::ALL.into_iter().collect()
}

// =============================================================================
// Configuration
// =============================================================================

/// Validated, immutable JWT configuration.
///
/// Secret and private keys are redacted in Debug output. Instances are
/// `Send + Sync` and are shared read-only; reconfiguring means validating a
/// new instance.
#[derive(Clone)]
pub struct AuthJwtConfig {
    /// HMAC signing secret (default: none).
    secret_key: Option<SecretString>,

    /// PEM public key for asymmetric verification (default: none).
    public_key: Option<String>,

    /// PEM private key for asymmetric signing (default: none).
    private_key: Option<SecretString>,

    /// Signing algorithm name (default: "HS256").
    algorithm: String,

    /// Algorithms accepted on decode, in order (default: none, meaning the
    /// signing algorithm).
    decode_algorithms: Option<Vec<String>>,

    /// Clock skew tolerance on decode (default: zero).
    decode_leeway: chrono::Duration,

    /// `iss` claim written on encode (default: none).
    encode_issuer: Option<String>,

    /// `iss` claim required on decode (default: none).
    decode_issuer: Option<String>,

    /// `aud` claim required on decode (default: none).
    decode_audience: Option<Audience>,

    /// Blacklist switch as supplied (default: none, meaning disabled).
    blacklist_enabled: Option<bool>,

    /// Token kinds looked up in the blacklist (default: access and refresh).
    blacklist_token_checks: BTreeSet<TokenKind>,

    /// Header carrying the token (default: "Authorization").
    header_name: String,

    /// Scheme preceding the token in the header (default: "Bearer").
    header_type: String,

    /// Access token lifetime (default: 15 minutes).
    access_token_expires: TokenExpiry,

    /// Refresh token lifetime (default: 30 days).
    refresh_token_expires: TokenExpiry,
}

impl AuthJwtConfig {
    /// Validate and normalize a raw option map.
    ///
    /// # Errors
    ///
    /// Returns the first rule violated, in field declaration order:
    /// - `ConfigError::TypeMismatch` - a value (or collection item) has a
    ///   shape the field does not accept
    /// - `ConfigError::SemanticConstraint` - empty string after trimming,
    ///   `blacklist_enabled` other than "true"/"false", an expiry of `true`,
    ///   a token check other than "access"/"refresh", or a duration outside
    ///   chrono's range
    pub fn validate(raw: &RawConfig) -> Result<Self> {
        // Whole-object phase
        let secret_key = string(raw, Field::SecretKey)?;
        let public_key = string(raw, Field::PublicKey)?;
        let private_key = string(raw, Field::PrivateKey)?;
        let algorithm = string(raw, Field::Algorithm)?;
        let decode_algorithms = sequence(raw, Field::DecodeAlgorithms)?;
        let decode_leeway = match shaped(raw, Field::DecodeLeeway)? {
            Some(value) => duration(Field::DecodeLeeway, value)?,
            None => chrono::Duration::zero(),
        };
        let encode_issuer = string(raw, Field::EncodeIssuer)?;
        let decode_issuer = string(raw, Field::DecodeIssuer)?;
        let decode_audience = audience(raw)?;
        let blacklist_enabled = blacklist_flag(raw)?;
        let blacklist_token_checks = sequence(raw, Field::BlacklistTokenChecks)?;
        let header_name = string(raw, Field::HeaderName)?;
        let header_type = string(raw, Field::HeaderType)?;
        let access_token_expires = expiry(raw, Field::AccessTokenExpires)?;
        let refresh_token_expires = expiry(raw, Field::RefreshTokenExpires)?;

        // Per-item phase
        let decode_algorithms = decode_algorithms
            .map(|items| string_items(Field::DecodeAlgorithms, items))
            .transpose()?;
        let decode_audience = match decode_audience {
            Some(AudienceInput::Single(aud)) => Some(Audience::Single(aud)),
            Some(AudienceInput::Items(items)) => Some(Audience::Many(string_items(
                Field::DecodeAudience,
                items,
            )?)),
            None => None,
        };
        let blacklist_token_checks = match blacklist_token_checks {
            Some(items) => token_kinds(items)?,
            None => default_blacklist_token_checks(),
        };

        let config = Self {
            secret_key: secret_key.map(SecretString::from),
            public_key,
            private_key: private_key.map(SecretString::from),
            algorithm: algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string()),
            decode_algorithms,
            decode_leeway,
            encode_issuer,
            decode_issuer,
            decode_audience,
            blacklist_enabled,
            blacklist_token_checks,
            header_name: header_name.unwrap_or_else(|| DEFAULT_HEADER_NAME.to_string()),
            header_type: header_type.unwrap_or_else(|| DEFAULT_HEADER_TYPE.to_string()),
            access_token_expires: access_token_expires
                .unwrap_or_else(default_access_token_expires),
            refresh_token_expires: refresh_token_expires
                .unwrap_or_else(default_refresh_token_expires),
        };

        tracing::debug!(
            target: "authjwt.config",
            algorithm = %config.algorithm,
            has_secret_key = config.secret_key.is_some(),
            has_public_key = config.public_key.is_some(),
            has_private_key = config.private_key.is_some(),
            decode_leeway_seconds = config.decode_leeway.num_seconds(),
            blacklist_enabled = ?config.blacklist_enabled,
            header_name = %config.header_name,
            access_token_expires = ?config.access_token_expires,
            refresh_token_expires = ?config.refresh_token_expires,
            "JWT configuration validated"
        );

        Ok(config)
    }

    /// Load configuration from `AUTHJWT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`AuthJwtConfig::validate`].
    pub fn from_env() -> Result<Self> {
        Self::validate(&RawConfig::from_env())
    }

    /// Load configuration from a map of environment-style variables.
    ///
    /// # Errors
    ///
    /// Same as [`AuthJwtConfig::validate`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Self::validate(&RawConfig::from_vars(vars))
    }

    /// HMAC signing secret, used by `HS*` algorithms. Unset by default.
    #[must_use]
    pub fn secret_key(&self) -> Option<&SecretString> {
        self.secret_key.as_ref()
    }

    /// PEM public key that verifies `RS*`, `PS*`, `ES*` and `EdDSA` tokens.
    /// Unset by default.
    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// PEM private key that signs asymmetric tokens. Unset by default.
    #[must_use]
    pub fn private_key(&self) -> Option<&SecretString> {
        self.private_key.as_ref()
    }

    /// Algorithm used to sign new tokens. Defaults to [`DEFAULT_ALGORITHM`].
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Algorithms accepted on decode, in the order given. `None` (the
    /// default) means only [`AuthJwtConfig::algorithm`] is accepted.
    #[must_use]
    pub fn decode_algorithms(&self) -> Option<&[String]> {
        self.decode_algorithms.as_deref()
    }

    /// Clock skew tolerated when checking `exp` and `nbf`. Defaults to zero.
    #[must_use]
    pub fn decode_leeway(&self) -> chrono::Duration {
        self.decode_leeway
    }

    /// `iss` claim written into new tokens. Unset by default.
    #[must_use]
    pub fn encode_issuer(&self) -> Option<&str> {
        self.encode_issuer.as_deref()
    }

    /// `iss` claim a decoded token must carry. Unset by default, and then
    /// the issuer is not checked.
    #[must_use]
    pub fn decode_issuer(&self) -> Option<&str> {
        self.decode_issuer.as_deref()
    }

    /// `aud` values a decoded token must match. Unset by default, and then
    /// the audience is not checked.
    #[must_use]
    pub fn decode_audience(&self) -> Option<&Audience> {
        self.decode_audience.as_ref()
    }

    /// The `blacklist_enabled` flag as supplied; `None` when unset.
    #[must_use]
    pub fn blacklist_enabled(&self) -> Option<bool> {
        self.blacklist_enabled
    }

    /// Whether the blacklist is consulted at all. Unset means disabled.
    #[must_use]
    pub fn is_blacklist_enabled(&self) -> bool {
        self.blacklist_enabled.unwrap_or(false)
    }

    /// Token kinds looked up in the blacklist when it is enabled. Defaults to
    /// both access and refresh tokens.
    #[must_use]
    pub fn blacklist_token_checks(&self) -> &BTreeSet<TokenKind> {
        &self.blacklist_token_checks
    }

    /// Whether tokens of `kind` must be looked up in the blacklist on decode.
    #[must_use]
    pub fn checks_blacklist(&self, kind: TokenKind) -> bool {
        self.is_blacklist_enabled() && self.blacklist_token_checks.contains(&kind)
    }

    /// Header that carries the token. Defaults to [`DEFAULT_HEADER_NAME`].
    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Scheme that precedes the token in the header. Defaults to
    /// [`DEFAULT_HEADER_TYPE`].
    #[must_use]
    pub fn header_type(&self) -> &str {
        &self.header_type
    }

    /// Access token lifetime. Defaults to 15 minutes.
    #[must_use]
    pub fn access_token_expires(&self) -> TokenExpiry {
        self.access_token_expires
    }

    /// Refresh token lifetime. Defaults to 30 days.
    #[must_use]
    pub fn refresh_token_expires(&self) -> TokenExpiry {
        self.refresh_token_expires
    }

    /// Lifetime of tokens of `kind`.
    #[must_use]
    pub fn expires_for(&self, kind: TokenKind) -> TokenExpiry {
        match kind {
            TokenKind::Access => self.access_token_expires,
            TokenKind::Refresh => self.refresh_token_expires,
        }
    }
}

impl Default for AuthJwtConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            public_key: None,
            private_key: None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            decode_algorithms: None,
            decode_leeway: chrono::Duration::zero(),
            encode_issuer: None,
            decode_issuer: None,
            decode_audience: None,
            blacklist_enabled: None,
            blacklist_token_checks: default_blacklist_token_checks(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            header_type: DEFAULT_HEADER_TYPE.to_string(),
            access_token_expires: default_access_token_expires(),
            refresh_token_expires: default_refresh_token_expires(),
        }
    }
}

/// Secrets compare by value.
impl PartialEq for AuthJwtConfig {
    fn eq(&self, other: &Self) -> bool {
        same_secret(self.secret_key.as_ref(), other.secret_key.as_ref())
            && same_secret(self.private_key.as_ref(), other.private_key.as_ref())
            && self.public_key == other.public_key
            && self.algorithm == other.algorithm
            && self.decode_algorithms == other.decode_algorithms
            && self.decode_leeway == other.decode_leeway
            && self.encode_issuer == other.encode_issuer
            && self.decode_issuer == other.decode_issuer
            && self.decode_audience == other.decode_audience
            && self.blacklist_enabled == other.blacklist_enabled
            && self.blacklist_token_checks == other.blacklist_token_checks
            && self.header_name == other.header_name
            && self.header_type == other.header_type
            && self.access_token_expires == other.access_token_expires
            && self.refresh_token_expires == other.refresh_token_expires
    }
}

impl Eq for AuthJwtConfig {}

fn same_secret(a: Option<&SecretString>, b: Option<&SecretString>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
        (None, None) => true,
        _ => false,
    }
}

/// Custom Debug implementation that redacts key material.
impl fmt::Debug for AuthJwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthJwtConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("algorithm", &self.algorithm)
            .field("decode_algorithms", &self.decode_algorithms)
            .field("decode_leeway", &self.decode_leeway)
            .field("encode_issuer", &self.encode_issuer)
            .field("decode_issuer", &self.decode_issuer)
            .field("decode_audience", &self.decode_audience)
            .field("blacklist_enabled", &self.blacklist_enabled)
            .field("blacklist_token_checks", &self.blacklist_token_checks)
            .field("header_name", &self.header_name)
            .field("header_type", &self.header_type)
            .field("access_token_expires", &self.access_token_expires)
            .field("refresh_token_expires", &self.refresh_token_expires)
            .finish()
    }
}

// =============================================================================
// Field rules
// =============================================================================

/// Supplied value for `field`, after the shape check.
fn shaped(raw: &RawConfig, field: Field) -> Result<Option<&RawValue>> {
    match raw.get(field) {
        None => Ok(None),
        Some(value) if field.accepts_shape(value.shape()) => Ok(Some(value)),
        Some(_) => Err(ConfigError::type_mismatch(field)),
    }
}

fn trimmed(field: Field, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::constraint(field, EMPTY));
    }
    Ok(value.to_string())
}

fn string(raw: &RawConfig, field: Field) -> Result<Option<String>> {
    match shaped(raw, field)? {
        None => Ok(None),
        Some(RawValue::Str(value)) => trimmed(field, value).map(Some),
        Some(_) => Err(ConfigError::type_mismatch(field)),
    }
}

fn sequence(raw: &RawConfig, field: Field) -> Result<Option<&[RawValue]>> {
    match shaped(raw, field)? {
        None => Ok(None),
        Some(RawValue::Seq(_, items)) => Ok(Some(items.as_slice())),
        Some(_) => Err(ConfigError::type_mismatch(field)),
    }
}

/// Integers are seconds.
fn duration(field: Field, value: &RawValue) -> Result<chrono::Duration> {
    let out_of_range = || ConfigError::constraint(field, OUT_OF_RANGE);
    match value {
        RawValue::Int(seconds) => i64::try_from(*seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(out_of_range),
        RawValue::Duration(duration) => Ok(*duration),
        RawValue::StdDuration(duration) => {
            chrono::Duration::from_std(*duration).map_err(|_| out_of_range())
        }
        _ => Err(ConfigError::type_mismatch(field)),
    }
}

enum AudienceInput<'a> {
    Single(String),
    Items(&'a [RawValue]),
}

fn audience(raw: &RawConfig) -> Result<Option<AudienceInput<'_>>> {
    let field = Field::DecodeAudience;
    match shaped(raw, field)? {
        None => Ok(None),
        Some(RawValue::Str(aud)) => {
            trimmed(field, aud).map(|aud| Some(AudienceInput::Single(aud)))
        }
        Some(RawValue::Seq(_, items)) => Ok(Some(AudienceInput::Items(items))),
        Some(_) => Err(ConfigError::type_mismatch(field)),
    }
}

fn blacklist_flag(raw: &RawConfig) -> Result<Option<bool>> {
    let field = Field::BlacklistEnabled;
    match string(raw, field)?.as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(ConfigError::constraint(field, BLACKLIST_LITERAL)),
    }
}

/// `false` disables expiry; `true` is never valid.
fn expiry(raw: &RawConfig, field: Field) -> Result<Option<TokenExpiry>> {
    match shaped(raw, field)? {
        None => Ok(None),
        Some(RawValue::Bool(false)) => Ok(Some(TokenExpiry::Never)),
        Some(RawValue::Bool(true)) => Err(ConfigError::constraint(field, EXPIRY_TRUE)),
        Some(value) => duration(field, value).map(|d| Some(TokenExpiry::After(d))),
    }
}

fn string_items(field: Field, items: &[RawValue]) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            RawValue::Str(value) => trimmed(field, value),
            _ => Err(ConfigError::TypeMismatch {
                field,
                expected: STRING_ITEMS,
            }),
        })
        .collect()
}

fn token_kinds(items: &[RawValue]) -> Result<BTreeSet<TokenKind>> {
    let field = Field::BlacklistTokenChecks;
    string_items(field, items)?
        .iter()
        .map(|name| {
            TokenKind::from_name(name).ok_or_else(|| ConfigError::constraint(field, TOKEN_KIND))
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
