//! Field-level rule table for the JWT configuration.
//!
//! Every recognized option is a [`Field`]. The table records, per field, the
//! canonical name, the `AUTHJWT_*` key used in error messages and environment
//! loading, the value shapes the field accepts, and the description reported
//! when a value has the wrong shape.
//!
//! Fields are declared in validation order: when several fields are invalid,
//! the one declared first is the one reported.

use crate::value::{SeqKind, Shape};
use std::fmt;

/// Prefix carried by every configuration key in the environment.
pub const KEY_PREFIX: &str = "AUTHJWT_";

const STRING: &[Shape] = &[Shape::Str];

const LIST: &[Shape] = &[Shape::Seq(SeqKind::List)];

const INT_OR_DURATION: &[Shape] = &[Shape::Int, Shape::Duration];

const STRING_OR_SEQUENCE: &[Shape] = &[
    Shape::Str,
    Shape::Seq(SeqKind::List),
    Shape::Seq(SeqKind::Tuple),
    Shape::Seq(SeqKind::Set),
    Shape::Seq(SeqKind::FrozenSet),
    Shape::Seq(SeqKind::Iter),
];

const SEQUENCE: &[Shape] = &[
    Shape::Seq(SeqKind::List),
    Shape::Seq(SeqKind::Tuple),
    Shape::Seq(SeqKind::Set),
    Shape::Seq(SeqKind::FrozenSet),
    Shape::Seq(SeqKind::Iter),
];

const EXPIRY: &[Shape] = &[Shape::Bool, Shape::Int, Shape::Duration];

/// A recognized configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    SecretKey,
    PublicKey,
    PrivateKey,
    Algorithm,
    DecodeAlgorithms,
    DecodeLeeway,
    EncodeIssuer,
    DecodeIssuer,
    DecodeAudience,
    BlacklistEnabled,
    BlacklistTokenChecks,
    HeaderName,
    HeaderType,
    AccessTokenExpires,
    RefreshTokenExpires,
}

impl Field {
    /// All fields, in declaration (and validation) order.
    pub const ALL: [Field; 15] = [
        Field::SecretKey,
        Field::PublicKey,
        Field::PrivateKey,
        Field::Algorithm,
        Field::DecodeAlgorithms,
        Field::DecodeLeeway,
        Field::EncodeIssuer,
        Field::DecodeIssuer,
        Field::DecodeAudience,
        Field::BlacklistEnabled,
        Field::BlacklistTokenChecks,
        Field::HeaderName,
        Field::HeaderType,
        Field::AccessTokenExpires,
        Field::RefreshTokenExpires,
    ];

    /// Canonical snake-case name, e.g. `access_token_expires`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::SecretKey => "secret_key",
            Field::PublicKey => "public_key",
            Field::PrivateKey => "private_key",
            Field::Algorithm => "algorithm",
            Field::DecodeAlgorithms => "decode_algorithms",
            Field::DecodeLeeway => "decode_leeway",
            Field::EncodeIssuer => "encode_issuer",
            Field::DecodeIssuer => "decode_issuer",
            Field::DecodeAudience => "decode_audience",
            Field::BlacklistEnabled => "blacklist_enabled",
            Field::BlacklistTokenChecks => "blacklist_token_checks",
            Field::HeaderName => "header_name",
            Field::HeaderType => "header_type",
            Field::AccessTokenExpires => "access_token_expires",
            Field::RefreshTokenExpires => "refresh_token_expires",
        }
    }

    /// Environment key, e.g. `AUTHJWT_ACCESS_TOKEN_EXPIRES`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Field::SecretKey => "AUTHJWT_SECRET_KEY",
            Field::PublicKey => "AUTHJWT_PUBLIC_KEY",
            Field::PrivateKey => "AUTHJWT_PRIVATE_KEY",
            Field::Algorithm => "AUTHJWT_ALGORITHM",
            Field::DecodeAlgorithms => "AUTHJWT_DECODE_ALGORITHMS",
            Field::DecodeLeeway => "AUTHJWT_DECODE_LEEWAY",
            Field::EncodeIssuer => "AUTHJWT_ENCODE_ISSUER",
            Field::DecodeIssuer => "AUTHJWT_DECODE_ISSUER",
            Field::DecodeAudience => "AUTHJWT_DECODE_AUDIENCE",
            Field::BlacklistEnabled => "AUTHJWT_BLACKLIST_ENABLED",
            Field::BlacklistTokenChecks => "AUTHJWT_BLACKLIST_TOKEN_CHECKS",
            Field::HeaderName => "AUTHJWT_HEADER_NAME",
            Field::HeaderType => "AUTHJWT_HEADER_TYPE",
            Field::AccessTokenExpires => "AUTHJWT_ACCESS_TOKEN_EXPIRES",
            Field::RefreshTokenExpires => "AUTHJWT_REFRESH_TOKEN_EXPIRES",
        }
    }

    /// Value shapes this field accepts.
    #[must_use]
    pub const fn accepts(self) -> &'static [Shape] {
        match self {
            Field::SecretKey
            | Field::PublicKey
            | Field::PrivateKey
            | Field::Algorithm
            | Field::EncodeIssuer
            | Field::DecodeIssuer
            | Field::BlacklistEnabled
            | Field::HeaderName
            | Field::HeaderType => STRING,
            Field::DecodeAlgorithms => LIST,
            Field::DecodeLeeway => INT_OR_DURATION,
            Field::DecodeAudience => STRING_OR_SEQUENCE,
            Field::BlacklistTokenChecks => SEQUENCE,
            Field::AccessTokenExpires | Field::RefreshTokenExpires => EXPIRY,
        }
    }

    /// Description of the accepted type, as reported in a type mismatch.
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Field::DecodeAlgorithms => "a list",
            Field::DecodeLeeway => "a duration or integer",
            Field::DecodeAudience => "a string or sequence",
            Field::BlacklistTokenChecks => "a sequence",
            Field::AccessTokenExpires | Field::RefreshTokenExpires => {
                "a duration, integer or bool"
            }
            _ => "a string",
        }
    }

    /// Whether a value of `shape` is structurally valid for this field.
    #[must_use]
    pub fn accepts_shape(self, shape: Shape) -> bool {
        self.accepts().contains(&shape)
    }

    /// Resolve a configuration key to a field.
    ///
    /// Matching is case-insensitive and the `AUTHJWT_` prefix is optional, so
    /// `AUTHJWT_ALGORITHM`, `authjwt_algorithm` and `algorithm` all resolve to
    /// [`Field::Algorithm`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim().to_ascii_lowercase();
        let name = key
            .strip_prefix(&KEY_PREFIX.to_ascii_lowercase())
            .unwrap_or(&key);

        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
