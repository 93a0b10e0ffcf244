//! `jsonwebtoken` inputs derived from a validated configuration.
//!
//! The configuration stores algorithms and keys as strings; this module
//! resolves them into the algorithm, header, key and [`Validation`] values
//! that encode/decode routines hand to `jsonwebtoken`.
//!
//! Key selection follows the algorithm family:
//! - HMAC (`HS*`) signs and verifies with `secret_key`
//! - RSA (`RS*`, `PS*`), EC (`ES*`) and `EdDSA` sign with the `private_key`
//!   PEM and verify with the `public_key` PEM
//!
//! # Usage
//!
//! ```rust,ignore
//! let header = config.encoding_header()?;
//! let token = jsonwebtoken::encode(&header, &claims, &config.encoding_key()?)?;
//!
//! let data = jsonwebtoken::decode::<Claims>(
//!     &token,
//!     &config.decoding_key()?,
//!     &config.validation()?,
//! )?;
//! ```

use crate::config::AuthJwtConfig;
use crate::error::KeyError;
use crate::field::Field;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

fn family(algorithm: Algorithm) -> Family {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Family::Hmac,
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Family::Rsa,
        Algorithm::ES256 | Algorithm::ES384 => Family::Ec,
        Algorithm::EdDSA => Family::Ed,
    }
}

fn parse_algorithm(field: Field, name: &str) -> Result<Algorithm, KeyError> {
    Algorithm::from_str(name).map_err(|_| KeyError::UnsupportedAlgorithm {
        field,
        name: name.to_string(),
    })
}

fn invalid_key(field: Field) -> impl FnOnce(jsonwebtoken::errors::Error) -> KeyError {
    move |e| KeyError::InvalidKey {
        field,
        reason: e.to_string(),
    }
}

impl AuthJwtConfig {
    /// Algorithm used to sign new tokens.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::UnsupportedAlgorithm` if `algorithm` is not a
    /// `jsonwebtoken` algorithm name.
    pub fn signing_algorithm(&self) -> Result<Algorithm, KeyError> {
        parse_algorithm(Field::Algorithm, self.algorithm())
    }

    /// Algorithms accepted when decoding: `decode_algorithms` when set,
    /// otherwise the signing algorithm alone.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::UnsupportedAlgorithm` for an unknown name and
    /// `KeyError::NoAlgorithms` when `decode_algorithms` is an empty list.
    pub fn decoding_algorithms(&self) -> Result<Vec<Algorithm>, KeyError> {
        let Some(names) = self.decode_algorithms() else {
            return Ok(vec![self.signing_algorithm()?]);
        };
        if names.is_empty() {
            return Err(KeyError::NoAlgorithms {
                field: Field::DecodeAlgorithms,
            });
        }
        names
            .iter()
            .map(|name| parse_algorithm(Field::DecodeAlgorithms, name))
            .collect()
    }

    /// Header for new tokens.
    ///
    /// # Errors
    ///
    /// Same as [`AuthJwtConfig::signing_algorithm`].
    pub fn encoding_header(&self) -> Result<Header, KeyError> {
        Ok(Header::new(self.signing_algorithm()?))
    }

    /// Key used to sign new tokens.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAlgorithm` - `algorithm` is unknown
    /// - `MissingKey` - the key the algorithm family needs is not configured
    /// - `InvalidKey` - the private key is not a valid PEM for the family
    pub fn encoding_key(&self) -> Result<EncodingKey, KeyError> {
        let algorithm = self.signing_algorithm()?;
        let key_family = family(algorithm);

        if key_family == Family::Hmac {
            let secret = self.secret_key().ok_or_else(|| KeyError::MissingKey {
                field: Field::SecretKey,
                algorithm: self.algorithm().to_string(),
            })?;
            return Ok(EncodingKey::from_secret(secret.expose_secret().as_bytes()));
        }

        let field = Field::PrivateKey;
        let pem = self
            .private_key()
            .ok_or_else(|| KeyError::MissingKey {
                field,
                algorithm: self.algorithm().to_string(),
            })?
            .expose_secret()
            .as_bytes();

        let key = match key_family {
            Family::Rsa => EncodingKey::from_rsa_pem(pem),
            Family::Ec => EncodingKey::from_ec_pem(pem),
            Family::Ed | Family::Hmac => EncodingKey::from_ed_pem(pem),
        };
        key.map_err(invalid_key(field))
    }

    /// Key used to verify tokens.
    ///
    /// All decoding algorithms must belong to one family, since a single key
    /// verifies them all.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAlgorithm` / `NoAlgorithms` - see
    ///   [`AuthJwtConfig::decoding_algorithms`]
    /// - `MixedAlgorithmFamilies` - decoding algorithms need different keys
    /// - `MissingKey` - the key the family needs is not configured
    /// - `InvalidKey` - the public key is not a valid PEM for the family
    pub fn decoding_key(&self) -> Result<DecodingKey, KeyError> {
        let algorithms = self.decoding_algorithms()?;
        let Some(&primary) = algorithms.first() else {
            return Err(KeyError::NoAlgorithms {
                field: Field::DecodeAlgorithms,
            });
        };
        let primary_family = family(primary);
        if algorithms.iter().any(|alg| family(*alg) != primary_family) {
            return Err(KeyError::MixedAlgorithmFamilies {
                field: Field::DecodeAlgorithms,
            });
        }

        let algorithm_name = || format!("{primary:?}");

        if primary_family == Family::Hmac {
            let secret = self.secret_key().ok_or_else(|| KeyError::MissingKey {
                field: Field::SecretKey,
                algorithm: algorithm_name(),
            })?;
            return Ok(DecodingKey::from_secret(secret.expose_secret().as_bytes()));
        }

        let field = Field::PublicKey;
        let pem = self
            .public_key()
            .ok_or_else(|| KeyError::MissingKey {
                field,
                algorithm: algorithm_name(),
            })?
            .as_bytes();

        let key = match primary_family {
            Family::Rsa => DecodingKey::from_rsa_pem(pem),
            Family::Ec => DecodingKey::from_ec_pem(pem),
            Family::Ed | Family::Hmac => DecodingKey::from_ed_pem(pem),
        };
        key.map_err(invalid_key(field))
    }

    /// Decode-time validation rules.
    ///
    /// - algorithms from [`AuthJwtConfig::decoding_algorithms`]
    /// - leeway from `decode_leeway`, in whole seconds (negative is 0)
    /// - `iss` checked against `decode_issuer` when set
    /// - `aud` checked against `decode_audience` when set, otherwise ignored
    /// - no claim is required: tokens issued with an expiry of `false` carry
    ///   no `exp`, while an `exp` that is present is still enforced
    ///
    /// # Errors
    ///
    /// Same as [`AuthJwtConfig::decoding_algorithms`].
    pub fn validation(&self) -> Result<Validation, KeyError> {
        let algorithms = self.decoding_algorithms()?;

        let mut validation = Validation::default();
        validation.algorithms = algorithms;
        validation.leeway = u64::try_from(self.decode_leeway().num_seconds()).unwrap_or(0);
        validation.required_spec_claims = HashSet::new();

        if let Some(issuer) = self.decode_issuer() {
            validation.set_issuer(&[issuer]);
        }

        match self.decode_audience() {
            Some(audience) => validation.set_audience(audience.values().as_slice()),
            None => validation.validate_aud = false,
        }

        Ok(validation)
    }
}
