//! Token extraction from the configured authorization header.

use crate::config::AuthJwtConfig;
use crate::error::HeaderError;

/// Maximum accepted header value size in bytes (8KB).
///
/// Oversized values are rejected before they are split.
pub const MAX_HEADER_SIZE_BYTES: usize = 8192;

impl AuthJwtConfig {
    /// Extract the raw token from the value of the `header_name` header.
    ///
    /// The value must be exactly `<header_type> <token>`, with the scheme
    /// compared case-sensitively.
    ///
    /// # Errors
    ///
    /// - `HeaderError::Missing` - no header value
    /// - `HeaderError::TooLarge` - value exceeds `MAX_HEADER_SIZE_BYTES`
    /// - `HeaderError::Malformed` - wrong scheme or wrong number of parts
    pub fn token_from_header<'h>(&self, value: Option<&'h str>) -> Result<&'h str, HeaderError> {
        let Some(value) = value else {
            return Err(HeaderError::Missing {
                header_name: self.header_name().to_string(),
            });
        };

        if value.len() > MAX_HEADER_SIZE_BYTES {
            tracing::debug!(
                target: "authjwt.header",
                header_size = value.len(),
                max_size = MAX_HEADER_SIZE_BYTES,
                "Header rejected: size exceeds maximum allowed"
            );
            return Err(HeaderError::TooLarge {
                header_name: self.header_name().to_string(),
            });
        }

        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme == self.header_type() => Ok(token),
            (scheme, _, rest) => {
                tracing::debug!(
                    target: "authjwt.header",
                    scheme_matches = scheme == Some(self.header_type()),
                    extra_parts = rest.is_some(),
                    "Header rejected: unexpected format"
                );
                Err(HeaderError::Malformed {
                    header_name: self.header_name().to_string(),
                    header_type: self.header_type().to_string(),
                })
            }
        }
    }
}
