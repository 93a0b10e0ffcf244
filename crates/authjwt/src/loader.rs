//! Loading raw configuration from environment variables.
//!
//! Environment values are always strings, so each one is interpreted by the
//! field it belongs to before validation:
//!
//! | Field | Interpretation |
//! |---|---|
//! | `decode_algorithms` | comma-separated list |
//! | `decode_audience` | string, or comma-separated list when it contains a comma |
//! | `blacklist_token_checks` | comma-separated set |
//! | `decode_leeway` | integer when it parses as one |
//! | `*_token_expires` | `true`/`false` (any case) as bool, otherwise integer when it parses as one |
//! | everything else | string |
//!
//! A value that cannot be interpreted is passed through as a string so that
//! validation reports the type mismatch.

use crate::field::{Field, KEY_PREFIX};
use crate::value::{RawConfig, RawValue, SeqKind};
use std::collections::{BTreeMap, HashMap};
use std::env;

impl RawConfig {
    /// Collect `AUTHJWT_*` variables from the process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = env::vars_os()
            .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (Ok(name), Err(_)) => {
                    tracing::trace!(
                        target: "authjwt.loader",
                        name = %name,
                        "Skipping variable with non-Unicode value"
                    );
                    None
                }
                (Err(name), _) => {
                    tracing::trace!(
                        target: "authjwt.loader",
                        name = ?name,
                        "Skipping variable with non-Unicode name"
                    );
                    None
                }
            })
            .collect();
        Self::from_vars(&vars)
    }

    /// Collect `AUTHJWT_*` variables from a map (for testing).
    ///
    /// Variable names are matched case-insensitively. Variables without the
    /// prefix are ignored. When several spellings name the same field, the
    /// exact upper-case `AUTHJWT_*` name wins; otherwise the spelling that
    /// sorts first wins.
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let mut chosen: BTreeMap<Field, (&str, &str)> = BTreeMap::new();
        let mut entries: Vec<(&String, &String)> =
            vars.iter().filter(|(name, _)| has_prefix(name)).collect();
        entries.sort_unstable();

        for (name, value) in entries {
            let Some(field) = Field::from_key(name) else {
                tracing::trace!(
                    target: "authjwt.loader",
                    name = %name,
                    "Ignoring unrecognized variable"
                );
                continue;
            };
            match chosen.get(&field) {
                Some((kept, _)) if *kept == field.key() || name.as_str() != field.key() => {
                    tracing::debug!(
                        target: "authjwt.loader",
                        name = %name,
                        kept = %kept,
                        "Ignoring duplicate spelling of variable"
                    );
                }
                _ => {
                    chosen.insert(field, (name.as_str(), value.as_str()));
                }
            }
        }

        let mut raw = RawConfig::new();
        for (field, (_, value)) in chosen {
            raw.insert(field.name(), interpret(field, value));
        }

        tracing::debug!(
            target: "authjwt.loader",
            fields = raw.len(),
            "Loaded JWT configuration variables"
        );
        raw
    }
}

fn has_prefix(name: &str) -> bool {
    name.get(..KEY_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(KEY_PREFIX))
}

fn interpret(field: Field, value: &str) -> RawValue {
    match field {
        Field::DecodeAlgorithms => RawValue::Seq(SeqKind::List, split(value)),
        Field::DecodeAudience if value.contains(',') => RawValue::Seq(SeqKind::List, split(value)),
        Field::BlacklistTokenChecks => RawValue::Seq(SeqKind::Set, split(value)),
        Field::DecodeLeeway => integer(value),
        Field::AccessTokenExpires | Field::RefreshTokenExpires => {
            let trimmed = value.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                RawValue::Bool(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                RawValue::Bool(false)
            } else {
                integer(value)
            }
        }
        _ => RawValue::Str(value.to_string()),
    }
}

/// Items keep their surrounding whitespace; validation trims them.
fn split(value: &str) -> Vec<RawValue> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(',').map(RawValue::from).collect()
}

fn integer(value: &str) -> RawValue {
    value
        .trim()
        .parse::<i128>()
        .map_or_else(|_| RawValue::Str(value.to_string()), RawValue::Int)
}
