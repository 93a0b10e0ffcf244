//! Loading configuration from process environment variables.
//!
//! These tests mutate the process environment and run serially.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use authjwt::{AuthJwtConfig, ConfigError, Field, TokenExpiry, TokenKind};
use serial_test::serial;
use std::collections::{BTreeSet, HashMap};
use std::env;

// ============================================================================
// Helper Functions
// ============================================================================

/// Sets variables for the duration of a test and removes them on drop.
struct EnvGuard {
    names: Vec<String>,
}

impl EnvGuard {
    fn set(pairs: &[(&str, &str)]) -> Self {
        for (name, value) in pairs {
            env::set_var(name, value);
        }
        Self {
            names: pairs.iter().map(|(name, _)| (*name).to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for name in &self.names {
            env::remove_var(name);
        }
    }
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// from_env
// ============================================================================

#[test]
#[serial]
fn test_from_env_reads_prefixed_variables() {
    let _guard = EnvGuard::set(&[
        ("AUTHJWT_SECRET_KEY", "env-secret"),
        ("AUTHJWT_DECODE_LEEWAY", "15"),
        ("AUTHJWT_ACCESS_TOKEN_EXPIRES", "false"),
        ("AUTHJWT_BLACKLIST_ENABLED", "true"),
        ("AUTHJWT_BLACKLIST_TOKEN_CHECKS", "refresh"),
    ]);

    let config = AuthJwtConfig::from_env().expect("environment config is valid");

    assert!(config.secret_key().is_some());
    assert_eq!(config.decode_leeway(), chrono::Duration::seconds(15));
    assert_eq!(config.access_token_expires(), TokenExpiry::Never);
    assert!(config.checks_blacklist(TokenKind::Refresh));
    assert!(!config.checks_blacklist(TokenKind::Access));
}

#[test]
#[serial]
fn test_from_env_rejects_true_expiry() {
    let _guard = EnvGuard::set(&[("AUTHJWT_REFRESH_TOKEN_EXPIRES", "true")]);

    let err = AuthJwtConfig::from_env().unwrap_err();
    assert_eq!(err.field(), Field::RefreshTokenExpires);
    assert!(matches!(err, ConfigError::SemanticConstraint { .. }));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_from_env_skips_non_unicode_variables() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let unrelated = OsStr::from_bytes(b"AUTHJWT_TEST_BINARY");
    let binary_value = OsStr::from_bytes(b"f\xffo");
    let binary_name = OsStr::from_bytes(b"AUTHJWT_\xff");
    env::set_var(unrelated, binary_value);
    env::set_var(binary_name, "value");
    env::set_var("AUTHJWT_HEADER_TYPE", binary_value);
    let _guard = EnvGuard::set(&[("AUTHJWT_HEADER_NAME", "X-Auth")]);

    let result = AuthJwtConfig::from_env();

    env::remove_var(unrelated);
    env::remove_var(binary_name);
    env::remove_var("AUTHJWT_HEADER_TYPE");

    let config = result.expect("non-Unicode variables are skipped");
    assert_eq!(config.header_name(), "X-Auth");
    assert_eq!(config.header_type(), "Bearer");
}

// ============================================================================
// from_vars
// ============================================================================

#[test]
fn test_from_vars_duplicate_spellings_resolve_identically() {
    let env = vars(&[
        ("AUTHJWT_ALGORITHM", "HS256"),
        ("authjwt_algorithm", "HS512"),
    ]);

    for _ in 0..32 {
        let config = AuthJwtConfig::from_vars(&env.clone().into_iter().collect()).unwrap();
        assert_eq!(config.algorithm(), "HS256");
    }
}

#[test]
fn test_from_vars_defaults_when_nothing_set() {
    let config = AuthJwtConfig::from_vars(&vars(&[("HOME", "/root")])).unwrap();
    assert_eq!(config, AuthJwtConfig::default());
}

#[test]
fn test_from_vars_lists() {
    let config = AuthJwtConfig::from_vars(&vars(&[
        ("AUTHJWT_DECODE_ALGORITHMS", "RS256, RS512"),
        ("AUTHJWT_DECODE_AUDIENCE", "web, mobile"),
        ("AUTHJWT_BLACKLIST_TOKEN_CHECKS", "access,refresh,access"),
    ]))
    .unwrap();

    assert_eq!(
        config.decode_algorithms(),
        Some(["RS256".to_string(), "RS512".to_string()].as_slice())
    );
    assert_eq!(
        config.decode_audience().map(authjwt::Audience::values),
        Some(vec!["web", "mobile"])
    );
    assert_eq!(
        config.blacklist_token_checks(),
        &BTreeSet::from([TokenKind::Access, TokenKind::Refresh])
    );
}

#[test]
fn test_from_vars_non_numeric_leeway_is_type_mismatch() {
    let err = AuthJwtConfig::from_vars(&vars(&[("AUTHJWT_DECODE_LEEWAY", "five")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::TypeMismatch {
            field: Field::DecodeLeeway,
            expected: "a duration or integer",
        }
    );
}

#[test]
fn test_from_vars_empty_token_check_item() {
    let err = AuthJwtConfig::from_vars(&vars(&[("AUTHJWT_BLACKLIST_TOKEN_CHECKS", "access,")]))
        .unwrap_err();
    assert_eq!(err.field(), Field::BlacklistTokenChecks);
    assert!(err.to_string().ends_with("must not be empty"));
}
