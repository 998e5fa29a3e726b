//! Loading configuration from the process environment
//!
//! Kept in its own test binary: it mutates process-wide environment
//! variables.

use hyperwave_auth_core::{AppEnvironment, AuthConfig, ConfigError, ShortSecretPolicy};

#[test]
fn test_from_env() {
    std::env::remove_var("SECRET_KEY");
    assert!(matches!(
        AuthConfig::from_env(),
        Err(ConfigError::Missing("SECRET_KEY"))
    ));

    std::env::set_var("SECRET_KEY", "short");
    std::env::set_var("APP_NAME", "Hyperwave Test");
    std::env::set_var("HOST", "https://auth.example.com");
    std::env::set_var("APP_ENV", "production");
    std::env::set_var("RESEND_API_KEY", "re_abcdefghijkl");
    std::env::set_var("REVOCATION_CAPACITY", "1000");
    std::env::set_var("ALLOW_SHORT_SECRET", "true");

    let config = AuthConfig::from_env().unwrap();
    assert_eq!(config.app_name, "Hyperwave Test");
    assert_eq!(config.host, "https://auth.example.com");
    assert_eq!(config.email_from, "noreply@example.com");
    assert_eq!(config.environment, AppEnvironment::Production);
    assert_eq!(config.resend_api_key.as_deref(), Some("re_abcdefghijkl"));
    assert_eq!(config.revocation_capacity.map(|c| c.get()), Some(1000));
    assert_eq!(config.short_secret_policy, ShortSecretPolicy::PadWithZeros);

    std::env::set_var("REVOCATION_CAPACITY", "lots");
    assert!(matches!(
        AuthConfig::from_env(),
        Err(ConfigError::Invalid("REVOCATION_CAPACITY"))
    ));

    std::env::set_var("REVOCATION_CAPACITY", "0");
    assert!(matches!(
        AuthConfig::from_env(),
        Err(ConfigError::Invalid("REVOCATION_CAPACITY"))
    ));

    std::env::set_var("REVOCATION_CAPACITY", "10");
    std::env::set_var("APP_ENV", "staging");
    assert!(matches!(
        AuthConfig::from_env(),
        Err(ConfigError::Invalid("APP_ENV"))
    ));
}
