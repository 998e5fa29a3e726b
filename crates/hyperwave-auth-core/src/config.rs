//! Configuration types for the auth core

use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::key::{SecretSource, ShortSecretPolicy};

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::Invalid("APP_ENV")),
        }
    }
}

/// Auth core configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret
    pub secret: SecretSource,
    /// Handling of secrets shorter than 32 bytes
    pub short_secret_policy: ShortSecretPolicy,
    /// Application name used in outgoing email
    pub app_name: String,
    /// Public base URL magic links point at
    pub host: String,
    /// Sender address for outgoing email
    pub email_from: String,
    pub environment: AppEnvironment,
    /// Resend API key (non-development environments)
    pub resend_api_key: Option<String>,
    /// SQLite database file
    pub database_path: String,
    /// Upper bound on remembered revocations (unbounded if unset)
    pub revocation_capacity: Option<NonZeroUsize>,
}

impl AuthConfig {
    /// Create a config with a fixed secret and defaults for everything else
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretSource::Static(secret.into()),
            short_secret_policy: ShortSecretPolicy::Reject,
            app_name: "hyperwave".to_string(),
            host: "http://localhost:3000".to_string(),
            email_from: "noreply@example.com".to_string(),
            environment: AppEnvironment::Development,
            resend_api_key: None,
            database_path: "app.db".to_string(),
            revocation_capacity: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?;
        let mut config = Self::new(secret);

        if let Ok(app_name) = std::env::var("APP_NAME") {
            config.app_name = app_name;
        }
        if let Ok(host) = std::env::var("HOST") {
            config.host = host;
        }
        if let Ok(email_from) = std::env::var("EMAIL_FROM") {
            config.email_from = email_from;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }

        config.environment = std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;

        config.resend_api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        config.revocation_capacity = std::env::var("REVOCATION_CAPACITY")
            .ok()
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Invalid("REVOCATION_CAPACITY"))?;

        let allow_short: bool = std::env::var("ALLOW_SHORT_SECRET")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("ALLOW_SHORT_SECRET"))?;
        if allow_short {
            config.short_secret_policy = ShortSecretPolicy::PadWithZeros;
        }

        Ok(config)
    }

    /// Public URL of the magic-link verification route
    pub fn verify_url(&self, token: &str) -> String {
        format!("{}/auth/verify?token={}", self.host.trim_end_matches('/'), token)
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_email_from(mut self, email_from: impl Into<String>) -> Self {
        self.email_from = email_from.into();
        self
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_resend_api_key(mut self, key: impl Into<String>) -> Self {
        self.resend_api_key = Some(key.into());
        self
    }

    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Bound remembered revocations. Zero means unbounded.
    pub fn with_revocation_capacity(mut self, capacity: usize) -> Self {
        self.revocation_capacity = NonZeroUsize::new(capacity);
        self
    }

    pub fn with_short_secret_policy(mut self, policy: ShortSecretPolicy) -> Self {
        self.short_secret_policy = policy;
        self
    }

    /// Read the secret from `var` on first use instead of a fixed value
    pub fn with_secret_env(mut self, var: impl Into<String>) -> Self {
        self.secret = SecretSource::Env(var.into());
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret)
            .field("short_secret_policy", &self.short_secret_policy)
            .field("app_name", &self.app_name)
            .field("host", &self.host)
            .field("email_from", &self.email_from)
            .field("environment", &self.environment)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "<redacted>"))
            .field("database_path", &self.database_path)
            .field("revocation_capacity", &self.revocation_capacity)
            .finish()
    }
}

/// Load a `.env` file if one exists. Missing files are not an error.
pub fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new("secret");
        assert_eq!(config.app_name, "hyperwave");
        assert_eq!(config.host, "http://localhost:3000");
        assert_eq!(config.email_from, "noreply@example.com");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.database_path, "app.db");
        assert!(config.revocation_capacity.is_none());
        assert_eq!(config.short_secret_policy, ShortSecretPolicy::Reject);
    }

    #[test]
    fn test_builders() {
        let config = AuthConfig::new("secret")
            .with_host("https://app.example.com/")
            .with_environment(AppEnvironment::Production)
            .with_revocation_capacity(10);

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.revocation_capacity, NonZeroUsize::new(10));
        assert_eq!(
            config.verify_url("abc.def.ghi"),
            "https://app.example.com/auth/verify?token=abc.def.ghi"
        );
    }

    #[test]
    fn test_zero_revocation_capacity_is_unbounded() {
        let config = AuthConfig::new("secret").with_revocation_capacity(0);
        assert!(config.revocation_capacity.is_none());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("test".parse::<AppEnvironment>().unwrap(), AppEnvironment::Test);
        assert!(matches!(
            "staging".parse::<AppEnvironment>(),
            Err(ConfigError::Invalid("APP_ENV"))
        ));
    }

    #[test]
    fn test_load_env_without_file() {
        load_env();
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::new("top-secret-signing-value").with_resend_api_key("re_live_key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("re_live_key"));
    }
}
