//! Signing key provider
//!
//! Resolves the HMAC secret once and caches the derived key for the life of
//! the provider.

use std::sync::OnceLock;

use crate::crypto::HmacKey;
use crate::error::AuthError;

/// Where the signing secret comes from
#[derive(Clone)]
pub enum SecretSource {
    /// Read from this environment variable on first use
    Env(String),
    /// Secret supplied directly
    Static(String),
}

impl std::fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Static(_) => f.write_str("Static(<redacted>)"),
        }
    }
}

/// What to do with a secret shorter than [`HmacKey::MIN_KEY_LENGTH`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShortSecretPolicy {
    /// Fail key derivation
    #[default]
    Reject,
    /// Right-pad with ASCII `'0'` up to the minimum length
    PadWithZeros,
}

/// Lazily derived, memoized HMAC signing key
#[derive(Debug)]
pub struct KeyProvider {
    source: SecretSource,
    policy: ShortSecretPolicy,
    key: OnceLock<HmacKey>,
}

impl KeyProvider {
    pub fn new(source: SecretSource, policy: ShortSecretPolicy) -> Self {
        Self {
            source,
            policy,
            key: OnceLock::new(),
        }
    }

    /// Provider over a fixed secret with the default policy
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self::new(SecretSource::Static(secret.into()), ShortSecretPolicy::default())
    }

    /// Provider reading `var` on first use with the default policy
    pub fn from_env_var(var: impl Into<String>) -> Self {
        Self::new(SecretSource::Env(var.into()), ShortSecretPolicy::default())
    }

    /// Get the signing key, deriving it on first call.
    ///
    /// A failed derivation is not cached; the next call tries again.
    pub fn get_key(&self) -> Result<&HmacKey, AuthError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }
        let key = self.derive()?;
        Ok(self.key.get_or_init(|| key))
    }

    fn derive(&self) -> Result<HmacKey, AuthError> {
        let secret = match &self.source {
            SecretSource::Env(var) => std::env::var(var).map_err(|_| {
                tracing::error!(var = %var, "Signing secret is not set");
                AuthError::Key(format!("{var} is not set"))
            })?,
            SecretSource::Static(secret) => secret.clone(),
        };

        if secret.is_empty() {
            return Err(AuthError::Key("secret is empty".to_string()));
        }

        let mut bytes = secret.into_bytes();
        if bytes.len() < HmacKey::MIN_KEY_LENGTH {
            match self.policy {
                ShortSecretPolicy::Reject => {
                    return Err(AuthError::Key(format!(
                        "secret must be at least {} bytes, got {}",
                        HmacKey::MIN_KEY_LENGTH,
                        bytes.len()
                    )));
                }
                ShortSecretPolicy::PadWithZeros => {
                    tracing::warn!(
                        length = bytes.len(),
                        minimum = HmacKey::MIN_KEY_LENGTH,
                        "Signing secret is short, padding with zeros"
                    );
                    bytes.resize(HmacKey::MIN_KEY_LENGTH, b'0');
                }
            }
        }

        HmacKey::new(&bytes).map_err(|e| AuthError::Key(e.to_string()))
    }
}
