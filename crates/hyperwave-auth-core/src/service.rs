//! Token service - ties together signing, claim validation and revocation

use std::sync::Arc;

use hyperwave_types::{TokenPair, TokenType, UserRole};
use serde::Deserialize;

use crate::{
    claims::{ClaimValidator, TokenClaims, UnverifiedClaims, CSRF_EMAIL},
    clock::{Clock, SystemClock},
    codec::{TokenCodec, TokenPayload},
    config::AuthConfig,
    key::KeyProvider,
    revocation::RevocationRegistry,
    AuthError,
};

/// Shorten a token for log output
pub(crate) fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(20) {
        Some((end, _)) => &token[..end],
        None => token,
    }
}

/// An untrusted generation request, e.g. deserialized from a JSON body.
///
/// Only `type`, `email` and `role` are read; `exp`, `iat` and any other
/// fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "type")]
    pub token_type: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Token service
///
/// Issues and verifies every token type with a fixed lifetime per type.
/// Revocation is checked before the signature, so a revoked token is
/// always reported as revoked.
pub struct TokenService {
    codec: TokenCodec,
    validator: ClaimValidator,
    revocations: Arc<RevocationRegistry>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a new token service
    pub fn new(
        keys: Arc<KeyProvider>,
        revocations: Arc<RevocationRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(keys),
            validator: ClaimValidator::new(Arc::clone(&clock)),
            revocations,
            clock,
        }
    }

    /// Build a service from configuration using the system clock
    pub fn from_config(config: &AuthConfig) -> Self {
        let keys = KeyProvider::new(config.secret.clone(), config.short_secret_policy);
        let revocations = match config.revocation_capacity {
            Some(capacity) => RevocationRegistry::with_capacity(capacity),
            None => RevocationRegistry::new(),
        };
        Self::new(Arc::new(keys), Arc::new(revocations), Arc::new(SystemClock))
    }

    /// Shared revocation registry
    pub fn revocations(&self) -> &Arc<RevocationRegistry> {
        &self.revocations
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Generate a signed token valid for its type's fixed lifetime
    pub fn generate_token(
        &self,
        token_type: TokenType,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let payload = TokenPayload::new(token_type, email, role);
        let token = self
            .codec
            .sign(&payload, token_type.lifetime_secs(), self.clock.unix_timestamp())
            .inspect_err(|e| tracing::error!(error = %e, "Failed to sign token"))?;

        tracing::debug!(token_type = %token_type, "Generated token");
        Ok(token)
    }

    /// Generate a token for a type given by name
    pub fn generate_token_str(
        &self,
        token_type: &str,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let token_type: TokenType = token_type.parse().map_err(|_| {
            tracing::warn!(token_type, "Rejected non-standard token type");
            AuthError::UnsupportedType(token_type.to_string())
        })?;
        self.generate_token(token_type, email, role)
    }

    /// Generate a token from an untrusted request
    pub fn generate_from_request(&self, request: &TokenRequest) -> Result<String, AuthError> {
        self.generate_token_str(&request.token_type, &request.email, request.role)
    }

    /// Generate a token from a raw JSON payload. Caller-supplied `exp` and
    /// `iat` have no effect.
    pub fn generate_from_payload(&self, payload: &serde_json::Value) -> Result<String, AuthError> {
        let request = TokenRequest::deserialize(payload).map_err(|e| {
            tracing::warn!(error = %e, "Rejected token request");
            match payload.get("type").and_then(|t| t.as_str()) {
                Some(t) if t.parse::<TokenType>().is_err() => AuthError::UnsupportedType(t.to_string()),
                _ => AuthError::MissingClaims,
            }
        })?;
        self.generate_from_request(&request)
    }

    /// Generate a CSRF token. These are not tied to a user.
    pub fn generate_csrf_token(&self) -> Result<String, AuthError> {
        self.generate_token(TokenType::Csrf, CSRF_EMAIL, UserRole::User)
    }

    /// Issue an access/refresh pair
    pub fn issue_pair(&self, email: &str, role: UserRole) -> Result<TokenPair, AuthError> {
        let access = self.generate_token(TokenType::Access, email, role)?;
        let refresh = self.generate_token(TokenType::Refresh, email, role)?;
        Ok(TokenPair::new(access, refresh))
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Verify a token's revocation status, signature and claims
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if token.is_empty() {
            tracing::debug!("Empty token");
            return Err(AuthError::EmptyToken);
        }

        if self.revocations.is_revoked(token) {
            tracing::debug!(token = token_prefix(token), "Token is revoked");
            return Err(AuthError::Revoked);
        }

        let parsed = self.codec.decode_verified(token).inspect_err(|e| {
            tracing::debug!(token = token_prefix(token), error = %e, "Token rejected");
        })?;

        self.validator.validate_into(parsed.claims)
    }

    /// Verify a token and require a specific type
    pub fn verify_token_of_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<TokenClaims, AuthError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            tracing::debug!(
                expected = %expected,
                actual = %claims.token_type,
                "Token type mismatch"
            );
            return Err(AuthError::InvalidType);
        }
        Ok(claims)
    }

    /// Run claim validation on an already decoded payload
    pub fn validate_token_payload(&self, claims: &UnverifiedClaims) -> Result<(), AuthError> {
        self.validator.validate(claims)
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Revoke a token for the life of this service's registry
    pub fn blacklist_token(&self, token: &str) {
        self.revocations.revoke(token);
        tracing::debug!(token = token_prefix(token), "Token blacklisted");
    }

    /// Forget every revocation
    pub fn reset_blacklist(&self) {
        self.revocations.reset();
        tracing::info!("Token blacklist reset");
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .field("revoked", &self.revocations.len())
            .finish_non_exhaustive()
    }
}
