//! Auth errors

use thiserror::Error;

/// Authentication errors
///
/// Every variant carries a stable machine-readable code via
/// [`AuthError::error_code`] so callers never match on messages.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token supplied
    #[error("Token is empty")]
    EmptyToken,

    /// Not three non-empty base64url/JSON segments
    #[error("Malformed token")]
    MalformedToken,

    /// HMAC mismatch (tampered header, claims or signature)
    #[error("Token signature verification failed")]
    InvalidSignature,

    /// Token is in the revocation registry
    #[error("Token is blacklisted")]
    Revoked,

    /// `exp` has elapsed
    #[error("Token has expired")]
    Expired,

    /// `iat` is in the future
    #[error("Token not yet valid")]
    NotYetValid,

    /// `type` claim missing or unknown
    #[error("Invalid token type")]
    InvalidType,

    /// `role` claim missing or unknown
    #[error("Invalid role")]
    InvalidRole,

    /// `email` claim missing or not an email address
    #[error("Invalid email format")]
    InvalidEmail,

    /// `exp` or `iat` missing
    #[error("Missing required claims")]
    MissingClaims,

    /// Generation requested for a type outside the fixed set
    #[error("Non-standard token type: {0}")]
    UnsupportedType(String),

    /// Signing key unavailable or misconfigured
    #[error("Failed to generate signing key: {0}")]
    Key(String),

    /// Token is valid but its user no longer exists
    #[error("user not found")]
    UserNotFound,

    /// Magic link not in the store, for another email, expired or already used
    #[error("magic link not found or already used")]
    MagicLinkRejected,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyToken
            | Self::MalformedToken
            | Self::InvalidSignature
            | Self::Revoked
            | Self::Expired
            | Self::NotYetValid
            | Self::InvalidType
            | Self::InvalidRole
            | Self::InvalidEmail
            | Self::MissingClaims
            | Self::UserNotFound
            | Self::MagicLinkRejected => 401,
            Self::UnsupportedType(_) => 400,
            Self::Key(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyToken => "EMPTY_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Revoked => "TOKEN_REVOKED",
            Self::Expired => "TOKEN_EXPIRED",
            Self::NotYetValid => "TOKEN_NOT_YET_VALID",
            Self::InvalidType => "INVALID_TOKEN_TYPE",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::MissingClaims => "MISSING_CLAIMS",
            Self::UnsupportedType(_) => "UNSUPPORTED_TOKEN_TYPE",
            Self::Key(_) => "KEY_ERROR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MagicLinkRejected => "MAGIC_LINK_REJECTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// User-facing reason, suitable for a `?error=` query parameter on the
    /// login page
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Expired => "expired_token",
            Self::Revoked => "token_revoked",
            Self::InvalidSignature
            | Self::NotYetValid
            | Self::InvalidType
            | Self::InvalidRole
            | Self::InvalidEmail
            | Self::MissingClaims => "tampered_token",
            Self::EmptyToken
            | Self::MalformedToken
            | Self::UnsupportedType(_)
            | Self::MagicLinkRejected => "invalid_token",
            Self::UserNotFound => "verification_required",
            Self::Key(_) | Self::Database(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Whether the caller should send the user back through login
    pub fn requires_reauthentication(&self) -> bool {
        self.status_code() == 401
    }
}

impl From<hyperwave_db::DbError> for AuthError {
    fn from(err: hyperwave_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_from_messages() {
        let err = AuthError::Revoked;
        assert_eq!(err.error_code(), "TOKEN_REVOKED");
        assert_eq!(err.to_string(), "Token is blacklisted");
        assert_eq!(err.reason(), "token_revoked");
    }

    #[test]
    fn test_claim_errors_map_to_tampered() {
        for err in [
            AuthError::InvalidType,
            AuthError::InvalidRole,
            AuthError::InvalidEmail,
            AuthError::MissingClaims,
            AuthError::NotYetValid,
            AuthError::InvalidSignature,
        ] {
            assert_eq!(err.reason(), "tampered_token", "{err:?}");
            assert!(err.requires_reauthentication());
        }
        assert_eq!(AuthError::Expired.reason(), "expired_token");
    }

    #[test]
    fn test_server_errors_are_not_reauth() {
        assert_eq!(AuthError::Key("x".into()).status_code(), 500);
        assert!(!AuthError::Database("x".into()).requires_reauthentication());
        assert_eq!(AuthError::UnsupportedType("session".into()).status_code(), 400);
    }
}
