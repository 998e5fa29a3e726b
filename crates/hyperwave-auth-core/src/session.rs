//! Session management
//!
//! Authenticates requests carrying access tokens, mints new access tokens
//! from refresh tokens and revokes both on logout.

use std::sync::Arc;

use hyperwave_db::UserRepository;
use hyperwave_types::TokenType;
use tracing::{debug, instrument};

use crate::{
    claims::TokenClaims,
    service::{token_prefix, TokenService},
    AuthError,
};

/// Session manager
pub struct SessionManager<U: UserRepository> {
    tokens: Arc<TokenService>,
    users: Arc<U>,
}

impl<U: UserRepository> SessionManager<U> {
    /// Create a new session manager
    pub fn new(tokens: Arc<TokenService>, users: Arc<U>) -> Self {
        Self { tokens, users }
    }

    /// Verify an access token and check its user still exists
    #[instrument(skip(self, access_token), fields(token = token_prefix(access_token)))]
    pub async fn authenticate(&self, access_token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self
            .tokens
            .verify_token_of_type(access_token, TokenType::Access)?;
        self.require_user(&claims.email).await?;
        Ok(claims)
    }

    /// Issue a new access token from a refresh token
    #[instrument(skip(self, refresh_token), fields(token = token_prefix(refresh_token)))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .tokens
            .verify_token_of_type(refresh_token, TokenType::Refresh)?;
        self.require_user(&claims.email).await?;

        let access = self
            .tokens
            .generate_token(TokenType::Access, &claims.email, claims.role)?;
        debug!("Access token refreshed");
        Ok(access)
    }

    /// Revoke whichever tokens the client still holds
    pub fn logout(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        for token in [access_token, refresh_token].into_iter().flatten() {
            if !token.is_empty() {
                self.tokens.blacklist_token(token);
            }
        }
    }

    /// Verify a CSRF token
    pub fn verify_csrf(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.verify_token_of_type(token, TokenType::Csrf)?;
        Ok(())
    }

    async fn require_user(&self, email: &str) -> Result<(), AuthError> {
        match self.users.find_by_email(email).await? {
            Some(_) => Ok(()),
            None => {
                debug!("Token belongs to a deleted user");
                Err(AuthError::UserNotFound)
            }
        }
    }
}
