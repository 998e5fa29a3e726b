//! Session token types

use serde::{Deserialize, Serialize};

use crate::TokenType;

/// Token pair returned after a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,
    /// Refresh token (long-lived)
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    /// Wrap freshly issued tokens
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in: TokenType::Access.lifetime_secs() as u64,
            token_type: "Bearer".to_string(),
        }
    }
}
