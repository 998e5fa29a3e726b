//! Token purpose and role types

use serde::{Deserialize, Serialize};

/// Purpose a signed token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived API/page access
    Access,
    /// Long-lived token used to mint new access tokens
    Refresh,
    /// Single-use login link
    Magic,
    /// Form submission guard
    Csrf,
}

impl TokenType {
    /// Every token type, in wire order
    pub const ALL: [TokenType; 4] = [Self::Access, Self::Refresh, Self::Magic, Self::Csrf];

    /// Fixed lifetime in seconds. Never taken from a caller.
    pub const fn lifetime_secs(&self) -> i64 {
        match self {
            Self::Access => 15 * 60,
            Self::Magic => 15 * 60,
            Self::Csrf => 60 * 60,
            Self::Refresh => 7 * 24 * 60 * 60,
        }
    }

    /// Wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Magic => "magic",
            Self::Csrf => "csrf",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = TokenTypeParseError;

    // Exact match only: claim values are not normalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            "magic" => Ok(Self::Magic),
            "csrf" => Ok(Self::Csrf),
            _ => Err(TokenTypeParseError(s.to_string())),
        }
    }
}

/// Error parsing a token type string
#[derive(Debug, Clone)]
pub struct TokenTypeParseError(pub String);

impl std::fmt::Display for TokenTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid token type: {}", self.0)
    }
}

impl std::error::Error for TokenTypeParseError {}

/// Role carried in a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Every role
    pub const ALL: [UserRole; 2] = [Self::User, Self::Admin];

    /// Wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(UserRoleParseError(s.to_string())),
        }
    }
}

/// Error parsing a role string
#[derive(Debug, Clone)]
pub struct UserRoleParseError(pub String);

impl std::fmt::Display for UserRoleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid role: {}", self.0)
    }
}

impl std::error::Error for UserRoleParseError {}
