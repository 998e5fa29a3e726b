//! Token claims and ordered claim validation

use std::sync::Arc;

use hyperwave_types::{TokenType, UserRole};
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

use crate::clock::Clock;
use crate::error::AuthError;

/// Email carried by CSRF tokens, which are not tied to a user
pub const CSRF_EMAIL: &str = "csrf@example.com";

/// Claims of a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl TokenClaims {
    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

/// Claims as decoded from a token, before any validation.
///
/// Unknown fields are ignored. String claims holding a non-string JSON value
/// are kept as their JSON text so that they fail validation rather than
/// decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl From<&TokenClaims> for UnverifiedClaims {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            token_type: Some(claims.token_type.as_str().to_string()),
            role: Some(claims.role.as_str().to_string()),
            email: Some(claims.email.clone()),
            exp: Some(claims.exp),
            iat: Some(claims.iat),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.floor() as i64)
            })
            .map(Some)
            .ok_or_else(|| D::Error::custom("numeric date out of range")),
        Some(_) => Err(D::Error::custom("numeric date must be a number")),
    }
}

/// Email shape check.
///
/// HTML5 email syntax plus a domain ending in an alphabetic TLD of at least
/// two characters.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Which claim rule a payload broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimViolation {
    InvalidType,
    InvalidRole,
    InvalidEmail,
    MissingClaims,
    Expired,
    NotYetValid,
}

impl From<ClaimViolation> for AuthError {
    fn from(violation: ClaimViolation) -> Self {
        match violation {
            ClaimViolation::InvalidType => AuthError::InvalidType,
            ClaimViolation::InvalidRole => AuthError::InvalidRole,
            ClaimViolation::InvalidEmail => AuthError::InvalidEmail,
            ClaimViolation::MissingClaims => AuthError::MissingClaims,
            ClaimViolation::Expired => AuthError::Expired,
            ClaimViolation::NotYetValid => AuthError::NotYetValid,
        }
    }
}

struct ClaimRule {
    check: fn(&UnverifiedClaims, i64) -> bool,
    violation: ClaimViolation,
    message: &'static str,
}

fn has_known_type(claims: &UnverifiedClaims, _now: i64) -> bool {
    claims
        .token_type
        .as_deref()
        .is_some_and(|t| t.parse::<TokenType>().is_ok())
}

fn has_known_role(claims: &UnverifiedClaims, _now: i64) -> bool {
    claims
        .role
        .as_deref()
        .is_some_and(|r| r.parse::<UserRole>().is_ok())
}

fn has_valid_email(claims: &UnverifiedClaims, _now: i64) -> bool {
    let is_csrf = claims.token_type.as_deref() == Some(TokenType::Csrf.as_str());
    claims
        .email
        .as_deref()
        .is_some_and(|email| is_csrf || is_valid_email(email))
}

fn has_times(claims: &UnverifiedClaims, _now: i64) -> bool {
    claims.exp.is_some() && claims.iat.is_some()
}

fn not_expired(claims: &UnverifiedClaims, now: i64) -> bool {
    claims.exp.is_some_and(|exp| exp > now)
}

fn already_issued(claims: &UnverifiedClaims, now: i64) -> bool {
    claims.iat.is_some_and(|iat| iat <= now)
}

/// Evaluated in order; the first failing rule decides the error.
const RULES: &[ClaimRule] = &[
    ClaimRule {
        check: has_known_type,
        violation: ClaimViolation::InvalidType,
        message: "Invalid token type",
    },
    ClaimRule {
        check: has_known_role,
        violation: ClaimViolation::InvalidRole,
        message: "Invalid role",
    },
    ClaimRule {
        check: has_valid_email,
        violation: ClaimViolation::InvalidEmail,
        message: "Invalid email format",
    },
    ClaimRule {
        check: has_times,
        violation: ClaimViolation::MissingClaims,
        message: "Missing required claims",
    },
    ClaimRule {
        check: not_expired,
        violation: ClaimViolation::Expired,
        message: "Token has expired",
    },
    ClaimRule {
        check: already_issued,
        violation: ClaimViolation::NotYetValid,
        message: "Token not yet valid",
    },
];

/// Validates decoded claims against the current time
#[derive(Clone)]
pub struct ClaimValidator {
    clock: Arc<dyn Clock>,
}

impl ClaimValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Check the first failing rule, if any, at `now` (unix seconds)
    pub fn check_at(claims: &UnverifiedClaims, now: i64) -> Result<(), ClaimViolation> {
        match RULES.iter().find(|rule| !(rule.check)(claims, now)) {
            Some(rule) => {
                tracing::debug!(
                    rule = rule.message,
                    token_type = claims.token_type.as_deref().unwrap_or("-"),
                    "Claim validation failed"
                );
                Err(rule.violation)
            }
            None => Ok(()),
        }
    }

    /// Validate a payload
    pub fn validate(&self, claims: &UnverifiedClaims) -> Result<(), AuthError> {
        Self::check_at(claims, self.clock.unix_timestamp()).map_err(AuthError::from)
    }

    /// Validate a payload and convert it into typed claims
    pub fn validate_into(&self, claims: UnverifiedClaims) -> Result<TokenClaims, AuthError> {
        self.validate(&claims)?;

        // The rules above guarantee every field is present and parses
        let token_type = claims
            .token_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .ok_or(AuthError::InvalidType)?;
        let role = claims
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .ok_or(AuthError::InvalidRole)?;
        let (Some(email), Some(exp), Some(iat)) = (claims.email, claims.exp, claims.iat) else {
            return Err(AuthError::MissingClaims);
        };

        Ok(TokenClaims {
            token_type,
            email,
            role,
            exp,
            iat,
        })
    }
}

impl std::fmt::Debug for ClaimValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimValidator").finish_non_exhaustive()
    }
}
