//! Compact HS256 token encoding
//!
//! Token format: `base64url(header).base64url(claims).base64url(signature)`
//! where the signature is HMAC-SHA256 over the first two segments as they
//! appear on the wire. The header's `alg` is informational only; tokens are
//! always verified with HS256.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hyperwave_types::{TokenType, UserRole};
use serde::{Deserialize, Serialize};

use crate::claims::{TokenClaims, UnverifiedClaims};
use crate::error::AuthError;
use crate::key::KeyProvider;

/// The only algorithm this codec signs or verifies with
pub const ALGORITHM: &str = "HS256";

/// Token header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl Header {
    /// `{"alg":"HS256","typ":"JWT"}`
    pub fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// What a caller asks to have signed. Timestamps are always set by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub token_type: TokenType,
    pub email: String,
    pub role: UserRole,
}

impl TokenPayload {
    pub fn new(token_type: TokenType, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            token_type,
            email: email.into(),
            role,
        }
    }
}

/// A token split into its decoded parts
#[derive(Debug, Clone)]
pub struct ParsedToken {
    pub header: Header,
    pub claims: UnverifiedClaims,
    pub signature_valid: bool,
}

/// Signs and parses tokens with the provider's key
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: Arc<KeyProvider>,
}

impl TokenCodec {
    pub fn new(keys: Arc<KeyProvider>) -> Self {
        Self { keys }
    }

    /// Sign `payload` issued at `issued_at` (unix seconds) and valid for
    /// `lifetime_secs`.
    pub fn sign(
        &self,
        payload: &TokenPayload,
        lifetime_secs: i64,
        issued_at: i64,
    ) -> Result<String, AuthError> {
        let key = self.keys.get_key()?;

        let claims = TokenClaims {
            token_type: payload.token_type,
            email: payload.email.clone(),
            role: payload.role,
            exp: issued_at + lifetime_secs,
            iat: issued_at,
        };

        let header = encode_json(&Header::hs256())?;
        let claims = encode_json(&claims)?;
        let signing_input = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(key.sign(signing_input.as_bytes()));

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Decode all three segments and check the signature.
    ///
    /// Fails only when the token cannot be decoded; a bad signature is
    /// reported through [`ParsedToken::signature_valid`].
    pub fn parse(&self, token: &str) -> Result<ParsedToken, AuthError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken);
        };

        if header_b64.is_empty() || claims_b64.is_empty() || signature_b64.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let header: Header = decode_json(header_b64)?;
        let claims: UnverifiedClaims = decode_json(claims_b64)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::MalformedToken)?;

        let key = self.keys.get_key()?;
        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        let signature_valid = key.verify(signing_input.as_bytes(), &signature);

        if !signature_valid {
            tracing::debug!(alg = %header.alg, "Token signature mismatch");
        }

        Ok(ParsedToken {
            header,
            claims,
            signature_valid,
        })
    }

    /// [`parse`](Self::parse), failing with `InvalidSignature` on a mismatch
    pub fn decode_verified(&self, token: &str) -> Result<ParsedToken, AuthError> {
        let parsed = self.parse(token)?;
        if !parsed.signature_valid {
            return Err(AuthError::InvalidSignature);
        }
        Ok(parsed)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    // Both segments must be JSON objects; serde would also accept arrays
    match serde_json::from_slice(&bytes) {
        Ok(object @ serde_json::Value::Object(_)) => {
            serde_json::from_value(object).map_err(|_| AuthError::MalformedToken)
        }
        _ => Err(AuthError::MalformedToken),
    }
}
