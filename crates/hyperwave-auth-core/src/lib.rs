//! Hyperwave Auth Core - Token authentication business logic
//!
//! Signed HS256 tokens for access, refresh, magic-link and CSRF use,
//! ordered claim validation, token revocation and the magic-link login
//! workflow.
//!
//! # Example
//!
//! ```rust,ignore
//! use hyperwave_auth_core::{AuthConfig, TokenService};
//! use hyperwave_types::{TokenType, UserRole};
//!
//! let service = TokenService::from_config(&AuthConfig::from_env()?);
//! let token = service.generate_token(TokenType::Access, "user@example.com", UserRole::User)?;
//! let claims = service.verify_token(&token)?;
//! ```

pub mod claims;
pub mod clock;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod email;
pub mod error;
pub mod key;
pub mod logging;
pub mod magic;
pub mod revocation;
pub mod service;
pub mod session;

pub use claims::{
    is_valid_email, ClaimValidator, ClaimViolation, TokenClaims, UnverifiedClaims, CSRF_EMAIL,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{Header, ParsedToken, TokenCodec, TokenPayload};
pub use config::{load_env, AppEnvironment, AuthConfig, ConfigError};
pub use crypto::{constant_time_eq, HmacKey, HmacKeyError};
pub use email::{
    provider_for, ConsoleEmailProvider, EmailError, EmailMessage, EmailProvider, EmailReceipt,
    ResendEmailProvider,
};
pub use error::AuthError;
pub use key::{KeyProvider, SecretSource, ShortSecretPolicy};
pub use magic::{MagicLinkOutcome, MagicLinkService};
pub use revocation::RevocationRegistry;
pub use service::{TokenRequest, TokenService};
pub use session::SessionManager;
