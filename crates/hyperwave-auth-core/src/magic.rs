//! Magic-link login workflow
//!
//! A magic link is a `magic` token that is also recorded in the token store.
//! The store record makes the link single use: a successful validation
//! atomically deletes it.

use std::sync::Arc;

use hyperwave_db::{TokenRepository, UserRepository};
use hyperwave_types::{TokenPair, TokenType, UserRole};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    claims::is_valid_email,
    config::AuthConfig,
    email::{EmailMessage, EmailProvider},
    service::{token_prefix, TokenService},
    AuthError,
};

/// Result of a send attempt. Failures are reported here and never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicLinkOutcome {
    pub error: Option<String>,
}

impl MagicLinkOutcome {
    fn sent() -> Self {
        Self { error: None }
    }

    fn failed(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.error.is_none()
    }
}

const INVALID_EMAIL: &str = "Invalid email format";
const EMAIL_FAILED: &str = "Failed to send magic link email";
const SEND_FAILED: &str = "Failed to send magic link";

/// Build the email carrying a magic link
fn link_message(config: &AuthConfig, to: &str, token: &str) -> EmailMessage {
    let link = config.verify_url(token);
    let app_name = &config.app_name;
    EmailMessage {
        from: config.email_from.clone(),
        to: to.to_string(),
        subject: format!("Your magic link to sign in to {app_name}"),
        html: format!(
            r#"<h2>Sign in to {app_name}</h2>
<p>Click the link below to sign in. This link expires in 15 minutes and can only be used once.</p>
<p><a href="{link}">Sign in to {app_name}</a></p>
<p>If you did not request this email you can safely ignore it.</p>"#
        ),
    }
}

/// Magic-link service
pub struct MagicLinkService<U: UserRepository, T: TokenRepository> {
    tokens: Arc<TokenService>,
    users: Arc<U>,
    store: Arc<T>,
    email: Arc<dyn EmailProvider>,
    config: AuthConfig,
}

impl<U: UserRepository, T: TokenRepository> MagicLinkService<U, T> {
    /// Create a new magic-link service
    pub fn new(
        config: AuthConfig,
        tokens: Arc<TokenService>,
        users: Arc<U>,
        store: Arc<T>,
        email: Arc<dyn EmailProvider>,
    ) -> Self {
        Self {
            tokens,
            users,
            store,
            email,
            config,
        }
    }

    /// Issue a magic token, record it and email the link
    #[instrument(skip(self))]
    pub async fn send_magic_link(&self, email: &str) -> MagicLinkOutcome {
        if !is_valid_email(email) {
            debug!("Rejected magic link request for invalid email");
            return MagicLinkOutcome::failed(INVALID_EMAIL);
        }

        let token = match self.tokens.generate_token(TokenType::Magic, email, UserRole::User) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Failed to generate magic token");
                return MagicLinkOutcome::failed(SEND_FAILED);
            }
        };

        if let Err(e) = self
            .store
            .store(&token, email, TokenType::Magic.lifetime_secs())
            .await
        {
            error!(error = %e, "Failed to store magic token");
            return MagicLinkOutcome::failed(SEND_FAILED);
        }

        let message = link_message(&self.config, email, &token);
        match self.email.send(&message).await {
            Ok(receipt) => {
                info!(provider = self.email.name(), id = %receipt.id, "Magic link sent");
                MagicLinkOutcome::sent()
            }
            Err(e) => {
                error!(provider = self.email.name(), error = %e, "Failed to send magic link email");
                MagicLinkOutcome::failed(EMAIL_FAILED)
            }
        }
    }

    /// Consume a link from the store and stamp the user's last login.
    ///
    /// The store removes the row atomically, so of several concurrent calls
    /// for one link at most one returns true. Returns false on any failure,
    /// including store errors.
    #[instrument(skip(self, token), fields(token = token_prefix(token)))]
    pub async fn validate_magic_link(&self, token: &str, email: &str) -> bool {
        match self.store.consume(token, email).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Magic link not found, mismatched or expired");
                return false;
            }
            Err(e) => {
                error!(error = %e, "Failed to consume magic link");
                return false;
            }
        }

        match self.users.find_by_email(email).await {
            Ok(Some(user)) => match user.user_id() {
                Ok(id) => {
                    if let Err(e) = self.users.update_last_login(id).await {
                        error!(error = %e, "Failed to update last login");
                        return false;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Stored user has an invalid id");
                    return false;
                }
            },
            Ok(None) => warn!("Magic link redeemed for an email with no user"),
            Err(e) => {
                error!(error = %e, "Failed to look up user");
                return false;
            }
        }

        true
    }

    /// Ensure a user exists for `email`, then send them a link
    #[instrument(skip(self))]
    pub async fn request_login(&self, email: &str) -> MagicLinkOutcome {
        if !is_valid_email(email) {
            return MagicLinkOutcome::failed(INVALID_EMAIL);
        }

        if let Err(e) = self.users.create(email).await {
            error!(error = %e, "Failed to create user");
            return MagicLinkOutcome::failed(SEND_FAILED);
        }

        self.send_magic_link(email).await
    }

    /// Exchange a magic link for an access/refresh pair
    #[instrument(skip(self, token), fields(token = token_prefix(token)))]
    pub async fn redeem(&self, token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_token_of_type(token, TokenType::Magic)?;

        // Issue before consuming: a signing failure must not burn the link
        let pair = self.tokens.issue_pair(&claims.email, claims.role)?;

        if !self.validate_magic_link(token, &claims.email).await {
            return Err(AuthError::MagicLinkRejected);
        }
        self.tokens.blacklist_token(token);

        info!("Magic link redeemed");
        Ok(pair)
    }
}
