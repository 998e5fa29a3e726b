//! Integration tests for session management

mod common;

use std::sync::Arc;

use hyperwave_auth_core::{AuthError, SessionManager, TokenService};
use hyperwave_db::UserRepository;
use hyperwave_types::{TokenType, UserRole};

use common::{token_service, MockUserRepository};

async fn setup() -> (SessionManager<MockUserRepository>, Arc<TokenService>, MockUserRepository) {
    let (tokens, _) = token_service();
    let users = MockUserRepository::new();
    users.create("test@example.com").await.unwrap();
    let sessions = SessionManager::new(Arc::clone(&tokens), Arc::new(users.clone()));
    (sessions, tokens, users)
}

#[tokio::test]
async fn test_authenticate_access_token() {
    let (sessions, tokens, _) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::Admin).unwrap();

    let claims = sessions.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(claims.email, "test@example.com");
    assert_eq!(claims.role, UserRole::Admin);
}

#[tokio::test]
async fn test_authenticate_rejects_refresh_token() {
    let (sessions, tokens, _) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::User).unwrap();

    assert!(matches!(
        sessions.authenticate(&pair.refresh_token).await,
        Err(AuthError::InvalidType)
    ));
}

#[tokio::test]
async fn test_authenticate_deleted_user() {
    let (sessions, tokens, users) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::User).unwrap();
    users.delete("test@example.com");

    let err = sessions.authenticate(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
    assert_eq!(err.reason(), "verification_required");
}

#[tokio::test]
async fn test_refresh_keeps_role() {
    let (sessions, tokens, _) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::Admin).unwrap();

    let access = sessions.refresh(&pair.refresh_token).await.unwrap();
    let claims = tokens.verify_token_of_type(&access, TokenType::Access).unwrap();
    assert_eq!(claims.role, UserRole::Admin);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (sessions, tokens, _) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::User).unwrap();

    assert!(matches!(
        sessions.refresh(&pair.access_token).await,
        Err(AuthError::InvalidType)
    ));
}

#[tokio::test]
async fn test_logout_revokes_both_tokens() {
    let (sessions, tokens, _) = setup().await;
    let pair = tokens.issue_pair("test@example.com", UserRole::User).unwrap();

    sessions.logout(Some(&pair.access_token), Some(&pair.refresh_token));

    assert!(matches!(
        sessions.authenticate(&pair.access_token).await,
        Err(AuthError::Revoked)
    ));
    assert!(matches!(
        sessions.refresh(&pair.refresh_token).await,
        Err(AuthError::Revoked)
    ));
}

#[tokio::test]
async fn test_logout_with_nothing() {
    let (sessions, tokens, _) = setup().await;
    sessions.logout(None, Some(""));
    assert!(tokens.revocations().is_empty());
}

#[tokio::test]
async fn test_csrf_verification() {
    let (sessions, tokens, _) = setup().await;
    let csrf = tokens.generate_csrf_token().unwrap();
    assert!(sessions.verify_csrf(&csrf).is_ok());

    let access = tokens
        .generate_token(TokenType::Access, "test@example.com", UserRole::User)
        .unwrap();
    assert!(matches!(sessions.verify_csrf(&access), Err(AuthError::InvalidType)));
}
