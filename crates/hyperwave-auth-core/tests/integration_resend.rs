//! Integration tests for the Resend email provider against a mock API

use hyperwave_auth_core::{EmailError, EmailMessage, EmailProvider, ResendEmailProvider};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "re_test_0123456789";

fn message() -> EmailMessage {
    EmailMessage {
        from: "noreply@example.com".to_string(),
        to: "test@example.com".to_string(),
        subject: "Your magic link".to_string(),
        html: "<a href=\"https://app.example.com/auth/verify?token=x\">Sign in</a>".to_string(),
    }
}

#[tokio::test]
async fn test_send_posts_message_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .and(body_json(serde_json::json!({
            "from": "noreply@example.com",
            "to": "test@example.com",
            "subject": "Your magic link",
            "html": "<a href=\"https://app.example.com/auth/verify?token=x\">Sign in</a>",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "email_123" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ResendEmailProvider::new(Some(API_KEY.to_string())).with_base_url(server.uri());
    let receipt = provider.send(&message()).await.unwrap();

    assert_eq!(receipt.id, "email_123");
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "Invalid `to` field",
        })))
        .mount(&server)
        .await;

    let provider = ResendEmailProvider::new(Some(API_KEY.to_string())).with_base_url(server.uri());
    let err = provider.send(&message()).await.unwrap_err();

    match err {
        EmailError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid `to` field");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_placeholder_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = ResendEmailProvider::new(Some("re_123".to_string())).with_base_url(server.uri());
    let err = provider.send(&message()).await.unwrap_err();

    assert!(matches!(err, EmailError::NotConfigured(_)));
}
