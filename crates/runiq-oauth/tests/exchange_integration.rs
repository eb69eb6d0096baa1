//! Token exchange against a mock token endpoint.

use runiq_oauth::{OAuthError, TokenExchangeConfig, TokenOutcome, exchange_code};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> TokenExchangeConfig {
    TokenExchangeConfig::strava("12345", "s3cret").with_token_url(format!("{}/oauth/token", server.uri()))
}

#[tokio::test]
async fn test_exchange_sends_single_json_post() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "client_id": "12345",
            "client_secret": "s3cret",
            "code": "auth-code",
            "grant_type": "authorization_code"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = exchange_code(&config_for(&server), "auth-code").await.unwrap();

    match outcome {
        TokenOutcome::Granted(grant) => assert_eq!(grant.access_token(), "abc123"),
        other => panic!("expected grant, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exchange_rejected_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = exchange_code(&config_for(&server), "expired").await.unwrap();

    match outcome {
        TokenOutcome::Rejected { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(body, json!({"error": "invalid_grant"}));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exchange_placeholder_credentials_are_sent_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "client_id": "",
            "client_secret": "",
            "code": "",
            "grant_type": "authorization_code"
        })))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let config = TokenExchangeConfig::default().with_token_url(format!("{}/oauth/token", server.uri()));
    let outcome = exchange_code(&config, "").await.unwrap();

    assert!(matches!(outcome, TokenOutcome::Rejected { status, .. } if status.as_u16() == 401));
}

#[tokio::test]
async fn test_exchange_success_without_token_is_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let err = exchange_code(&config_for(&server), "code").await.unwrap_err();
    assert!(matches!(err, OAuthError::Backend(_)));
}

#[tokio::test]
async fn test_exchange_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TokenExchangeConfig::strava("id", "secret").with_token_url(format!("http://{}/oauth/token", addr));
    let err = exchange_code(&config, "code").await.unwrap_err();

    assert!(matches!(err, OAuthError::Network(_)));
}
