//! Integration tests for the HTTP relay and chat resource clients
//!
//! Both clients run against wiremock servers; no real relay is needed.

use std::time::Duration;

use quill_engine::relay::chat::{ChatChannel, HttpChatChannel};
use quill_engine::relay::{HttpRelay, RequestChannel};
use quill_engine::secrets::SecretString;
use sdk::errors::EngineError;
use sdk::types::{AiRequest, ChatMessage, ChatPost, ModelId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn relay(server: &MockServer) -> HttpRelay {
    HttpRelay::new(server.uri(), Some(SecretString::new("test-token")))
}

fn request() -> AiRequest {
    AiRequest::new("Convert: area of a circle", ModelId::new("gpt-4o-mini"))
}

#[tokio::test]
async fn test_relay_answer_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({
            "prompt": "Convert: area of a circle",
            "model": "gpt-4o-mini"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "answer": "A = \\pi r^2" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = relay(&server).send(&request()).await.unwrap();
    assert_eq!(reply.into_answer().as_deref(), Some("A = \\pi r^2"));
}

#[tokio::test]
async fn test_relay_non_success_reply_has_no_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let reply = relay(&server).send(&request()).await.unwrap();
    assert!(reply.into_answer().is_none());
}

#[tokio::test]
async fn test_relay_server_error_is_channel_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let result = relay(&server).send(&request()).await;
    match result {
        Err(EngineError::ChannelFailure(msg)) => assert!(msg.contains("502")),
        other => panic!("Expected ChannelFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_relay_rejected_token_is_credential_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(matches!(
        relay(&server).send(&request()).await,
        Err(EngineError::CredentialMissing(_))
    ));
}

#[tokio::test]
async fn test_relay_malformed_reply_is_channel_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert!(matches!(
        relay(&server).send(&request()).await,
        Err(EngineError::ChannelFailure(_))
    ));
}

#[tokio::test]
async fn test_token_validation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .mount(&server)
        .await;

    assert!(relay(&server).validate_token(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_token_validation_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    assert!(!relay(&server).validate_token(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_token_validation_times_out_as_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "valid": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    assert!(!relay(&server).validate_token(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn test_check_token_reports_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "valid": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    assert!(matches!(
        relay(&server).check_token(Duration::from_millis(100)).await,
        Err(EngineError::TokenValidationTimeout)
    ));
}

#[tokio::test]
async fn test_check_token_malformed_reply_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        relay(&server).check_token(Duration::from_secs(5)).await,
        Err(EngineError::Network(_))
    ));
}

#[tokio::test]
async fn test_check_token_unreachable_relay_is_network_error() {
    let relay = HttpRelay::new("http://127.0.0.1:1", Some(SecretString::new("test-token")));
    assert!(matches!(
        relay.check_token(Duration::from_secs(5)).await,
        Err(EngineError::Network(_))
    ));
}

#[tokio::test]
async fn test_check_token_rejected_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!relay(&server).check_token(Duration::from_secs(5)).await.unwrap());
}

#[tokio::test]
async fn test_chat_fetch_returns_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rooms/algebra/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "author": "ana", "body": "hi", "timestamp": "2024-03-01T09:30:00Z" },
            { "author": "bo", "body": "hey" }
        ])))
        .mount(&server)
        .await;

    let channel = HttpChatChannel::new(server.uri());
    let messages = channel.fetch("algebra").await.unwrap();
    assert_eq!(
        messages,
        vec![
            ChatMessage::new("ana", "hi", "2024-03-01T09:30:00Z"),
            ChatMessage::new("bo", "hey", ""),
        ]
    );
}

#[tokio::test]
async fn test_chat_fetch_failure_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rooms/algebra/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let channel = HttpChatChannel::new(server.uri());
    assert!(channel.fetch("algebra").await.is_none());
}

#[tokio::test]
async fn test_chat_post_acknowledged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rooms/algebra/messages"))
        .and(body_json(json!({ "author": "ana", "body": "hello" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let channel = HttpChatChannel::new(server.uri());
    let post = ChatPost {
        author: "ana".to_string(),
        body: "hello".to_string(),
    };
    assert!(channel.post("algebra", &post).await);
}

#[tokio::test]
async fn test_chat_post_rejected_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rooms/algebra/messages"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let channel = HttpChatChannel::new(server.uri());
    let post = ChatPost {
        author: "ana".to_string(),
        body: "hello".to_string(),
    };
    assert!(!channel.post("algebra", &post).await);
}
