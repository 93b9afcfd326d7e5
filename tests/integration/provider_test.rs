//! HTTP backends against a local stub server

use std::sync::mpsc::Receiver;
use std::time::Duration;

use imsg::provider::{
    AnalysisProvider, AnthropicProvider, OpenAiProvider, ProviderError, ProviderSettings,
};

use super::helpers::{serve_once, CapturedRequest};

fn settings_for(base_url: &str) -> ProviderSettings {
    ProviderSettings {
        base_url: Some(base_url.to_string()),
        timeout: Some(Duration::from_secs(10)),
        ..ProviderSettings::default()
    }
}

fn recv(rx: &Receiver<CapturedRequest>) -> CapturedRequest {
    rx.recv_timeout(Duration::from_secs(10)).unwrap()
}

#[test]
fn openai_round_trip_through_stub() {
    let reply = serde_json::json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "```json\n{\"narrative\": \"Busy week.\", \"key_events\": [\"Moved flat\"]}\n```"
            }
        }]
    })
    .to_string();
    let (base, rx) = serve_once(200, &reply);

    let provider = OpenAiProvider::new("sk-test".to_string(), &settings_for(&base)).unwrap();
    let result = provider.analyze("Conversation with Contact_1:\nUser: hi").unwrap();

    assert_eq!(result.narrative, "Busy week.");
    assert_eq!(result.key_events, vec!["Moved flat"]);

    let request = recv(&rx);
    assert!(request.head.starts_with("POST /v1/chat/completions"));
    assert!(request.head.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["max_tokens"], 800);
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("User: hi"));
}

#[test]
fn anthropic_round_trip_through_stub() {
    let reply = serde_json::json!({
        "content": [{
            "type": "text",
            "text": "{\"narrative\": \"Quiet month.\", \"key_events\": []}"
        }]
    })
    .to_string();
    let (base, rx) = serve_once(200, &reply);

    let provider = AnthropicProvider::new("ak-test".to_string(), &settings_for(&base)).unwrap();
    let result = provider.analyze("Conversation with Contact_1:\nContact_1: hey").unwrap();

    assert_eq!(result.narrative, "Quiet month.");
    assert!(result.key_events.is_empty());

    let request = recv(&rx);
    let head = request.head.to_ascii_lowercase();
    assert!(request.head.starts_with("POST /v1/messages"));
    assert!(head.contains("x-api-key: ak-test"));
    assert!(head.contains("anthropic-version: 2023-06-01"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["model"], "claude-3-haiku-20240307");
}

#[test]
fn error_status_becomes_backend_error() {
    let (base, _rx) = serve_once(401, r#"{"error": {"message": "invalid api key"}}"#);

    let provider = OpenAiProvider::new("sk-bad".to_string(), &settings_for(&base)).unwrap();
    let err = provider.analyze("text").unwrap_err();

    match err {
        ProviderError::Backend { provider, message } => {
            assert_eq!(provider, "openai");
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[test]
fn envelope_without_content_is_malformed() {
    let (base, _rx) = serve_once(200, r#"{"choices": []}"#);

    let provider = OpenAiProvider::new("sk-test".to_string(), &settings_for(&base)).unwrap();
    let err = provider.analyze("text").unwrap_err();

    assert!(matches!(err, ProviderError::MalformedResponse { provider: "openai", .. }));
}
