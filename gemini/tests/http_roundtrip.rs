//! Client tests against a local HTTP server.
//!
//! Each test starts an axum server on an ephemeral port and points the
//! client at it, so the full request/response path runs without the real
//! service:
//! - Request path, API key header and JSON body
//! - Non-2xx statuses surface as `Error::Api` with the service message
//! - Undecodable bodies, timeouts and refused connections
//!
//! Run with: `cargo test -p gemini --test http_roundtrip`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use gemini::{Content, Error, Gemini, Request};
use serde_json::{json, Value};

/// Serve `router` on 127.0.0.1 and return the API base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1beta")
}

/// A server that answers every request with the same status and body.
fn canned(status: StatusCode, body: &'static str) -> Router {
    Router::new().fallback(move || async move {
        (status, [(header::CONTENT_TYPE, "application/json")], body)
    })
}

fn client(api_base: String) -> Gemini {
    Gemini::new("test-key").with_api_base(api_base)
}

fn hello() -> Request {
    Request::new(vec![Content::user("hello")])
}

#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[tokio::test]
async fn test_generate_sends_request_and_parses_reply() {
    let seen: Arc<Mutex<Option<SeenRequest>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/v1beta/models/*rest",
        post(
            move |Path(rest): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(SeenRequest {
                        path: rest,
                        api_key: headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                        body,
                    });
                    Json(json!({
                        "candidates": [{
                            "content": { "role": "model", "parts": [{ "text": "Hi there!" }] },
                            "finishReason": "STOP"
                        }],
                        "usageMetadata": {
                            "promptTokenCount": 3,
                            "candidatesTokenCount": 2,
                            "totalTokenCount": 5
                        }
                    }))
                }
            },
        ),
    );
    let api_base = serve(router).await;

    let request = Request::new(vec![
        Content::user("hi"),
        Content::model("hello"),
        Content::user("how are you?"),
    ])
    .with_system_instruction("Be kind.");
    let response = client(api_base)
        .with_model("gemini-1.5-pro")
        .generate(request)
        .await
        .unwrap();

    assert_eq!(response.text().as_deref(), Some("Hi there!"));
    assert_eq!(response.usage.unwrap().total_tokens, 5);

    let seen = seen.lock().unwrap().clone().expect("server saw no request");
    assert_eq!(seen.path, "gemini-1.5-pro:generateContent");
    assert_eq!(seen.api_key.as_deref(), Some("test-key"));
    assert_eq!(seen.body["systemInstruction"]["parts"][0]["text"], "Be kind.");
    assert_eq!(seen.body["contents"].as_array().unwrap().len(), 3);
    assert_eq!(seen.body["contents"][1]["role"], "model");
    assert_eq!(seen.body["contents"][2]["parts"][0]["text"], "how are you?");
}

#[tokio::test]
async fn test_blocked_prompt_has_no_text() {
    let api_base = serve(canned(
        StatusCode::OK,
        r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#,
    ))
    .await;

    let response = client(api_base).generate(hello()).await.unwrap();

    assert!(response.text().is_none());
    assert_eq!(response.filter_reason().as_deref(), Some("SAFETY"));
}

#[tokio::test]
async fn test_quota_status_is_api_error() {
    let api_base = serve(canned(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{ "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" } }"#,
    ))
    .await;

    let err = client(api_base).generate(hello()).await.unwrap_err();

    assert!(
        matches!(err, Error::Api { status: 429, ref message } if message == "Quota exceeded"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_server_error_keeps_raw_body() {
    let api_base = serve(canned(StatusCode::BAD_GATEWAY, "upstream unavailable")).await;

    let err = client(api_base).generate(hello()).await.unwrap_err();

    assert!(
        matches!(err, Error::Api { status: 502, ref message } if message == "upstream unavailable"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_undecodable_body_is_parse_error() {
    let api_base = serve(canned(StatusCode::OK, "<html>oops</html>")).await;

    let err = client(api_base).generate(hello()).await.unwrap_err();

    assert!(matches!(err, Error::Parse(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "{}"
    });
    let api_base = serve(router).await;

    let err = client(api_base)
        .with_timeout(Duration::from_millis(200))
        .unwrap()
        .generate(hello())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/v1beta"))
        .generate(hello())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "unexpected error: {err:?}");
}
