//! HTTP adapter tests against a local axum server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokenbridge_application::{PlatformAuth, TokenExchange};
use tokenbridge_domain::{
    ExchangeError, ExchangeMode, ExchangeSettings, OAuthEchoHeaders, PlatformSettings,
    PlatformToken, ProviderCredential, ProviderKind, SignInError,
};
use tokenbridge_infrastructure::{IdentityToolkitAuth, ReqwestExchangeClient};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client(base: &str, timeout_ms: u64) -> ReqwestExchangeClient {
    ReqwestExchangeClient::new(&ExchangeSettings::new(base).with_timeout_ms(timeout_ms))
        .expect("client")
}

/// Verification server in the style of the LINE demo backend.
fn verify_server(hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/verifyToken",
            post(
                |State(hits): State<Arc<AtomicUsize>>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(
                        headers.get("content-type").and_then(|v| v.to_str().ok()),
                        Some("application/json")
                    );
                    match body.get("token").and_then(Value::as_str) {
                        Some("abc123") => {
                            (StatusCode::OK, Json(json!({"firebase_token": "xyz789"})))
                        }
                        Some(_) => (
                            StatusCode::FORBIDDEN,
                            Json(json!({"error_message": "invalid access token"})),
                        ),
                        None => (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"error_message": "missing token"})),
                        ),
                    }
                },
            ),
        )
        .with_state(hits)
}

#[tokio::test]
async fn test_exchange_returns_token_verbatim() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(verify_server(Arc::clone(&hits))).await;

    let token = client(&base, 5_000).exchange("abc123").await.expect("token");

    assert_eq!(token, PlatformToken::new("xyz789"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exchange_rejection_carries_error_message() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(verify_server(Arc::clone(&hits))).await;

    let result = client(&base, 5_000).exchange("forged").await;

    assert_eq!(
        result,
        Err(ExchangeError::ServerRejected {
            status: 403,
            message: "invalid access token".to_string(),
        })
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exchange_server_error() {
    let router = Router::new().route(
        "/verifyToken",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(router).await;

    let result = client(&base, 5_000).exchange("abc123").await;

    assert!(matches!(
        result,
        Err(ExchangeError::ServerRejected { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_exchange_missing_field_is_malformed() {
    let router = Router::new().route(
        "/verifyToken",
        post(|| async { Json(json!({"status": "ok"})) }),
    );
    let base = serve(router).await;

    let result = client(&base, 5_000).exchange("abc123").await;

    assert!(matches!(result, Err(ExchangeError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_exchange_timeout_is_network_error() {
    let router = Router::new().route(
        "/verifyToken",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"firebase_token": "late"}))
        }),
    );
    let base = serve(router).await;

    let result = client(&base, 100).exchange("abc123").await;

    match result {
        Err(ExchangeError::Network(message)) => assert!(message.contains("timed out")),
        other => panic!("expected a network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_unreachable_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let result = client(&format!("http://{addr}"), 1_000).exchange("abc123").await;

    assert!(matches!(result, Err(ExchangeError::Network(_))));
}

#[tokio::test]
async fn test_exchange_does_not_follow_redirects() {
    let diverted = Arc::new(AtomicUsize::new(0));
    let other = serve(verify_server(Arc::clone(&diverted))).await;

    let target = format!("{other}/verifyToken");
    let router = Router::new().route(
        "/verifyToken",
        post(move || {
            let target = target.clone();
            async move { (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, target)]) }
        }),
    );
    let base = serve(router).await;

    let result = client(&base, 5_000).exchange("abc123").await;

    assert!(matches!(
        result,
        Err(ExchangeError::ServerRejected { status: 307, .. })
    ));
    assert_eq!(diverted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_exchange_oversized_body_is_malformed() {
    let router = Router::new().route(
        "/verifyToken",
        post(|| async {
            let padding = "x".repeat(1024 * 1024);
            Json(json!({"firebase_token": "xyz789", "padding": padding}))
        }),
    );
    let base = serve(router).await;

    let result = client(&base, 5_000).exchange("abc123").await;

    assert!(matches!(result, Err(ExchangeError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_exchange_oversized_error_body_keeps_status() {
    let router = Router::new().route(
        "/verifyToken",
        post(|| async { (StatusCode::BAD_GATEWAY, "e".repeat(1024 * 1024)) }),
    );
    let base = serve(router).await;

    let result = client(&base, 5_000).exchange("abc123").await;

    assert_eq!(
        result,
        Err(ExchangeError::ServerRejected {
            status: 502,
            message: "HTTP 502".to_string(),
        })
    );
}

const DIGITS_ACCOUNT_URL: &str = "https://api.digits.com/1.1/sdk/account.json";

/// Verification server in the style of the Digits demo backend.
fn digits_server(hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/digits",
            post(
                |State(hits): State<Arc<AtomicUsize>>, headers: HeaderMap| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
                    let Some(auth) = value(OAuthEchoHeaders::AUTHORIZATION_HEADER) else {
                        return (StatusCode::BAD_REQUEST, "Invalid auth type.".to_string());
                    };
                    if !auth.starts_with("OAuth ") {
                        return (StatusCode::BAD_REQUEST, "Invalid auth type.".to_string());
                    }
                    if value(OAuthEchoHeaders::SERVICE_PROVIDER_HEADER) != Some(DIGITS_ACCOUNT_URL)
                    {
                        return (StatusCode::BAD_REQUEST, "Invalid API hostname.".to_string());
                    }
                    (StatusCode::OK, "digits-custom-token".to_string())
                },
            ),
        )
        .with_state(hits)
}

fn digits_client(base: &str) -> ReqwestExchangeClient {
    let mut settings = ExchangeSettings::new(base).with_mode(ExchangeMode::OauthEcho);
    settings.verify_path = "/digits".to_string();
    ReqwestExchangeClient::new(&settings).expect("client")
}

fn digits_credential(service_provider: &str, authorization: &str) -> ProviderCredential {
    ProviderCredential::new(ProviderKind::Digits, "digits-session-token")
        .with_oauth_echo(OAuthEchoHeaders::new(service_provider, authorization))
}

#[tokio::test]
async fn test_oauth_echo_exchange_reads_text_token() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(digits_server(Arc::clone(&hits))).await;
    let credential = digits_credential(
        DIGITS_ACCOUNT_URL,
        r#"OAuth oauth_consumer_key="key", oauth_signature="sig""#,
    );

    let token = digits_client(&base)
        .exchange_credential(&credential)
        .await
        .expect("token");

    assert_eq!(token, PlatformToken::new("digits-custom-token"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oauth_echo_rejection_carries_text_message() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(digits_server(Arc::clone(&hits))).await;
    let credential = digits_credential("https://evil.example.com/account.json", "OAuth sig");

    let result = digits_client(&base).exchange_credential(&credential).await;

    assert_eq!(
        result,
        Err(ExchangeError::ServerRejected {
            status: 400,
            message: "Invalid API hostname.".to_string(),
        })
    );
}

fn id_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

fn identity_toolkit_server() -> Router {
    Router::new().route(
        "/v1/accounts:signInWithCustomToken",
        post(
            |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                if query.get("key").map(String::as_str) != Some("web-key") {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": {"code": 400, "message": "API key not valid"}})),
                    );
                }
                if body.get("returnSecureToken") != Some(&Value::Bool(true)) {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": {"code": 400, "message": "MISSING_RETURN_SECURE_TOKEN"}
                        })),
                    );
                }
                match body.get("token").and_then(Value::as_str) {
                    Some("xyz789") => (
                        StatusCode::OK,
                        Json(json!({
                            "kind": "identitytoolkit#VerifyCustomTokenResponse",
                            "idToken": id_token(&json!({
                                "user_id": "line:U4af4980629",
                                "name": "Brown",
                                "firebase": {"sign_in_provider": "custom"}
                            })),
                            "refreshToken": "refresh-1",
                            "expiresIn": "3600",
                            "isNewUser": false
                        })),
                    ),
                    _ => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": {"code": 400, "message": "INVALID_CUSTOM_TOKEN"}})),
                    ),
                }
            },
        ),
    )
}

fn platform(base: &str, api_key: &str) -> IdentityToolkitAuth {
    let settings = PlatformSettings {
        api_key: Some(api_key.to_string()),
        endpoint: base.to_string(),
    };
    IdentityToolkitAuth::new(&settings, Duration::from_secs(5)).expect("platform")
}

#[tokio::test]
async fn test_identity_toolkit_sign_in() {
    let base = serve(identity_toolkit_server()).await;
    let platform = platform(&base, "web-key");

    let session = platform
        .sign_in(&PlatformToken::new("xyz789"))
        .await
        .expect("session");

    assert_eq!(session.uid, "line:U4af4980629");
    assert_eq!(session.display_name.as_deref(), Some("Brown"));
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert!(session.expires_at.is_some());
    assert_eq!(platform.current_session().await, Some(session));
}

#[tokio::test]
async fn test_identity_toolkit_rejection_keeps_session() {
    let base = serve(identity_toolkit_server()).await;
    let platform = platform(&base, "web-key");
    let first = platform
        .sign_in(&PlatformToken::new("xyz789"))
        .await
        .expect("session");

    let result = platform.sign_in(&PlatformToken::new("expired")).await;

    assert_eq!(
        result,
        Err(SignInError::Rejected("INVALID_CUSTOM_TOKEN".to_string()))
    );
    assert_eq!(platform.current_session().await, Some(first));
}

#[tokio::test]
async fn test_identity_toolkit_bad_key() {
    let base = serve(identity_toolkit_server()).await;

    let result = platform(&base, "wrong-key")
        .sign_in(&PlatformToken::new("xyz789"))
        .await;

    assert_eq!(
        result,
        Err(SignInError::Rejected("API key not valid".to_string()))
    );
}
