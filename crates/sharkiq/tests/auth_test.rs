#![allow(clippy::unwrap_used)]
// Session lifecycle tests for `AylaClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharkiq::{AylaClient, Credentials, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AylaClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AylaClient::with_endpoints(
        reqwest::Client::new(),
        Credentials::new("user@example.com", "hunter2", "app-id", "app-secret"),
        base_url.clone(),
        base_url,
    );
    (server, client)
}

fn token_body(access: &str, refresh: &str, expires_in: i64) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
    })
}

async fn mount_sign_in(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", "def", expires_in)))
        .mount(server)
        .await;
}

// ── Sign-in ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .and(body_json(json!({
            "user": {
                "email": "user@example.com",
                "password": "hunter2",
                "application": {"app_id": "app-id", "app_secret": "app-secret"},
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", "def", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_authenticated());
    client.sign_in().await.unwrap();

    assert!(client.is_authenticated());
    assert!(!client.token_expiring_within(Duration::from_secs(60)));
    assert!(client.token_expiring_within(Duration::from_secs(7200)));
}

#[tokio::test]
async fn test_sign_in_bad_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid email or password."}})),
        )
        .mount(&server)
        .await;

    let result = client.sign_in().await;

    match result {
        Err(Error::Auth { ref message }) => {
            assert!(message.contains("Invalid email or password."), "got: {message}");
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_unknown_application() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in.json"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": {"message": "Could not find application"}})),
        )
        .mount(&server)
        .await;

    let result = client.sign_in().await;

    match result {
        Err(Error::Auth { ref message }) => {
            assert!(
                message.contains("confirm app_id and app_secret"),
                "expected app identity hint, got: {message}"
            );
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_replaces_token() {
    let (server, client) = setup().await;
    mount_sign_in(&server, 3600).await;

    Mock::given(method("POST"))
        .and(path("/users/refresh_token.json"))
        .and(body_json(json!({"user": {"refresh_token": "def"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc2", "def2", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apiv1/devices.json"))
        .and(header("Authorization", "Bearer abc2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.sign_in().await.unwrap();
    client.refresh().await.unwrap();

    // Requests now carry the refreshed token.
    client.list_devices().await.unwrap();
}

#[tokio::test]
async fn test_refresh_without_sign_in() {
    let (_server, client) = setup().await;

    let result = client.refresh().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}

#[tokio::test]
async fn test_refresh_token_rejected() {
    let (server, client) = setup().await;
    mount_sign_in(&server, 3600).await;

    Mock::given(method("POST"))
        .and(path("/users/refresh_token.json"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid refresh token."}})),
        )
        .mount(&server)
        .await;

    client.sign_in().await.unwrap();
    let result = client.refresh().await;

    assert!(matches!(result, Err(Error::Auth { .. })), "got: {result:?}");
}

// ── Auto-refresh ────────────────────────────────────────────────────

#[tokio::test]
async fn test_expiring_token_refreshed_before_request() {
    let (server, client) = setup().await;
    // Well inside the 600s refresh margin.
    mount_sign_in(&server, 60).await;

    Mock::given(method("POST"))
        .and(path("/users/refresh_token.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "def2", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apiv1/devices.json"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.sign_in().await.unwrap();
    client.list_devices().await.unwrap();
}

#[tokio::test]
async fn test_fresh_token_not_refreshed() {
    let (server, client) = setup().await;
    mount_sign_in(&server, 7200).await;

    Mock::given(method("POST"))
        .and(path("/users/refresh_token.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", "y", 3600)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apiv1/devices.json"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.sign_in().await.unwrap();
    client.list_devices().await.unwrap();
}

#[tokio::test]
async fn test_expired_token_without_auto_refresh() {
    let (server, client) = setup().await;
    mount_sign_in(&server, 0).await;

    client.sign_in().await.unwrap();

    let url = Url::parse(&format!("{}/apiv1/devices.json", server.uri())).unwrap();
    let result = client.request(reqwest::Method::GET, url, false).await;

    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}

// ── Sign-out ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_out_clears_session() {
    let (server, client) = setup().await;
    mount_sign_in(&server, 3600).await;

    Mock::given(method("POST"))
        .and(path("/users/sign_out.json"))
        .and(body_json(json!({"user": {"access_token": "abc"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.sign_in().await.unwrap();
    client.sign_out().await.unwrap();

    assert!(!client.is_authenticated());
    let result = client.list_devices().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}

#[tokio::test]
async fn test_sign_out_without_sign_in() {
    let (_server, client) = setup().await;

    let result = client.sign_out().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}
