use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chat_gate::config::Config;
use chat_gate::db::{AccountsStorage, connect_lazy};
use chat_gate::{AccountService, AppState, VendorBridge, app_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

struct TestApp {
    app: Router,
    storage: AccountsStorage,
    _dir: TempDir,
}

fn config(vendor_base: &str) -> Config {
    Config {
        vendor_app_id: "app123".to_string(),
        vendor_region: "eu".to_string(),
        vendor_widget_id: "widget-1".to_string(),
        vendor_api_secret: "server-only-secret".to_string(),
        vendor_api_base: Some(Url::parse(vendor_base).expect("vendor base url")),
        ..Config::default()
    }
}

async fn test_app(vendor_base: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = format!("sqlite:{}", dir.path().join("accounts.sqlite").display());

    let pool = connect_lazy(&database_url).expect("pool");
    let storage = AccountsStorage::new(pool);
    storage.init_schema().await.expect("schema");

    // cost 4 keeps the suite fast; production config refuses anything below 10
    let accounts = AccountService::new(storage.clone(), 4);
    let bridge = VendorBridge::new(&config(vendor_base)).expect("bridge");
    let app = app_router(AppState::new(accounts, bridge));

    TestApp {
        app,
        storage,
        _dir: dir,
    }
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn signup_then_duplicate_is_rejected() {
    let t = test_app("http://127.0.0.1:9/v3").await;

    let (status, body) = post_json(
        &t.app,
        "/accounts",
        json!({"username": "alice", "fullname": "Alice A", "password": "pw123"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"username": "alice", "fullname": "Alice A"}));

    let (status, body) = post_json(
        &t.app,
        "/accounts",
        json!({"username": "alice", "fullname": "Other", "password": "zzz"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");

    let row = t
        .storage
        .find_by_username("alice")
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.fullname, "Alice A");
    assert_ne!(row.password_hash, "pw123");
}

#[tokio::test]
async fn signup_with_missing_field_is_400() {
    let t = test_app("http://127.0.0.1:9/v3").await;

    let (status, body) = post_json(
        &t.app,
        "/accounts",
        json!({"username": "alice", "password": "pw123"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");
    assert_eq!(t.storage.count().await.expect("count"), 0);
}

#[tokio::test]
async fn login_with_right_and_wrong_password() {
    let t = test_app("http://127.0.0.1:9/v3").await;
    post_json(
        &t.app,
        "/accounts",
        json!({"username": "alice", "fullname": "Alice A", "password": "pw123"}),
    )
    .await;

    let (status, body) = post_json(
        &t.app,
        "/sessions",
        json!({"username": "alice", "password": "pw123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"username": "alice", "fullname": "Alice A"}));

    let (status, wrong_pw) = post_json(
        &t.app,
        "/sessions",
        json!({"username": "alice", "password": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, no_user) = post_json(
        &t.app,
        "/sessions",
        json!({"username": "bob", "password": "pw123"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, no_user);
    assert_eq!(no_user["message"], "Invalid username or password");
}

#[tokio::test]
async fn init_key_never_exposes_secret() {
    let t = test_app("http://127.0.0.1:9/v3").await;

    let (status, body) = post_json(&t.app, "/vendor-auth", json!({"action": "getInitKey"})).await;
    assert_eq!(status, StatusCode::OK);
    let key = body["initKey"].as_str().expect("initKey");
    assert!(!key.is_empty());
    assert_ne!(key, "server-only-secret");
    assert!(!body.to_string().contains("server-only-secret"));
}

#[tokio::test]
async fn session_token_passes_through_vendor_503() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/users/alice/auth")
        .match_header("apikey", "server-only-secret")
        .with_status(503)
        .with_body(r#"{"message":"Vendor is down for maintenance"}"#)
        .create_async()
        .await;

    let t = test_app(&format!("{}/v3", server.url())).await;
    let (status, body) = post_json(
        &t.app,
        "/vendor-auth",
        json!({"action": "getSessionToken", "uid": "alice"}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"message": "Vendor is down for maintenance"}));
}

#[tokio::test]
async fn session_token_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v3/users/alice/auth")
        .with_status(200)
        .with_body(r#"{"data":{"authToken":"alice_tok"}}"#)
        .create_async()
        .await;

    let t = test_app(&format!("{}/v3", server.url())).await;
    let (status, body) = post_json(
        &t.app,
        "/vendor-auth",
        json!({"action": "getSessionToken", "uid": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"token": "alice_tok"}));
}

#[tokio::test]
async fn unknown_action_or_missing_uid_is_400() {
    let t = test_app("http://127.0.0.1:9/v3").await;

    for req in [
        json!({"action": "getAuthKey"}),
        json!({"action": "getSessionToken"}),
        json!({}),
    ] {
        let (status, body) = post_json(&t.app, "/vendor-auth", req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid action or missing parameters");
    }
}

#[tokio::test]
async fn vendor_user_registration_is_proxied() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/users")
        .match_body(mockito::Matcher::Json(
            json!({"uid": "alice", "name": "Alice A"}),
        ))
        .with_status(200)
        .with_body(r#"{"data":{"uid":"alice","name":"Alice A"}}"#)
        .create_async()
        .await;

    let t = test_app(&format!("{}/v3", server.url())).await;
    let (status, body) = post_json(
        &t.app,
        "/vendor-users",
        json!({"uid": "alice", "name": "Alice A"}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], "alice");
}

#[tokio::test]
async fn vendor_user_that_already_exists_counts_as_registered() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v3/users")
        .with_status(400)
        .with_body(
            r#"{"error":{"message":"The UID alice already exists.","code":"ERR_UID_ALREADY_EXISTS"}}"#,
        )
        .create_async()
        .await;

    let t = test_app(&format!("{}/v3", server.url())).await;
    let (status, body) = post_json(
        &t.app,
        "/vendor-users",
        json!({"uid": "alice", "name": "Alice A"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], "alice");
}

#[tokio::test]
async fn malformed_json_is_400_with_message() {
    let t = test_app("http://127.0.0.1:9/v3").await;
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sessions")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn oversized_body_is_413() {
    let t = test_app("http://127.0.0.1:9/v3").await;
    let huge = "a".repeat(chat_gate::router::BODY_LIMIT + 1024);
    let (status, _) = post_json(
        &t.app,
        "/accounts",
        json!({"username": huge, "fullname": "x", "password": "y"}),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn healthz_is_ok() {
    let t = test_app("http://127.0.0.1:9/v3").await;
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}
