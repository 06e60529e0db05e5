mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use taskmanager_core::auth::{MemoryTokenStore, TokenStore};
use taskmanager_core::{AuthError, AuthService, ErrorKind, ServiceError, UserService};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authorization_headers, client_for, client_with_timeout, profile_json, UNREACHABLE};

async fn mount_login(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_stores_token_and_next_request_carries_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "senha": "secret"})))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server.uri(), store.clone());
    let auth = AuthService::new(client.clone());

    let token = auth.login("a@b.com", "secret").await.unwrap();
    assert_eq!(token, "abc");
    assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
    assert!(auth.is_authenticated());

    let profile = UserService::new(client).get_profile().await.unwrap();
    assert_eq!(profile.id, 42);
}

#[tokio::test]
async fn login_401_is_invalid_credentials_and_store_stays_empty() {
    let server = MockServer::start().await;
    mount_login(&server, 401, json!({"details": {"motivo": "credenciais inválidas"}})).await;

    let store = Arc::new(MemoryTokenStore::new());
    let auth = AuthService::new(client_for(&server.uri(), store.clone()));

    for (email, password) in [("a@b.com", "wrong"), ("x@y.com", ""), ("", "secret")] {
        let err = auth.login(email, password).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(store.read().unwrap(), None);
    }
}

#[tokio::test]
async fn login_maps_account_statuses() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let auth = AuthService::new(client_for(&server.uri(), store.clone()));

    mount_login(&server, 403, json!({"message": "inactive"})).await;
    let err = auth.login("a@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, ServiceError::Auth(AuthError::InactiveAccount)));

    server.reset().await;
    mount_login(&server, 404, json!({})).await;
    let err = auth.login("new@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, ServiceError::Auth(AuthError::UnregisteredEmail)));

    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn login_400_passes_server_message_through() {
    let server = MockServer::start().await;
    mount_login(&server, 400, json!({"message": "Email format is invalid"})).await;

    let auth = AuthService::new(client_for(&server.uri(), Arc::new(MemoryTokenStore::new())));
    let err = auth.login("not-an-email", "secret").await.unwrap_err();
    assert!(matches!(err, ServiceError::Rejected(_)));
    assert_eq!(err.to_string(), "Email format is invalid");
}

#[tokio::test]
async fn login_400_with_long_body_keeps_server_message() {
    let server = MockServer::start().await;
    let body = json!({"message": "Email format is invalid", "trace": "x".repeat(600)});
    mount_login(&server, 400, body).await;

    let auth = AuthService::new(client_for(&server.uri(), Arc::new(MemoryTokenStore::new())));
    let err = auth.login("not-an-email", "secret").await.unwrap_err();
    assert_eq!(err.to_string(), "Email format is invalid");
}

#[tokio::test]
async fn login_500_is_server_error_with_detail() {
    let server = MockServer::start().await;
    mount_login(&server, 500, json!({"error": "database offline"})).await;

    let auth = AuthService::new(client_for(&server.uri(), Arc::new(MemoryTokenStore::new())));
    let err = auth.login("a@b.com", "secret").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.to_string(), "Server error: database offline");
}

#[tokio::test]
async fn login_without_server_is_connectivity_error() {
    let store = Arc::new(MemoryTokenStore::new());
    let auth = AuthService::new(client_for(UNREACHABLE, store.clone()));

    let err = auth.login("a@b.com", "secret").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn slow_server_times_out_as_connectivity_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "abc"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with_timeout(&server.uri(), store.clone(), Duration::from_millis(200));
    let err = AuthService::new(client).login("a@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, ServiceError::Connectivity(_)));
    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn logout_removes_authorization_from_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let client = client_for(&server.uri(), store.clone());
    let auth = AuthService::new(client.clone());
    let users = UserService::new(client);

    users.get_profile().await.unwrap();
    auth.logout().unwrap();
    assert_eq!(store.read().unwrap(), None);
    assert!(!auth.is_authenticated());
    users.get_profile().await.unwrap();

    let headers = authorization_headers(&server).await;
    assert_eq!(headers, vec![Some("Bearer abc".to_string()), None]);
}

#[tokio::test]
async fn default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .and(header("ngrok-skip-browser-warning", "true"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&server)
        .await;

    let users = UserService::new(client_for(&server.uri(), Arc::new(MemoryTokenStore::new())));
    users.get_profile().await.unwrap();
}
