mod common;

use std::sync::Arc;

use serde_json::json;
use taskmanager_core::auth::{MemoryTokenStore, TokenStore};
use taskmanager_core::{ErrorKind, SessionContext, SessionState};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, profile_json, request_count, LockedTokenStore};

async fn mount_profile(server: &MockServer, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(profile_json())
    } else {
        ResponseTemplate::new(status).set_body_json(json!({"message": "Token inválido"}))
    };
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_then_profile_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
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
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));
    assert_eq!(session.state(), &SessionState::Unauthenticated);

    let user = session.login("a@b.com", "secret").await.unwrap();
    assert_eq!(user.name, "Ana Souza");
    assert!(session.is_authenticated());
    assert_eq!(session.user().map(|u| u.id), Some(42));
    assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn failed_profile_after_login_drops_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&server)
        .await;
    mount_profile(&server, 500).await;

    let store = Arc::new(MemoryTokenStore::new());
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));

    let err = session.login("a@b.com", "secret").await.unwrap_err();
    assert_eq!(err.to_string(), "Could not load profile.");
    assert!(!session.is_authenticated());
    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn restore_with_rejected_token_clears_it() {
    let server = MockServer::start().await;
    mount_profile(&server, 401).await;

    let store = Arc::new(MemoryTokenStore::with_token("expired"));
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));

    let authenticated = session.restore().await.unwrap();
    assert!(!authenticated);
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn restore_with_valid_token_authenticates() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));

    assert!(session.restore().await.unwrap());
    assert_eq!(session.user().map(|u| u.email.as_str()), Some("a@b.com"));
    assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn restore_without_token_makes_no_request() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;

    let mut session = SessionContext::new(client_for(&server.uri(), Arc::new(MemoryTokenStore::new())));
    assert!(!session.restore().await.unwrap());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn logout_clears_user_and_token() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));
    session.restore().await.unwrap();
    assert!(session.is_authenticated());

    session.logout().unwrap();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert_eq!(store.read().unwrap(), None);
}

#[tokio::test]
async fn refresh_failure_keeps_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuario/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store));
    assert!(session.restore().await.unwrap());

    assert!(!session.refresh_user().await);
    assert_eq!(session.user().map(|u| u.id), Some(42));
}

#[tokio::test]
async fn invalid_login_leaves_session_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));
    let err = session.login("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!session.is_authenticated());
    assert_eq!(store.read().unwrap(), None);
    // Only the login request went out
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn logout_drops_user_even_when_store_fails() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;

    let store = Arc::new(LockedTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store));
    assert!(session.restore().await.unwrap());

    let err = session.logout().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(session.user().is_none());
    assert_eq!(session.state(), &SessionState::Unauthenticated);
}

#[tokio::test]
async fn delete_account_unauthenticates_even_when_store_fails() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;
    Mock::given(method("DELETE"))
        .and(path("/usuario/me"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(LockedTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store));
    assert!(session.restore().await.unwrap());

    let err = session.delete_account().await.unwrap_err();
    assert_eq!(err.to_string(), "Token storage failed: keychain locked");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_delete_keeps_session() {
    let server = MockServer::start().await;
    mount_profile(&server, 200).await;
    Mock::given(method("DELETE"))
        .and(path("/usuario/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token("abc"));
    let mut session = SessionContext::new(client_for(&server.uri(), store.clone()));
    assert!(session.restore().await.unwrap());

    assert!(session.delete_account().await.is_err());
    assert!(session.is_authenticated());
    assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
}
