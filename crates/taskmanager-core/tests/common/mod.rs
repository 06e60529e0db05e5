#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use taskmanager_core::auth::TokenStore;
use taskmanager_core::{ApiClient, ClientConfig};
use wiremock::MockServer;

/// Address nothing listens on, for connectivity failures
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn client_for(base_url: &str, store: Arc<dyn TokenStore>) -> ApiClient {
    client_with_timeout(base_url, store, Duration::from_secs(5))
}

pub fn client_with_timeout(
    base_url: &str,
    store: Arc<dyn TokenStore>,
    timeout: Duration,
) -> ApiClient {
    let mut default_headers = BTreeMap::new();
    default_headers.insert("ngrok-skip-browser-warning".to_string(), "true".to_string());
    let config = ClientConfig {
        base_url: base_url.to_string(),
        timeout,
        default_headers,
    };
    ApiClient::new(config, store).expect("client should build")
}

/// Holds a token but cannot delete it, like a locked keychain
pub struct LockedTokenStore {
    token: String,
}

impl LockedTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

impl TokenStore for LockedTokenStore {
    fn save(&self, _token: &str) -> anyhow::Result<()> {
        anyhow::bail!("keychain locked")
    }

    fn read(&self) -> anyhow::Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }

    fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("keychain locked")
    }
}

pub fn profile_json() -> Value {
    json!({
        "id": 42,
        "nome": "Ana Souza",
        "email": "a@b.com",
        "dataCriacao": "2024-03-01T10:15:00",
        "ativo": true,
        "roles": ["ROLE_USER"]
    })
}

/// Authorization header of every request the server saw, in order
pub async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}
