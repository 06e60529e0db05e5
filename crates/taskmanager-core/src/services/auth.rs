use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::TokenStore;
use crate::error::{AuthError, Result, ServiceError};
use crate::models::{Credentials, LoginResponse};

const LOGIN_PATH: &str = "/auth/login";

/// Fallback when a 400 from the login endpoint carries no message
const LOGIN_FAILED_MESSAGE: &str = "Login failed.";

/// Login and logout against the auth endpoints.
///
/// The token lives only in the token store; the client picks it up on the
/// next request, so there is no header state to keep in sync here.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.client.token_store()
    }

    /// Exchange credentials for a bearer token and persist it.
    ///
    /// The token store is only written after the server accepted the
    /// credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let credentials = Credentials::new(email, password);
        info!(email = %credentials.email, "Logging in");

        let response: LoginResponse = self
            .client
            .post(LOGIN_PATH, &credentials)
            .await
            .map_err(|e| {
                let err = Self::map_login_error(e);
                warn!(error = %err, kind = ?err.kind(), "Login failed");
                err
            })?;

        self.tokens()
            .save(&response.token)
            .map_err(ServiceError::storage)?;
        info!("Login succeeded, token stored");
        Ok(response.token)
    }

    fn map_login_error(err: ApiError) -> ServiceError {
        match err {
            ApiError::Unauthorized(_) => AuthError::InvalidCredentials.into(),
            ApiError::AccessDenied(_) => AuthError::InactiveAccount.into(),
            ApiError::NotFound(_) => AuthError::UnregisteredEmail.into(),
            ApiError::BadRequest(body) => ServiceError::Rejected(
                body.message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
            ),
            other => ServiceError::from_api(other),
        }
    }

    /// Forget the stored token. The next request goes out unauthenticated.
    pub fn logout(&self) -> Result<()> {
        self.tokens().clear().map_err(ServiceError::storage)?;
        info!("Logged out, token removed");
        Ok(())
    }

    pub fn get_token(&self) -> Result<Option<String>> {
        self.tokens().read().map_err(ServiceError::storage)
    }

    /// Whether a token is stored. Says nothing about whether the server
    /// still accepts it.
    pub fn is_authenticated(&self) -> bool {
        match self.get_token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                debug!(error = %e, "Could not read token store");
                false
            }
        }
    }
}
