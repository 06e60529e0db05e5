use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{UpdateProfileRequest, UserProfile};
use crate::services::{AuthService, UserService};

/// Who, if anyone, is logged in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(UserProfile),
}

/// In-memory session. Never persisted: it is rebuilt from the stored token
/// with [`restore`](SessionContext::restore) at startup.
pub struct SessionContext {
    auth: AuthService,
    users: UserService,
    state: SessionState,
}

impl SessionContext {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            users: UserService::new(client),
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self.state {
            SessionState::Authenticated(ref user) => Some(user),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Cold start: if a token is stored, load its profile. A token the server
    /// no longer accepts is cleared.
    ///
    /// Returns whether the session ended up authenticated. Only a token store
    /// failure is an error.
    pub async fn restore(&mut self) -> Result<bool> {
        self.state = SessionState::Unauthenticated;
        if self.auth.get_token()?.is_none() {
            info!("No stored token, starting unauthenticated");
            return Ok(false);
        }

        match self.users.get_profile().await {
            Ok(user) => {
                info!(user_id = user.id, "Session restored");
                self.state = SessionState::Authenticated(user);
                Ok(true)
            }
            Err(e) => {
                warn!(error = ?e, "Stored token rejected, clearing it");
                self.auth.logout()?;
                Ok(false)
            }
        }
    }

    /// Log in and load the profile. The session is only authenticated once
    /// both succeed; if the profile cannot be loaded the new token is dropped.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile> {
        self.auth.login(email, password).await?;

        match self.users.get_profile().await {
            Ok(user) => {
                info!(user_id = user.id, name = %user.name, "Login complete");
                self.state = SessionState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch after login failed");
                self.state = SessionState::Unauthenticated;
                if let Err(clear_err) = self.auth.logout() {
                    warn!(error = %clear_err, "Failed to clear token after incomplete login");
                }
                Err(e)
            }
        }
    }

    /// The in-memory user is dropped even if clearing the store fails.
    pub fn logout(&mut self) -> Result<()> {
        self.state = SessionState::Unauthenticated;
        self.auth.logout()
    }

    /// Reload the profile. On failure the current state is kept.
    pub async fn refresh_user(&mut self) -> bool {
        match self.users.get_profile().await {
            Ok(user) => {
                self.state = SessionState::Authenticated(user);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh user");
                false
            }
        }
    }

    pub async fn update_profile(&mut self, request: &UpdateProfileRequest) -> Result<UserProfile> {
        let user = self.users.update_profile(request).await?;
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Once the server has deleted the account the session is
    /// unauthenticated, even if clearing the stored token then fails.
    pub async fn delete_account(&mut self) -> Result<()> {
        self.users.delete_profile().await?;
        self.state = SessionState::Unauthenticated;
        self.auth.logout()
    }
}
