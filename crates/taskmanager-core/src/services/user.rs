use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{Result, ServiceError, ValidationError, INVALID_DATA_MESSAGE};
use crate::models::{ChangePasswordRequest, RegisterRequest, UpdateProfileRequest, UserProfile};

const USERS_PATH: &str = "/usuario";
const PROFILE_PATH: &str = "/usuario/me";
const CHANGE_PASSWORD_PATH: &str = "/usuario/me/alterar-senha";

/// Registration and profile endpoints
#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// A 400 means the server did not like the submitted fields
    fn map_input_error(err: ApiError) -> ServiceError {
        match err {
            ApiError::BadRequest(_) => {
                let message = err
                    .server_message()
                    .unwrap_or_else(|| INVALID_DATA_MESSAGE.to_string());
                ValidationError::InvalidData(message).into()
            }
            other => ServiceError::from_api(other),
        }
    }

    /// Create an account. Nothing is sent unless the request validates.
    pub async fn register_user(&self, request: &RegisterRequest) -> Result<UserProfile> {
        request.validate().map_err(|e| {
            warn!(error = %e, "Registration rejected before sending");
            ServiceError::from(e)
        })?;

        let profile: UserProfile = self
            .client
            .post(USERS_PATH, request)
            .await
            .map_err(Self::map_input_error)?;
        info!(user_id = profile.id, "Registered user");
        Ok(profile)
    }

    /// Profile of the user the stored token belongs to
    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.client.get(PROFILE_PATH).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch profile");
            ServiceError::fetch("profile", e)
        })
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<UserProfile> {
        request.validate()?;
        let profile: UserProfile = self
            .client
            .put(PROFILE_PATH, request)
            .await
            .map_err(Self::map_input_error)?;
        info!(user_id = profile.id, "Updated profile");
        Ok(profile)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        request.validate()?;

        self.client
            .put_no_content(CHANGE_PASSWORD_PATH, &request)
            .await
            .map_err(|e| -> ServiceError {
                match e {
                    ApiError::Unauthorized(_) => ValidationError::WrongCurrentPassword.into(),
                    ApiError::BadRequest(_) => match e.server_message() {
                        Some(message) => ValidationError::InvalidData(message).into(),
                        None => ValidationError::WrongCurrentPassword.into(),
                    },
                    other => ServiceError::from_api(other),
                }
            })?;
        info!("Password changed");
        Ok(())
    }

    /// Delete the account on the server. The stored token is left alone.
    pub async fn delete_profile(&self) -> Result<()> {
        self.client
            .delete(PROFILE_PATH)
            .await
            .map_err(ServiceError::from_api)?;
        info!("Account deleted");
        Ok(())
    }

    /// Delete the account and forget its token.
    pub async fn delete_account(&self) -> Result<()> {
        self.delete_profile().await?;
        self.client
            .token_store()
            .clear()
            .map_err(ServiceError::storage)?;
        info!("Token removed after account deletion");
        Ok(())
    }
}
