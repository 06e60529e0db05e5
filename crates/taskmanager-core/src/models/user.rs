use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest password the registration and password-change forms accept
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Login credentials. Never persisted; `Debug` hides the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse").field("token", &"***").finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserProfile {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// Server timestamp, kept as sent
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<String>,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "statusEmoji", default, skip_serializing_if = "Option::is_none")]
    pub status_emoji: Option<String>,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Name with the status emoji appended, for headers and greetings
    pub fn display_name(&self) -> String {
        match self.status_emoji.as_deref() {
            Some(emoji) if !emoji.is_empty() => format!("{} {}", self.name, emoji),
            _ => self.name.clone(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "confirmaSenha")]
    pub password_confirmation: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    /// Checks run before anything is sent: every field filled, passwords
    /// equal, password long enough. First failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            &self.name,
            &self.email,
            &self.password,
            &self.password_confirmation,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Clone, Serialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "senhaAtual")]
    pub current_password: String,
    #[serde(rename = "novaSenha")]
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.current_password.is_empty() || self.new_password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if self.new_password == self.current_password {
            return Err(ValidationError::SamePassword);
        }
        Ok(())
    }
}
