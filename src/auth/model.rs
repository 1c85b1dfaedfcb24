use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::token_manager::{TokenManager, TokenUpdate};

/// Provider id reported for email/password accounts.
pub const EMAIL_PASSWORD_PROVIDER_ID: &str = "password";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub provider_id: String,
}

/// A signed-in identity. The ID token, when present, authorizes Firestore requests.
#[derive(Clone, Debug)]
pub struct User {
    info: UserInfo,
    token_manager: TokenManager,
}

impl User {
    pub fn new(info: UserInfo) -> Self {
        Self {
            info,
            token_manager: TokenManager::default(),
        }
    }

    /// Replaces whichever tokens are given; `expires_in` counts from now.
    pub fn update_tokens(
        &self,
        id_token: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<Duration>,
    ) {
        self.token_manager
            .update(TokenUpdate::new(id_token, refresh_token, expires_in));
    }

    /// Returns the stable Firebase UID for the user.
    pub fn uid(&self) -> &str {
        &self.info.uid
    }

    pub fn display_name(&self) -> Option<&str> {
        self.info.display_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.info.email.as_deref()
    }

    pub fn id_token(&self) -> Option<String> {
        self.token_manager.id_token()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.token_manager.refresh_token()
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    pub fn info(&self) -> &UserInfo {
        &self.info
    }
}

#[derive(Debug, Serialize)]
pub struct SignInWithPasswordRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "returnSecureToken")]
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignInWithPasswordResponse {
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<String>,
    #[serde(rename = "localId")]
    pub local_id: String,
    #[serde(rename = "email", default)]
    pub email: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "returnSecureToken")]
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignUpResponse {
    #[serde(rename = "idToken")]
    pub id_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<String>,
    #[serde(rename = "localId")]
    pub local_id: Option<String>,
    #[serde(rename = "email", default)]
    pub email: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}
