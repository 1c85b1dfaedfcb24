use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::app::FirebaseOptions;
use crate::auth::error::{AuthError, AuthResult};
use crate::auth::model::{
    SignInWithPasswordRequest, SignInWithPasswordResponse, SignUpRequest, SignUpResponse, User,
    UserInfo, EMAIL_PASSWORD_PROVIDER_ID,
};
use crate::auth::provider::IdentityProvider;
use crate::auth::token::{refresh_id_token_with_endpoint, DEFAULT_SECURE_TOKEN_ENDPOINT};

pub(crate) const DEFAULT_IDENTITY_TOOLKIT_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_REFRESH_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// Email/password authentication against the Identity Toolkit REST API.
///
/// Holds the most recently signed-in user; that user's ID token is what
/// `AuthTokenProvider` hands to Firestore.
pub struct IdentityToolkitAuth {
    api_key: String,
    endpoint: String,
    secure_token_endpoint: String,
    token_refresh_tolerance: Duration,
    rest_client: Client,
    current_user: Mutex<Option<Arc<User>>>,
}

impl IdentityToolkitAuth {
    pub fn new(options: &FirebaseOptions) -> AuthResult<Self> {
        let api_key = options
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(AuthError::MissingApiKey)?;
        Ok(Self {
            api_key,
            endpoint: DEFAULT_IDENTITY_TOOLKIT_ENDPOINT.to_string(),
            secure_token_endpoint: DEFAULT_SECURE_TOKEN_ENDPOINT.to_string(),
            token_refresh_tolerance: DEFAULT_TOKEN_REFRESH_TOLERANCE,
            rest_client: Client::new(),
            current_user: Mutex::new(None),
        })
    }

    /// Points requests at another Identity Toolkit host, e.g. the Auth emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_secure_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.secure_token_endpoint = endpoint.into();
        self
    }

    /// How long before expiry an ID token is considered stale.
    pub fn with_token_refresh_tolerance(mut self, tolerance: Duration) -> Self {
        self.token_refresh_tolerance = tolerance;
        self
    }

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.current_user.lock().unwrap().clone()
    }

    /// Returns the current user's ID token, refreshing it first when forced or
    /// when it is about to expire. `None` while nobody is signed in.
    pub async fn get_token(&self, force_refresh: bool) -> AuthResult<Option<String>> {
        let Some(user) = self.current_user() else {
            return Ok(None);
        };
        let needs_refresh = force_refresh
            || user
                .token_manager()
                .should_refresh(self.token_refresh_tolerance);
        if needs_refresh {
            self.refresh_user_token(&user).await.map(Some)
        } else {
            Ok(user.id_token())
        }
    }

    pub fn sign_out(&self) {
        self.current_user.lock().unwrap().take();
    }

    /// Signs a user in using the email/password REST endpoint.
    pub async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<Arc<User>> {
        let request = SignInWithPasswordRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            return_secure_token: true,
        };
        let response: SignInWithPasswordResponse = self
            .execute_request("accounts:signInWithPassword", &request)
            .await?;

        let user = User::new(UserInfo {
            uid: response.local_id,
            display_name: response.display_name,
            email: response.email.or_else(|| Some(email.to_owned())),
            provider_id: EMAIL_PASSWORD_PROVIDER_ID.to_string(),
        });
        user.update_tokens(
            Some(response.id_token),
            response.refresh_token,
            parse_expires_in(response.expires_in.as_deref())?,
        );
        Ok(self.install_user(user))
    }

    /// Creates a new account and signs it in.
    pub async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Arc<User>> {
        let request = SignUpRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            display_name: display_name.map(str::to_owned),
            return_secure_token: true,
        };
        let response: SignUpResponse = self.execute_request("accounts:signUp", &request).await?;

        let uid = response
            .local_id
            .ok_or_else(|| AuthError::InvalidCredential("signUp response missing localId".into()))?;
        let user = User::new(UserInfo {
            uid,
            display_name: response.display_name.or_else(|| display_name.map(str::to_owned)),
            email: response.email.or_else(|| Some(email.to_owned())),
            provider_id: EMAIL_PASSWORD_PROVIDER_ID.to_string(),
        });
        user.update_tokens(
            response.id_token,
            response.refresh_token,
            parse_expires_in(response.expires_in.as_deref())?,
        );
        Ok(self.install_user(user))
    }

    async fn refresh_user_token(&self, user: &User) -> AuthResult<String> {
        let refresh_token = user
            .refresh_token()
            .ok_or_else(|| AuthError::InvalidCredential("Missing refresh token".into()))?;
        let response = refresh_id_token_with_endpoint(
            &self.rest_client,
            &self.secure_token_endpoint,
            &self.api_key,
            &refresh_token,
        )
        .await?;
        user.update_tokens(
            Some(response.id_token.clone()),
            Some(response.refresh_token),
            parse_expires_in(Some(&response.expires_in))?,
        );
        log::debug!("refreshed ID token for {}", user.uid());
        Ok(response.id_token)
    }

    fn install_user(&self, user: User) -> Arc<User> {
        let user = Arc::new(user);
        *self.current_user.lock().unwrap() = Some(user.clone());
        log::debug!("signed in {}", user.uid());
        user
    }

    async fn execute_request<TRequest, TResponse>(
        &self,
        path: &str,
        request: &TRequest,
    ) -> AuthResult<TResponse>
    where
        TRequest: Serialize,
        TResponse: DeserializeOwned,
    {
        let url = self.endpoint_url(path)?;
        let response = self
            .rest_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status, &body));
        }

        response
            .json()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))
    }

    fn endpoint_url(&self, path: &str) -> AuthResult<Url> {
        let endpoint = format!(
            "{}/{}?key={}",
            self.endpoint.trim_end_matches('/'),
            path,
            self.api_key
        );
        Url::parse(&endpoint).map_err(|err| AuthError::Network(err.to_string()))
    }
}

impl IdentityProvider for IdentityToolkitAuth {
    fn current_user(&self) -> Option<Arc<User>> {
        IdentityToolkitAuth::current_user(self)
    }
}

fn parse_expires_in(value: Option<&str>) -> AuthResult<Option<Duration>> {
    value
        .map(|value| {
            value.parse::<u64>().map(Duration::from_secs).map_err(|err| {
                AuthError::InvalidCredential(format!("Invalid expiresIn value: {err}"))
            })
        })
        .transpose()
}

/// Identity Toolkit reports failures as `{"error":{"message":"EMAIL_EXISTS"}}`.
fn map_error_response(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });
    if status == StatusCode::BAD_REQUEST {
        AuthError::InvalidCredential(message)
    } else {
        AuthError::Network(message)
    }
}
