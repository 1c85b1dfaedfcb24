use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::error::{AuthError, AuthResult};

pub(crate) const DEFAULT_SECURE_TOKEN_ENDPOINT: &str =
    "https://securetoken.googleapis.com/v1/token";

#[derive(Debug, Serialize)]
struct RefreshTokenRequest {
    grant_type: &'static str,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenResponse {
    pub refresh_token: String,
    pub id_token: String,
    pub expires_in: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Exchanges a refresh token for a new ID token at the Secure Token endpoint.
pub async fn refresh_id_token_with_endpoint(
    client: &Client,
    endpoint: &str,
    api_key: &str,
    refresh_token: &str,
) -> AuthResult<RefreshTokenResponse> {
    let url = format!("{endpoint}?key={api_key}");
    let request = RefreshTokenRequest {
        grant_type: "refresh_token",
        refresh_token: refresh_token.to_owned(),
    };

    let response = client
        .post(url)
        .form(&request)
        .send()
        .await
        .map_err(|err| AuthError::Network(err.to_string()))?;

    if response.status().is_success() {
        response
            .json::<RefreshTokenResponse>()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "{}".to_string());
        Err(map_refresh_error(status, &body))
    }
}

fn map_refresh_error(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| error.message);
    match message {
        Some(message) => AuthError::InvalidCredential(message),
        None => AuthError::Network(format!("Token refresh failed with status {status}")),
    }
}
