use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::IdentityToolkitAuth;
use crate::firestore::error::{FirestoreError, FirestoreResult};
use crate::firestore::remote::datastore::{TokenProvider, TokenProviderArc};

/// Supplies the signed-in user's ID token as the Firestore bearer token,
/// refreshing it when it is close to expiry.
///
/// Requests go out unauthenticated while nobody is signed in; security rules
/// then decide whether they succeed.
#[derive(Clone)]
pub struct AuthTokenProvider {
    auth: Arc<IdentityToolkitAuth>,
}

impl AuthTokenProvider {
    pub fn new(auth: Arc<IdentityToolkitAuth>) -> Self {
        Self { auth }
    }

    /// Converts the provider into an `Arc` for Datastore integration.
    pub fn into_arc(self) -> TokenProviderArc {
        Arc::new(self)
    }
}

#[async_trait]
impl TokenProvider for AuthTokenProvider {
    async fn get_token(&self) -> FirestoreResult<Option<String>> {
        self.auth.get_token(false).await.map_err(FirestoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FirebaseOptions;
    use crate::firestore::error::FirestoreErrorCode;
    use crate::test_support::start_mock_server;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn no_token_without_user() {
        let options = FirebaseOptions {
            api_key: Some("key".into()),
            ..Default::default()
        };
        let auth = Arc::new(IdentityToolkitAuth::new(&options).unwrap());
        let provider = AuthTokenProvider::new(auth);
        assert_eq!(provider.get_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_token_refresh_is_unauthenticated() {
        let server = start_mock_server().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/accounts:signInWithPassword");
                then.status(200).json_body(json!({
                    "idToken": "stale-id",
                    "refreshToken": "revoked",
                    "localId": "uid-ada",
                    "expiresIn": "1"
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400)
                    .json_body(json!({ "error": { "message": "TOKEN_EXPIRED" } }));
            })
            .await;
        let options = FirebaseOptions {
            api_key: Some("key".into()),
            ..Default::default()
        };
        let auth = IdentityToolkitAuth::new(&options)
            .unwrap()
            .with_endpoint(server.url("/v1"))
            .with_secure_token_endpoint(server.url("/token"));
        auth.sign_in_with_email_and_password("ada@example.com", "secret")
            .await
            .unwrap();

        let provider = AuthTokenProvider::new(Arc::new(auth));
        let err = provider.get_token().await.unwrap_err();
        assert_eq!(err.code, FirestoreErrorCode::Unauthenticated);
        assert!(err.message().contains("TOKEN_EXPIRED"));
    }
}
