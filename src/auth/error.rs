use std::fmt;

use crate::firestore::error::{unauthenticated, FirestoreError};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Network(String),
    InvalidCredential(String),
    MissingApiKey,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(message) => write!(f, "Network error: {message}"),
            AuthError::InvalidCredential(message) => write!(f, "Invalid credential: {message}"),
            AuthError::MissingApiKey => write!(f, "Firebase options must include an api_key"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for FirestoreError {
    fn from(err: AuthError) -> Self {
        unauthenticated(err.to_string())
    }
}
